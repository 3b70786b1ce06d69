// Domain layer: repository model and ports. The engine in `core` only talks to these.

pub mod model;
pub mod ports;
