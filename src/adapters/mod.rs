// Adapters layer: concrete repositories behind the `ContentRepository` port.

pub mod json_repository;
pub mod memory;

pub use json_repository::JsonRepository;
pub use memory::InMemoryRepository;
