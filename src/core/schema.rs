//! Attribute and type names of the node type records under `/jcr:system/jcr:nodeTypes`.
//! These match what the repository writes and must not be changed.

pub const NODE_TYPES_ROOT: &str = "/jcr:system/jcr:nodeTypes";

pub const JCR_PRIMARYTYPE: &str = "jcr:primaryType";
pub const JCR_NODETYPENAME: &str = "jcr:nodeTypeName";
pub const JCR_SUPERTYPES: &str = "jcr:supertypes";
pub const JCR_ISMIXIN: &str = "jcr:isMixin";
pub const JCR_NAME: &str = "jcr:name";
pub const JCR_AUTOCREATED: &str = "jcr:autoCreated";
pub const JCR_DEFAULTPRIMARYTYPE: &str = "jcr:defaultPrimaryType";
pub const JCR_REQUIREDTYPE: &str = "jcr:requiredType";
pub const JCR_MULTIPLE: &str = "jcr:multiple";
pub const JCR_MANDATORY: &str = "jcr:mandatory";
pub const JCR_DEFAULTVALUES: &str = "jcr:defaultValues";
pub const JCR_CONTENT: &str = "jcr:content";

pub const NT_PROPERTYDEFINITION: &str = "nt:propertyDefinition";
pub const NT_CHILDNODEDEFINITION: &str = "nt:childNodeDefinition";

pub const CQ_CELLNAME: &str = "cq:cellName";
pub const CQ_COMPONENT: &str = "cq:Component";
pub const CQ_DIALOG: &str = "cq:Dialog";
pub const CQ_PAGECONTENT: &str = "cq:PageContent";
pub const CQ_TABPANEL: &str = "cq:TabPanel";
pub const CQ_TEMPLATE: &str = "cq:Template";
pub const CQ_WIDGET: &str = "cq:Widget";
pub const CQ_WIDGETCOLLECTION: &str = "cq:WidgetCollection";

pub const ALLOWED_PARENTS: &str = "allowedParents";
pub const ALLOWED_PATHS: &str = "allowedPaths";
pub const COMPONENT_GROUP: &str = "componentGroup";
pub const XTYPE: &str = "xtype";
