use crate::utils::error::{NodeTypeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A repository attribute value, also used for property default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Long(i64),
    Double(f64),
    String(String),
    Multi(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// JCR converts the strings "true"/"false" to booleans, so do we.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            PropertyValue::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            PropertyValue::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Values of a multi-valued attribute; a single value is a one-element list.
    pub fn values(&self) -> &[PropertyValue] {
        match self {
            PropertyValue::Multi(values) => values,
            single => std::slice::from_ref(single),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Long(n) => write!(f, "{}", n),
            PropertyValue::Double(n) => write!(f, "{}", n),
            PropertyValue::String(s) => write!(f, "{}", s),
            PropertyValue::Multi(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// An owned snapshot of a repository node and its subtree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepositoryNode {
    pub name: String,
    pub path: String,
    pub properties: BTreeMap<String, PropertyValue>,
    pub children: Vec<RepositoryNode>,
}

impl RepositoryNode {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Build a child of `self` with its path derived from ours.
    pub fn child(&self, name: impl Into<String>) -> RepositoryNode {
        let name = name.into();
        let path = if self.path.ends_with('/') {
            format!("{}{}", self.path, name)
        } else {
            format!("{}/{}", self.path, name)
        };
        RepositoryNode::new(name, path)
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: RepositoryNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn children(&self) -> impl Iterator<Item = &RepositoryNode> {
        self.children.iter()
    }

    fn required(&self, name: &str) -> Result<&PropertyValue> {
        self.property(name).ok_or_else(|| NodeTypeError::MissingProperty {
            node: self.path.clone(),
            property: name.to_string(),
        })
    }

    fn type_error(&self, name: &str, expected: &'static str) -> NodeTypeError {
        NodeTypeError::PropertyTypeError {
            node: self.path.clone(),
            property: name.to_string(),
            expected,
        }
    }

    pub fn string(&self, name: &str) -> Result<&str> {
        self.required(name)?
            .as_str()
            .ok_or_else(|| self.type_error(name, "string"))
    }

    pub fn boolean(&self, name: &str) -> Result<bool> {
        self.required(name)?
            .as_bool()
            .ok_or_else(|| self.type_error(name, "boolean"))
    }

    pub fn strings(&self, name: &str) -> Result<Vec<&str>> {
        self.required(name)?
            .values()
            .iter()
            .map(|v| v.as_str().ok_or_else(|| self.type_error(name, "string list")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_reads() {
        let node = RepositoryNode::new("cq:Page", "/jcr:system/jcr:nodeTypes/cq:Page")
            .with_property("jcr:nodeTypeName", "cq:Page")
            .with_property("jcr:isMixin", "false")
            .with_property(
                "jcr:supertypes",
                PropertyValue::Multi(vec!["nt:hierarchyNode".into()]),
            );

        assert_eq!(node.string("jcr:nodeTypeName").unwrap(), "cq:Page");
        assert!(!node.boolean("jcr:isMixin").unwrap());
        assert_eq!(node.strings("jcr:supertypes").unwrap(), vec!["nt:hierarchyNode"]);
    }

    #[test]
    fn test_missing_and_mistyped_reads() {
        let node = RepositoryNode::new("x", "/x").with_property("flag", 3i64.to_string());

        assert!(matches!(
            node.string("jcr:nodeTypeName"),
            Err(NodeTypeError::MissingProperty { .. })
        ));
        assert!(matches!(
            node.boolean("flag"),
            Err(NodeTypeError::PropertyTypeError { expected: "boolean", .. })
        ));
    }

    #[test]
    fn test_single_value_reads_as_list() {
        let node = RepositoryNode::new("x", "/x").with_property("jcr:supertypes", "nt:base");
        assert_eq!(node.strings("jcr:supertypes").unwrap(), vec!["nt:base"]);
    }

    #[test]
    fn test_untagged_values_deserialize() {
        let value: PropertyValue = serde_json::from_str(r#"["a", true, 2, 1.5]"#).unwrap();
        assert_eq!(
            value,
            PropertyValue::Multi(vec![
                PropertyValue::String("a".to_string()),
                PropertyValue::Boolean(true),
                PropertyValue::Long(2),
                PropertyValue::Double(1.5),
            ])
        );
        assert_eq!(value.to_string(), "[a,true,2,1.5]");
    }

    #[test]
    fn test_child_path() {
        let root = RepositoryNode::new("", "/");
        let system = root.child("jcr:system");
        assert_eq!(system.path, "/jcr:system");
        assert_eq!(system.child("jcr:nodeTypes").path, "/jcr:system/jcr:nodeTypes");
    }
}
