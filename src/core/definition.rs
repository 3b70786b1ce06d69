use crate::core::merge::{self, Resolved};
use crate::core::registry::NodeTypes;
use crate::core::schema::*;
use crate::domain::model::{PropertyValue, RepositoryNode};
use crate::utils::error::Result;
use std::collections::HashMap;

/// A property declared by a node type. The only thing callers ask of it is a default value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyDefinition {
    /// Read from an `nt:propertyDefinition` record.
    Declared(DeclaredProperty),
    /// Injected by a customization rule or the primary type marker.
    Synthetic(PropertyValue),
}

impl PropertyDefinition {
    pub fn synthetic(value: impl Into<PropertyValue>) -> Self {
        PropertyDefinition::Synthetic(value.into())
    }

    pub fn default_value(&self) -> PropertyValue {
        match self {
            PropertyDefinition::Declared(declared) => declared.default_value(),
            PropertyDefinition::Synthetic(value) => value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredProperty {
    pub required_type: String,
    pub multiple: bool,
    pub mandatory: bool,
    pub default_values: Vec<PropertyValue>,
}

impl DeclaredProperty {
    pub fn from_node(node: &RepositoryNode) -> Result<Self> {
        let required_type = if node.has_property(JCR_REQUIREDTYPE) {
            node.string(JCR_REQUIREDTYPE)?.to_string()
        } else {
            "undefined".to_string()
        };
        let multiple = node.has_property(JCR_MULTIPLE) && node.boolean(JCR_MULTIPLE)?;
        let mandatory = node.has_property(JCR_MANDATORY) && node.boolean(JCR_MANDATORY)?;
        let default_values = node
            .property(JCR_DEFAULTVALUES)
            .map(|v| v.values().to_vec())
            .unwrap_or_default();

        Ok(Self {
            required_type,
            multiple,
            mandatory,
            default_values,
        })
    }

    pub fn default_value(&self) -> PropertyValue {
        if self.multiple {
            return PropertyValue::Multi(self.default_values.clone());
        }
        if let Some(first) = self.default_values.first() {
            return first.clone();
        }
        match self.required_type.to_ascii_lowercase().as_str() {
            "boolean" => PropertyValue::Boolean(false),
            "long" => PropertyValue::Long(0),
            "double" | "decimal" => PropertyValue::Double(0.0),
            _ => PropertyValue::String(String::new()),
        }
    }
}

/// One node type as read from the repository, before inheritance is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    name: String,
    properties: HashMap<String, PropertyDefinition>,
    child_suggestions: HashMap<String, String>,
    supertypes: Vec<String>,
    is_mixin: bool,
    accepts_arbitrary_properties: bool,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
            child_suggestions: HashMap::new(),
            supertypes: Vec::new(),
            is_mixin: false,
            accepts_arbitrary_properties: false,
        }
    }

    /// Parse a node type record (a child of `/jcr:system/jcr:nodeTypes`).
    pub fn from_node(node: &RepositoryNode) -> Result<Self> {
        let mut definition = TypeDefinition::new(node.string(JCR_NODETYPENAME)?);

        for declaration in node.children() {
            match declaration.string(JCR_PRIMARYTYPE)? {
                NT_PROPERTYDEFINITION => definition.read_property(declaration)?,
                NT_CHILDNODEDEFINITION => definition.read_child(declaration)?,
                other => tracing::trace!(
                    "Ignoring {} declaration {} on {}",
                    other,
                    declaration.name,
                    definition.name
                ),
            }
        }

        if node.has_property(JCR_SUPERTYPES) {
            for supertype in node.strings(JCR_SUPERTYPES)? {
                definition.add_supertype(supertype);
            }
        }

        definition.is_mixin = node.has_property(JCR_ISMIXIN) && node.boolean(JCR_ISMIXIN)?;

        Ok(definition)
    }

    fn read_property(&mut self, declaration: &RepositoryNode) -> Result<()> {
        if !declaration.has_property(JCR_NAME) {
            // unnamed (residual) definition: any property may be added
            self.accepts_arbitrary_properties = true;
            return Ok(());
        }

        // auto-created properties are maintained by the repository, not the author
        if declaration.boolean(JCR_AUTOCREATED)? {
            return Ok(());
        }

        let name = declaration.string(JCR_NAME)?.to_string();
        let property = DeclaredProperty::from_node(declaration)?;
        self.properties.insert(name, PropertyDefinition::Declared(property));
        Ok(())
    }

    fn read_child(&mut self, declaration: &RepositoryNode) -> Result<()> {
        if declaration.has_property(JCR_NAME) && declaration.has_property(JCR_DEFAULTPRIMARYTYPE) {
            let slot = declaration.string(JCR_NAME)?.to_string();
            let default_type = declaration.string(JCR_DEFAULTPRIMARYTYPE)?.to_string();
            self.child_suggestions.insert(slot, default_type);
        }
        Ok(())
    }

    fn add_supertype(&mut self, supertype: &str) {
        if !self.supertypes.iter().any(|s| s == supertype) {
            self.supertypes.push(supertype.to_string());
        }
    }

    pub fn with_supertype(mut self, supertype: &str) -> Self {
        self.add_supertype(supertype);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, property: PropertyDefinition) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    pub fn with_child_suggestion(mut self, slot: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.child_suggestions.insert(slot.into(), type_name.into());
        self
    }

    pub fn mixin(mut self) -> Self {
        self.is_mixin = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn own_properties(&self) -> &HashMap<String, PropertyDefinition> {
        &self.properties
    }

    pub fn own_child_suggestions(&self) -> &HashMap<String, String> {
        &self.child_suggestions
    }

    /// Declared supertypes in declaration order, without duplicates.
    pub fn supertype_names(&self) -> &[String] {
        &self.supertypes
    }

    pub fn is_mixin(&self) -> bool {
        self.is_mixin
    }

    pub fn accepts_arbitrary_properties(&self) -> bool {
        self.accepts_arbitrary_properties
    }

    pub(crate) fn set_property(&mut self, name: &str, property: PropertyDefinition) {
        self.properties.insert(name.to_string(), property);
    }

    pub(crate) fn remove_property(&mut self, name: &str) -> Option<PropertyDefinition> {
        self.properties.remove(name)
    }

    pub(crate) fn suggest_child(&mut self, slot: &str, type_name: &str) {
        self.child_suggestions
            .insert(slot.to_string(), type_name.to_string());
    }

    /// Own properties plus everything inherited from supertypes.
    ///
    /// Own declarations win over inherited ones; among supertypes the earlier
    /// declared one wins. With `include_primary_type` a `jcr:primaryType`
    /// property holding this type's name is added.
    pub fn merged_properties(
        &self,
        types: &NodeTypes,
        include_primary_type: bool,
    ) -> Resolved<PropertyDefinition> {
        let mut resolved = merge::resolve(types, self, TypeDefinition::own_properties);
        if include_primary_type {
            resolved.entries.insert(
                JCR_PRIMARYTYPE.to_string(),
                PropertyDefinition::synthetic(self.name.as_str()),
            );
        }
        resolved
    }

    /// Child slot suggestions, own suggestions over inherited ones.
    pub fn child_suggestions(&self, types: &NodeTypes) -> Resolved<String> {
        merge::resolve(types, self, TypeDefinition::own_child_suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PropertyValue;
    use crate::utils::error::NodeTypeError;

    fn record(name: &str) -> RepositoryNode {
        RepositoryNode::new(name, format!("{}/{}", NODE_TYPES_ROOT, name))
            .with_property(JCR_PRIMARYTYPE, "nt:nodeType")
            .with_property(JCR_NODETYPENAME, name)
    }

    fn property_def(parent: &RepositoryNode, child: &str) -> RepositoryNode {
        parent
            .child(child)
            .with_property(JCR_PRIMARYTYPE, NT_PROPERTYDEFINITION)
    }

    fn child_def(parent: &RepositoryNode, child: &str) -> RepositoryNode {
        parent
            .child(child)
            .with_property(JCR_PRIMARYTYPE, NT_CHILDNODEDEFINITION)
    }

    #[test]
    fn test_parse_full_record() {
        let node = record("cq:Page");
        let title = property_def(&node, "jcr:propertyDefinition")
            .with_property(JCR_NAME, "jcr:title")
            .with_property(JCR_AUTOCREATED, false)
            .with_property(JCR_REQUIREDTYPE, "String");
        let created = property_def(&node, "jcr:propertyDefinition[2]")
            .with_property(JCR_NAME, "jcr:created")
            .with_property(JCR_AUTOCREATED, true);
        let residual = property_def(&node, "jcr:propertyDefinition[3]");
        let content = child_def(&node, "jcr:childNodeDefinition")
            .with_property(JCR_NAME, "jcr:content")
            .with_property(JCR_DEFAULTPRIMARYTYPE, "cq:PageContent");
        let wildcard = child_def(&node, "jcr:childNodeDefinition[2]")
            .with_property(JCR_DEFAULTPRIMARYTYPE, "nt:unstructured");
        let node = node
            .with_child(title)
            .with_child(created)
            .with_child(residual)
            .with_child(content)
            .with_child(wildcard)
            .with_property(
                JCR_SUPERTYPES,
                PropertyValue::Multi(vec!["nt:hierarchyNode".into(), "nt:hierarchyNode".into()]),
            );

        let definition = TypeDefinition::from_node(&node).unwrap();

        assert_eq!(definition.name(), "cq:Page");
        assert_eq!(definition.own_properties().len(), 1);
        assert!(definition.own_properties().contains_key("jcr:title"));
        assert!(!definition.own_properties().contains_key("jcr:created"));
        assert!(definition.accepts_arbitrary_properties());
        assert_eq!(definition.own_child_suggestions().len(), 1);
        assert_eq!(
            definition.own_child_suggestions().get("jcr:content").map(String::as_str),
            Some("cq:PageContent")
        );
        assert_eq!(definition.supertype_names(), ["nt:hierarchyNode".to_string()]);
        assert!(!definition.is_mixin());
    }

    #[test]
    fn test_mixin_flag_and_no_supertypes() {
        let node = record("mix:title").with_property(JCR_ISMIXIN, true);
        let definition = TypeDefinition::from_node(&node).unwrap();
        assert!(definition.is_mixin());
        assert!(definition.supertype_names().is_empty());
        assert!(!definition.accepts_arbitrary_properties());
    }

    #[test]
    fn test_missing_type_name_is_an_error() {
        let node = RepositoryNode::new("broken", "/jcr:system/jcr:nodeTypes/broken");
        assert!(TypeDefinition::from_node(&node).is_err());
    }

    #[test]
    fn test_declaration_without_kind_is_an_error() {
        let node = record("cq:Broken");
        let declaration = node.child("jcr:propertyDefinition");
        let node = node.with_child(declaration);
        assert!(TypeDefinition::from_node(&node).is_err());
    }

    #[test]
    fn test_named_property_without_auto_created_is_an_error() {
        let node = record("cq:T");
        let declaration = property_def(&node, "jcr:propertyDefinition").with_property(JCR_NAME, "p");
        let node = node.with_child(declaration);

        match TypeDefinition::from_node(&node) {
            Err(NodeTypeError::MissingProperty { node, property }) => {
                assert_eq!(node, "/jcr:system/jcr:nodeTypes/cq:T/jcr:propertyDefinition");
                assert_eq!(property, JCR_AUTOCREATED);
            }
            other => panic!("expected a missing jcr:autoCreated, got {:?}", other),
        }
    }

    #[test]
    fn test_unnamed_property_needs_no_auto_created() {
        let node = record("cq:T");
        let declaration = property_def(&node, "jcr:propertyDefinition");
        let definition = TypeDefinition::from_node(&node.with_child(declaration)).unwrap();
        assert!(definition.accepts_arbitrary_properties());
        assert!(definition.own_properties().is_empty());
    }

    #[test]
    fn test_declared_default_values() {
        let single = DeclaredProperty {
            required_type: "String".to_string(),
            multiple: false,
            mandatory: false,
            default_values: vec!["a".into(), "b".into()],
        };
        assert_eq!(single.default_value(), PropertyValue::String("a".to_string()));

        let multiple = DeclaredProperty {
            multiple: true,
            ..single.clone()
        };
        assert_eq!(
            multiple.default_value(),
            PropertyValue::Multi(vec!["a".into(), "b".into()])
        );

        let flag = DeclaredProperty {
            required_type: "Boolean".to_string(),
            multiple: false,
            mandatory: true,
            default_values: vec![],
        };
        assert_eq!(flag.default_value(), PropertyValue::Boolean(false));

        let count = DeclaredProperty {
            required_type: "Long".to_string(),
            ..flag.clone()
        };
        assert_eq!(count.default_value(), PropertyValue::Long(0));

        let undefined = DeclaredProperty {
            required_type: "undefined".to_string(),
            ..flag
        };
        assert_eq!(undefined.default_value(), PropertyValue::String(String::new()));
    }

    #[test]
    fn test_declared_property_from_node() {
        let node = RepositoryNode::new("p", "/p")
            .with_property(JCR_REQUIREDTYPE, "Boolean")
            .with_property(JCR_MANDATORY, "true")
            .with_property(JCR_DEFAULTVALUES, PropertyValue::Multi(vec![true.into()]));
        let declared = DeclaredProperty::from_node(&node).unwrap();
        assert!(declared.mandatory);
        assert!(!declared.multiple);
        assert_eq!(declared.default_value(), PropertyValue::Boolean(true));
    }
}
