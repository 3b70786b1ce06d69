use crate::domain::model::{PropertyValue, RepositoryNode};
use crate::domain::ports::{ContentRepository, RepositorySession};
use crate::utils::error::{NodeTypeError, Result};
use async_trait::async_trait;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// A repository read from a Sling JSON export, e.g. the output of
/// `GET /jcr:system/jcr:nodeTypes.infinity.json`.
///
/// The exported document is mounted at `mount_path`, so an export of the node
/// type root is mounted at `/jcr:system/jcr:nodeTypes` and a full export at `/`.
#[derive(Debug, Clone)]
pub struct JsonRepository {
    source: PathBuf,
    mount_path: String,
}

impl JsonRepository {
    pub fn new(source: impl Into<PathBuf>, mount_path: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            mount_path: mount_path.into(),
        }
    }

    pub fn source(&self) -> &std::path::Path {
        &self.source
    }
}

impl ContentRepository for JsonRepository {
    type Session = JsonSession;

    async fn login(&self) -> Result<JsonSession> {
        tracing::debug!("Reading repository export {}", self.source.display());
        let content = tokio::fs::read_to_string(&self.source).await?;
        let document = match serde_json::from_str::<ExportValue>(&content)? {
            ExportValue::Object(object) => object,
            ExportValue::Scalar(_) => {
                return Err(NodeTypeError::RepositoryError {
                    message: format!("{} is not a JSON object", self.source.display()),
                })
            }
        };

        Ok(JsonSession {
            document,
            mount_path: self.mount_path.clone(),
            open: true,
        })
    }
}

/// A JSON object of an export with its entries in document order.
///
/// Sling writes same-name siblings under their bare name, so one object may
/// repeat a key. `serde_json::Value` would keep only the last of them.
#[derive(Debug, Clone, Default)]
struct ExportObject {
    entries: Vec<(String, ExportValue)>,
}

#[derive(Debug, Clone)]
enum ExportValue {
    Object(ExportObject),
    Scalar(Value),
}

impl ExportObject {
    /// The first child object named `name`.
    fn child(&self, name: &str) -> Option<&ExportObject> {
        self.entries.iter().find_map(|(key, value)| match value {
            ExportValue::Object(object) if key == name => Some(object),
            _ => None,
        })
    }
}

impl<'de> Deserialize<'de> for ExportValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ExportValueVisitor)
    }
}

struct ExportValueVisitor;

impl<'de> Visitor<'de> for ExportValueVisitor {
    type Value = ExportValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<ExportValue, E> {
        Ok(ExportValue::Scalar(Value::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<ExportValue, E> {
        Ok(ExportValue::Scalar(Value::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<ExportValue, E> {
        Ok(ExportValue::Scalar(Value::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<ExportValue, E> {
        Ok(ExportValue::Scalar(Value::from(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ExportValue, E> {
        Ok(ExportValue::Scalar(Value::String(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<ExportValue, E> {
        Ok(ExportValue::Scalar(Value::String(v)))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<ExportValue, E> {
        Ok(ExportValue::Scalar(Value::Null))
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<ExportValue, E> {
        Ok(ExportValue::Scalar(Value::Null))
    }

    fn visit_some<D>(self, deserializer: D) -> std::result::Result<ExportValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        ExportValue::deserialize(deserializer)
    }

    // arrays hold attribute values only
    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<ExportValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(ExportValue::Scalar(Value::Array(items)))
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<ExportValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::new();
        while let Some((key, value)) = map.next_entry::<String, ExportValue>()? {
            entries.push((key, value));
        }
        Ok(ExportValue::Object(ExportObject { entries }))
    }
}

pub struct JsonSession {
    document: ExportObject,
    mount_path: String,
    open: bool,
}

#[async_trait]
impl RepositorySession for JsonSession {
    async fn node(&self, path: &str) -> Result<RepositoryNode> {
        if !self.open {
            return Err(NodeTypeError::RepositoryError {
                message: "session is closed".to_string(),
            });
        }

        let not_found = || NodeTypeError::PathNotFound {
            path: path.to_string(),
        };
        let segments = relative_segments(&self.mount_path, path).ok_or_else(not_found)?;

        let mut current = &self.document;
        for segment in segments {
            current = current.child(segment).ok_or_else(not_found)?;
        }

        let name = path.rsplit('/').next().unwrap_or_default();
        node_from_export(name, path, current)
    }

    fn logout(&mut self) {
        self.open = false;
    }
}

/// Segments of `path` below `mount_path`, or `None` if `path` lies outside it.
fn relative_segments<'a>(mount_path: &str, path: &'a str) -> Option<Vec<&'a str>> {
    let mount = mount_path.trim_end_matches('/');
    let rest = if mount.is_empty() {
        path
    } else if path == mount {
        ""
    } else {
        path.strip_prefix(mount)?.strip_prefix('/')?
    };
    Some(rest.split('/').filter(|s| !s.is_empty()).collect())
}

/// Convert one JSON object of a Sling export into a node. Nested objects are
/// child nodes; keys starting with `:` (binary/length markers) and nulls are skipped.
pub fn node_from_json(path: &str, value: &Value) -> Result<RepositoryNode> {
    match ExportValue::deserialize(value)? {
        ExportValue::Object(object) => {
            let name = path.rsplit('/').next().unwrap_or_default();
            node_from_export(name, path, &object)
        }
        ExportValue::Scalar(_) => Err(NodeTypeError::RepositoryError {
            message: format!("{} is not a node", path),
        }),
    }
}

fn node_from_export(name: &str, path: &str, object: &ExportObject) -> Result<RepositoryNode> {
    let mut node = RepositoryNode::new(name, path);
    let mut siblings: HashMap<&str, usize> = HashMap::new();

    for (key, value) in &object.entries {
        if key.starts_with(':') {
            continue;
        }
        match value {
            ExportValue::Object(child) => {
                let index = siblings.entry(key.as_str()).or_insert(0);
                *index += 1;
                let mut child_path = node.child(key.as_str()).path;
                if *index > 1 {
                    child_path = format!("{}[{}]", child_path, index);
                }
                node.children.push(node_from_export(key, &child_path, child)?);
            }
            ExportValue::Scalar(Value::Null) => {}
            ExportValue::Scalar(value) => {
                let property: PropertyValue = serde_json::from_value(value.clone())?;
                node.properties.insert(key.clone(), property);
            }
        }
    }

    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relative_segments() {
        assert_eq!(
            relative_segments("/", "/jcr:system/jcr:nodeTypes"),
            Some(vec!["jcr:system", "jcr:nodeTypes"])
        );
        assert_eq!(
            relative_segments("/jcr:system/jcr:nodeTypes", "/jcr:system/jcr:nodeTypes"),
            Some(vec![])
        );
        assert_eq!(
            relative_segments("/jcr:system/jcr:nodeTypes/", "/jcr:system/jcr:nodeTypes/cq:Page"),
            Some(vec!["cq:Page"])
        );
        assert_eq!(relative_segments("/jcr:system", "/content"), None);
        assert_eq!(relative_segments("/jcr:system", "/jcr:systemx"), None);
    }

    #[test]
    fn test_node_from_json() {
        let document = json!({
            "jcr:primaryType": "nt:nodeType",
            "jcr:nodeTypeName": "cq:Page",
            "jcr:isMixin": false,
            "jcr:supertypes": ["nt:hierarchyNode"],
            ":jcr:data": 42,
            "jcr:mixinTypes": null,
            "jcr:childNodeDefinition": {
                "jcr:primaryType": "nt:childNodeDefinition",
                "jcr:name": "jcr:content"
            }
        });

        let node = node_from_json("/jcr:system/jcr:nodeTypes/cq:Page", &document).unwrap();

        assert_eq!(node.name, "cq:Page");
        assert_eq!(node.properties.len(), 4);
        assert!(!node.has_property(":jcr:data"));
        assert!(!node.has_property("jcr:mixinTypes"));
        assert_eq!(node.children.len(), 1);
        assert_eq!(
            node.children[0].path,
            "/jcr:system/jcr:nodeTypes/cq:Page/jcr:childNodeDefinition"
        );
        assert_eq!(node.children[0].string("jcr:name").unwrap(), "jcr:content");
    }

    #[test]
    fn test_repeated_keys_become_siblings() {
        let export = r#"{
            "jcr:primaryType": "nt:nodeType",
            "jcr:nodeTypeName": "cq:Page",
            "jcr:propertyDefinition": { "jcr:name": "a" },
            "jcr:childNodeDefinition": { "jcr:name": "jcr:content" },
            "jcr:propertyDefinition": { "jcr:name": "b" },
            "jcr:propertyDefinition": { "jcr:name": "c" }
        }"#;
        let object = match serde_json::from_str::<ExportValue>(export).unwrap() {
            ExportValue::Object(object) => object,
            other => panic!("expected an object, got {:?}", other),
        };

        let node = node_from_export("cq:Page", "/jcr:system/jcr:nodeTypes/cq:Page", &object).unwrap();

        let names: Vec<&str> = node
            .children()
            .map(|child| child.string("jcr:name").unwrap())
            .collect();
        assert_eq!(names, vec!["a", "jcr:content", "b", "c"]);
        assert!(node.children().all(|child| !child.name.contains('[')));
        assert_eq!(
            node.children[2].path,
            "/jcr:system/jcr:nodeTypes/cq:Page/jcr:propertyDefinition[2]"
        );
        assert_eq!(
            node.children[3].path,
            "/jcr:system/jcr:nodeTypes/cq:Page/jcr:propertyDefinition[3]"
        );
        assert_eq!(
            node.children[1].path,
            "/jcr:system/jcr:nodeTypes/cq:Page/jcr:childNodeDefinition"
        );
    }

    #[test]
    fn test_closed_session_refuses_reads() {
        use std::io::Write;

        let mut export = tempfile::NamedTempFile::new().unwrap();
        export
            .write_all(br#"{"nt:base": {"jcr:nodeTypeName": "nt:base"}}"#)
            .unwrap();
        let repository = JsonRepository::new(export.path(), "/jcr:system/jcr:nodeTypes");

        tokio_test::block_on(async {
            let mut session = repository.login().await.unwrap();
            let root = session.node("/jcr:system/jcr:nodeTypes").await.unwrap();
            assert_eq!(root.children.len(), 1);
            assert_eq!(root.children[0].path, "/jcr:system/jcr:nodeTypes/nt:base");

            session.logout();
            assert!(matches!(
                session.node("/jcr:system/jcr:nodeTypes").await,
                Err(NodeTypeError::RepositoryError { .. })
            ));
        });
    }

    #[test]
    fn test_node_from_json_rejects_nested_objects_in_arrays() {
        let document = json!({ "weird": [{ "a": 1 }] });
        assert!(node_from_json("/x", &document).is_err());
    }
}
