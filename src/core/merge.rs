//! Supertype walk shared by property and child-suggestion merging.

use crate::core::definition::TypeDefinition;
use crate::core::registry::NodeTypes;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Something that went wrong in one branch of a supertype walk. The rest of the
/// walk still contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveIssue {
    /// `type_name` names a supertype that is not in the registry.
    MissingSupertype { type_name: String, supertype: String },
    /// Following `type_name -> supertype` leads back onto the current path.
    Cycle { type_name: String, supertype: String },
}

impl fmt::Display for ResolveIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveIssue::MissingSupertype {
                type_name,
                supertype,
            } => write!(f, "{}: unknown supertype {}", type_name, supertype),
            ResolveIssue::Cycle {
                type_name,
                supertype,
            } => write!(f, "{}: cyclic supertype {}", type_name, supertype),
        }
    }
}

/// A flattened view over a type and its supertypes.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<V> {
    pub entries: BTreeMap<String, V>,
    pub issues: Vec<ResolveIssue>,
}

impl<V> Default for Resolved<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            issues: Vec::new(),
        }
    }
}

impl<V> Resolved<V> {
    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every supertype resolved and no cycle was cut.
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_entries(self) -> BTreeMap<String, V> {
        self.entries
    }
}

struct Walk<'a, V, F> {
    types: &'a NodeTypes,
    own: F,
    path: Vec<&'a str>,
    visited: HashSet<&'a str>,
    resolved: Resolved<V>,
}

impl<'a, V, F> Walk<'a, V, F>
where
    V: Clone,
    F: Fn(&TypeDefinition) -> &HashMap<String, V>,
{
    fn visit(&mut self, definition: &'a TypeDefinition) {
        // entries already present come from a more specific type
        for (name, value) in (self.own)(definition) {
            self.resolved
                .entries
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }

        self.path.push(definition.name());
        self.visited.insert(definition.name());

        for supertype in definition.supertype_names() {
            if self.path.contains(&supertype.as_str()) {
                tracing::warn!(
                    "Cyclic type hierarchy: {} -> {} (path {})",
                    definition.name(),
                    supertype,
                    self.path.join(" -> ")
                );
                self.resolved.issues.push(ResolveIssue::Cycle {
                    type_name: definition.name().to_string(),
                    supertype: supertype.clone(),
                });
                continue;
            }

            // diamond: already merged through another branch
            if self.visited.contains(supertype.as_str()) {
                continue;
            }

            let types = self.types;
            match types.lookup(supertype) {
                Some(parent) => self.visit(parent),
                None => {
                    tracing::warn!("Could not get definition for {}", supertype);
                    self.resolved.issues.push(ResolveIssue::MissingSupertype {
                        type_name: definition.name().to_string(),
                        supertype: supertype.clone(),
                    });
                }
            }
        }

        self.path.pop();
    }
}

/// Depth-first walk from `root` through its supertypes, collecting `own(type)`
/// for each visited type. The first value seen for a key wins, so a type's own
/// entries beat its supertypes' and earlier supertypes beat later ones.
pub fn resolve<'a, V, F>(types: &'a NodeTypes, root: &'a TypeDefinition, own: F) -> Resolved<V>
where
    V: Clone,
    F: Fn(&TypeDefinition) -> &HashMap<String, V>,
{
    let mut walk = Walk {
        types,
        own,
        path: Vec::new(),
        visited: HashSet::new(),
        resolved: Resolved::default(),
    };
    walk.visit(root);
    walk.resolved
}
