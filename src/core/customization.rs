//! Fixes for node types whose repository definitions are incomplete or get in
//! the way of authoring.

use crate::core::definition::{PropertyDefinition, TypeDefinition};
use crate::core::schema::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Add a synthetic property, replacing any declared one of the same name.
    SetProperty {
        name: &'static str,
        default: &'static str,
    },
    RemoveProperty(&'static str),
    /// Add or replace a child slot suggestion.
    SuggestChild {
        slot: &'static str,
        type_name: &'static str,
    },
}

#[derive(Debug)]
pub struct CustomizationRule {
    pub type_name: &'static str,
    pub edits: &'static [Edit],
}

pub static RULES: &[CustomizationRule] = &[
    CustomizationRule {
        type_name: CQ_COMPONENT,
        edits: &[
            Edit::SetProperty {
                name: ALLOWED_PARENTS,
                default: "*/parsys",
            },
            Edit::SetProperty {
                name: COMPONENT_GROUP,
                default: "General",
            },
            // a blank cell name breaks component rendering
            Edit::RemoveProperty(CQ_CELLNAME),
            Edit::SuggestChild {
                slot: "dialog",
                type_name: CQ_DIALOG,
            },
            Edit::SuggestChild {
                slot: "design_dialog",
                type_name: CQ_DIALOG,
            },
        ],
    },
    CustomizationRule {
        type_name: CQ_DIALOG,
        edits: &[
            Edit::SetProperty {
                name: XTYPE,
                default: "dialog",
            },
            Edit::SuggestChild {
                slot: "items",
                type_name: CQ_TABPANEL,
            },
        ],
    },
    CustomizationRule {
        type_name: CQ_TEMPLATE,
        edits: &[
            Edit::SetProperty {
                name: ALLOWED_PATHS,
                default: "/content(/.*)?",
            },
            Edit::SuggestChild {
                slot: JCR_CONTENT,
                type_name: CQ_PAGECONTENT,
            },
        ],
    },
    CustomizationRule {
        type_name: CQ_WIDGETCOLLECTION,
        edits: &[Edit::SuggestChild {
            slot: "widget",
            type_name: CQ_WIDGET,
        }],
    },
];

pub fn rule_for(type_name: &str) -> Option<&'static CustomizationRule> {
    RULES.iter().find(|rule| rule.type_name == type_name)
}

impl Edit {
    pub fn apply(&self, definition: &mut TypeDefinition) {
        match *self {
            Edit::SetProperty { name, default } => {
                definition.set_property(name, PropertyDefinition::synthetic(default))
            }
            Edit::RemoveProperty(name) => {
                definition.remove_property(name);
            }
            Edit::SuggestChild { slot, type_name } => definition.suggest_child(slot, type_name),
        }
    }
}

/// Apply the rule for this type, if there is one. Returns whether anything was applied.
pub fn customize(definition: &mut TypeDefinition) -> bool {
    let Some(rule) = rule_for(definition.name()) else {
        return false;
    };

    tracing::debug!(
        "Customizing {} ({} edits)",
        definition.name(),
        rule.edits.len()
    );
    for edit in rule.edits {
        edit.apply(definition);
    }
    true
}
