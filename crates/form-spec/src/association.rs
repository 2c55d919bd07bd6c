use std::fmt;

use crate::spec::{Concept, FormElement, FormElementGroup};

/// Kinds of schema entity that take part in parent/child wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Form,
    FormElementGroup,
    FormElement,
    Concept,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Form => "Form",
            EntityKind::FormElementGroup => "FormElementGroup",
            EntityKind::FormElement => "FormElement",
            EntityKind::Concept => "Concept",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loaded schema entity handed to a parent for association.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    FormElementGroup(FormElementGroup),
    FormElement(FormElement),
    Concept(Concept),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::FormElementGroup(_) => EntityKind::FormElementGroup,
            Entity::FormElement(_) => EntityKind::FormElement,
            Entity::Concept(_) => EntityKind::Concept,
        }
    }
}

/// Replaces the child `same` identifies, or appends it.
pub(crate) fn merge_child<T>(children: &mut Vec<T>, child: T, same: impl Fn(&T, &T) -> bool) {
    match children.iter_mut().find(|existing| same(existing, &child)) {
        Some(existing) => *existing = child,
        None => children.push(child),
    }
}
