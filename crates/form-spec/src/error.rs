use thiserror::Error;

use crate::association::EntityKind;

/// Schema wiring failures. These abort loading; they are never validation
/// outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssociationError {
    #[error("{child} not supported by {parent}")]
    Unsupported { child: EntityKind, parent: EntityKind },
    #[error("{child} refers to {parent} '{uuid}' which does not exist")]
    ParentNotFound {
        child: EntityKind,
        parent: EntityKind,
        uuid: String,
    },
}

impl AssociationError {
    /// Stable code reported alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AssociationError::Unsupported { .. } => "unsupported_association",
            AssociationError::ParentNotFound { child, parent, .. } => match (child, parent) {
                (EntityKind::FormElementGroup, EntityKind::Form) => "Association error 02",
                (EntityKind::FormElement, EntityKind::FormElementGroup) => "Association error 03",
                _ => "Association error",
            },
        }
    }
}
