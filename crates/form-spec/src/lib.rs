#![allow(missing_docs)]

pub mod answers;
pub mod association;
pub mod error;
pub mod spec;
pub mod validate;
pub mod visibility;

pub use answers::{
    AnswerRecord, FailureCode, Observation, ObservationValue, ObservationsHolder, Outcome,
    QuestionGroup, RepeatableQuestionGroup, ValidationResult,
};
pub use association::{Entity, EntityKind};
pub use error::AssociationError;
pub use spec::{
    Concept, ConceptAnswer, Datatype, ElementType, FieldKind, Form, FormElement, FormElementGroup,
};
pub use visibility::{FormElementInstance, FormElementStatus};

/// JSON schema of a form definition.
pub fn form_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(Form)).unwrap_or(serde_json::Value::Null)
}

/// JSON schema of the observations accepted as an answer record.
pub fn observations_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(ObservationsHolder))
        .unwrap_or(serde_json::Value::Null)
}
