use std::cmp::Ordering;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::concept::Concept;

/// Element-level answer shape, carried by the element rather than the concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ElementType {
    SingleSelect,
    MultiSelect,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::SingleSelect => "SingleSelect",
            ElementType::MultiSelect => "MultiSelect",
        }
    }
}

/// How an element is resolved against the answer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single recorded value.
    Scalar,
    /// One nested record of sub-answers.
    QuestionGroup,
    /// Zero or more nested records, one per repetition.
    RepeatingQuestionGroup,
}

/// A single question inside a form element group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormElement {
    pub uuid: String,
    pub name: String,
    pub display_order: f64,
    #[serde(default)]
    pub mandatory: bool,
    pub concept: Concept,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,
    /// Uuid of the question-group element this element is nested under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_uuid: Option<String>,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub voided: bool,
}

impl FormElement {
    pub fn kind(&self) -> FieldKind {
        match (self.concept.is_question_group(), self.repeatable) {
            (true, true) => FieldKind::RepeatingQuestionGroup,
            (true, false) => FieldKind::QuestionGroup,
            (false, _) => FieldKind::Scalar,
        }
    }

    /// Matches by logical identity: the element uuid or its name.
    pub fn matches(&self, name_or_uuid: &str) -> bool {
        self.uuid == name_or_uuid || self.name == name_or_uuid
    }

    pub fn is_same(&self, other: &FormElement) -> bool {
        self.uuid == other.uuid
    }

    /// True when `type_name` names either the element type or the concept datatype.
    pub fn is_of_type(&self, type_name: &str) -> bool {
        self.concept.datatype.as_str() == type_name
            || self
                .element_type
                .is_some_and(|element_type| element_type.as_str() == type_name)
    }
}

pub(crate) fn by_display_order(left: &FormElement, right: &FormElement) -> Ordering {
    left.display_order.total_cmp(&right.display_order)
}
