use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lookup surface for previously recorded answers, keyed by concept uuid.
pub trait AnswerRecord {
    fn find_observation(&self, concept_uuid: &str) -> Option<&Observation>;
}

/// A recorded answer for one concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub concept_uuid: String,
    pub value: ObservationValue,
}

impl Observation {
    pub fn primitive(concept_uuid: impl Into<String>, value: Value) -> Self {
        Self {
            concept_uuid: concept_uuid.into(),
            value: ObservationValue::Primitive(value),
        }
    }

    pub fn question_group(concept_uuid: impl Into<String>, group: QuestionGroup) -> Self {
        Self {
            concept_uuid: concept_uuid.into(),
            value: ObservationValue::QuestionGroup(group),
        }
    }

    pub fn repeatable_question_group(
        concept_uuid: impl Into<String>,
        groups: RepeatableQuestionGroup,
    ) -> Self {
        Self {
            concept_uuid: concept_uuid.into(),
            value: ObservationValue::RepeatableQuestionGroup(groups),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ObservationValue {
    Primitive(Value),
    QuestionGroup(QuestionGroup),
    RepeatableQuestionGroup(RepeatableQuestionGroup),
}

impl ObservationValue {
    /// Plain JSON view of the recorded value. Groups become objects keyed by
    /// concept uuid, repetitions become arrays of those objects.
    pub fn as_json(&self) -> Value {
        match self {
            ObservationValue::Primitive(value) => value.clone(),
            ObservationValue::QuestionGroup(group) => group.as_json(),
            ObservationValue::RepeatableQuestionGroup(groups) => Value::Array(
                groups
                    .question_groups()
                    .map(QuestionGroup::as_json)
                    .collect(),
            ),
        }
    }

    pub fn as_question_group(&self) -> Option<&QuestionGroup> {
        match self {
            ObservationValue::QuestionGroup(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_repeatable_question_group(&self) -> Option<&RepeatableQuestionGroup> {
        match self {
            ObservationValue::RepeatableQuestionGroup(groups) => Some(groups),
            _ => None,
        }
    }
}

fn find_in<'a>(observations: &'a [Observation], concept_uuid: &str) -> Option<&'a Observation> {
    observations
        .iter()
        .find(|observation| observation.concept_uuid == concept_uuid)
}

/// Top-level answers of one response session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ObservationsHolder {
    pub observations: Vec<Observation>,
}

impl ObservationsHolder {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }
}

impl AnswerRecord for ObservationsHolder {
    fn find_observation(&self, concept_uuid: &str) -> Option<&Observation> {
        find_in(&self.observations, concept_uuid)
    }
}

/// Sub-answers recorded for one nested question group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct QuestionGroup {
    pub observations: Vec<Observation>,
}

impl QuestionGroup {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    pub fn as_json(&self) -> Value {
        let map = self
            .observations
            .iter()
            .map(|observation| (observation.concept_uuid.clone(), observation.value.as_json()))
            .collect::<Map<_, _>>();
        Value::Object(map)
    }
}

impl AnswerRecord for QuestionGroup {
    fn find_observation(&self, concept_uuid: &str) -> Option<&Observation> {
        find_in(&self.observations, concept_uuid)
    }
}

/// One [`QuestionGroup`] per recorded repetition, in repetition order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RepeatableQuestionGroup {
    pub groups: Vec<QuestionGroup>,
}

impl RepeatableQuestionGroup {
    pub fn new(groups: Vec<QuestionGroup>) -> Self {
        Self { groups }
    }

    pub fn question_groups(&self) -> std::slice::Iter<'_, QuestionGroup> {
        self.groups.iter()
    }
}

/// Why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    Mandatory,
    TypeMismatch,
    BelowMinimum,
    AboveMaximum,
    InvalidAnswer,
    InvalidDate,
    InvalidTime,
}

impl FailureCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCode::Mandatory => "mandatory",
            FailureCode::TypeMismatch => "type_mismatch",
            FailureCode::BelowMinimum => "below_minimum",
            FailureCode::AboveMaximum => "above_maximum",
            FailureCode::InvalidAnswer => "invalid_answer",
            FailureCode::InvalidDate => "invalid_date",
            FailureCode::InvalidTime => "invalid_time",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail { code: FailureCode, message: String },
}

/// Outcome of validating one field instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub form_identifier: String,
    pub outcome: Outcome,
    /// Repetition the field was evaluated under; unset outside question groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_group_index: Option<usize>,
}

impl ValidationResult {
    pub fn success(form_identifier: impl Into<String>) -> Self {
        Self {
            form_identifier: form_identifier.into(),
            outcome: Outcome::Pass,
            question_group_index: None,
        }
    }

    pub fn failure(
        form_identifier: impl Into<String>,
        code: FailureCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            form_identifier: form_identifier.into(),
            outcome: Outcome::Fail {
                code,
                message: message.into(),
            },
            question_group_index: None,
        }
    }

    pub fn with_question_group_index(mut self, index: Option<usize>) -> Self {
        self.question_group_index = index;
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Pass)
    }

    pub fn failure_code(&self) -> Option<FailureCode> {
        match &self.outcome {
            Outcome::Pass => None,
            Outcome::Fail { code, .. } => Some(*code),
        }
    }
}
