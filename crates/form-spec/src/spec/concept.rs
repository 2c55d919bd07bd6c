use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Semantic datatype of the value a concept captures.
///
/// Media, location, subject and similar datatypes are captured by dedicated
/// widgets; their values are accepted as recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Datatype {
    Numeric,
    Text,
    Notes,
    Coded,
    Date,
    DateTime,
    Time,
    Duration,
    Id,
    #[serde(rename = "NA")]
    Na,
    QuestionGroup,
    Image,
    ImageV2,
    Video,
    Audio,
    File,
    Signature,
    Subject,
    Encounter,
    Location,
    PhoneNumber,
    GroupAffiliation,
}

impl Datatype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::Numeric => "Numeric",
            Datatype::Text => "Text",
            Datatype::Notes => "Notes",
            Datatype::Coded => "Coded",
            Datatype::Date => "Date",
            Datatype::DateTime => "DateTime",
            Datatype::Time => "Time",
            Datatype::Duration => "Duration",
            Datatype::Id => "Id",
            Datatype::Na => "NA",
            Datatype::QuestionGroup => "QuestionGroup",
            Datatype::Image => "Image",
            Datatype::ImageV2 => "ImageV2",
            Datatype::Video => "Video",
            Datatype::Audio => "Audio",
            Datatype::File => "File",
            Datatype::Signature => "Signature",
            Datatype::Subject => "Subject",
            Datatype::Encounter => "Encounter",
            Datatype::Location => "Location",
            Datatype::PhoneNumber => "PhoneNumber",
            Datatype::GroupAffiliation => "GroupAffiliation",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One permitted answer of a coded concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConceptAnswer {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub voided: bool,
}

impl ConceptAnswer {
    /// Answers are addressed either by uuid or by name.
    pub fn matches(&self, key: &str) -> bool {
        self.uuid == key || self.name == key
    }
}

/// The question concept a form element points at. Answers are recorded
/// against the concept uuid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub uuid: String,
    pub name: String,
    pub datatype: Datatype,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<ConceptAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_absolute: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_absolute: Option<f64>,
}

impl Concept {
    pub fn is_question_group(&self) -> bool {
        self.datatype == Datatype::QuestionGroup
    }

    /// Finds a non-voided answer by uuid or name.
    pub fn find_answer(&self, key: &str) -> Option<&ConceptAnswer> {
        self.answers
            .iter()
            .find(|answer| !answer.voided && answer.matches(key))
    }
}
