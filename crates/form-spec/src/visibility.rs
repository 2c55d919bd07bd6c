use std::collections::{BTreeSet, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::spec::concept::ConceptAnswer;
use crate::spec::element::{FormElement, by_display_order};
use crate::spec::group::FormElementGroup;

/// Visibility decision for one element instance, as produced by rule
/// evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormElementStatus {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_group_index: Option<usize>,
    pub visibility: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub answers_to_show: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub answers_to_skip: BTreeSet<String>,
}

impl FormElementStatus {
    pub fn new(uuid: impl Into<String>, visibility: bool) -> Self {
        Self {
            uuid: uuid.into(),
            visibility,
            ..Self::default()
        }
    }

    pub fn with_question_group_index(mut self, index: usize) -> Self {
        self.question_group_index = Some(index);
        self
    }

    pub fn with_answers_to_show<I, S>(mut self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answers_to_show = answers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_answers_to_skip<I, S>(mut self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answers_to_skip = answers.into_iter().map(Into::into).collect();
        self
    }
}

/// A form element as it applies to the current pass: the static definition
/// plus the repetition it belongs to and its answer-option filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormElementInstance<'a> {
    pub form_element: &'a FormElement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_group_index: Option<usize>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub answers_to_show: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub answers_to_skip: BTreeSet<String>,
}

impl FormElementInstance<'_> {
    /// An answer is offered unless skipped, and only if shown when a show
    /// list exists.
    pub fn allows_answer(&self, answer: &ConceptAnswer) -> bool {
        let listed = |set: &BTreeSet<String>| set.contains(&answer.uuid) || set.contains(&answer.name);
        (self.answers_to_show.is_empty() || listed(&self.answers_to_show))
            && !listed(&self.answers_to_skip)
    }
}

impl FormElementGroup {
    /// Builds the instances applicable for this pass, sorted by display
    /// order. Hidden and unknown elements are dropped, as is any repeat of an
    /// (element, repetition) pair.
    pub fn filter_elements(&self, statuses: &[FormElementStatus]) -> Vec<FormElementInstance<'_>> {
        let elements = self.get_form_elements();
        let mut seen = HashSet::new();
        let mut filtered = Vec::new();

        for status in statuses.iter().filter(|status| status.visibility) {
            let Some(element) = elements
                .iter()
                .copied()
                .find(|element| element.uuid == status.uuid)
            else {
                debug!(uuid = %status.uuid, group = %self.uuid, "status for unknown form element dropped");
                continue;
            };

            let question_group_index = if self.in_repeating_group(element) {
                status.question_group_index
            } else {
                None
            };
            if !seen.insert((element.uuid.as_str(), question_group_index)) {
                debug!(uuid = %status.uuid, ?question_group_index, "duplicate status dropped");
                continue;
            }

            filtered.push(FormElementInstance {
                form_element: element,
                question_group_index,
                answers_to_show: status.answers_to_show.clone(),
                answers_to_skip: status.answers_to_skip.clone(),
            });
        }

        filtered.sort_by(|left, right| by_display_order(left.form_element, right.form_element));
        filtered
    }
}
