use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::answers::{
    AnswerRecord, FailureCode, QuestionGroup, RepeatableQuestionGroup, ValidationResult,
};
use crate::spec::concept::Datatype;
use crate::spec::element::{ElementType, FieldKind, FormElement};
use crate::spec::form::Form;
use crate::spec::group::FormElementGroup;
use crate::visibility::{FormElementInstance, FormElementStatus};

static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("invalid date regex"));
static DATE_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:\d{2})?$")
        .expect("invalid date-time regex")
});
static TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}(:\d{2})?$").expect("invalid time regex"));

impl FormElement {
    /// Validates a recorded value, `None` meaning unanswered.
    pub fn validate(&self, value: Option<&Value>) -> ValidationResult {
        validate_value(self, value, None)
    }
}

impl FormElementInstance<'_> {
    /// Like [`FormElement::validate`], restricted to the answers this
    /// instance offers.
    pub fn validate(&self, value: Option<&Value>) -> ValidationResult {
        validate_value(self.form_element, value, Some(self))
    }
}

impl FormElementGroup {
    /// Validates the instances produced by [`FormElementGroup::filter_elements`]
    /// against `record`, in order. Group fields are followed by their
    /// children, once per recorded repetition.
    pub fn validate(
        &self,
        record: &dyn AnswerRecord,
        filtered: &[FormElementInstance<'_>],
    ) -> Vec<ValidationResult> {
        let mut results = Vec::new();
        validate_scope(record, filtered, None, None, &mut results);
        debug!(
            group = %self.uuid,
            instances = filtered.len(),
            results = results.len(),
            failures = results.iter().filter(|result| !result.is_success()).count(),
            "validated form element group"
        );
        results
    }
}

impl Form {
    /// Filters and validates every group with one set of statuses.
    pub fn validate(
        &self,
        record: &dyn AnswerRecord,
        statuses: &[FormElementStatus],
    ) -> Vec<ValidationResult> {
        self.get_form_element_groups()
            .into_iter()
            .flat_map(|group| {
                let filtered = group.filter_elements(statuses);
                group.validate(record, &filtered)
            })
            .collect()
    }
}

fn validate_scope(
    record: &dyn AnswerRecord,
    filtered: &[FormElementInstance<'_>],
    group_uuid: Option<&str>,
    index: Option<usize>,
    results: &mut Vec<ValidationResult>,
) {
    let in_scope = filtered.iter().filter(|instance| {
        instance.form_element.group_uuid.as_deref() == group_uuid
            && (instance.question_group_index.is_none() || instance.question_group_index == index)
    });

    for instance in in_scope {
        let element = instance.form_element;
        let observation = record.find_observation(&element.concept.uuid);
        let value = observation.map(|observation| observation.value.as_json());
        push_result(results, instance.validate(value.as_ref()), index);

        match element.kind() {
            FieldKind::Scalar => {}
            FieldKind::QuestionGroup => {
                let empty = QuestionGroup::default();
                let group = observation
                    .and_then(|observation| observation.value.as_question_group())
                    .unwrap_or(&empty);
                // Inside a repetition the enclosing index carries through.
                let index = index.or(Some(0));
                validate_scope(group, filtered, Some(&element.uuid), index, results);
            }
            FieldKind::RepeatingQuestionGroup => {
                let empty = RepeatableQuestionGroup::default();
                let repeatable = observation
                    .and_then(|observation| observation.value.as_repeatable_question_group())
                    .unwrap_or(&empty);
                for (repetition, group) in repeatable.question_groups().enumerate() {
                    validate_scope(group, filtered, Some(&element.uuid), Some(repetition), results);
                }
            }
        }
    }
}

fn push_result(results: &mut Vec<ValidationResult>, result: ValidationResult, index: Option<usize>) {
    let result = result.with_question_group_index(index);
    trace!(
        form_element = %result.form_identifier,
        question_group_index = ?result.question_group_index,
        success = result.is_success(),
        "form element validated"
    );
    results.push(result);
}

fn validate_value(
    element: &FormElement,
    value: Option<&Value>,
    instance: Option<&FormElementInstance<'_>>,
) -> ValidationResult {
    match value.filter(|value| !is_empty_value(value)) {
        None if element.mandatory => base_error(
            element,
            FailureCode::Mandatory,
            format!("{} is mandatory", element.name),
        ),
        None => ValidationResult::success(element.uuid.clone()),
        Some(value) => check_value(element, value, instance)
            .unwrap_or_else(|| ValidationResult::success(element.uuid.clone())),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn check_value(
    element: &FormElement,
    value: &Value,
    instance: Option<&FormElementInstance<'_>>,
) -> Option<ValidationResult> {
    let concept = &element.concept;
    match concept.datatype {
        Datatype::Numeric => {
            let Some(number) = value.as_f64() else {
                return Some(type_mismatch(element, "a number"));
            };
            if let Some(low) = concept.low_absolute
                && number < low
            {
                return Some(base_error(
                    element,
                    FailureCode::BelowMinimum,
                    format!("value {number} is below the minimum {low}"),
                ));
            }
            if let Some(high) = concept.high_absolute
                && number > high
            {
                return Some(base_error(
                    element,
                    FailureCode::AboveMaximum,
                    format!("value {number} is above the maximum {high}"),
                ));
            }
            None
        }
        Datatype::Text | Datatype::Notes | Datatype::Id => {
            (!value.is_string()).then(|| type_mismatch(element, "text"))
        }
        Datatype::Coded => check_coded(element, value, instance),
        Datatype::Date => check_pattern(
            element,
            value,
            &DATE_REGEX,
            FailureCode::InvalidDate,
            "a YYYY-MM-DD date",
        ),
        Datatype::DateTime => check_pattern(
            element,
            value,
            &DATE_TIME_REGEX,
            FailureCode::InvalidDate,
            "an RFC 3339 date-time",
        ),
        Datatype::Time => check_pattern(
            element,
            value,
            &TIME_REGEX,
            FailureCode::InvalidTime,
            "an HH:MM time",
        ),
        Datatype::QuestionGroup => {
            (!value.is_object() && !value.is_array()).then(|| type_mismatch(element, "a group"))
        }
        Datatype::Na
        | Datatype::Duration
        | Datatype::Image
        | Datatype::ImageV2
        | Datatype::Video
        | Datatype::Audio
        | Datatype::File
        | Datatype::Signature
        | Datatype::Subject
        | Datatype::Encounter
        | Datatype::Location
        | Datatype::PhoneNumber
        | Datatype::GroupAffiliation => None,
    }
}

fn check_coded(
    element: &FormElement,
    value: &Value,
    instance: Option<&FormElementInstance<'_>>,
) -> Option<ValidationResult> {
    let keys = match (element.element_type, value) {
        (Some(ElementType::SingleSelect) | None, Value::String(key)) => vec![key.as_str()],
        (Some(ElementType::MultiSelect) | None, Value::Array(items)) => {
            let keys = items.iter().filter_map(Value::as_str).collect::<Vec<_>>();
            if keys.len() != items.len() {
                return Some(type_mismatch(element, "a list of answers"));
            }
            keys
        }
        (Some(ElementType::MultiSelect), _) => {
            return Some(type_mismatch(element, "a list of answers"));
        }
        _ => return Some(type_mismatch(element, "a single answer")),
    };

    keys.into_iter().find_map(|key| {
        let permitted = element
            .concept
            .find_answer(key)
            .is_some_and(|answer| instance.is_none_or(|instance| instance.allows_answer(answer)));
        (!permitted).then(|| {
            base_error(
                element,
                FailureCode::InvalidAnswer,
                format!("'{key}' is not a permitted answer"),
            )
        })
    })
}

fn check_pattern(
    element: &FormElement,
    value: &Value,
    regex: &Regex,
    code: FailureCode,
    expected: &str,
) -> Option<ValidationResult> {
    let Some(text) = value.as_str() else {
        return Some(type_mismatch(element, expected));
    };
    (!regex.is_match(text)).then(|| base_error(element, code, format!("expected {expected}, got '{text}'")))
}

fn type_mismatch(element: &FormElement, expected: &str) -> ValidationResult {
    base_error(
        element,
        FailureCode::TypeMismatch,
        format!("{} expects {expected}", element.name),
    )
}

fn base_error(element: &FormElement, code: FailureCode, message: String) -> ValidationResult {
    ValidationResult::failure(element.uuid.clone(), code, message)
}
