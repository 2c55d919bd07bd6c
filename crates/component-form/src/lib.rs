use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use form_spec::{
    AssociationError, Form, FormElement, FormElementGroup, FormElementStatus, ObservationsHolder,
    ValidationResult, form_schema, observations_schema,
};

const DEFAULT_FORM: &str = include_str!("../../form-spec/tests/fixtures/household_survey.json");

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse {0}: {1}")]
    InputParse(&'static str, #[source] serde_json::Error),
    #[error("form element group '{0}' is not available")]
    GroupUnavailable(String),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error("{message} ({code})")]
    Association { message: String, code: &'static str },
}

impl From<AssociationError> for ComponentError {
    fn from(error: AssociationError) -> Self {
        ComponentError::Association {
            message: error.to_string(),
            code: error.code(),
        }
    }
}

/// A form element delivered separately from its group.
#[derive(Debug, Deserialize)]
struct ElementResource {
    #[serde(rename = "formElementGroupUUID")]
    group_uuid: String,
    #[serde(flatten)]
    element: FormElement,
}

#[derive(Debug, Deserialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    form_json: Option<String>,
    #[serde(default)]
    elements: Vec<ElementResource>,
}

fn load_form(config_json: &str) -> Result<Form, ComponentError> {
    let config = if config_json.trim().is_empty() {
        ComponentConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)?
    };

    let form_json = config.form_json.as_deref().unwrap_or(DEFAULT_FORM);
    let mut form: Form = serde_json::from_str(form_json).map_err(ComponentError::ConfigParse)?;
    form.link_groups()?;
    let extra_elements = config.elements.len();
    for resource in config.elements {
        form.associate_element(&resource.group_uuid, resource.element)?;
    }
    debug!(
        form = %form.uuid,
        groups = form.form_element_groups.len(),
        extra_elements,
        "loaded form"
    );
    Ok(form)
}

fn parse_input<T: DeserializeOwned + Default>(
    what: &'static str,
    input_json: &str,
) -> Result<T, ComponentError> {
    if input_json.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(input_json).map_err(|error| ComponentError::InputParse(what, error))
}

fn find_group<'f>(form: &'f Form, group_uuid: &str) -> Result<&'f FormElementGroup, ComponentError> {
    form.group(group_uuid)
        .ok_or_else(|| ComponentError::GroupUnavailable(group_uuid.to_string()))
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn validation_report(results: &[ValidationResult]) -> Result<Value, ComponentError> {
    let results_value = serde_json::to_value(results).map_err(ComponentError::JsonEncode)?;
    Ok(json!({
        "valid": results.iter().all(ValidationResult::is_success),
        "results": results_value,
    }))
}

pub fn describe(config_json: &str) -> String {
    respond(
        load_form(config_json)
            .and_then(|form| serde_json::to_value(form).map_err(ComponentError::JsonEncode)),
    )
}

pub fn describe_group(group_uuid: &str, config_json: &str) -> String {
    respond(load_form(config_json).and_then(|form| {
        let group = find_group(&form, group_uuid)?;
        serde_json::to_value(group).map_err(ComponentError::JsonEncode)
    }))
}

pub fn navigation(group_uuid: &str, config_json: &str) -> String {
    respond(load_form(config_json).and_then(|form| {
        let group = find_group(&form, group_uuid)?;
        Ok(json!({
            "group": group.uuid,
            "first": group.is_first(),
            "last": group.is_last(&form),
            "next": group.next(&form).map(|next| next.uuid.clone()),
            "previous": group.previous(&form).map(|previous| previous.uuid.clone()),
            "styles": group.styles(),
        }))
    }))
}

pub fn filter_elements(group_uuid: &str, config_json: &str, statuses_json: &str) -> String {
    respond(load_form(config_json).and_then(|form| {
        let group = find_group(&form, group_uuid)?;
        let statuses: Vec<FormElementStatus> = parse_input("statuses", statuses_json)?;
        let filtered = group.filter_elements(&statuses);
        serde_json::to_value(&filtered).map_err(ComponentError::JsonEncode)
    }))
}

pub fn validate_group(
    group_uuid: &str,
    config_json: &str,
    statuses_json: &str,
    observations_json: &str,
) -> String {
    respond(load_form(config_json).and_then(|form| {
        let group = find_group(&form, group_uuid)?;
        let statuses: Vec<FormElementStatus> = parse_input("statuses", statuses_json)?;
        let observations: ObservationsHolder = parse_input("observations", observations_json)?;
        let filtered = group.filter_elements(&statuses);
        validation_report(&group.validate(&observations, &filtered))
    }))
}

pub fn validate_form(config_json: &str, statuses_json: &str, observations_json: &str) -> String {
    respond(load_form(config_json).and_then(|form| {
        let statuses: Vec<FormElementStatus> = parse_input("statuses", statuses_json)?;
        let observations: ObservationsHolder = parse_input("observations", observations_json)?;
        validation_report(&form.validate(&observations, &statuses))
    }))
}

pub fn definition_schema() -> String {
    respond(Ok(form_schema()))
}

pub fn answer_schema() -> String {
    respond(Ok(observations_schema()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn statuses(uuids: &[&str]) -> String {
        let statuses = uuids
            .iter()
            .map(|uuid| json!({ "uuid": uuid, "visibility": true }))
            .collect::<Vec<_>>();
        Value::Array(statuses).to_string()
    }

    #[test]
    fn describe_returns_default_form() {
        let payload = describe("");
        let form: Value = serde_json::from_str(&payload).expect("valid json");
        assert_eq!(form["uuid"], "form-household");
    }

    #[test]
    fn describe_group_uses_wire_projection() {
        let payload = describe_group("feg-basic", "");
        let group: Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(group["formUUID"], "form-household");
        assert!(group.get("voided").is_none());
    }

    #[test]
    fn unknown_group_is_reported() {
        let payload = describe_group("feg-missing", "");
        let parsed: Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(
            parsed["error"],
            "form element group 'feg-missing' is not available"
        );
    }

    #[test]
    fn navigation_reports_neighbours() {
        let payload = navigation("feg-household", "");
        let parsed: Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(parsed["first"], false);
        assert_eq!(parsed["last"], false);
        assert_eq!(parsed["next"], "feg-follow-up");
        assert_eq!(parsed["previous"], "feg-basic");
    }

    #[test]
    fn filter_elements_returns_sorted_instances() {
        let payload = filter_elements("feg-basic", "", &statuses(&["fe-dob", "fe-name", "nope"]));
        let parsed: Value = serde_json::from_str(&payload).expect("json");
        let instances = parsed.as_array().expect("array");
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0]["formElement"]["uuid"], "fe-name");
        assert_eq!(instances[1]["formElement"]["uuid"], "fe-dob");
    }

    #[test]
    fn validate_group_reports_missing_mandatory_answers() {
        let payload = validate_group("feg-basic", "", &statuses(&["fe-name", "fe-age"]), "");
        let parsed: Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(parsed["valid"], false);
        assert_eq!(parsed["results"][0]["outcome"]["code"], "mandatory");
        assert_eq!(parsed["results"][1]["outcome"]["status"], "pass");
    }

    #[test]
    fn validate_group_expands_repetitions() {
        let observations = json!([
            {
                "conceptUuid": "c-members",
                "value": {
                    "repeatableQuestionGroup": [
                        [
                            { "conceptUuid": "c-member-name", "value": { "primitive": "Asha" } },
                            { "conceptUuid": "c-member-age", "value": { "primitive": 31 } }
                        ],
                        [
                            { "conceptUuid": "c-member-name", "value": { "primitive": "Ravi" } },
                            { "conceptUuid": "c-member-age", "value": { "primitive": 7 } }
                        ]
                    ]
                }
            }
        ]);
        let payload = validate_group(
            "feg-household",
            "",
            &statuses(&["fe-members", "fe-member-name", "fe-member-age"]),
            &observations.to_string(),
        );
        let parsed: Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(parsed["valid"], true);
        let results = parsed["results"].as_array().expect("results");
        assert_eq!(results.len(), 5);
        assert_eq!(results[4]["questionGroupIndex"], 1);
    }

    #[test]
    fn validate_form_spans_groups() {
        let observations = json!([
            { "conceptUuid": "c-name", "value": { "primitive": "Lakshmi" } },
            { "conceptUuid": "c-visit-time", "value": { "primitive": "nine" } }
        ]);
        let payload = validate_form(
            "",
            &statuses(&["fe-name", "fe-visit-time"]),
            &observations.to_string(),
        );
        let parsed: Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(parsed["valid"], false);
        assert_eq!(parsed["results"][0]["outcome"]["status"], "pass");
        assert_eq!(parsed["results"][1]["outcome"]["code"], "invalid_time");
    }

    #[test]
    fn bad_statuses_are_reported() {
        let payload = validate_group("feg-basic", "", "{not json", "");
        let parsed: Value = serde_json::from_str(&payload).expect("json");
        assert!(
            parsed["error"]
                .as_str()
                .unwrap_or_default()
                .starts_with("failed to parse statuses")
        );
    }

    #[test]
    fn extra_elements_are_associated_with_their_group() {
        let config = json!({
            "elements": [
                {
                    "formElementGroupUUID": "feg-follow-up",
                    "uuid": "fe-remarks",
                    "name": "Remarks",
                    "displayOrder": 3,
                    "mandatory": true,
                    "concept": { "uuid": "c-remarks", "name": "Remarks", "datatype": "Notes" }
                }
            ]
        });
        let payload = validate_group(
            "feg-follow-up",
            &config.to_string(),
            &statuses(&["fe-remarks"]),
            "",
        );
        let parsed: Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(parsed["results"][0]["formIdentifier"], "fe-remarks");
        assert_eq!(parsed["results"][0]["outcome"]["code"], "mandatory");
    }

    #[test]
    fn elements_for_unknown_groups_abort_loading() {
        let config = json!({
            "elements": [
                {
                    "formElementGroupUUID": "feg-missing",
                    "uuid": "fe-remarks",
                    "name": "Remarks",
                    "displayOrder": 1,
                    "concept": { "uuid": "c-remarks", "name": "Remarks", "datatype": "Notes" }
                }
            ]
        });
        let payload = describe(&config.to_string());
        let parsed: Value = serde_json::from_str(&payload).expect("json");
        let error = parsed["error"].as_str().unwrap_or_default();
        assert!(error.contains("feg-missing"));
        assert!(error.ends_with("(Association error 03)"));
    }

    #[test]
    fn groups_without_form_key_project_the_owning_form() {
        let form = json!({
            "uuid": "form-1",
            "name": "Intake",
            "formElementGroups": [{ "uuid": "g1", "name": "Page", "displayOrder": 1 }]
        });
        let config = json!({ "form_json": form.to_string() });

        let payload = describe_group("g1", &config.to_string());
        let group: Value = serde_json::from_str(&payload).expect("json");

        assert_eq!(group["formUUID"], "form-1");
    }

    #[test]
    fn schemas_are_exposed() {
        let definition: Value = serde_json::from_str(&definition_schema()).expect("json");
        let answers: Value = serde_json::from_str(&answer_schema()).expect("json");
        assert_eq!(definition["title"], "Form");
        assert_eq!(answers["type"], "array");
    }
}
