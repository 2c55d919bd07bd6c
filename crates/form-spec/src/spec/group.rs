use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::association::{Entity, EntityKind, merge_child};
use crate::error::AssociationError;
use crate::spec::element::{FieldKind, FormElement, by_display_order};
use crate::spec::form::Form;

/// An ordered page of form elements within a form.
///
/// The serialized shape is the group's wire/storage projection: `voided` and
/// `rule` are read but never written, unset optional keys are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormElementGroup {
    pub uuid: String,
    pub name: String,
    pub display_order: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default)]
    pub form_elements: Vec<FormElement>,
    /// Key of the owning form.
    #[serde(rename = "formUUID", default)]
    pub form_uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stay_time: Option<i64>,
    #[serde(default)]
    pub timed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_colour: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_colour: Option<String>,
    #[serde(default, skip_serializing)]
    pub voided: bool,
    #[serde(default, skip_serializing)]
    pub rule: Option<String>,
}

impl FormElementGroup {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>, display_order: f64) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            display_order,
            display: None,
            form_elements: Vec::new(),
            form_uuid: String::new(),
            start_time: None,
            stay_time: None,
            timed: false,
            text_colour: None,
            background_colour: None,
            voided: false,
            rule: None,
        }
    }

    /// Non-voided elements sorted by display order. Every other read goes
    /// through this list.
    pub fn get_form_elements(&self) -> Vec<&FormElement> {
        let mut elements = self
            .form_elements
            .iter()
            .filter(|element| !element.voided)
            .collect::<Vec<_>>();
        elements.sort_by(|left, right| by_display_order(left, right));
        elements
    }

    pub fn get_form_elements_of_type(&self, type_name: &str) -> Vec<&FormElement> {
        self.get_form_elements()
            .into_iter()
            .filter(|element| element.is_of_type(type_name))
            .collect()
    }

    pub fn form_element_ids(&self) -> Vec<&str> {
        self.get_form_elements()
            .into_iter()
            .map(|element| element.uuid.as_str())
            .collect()
    }

    pub fn find_form_element(&self, uuid: &str) -> Option<&FormElement> {
        self.form_elements
            .iter()
            .find(|element| !element.voided && element.uuid == uuid)
    }

    /// True when any question group enclosing the element is repeatable.
    pub fn in_repeating_group(&self, element: &FormElement) -> bool {
        let mut parent_uuid = element.group_uuid.as_deref();
        // Bounded by the element count so a malformed parent cycle terminates.
        for _ in 0..self.form_elements.len() {
            let Some(parent) = parent_uuid.and_then(|uuid| self.find_form_element(uuid)) else {
                return false;
            };
            if parent.kind() == FieldKind::RepeatingQuestionGroup {
                return true;
            }
            parent_uuid = parent.group_uuid.as_deref();
        }
        false
    }

    pub fn add_form_element(&mut self, form_element: FormElement) {
        self.form_elements.push(form_element);
    }

    /// Drops every element matching `name`. Voided elements are dropped too.
    pub fn remove_form_element(&mut self, name: &str) -> &mut Self {
        self.form_elements
            .retain(|element| !element.voided && !element.matches(name));
        self.form_elements.sort_by(by_display_order);
        self
    }

    /// Wires a child entity into the group. Only form elements are accepted;
    /// an element with an existing uuid replaces the stored one.
    pub fn associate_child(&mut self, child: Entity) -> Result<(), AssociationError> {
        match child {
            Entity::FormElement(element) => {
                merge_child(&mut self.form_elements, element, |existing, new| {
                    existing.uuid == new.uuid
                });
                Ok(())
            }
            other => Err(AssociationError::Unsupported {
                child: other.kind(),
                parent: EntityKind::FormElementGroup,
            }),
        }
    }

    pub fn next<'f>(&self, form: &'f Form) -> Option<&'f FormElementGroup> {
        form.next_group_after(self.display_order)
    }

    pub fn previous<'f>(&self, form: &'f Form) -> Option<&'f FormElementGroup> {
        form.previous_group_before(self.display_order)
    }

    /// Group ranks are 1-based, so only rank `1` is first.
    pub fn is_first(&self) -> bool {
        self.display_order == 1.0
    }

    /// Holds for the group sharing the last group's rank. Ranks must be
    /// unique within the form.
    pub fn is_last(&self, form: &Form) -> bool {
        form.last_group()
            .is_some_and(|last| last.display_order == self.display_order)
    }

    pub fn display_text(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// Presentation style derived from the configured colours.
    pub fn styles(&self) -> Map<String, Value> {
        let mut style = Map::new();
        if let Some(colour) = non_empty(&self.background_colour) {
            style.insert("backgroundColor".into(), Value::String(colour.into()));
        }
        if let Some(colour) = non_empty(&self.text_colour) {
            style.insert("color".into(), Value::String(colour.into()));
        }
        if !style.is_empty() {
            style.insert("paddingHorizontal".into(), Value::from(5));
        }
        style
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}
