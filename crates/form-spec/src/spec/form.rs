use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::association::{Entity, EntityKind, merge_child};
use crate::error::AssociationError;
use crate::spec::element::FormElement;
use crate::spec::group::FormElementGroup;

/// A form owns its element groups; groups refer back through `formUUID`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub form_element_groups: Vec<FormElementGroup>,
}

impl Form {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            form_element_groups: Vec::new(),
        }
    }

    /// Non-voided groups sorted by display order.
    pub fn get_form_element_groups(&self) -> Vec<&FormElementGroup> {
        let mut groups = self
            .form_element_groups
            .iter()
            .filter(|group| !group.voided)
            .collect::<Vec<_>>();
        groups.sort_by(|left, right| left.display_order.total_cmp(&right.display_order));
        groups
    }

    pub fn group(&self, uuid: &str) -> Option<&FormElementGroup> {
        self.form_element_groups
            .iter()
            .find(|group| !group.voided && group.uuid == uuid)
    }

    pub fn first_group(&self) -> Option<&FormElementGroup> {
        self.get_form_element_groups().into_iter().next()
    }

    pub fn last_group(&self) -> Option<&FormElementGroup> {
        self.get_form_element_groups().into_iter().next_back()
    }

    pub fn next_group_after(&self, display_order: f64) -> Option<&FormElementGroup> {
        self.get_form_element_groups()
            .into_iter()
            .find(|group| group.display_order > display_order)
    }

    pub fn previous_group_before(&self, display_order: f64) -> Option<&FormElementGroup> {
        self.get_form_element_groups()
            .into_iter()
            .rev()
            .find(|group| group.display_order < display_order)
    }

    /// Wires a group into the form, stamping its `formUUID`.
    pub fn associate_child(&mut self, child: Entity) -> Result<(), AssociationError> {
        match child {
            Entity::FormElementGroup(mut group) => {
                group.form_uuid = self.uuid.clone();
                merge_child(&mut self.form_element_groups, group, |existing, new| {
                    existing.uuid == new.uuid
                });
                Ok(())
            }
            other => Err(AssociationError::Unsupported {
                child: other.kind(),
                parent: EntityKind::Form,
            }),
        }
    }

    /// Points every group's `formUUID` at this form after loading. A group
    /// that already names a different form is rejected.
    pub fn link_groups(&mut self) -> Result<(), AssociationError> {
        for group in &mut self.form_element_groups {
            if group.form_uuid.is_empty() {
                group.form_uuid = self.uuid.clone();
            } else if group.form_uuid != self.uuid {
                return Err(AssociationError::ParentNotFound {
                    child: EntityKind::FormElementGroup,
                    parent: EntityKind::Form,
                    uuid: group.form_uuid.clone(),
                });
            }
        }
        Ok(())
    }

    /// Routes an element to the group it names.
    pub fn associate_element(
        &mut self,
        group_uuid: &str,
        element: FormElement,
    ) -> Result<(), AssociationError> {
        let group = self
            .form_element_groups
            .iter_mut()
            .find(|group| group.uuid == group_uuid)
            .ok_or_else(|| AssociationError::ParentNotFound {
                child: EntityKind::FormElement,
                parent: EntityKind::FormElementGroup,
                uuid: group_uuid.to_string(),
            })?;
        group.associate_child(Entity::FormElement(element))
    }
}
