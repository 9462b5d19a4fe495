//! Element and scenario validation
//!
//! Three layers:
//! - [`validate_fields`] checks each field's format and range, writing the
//!   message into the element's `err` slot
//! - [`validate_element`] runs the commit checks for Add/Update and stops at
//!   the first failure
//! - [`validate_scenario`] sweeps a whole tree and reports every issue

mod document;
mod field;

use std::collections::BTreeSet;

use netsim_model::NodeKind;

use crate::element::{Element, Field};
use crate::flatten::ElementTable;
use crate::mapper;

pub use document::{validate_scenario, validate_scenario_with, Issue};
pub use field::validate_fields;

/// Commit rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Some fields carry a pending error
    #[error("{count} field error(s), first on '{field}': {message}")]
    FieldErrors {
        count: usize,
        field: Field,
        message: String,
    },

    #[error("element type is missing")]
    MissingType,

    #[error("unknown element type: {0}")]
    UnknownType(String),

    #[error("element name is missing")]
    MissingName,

    #[error("element name already exists: {0}")]
    DuplicateName(String),

    #[error("parent element does not exist: '{0}'")]
    ParentNotFound(String),

    #[error("{kind} cannot be placed under '{parent}'")]
    InvalidParent { kind: NodeKind, parent: String },

    #[error("'{0}' sets a GPU count without a GPU type")]
    GpuTypeRequired(String),

    /// Two differently named elements expose the same external port
    #[error("external port conflict between '{element}' and '{other}': {ports}")]
    PortConflict {
        element: String,
        other: String,
        ports: String,
    },
}

/// Which commit is being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    Add,
    Update,
}

/// Commit checks for one element against the flat table
///
/// # Errors
/// The first failing check, in this order: pending field errors, type,
/// name, parent, GPU type, external ports
pub fn validate_element(
    element: &Element,
    table: &ElementTable,
    mode: CommitMode,
) -> Result<(), ValidationError> {
    if let Some((field, message)) = element.errors().next() {
        return Err(ValidationError::FieldErrors {
            count: element.error_count(),
            field,
            message: message.to_string(),
        });
    }

    let type_text = element.text(Field::Type);
    if type_text.trim().is_empty() {
        return Err(ValidationError::MissingType);
    }
    let kind = element
        .kind()
        .ok_or_else(|| ValidationError::UnknownType(type_text.trim().to_string()))?;

    let name = element.name().trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    if mode == CommitMode::Add && table.contains_name(&name) {
        return Err(ValidationError::DuplicateName(name));
    }

    if !matches!(kind, NodeKind::Scenario | NodeKind::DistantCloud) {
        let parent = element.parent().trim().to_string();
        if !table.contains_name(&parent) {
            return Err(ValidationError::ParentNotFound(parent));
        }
        if mode == CommitMode::Add {
            let accepted = table
                .get(&parent)
                .and_then(Element::kind)
                .is_some_and(|p| kind.accepts_parent(p));
            if !accepted {
                return Err(ValidationError::InvalidParent { kind, parent });
            }
        }
    }

    if element.int(Field::GpuCount).is_some() && element.opt_text(Field::GpuType).is_none() {
        return Err(ValidationError::GpuTypeRequired(name));
    }

    let ports = external_ports(element);
    if !ports.is_empty() {
        let id = element.id();
        for (other_name, other) in table.iter() {
            if other_name == name.as_str() || (!id.is_empty() && other.id() == id) {
                continue;
            }
            let shared: Vec<String> = ports
                .intersection(&external_ports(other))
                .map(ToString::to_string)
                .collect();
            if !shared.is_empty() {
                return Err(ValidationError::PortConflict {
                    element: name,
                    other: other_name.to_string(),
                    ports: shared.join(", "),
                });
            }
        }
    }

    Ok(())
}

/// External ports an element declares: service port plus ingress entries
#[must_use]
pub fn external_ports(element: &Element) -> BTreeSet<i64> {
    let mut ports: BTreeSet<i64> = mapper::parse_ingress(&element.text(Field::IngressSvcMap))
        .into_iter()
        .map(|m| i64::from(m.external_port))
        .collect();
    if let Some(port) = element.int(Field::ExtPort) {
        ports.insert(port);
    }
    ports
}
