use crate::model::{generate_id, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named parameter definition that one or more methods link to.
///
/// Whether it is shared is never stored here; ask the linker for the live
/// link count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: Id,
    pub name: String,
    /// Form-encoded text, never blank when present.
    pub default_value: Option<String>,
    pub required: bool,
    /// Insertion ordered, no duplicates, no blanks.
    pub constrained_options: Vec<String>,

    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

impl Parameter {
    /// Fresh definition with empty default value and constraints.
    pub fn new(name: &str, created_by: &str) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            name: name.to_string(),
            default_value: None,
            required: false,
            constrained_options: Vec::new(),
            created_by: created_by.to_string(),
            created_at: now,
            updated_by: created_by.to_string(),
            updated_at: now,
        }
    }

    pub fn has_constraint(&self, value: &str) -> bool {
        self.constrained_options.iter().any(|c| c == value)
    }

    pub fn requirement_label(&self) -> &'static str {
        if self.required {
            "mandatory"
        } else {
            "optional"
        }
    }

    /// Record who changed the definition last.
    pub fn touch(&mut self, updated_by: &str) {
        self.updated_by = updated_by.to_string();
        self.updated_at = Utc::now();
    }
}

/// A parameter as seen from one method, with its derived sharing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterUsage {
    #[serde(flatten)]
    pub parameter: Parameter,
    pub link_count: usize,
    pub shared: bool,
}

impl ParameterUsage {
    pub fn new(parameter: Parameter, link_count: usize) -> Self {
        Self {
            parameter,
            link_count,
            shared: link_count > 1,
        }
    }
}
