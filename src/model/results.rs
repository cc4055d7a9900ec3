use crate::model::{Id, Parameter};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Whether a parameter should be dedicated to one method or shared by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharingMode {
    Local,
    Global,
}

impl SharingMode {
    pub fn from_make_local(make_local: bool) -> Self {
        if make_local {
            SharingMode::Local
        } else {
            SharingMode::Global
        }
    }

    pub fn is_local(self) -> bool {
        self == SharingMode::Local
    }

    pub fn description(self) -> &'static str {
        match self {
            SharingMode::Local => "now local",
            SharingMode::Global => "now global",
        }
    }
}

/// A name that ended up linked, with the identity it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedParameter {
    pub name: String,
    pub parameter_id: Id,
}

/// Outcome of a batch add, one bucket per classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddParametersResult {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub failed: Vec<String>,
    pub linked: Vec<LinkedParameter>,
}

/// Plain text notices for the caller to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMessages {
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl AddParametersResult {
    pub fn record_created(&mut self, parameter: &Parameter) {
        self.created.push(parameter.name.clone());
        self.linked.push(LinkedParameter {
            name: parameter.name.clone(),
            parameter_id: parameter.id.clone(),
        });
    }

    pub fn record_updated(&mut self, parameter: &Parameter) {
        self.updated.push(parameter.name.clone());
        self.linked.push(LinkedParameter {
            name: parameter.name.clone(),
            parameter_id: parameter.id.clone(),
        });
    }

    pub fn record_failed(&mut self, name: &str) {
        self.failed.push(name.to_string());
    }

    pub fn messages(&self) -> ResultMessages {
        let mut notice = Vec::new();
        if !self.created.is_empty() {
            notice.push(format!(
                "The following parameters were successfully created: {}",
                self.created.iter().join(" , ")
            ));
        }
        if !self.updated.is_empty() {
            notice.push(format!(
                "The following parameters already exist and have been updated: {}",
                self.updated.iter().join(" , ")
            ));
        }

        let error = (!self.failed.is_empty()).then(|| {
            format!(
                "The following parameters could not be added: {}",
                self.failed
                    .iter()
                    .map(|name| if name.is_empty() { "(blank)" } else { name.as_str() })
                    .join(" , ")
            )
        });

        ResultMessages {
            notice: (!notice.is_empty()).then(|| notice.join("\n")),
            error,
        }
    }
}

/// Result of moving a method's parameter between local and global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterTransition {
    pub method_id: Id,
    pub endpoint: String,
    pub previous_parameter_id: Id,
    /// True when the old definition lost its last link and was removed.
    pub previous_deleted: bool,
    pub parameter: Parameter,
    pub mode: SharingMode,
}

impl ParameterTransition {
    pub fn description(&self) -> &'static str {
        self.mode.description()
    }

    pub fn message(&self) -> String {
        match self.mode {
            SharingMode::Local => format!(
                "Parameter {} now has a copy unique for endpoint {}",
                self.parameter.name, self.endpoint
            ),
            SharingMode::Global => format!(
                "Parameter {} for endpoint {} is now global",
                self.parameter.name, self.endpoint
            ),
        }
    }
}

/// Result of removing one method's use of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRemoval {
    pub method_id: Id,
    pub parameter_id: Id,
    pub name: String,
    pub parameter_deleted: bool,
}
