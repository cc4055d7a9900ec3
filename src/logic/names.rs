use serde::{Deserialize, Serialize};

use crate::model::ParameterNames;

/// The one normalisation rule applied to parameter names, both when a
/// definition is created and when it is looked up for global linking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePolicy {
    pub case_sensitive: bool,
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self {
            case_sensitive: true,
        }
    }
}

impl NamePolicy {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    /// Trim, then fold case unless names are case sensitive. Blank input
    /// normalises to the empty string.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if self.case_sensitive {
            trimmed.to_string()
        } else {
            trimmed.to_lowercase()
        }
    }

    /// Split a pasted blob on newlines and commas, dropping empty pieces.
    pub fn split_names(blob: &str) -> Vec<String> {
        blob.split(['\n', ','])
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Flatten request input into the raw names to process, in order.
    /// Explicit lists are kept verbatim so blank entries get reported.
    pub fn names_from(input: &ParameterNames) -> Vec<String> {
        match input {
            ParameterNames::List(names) => names.clone(),
            ParameterNames::Blob(blob) => Self::split_names(blob),
        }
    }
}
