//! Plain input structs handed to the core by the web layer.

use serde::{Deserialize, Serialize};

/// Names may arrive as a list or as one pasted blob (newline or comma separated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterNames {
    List(Vec<String>),
    Blob(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddParametersRequest {
    pub names: ParameterNames,
    #[serde(default)]
    pub make_local: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharingRequest {
    pub make_local: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultValueRequest {
    pub new_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRequest {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceConstraintRequest {
    pub old_value: String,
    pub new_value: String,
}
