use crate::model::{generate_id, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One concrete REST operation (verb + path template on a resource).
///
/// Methods are registered by the resource-ingestion side; the parameter
/// engine only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub id: Id,
    pub resource_id: Id,
    pub http_verb: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

impl Method {
    pub fn new(resource_id: Id, http_verb: &str, path: &str) -> Self {
        Self::new_with_id(generate_id(), resource_id, http_verb, path)
    }

    pub fn new_with_id(id: Id, resource_id: Id, http_verb: &str, path: &str) -> Self {
        Self {
            id,
            resource_id,
            http_verb: http_verb.trim().to_uppercase(),
            path: path.trim().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Human readable endpoint, e.g. `GET /sequences/{id}`.
    pub fn display_endpoint(&self) -> String {
        format!("{} {}", self.http_verb, self.path)
    }
}

/// Input model for registering a method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMethod {
    pub resource_id: Id,
    pub http_verb: String,
    pub path: String,
}

impl NewMethod {
    pub fn into_method(self, id: Id) -> Method {
        Method::new_with_id(id, self.resource_id, &self.http_verb, &self.path)
    }
}

/// The (method, parameter) link. Unique per pair; the only thing keeping a
/// parameter alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodParameterMap {
    pub method_id: Id,
    pub parameter_id: Id,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl MethodParameterMap {
    pub fn new(method_id: &Id, parameter_id: &Id, created_by: &str) -> Self {
        Self {
            method_id: method_id.clone(),
            parameter_id: parameter_id.clone(),
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        }
    }
}
