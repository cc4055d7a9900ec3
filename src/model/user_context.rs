use serde::{Deserialize, Serialize};

/// The acting curator, passed through for attribution only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

impl UserContext {
    pub fn new(user_id: String) -> Self {
        Self {
            user_id,
            user_email: None,
            user_name: None,
        }
    }

    pub fn with_details(user_id: String, email: Option<String>, name: Option<String>) -> Self {
        Self {
            user_id,
            user_email: email,
            user_name: name,
        }
    }

    /// Actor for seeding and maintenance sweeps
    pub fn system() -> Self {
        Self {
            user_id: "system".to_string(),
            user_email: Some("system@catalogue.internal".to_string()),
            user_name: Some("System".to_string()),
        }
    }

    /// Used when no identity headers are sent (development)
    pub fn default_user() -> Self {
        Self {
            user_id: "dev-user".to_string(),
            user_email: Some("dev@localhost".to_string()),
            user_name: Some("Development User".to_string()),
        }
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::default_user()
    }
}
