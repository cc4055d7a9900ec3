//! Error taxonomy for the parameter engine.
//!
//! `Validation` carries a [`NoOp`]: the request was understood but would have
//! no effect, so nothing was written. Every other variant is a fault.

use thiserror::Error;

use crate::model::Id;

pub type Result<T> = std::result::Result<T, CatalogueError>;

/// Why a mutation was recognised as a no-op and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOp {
    /// Parameter name was empty after normalisation.
    BlankName,
    /// The method already links a parameter with this name.
    AlreadyLinked,
    /// Default value or constraint was empty after trimming.
    BlankValue,
    /// New value equals the current one.
    Unchanged,
    /// Constraint value is already in the option set.
    DuplicateConstraint,
}

impl NoOp {
    pub fn as_str(self) -> &'static str {
        match self {
            NoOp::BlankName => "blank parameter name",
            NoOp::AlreadyLinked => "parameter already linked to method",
            NoOp::BlankValue => "blank value",
            NoOp::Unchanged => "value unchanged",
            NoOp::DuplicateConstraint => "constraint already present",
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("no-op: {}", .0.as_str())]
    Validation(NoOp),

    #[error("parameter {parameter_id} is already linked to method {method_id}")]
    Conflict { method_id: Id, parameter_id: Id },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Id },

    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl CatalogueError {
    pub fn not_found(entity: &'static str, id: impl Into<Id>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// True when nothing was attempted because the input would change nothing.
    pub fn is_noop(&self) -> bool {
        matches!(self, CatalogueError::Validation(_))
    }
}

impl From<NoOp> for CatalogueError {
    fn from(reason: NoOp) -> Self {
        CatalogueError::Validation(reason)
    }
}
