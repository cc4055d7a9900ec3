//! No-op detection shared by every parameter edit path.
//!
//! A rejected edit never touches storage; callers get a [`NoOp`] naming why.

use crate::error::NoOp;

pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

pub fn is_noop_default_value(old: Option<&str>, new: &str) -> bool {
    check_default_value(old, new).is_err()
}

pub fn is_noop_constraint_add(value: &str, existing: &[String]) -> bool {
    check_constraint_add(value, existing).is_err()
}

pub fn is_noop_constraint_replace(old: &str, new: &str, existing: &[String]) -> bool {
    check_constraint_replace(old, new, existing).is_err()
}

pub fn check_default_value(old: Option<&str>, new: &str) -> Result<(), NoOp> {
    if is_blank(new) {
        return Err(NoOp::BlankValue);
    }
    if old == Some(new) {
        return Err(NoOp::Unchanged);
    }
    Ok(())
}

pub fn check_constraint_add(value: &str, existing: &[String]) -> Result<(), NoOp> {
    if is_blank(value) {
        return Err(NoOp::BlankValue);
    }
    if existing.iter().any(|c| c == value) {
        return Err(NoOp::DuplicateConstraint);
    }
    Ok(())
}

pub fn check_constraint_replace(old: &str, new: &str, existing: &[String]) -> Result<(), NoOp> {
    if is_blank(new) {
        return Err(NoOp::BlankValue);
    }
    if old == new {
        return Err(NoOp::Unchanged);
    }
    if existing.iter().any(|c| c == new) {
        return Err(NoOp::DuplicateConstraint);
    }
    Ok(())
}

/// Trim and form-urlencode user input for storage as a default value.
pub fn encode_default_value(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.trim().as_bytes()).collect()
}
