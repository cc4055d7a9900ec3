use log::info;

use crate::error::{CatalogueError, NoOp, Result};
use crate::logic::guard;
use crate::model::{Id, Parameter, UserContext};
use crate::store::traits::{ParameterStore, Store};

/// In-place edits of a parameter definition. Every method linking the
/// parameter sees the change.
pub struct ParameterEditor;

impl ParameterEditor {
    /// Set an already encoded default value. Blank or unchanged input is a no-op.
    pub async fn update_default_value<S: Store + ?Sized>(
        store: &S,
        parameter_id: &Id,
        new_value: &str,
        actor: &UserContext,
    ) -> Result<Parameter> {
        let parameter = Self::apply(store, parameter_id, actor, |parameter| {
            guard::check_default_value(parameter.default_value.as_deref(), new_value)?;
            parameter.default_value = Some(new_value.to_string());
            Ok(true)
        })
        .await?;

        info!(
            "{} updated default value of parameter '{}' ({})",
            actor.user_id, parameter.name, parameter.id
        );
        Ok(parameter)
    }

    /// Encode raw user input, then update the default value with it.
    pub async fn update_default_value_raw<S: Store + ?Sized>(
        store: &S,
        parameter_id: &Id,
        raw_value: &str,
        actor: &UserContext,
    ) -> Result<Parameter> {
        let encoded = guard::encode_default_value(raw_value);
        Self::update_default_value(store, parameter_id, &encoded, actor).await
    }

    pub async fn remove_default_value<S: Store + ?Sized>(
        store: &S,
        parameter_id: &Id,
        actor: &UserContext,
    ) -> Result<Parameter> {
        let parameter = Self::apply(store, parameter_id, actor, |parameter| {
            parameter.default_value = None;
            Ok(true)
        })
        .await?;

        info!(
            "{} removed default value of parameter '{}' ({})",
            actor.user_id, parameter.name, parameter.id
        );
        Ok(parameter)
    }

    /// Flip between mandatory and optional.
    pub async fn update_required_flag<S: Store + ?Sized>(
        store: &S,
        parameter_id: &Id,
        actor: &UserContext,
    ) -> Result<Parameter> {
        let parameter = Self::apply(store, parameter_id, actor, |parameter| {
            parameter.required = !parameter.required;
            Ok(true)
        })
        .await?;

        info!(
            "{} made parameter '{}' ({}) {}",
            actor.user_id,
            parameter.name,
            parameter.id,
            parameter.requirement_label()
        );
        Ok(parameter)
    }

    pub async fn add_constraint<S: Store + ?Sized>(
        store: &S,
        parameter_id: &Id,
        value: &str,
        actor: &UserContext,
    ) -> Result<Parameter> {
        let value = value.trim();
        let parameter = Self::apply(store, parameter_id, actor, |parameter| {
            guard::check_constraint_add(value, &parameter.constrained_options)?;
            parameter.constrained_options.push(value.to_string());
            Ok(true)
        })
        .await?;

        info!(
            "{} added constraint '{}' to parameter '{}' ({})",
            actor.user_id, value, parameter.name, parameter.id
        );
        Ok(parameter)
    }

    /// Swap `old_value` for `new_value`; the new value goes to the end.
    pub async fn replace_constraint<S: Store + ?Sized>(
        store: &S,
        parameter_id: &Id,
        old_value: &str,
        new_value: &str,
        actor: &UserContext,
    ) -> Result<Parameter> {
        let new_value = new_value.trim();
        let parameter = Self::apply(store, parameter_id, actor, |parameter| {
            guard::check_constraint_replace(old_value, new_value, &parameter.constrained_options)?;
            parameter.constrained_options.retain(|c| c != old_value);
            parameter.constrained_options.push(new_value.to_string());
            Ok(true)
        })
        .await?;

        info!(
            "{} replaced constraint '{}' with '{}' on parameter '{}' ({})",
            actor.user_id, old_value, new_value, parameter.name, parameter.id
        );
        Ok(parameter)
    }

    /// Remove a constraint if present. Removing an absent value changes nothing
    /// and is not an error.
    pub async fn remove_constraint<S: Store + ?Sized>(
        store: &S,
        parameter_id: &Id,
        value: &str,
        actor: &UserContext,
    ) -> Result<Parameter> {
        let mut removed = false;
        let parameter = Self::apply(store, parameter_id, actor, |parameter| {
            let before = parameter.constrained_options.len();
            parameter.constrained_options.retain(|c| c != value);
            removed = parameter.constrained_options.len() != before;
            Ok(removed)
        })
        .await?;

        if removed {
            info!(
                "{} removed constraint '{}' from parameter '{}' ({})",
                actor.user_id, value, parameter.name, parameter.id
            );
        }
        Ok(parameter)
    }

    /// Load, edit and save in one transaction. The edit returns whether it
    /// changed anything; unchanged parameters are not written back.
    async fn apply<S, F>(
        store: &S,
        parameter_id: &Id,
        actor: &UserContext,
        edit: F,
    ) -> Result<Parameter>
    where
        S: Store + ?Sized,
        F: FnOnce(&mut Parameter) -> std::result::Result<bool, NoOp> + Send,
    {
        let mut tx = store.begin().await?;
        let mut parameter = tx
            .get_parameter(parameter_id)
            .await?
            .ok_or_else(|| CatalogueError::not_found("parameter", parameter_id.clone()))?;

        if !edit(&mut parameter)? {
            return Ok(parameter);
        }

        parameter.touch(&actor.user_id);
        tx.save_parameter(&parameter).await?;
        tx.commit().await?;
        Ok(parameter)
    }
}
