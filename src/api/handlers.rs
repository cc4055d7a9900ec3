use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::CatalogueError;
use crate::logic::{NamePolicy, ParameterEditor, SharingResolver};
use crate::model::{
    AddParametersRequest, AddParametersResult, ConstraintRequest, DefaultValueRequest, Id, Method,
    NewMethod, Parameter, ParameterTransition, ParameterUsage, ReplaceConstraintRequest,
    ResultMessages, SharingMode, SharingRequest, UsageRemoval, UserContext,
};
use crate::store::traits::{MethodStore, Store};

/// Shared state: the store plus the resolver configured with the name policy.
pub struct AppContext<S> {
    pub store: S,
    pub resolver: SharingResolver,
}

impl<S: Store> AppContext<S> {
    pub fn new(store: S, policy: NamePolicy) -> Self {
        Self {
            store,
            resolver: SharingResolver::new(policy),
        }
    }
}

pub type AppState<S> = Arc<AppContext<S>>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

/// A result plus the notice the caller should show.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T> {
    pub message: String,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct AddParametersResponse {
    #[serde(flatten)]
    pub result: AddParametersResult,
    pub messages: ResultMessages,
}

/// Map the error taxonomy onto HTTP status codes.
pub fn error_response(err: CatalogueError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, kind) = match &err {
        CatalogueError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
        CatalogueError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
        CatalogueError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
        CatalogueError::Storage(_) => {
            log::error!("Storage failure: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "storage")
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            kind,
        }),
    )
}

pub async fn upsert_method<S: Store>(
    State(ctx): State<AppState<S>>,
    Path(method_id): Path<Id>,
    RequestJson(new_method): RequestJson<NewMethod>,
) -> ApiResult<Method> {
    let method = new_method.into_method(method_id);

    let mut tx = ctx.store.begin().await.map_err(error_response)?;
    tx.upsert_method(&method).await.map_err(error_response)?;
    tx.commit().await.map_err(error_response)?;

    Ok(Json(method))
}

pub async fn list_method_parameters<S: Store>(
    State(ctx): State<AppState<S>>,
    Path(method_id): Path<Id>,
) -> ApiResult<ListResponse<ParameterUsage>> {
    let items = ctx
        .resolver
        .parameters_for_method(&ctx.store, &method_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ListResponse {
        total: items.len(),
        items,
    }))
}

pub async fn add_parameters<S: Store>(
    State(ctx): State<AppState<S>>,
    Path(method_id): Path<Id>,
    user: UserContext,
    RequestJson(request): RequestJson<AddParametersRequest>,
) -> ApiResult<AddParametersResponse> {
    let names = NamePolicy::names_from(&request.names);
    let result = ctx
        .resolver
        .add_parameters(
            &ctx.store,
            &method_id,
            &names,
            &user,
            SharingMode::from_make_local(request.make_local),
        )
        .await
        .map_err(error_response)?;

    Ok(Json(AddParametersResponse {
        messages: result.messages(),
        result,
    }))
}

pub async fn destroy_parameter_usage<S: Store>(
    State(ctx): State<AppState<S>>,
    Path((method_id, parameter_id)): Path<(Id, Id)>,
    user: UserContext,
) -> ApiResult<MessageResponse<UsageRemoval>> {
    let removal = ctx
        .resolver
        .destroy_usage(&ctx.store, &method_id, &parameter_id, &user)
        .await
        .map_err(error_response)?;

    Ok(Json(MessageResponse {
        message: format!("Parameter {} has been deleted", removal.name),
        data: removal,
    }))
}

pub async fn change_parameter_sharing<S: Store>(
    State(ctx): State<AppState<S>>,
    Path((method_id, parameter_id)): Path<(Id, Id)>,
    user: UserContext,
    RequestJson(request): RequestJson<SharingRequest>,
) -> ApiResult<MessageResponse<ParameterTransition>> {
    let transition = ctx
        .resolver
        .localise_globalise_parameter(
            &ctx.store,
            &method_id,
            &parameter_id,
            SharingMode::from_make_local(request.make_local),
            &user,
        )
        .await
        .map_err(error_response)?;

    Ok(Json(MessageResponse {
        message: transition.message(),
        data: transition,
    }))
}

fn parameter_message(parameter: Parameter, message: String) -> Json<MessageResponse<Parameter>> {
    Json(MessageResponse {
        message,
        data: parameter,
    })
}

pub async fn update_default_value<S: Store>(
    State(ctx): State<AppState<S>>,
    Path(parameter_id): Path<Id>,
    user: UserContext,
    RequestJson(request): RequestJson<DefaultValueRequest>,
) -> ApiResult<MessageResponse<Parameter>> {
    let parameter =
        ParameterEditor::update_default_value_raw(&ctx.store, &parameter_id, &request.new_value, &user)
            .await
            .map_err(error_response)?;

    let message = format!(
        "The default value for parameter {} has been updated",
        parameter.name
    );
    Ok(parameter_message(parameter, message))
}

pub async fn remove_default_value<S: Store>(
    State(ctx): State<AppState<S>>,
    Path(parameter_id): Path<Id>,
    user: UserContext,
) -> ApiResult<MessageResponse<Parameter>> {
    let parameter = ParameterEditor::remove_default_value(&ctx.store, &parameter_id, &user)
        .await
        .map_err(error_response)?;

    let message = format!(
        "The default value has been deleted from parameter {}",
        parameter.name
    );
    Ok(parameter_message(parameter, message))
}

pub async fn toggle_required<S: Store>(
    State(ctx): State<AppState<S>>,
    Path(parameter_id): Path<Id>,
    user: UserContext,
) -> ApiResult<MessageResponse<Parameter>> {
    let parameter = ParameterEditor::update_required_flag(&ctx.store, &parameter_id, &user)
        .await
        .map_err(error_response)?;

    let message = format!(
        "Parameter {} is now {}",
        parameter.name,
        parameter.requirement_label()
    );
    Ok(parameter_message(parameter, message))
}

pub async fn add_constraint<S: Store>(
    State(ctx): State<AppState<S>>,
    Path(parameter_id): Path<Id>,
    user: UserContext,
    RequestJson(request): RequestJson<ConstraintRequest>,
) -> ApiResult<MessageResponse<Parameter>> {
    let parameter = ParameterEditor::add_constraint(&ctx.store, &parameter_id, &request.value, &user)
        .await
        .map_err(error_response)?;

    let message = format!("Constraint for parameter {} has been added", parameter.name);
    Ok(parameter_message(parameter, message))
}

pub async fn replace_constraint<S: Store>(
    State(ctx): State<AppState<S>>,
    Path(parameter_id): Path<Id>,
    user: UserContext,
    RequestJson(request): RequestJson<ReplaceConstraintRequest>,
) -> ApiResult<MessageResponse<Parameter>> {
    let parameter = ParameterEditor::replace_constraint(
        &ctx.store,
        &parameter_id,
        &request.old_value,
        &request.new_value,
        &user,
    )
    .await
    .map_err(error_response)?;

    let message = format!("Constraint for parameter {} has been updated", parameter.name);
    Ok(parameter_message(parameter, message))
}

pub async fn remove_constraint<S: Store>(
    State(ctx): State<AppState<S>>,
    Path(parameter_id): Path<Id>,
    user: UserContext,
    Query(request): Query<ConstraintRequest>,
) -> ApiResult<MessageResponse<Parameter>> {
    let parameter =
        ParameterEditor::remove_constraint(&ctx.store, &parameter_id, &request.value, &user)
            .await
            .map_err(error_response)?;

    let message = format!(
        "Constraint has been deleted from parameter {}",
        parameter.name
    );
    Ok(parameter_message(parameter, message))
}
