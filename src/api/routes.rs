use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Method registration (ingestion side)
        .route("/methods/:method_id", put(handlers::upsert_method::<S>))
        // A method's parameters
        .route(
            "/methods/:method_id/parameters",
            get(handlers::list_method_parameters::<S>).post(handlers::add_parameters::<S>),
        )
        .route(
            "/methods/:method_id/parameters/:parameter_id",
            delete(handlers::destroy_parameter_usage::<S>),
        )
        .route(
            "/methods/:method_id/parameters/:parameter_id/sharing",
            post(handlers::change_parameter_sharing::<S>),
        )
        // Edits on a definition, seen by every method that links it
        .route(
            "/parameters/:parameter_id/default-value",
            put(handlers::update_default_value::<S>).delete(handlers::remove_default_value::<S>),
        )
        .route(
            "/parameters/:parameter_id/required",
            post(handlers::toggle_required::<S>),
        )
        .route(
            "/parameters/:parameter_id/constraints",
            post(handlers::add_constraint::<S>)
                .put(handlers::replace_constraint::<S>)
                .delete(handlers::remove_constraint::<S>),
        )
}
