pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

pub use error::{CatalogueError, NoOp, Result};
pub use logic::{NamePolicy, ParameterEditor, SharingResolver};
pub use model::*;
pub use store::{InMemoryStore, PostgresStore, Store};

use std::sync::Arc;

use crate::api::handlers::AppContext;
use crate::config::AppConfig;

/// Build the router over the given store and serve it until the listener closes.
pub async fn serve_with_store<S: Store + 'static>(
    store: S,
    config: &AppConfig,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let ctx = Arc::new(AppContext::new(store, config.name_policy()));
    let app = crate::api::routes::create_router().with_state(ctx);
    axum::serve(listener, app).await?;
    Ok(())
}
