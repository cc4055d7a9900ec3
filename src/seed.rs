//! Demo methods for local runs with `LOAD_SEED_DATA=true`.

use log::info;

use crate::error::Result;
use crate::logic::SharingResolver;
use crate::model::{Method, SharingMode, UserContext};
use crate::store::traits::{MethodStore, Store};

pub const SEED_METHODS: [(&str, &str, &str); 3] = [
    ("seq-fetch", "GET", "/sequences/{id}"),
    ("seq-search", "GET", "/sequences"),
    ("blast-run", "POST", "/blast/run"),
];

/// Register the demo methods and give them a few shared and local parameters.
pub async fn load_seed_data<S: Store + ?Sized>(store: &S, resolver: &SharingResolver) -> Result<()> {
    let actor = UserContext::system();

    let mut tx = store.begin().await?;
    for (id, verb, path) in SEED_METHODS {
        let method = Method::new_with_id(id.to_string(), "demo-resource".to_string(), verb, path);
        tx.upsert_method(&method).await?;
    }
    tx.commit().await?;

    let shared = vec!["format".to_string(), "db".to_string()];
    for (id, _, _) in SEED_METHODS {
        resolver
            .add_parameters(store, &id.to_string(), &shared, &actor, SharingMode::Global)
            .await?;
    }
    resolver
        .add_parameters(
            store,
            &"blast-run".to_string(),
            &["program".to_string()],
            &actor,
            SharingMode::Local,
        )
        .await?;

    info!("Seeded {} methods", SEED_METHODS.len());
    Ok(())
}
