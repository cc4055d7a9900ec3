use log::{debug, info, warn};

use crate::error::{CatalogueError, NoOp, Result};
use crate::logic::names::NamePolicy;
use crate::model::{
    AddParametersResult, Id, Parameter, ParameterTransition, ParameterUsage, SharingMode,
    UsageRemoval, UserContext,
};
use crate::store::traits::{MethodParameterLinker, MethodStore, ParameterStore, Store, StoreTx};

/// How a single name was resolved for a method.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A new definition was created and linked.
    Created(Parameter),
    /// An existing definition with the same name was linked.
    Linked(Parameter),
}

impl Resolution {
    pub fn parameter(&self) -> &Parameter {
        match self {
            Resolution::Created(p) | Resolution::Linked(p) => p,
        }
    }

    pub fn into_parameter(self) -> Parameter {
        match self {
            Resolution::Created(p) | Resolution::Linked(p) => p,
        }
    }
}

/// Keeps parameter definitions and method links consistent across
/// multi-step operations: adding names, moving a method's parameter between
/// local and global, and removing a usage.
///
/// Sharing is always derived from the live link count. A definition that
/// loses its last link is deleted in the same transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharingResolver {
    policy: NamePolicy,
}

impl SharingResolver {
    pub fn new(policy: NamePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> NamePolicy {
        self.policy
    }

    /// Link each name to the method. Every name runs in its own transaction
    /// so one bad name never aborts the rest of the batch.
    pub async fn add_parameters<S: Store + ?Sized>(
        &self,
        store: &S,
        method_id: &Id,
        names: &[String],
        actor: &UserContext,
        mode: SharingMode,
    ) -> Result<AddParametersResult> {
        {
            let mut tx = store.begin().await?;
            if tx.get_method(method_id).await?.is_none() {
                return Err(CatalogueError::not_found("method", method_id.clone()));
            }
        }

        let mut result = AddParametersResult::default();
        for raw in names {
            let name = self.policy.normalize(raw);
            match self.add_one(store, method_id, &name, actor, mode).await {
                Ok(Resolution::Created(parameter)) => result.record_created(&parameter),
                Ok(Resolution::Linked(parameter)) => result.record_updated(&parameter),
                Err(err) if err.is_noop() => {
                    debug!("Skipping parameter '{}' for method {}: {}", name, method_id, err);
                    result.record_failed(&name);
                }
                Err(err) => {
                    warn!("Failed to add parameter '{}' to method {}: {}", name, method_id, err);
                    result.record_failed(&name);
                }
            }
        }

        info!(
            "{} added parameters to method {}: {} created, {} linked, {} failed",
            actor.user_id,
            method_id,
            result.created.len(),
            result.updated.len(),
            result.failed.len()
        );
        Ok(result)
    }

    async fn add_one<S: Store + ?Sized>(
        &self,
        store: &S,
        method_id: &Id,
        name: &str,
        actor: &UserContext,
        mode: SharingMode,
    ) -> Result<Resolution> {
        let mut tx = store.begin().await?;
        let resolution = self.resolve(&mut *tx, method_id, name, actor, mode).await?;
        tx.commit().await?;
        Ok(resolution)
    }

    /// Resolve one already normalised name to a definition and link it.
    ///
    /// Local mode always forks a fresh definition. Global mode reuses the
    /// definition `find_parameter_by_name` prefers, creating one if none exists.
    pub async fn resolve(
        &self,
        tx: &mut dyn StoreTx,
        method_id: &Id,
        name: &str,
        actor: &UserContext,
        mode: SharingMode,
    ) -> Result<Resolution> {
        if name.is_empty() {
            return Err(NoOp::BlankName.into());
        }
        let linked = tx.parameters_for_method(method_id).await?;
        if linked.iter().any(|p| p.name == name) {
            return Err(NoOp::AlreadyLinked.into());
        }

        if !mode.is_local() {
            if let Some(existing) = tx.find_parameter_by_name(name).await? {
                tx.link(method_id, &existing.id, &actor.user_id).await?;
                return Ok(Resolution::Linked(existing));
            }
        }

        let parameter = Parameter::new(name, &actor.user_id);
        tx.insert_parameter(&parameter).await?;
        tx.link(method_id, &parameter.id, &actor.user_id).await?;
        Ok(Resolution::Created(parameter))
    }

    /// Move the method's use of `parameter_id` to a dedicated copy (local) or
    /// to the shared definition for its name (global).
    ///
    /// Unlink, garbage collection and re-resolution commit together. If the
    /// re-resolution fails, nothing is written and the error is returned.
    pub async fn localise_globalise_parameter<S: Store + ?Sized>(
        &self,
        store: &S,
        method_id: &Id,
        parameter_id: &Id,
        mode: SharingMode,
        actor: &UserContext,
    ) -> Result<ParameterTransition> {
        let mut tx = store.begin().await?;
        let method = tx
            .get_method(method_id)
            .await?
            .ok_or_else(|| CatalogueError::not_found("method", method_id.clone()))?;
        let previous = tx
            .get_parameter(parameter_id)
            .await?
            .ok_or_else(|| CatalogueError::not_found("parameter", parameter_id.clone()))?;

        tx.unlink(method_id, parameter_id).await?;
        let previous_deleted = tx.delete_parameter_if_orphaned(parameter_id).await?;

        let resolution = match self
            .resolve(&mut *tx, method_id, &previous.name, actor, mode)
            .await
        {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!(
                    "Could not make parameter '{}' {} for {}, rolled back: {}",
                    previous.name,
                    mode.description(),
                    method.display_endpoint(),
                    err
                );
                return Err(err);
            }
        };
        tx.commit().await?;

        let transition = ParameterTransition {
            method_id: method.id.clone(),
            endpoint: method.display_endpoint(),
            previous_parameter_id: previous.id,
            previous_deleted,
            parameter: resolution.into_parameter(),
            mode,
        };
        info!("{}: {}", actor.user_id, transition.message());
        Ok(transition)
    }

    /// Remove the method's link to the parameter and delete the parameter if
    /// that was its last link.
    pub async fn destroy_usage<S: Store + ?Sized>(
        &self,
        store: &S,
        method_id: &Id,
        parameter_id: &Id,
        actor: &UserContext,
    ) -> Result<UsageRemoval> {
        let mut tx = store.begin().await?;
        let parameter = tx
            .get_parameter(parameter_id)
            .await?
            .ok_or_else(|| CatalogueError::not_found("parameter", parameter_id.clone()))?;

        tx.unlink(method_id, parameter_id).await?;
        let parameter_deleted = tx.delete_parameter_if_orphaned(parameter_id).await?;
        tx.commit().await?;

        info!(
            "{} removed parameter '{}' ({}) from method {}{}",
            actor.user_id,
            parameter.name,
            parameter.id,
            method_id,
            if parameter_deleted { ", definition deleted" } else { "" }
        );
        Ok(UsageRemoval {
            method_id: method_id.clone(),
            parameter_id: parameter.id,
            name: parameter.name,
            parameter_deleted,
        })
    }

    /// A method's parameters with their derived sharing state.
    pub async fn parameters_for_method<S: Store + ?Sized>(
        &self,
        store: &S,
        method_id: &Id,
    ) -> Result<Vec<ParameterUsage>> {
        let mut tx = store.begin().await?;
        if tx.get_method(method_id).await?.is_none() {
            return Err(CatalogueError::not_found("method", method_id.clone()));
        }

        let parameters = tx.parameters_for_method(method_id).await?;
        let mut usages = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            let link_count = tx.link_count(&parameter.id).await?;
            usages.push(ParameterUsage::new(parameter, link_count));
        }
        Ok(usages)
    }

    /// Delete every definition that has no links, e.g. after the ingestion
    /// side removed methods. Returns how many were deleted.
    pub async fn sweep_orphans<S: Store + ?Sized>(
        &self,
        store: &S,
        actor: &UserContext,
    ) -> Result<usize> {
        let mut tx = store.begin().await?;
        let mut deleted = 0;
        for id in tx.orphaned_parameter_ids().await? {
            if tx.delete_parameter_if_orphaned(&id).await? {
                deleted += 1;
            }
        }
        tx.commit().await?;

        if deleted > 0 {
            info!("{} swept {} orphaned parameters", actor.user_id, deleted);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::editor::ParameterEditor;
    use crate::model::{Method, MethodParameterMap};
    use crate::store::InMemoryStore;

    const METHODS: [&str; 3] = ["m1", "m2", "m3"];

    async fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        for id in METHODS {
            let method =
                Method::new_with_id(id.to_string(), "res".to_string(), "GET", &format!("/{}", id));
            tx.upsert_method(&method).await.unwrap();
        }
        tx.commit().await.unwrap();
        store
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn id(value: &str) -> Id {
        value.to_string()
    }

    async fn link_count(store: &InMemoryStore, parameter_id: &Id) -> usize {
        let mut tx = store.begin().await.unwrap();
        tx.link_count(parameter_id).await.unwrap()
    }

    async fn get_parameter(store: &InMemoryStore, parameter_id: &Id) -> Option<Parameter> {
        let mut tx = store.begin().await.unwrap();
        tx.get_parameter(parameter_id).await.unwrap()
    }

    async fn assert_no_orphans(store: &InMemoryStore) {
        let mut tx = store.begin().await.unwrap();
        assert!(tx.orphaned_parameter_ids().await.unwrap().is_empty());
    }

    fn parameter_id(result: &AddParametersResult, name: &str) -> Id {
        result
            .linked
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.parameter_id.clone())
            .unwrap()
    }

    #[tokio::test]
    async fn test_global_add_reuses_definition() {
        let store = seeded_store().await;
        let resolver = SharingResolver::default();
        let actor = UserContext::default();

        let first = resolver
            .add_parameters(&store, &id("m1"), &names(&["foo"]), &actor, SharingMode::Global)
            .await
            .unwrap();
        assert_eq!(first.created, vec!["foo"]);

        let second = resolver
            .add_parameters(&store, &id("m2"), &names(&["foo"]), &actor, SharingMode::Global)
            .await
            .unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.updated, vec!["foo"]);

        let shared = parameter_id(&first, "foo");
        assert_eq!(parameter_id(&second, "foo"), shared);
        assert_eq!(link_count(&store, &shared).await, 2);
    }

    #[tokio::test]
    async fn test_local_add_forks_identity() {
        let store = seeded_store().await;
        let resolver = SharingResolver::default();
        let actor = UserContext::default();

        let first = resolver
            .add_parameters(&store, &id("m1"), &names(&["foo"]), &actor, SharingMode::Local)
            .await
            .unwrap();
        let second = resolver
            .add_parameters(&store, &id("m2"), &names(&["foo"]), &actor, SharingMode::Local)
            .await
            .unwrap();
        assert_eq!(first.created, vec!["foo"]);
        assert_eq!(second.created, vec!["foo"]);

        let a = parameter_id(&first, "foo");
        let b = parameter_id(&second, "foo");
        assert_ne!(a, b);
        assert_eq!(link_count(&store, &a).await, 1);
        assert_eq!(link_count(&store, &b).await, 1);
    }

    #[tokio::test]
    async fn test_batch_isolates_blank_and_duplicate_names() {
        let store = seeded_store().await;
        let resolver = SharingResolver::default();

        let result = resolver
            .add_parameters(
                &store,
                &id("m1"),
                &names(&["valid", "", "valid"]),
                &UserContext::default(),
                SharingMode::Global,
            )
            .await
            .unwrap();

        assert_eq!(result.created, vec!["valid"]);
        assert!(result.updated.is_empty());
        assert_eq!(result.failed, vec!["", "valid"]);
        assert_eq!(result.linked.len(), 1);
        assert_no_orphans(&store).await;
    }

    #[tokio::test]
    async fn test_add_to_unknown_method_is_not_found() {
        let store = seeded_store().await;
        let err = SharingResolver::default()
            .add_parameters(
                &store,
                &id("nope"),
                &names(&["foo"]),
                &UserContext::default(),
                SharingMode::Global,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogueError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_case_insensitive_policy_links_same_definition() {
        let store = seeded_store().await;
        let resolver = SharingResolver::new(NamePolicy::new(false));
        let actor = UserContext::default();

        let first = resolver
            .add_parameters(&store, &id("m1"), &names(&[" Format "]), &actor, SharingMode::Global)
            .await
            .unwrap();
        let second = resolver
            .add_parameters(&store, &id("m2"), &names(&["FORMAT"]), &actor, SharingMode::Global)
            .await
            .unwrap();

        assert_eq!(first.created, vec!["format"]);
        assert_eq!(second.updated, vec!["format"]);
    }

    #[tokio::test]
    async fn test_localise_shared_parameter() {
        let store = seeded_store().await;
        let resolver = SharingResolver::default();
        let actor = UserContext::default();

        let added = resolver
            .add_parameters(&store, &id("m1"), &names(&["foo"]), &actor, SharingMode::Global)
            .await
            .unwrap();
        resolver
            .add_parameters(&store, &id("m2"), &names(&["foo"]), &actor, SharingMode::Global)
            .await
            .unwrap();
        let global = parameter_id(&added, "foo");
        ParameterEditor::add_constraint(&store, &global, "json", &actor)
            .await
            .unwrap();

        let transition = resolver
            .localise_globalise_parameter(&store, &id("m1"), &global, SharingMode::Local, &actor)
            .await
            .unwrap();

        assert_eq!(transition.description(), "now local");
        assert!(!transition.previous_deleted);
        assert_ne!(transition.parameter.id, global);
        assert!(transition.parameter.constrained_options.is_empty());
        assert_eq!(
            transition.message(),
            "Parameter foo now has a copy unique for endpoint GET /m1"
        );

        assert_eq!(link_count(&store, &global).await, 1);
        assert_eq!(link_count(&store, &transition.parameter.id).await, 1);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_link(&id("m2"), &global).await.unwrap().is_some());
        assert!(tx
            .find_link(&id("m1"), &transition.parameter.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_globalise_local_parameter_joins_shared_definition() {
        let store = seeded_store().await;
        let resolver = SharingResolver::default();
        let actor = UserContext::default();

        let shared = resolver
            .add_parameters(&store, &id("m2"), &names(&["foo"]), &actor, SharingMode::Global)
            .await
            .unwrap();
        resolver
            .add_parameters(&store, &id("m3"), &names(&["foo"]), &actor, SharingMode::Global)
            .await
            .unwrap();
        let local = resolver
            .add_parameters(&store, &id("m1"), &names(&["foo"]), &actor, SharingMode::Local)
            .await
            .unwrap();
        let local_id = parameter_id(&local, "foo");
        let shared_id = parameter_id(&shared, "foo");

        let transition = resolver
            .localise_globalise_parameter(&store, &id("m1"), &local_id, SharingMode::Global, &actor)
            .await
            .unwrap();

        assert_eq!(transition.description(), "now global");
        assert!(transition.previous_deleted);
        assert_eq!(transition.parameter.id, shared_id);
        assert!(get_parameter(&store, &local_id).await.is_none());
        assert_eq!(link_count(&store, &shared_id).await, 3);
        assert_no_orphans(&store).await;
    }

    #[tokio::test]
    async fn test_localise_sole_user_recreates_clean_copy() {
        let store = seeded_store().await;
        let resolver = SharingResolver::default();
        let actor = UserContext::default();

        let added = resolver
            .add_parameters(&store, &id("m1"), &names(&["foo"]), &actor, SharingMode::Global)
            .await
            .unwrap();
        let old = parameter_id(&added, "foo");
        ParameterEditor::update_default_value(&store, &old, "bar", &actor)
            .await
            .unwrap();

        let transition = resolver
            .localise_globalise_parameter(&store, &id("m1"), &old, SharingMode::Local, &actor)
            .await
            .unwrap();

        assert!(transition.previous_deleted);
        assert!(get_parameter(&store, &old).await.is_none());
        assert!(transition.parameter.default_value.is_none());
        assert_no_orphans(&store).await;
    }

    #[tokio::test]
    async fn test_localise_unlinked_pair_is_not_found_and_writes_nothing() {
        let store = seeded_store().await;
        let resolver = SharingResolver::default();
        let actor = UserContext::default();

        let added = resolver
            .add_parameters(&store, &id("m1"), &names(&["foo"]), &actor, SharingMode::Global)
            .await
            .unwrap();
        let foo = parameter_id(&added, "foo");

        let err = resolver
            .localise_globalise_parameter(&store, &id("m2"), &foo, SharingMode::Local, &actor)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogueError::NotFound { .. }));
        assert_eq!(link_count(&store, &foo).await, 1);
    }

    #[tokio::test]
    async fn test_destroy_usage_collects_last_reference() {
        let store = seeded_store().await;
        let resolver = SharingResolver::default();
        let actor = UserContext::default();

        let added = resolver
            .add_parameters(&store, &id("m1"), &names(&["foo"]), &actor, SharingMode::Global)
            .await
            .unwrap();
        resolver
            .add_parameters(&store, &id("m2"), &names(&["foo"]), &actor, SharingMode::Global)
            .await
            .unwrap();
        let foo = parameter_id(&added, "foo");

        let removal = resolver
            .destroy_usage(&store, &id("m1"), &foo, &actor)
            .await
            .unwrap();
        assert!(!removal.parameter_deleted);
        assert_eq!(link_count(&store, &foo).await, 1);

        let removal = resolver
            .destroy_usage(&store, &id("m2"), &foo, &actor)
            .await
            .unwrap();
        assert!(removal.parameter_deleted);
        assert!(get_parameter(&store, &foo).await.is_none());

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_parameter_by_name("foo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_gc_only_removes_that_identity() {
        let store = seeded_store().await;
        let resolver = SharingResolver::default();
        let actor = UserContext::default();

        let a = resolver
            .add_parameters(&store, &id("m1"), &names(&["foo"]), &actor, SharingMode::Local)
            .await
            .unwrap();
        let b = resolver
            .add_parameters(&store, &id("m2"), &names(&["foo"]), &actor, SharingMode::Local)
            .await
            .unwrap();
        let a = parameter_id(&a, "foo");
        let b = parameter_id(&b, "foo");

        resolver
            .destroy_usage(&store, &id("m1"), &a, &actor)
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        let found = tx.find_parameter_by_name("foo").await.unwrap().unwrap();
        assert_eq!(found.id, b);
    }

    #[tokio::test]
    async fn test_parameters_for_method_reports_sharing() {
        let store = seeded_store().await;
        let resolver = SharingResolver::default();
        let actor = UserContext::default();

        resolver
            .add_parameters(&store, &id("m1"), &names(&["db", "id"]), &actor, SharingMode::Global)
            .await
            .unwrap();
        resolver
            .add_parameters(&store, &id("m2"), &names(&["db"]), &actor, SharingMode::Global)
            .await
            .unwrap();

        let usages = resolver
            .parameters_for_method(&store, &id("m1"))
            .await
            .unwrap();
        let summary: Vec<(&str, bool)> = usages
            .iter()
            .map(|u| (u.parameter.name.as_str(), u.shared))
            .collect();
        assert_eq!(summary, vec![("db", true), ("id", false)]);
    }

    #[tokio::test]
    async fn test_sweep_orphans_deletes_unlinked_definitions() {
        let store = seeded_store().await;
        let resolver = SharingResolver::default();
        let actor = UserContext::default();

        resolver
            .add_parameters(&store, &id("m1"), &names(&["kept"]), &actor, SharingMode::Global)
            .await
            .unwrap();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_parameter(&Parameter::new("legacy", "import"))
                .await
                .unwrap();
            tx.commit().await.unwrap();
        }

        assert_eq!(resolver.sweep_orphans(&store, &actor).await.unwrap(), 1);
        assert_eq!(resolver.sweep_orphans(&store, &actor).await.unwrap(), 0);
        assert_no_orphans(&store).await;
    }

    /// Store whose transactions refuse to create definitions with one name.
    #[derive(Clone)]
    struct FlakyStore {
        inner: InMemoryStore,
        poisoned: &'static str,
    }

    struct FlakyTx {
        inner: Box<dyn StoreTx>,
        poisoned: &'static str,
    }

    #[async_trait::async_trait]
    impl Store for FlakyStore {
        async fn begin(&self) -> Result<Box<dyn StoreTx>> {
            Ok(Box::new(FlakyTx {
                inner: self.inner.begin().await?,
                poisoned: self.poisoned,
            }))
        }
    }

    #[async_trait::async_trait]
    impl StoreTx for FlakyTx {
        async fn commit(self: Box<Self>) -> Result<()> {
            self.inner.commit().await
        }
    }

    #[async_trait::async_trait]
    impl ParameterStore for FlakyTx {
        async fn get_parameter(&mut self, id: &Id) -> Result<Option<Parameter>> {
            self.inner.get_parameter(id).await
        }
        async fn find_parameter_by_name(&mut self, name: &str) -> Result<Option<Parameter>> {
            self.inner.find_parameter_by_name(name).await
        }
        async fn insert_parameter(&mut self, parameter: &Parameter) -> Result<()> {
            if parameter.name == self.poisoned {
                return Err(anyhow::anyhow!("disk full").into());
            }
            self.inner.insert_parameter(parameter).await
        }
        async fn save_parameter(&mut self, parameter: &Parameter) -> Result<()> {
            self.inner.save_parameter(parameter).await
        }
        async fn delete_parameter_if_orphaned(&mut self, id: &Id) -> Result<bool> {
            self.inner.delete_parameter_if_orphaned(id).await
        }
        async fn orphaned_parameter_ids(&mut self) -> Result<Vec<Id>> {
            self.inner.orphaned_parameter_ids().await
        }
    }

    #[async_trait::async_trait]
    impl MethodParameterLinker for FlakyTx {
        async fn link(
            &mut self,
            method_id: &Id,
            parameter_id: &Id,
            created_by: &str,
        ) -> Result<MethodParameterMap> {
            self.inner.link(method_id, parameter_id, created_by).await
        }
        async fn unlink(&mut self, method_id: &Id, parameter_id: &Id) -> Result<()> {
            self.inner.unlink(method_id, parameter_id).await
        }
        async fn link_count(&mut self, parameter_id: &Id) -> Result<usize> {
            self.inner.link_count(parameter_id).await
        }
        async fn find_link(
            &mut self,
            method_id: &Id,
            parameter_id: &Id,
        ) -> Result<Option<MethodParameterMap>> {
            self.inner.find_link(method_id, parameter_id).await
        }
        async fn parameters_for_method(&mut self, method_id: &Id) -> Result<Vec<Parameter>> {
            self.inner.parameters_for_method(method_id).await
        }
    }

    #[async_trait::async_trait]
    impl MethodStore for FlakyTx {
        async fn get_method(&mut self, id: &Id) -> Result<Option<Method>> {
            self.inner.get_method(id).await
        }
        async fn upsert_method(&mut self, method: &Method) -> Result<()> {
            self.inner.upsert_method(method).await
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_isolated_per_name() {
        let inner = seeded_store().await;
        let store = FlakyStore {
            inner: inner.clone(),
            poisoned: "broken",
        };

        let result = SharingResolver::default()
            .add_parameters(
                &store,
                &id("m1"),
                &names(&["db", "broken", "id"]),
                &UserContext::default(),
                SharingMode::Local,
            )
            .await
            .unwrap();

        assert_eq!(result.created, vec!["db", "id"]);
        assert_eq!(result.failed, vec!["broken"]);
        assert_no_orphans(&inner).await;
    }

    #[tokio::test]
    async fn test_failed_transition_rolls_back_unlink() {
        let inner = seeded_store().await;
        let resolver = SharingResolver::default();
        let actor = UserContext::default();

        let added = resolver
            .add_parameters(&inner, &id("m1"), &names(&["broken"]), &actor, SharingMode::Global)
            .await
            .unwrap();
        let original = parameter_id(&added, "broken");

        let store = FlakyStore {
            inner: inner.clone(),
            poisoned: "broken",
        };
        let err = resolver
            .localise_globalise_parameter(&store, &id("m1"), &original, SharingMode::Local, &actor)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogueError::Storage(_)));

        assert!(get_parameter(&inner, &original).await.is_some());
        let mut tx = inner.begin().await.unwrap();
        assert!(tx
            .find_link(&id("m1"), &original)
            .await
            .unwrap()
            .is_some());
    }
}
