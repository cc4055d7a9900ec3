use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{CatalogueError, Result};
use crate::model::{Id, Method, MethodParameterMap, Parameter};
use crate::store::traits::{MethodParameterLinker, MethodStore, ParameterStore, Store, StoreTx};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    methods: HashMap<Id, Method>,
    parameters: HashMap<Id, Parameter>,
    /// Kept in insertion order so a method lists its parameters stably.
    links: Vec<MethodParameterMap>,
}

impl MemoryState {
    fn link_count(&self, parameter_id: &Id) -> usize {
        self.links
            .iter()
            .filter(|link| &link.parameter_id == parameter_id)
            .count()
    }

    fn link_position(&self, method_id: &Id, parameter_id: &Id) -> Option<usize> {
        self.links
            .iter()
            .position(|link| &link.method_id == method_id && &link.parameter_id == parameter_id)
    }
}

/// Store that keeps everything in process memory.
///
/// Transactions hold the single state lock from `begin` until commit or drop,
/// so units of work are fully serialized. Writes go to a private copy that
/// replaces the shared state on commit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait::async_trait]
impl StoreTx for MemoryTx {
    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ParameterStore for MemoryTx {
    async fn get_parameter(&mut self, id: &Id) -> Result<Option<Parameter>> {
        Ok(self.working.parameters.get(id).cloned())
    }

    async fn find_parameter_by_name(&mut self, name: &str) -> Result<Option<Parameter>> {
        let state = &self.working;
        Ok(state
            .parameters
            .values()
            .filter(|p| p.name == name)
            .min_by(|a, b| {
                let a_shared = state.link_count(&a.id) > 1;
                let b_shared = state.link_count(&b.id) > 1;
                b_shared
                    .cmp(&a_shared)
                    .then_with(|| a.created_at.cmp(&b.created_at))
                    .then_with(|| a.id.cmp(&b.id))
            })
            .cloned())
    }

    async fn insert_parameter(&mut self, parameter: &Parameter) -> Result<()> {
        self.working
            .parameters
            .insert(parameter.id.clone(), parameter.clone());
        Ok(())
    }

    async fn save_parameter(&mut self, parameter: &Parameter) -> Result<()> {
        let Some(stored) = self.working.parameters.get_mut(&parameter.id) else {
            return Err(CatalogueError::not_found("parameter", parameter.id.clone()));
        };
        stored.default_value = parameter.default_value.clone();
        stored.required = parameter.required;
        stored.constrained_options = parameter.constrained_options.clone();
        stored.updated_by = parameter.updated_by.clone();
        stored.updated_at = parameter.updated_at;
        Ok(())
    }

    async fn delete_parameter_if_orphaned(&mut self, id: &Id) -> Result<bool> {
        if self.working.link_count(id) > 0 {
            return Ok(false);
        }
        Ok(self.working.parameters.remove(id).is_some())
    }

    async fn orphaned_parameter_ids(&mut self) -> Result<Vec<Id>> {
        let state = &self.working;
        let mut ids: Vec<Id> = state
            .parameters
            .keys()
            .filter(|id| state.link_count(id) == 0)
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait::async_trait]
impl MethodParameterLinker for MemoryTx {
    async fn link(
        &mut self,
        method_id: &Id,
        parameter_id: &Id,
        created_by: &str,
    ) -> Result<MethodParameterMap> {
        if self.working.link_position(method_id, parameter_id).is_some() {
            return Err(CatalogueError::Conflict {
                method_id: method_id.clone(),
                parameter_id: parameter_id.clone(),
            });
        }
        if !self.working.methods.contains_key(method_id) {
            return Err(CatalogueError::not_found("method", method_id.clone()));
        }
        if !self.working.parameters.contains_key(parameter_id) {
            return Err(CatalogueError::not_found("parameter", parameter_id.clone()));
        }

        let link = MethodParameterMap::new(method_id, parameter_id, created_by);
        self.working.links.push(link.clone());
        Ok(link)
    }

    async fn unlink(&mut self, method_id: &Id, parameter_id: &Id) -> Result<()> {
        let Some(position) = self.working.link_position(method_id, parameter_id) else {
            return Err(CatalogueError::not_found(
                "method parameter link",
                format!("{}/{}", method_id, parameter_id),
            ));
        };
        self.working.links.remove(position);
        Ok(())
    }

    async fn link_count(&mut self, parameter_id: &Id) -> Result<usize> {
        Ok(self.working.link_count(parameter_id))
    }

    async fn find_link(
        &mut self,
        method_id: &Id,
        parameter_id: &Id,
    ) -> Result<Option<MethodParameterMap>> {
        Ok(self
            .working
            .link_position(method_id, parameter_id)
            .map(|position| self.working.links[position].clone()))
    }

    async fn parameters_for_method(&mut self, method_id: &Id) -> Result<Vec<Parameter>> {
        let state = &self.working;
        Ok(state
            .links
            .iter()
            .filter(|link| &link.method_id == method_id)
            .filter_map(|link| state.parameters.get(&link.parameter_id).cloned())
            .collect())
    }
}

#[async_trait::async_trait]
impl MethodStore for MemoryTx {
    async fn get_method(&mut self, id: &Id) -> Result<Option<Method>> {
        Ok(self.working.methods.get(id).cloned())
    }

    async fn upsert_method(&mut self, method: &Method) -> Result<()> {
        self.working
            .methods
            .insert(method.id.clone(), method.clone());
        Ok(())
    }
}
