use crate::error::Result;
use crate::model::{Id, Method, MethodParameterMap, Parameter};

/// Persistence for parameter definitions.
#[async_trait::async_trait]
pub trait ParameterStore: Send {
    async fn get_parameter(&mut self, id: &Id) -> Result<Option<Parameter>>;
    /// Exact-name lookup used for global linking. Prefers a definition that is
    /// already shared, then the oldest one.
    async fn find_parameter_by_name(&mut self, name: &str) -> Result<Option<Parameter>>;
    /// Never rejects a duplicate name; identity is the id.
    async fn insert_parameter(&mut self, parameter: &Parameter) -> Result<()>;
    /// Write back the mutable fields (default value, required, constraints).
    async fn save_parameter(&mut self, parameter: &Parameter) -> Result<()>;
    /// Delete the parameter iff nothing links to it any more. The count and the
    /// delete happen under the same lock.
    async fn delete_parameter_if_orphaned(&mut self, id: &Id) -> Result<bool>;
    /// Parameters with zero incoming links.
    async fn orphaned_parameter_ids(&mut self) -> Result<Vec<Id>>;
}

/// The many-to-many edge between methods and parameters.
#[async_trait::async_trait]
pub trait MethodParameterLinker: Send {
    /// Fails with `Conflict` when the pair already exists.
    async fn link(
        &mut self,
        method_id: &Id,
        parameter_id: &Id,
        created_by: &str,
    ) -> Result<MethodParameterMap>;
    /// Fails with `NotFound` when the pair does not exist.
    async fn unlink(&mut self, method_id: &Id, parameter_id: &Id) -> Result<()>;
    async fn link_count(&mut self, parameter_id: &Id) -> Result<usize>;
    async fn find_link(
        &mut self,
        method_id: &Id,
        parameter_id: &Id,
    ) -> Result<Option<MethodParameterMap>>;
    /// Parameters linked from a method, in link order.
    async fn parameters_for_method(&mut self, method_id: &Id) -> Result<Vec<Parameter>>;
}

#[async_trait::async_trait]
pub trait MethodStore: Send {
    async fn get_method(&mut self, id: &Id) -> Result<Option<Method>>;
    async fn upsert_method(&mut self, method: &Method) -> Result<()>;
}

/// One unit of work. Dropping it without `commit` discards every write.
#[async_trait::async_trait]
pub trait StoreTx: ParameterStore + MethodParameterLinker + MethodStore + Send {
    async fn commit(self: Box<Self>) -> Result<()>;
}

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTx>>;
}
