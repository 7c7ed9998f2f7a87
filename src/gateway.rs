use futures::future::BoxFuture;

use crate::error::FetchError;
use crate::model::{ParentKey, ResourceRef};

/// Read-only list capability backing one panel of the chain.
///
/// Each call returns a fresh snapshot. An empty `Vec` is a valid answer and is
/// distinct from an error. The returned future owns everything it needs so the
/// run loop can move it onto a task and abort it when it is superseded.
pub trait ResourceGateway: Send + Sync {
    fn list(&self, parent: &ParentKey) -> BoxFuture<'static, Result<Vec<ResourceRef>, FetchError>>;
}
