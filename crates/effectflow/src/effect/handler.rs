//! The two seams an interpreter executes effects through.

use std::sync::Arc;

use async_trait::async_trait;

use super::context::EffectContext;

/// Bound operations: the concrete functions behind `Invoke` effects.
///
/// Implement this once per operation vocabulary `O`. The handler receives the
/// operation value (reference plus arguments) and either returns the reply that
/// resumes the workflow, or a fault that is injected into it.
///
/// # Results
///
/// | Result | Meaning |
/// |--------|---------|
/// | `Ok(reply)` | Workflow resumes with `Resume::Value(reply)` |
/// | `Err(fault)` | Workflow resumes with `Resume::Fault(fault)` |
///
/// # Retries
///
/// The interpreter calls `invoke` exactly once per yielded effect. A handler
/// that wants retries does them itself, or is wrapped in
/// [`Retrying`](super::Retrying).
///
/// # Example
///
/// ```ignore
/// struct DeviceBindings { registry: RegistryClient }
///
/// #[async_trait]
/// impl OperationHandler<DeviceOperation> for DeviceBindings {
///     type Reply = DeviceReply;
///     type Fault = DeviceError;
///
///     async fn invoke(&self, op: &DeviceOperation, ctx: &EffectContext) -> Result<DeviceReply, DeviceError> {
///         match op {
///             DeviceOperation::DeleteDevices { connection_string, device_ids } => {
///                 let result = self.registry.delete(connection_string, device_ids).await?;
///                 Ok(DeviceReply::Bulk(result))
///             }
///             // ...
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait OperationHandler<O>: Send + Sync + 'static
where
    O: Send + Sync + 'static,
{
    /// Value a successful invoke resumes the workflow with.
    type Reply: Send + 'static;

    /// Failure injected into the workflow when the operation fails.
    type Fault: Send + 'static;

    /// Execute one operation.
    async fn invoke(&self, operation: &O, ctx: &EffectContext) -> Result<Self::Reply, Self::Fault>;
}

/// The external store's dispatch capability: the sink behind `Emit` effects.
///
/// Dispatch is fire-and-forget from the workflow's perspective; the
/// interpreter awaits it so that delivery order equals yield order.
#[async_trait]
pub trait Dispatcher<A>: Send + Sync + 'static
where
    A: Send + 'static,
{
    /// Deliver one action to the store.
    async fn dispatch(&self, action: A, ctx: &EffectContext);
}

#[async_trait]
impl<O, T> OperationHandler<O> for Arc<T>
where
    O: Send + Sync + 'static,
    T: OperationHandler<O> + ?Sized,
{
    type Reply = T::Reply;
    type Fault = T::Fault;

    async fn invoke(&self, operation: &O, ctx: &EffectContext) -> Result<Self::Reply, Self::Fault> {
        (**self).invoke(operation, ctx).await
    }
}

#[async_trait]
impl<A, T> Dispatcher<A> for Arc<T>
where
    A: Send + 'static,
    T: Dispatcher<A> + ?Sized,
{
    async fn dispatch(&self, action: A, ctx: &EffectContext) {
        (**self).dispatch(action, ctx).await
    }
}
