//! Bulk device-registry workflows built on effectflow.
//!
//! Each bulk operation is a [`BulkWorkflow`]: fetch the active connection
//! string, run one mutating registry call, then emit one notification and one
//! record action. Failures of the mutating call are handled inside the
//! workflow; failures before it fault the run.
//!
//! # Example
//!
//! ```ignore
//! use device_workflows::{DeleteDevicesRequest, DeleteDevicesWorkflow, DeviceWorkflowsConfig, service};
//! use effectflow::TriggerRequest;
//!
//! let service = service(context, registry, store, DeviceWorkflowsConfig::default())?;
//! let report = service
//!     .trigger_request(&TriggerRequest::typed::<DeleteDevicesWorkflow>(
//!         &DeleteDevicesRequest::devices(["device_id1", "device_id2"]),
//!     )?)
//!     .await?;
//! assert!(report.ended_with_terminal_action());
//! ```

pub mod actions;
mod bindings;
pub mod model;
mod operations;
pub mod workflows;

use std::sync::Arc;

use effectflow::{Dispatcher, RetryPolicy, Retrying, RuntimeConfig, WorkflowService};

pub use actions::{BulkAction, Severity};
pub use bindings::{ConnectionContext, DeviceBindings, DeviceRegistry};
pub use model::{
    BulkError, BulkOperationResult, BulkWarning, ConnectionString, DeviceDescription,
    DeviceError, DeviceId, DeviceStatus,
};
pub use operations::{DeviceOperation, DeviceReply};
pub use workflows::{
    AddDevices, AddDevicesRequest, AddDevicesWorkflow, BulkKind, BulkRequest, BulkState,
    BulkWorkflow, DeleteDevices, DeleteDevicesRequest, DeleteDevicesWorkflow,
};

/// Configuration for [`service`].
#[derive(Debug, Clone, Default)]
pub struct DeviceWorkflowsConfig {
    /// Interpretation settings shared by both workflows.
    pub runtime: RuntimeConfig,

    /// Retry retryable device failures inside the bound operations.
    ///
    /// See [`DeviceError::is_retryable`]. Default: `None` (every operation
    /// runs exactly once).
    pub retry: Option<RetryPolicy>,
}

/// Build a service running both bulk workflows against the given collaborators.
///
/// `store` receives every emitted [`BulkAction`] of both workflows, in yield
/// order per run.
pub fn service<C, R, S>(
    context: C,
    registry: R,
    store: S,
    config: DeviceWorkflowsConfig,
) -> effectflow::Result<WorkflowService>
where
    C: ConnectionContext,
    R: DeviceRegistry,
    S: Dispatcher<BulkAction<Vec<DeviceId>>> + Dispatcher<BulkAction<Vec<DeviceDescription>>>,
{
    let bindings = Arc::new(DeviceBindings::new(context, registry));
    let store = Arc::new(store);
    let builder = WorkflowService::builder().config(config.runtime);

    let builder = match config.retry {
        Some(policy) => {
            let bindings = Arc::new(Retrying::new(bindings, policy, DeviceError::is_retryable));
            builder
                .register::<DeleteDevicesWorkflow, _, _>(Arc::clone(&bindings), Arc::clone(&store))
                .register::<AddDevicesWorkflow, _, _>(bindings, store)
        }
        None => builder
            .register::<DeleteDevicesWorkflow, _, _>(Arc::clone(&bindings), Arc::clone(&store))
            .register::<AddDevicesWorkflow, _, _>(bindings, store),
    };

    builder.build_service()
}
