//! Binding device operations to the external collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use effectflow::{EffectContext, OperationHandler};
use tracing::debug;

use crate::model::{BulkOperationResult, ConnectionString, DeviceDescription, DeviceError, DeviceId};
use crate::operations::{DeviceOperation, DeviceReply};

/// Source of the active registry connection.
#[async_trait]
pub trait ConnectionContext: Send + Sync + 'static {
    /// The connection string of the active registry.
    ///
    /// Fails with [`DeviceError::Connectivity`] when none is active.
    async fn active_connection_string(&self) -> Result<ConnectionString, DeviceError>;
}

/// Client of the device registry's bulk API.
///
/// Transport and service failures are reported as [`DeviceError::Service`].
/// A call that reaches the service but fails for some devices returns a
/// result with `is_successful = false` instead.
///
/// `idempotency_key` identifies the bulk request: it is the same on every
/// attempt of one mutation, so the registry can drop a repeated request that
/// already landed.
#[async_trait]
pub trait DeviceRegistry: Send + Sync + 'static {
    async fn delete_devices(
        &self,
        connection_string: &ConnectionString,
        device_ids: &[DeviceId],
        idempotency_key: &str,
    ) -> Result<BulkOperationResult, DeviceError>;

    async fn add_devices(
        &self,
        connection_string: &ConnectionString,
        devices: &[DeviceDescription],
        idempotency_key: &str,
    ) -> Result<BulkOperationResult, DeviceError>;
}

#[async_trait]
impl<T: ConnectionContext + ?Sized> ConnectionContext for Arc<T> {
    async fn active_connection_string(&self) -> Result<ConnectionString, DeviceError> {
        (**self).active_connection_string().await
    }
}

#[async_trait]
impl<T: DeviceRegistry + ?Sized> DeviceRegistry for Arc<T> {
    async fn delete_devices(
        &self,
        connection_string: &ConnectionString,
        device_ids: &[DeviceId],
        idempotency_key: &str,
    ) -> Result<BulkOperationResult, DeviceError> {
        (**self)
            .delete_devices(connection_string, device_ids, idempotency_key)
            .await
    }

    async fn add_devices(
        &self,
        connection_string: &ConnectionString,
        devices: &[DeviceDescription],
        idempotency_key: &str,
    ) -> Result<BulkOperationResult, DeviceError> {
        (**self)
            .add_devices(connection_string, devices, idempotency_key)
            .await
    }
}

/// Bound operations of the device workflows.
pub struct DeviceBindings<C, R> {
    context: C,
    registry: R,
}

impl<C, R> DeviceBindings<C, R> {
    pub fn new(context: C, registry: R) -> Self {
        Self { context, registry }
    }
}

#[async_trait]
impl<C, R> OperationHandler<DeviceOperation> for DeviceBindings<C, R>
where
    C: ConnectionContext,
    R: DeviceRegistry,
{
    type Reply = DeviceReply;
    type Fault = DeviceError;

    async fn invoke(
        &self,
        operation: &DeviceOperation,
        ctx: &EffectContext,
    ) -> Result<DeviceReply, DeviceError> {
        match operation {
            DeviceOperation::FetchActiveConnectionString => {
                let connection_string = self.context.active_connection_string().await?;
                Ok(DeviceReply::ConnectionString(connection_string))
            }
            DeviceOperation::DeleteDevices {
                connection_string,
                device_ids,
            } => {
                let key = ctx.idempotency_key();
                debug!(
                    workflow = %ctx.workflow,
                    key = %key,
                    devices = device_ids.len(),
                    "Deleting devices"
                );
                let result = self
                    .registry
                    .delete_devices(connection_string, device_ids, &key)
                    .await?;
                Ok(DeviceReply::Bulk(result))
            }
            DeviceOperation::AddDevices {
                connection_string,
                devices,
            } => {
                let key = ctx.idempotency_key();
                debug!(
                    workflow = %ctx.workflow,
                    key = %key,
                    devices = devices.len(),
                    "Adding devices"
                );
                let result = self
                    .registry
                    .add_devices(connection_string, devices, &key)
                    .await?;
                Ok(DeviceReply::Bulk(result))
            }
        }
    }
}
