//! Bulk device creation.

use super::bulk::{BulkKind, BulkRequest, BulkWorkflow};
use crate::actions::keys;
use crate::model::{ConnectionString, DeviceDescription};
use crate::operations::DeviceOperation;

/// Creates a list of devices in the registry (bulk import).
pub struct AddDevices;

impl BulkKind for AddDevices {
    type Params = Vec<DeviceDescription>;

    const TYPE: &'static str = "BulkAdd";
    const SUCCESS_KEY: &'static str = keys::ADD_DEVICE_ON_SUCCEED;
    const ERROR_KEY: &'static str = keys::ADD_DEVICE_ON_ERROR;

    fn count(devices: &Vec<DeviceDescription>) -> usize {
        devices.len()
    }

    fn operation(
        connection_string: ConnectionString,
        devices: &Vec<DeviceDescription>,
    ) -> DeviceOperation {
        DeviceOperation::AddDevices {
            connection_string,
            devices: devices.clone(),
        }
    }
}

pub type AddDevicesWorkflow = BulkWorkflow<AddDevices>;

/// Input of [`AddDevicesWorkflow`].
pub type AddDevicesRequest = BulkRequest<Vec<DeviceDescription>>;

impl BulkRequest<Vec<DeviceDescription>> {
    /// Import `devices` into the active registry.
    pub fn descriptions(devices: impl IntoIterator<Item = DeviceDescription>) -> Self {
        BulkRequest::new(devices.into_iter().collect())
    }
}
