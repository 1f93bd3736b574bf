//! Bulk device deletion.

use super::bulk::{BulkKind, BulkRequest, BulkWorkflow};
use crate::actions::keys;
use crate::model::{ConnectionString, DeviceId};
use crate::operations::DeviceOperation;

/// Removes a list of devices from the registry.
///
/// Device IDs are passed through unchanged: order and duplicates are kept,
/// and an empty list is not rejected here.
pub struct DeleteDevices;

impl BulkKind for DeleteDevices {
    type Params = Vec<DeviceId>;

    const TYPE: &'static str = "BulkDelete";
    const SUCCESS_KEY: &'static str = keys::DELETE_DEVICE_ON_SUCCEED;
    const ERROR_KEY: &'static str = keys::DELETE_DEVICE_ON_ERROR;

    fn count(device_ids: &Vec<DeviceId>) -> usize {
        device_ids.len()
    }

    fn operation(connection_string: ConnectionString, device_ids: &Vec<DeviceId>) -> DeviceOperation {
        DeviceOperation::DeleteDevices {
            connection_string,
            device_ids: device_ids.clone(),
        }
    }
}

pub type DeleteDevicesWorkflow = BulkWorkflow<DeleteDevices>;

/// Input of [`DeleteDevicesWorkflow`].
pub type DeleteDevicesRequest = BulkRequest<Vec<DeviceId>>;

impl BulkRequest<Vec<DeviceId>> {
    /// Delete `device_ids` on the active registry.
    pub fn devices<I>(device_ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<DeviceId>,
    {
        BulkRequest::new(device_ids.into_iter().map(Into::into).collect())
    }
}
