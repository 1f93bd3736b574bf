//! Operations the bulk workflows invoke, and their replies.

use effectflow::Named;
use serde::{Deserialize, Serialize};

use crate::model::{BulkOperationResult, ConnectionString, DeviceDescription, DeviceId};

/// Operation vocabulary of the device workflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all_fields = "camelCase")]
pub enum DeviceOperation {
    /// Look up the connection string of the active registry.
    FetchActiveConnectionString,

    /// Remove devices from the registry.
    DeleteDevices {
        connection_string: ConnectionString,
        device_ids: Vec<DeviceId>,
    },

    /// Create devices in the registry.
    AddDevices {
        connection_string: ConnectionString,
        devices: Vec<DeviceDescription>,
    },
}

impl Named for DeviceOperation {
    fn name(&self) -> &'static str {
        match self {
            DeviceOperation::FetchActiveConnectionString => "FetchActiveConnectionString",
            DeviceOperation::DeleteDevices { .. } => "DeleteDevices",
            DeviceOperation::AddDevices { .. } => "AddDevices",
        }
    }
}

/// What a device operation replies with.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceReply {
    /// Reply to [`DeviceOperation::FetchActiveConnectionString`].
    ConnectionString(ConnectionString),
    /// Reply to a mutating bulk operation.
    Bulk(BulkOperationResult),
}

impl From<ConnectionString> for DeviceReply {
    fn from(connection_string: ConnectionString) -> Self {
        DeviceReply::ConnectionString(connection_string)
    }
}

impl From<BulkOperationResult> for DeviceReply {
    fn from(result: BulkOperationResult) -> Self {
        DeviceReply::Bulk(result)
    }
}
