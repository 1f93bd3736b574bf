//! Device-registry domain types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of one device in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a device ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque token granting access to the active device registry.
///
/// The `Debug` rendering hides the secret so that positions and effects can
/// be logged safely.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionString(String);

impl ConnectionString {
    /// Wrap a raw connection string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw connection string, for handing to a registry client.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConnectionString(***)")
    }
}

/// Whether a device may connect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceStatus {
    #[default]
    Enabled,
    Disabled,
}

/// Description of a device to create in a bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    pub device_id: DeviceId,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default)]
    pub edge_enabled: bool,
}

impl DeviceDescription {
    /// An enabled, non-edge device.
    pub fn new(device_id: impl Into<DeviceId>) -> Self {
        Self {
            device_id: device_id.into(),
            status: DeviceStatus::default(),
            edge_enabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.status = DeviceStatus::Disabled;
        self
    }

    pub fn edge(mut self) -> Self {
        self.edge_enabled = true;
        self
    }
}

/// Per-device error reported inside a bulk result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkError {
    pub device_id: DeviceId,
    pub error_code: String,
    pub error_status: String,
}

/// Per-device warning reported inside a bulk result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkWarning {
    pub device_id: DeviceId,
    pub warning_code: String,
    pub warning_status: String,
}

/// Outcome of a bulk registry operation that completed without failing.
///
/// `is_successful` may be `false` with per-device `errors`: the call itself
/// succeeded, some devices did not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationResult {
    pub is_successful: bool,
    #[serde(default)]
    pub errors: Vec<BulkError>,
    #[serde(default)]
    pub warnings: Vec<BulkWarning>,
}

impl BulkOperationResult {
    /// Every device succeeded.
    pub fn succeeded() -> Self {
        Self {
            is_successful: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Some devices failed.
    pub fn partial(errors: Vec<BulkError>) -> Self {
        Self {
            is_successful: false,
            errors,
            warnings: Vec::new(),
        }
    }
}

/// Failures of the device collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DeviceError {
    /// No active connection context exists.
    #[error("no active registry connection: {message}")]
    Connectivity { message: String },

    /// The registry service failed or could not be reached.
    #[error("device registry failed with code {code}")]
    Service { code: i64 },
}

impl DeviceError {
    pub fn connectivity(message: impl Into<String>) -> Self {
        DeviceError::Connectivity {
            message: message.into(),
        }
    }

    pub fn service(code: i64) -> Self {
        DeviceError::Service { code }
    }

    /// Returns `true` for failures worth another attempt: lost connectivity,
    /// throttling, and server-side errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeviceError::Connectivity { .. } => true,
            DeviceError::Service { code } => *code == 429 || (500..600).contains(code),
        }
    }
}
