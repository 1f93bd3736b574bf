//! Actions the bulk workflows emit to the application store.

use effectflow::Named;
use serde::Serialize;

use crate::model::{BulkOperationResult, DeviceError};

/// Translation keys of the bulk notifications.
pub mod keys {
    pub const DELETE_DEVICE_ON_SUCCEED: &str = "notifications.deleteDeviceOnSucceed";
    pub const DELETE_DEVICE_ON_ERROR: &str = "notifications.deleteDeviceOnError";
    pub const ADD_DEVICE_ON_SUCCEED: &str = "notifications.addDeviceOnSucceed";
    pub const ADD_DEVICE_ON_ERROR: &str = "notifications.addDeviceOnError";
}

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Success,
    Error,
}

/// Action vocabulary of a bulk workflow over params `P`.
///
/// Every terminal path emits exactly one notification followed by exactly one
/// record. Notifications carry a translation key and the number of requested
/// items so that the UI can render a localized, quantity-aware message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum BulkAction<P> {
    /// User-facing success notification.
    NotifySuccess {
        translation_key: &'static str,
        count: usize,
    },

    /// User-facing failure notification.
    NotifyError {
        translation_key: &'static str,
        count: usize,
        error: DeviceError,
    },

    /// Records a bulk operation that completed, possibly with per-item errors.
    RecordCompletion {
        params: P,
        result: BulkOperationResult,
    },

    /// Records a bulk operation that failed as a whole.
    RecordFailure { params: P, error: DeviceError },
}

impl<P> BulkAction<P> {
    /// Notification severity; `None` for record actions.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            BulkAction::NotifySuccess { .. } => Some(Severity::Success),
            BulkAction::NotifyError { .. } => Some(Severity::Error),
            BulkAction::RecordCompletion { .. } | BulkAction::RecordFailure { .. } => None,
        }
    }

    /// Returns `true` for the two record actions.
    pub fn is_record(&self) -> bool {
        self.severity().is_none()
    }

    /// The requested item count of a notification.
    pub fn count(&self) -> Option<usize> {
        match self {
            BulkAction::NotifySuccess { count, .. } | BulkAction::NotifyError { count, .. } => {
                Some(*count)
            }
            _ => None,
        }
    }
}

impl<P> Named for BulkAction<P> {
    fn name(&self) -> &'static str {
        match self {
            BulkAction::NotifySuccess { .. } => "NotifySuccess",
            BulkAction::NotifyError { .. } => "NotifyError",
            BulkAction::RecordCompletion { .. } => "RecordCompletion",
            BulkAction::RecordFailure { .. } => "RecordFailure",
        }
    }
}
