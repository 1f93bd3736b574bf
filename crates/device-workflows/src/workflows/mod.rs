//! Bulk device workflows.
//!
//! - [`DeleteDevicesWorkflow`] — `"BulkDelete"`
//! - [`AddDevicesWorkflow`] — `"BulkAdd"`

mod add;
mod bulk;
mod delete;

pub use add::{AddDevices, AddDevicesRequest, AddDevicesWorkflow};
pub use bulk::{BulkKind, BulkRequest, BulkState, BulkWorkflow};
pub use delete::{DeleteDevices, DeleteDevicesRequest, DeleteDevicesWorkflow};
