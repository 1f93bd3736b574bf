//! Runtime for interpreting registered workflows.
//!
//! - [`WorkflowRegistry`] — Workflow types mapped to their interpreters
//! - [`WorkflowBuilder`] — Builder for registering workflows and configuring interpretation
//! - [`RuntimeConfig`] — Step budget and logging options
//!
//! # Example
//!
//! ```ignore
//! use effectflow::runtime::{RuntimeConfig, WorkflowRegistry};
//!
//! let service = WorkflowRegistry::builder()
//!     .register::<DeleteDevicesWorkflow, _, _>(bindings.clone(), store.clone())
//!     .register::<AddDevicesWorkflow, _, _>(bindings, store)
//!     .config(RuntimeConfig::default())
//!     .build_service()?;
//!
//! let report = service.trigger_request(&request).await?;
//! ```

mod config;
pub(crate) mod registry;

pub use config::RuntimeConfig;
pub use registry::{WorkflowBuilder, WorkflowRegistry};
