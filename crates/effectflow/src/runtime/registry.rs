//! Workflow registry and service builder.

use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info};

use super::config::RuntimeConfig;
use crate::effect::{Dispatcher, OperationHandler};
use crate::error::{Error, Result};
use crate::instance::WorkflowInstance;
use crate::interpreter::{Interpreter, RunReport};
use crate::service::WorkflowService;
use crate::workflow::{TerminalActions, Workflow};

/// Type-erased workflow entry for dynamic dispatch.
///
/// This trait allows the registry to store different workflow types
/// in a single HashMap while preserving type-safe execution.
#[async_trait]
pub(crate) trait WorkflowEntry: Send + Sync {
    /// Run one fresh instance for a JSON trigger payload.
    ///
    /// Deserializes the payload into the workflow's input and drives a new
    /// instance through the entry's interpreter. Faults are rendered as
    /// strings so that reports from every workflow type share one shape.
    async fn trigger(
        &self,
        payload: Value,
        shutdown: Option<watch::Receiver<bool>>,
    ) -> Result<RunReport<String>>;

    /// Names of the workflow type's terminal actions.
    fn terminal_actions(&self) -> TerminalActions;

    /// Apply the runtime configuration chosen at build time.
    fn configure(&mut self, config: RuntimeConfig);
}

/// Typed workflow entry that captures concrete types at registration.
///
/// Wraps an interpreter over the bound operations and dispatcher for a
/// specific workflow type.
struct TypedWorkflowEntry<W, H, D> {
    interpreter: Interpreter<H, D>,
    _marker: PhantomData<fn() -> W>,
}

#[async_trait]
impl<W, H, D> WorkflowEntry for TypedWorkflowEntry<W, H, D>
where
    W: Workflow,
    H: OperationHandler<W::Operation, Reply = W::Reply, Fault = W::Fault>,
    D: Dispatcher<W::Action>,
{
    async fn trigger(
        &self,
        payload: Value,
        shutdown: Option<watch::Receiver<bool>>,
    ) -> Result<RunReport<String>> {
        let input: W::Input = serde_json::from_value(payload)?;
        let report = self
            .interpreter
            .execute(WorkflowInstance::<W>::new(input), shutdown)
            .await?;
        Ok(report.map_fault(|fault| fault.to_string()))
    }

    fn terminal_actions(&self) -> TerminalActions {
        W::TERMINAL
    }

    fn configure(&mut self, config: RuntimeConfig) {
        self.interpreter.set_config(config);
    }
}

/// Registry mapping workflow types to their entries.
///
/// Built once through [`WorkflowRegistry::builder`] and then shared
/// read-only by every [`WorkflowService`] clone.
pub struct WorkflowRegistry {
    entries: HashMap<&'static str, Box<dyn WorkflowEntry>>,
}

impl WorkflowRegistry {
    /// Create a new registry builder.
    pub fn builder() -> WorkflowBuilder {
        WorkflowBuilder::new()
    }

    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn register<W, H, D>(&mut self, handler: H, dispatcher: D)
    where
        W: Workflow,
        H: OperationHandler<W::Operation, Reply = W::Reply, Fault = W::Fault>,
        D: Dispatcher<W::Action>,
    {
        let entry = TypedWorkflowEntry::<W, H, D> {
            interpreter: Interpreter::new(handler, dispatcher),
            _marker: PhantomData,
        };
        self.entries.insert(W::TYPE, Box::new(entry));
    }

    /// Look up a workflow entry by type.
    ///
    /// Returns the static workflow type key and the entry if found.
    pub(crate) fn get(&self, workflow_type: &str) -> Option<(&'static str, &dyn WorkflowEntry)> {
        self.entries
            .get_key_value(workflow_type)
            .map(|(k, v)| (*k, v.as_ref()))
    }

    /// Returns the registered workflow types, sorted.
    pub fn workflow_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.entries.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Returns the number of registered workflows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for constructing a [`WorkflowService`].
///
/// Use this to register workflows with their bound operations and
/// dispatcher, and to configure interpretation, before serving triggers.
///
/// # Example
///
/// ```ignore
/// let service = WorkflowRegistry::builder()
///     .register::<DeleteDevicesWorkflow, _, _>(bindings.clone(), store.clone())
///     .register::<AddDevicesWorkflow, _, _>(bindings, store)
///     .config(RuntimeConfig {
///         max_steps: 16,
///         ..Default::default()
///     })
///     .build_service()?;
/// ```
pub struct WorkflowBuilder {
    registry: WorkflowRegistry,
    duplicate_workflow_type: Option<String>,
    config: RuntimeConfig,
}

impl WorkflowBuilder {
    fn new() -> Self {
        Self {
            registry: WorkflowRegistry::new(),
            duplicate_workflow_type: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Register a workflow type with its bound operations and dispatcher.
    ///
    /// The workflow's `TYPE` constant is used as the key for routing.
    /// Each workflow type can only be registered once.
    ///
    /// Defers duplicate workflow type checks until build time.
    pub fn register<W, H, D>(mut self, handler: H, dispatcher: D) -> Self
    where
        W: Workflow,
        H: OperationHandler<W::Operation, Reply = W::Reply, Fault = W::Fault>,
        D: Dispatcher<W::Action>,
    {
        if self.registry.entries.contains_key(W::TYPE) {
            if self.duplicate_workflow_type.is_none() {
                self.duplicate_workflow_type = Some(W::TYPE.to_string());
            }
            return self;
        }

        debug!(workflow_type = W::TYPE, "Workflow registered");
        self.registry.register::<W, _, _>(handler, dispatcher);
        self
    }

    /// Set the runtime configuration.
    ///
    /// If not called, uses [`RuntimeConfig::default()`].
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the registry.
    pub fn build(mut self) -> Result<WorkflowRegistry> {
        if let Some(workflow_type) = self.duplicate_workflow_type {
            return Err(Error::DuplicateWorkflowType(workflow_type));
        }
        for entry in self.registry.entries.values_mut() {
            entry.configure(self.config.clone());
        }
        Ok(self.registry)
    }

    /// Build the workflow service.
    pub fn build_service(self) -> Result<WorkflowService> {
        let registry = self.build()?;
        info!(
            workflows = registry.len(),
            types = ?registry.workflow_types(),
            "Workflow service ready"
        );
        Ok(WorkflowService::new(registry))
    }
}
