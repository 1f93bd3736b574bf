//! Workflow service entrypoint.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use crate::Workflow;
use crate::error::{Error, Result};
use crate::interpreter::RunReport;
use crate::runtime::{WorkflowBuilder, WorkflowRegistry};
use crate::workflow::TerminalActions;

/// A request to run one workflow, addressed by its type.
///
/// # Example
///
/// ```
/// use effectflow::TriggerRequest;
/// use serde_json::json;
///
/// let request: TriggerRequest = serde_json::from_value(json!({
///     "kind": "BulkDelete",
///     "payload": { "params": ["device-1"] }
/// }))
/// .unwrap();
/// assert_eq!(request.kind, "BulkDelete");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRequest {
    /// Workflow type identifier (the workflow's `TYPE`).
    pub kind: String,
    /// JSON-encoded workflow input.
    pub payload: Value,
}

impl TriggerRequest {
    /// Create a request from a kind and a raw payload.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Create a request for workflow `W` from a typed input.
    pub fn typed<W: Workflow>(input: &W::Input) -> Result<Self> {
        Ok(Self::new(W::TYPE, serde_json::to_value(input)?))
    }
}

/// App-facing workflow service.
///
/// This is the single entrypoint for triggering workflows. Every trigger runs
/// a fresh instance to completion (or cancellation) and reports the outcome.
/// Clones share one registry.
#[derive(Clone)]
pub struct WorkflowService {
    registry: Arc<WorkflowRegistry>,
}

impl WorkflowService {
    /// Create a new service builder.
    pub fn builder() -> WorkflowBuilder {
        WorkflowRegistry::builder()
    }

    pub(crate) fn new(registry: WorkflowRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Run workflow `W` for a typed input.
    pub async fn trigger<W: Workflow>(&self, input: &W::Input) -> Result<RunReport<String>> {
        self.trigger_request(&TriggerRequest::typed::<W>(input)?)
            .await
    }

    /// Run the workflow a request addresses.
    pub async fn trigger_request(&self, request: &TriggerRequest) -> Result<RunReport<String>> {
        self.dispatch(request, None).await
    }

    /// Run the workflow a request addresses until `shutdown` turns `true`.
    pub async fn trigger_request_until(
        &self,
        request: &TriggerRequest,
        shutdown: watch::Receiver<bool>,
    ) -> Result<RunReport<String>> {
        self.dispatch(request, Some(shutdown)).await
    }

    async fn dispatch(
        &self,
        request: &TriggerRequest,
        shutdown: Option<watch::Receiver<bool>>,
    ) -> Result<RunReport<String>> {
        let Some((workflow_type, entry)) = self.registry.get(&request.kind) else {
            return Err(Error::UnknownWorkflowType(request.kind.clone()));
        };

        debug!(workflow_type, "Dispatching trigger");
        entry.trigger(request.payload.clone(), shutdown).await
    }

    /// Names of the terminal actions of a registered workflow type.
    pub fn terminal_actions(&self, kind: &str) -> Result<TerminalActions> {
        self.registry
            .get(kind)
            .map(|(_, entry)| entry.terminal_actions())
            .ok_or_else(|| Error::UnknownWorkflowType(kind.to_string()))
    }

    /// Returns the registered workflow types, sorted.
    pub fn workflow_types(&self) -> Vec<&'static str> {
        self.registry.workflow_types()
    }

    /// Returns the number of registered workflows.
    pub fn workflow_count(&self) -> usize {
        self.registry.len()
    }
}
