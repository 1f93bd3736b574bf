//! Per-effect execution context with correlation and idempotency metadata.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::WorkflowRef;

/// Context handed to bound operations and dispatchers for each executed effect.
///
/// # Idempotency
///
/// Use [`idempotency_key()`](Self::idempotency_key) when calling external APIs
/// that accept one. The key is unique per effect within a run; the
/// interpreter never re-executes an effect, but a bound operation that retries
/// internally should send the same key on every attempt.
///
/// # Example
///
/// ```ignore
/// async fn invoke(&self, op: &DeviceOperation, ctx: &EffectContext) -> Result<DeviceReply, DeviceError> {
///     self.client.delete(ids, ctx.idempotency_key()).await
/// }
/// ```
#[derive(Debug, Clone)]
pub struct EffectContext {
    /// Identifier of the interpretation this effect belongs to (UUID v7).
    pub run_id: Uuid,

    /// The workflow run, as `(workflow type, run id)`.
    pub workflow: WorkflowRef,

    /// Position of this effect in the run (1-based).
    pub step: u32,

    /// When the run started.
    pub started_at: OffsetDateTime,
}

impl EffectContext {
    /// Create a new effect context.
    pub fn new(run_id: Uuid, workflow: WorkflowRef, step: u32, started_at: OffsetDateTime) -> Self {
        Self {
            run_id,
            workflow,
            step,
            started_at,
        }
    }

    /// Get the idempotency key for external service calls.
    ///
    /// Format: `{workflow_type}:{run_id}:{step}`
    pub fn idempotency_key(&self) -> String {
        format!("{}:{}", self.workflow, self.step)
    }

    /// Returns `true` for the first effect of a run.
    pub fn is_first(&self) -> bool {
        self.step == 1
    }
}
