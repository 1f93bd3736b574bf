//! Driving workflow instances against real collaborators.

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::effect::{Dispatcher, Effect, EffectContext, Named, OperationHandler};
use crate::error::{Error, Result};
use crate::instance::{Step, TerminalStatus, WorkflowInstance};
use crate::runtime::RuntimeConfig;
use crate::workflow::{Resume, TerminalActions, Workflow, WorkflowRef};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome<F> {
    /// The workflow reached a terminal status.
    Finished(TerminalStatus<F>),
    /// The run was abandoned through its shutdown signal.
    Cancelled,
}

/// Summary of one interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport<F> {
    /// The run, as `(workflow type, run id)`.
    pub workflow: WorkflowRef,
    /// How the run ended.
    pub outcome: RunOutcome<F>,
    /// Number of `Invoke` effects executed.
    pub invocations: u32,
    /// Number of `Emit` effects delivered.
    pub emissions: u32,
    /// Name of the last delivered action.
    pub last_action: Option<&'static str>,
    /// The workflow type's terminal action names.
    pub terminal: TerminalActions,
}

impl<F> RunReport<F> {
    /// The terminal status, unless the run was cancelled.
    pub fn status(&self) -> Option<&TerminalStatus<F>> {
        match &self.outcome {
            RunOutcome::Finished(status) => Some(status),
            RunOutcome::Cancelled => None,
        }
    }

    /// Returns `true` if the last delivered action records the outcome.
    pub fn ended_with_terminal_action(&self) -> bool {
        self.last_action
            .is_some_and(|action| self.terminal.contains(action))
    }

    /// Transform the fault, e.g. to erase its type.
    pub fn map_fault<G>(self, f: impl FnOnce(F) -> G) -> RunReport<G> {
        RunReport {
            workflow: self.workflow,
            outcome: match self.outcome {
                RunOutcome::Finished(status) => RunOutcome::Finished(status.map_fault(f)),
                RunOutcome::Cancelled => RunOutcome::Cancelled,
            },
            invocations: self.invocations,
            emissions: self.emissions,
            last_action: self.last_action,
            terminal: self.terminal,
        }
    }
}

/// Executes the effects a workflow yields.
///
/// The interpreter is built from explicit collaborators: an
/// [`OperationHandler`] for `Invoke` effects and a [`Dispatcher`] for `Emit`
/// effects. It holds no other state, so one interpreter can drive any number
/// of instances, concurrently if the caller wishes. Within one instance:
///
/// 1. Resume the instance (first with `Next`)
/// 2. On `Invoke`, call the handler once and keep its reply or fault
/// 3. On `Emit`, dispatch the action and keep `Next`
/// 4. Resume with what was kept; repeat until `Completed` or `Faulted`
///
/// Effects execute strictly in yield order and never overlap. Nothing is
/// retried here; see [`Retrying`](crate::Retrying) for retries owned by a
/// bound operation.
///
/// # Example
///
/// ```ignore
/// let interpreter = Interpreter::new(bindings, store);
/// let status = interpreter
///     .run(WorkflowInstance::<DeleteDevicesWorkflow>::new(request))
///     .await?;
/// ```
pub struct Interpreter<H, D> {
    handler: H,
    dispatcher: D,
    config: RuntimeConfig,
}

impl<H, D> Interpreter<H, D> {
    /// Create an interpreter with the default [`RuntimeConfig`].
    pub fn new(handler: H, dispatcher: D) -> Self {
        Self {
            handler,
            dispatcher,
            config: RuntimeConfig::default(),
        }
    }

    /// Replace the runtime configuration.
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub(crate) fn set_config(&mut self, config: RuntimeConfig) {
        self.config = config;
    }

    /// Returns the runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Borrow the bound operations.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Borrow the dispatcher.
    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Drive `instance` to completion and return its terminal status.
    pub async fn run<W>(&self, instance: WorkflowInstance<W>) -> Result<TerminalStatus<W::Fault>>
    where
        W: Workflow,
        H: OperationHandler<W::Operation, Reply = W::Reply, Fault = W::Fault>,
        D: Dispatcher<W::Action>,
    {
        let report = self.execute(instance, None).await?;
        match report.outcome {
            RunOutcome::Finished(status) => Ok(status),
            RunOutcome::Cancelled => Err(Error::Cancelled {
                workflow: report.workflow.to_string(),
            }),
        }
    }

    /// Drive `instance` until it terminates or `shutdown` turns `true`.
    ///
    /// The signal is checked before each effect executes, and an in-flight
    /// invoke is dropped (cancelling it if the bound operation supports that)
    /// as soon as the signal arrives. A cancelled run executes no further
    /// effects. A signal that arrives after the last effect has executed does
    /// not cancel the run.
    pub async fn run_until<W>(
        &self,
        instance: WorkflowInstance<W>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<RunReport<W::Fault>>
    where
        W: Workflow,
        H: OperationHandler<W::Operation, Reply = W::Reply, Fault = W::Fault>,
        D: Dispatcher<W::Action>,
    {
        self.execute(instance, Some(shutdown)).await
    }

    /// Drive `instance`, optionally observing a shutdown signal, and report.
    pub async fn execute<W>(
        &self,
        mut instance: WorkflowInstance<W>,
        mut shutdown: Option<watch::Receiver<bool>>,
    ) -> Result<RunReport<W::Fault>>
    where
        W: Workflow,
        H: OperationHandler<W::Operation, Reply = W::Reply, Fault = W::Fault>,
        D: Dispatcher<W::Action>,
    {
        let run_id = Uuid::now_v7();
        let workflow = WorkflowRef::new(W::TYPE, run_id.to_string());
        let started_at = OffsetDateTime::now_utc();

        let mut invocations = 0;
        let mut emissions = 0;
        let mut last_action = None;
        let report = |outcome: RunOutcome<W::Fault>,
                      invocations: u32,
                      emissions: u32,
                      last_action: Option<&'static str>| RunReport {
            workflow: workflow.clone(),
            outcome,
            invocations,
            emissions,
            last_action,
            terminal: W::TERMINAL,
        };

        info!(workflow = %workflow, "Workflow run started");

        let mut resume = Resume::Next;
        let mut step = 0u32;
        loop {
            let effect = match instance.resume(resume)? {
                Step::Yielded(effect) => effect,
                Step::Done(status) => {
                    match &status {
                        TerminalStatus::Completed => {
                            info!(workflow = %workflow, steps = step, "Workflow run completed")
                        }
                        TerminalStatus::Faulted(fault) => warn!(
                            workflow = %workflow,
                            steps = step,
                            error = %fault,
                            "Workflow run faulted"
                        ),
                    }
                    return Ok(report(
                        RunOutcome::Finished(status),
                        invocations,
                        emissions,
                        last_action,
                    ));
                }
            };

            // Only effects are cancellable; resuming is pure.
            if is_cancelled(&shutdown) {
                warn!(workflow = %workflow, step, "Workflow run cancelled");
                return Ok(report(RunOutcome::Cancelled, invocations, emissions, last_action));
            }

            step += 1;
            if step > self.config.max_steps {
                warn!(workflow = %workflow, limit = self.config.max_steps, "Step limit exceeded");
                return Err(Error::StepLimitExceeded {
                    workflow: workflow.to_string(),
                    limit: self.config.max_steps,
                });
            }

            let ctx = EffectContext::new(run_id, workflow.clone(), step, started_at);
            self.log_effect(&ctx, &effect);

            resume = match effect {
                Effect::Invoke(operation) => {
                    invocations += 1;
                    let invoked = tokio::select! {
                        biased;
                        _ = cancelled(&mut shutdown) => None,
                        result = self.handler.invoke(&operation, &ctx) => Some(result),
                    };
                    match invoked {
                        Some(Ok(reply)) => Resume::Value(reply),
                        Some(Err(fault)) => {
                            warn!(
                                workflow = %workflow,
                                step,
                                operation = operation.name(),
                                error = %fault,
                                "Bound operation failed, injecting fault"
                            );
                            Resume::Fault(fault)
                        }
                        None => {
                            warn!(
                                workflow = %workflow,
                                step,
                                operation = operation.name(),
                                "Workflow run cancelled during invoke"
                            );
                            return Ok(report(
                                RunOutcome::Cancelled,
                                invocations,
                                emissions,
                                last_action,
                            ));
                        }
                    }
                }
                Effect::Emit(action) => {
                    emissions += 1;
                    last_action = Some(action.name());
                    self.dispatcher.dispatch(action, &ctx).await;
                    Resume::Next
                }
            };
        }
    }

    fn log_effect<O, A>(&self, ctx: &EffectContext, effect: &Effect<O, A>)
    where
        O: Named + Serialize,
        A: Named + Serialize,
    {
        let kind = if effect.is_invoke() { "invoke" } else { "emit" };
        if self.config.log_payloads {
            let payload = serde_json::to_string(effect)
                .unwrap_or_else(|e| format!("<unserializable: {e}>"));
            debug!(
                workflow = %ctx.workflow,
                step = ctx.step,
                kind,
                name = effect.name(),
                payload = %payload,
                "Executing effect"
            );
        } else {
            debug!(
                workflow = %ctx.workflow,
                step = ctx.step,
                kind,
                name = effect.name(),
                "Executing effect"
            );
        }
    }
}

fn is_cancelled(shutdown: &Option<watch::Receiver<bool>>) -> bool {
    shutdown.as_ref().is_some_and(|rx| *rx.borrow())
}

/// Resolves once the shutdown signal turns `true`; never without a signal.
async fn cancelled(shutdown: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = shutdown {
        let closed = rx.wait_for(|stop| *stop).await.is_err();
        if !closed {
            return;
        }
    }
    // No signal, or the sender is gone: the run can no longer be cancelled.
    std::future::pending::<()>().await
}
