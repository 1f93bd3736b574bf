//! Suspended workflow instances.

use serde::Serialize;

use crate::effect::Effect;
use crate::error::{Error, Result};
use crate::workflow::{Resume, Transition, Workflow};

/// Lifecycle status of a [`WorkflowInstance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Status<F> {
    /// Waiting for the next resume value.
    Suspended,
    /// Finished normally, including runs whose failure was handled.
    Completed,
    /// Ended by an uncaught failure.
    Faulted(F),
}

impl<F> Status<F> {
    /// Returns `true` for [`Status::Completed`].
    pub fn is_completed(&self) -> bool {
        matches!(self, Status::Completed)
    }

    /// Returns `true` for [`Status::Faulted`].
    pub fn is_faulted(&self) -> bool {
        matches!(self, Status::Faulted(_))
    }
}

/// How an instance ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum TerminalStatus<F> {
    /// Finished normally.
    Completed,
    /// Ended by an uncaught failure.
    Faulted(F),
}

impl<F> TerminalStatus<F> {
    /// Returns `true` for [`TerminalStatus::Completed`].
    pub fn is_completed(&self) -> bool {
        matches!(self, TerminalStatus::Completed)
    }

    /// Transform the fault, e.g. to erase its type.
    pub fn map_fault<G>(self, f: impl FnOnce(F) -> G) -> TerminalStatus<G> {
        match self {
            TerminalStatus::Completed => TerminalStatus::Completed,
            TerminalStatus::Faulted(fault) => TerminalStatus::Faulted(f(fault)),
        }
    }
}

/// What one resumption produced: a yielded effect, or termination.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<O, A, F> {
    /// The workflow suspended, asking for this effect.
    Yielded(Effect<O, A>),
    /// The workflow terminated.
    Done(TerminalStatus<F>),
}

/// [`Step`] for a given workflow type.
pub type StepOf<W> =
    Step<<W as Workflow>::Operation, <W as Workflow>::Action, <W as Workflow>::Fault>;

impl<O, A, F> Step<O, A, F> {
    /// An `Invoke` of `operation` was yielded.
    pub fn invoke(operation: O) -> Self {
        Step::Yielded(Effect::Invoke(operation))
    }

    /// An `Emit` of `action` was yielded.
    pub fn emit(action: A) -> Self {
        Step::Yielded(Effect::Emit(action))
    }

    /// The workflow completed.
    pub fn completed() -> Self {
        Step::Done(TerminalStatus::Completed)
    }

    /// The workflow faulted with `fault`.
    pub fn faulted(fault: F) -> Self {
        Step::Done(TerminalStatus::Faulted(fault))
    }

    /// The yielded effect, if any.
    pub fn into_effect(self) -> Option<Effect<O, A>> {
        match self {
            Step::Yielded(effect) => Some(effect),
            Step::Done(_) => None,
        }
    }
}

/// One live run of a [`Workflow`].
///
/// The instance owns the workflow's position record and status. Its only
/// mutators are [`resume`](Self::resume) and
/// [`resume_with_fault`](Self::resume_with_fault); each call yields at most
/// one effect and nothing happens between calls.
///
/// Cloning (or [`branch`](Self::branch)) produces an independent continuation
/// that shares everything observed so far and diverges from there.
///
/// # Example
///
/// ```ignore
/// let mut instance = WorkflowInstance::<DeleteDevicesWorkflow>::new(request);
/// let first = instance.resume(Resume::Next)?;
/// assert_eq!(first, Step::invoke(DeviceOperation::FetchActiveConnectionString));
/// ```
pub struct WorkflowInstance<W: Workflow> {
    state: W::State,
    status: Status<W::Fault>,
}

impl<W: Workflow> WorkflowInstance<W> {
    /// Create a fresh, suspended instance for a triggering input.
    pub fn new(input: W::Input) -> Self {
        Self {
            state: W::start(input),
            status: Status::Suspended,
        }
    }

    /// The instance's status.
    pub fn status(&self) -> &Status<W::Fault> {
        &self.status
    }

    /// Returns `true` once the instance completed or faulted.
    pub fn is_terminated(&self) -> bool {
        !matches!(self.status, Status::Suspended)
    }

    /// Perform one resumption.
    ///
    /// Returns the next yielded effect, or the terminal status if the workflow
    /// finished. A resume the current position cannot accept is rejected with
    /// [`Error::UnexpectedResume`] and the instance stays where it was.
    pub fn resume(&mut self, resume: Resume<W::Reply, W::Fault>) -> Result<StepOf<W>> {
        if self.is_terminated() {
            return Err(Error::AlreadyTerminated {
                workflow_type: W::TYPE,
            });
        }

        let kind = resume.kind();
        match W::step(&self.state, resume) {
            Transition::Yield(state, effect) => {
                self.state = state;
                Ok(Step::Yielded(effect))
            }
            Transition::Complete => {
                self.status = Status::Completed;
                Ok(Step::completed())
            }
            Transition::Fault(fault) => {
                self.status = Status::Faulted(fault.clone());
                Ok(Step::faulted(fault))
            }
            Transition::Reject { expected } => Err(Error::UnexpectedResume {
                workflow_type: W::TYPE,
                position: format!("{:?}", self.state),
                expected,
                resume: kind,
            }),
        }
    }

    /// Resume as if the previous `Invoke` had failed with `fault`.
    pub fn resume_with_fault(&mut self, fault: W::Fault) -> Result<StepOf<W>> {
        self.resume(Resume::Fault(fault))
    }

    /// Produce an independent continuation from the current position.
    pub fn branch(&self) -> Self {
        self.clone()
    }
}

impl<W: Workflow> Clone for WorkflowInstance<W> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            status: self.status.clone(),
        }
    }
}

impl<W: Workflow> std::fmt::Debug for WorkflowInstance<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowInstance")
            .field("workflow_type", &W::TYPE)
            .field("state", &self.state)
            .field("status", &self.status)
            .finish()
    }
}
