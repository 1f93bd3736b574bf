//! Step-by-step driving of workflows in tests.

use crate::effect::Effect;
use crate::instance::{Status, Step, StepOf, WorkflowInstance};
use crate::workflow::{Resume, Workflow};

/// Drives a [`WorkflowInstance`] by hand, executing nothing.
///
/// Every call performs exactly one resumption and hands back what the
/// workflow yielded, so a test can assert on each effect, answer invokes with
/// chosen replies, inject faults, and [`branch`](Self::branch) to explore
/// several continuations from one prefix.
///
/// Protocol violations (a resume the current position rejects, or resuming a
/// terminated instance) panic with the engine error.
///
/// # Example
///
/// ```ignore
/// let mut harness = Harness::<DeleteDevicesWorkflow>::new(request);
/// assert_eq!(harness.next(), Step::invoke(DeviceOperation::FetchActiveConnectionString));
///
/// let mut failure = harness.branch();
/// failure.fault(DeviceError::connectivity("offline"));
/// assert!(failure.status().is_faulted());
///
/// harness.send(DeviceReply::ConnectionString(conn));
/// ```
pub struct Harness<W: Workflow> {
    instance: WorkflowInstance<W>,
    history: Vec<Effect<W::Operation, W::Action>>,
}

impl<W: Workflow> Harness<W> {
    /// Start a fresh instance for `input`.
    pub fn new(input: W::Input) -> Self {
        Self::from_instance(WorkflowInstance::new(input))
    }

    /// Drive an existing instance.
    pub fn from_instance(instance: WorkflowInstance<W>) -> Self {
        Self {
            instance,
            history: Vec::new(),
        }
    }

    /// Resume once with `resume`.
    #[track_caller]
    pub fn advance(&mut self, resume: Resume<W::Reply, W::Fault>) -> StepOf<W> {
        let step = match self.instance.resume(resume) {
            Ok(step) => step,
            Err(e) => panic!("{} rejected a resume: {e}", W::TYPE),
        };
        if let Step::Yielded(effect) = &step {
            self.history.push(effect.clone());
        }
        step
    }

    /// Resume without a value (first resumption, or after an `Emit`).
    #[track_caller]
    pub fn next(&mut self) -> StepOf<W> {
        self.advance(Resume::Next)
    }

    /// Resume with a reply to the pending `Invoke`.
    #[track_caller]
    pub fn send(&mut self, reply: W::Reply) -> StepOf<W> {
        self.advance(Resume::Value(reply))
    }

    /// Inject `fault` at the current suspension point.
    #[track_caller]
    pub fn fault(&mut self, fault: W::Fault) -> StepOf<W> {
        self.advance(Resume::Fault(fault))
    }

    /// Independent continuation sharing everything observed so far.
    pub fn branch(&self) -> Self {
        Self {
            instance: self.instance.branch(),
            history: self.history.clone(),
        }
    }

    /// The instance's status.
    pub fn status(&self) -> &Status<W::Fault> {
        self.instance.status()
    }

    /// Effects yielded so far on this branch, in order.
    pub fn history(&self) -> &[Effect<W::Operation, W::Action>] {
        &self.history
    }

    /// Give back the driven instance.
    pub fn into_instance(self) -> WorkflowInstance<W> {
        self.instance
    }
}
