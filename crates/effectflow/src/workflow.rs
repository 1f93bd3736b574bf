//! Core workflow trait and types.

use std::fmt::Debug;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::effect::{Effect, Named};

/// A side-effect-free procedure that yields one [`Effect`] per resumption.
///
/// A workflow is written as an explicit state machine: [`Self::State`] is a
/// small, cloneable record of where the procedure is suspended and what it has
/// accumulated so far, and [`Self::step`] is a pure function from that record
/// plus a [`Resume`] value to the next [`Transition`].
///
/// Because the position is plain data, suspending is returning, resuming is
/// calling `step` again, and branching a suspended workflow is cloning its
/// state (see [`WorkflowInstance::branch`](crate::WorkflowInstance::branch)).
///
/// # Determinism
///
/// `step` must not perform I/O, read clocks, or keep hidden state. Equal
/// states and equal resumes must produce equal transitions.
///
/// # Example
///
/// ```ignore
/// impl Workflow for Greeting {
///     type Input = String;
///     type State = GreetingState;
///     type Operation = GreetingOperation;
///     type Reply = String;
///     type Action = GreetingAction;
///     type Fault = GreetingError;
///
///     const TYPE: &'static str = "greeting";
///     const TERMINAL: TerminalActions = TerminalActions::new("Greeted", "GreetingFailed");
///
///     fn start(name: String) -> GreetingState {
///         GreetingState::Start { name }
///     }
///
///     fn step(state: &GreetingState, resume: Resume<String, GreetingError>) -> Transition<Self> {
///         match (state, resume) {
///             (GreetingState::Start { name }, Resume::Next) => Transition::Yield(
///                 GreetingState::AwaitingSalutation,
///                 Effect::Invoke(GreetingOperation::LookupSalutation { name: name.clone() }),
///             ),
///             (GreetingState::AwaitingSalutation, Resume::Value(text)) => Transition::Yield(
///                 GreetingState::Done,
///                 Effect::Emit(GreetingAction::Greeted { text }),
///             ),
///             (GreetingState::AwaitingSalutation, Resume::Fault(e)) => Transition::Fault(e),
///             (GreetingState::Done, _) => Transition::Complete,
///             (_, _) => Transition::reject("a resume matching the current position"),
///         }
///     }
/// }
/// ```
pub trait Workflow: Sized + Send + Sync + 'static {
    /// The triggering request payload.
    ///
    /// Must be deserializable: the registry receives triggers as JSON.
    type Input: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Position record: where the workflow is suspended plus accumulated data.
    type State: Clone + Debug + Send + Sync + 'static;

    /// Operation vocabulary for `Invoke` effects (reference plus arguments).
    type Operation: Named + Clone + PartialEq + Debug + Serialize + Send + Sync + 'static;

    /// Values that bound operations reply with.
    type Reply: Debug + Send + Sync + 'static;

    /// Action vocabulary for `Emit` effects (reference plus payload).
    type Action: Named + Clone + PartialEq + Debug + Serialize + Send + Sync + 'static;

    /// Failures injected when a bound operation fails.
    type Fault: std::error::Error + Clone + PartialEq + Send + Sync + 'static;

    /// Workflow type identifier and registry key (e.g. `"BulkDelete"`).
    ///
    /// Must be stable: triggering requests address workflows by it.
    const TYPE: &'static str;

    /// Names of the actions that record the workflow's outcome.
    const TERMINAL: TerminalActions;

    /// Build the initial position record from a triggering input.
    fn start(input: Self::Input) -> Self::State;

    /// Advance from `state` given how the previous effect resumed.
    ///
    /// Called with [`Resume::Next`] for the first resumption and after every
    /// `Emit`; with [`Resume::Value`] or [`Resume::Fault`] after an `Invoke`.
    fn step(state: &Self::State, resume: Resume<Self::Reply, Self::Fault>) -> Transition<Self>;
}

/// How a suspended workflow is resumed.
#[derive(Debug, Clone, PartialEq)]
pub enum Resume<R, F> {
    /// Resume without a value: first resumption, or after an `Emit`.
    Next,
    /// Resume with a bound operation's reply.
    Value(R),
    /// Resume by injecting a failure at the suspension point.
    Fault(F),
}

impl<R, F> Resume<R, F> {
    /// Short name of the resume kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Resume::Next => "next",
            Resume::Value(_) => "value",
            Resume::Fault(_) => "fault",
        }
    }
}

/// Result of one [`Workflow::step`].
pub enum Transition<W: Workflow> {
    /// Suspend at `State`, asking for `Effect` to be executed.
    Yield(W::State, Effect<W::Operation, W::Action>),
    /// The workflow finished.
    Complete,
    /// An uncaught failure ends the workflow.
    Fault(W::Fault),
    /// The current position cannot accept this resume; the state is unchanged.
    Reject {
        /// What the position was waiting for.
        expected: &'static str,
    },
}

impl<W: Workflow> Transition<W> {
    /// Suspend at `state` with an `Invoke` of `operation`.
    pub fn invoke(state: W::State, operation: W::Operation) -> Self {
        Transition::Yield(state, Effect::Invoke(operation))
    }

    /// Suspend at `state` with an `Emit` of `action`.
    pub fn emit(state: W::State, action: W::Action) -> Self {
        Transition::Yield(state, Effect::Emit(action))
    }

    /// Reject the resume, describing what was expected.
    pub fn reject(expected: &'static str) -> Self {
        Transition::Reject { expected }
    }
}

/// Names of the two actions that record a workflow's outcome.
///
/// The registry reports these per workflow type so that consumers know which
/// actions mark "done" and "failed"; run reports check the last emitted action
/// against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TerminalActions {
    /// Action recording a handled, successful run.
    pub done: &'static str,
    /// Action recording a handled, failed run.
    pub failed: &'static str,
}

impl TerminalActions {
    /// Create a terminal action pair.
    pub const fn new(done: &'static str, failed: &'static str) -> Self {
        Self { done, failed }
    }

    /// Returns `true` if `action` is one of the pair.
    pub fn contains(&self, action: &str) -> bool {
        self.done == action || self.failed == action
    }
}

/// A workflow run identifier.
///
/// Every interpretation gets a fresh one; instances are never shared or reused.
///
/// # Example
///
/// ```
/// use effectflow::WorkflowId;
///
/// let id = WorkflowId::new("run-123");
/// assert_eq!(id.as_str(), "run-123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(String);

impl WorkflowId {
    /// Create a new workflow ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Consume the wrapper and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Borrow the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl From<String> for WorkflowId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkflowId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Reference to a specific workflow run.
///
/// Combines workflow type and run ID into a single correlation key, used in
/// logs, effect contexts and run reports.
///
/// # Example
///
/// ```
/// use effectflow::WorkflowRef;
///
/// let workflow = WorkflowRef::new("BulkDelete", "run-123");
/// assert_eq!(workflow.workflow_type(), "BulkDelete");
/// assert_eq!(workflow.workflow_id().as_str(), "run-123");
/// assert_eq!(format!("{}", workflow), "BulkDelete:run-123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowRef {
    workflow_type: String,
    workflow_id: WorkflowId,
}

impl WorkflowRef {
    /// Create a new workflow reference.
    pub fn new(workflow_type: impl Into<String>, workflow_id: impl Into<WorkflowId>) -> Self {
        Self {
            workflow_type: workflow_type.into(),
            workflow_id: workflow_id.into(),
        }
    }

    /// The workflow type (e.g., "BulkDelete").
    pub fn workflow_type(&self) -> &str {
        &self.workflow_type
    }

    /// The run ID.
    pub fn workflow_id(&self) -> &WorkflowId {
        &self.workflow_id
    }
}

impl std::fmt::Display for WorkflowRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.workflow_type, self.workflow_id)
    }
}
