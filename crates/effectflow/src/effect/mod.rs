//! Effect vocabulary and the seams that execute it.
//!
//! - [`Effect`] — Inert description of one desired side effect
//! - [`Named`] — Stable identity of operation and action references
//! - [`OperationHandler`] — Bound operations behind `Invoke`
//! - [`Dispatcher`] — The external store behind `Emit`
//! - [`EffectContext`] — Correlation and idempotency metadata
//! - [`RetryPolicy`] / [`Retrying`] — Opt-in retry for a bound operation

mod context;
mod handler;
mod retry;

use serde::{Deserialize, Serialize};

pub use context::EffectContext;
pub use handler::{Dispatcher, OperationHandler};
pub use retry::{RetryPolicy, Retrying};

/// One desired side effect, described as plain data.
///
/// `O` is the workflow's operation type: its variant is the operation
/// reference, its fields are the arguments. `A` is the workflow's action type:
/// its variant is the action reference, its fields are the payload.
///
/// Effects carry no behavior. Two effects built from equal inputs compare
/// equal, which is what harness assertions rely on.
///
/// # Example
///
/// ```
/// use effectflow::Effect;
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum Op { Fetch }
///
/// let a: Effect<Op, ()> = Effect::Invoke(Op::Fetch);
/// assert_eq!(a, Effect::Invoke(Op::Fetch));
/// assert!(a.is_invoke());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "payload", rename_all = "snake_case")]
pub enum Effect<O, A> {
    /// Execute an external operation; its reply (or failure) resumes the workflow.
    Invoke(O),
    /// Deliver an action to the external store; the workflow resumes with no value.
    Emit(A),
}

impl<O, A> Effect<O, A> {
    /// Returns `true` for [`Effect::Invoke`].
    pub fn is_invoke(&self) -> bool {
        matches!(self, Effect::Invoke(_))
    }

    /// Returns `true` for [`Effect::Emit`].
    pub fn is_emit(&self) -> bool {
        matches!(self, Effect::Emit(_))
    }

    /// Borrow the operation of an `Invoke`.
    pub fn as_invoke(&self) -> Option<&O> {
        match self {
            Effect::Invoke(operation) => Some(operation),
            Effect::Emit(_) => None,
        }
    }

    /// Borrow the action of an `Emit`.
    pub fn as_emit(&self) -> Option<&A> {
        match self {
            Effect::Emit(action) => Some(action),
            Effect::Invoke(_) => None,
        }
    }
}

impl<O: Named, A: Named> Named for Effect<O, A> {
    fn name(&self) -> &'static str {
        match self {
            Effect::Invoke(operation) => operation.name(),
            Effect::Emit(action) => action.name(),
        }
    }
}

/// Stable name of an operation or action reference.
///
/// Used as the `operation` / `action` field in logs and recorded in
/// [`RunReport`](crate::RunReport)s. Names must not depend on payloads.
pub trait Named {
    /// The reference's name, e.g. `"DeleteDevices"`.
    fn name(&self) -> &'static str;
}

impl Named for () {
    fn name(&self) -> &'static str {
        "unit"
    }
}
