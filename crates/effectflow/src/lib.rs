//! Declarative effect workflows with a pluggable interpreter.
//!
//! Effectflow separates *what* a multi-step business procedure does from
//! *executing* it:
//!
//! - **Pure workflows** — [`Workflow::step`] is a deterministic state machine
//!   that yields one [`Effect`] per resumption and performs no I/O
//! - **Effects as data** — `Invoke` an external operation, or `Emit` an action
//!   to an external store; effects compare structurally
//! - **Interchangeable drivers** — the [`Interpreter`] executes effects against
//!   real collaborators, the [`Harness`] hands them to a test instead
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Interpreter<H, D>                              │
//! │                                                                         │
//! │   1. resume(instance, Next) → Effect                                    │
//! │   2. Invoke(op)  → H::invoke(op)  → resume with Value(reply) | Fault(e) │
//! │   3. Emit(action) → D::dispatch(action) → resume with Next              │
//! │   4. repeat until Completed | Faulted                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use effectflow::{Harness, Interpreter, Step, WorkflowInstance};
//!
//! // Production: real bound operations and a real store.
//! let interpreter = Interpreter::new(bindings, store);
//! interpreter.run(WorkflowInstance::<DeleteDevicesWorkflow>::new(request)).await?;
//!
//! // Tests: drive the same workflow by hand.
//! let mut harness = Harness::<DeleteDevicesWorkflow>::new(request);
//! assert_eq!(harness.next(), Step::invoke(DeviceOperation::FetchActiveConnectionString));
//! ```
//!
//! # Design Documentation
//!
//! See `DESIGN.md` for architectural decisions.

pub mod effect;
mod error;
mod harness;
mod instance;
mod interpreter;
pub mod runtime;
mod service;
mod workflow;


pub use effect::{
    Dispatcher, Effect, EffectContext, Named, OperationHandler, RetryPolicy, Retrying,
};
pub use error::{Error, Result};
pub use harness::Harness;
pub use instance::{Status, Step, StepOf, TerminalStatus, WorkflowInstance};
pub use interpreter::{Interpreter, RunOutcome, RunReport};
pub use runtime::{RuntimeConfig, WorkflowBuilder, WorkflowRegistry};
pub use service::{TriggerRequest, WorkflowService};
pub use workflow::{Resume, TerminalActions, Transition, Workflow, WorkflowId, WorkflowRef};
