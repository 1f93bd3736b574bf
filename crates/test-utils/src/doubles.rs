//! Collaborator doubles.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::Mutex;

use async_trait::async_trait;
use effectflow::{Dispatcher, EffectContext, Named, OperationHandler};

/// Records every dispatched action with the step it was delivered at.
pub struct RecordingDispatcher<A> {
    actions: Mutex<Vec<(u32, A)>>,
}

impl<A> Default for RecordingDispatcher<A> {
    fn default() -> Self {
        Self {
            actions: Mutex::new(Vec::new()),
        }
    }
}

impl<A: Clone> RecordingDispatcher<A> {
    /// Actions in delivery order.
    pub fn actions(&self) -> Vec<A> {
        self.actions
            .lock()
            .unwrap()
            .iter()
            .map(|(_, action)| action.clone())
            .collect()
    }

    /// Steps the actions were delivered at.
    pub fn steps(&self) -> Vec<u32> {
        self.actions.lock().unwrap().iter().map(|(step, _)| *step).collect()
    }
}

impl<A: Named> RecordingDispatcher<A> {
    /// Action names in delivery order.
    pub fn names(&self) -> Vec<&'static str> {
        self.actions
            .lock()
            .unwrap()
            .iter()
            .map(|(_, action)| action.name())
            .collect()
    }
}

#[async_trait]
impl<A> Dispatcher<A> for RecordingDispatcher<A>
where
    A: Send + 'static,
{
    async fn dispatch(&self, action: A, ctx: &EffectContext) {
        self.actions.lock().unwrap().push((ctx.step, action));
    }
}

/// Answers invokes in order from a script, recording each operation.
///
/// Panics when invoked more often than scripted.
pub struct ScriptedHandler<O, R, F> {
    script: Mutex<VecDeque<Result<R, F>>>,
    calls: Mutex<Vec<O>>,
}

impl<O, R, F> Default for ScriptedHandler<O, R, F> {
    fn default() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl<O: Clone, R, F> ScriptedHandler<O, R, F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next invoke with `reply`.
    pub fn reply(self, reply: impl Into<R>) -> Self {
        self.script.lock().unwrap().push_back(Ok(reply.into()));
        self
    }

    /// Fail the next invoke with `fault`.
    pub fn fail(self, fault: F) -> Self {
        self.script.lock().unwrap().push_back(Err(fault));
        self
    }

    /// Operations invoked so far.
    pub fn calls(&self) -> Vec<O> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of scripted answers not yet used.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl<O, R, F> OperationHandler<O> for ScriptedHandler<O, R, F>
where
    O: Named + Clone + Debug + Send + Sync + 'static,
    R: Send + 'static,
    F: Send + 'static,
{
    type Reply = R;
    type Fault = F;

    async fn invoke(&self, operation: &O, _ctx: &EffectContext) -> Result<R, F> {
        self.calls.lock().unwrap().push(operation.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(answer) => answer,
            None => panic!("unscripted invoke of {} ({operation:?})", operation.name()),
        }
    }
}
