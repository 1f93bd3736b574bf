//! The shared shape of every bulk device workflow.

use std::fmt::Debug;
use std::marker::PhantomData;

use effectflow::{Resume, TerminalActions, Transition, Workflow};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::actions::BulkAction;
use crate::model::{BulkOperationResult, ConnectionString, DeviceError};
use crate::operations::{DeviceOperation, DeviceReply};

/// One bulk registry operation plugged into [`BulkWorkflow`].
pub trait BulkKind: Send + Sync + 'static {
    /// Items the operation acts on, as requested.
    type Params: Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Workflow type identifier.
    const TYPE: &'static str;

    /// Translation key of the success notification.
    const SUCCESS_KEY: &'static str;

    /// Translation key of the failure notification.
    const ERROR_KEY: &'static str;

    /// Number of requested items, as reported in notifications.
    fn count(params: &Self::Params) -> usize;

    /// The mutating operation for `params`.
    fn operation(connection_string: ConnectionString, params: &Self::Params) -> DeviceOperation;
}

/// Triggering input of a bulk workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest<P> {
    /// Requested items, passed to the registry unchanged.
    pub params: P,

    /// Connection to use; fetched from the active context when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<ConnectionString>,
}

impl<P> BulkRequest<P> {
    pub fn new(params: P) -> Self {
        Self {
            params,
            connection_string: None,
        }
    }

    /// Use `connection_string` instead of fetching the active one.
    pub fn with_connection_string(mut self, connection_string: ConnectionString) -> Self {
        self.connection_string = Some(connection_string);
        self
    }
}

/// Position record of a [`BulkWorkflow`].
#[derive(Debug, Clone, PartialEq)]
pub enum BulkState<P> {
    Start {
        params: P,
        connection_string: Option<ConnectionString>,
    },
    AwaitingConnection {
        params: P,
    },
    AwaitingMutation {
        params: P,
    },
    NotifiedSuccess {
        params: P,
        result: BulkOperationResult,
    },
    NotifiedFailure {
        params: P,
        error: DeviceError,
    },
    Recorded,
}

/// A bulk device operation with notification and recording.
///
/// 1. `Invoke(FetchActiveConnectionString)`, unless the request carries a
///    connection string. A fault here ends the workflow as `Faulted`.
/// 2. `Invoke` the mutating operation with that connection string and the
///    requested params.
/// 3. On a reply, `Emit(NotifySuccess)` then `Emit(RecordCompletion)`; on a
///    fault, `Emit(NotifyError)` then `Emit(RecordFailure)`. Both end
///    `Completed`.
///
/// The reply's `is_successful` flag is not inspected: a partial result takes
/// the success path and consumers of `RecordCompletion` see the per-item
/// errors.
///
/// The first resume must be `Next`. Values sent after an emit are ignored.
pub struct BulkWorkflow<K>(PhantomData<fn() -> K>);

impl<K: BulkKind> Workflow for BulkWorkflow<K> {
    type Input = BulkRequest<K::Params>;
    type State = BulkState<K::Params>;
    type Operation = DeviceOperation;
    type Reply = DeviceReply;
    type Action = BulkAction<K::Params>;
    type Fault = DeviceError;

    const TYPE: &'static str = K::TYPE;
    const TERMINAL: TerminalActions = TerminalActions::new("RecordCompletion", "RecordFailure");

    fn start(input: Self::Input) -> Self::State {
        BulkState::Start {
            params: input.params,
            connection_string: input.connection_string,
        }
    }

    fn step(state: &Self::State, resume: Resume<DeviceReply, DeviceError>) -> Transition<Self> {
        use BulkState::*;

        match (state, resume) {
            // Pre-mutation faults, and faults at emit points, are not handled.
            (
                Start { .. } | AwaitingConnection { .. } | NotifiedSuccess { .. }
                | NotifiedFailure { .. } | Recorded,
                Resume::Fault(error),
            ) => Transition::Fault(error),

            (
                Start {
                    params,
                    connection_string: Some(connection_string),
                },
                Resume::Next,
            ) => Transition::invoke(
                AwaitingMutation {
                    params: params.clone(),
                },
                K::operation(connection_string.clone(), params),
            ),
            (
                Start {
                    params,
                    connection_string: None,
                },
                Resume::Next,
            ) => Transition::invoke(
                AwaitingConnection {
                    params: params.clone(),
                },
                DeviceOperation::FetchActiveConnectionString,
            ),
            (Start { .. }, Resume::Value(_)) => Transition::reject("next"),

            (
                AwaitingConnection { params },
                Resume::Value(DeviceReply::ConnectionString(connection_string)),
            ) => Transition::invoke(
                AwaitingMutation {
                    params: params.clone(),
                },
                K::operation(connection_string, params),
            ),
            (AwaitingConnection { .. }, _) => Transition::reject("a connection string"),

            (AwaitingMutation { params }, Resume::Value(DeviceReply::Bulk(result))) => {
                Transition::emit(
                    NotifiedSuccess {
                        params: params.clone(),
                        result,
                    },
                    BulkAction::NotifySuccess {
                        translation_key: K::SUCCESS_KEY,
                        count: K::count(params),
                    },
                )
            }
            (AwaitingMutation { params }, Resume::Fault(error)) => Transition::emit(
                NotifiedFailure {
                    params: params.clone(),
                    error: error.clone(),
                },
                BulkAction::NotifyError {
                    translation_key: K::ERROR_KEY,
                    count: K::count(params),
                    error,
                },
            ),
            (AwaitingMutation { .. }, _) => Transition::reject("a bulk operation result"),

            (NotifiedSuccess { params, result }, _) => Transition::emit(
                Recorded,
                BulkAction::RecordCompletion {
                    params: params.clone(),
                    result: result.clone(),
                },
            ),
            (NotifiedFailure { params, error }, _) => Transition::emit(
                Recorded,
                BulkAction::RecordFailure {
                    params: params.clone(),
                    error: error.clone(),
                },
            ),

            (Recorded, _) => Transition::Complete,
        }
    }
}
