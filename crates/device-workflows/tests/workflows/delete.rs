//! Step-by-step tests of the bulk delete workflow.
//!
//! These tests verify:
//! - Effect order and arguments
//! - Success and failure paths from one branched prefix
//! - Pre-mutation faults
//! - Protocol errors at each position

use device_workflows::actions::keys;
use device_workflows::{
    BulkAction, DeleteDevicesRequest, DeleteDevicesWorkflow, DeviceId, DeviceOperation,
    DeviceReply,
};
use effectflow::{Effect, Error, Harness, Resume, Status, Step, Workflow, WorkflowInstance};

use crate::support::fixtures::{
    connection_string, device_ids, offline, partial, service_error, success,
};

fn harness() -> Harness<DeleteDevicesWorkflow> {
    Harness::new(DeleteDevicesRequest::devices(device_ids()))
}

/// Suspended at the delete invoke.
fn awaiting_delete() -> Harness<DeleteDevicesWorkflow> {
    let mut harness = harness();
    harness.next();
    harness.send(connection_string().into());
    harness
}

fn delete_devices(device_ids: Vec<DeviceId>) -> DeviceOperation {
    DeviceOperation::DeleteDevices {
        connection_string: connection_string(),
        device_ids,
    }
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn fetches_connection_string_then_deletes() {
    let mut harness = harness();

    assert_eq!(
        harness.next(),
        Step::invoke(DeviceOperation::FetchActiveConnectionString)
    );
    assert_eq!(
        harness.send(DeviceReply::ConnectionString(connection_string())),
        Step::invoke(delete_devices(device_ids()))
    );
}

#[test]
fn device_ids_pass_through_unchanged() {
    let ids: Vec<DeviceId> = vec!["b".into(), "a".into(), "b".into()];
    let mut harness = Harness::<DeleteDevicesWorkflow>::new(DeleteDevicesRequest::devices(
        ids.clone(),
    ));
    harness.next();

    assert_eq!(
        harness.send(connection_string().into()),
        Step::invoke(delete_devices(ids))
    );
}

#[test]
fn supplied_connection_string_skips_fetch() {
    let request =
        DeleteDevicesRequest::devices(device_ids()).with_connection_string(connection_string());
    let mut harness = Harness::<DeleteDevicesWorkflow>::new(request);

    assert_eq!(harness.next(), Step::invoke(delete_devices(device_ids())));
}

// =============================================================================
// Terminal paths
// =============================================================================

#[test]
fn success_path() {
    let mut harness = awaiting_delete();

    assert_eq!(
        harness.send(success().into()),
        Step::emit(BulkAction::NotifySuccess {
            translation_key: keys::DELETE_DEVICE_ON_SUCCEED,
            count: 3,
        })
    );
    assert_eq!(
        harness.next(),
        Step::emit(BulkAction::RecordCompletion {
            params: device_ids(),
            result: success(),
        })
    );
    assert_eq!(harness.next(), Step::completed());
    assert_eq!(harness.status(), &Status::Completed);
}

#[test]
fn failure_path() {
    let mut harness = awaiting_delete();

    assert_eq!(
        harness.fault(service_error()),
        Step::emit(BulkAction::NotifyError {
            translation_key: keys::DELETE_DEVICE_ON_ERROR,
            count: 3,
            error: service_error(),
        })
    );
    assert_eq!(
        harness.next(),
        Step::emit(BulkAction::RecordFailure {
            params: device_ids(),
            error: service_error(),
        })
    );
    assert_eq!(harness.next(), Step::completed());
    // The failure was handled.
    assert_eq!(harness.status(), &Status::Completed);
}

#[test]
fn branches_after_delete_are_independent() {
    let mut success_branch = awaiting_delete();
    let mut failure_branch = success_branch.branch();

    // Drive the failure branch to the end first.
    failure_branch.fault(service_error());
    failure_branch.next();
    assert_eq!(failure_branch.next(), Step::completed());

    success_branch.send(success().into());
    success_branch.next();
    assert_eq!(success_branch.next(), Step::completed());

    let prefix = [
        Effect::Invoke(DeviceOperation::FetchActiveConnectionString),
        Effect::Invoke(delete_devices(device_ids())),
    ];
    assert_eq!(success_branch.history()[..2], prefix);
    assert_eq!(failure_branch.history()[..2], prefix);
    assert_eq!(
        success_branch.history()[2..],
        [
            Effect::Emit(BulkAction::NotifySuccess {
                translation_key: keys::DELETE_DEVICE_ON_SUCCEED,
                count: 3,
            }),
            Effect::Emit(BulkAction::RecordCompletion {
                params: device_ids(),
                result: success(),
            }),
        ]
    );
    assert_eq!(
        failure_branch.history()[2..],
        [
            Effect::Emit(BulkAction::NotifyError {
                translation_key: keys::DELETE_DEVICE_ON_ERROR,
                count: 3,
                error: service_error(),
            }),
            Effect::Emit(BulkAction::RecordFailure {
                params: device_ids(),
                error: service_error(),
            }),
        ]
    );
}

#[test]
fn connection_fault_is_uncaught() {
    let mut harness = harness();
    harness.next();

    assert_eq!(harness.fault(offline()), Step::faulted(offline()));
    assert_eq!(harness.status(), &Status::Faulted(offline()));
    assert_eq!(
        harness.history(),
        [Effect::Invoke(DeviceOperation::FetchActiveConnectionString)]
    );
}

#[test]
fn partial_success_takes_success_path() {
    let mut harness = awaiting_delete();

    assert_eq!(
        harness.send(partial().into()),
        Step::emit(BulkAction::NotifySuccess {
            translation_key: keys::DELETE_DEVICE_ON_SUCCEED,
            count: 3,
        })
    );
    assert_eq!(
        harness.next(),
        Step::emit(BulkAction::RecordCompletion {
            params: device_ids(),
            result: partial(),
        })
    );
}

#[test]
fn count_is_requested_size() {
    let ids: Vec<DeviceId> = vec!["d1".into(), "d1".into(), "d2".into(), "d3".into()];
    let mut harness = Harness::<DeleteDevicesWorkflow>::new(
        DeleteDevicesRequest::devices(ids).with_connection_string(connection_string()),
    );
    harness.next();
    let mut failure = harness.branch();

    let notified = harness.send(partial().into()).into_effect().unwrap();
    let failed = failure.fault(service_error()).into_effect().unwrap();

    assert_eq!(notified.as_emit().unwrap().count(), Some(4));
    assert_eq!(failed.as_emit().unwrap().count(), Some(4));
}

#[test]
fn empty_request_is_not_validated() {
    let mut harness = Harness::<DeleteDevicesWorkflow>::new(
        DeleteDevicesRequest::devices(Vec::<DeviceId>::new())
            .with_connection_string(connection_string()),
    );

    assert_eq!(harness.next(), Step::invoke(delete_devices(Vec::new())));
    assert_eq!(
        harness.send(success().into()),
        Step::emit(BulkAction::NotifySuccess {
            translation_key: keys::DELETE_DEVICE_ON_SUCCEED,
            count: 0,
        })
    );
}

// =============================================================================
// Protocol errors
// =============================================================================

#[test]
fn value_as_first_resume_is_rejected() {
    let mut instance =
        WorkflowInstance::<DeleteDevicesWorkflow>::new(DeleteDevicesRequest::devices(device_ids()));

    let err = instance
        .resume(Resume::Value(connection_string().into()))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::UnexpectedResume {
            workflow_type: "BulkDelete",
            expected: "next",
            resume: "value",
            ..
        }
    ));

    // Still at the start.
    assert_eq!(
        instance.resume(Resume::Next).unwrap(),
        Step::invoke(DeviceOperation::FetchActiveConnectionString)
    );
}

#[test]
fn next_while_awaiting_connection_is_rejected() {
    let mut instance =
        WorkflowInstance::<DeleteDevicesWorkflow>::new(DeleteDevicesRequest::devices(device_ids()));
    instance.resume(Resume::Next).unwrap();

    let err = instance.resume(Resume::Next).unwrap_err();
    assert!(matches!(
        err,
        Error::UnexpectedResume {
            workflow_type: "BulkDelete",
            expected: "a connection string",
            resume: "next",
            ..
        }
    ));

    // Position unchanged.
    assert_eq!(
        instance
            .resume(Resume::Value(connection_string().into()))
            .unwrap(),
        Step::invoke(delete_devices(device_ids()))
    );
}

#[test]
fn wrong_reply_variant_is_rejected() {
    let mut instance =
        WorkflowInstance::<DeleteDevicesWorkflow>::new(DeleteDevicesRequest::devices(device_ids()));
    instance.resume(Resume::Next).unwrap();
    instance
        .resume(Resume::Value(connection_string().into()))
        .unwrap();

    let err = instance
        .resume(Resume::Value(connection_string().into()))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::UnexpectedResume {
            expected: "a bulk operation result",
            resume: "value",
            ..
        }
    ));
}

#[test]
fn fault_at_notification_is_uncaught() {
    let mut harness = awaiting_delete();
    harness.send(success().into());

    assert_eq!(harness.fault(service_error()), Step::faulted(service_error()));
    assert!(harness.status().is_faulted());
}

#[test]
fn completed_instance_cannot_resume() {
    let mut instance = awaiting_delete().into_instance();
    instance.resume(Resume::Value(success().into())).unwrap();
    instance.resume(Resume::Next).unwrap();
    instance.resume(Resume::Next).unwrap();

    assert!(matches!(
        instance.resume(Resume::Next),
        Err(Error::AlreadyTerminated {
            workflow_type: "BulkDelete"
        })
    ));
}

#[test]
fn workflow_identity() {
    assert_eq!(DeleteDevicesWorkflow::TYPE, "BulkDelete");
    assert!(DeleteDevicesWorkflow::TERMINAL.contains("RecordCompletion"));
    assert!(DeleteDevicesWorkflow::TERMINAL.contains("RecordFailure"));
}
