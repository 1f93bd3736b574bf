//! Triggering the bulk workflows through the registry-backed service.

use std::sync::Arc;
use std::time::Duration;

use device_workflows::{
    DeleteDevicesRequest, DeleteDevicesWorkflow, DeviceBindings, DeviceError,
    DeviceWorkflowsConfig, service,
};
use effectflow::{
    Error, RetryPolicy, RunOutcome, RuntimeConfig, TerminalActions, TerminalStatus, TriggerRequest,
    WorkflowService,
};
use serde_json::json;
use test_utils::flow_test;
use tokio::sync::watch;

use crate::support::fakes::{AppStore, FakeContext, FakeRegistry};
use crate::support::fixtures::{connection_string, descriptions, device_ids};

fn device_service(
    context: Arc<FakeContext>,
    registry: Arc<FakeRegistry>,
    store: Arc<AppStore>,
) -> WorkflowService {
    service(context, registry, store, DeviceWorkflowsConfig::default())
        .expect("service should build")
}

flow_test!(bulk_delete_request_runs_delete_workflow, {
    let registry = FakeRegistry::succeeding().shared();
    let store = AppStore::shared();
    let service = device_service(FakeContext::connected(), registry.clone(), store.clone());

    let request: TriggerRequest = serde_json::from_value(json!({
        "kind": "BulkDelete",
        "payload": { "params": ["device_id1", "device_id2", "device_id3"] }
    }))?;
    let report = service.trigger_request(&request).await?;

    assert_eq!(report.workflow.workflow_type(), "BulkDelete");
    assert_eq!(report.status(), Some(&TerminalStatus::Completed));
    assert_eq!(report.last_action, Some("RecordCompletion"));
    assert!(report.ended_with_terminal_action());
    assert_eq!(registry.deletes(), vec![(connection_string(), device_ids())]);
    assert_eq!(store.deleted.names(), vec!["NotifySuccess", "RecordCompletion"]);
    assert!(store.added.actions().is_empty());
    Ok(())
});

flow_test!(bulk_add_request_with_connection_string, {
    let context = FakeContext::connected();
    let registry = FakeRegistry::succeeding().shared();
    let store = AppStore::shared();
    let service = device_service(context.clone(), registry.clone(), store.clone());

    let report = service
        .trigger_request(&TriggerRequest::new(
            "BulkAdd",
            json!({
                "params": [
                    { "deviceId": "sensor-1" },
                    { "deviceId": "sensor-2", "status": "disabled" },
                    { "deviceId": "gateway-1", "edgeEnabled": true }
                ],
                "connectionString": "connection_string"
            }),
        ))
        .await?;

    assert!(report.ended_with_terminal_action());
    assert_eq!(context.calls(), 0);
    assert_eq!(registry.adds(), vec![(connection_string(), descriptions())]);
    assert_eq!(store.added.names(), vec!["NotifySuccess", "RecordCompletion"]);
    Ok(())
});

flow_test!(typed_trigger_reports_faulted_run, {
    let store = AppStore::shared();
    let service = device_service(
        FakeContext::disconnected(),
        FakeRegistry::succeeding().shared(),
        store.clone(),
    );

    let report = service
        .trigger::<DeleteDevicesWorkflow>(&DeleteDevicesRequest::devices(device_ids()))
        .await?;

    assert_eq!(
        report.status(),
        Some(&TerminalStatus::Faulted(
            "no active registry connection: no active hub".to_string()
        ))
    );
    assert!(!report.ended_with_terminal_action());
    assert!(store.deleted.actions().is_empty());
    Ok(())
});

flow_test!(unknown_kind_is_rejected, {
    let service = device_service(
        FakeContext::connected(),
        FakeRegistry::succeeding().shared(),
        AppStore::shared(),
    );

    let err = service
        .trigger_request(&TriggerRequest::new("BulkUpdate", json!({ "params": [] })))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnknownWorkflowType(kind) if kind == "BulkUpdate"));
    Ok(())
});

flow_test!(registrations_and_terminal_actions, {
    let service = device_service(
        FakeContext::connected(),
        FakeRegistry::succeeding().shared(),
        AppStore::shared(),
    );

    assert_eq!(service.workflow_count(), 2);
    assert_eq!(service.workflow_types(), vec!["BulkAdd", "BulkDelete"]);
    for kind in ["BulkAdd", "BulkDelete"] {
        assert_eq!(
            service.terminal_actions(kind)?,
            TerminalActions::new("RecordCompletion", "RecordFailure")
        );
    }
    Ok(())
});

flow_test!(duplicate_workflow_is_rejected, {
    let bindings = Arc::new(DeviceBindings::new(
        FakeContext::connected(),
        FakeRegistry::succeeding().shared(),
    ));
    let store = AppStore::shared();

    let result = WorkflowService::builder()
        .register::<DeleteDevicesWorkflow, _, _>(bindings.clone(), store.clone())
        .register::<DeleteDevicesWorkflow, _, _>(bindings, store)
        .build_service();

    assert!(matches!(
        result,
        Err(Error::DuplicateWorkflowType(kind)) if kind == "BulkDelete"
    ));
    Ok(())
});

flow_test!(concurrent_triggers_are_independent_runs, {
    let registry = FakeRegistry::succeeding().shared();
    let store = AppStore::shared();
    let service = device_service(FakeContext::connected(), registry.clone(), store.clone());
    let request = DeleteDevicesRequest::devices(device_ids());

    let (first, second) = tokio::join!(
        service.trigger::<DeleteDevicesWorkflow>(&request),
        service.trigger::<DeleteDevicesWorkflow>(&request),
    );
    let (first, second) = (first?, second?);

    assert_ne!(first.workflow, second.workflow);
    assert_eq!(registry.calls(), 2);
    let keys = registry.keys();
    assert_ne!(keys[0], keys[1]);
    assert_eq!(store.deleted.actions().len(), 4);
    Ok(())
});

flow_test!(step_budget_applies_to_registered_workflows, {
    let store = AppStore::shared();
    let service = service(
        FakeContext::connected(),
        FakeRegistry::succeeding().shared(),
        store.clone(),
        DeviceWorkflowsConfig {
            runtime: RuntimeConfig {
                max_steps: 2,
                ..Default::default()
            },
            retry: None,
        },
    )?;

    let err = service
        .trigger::<DeleteDevicesWorkflow>(&DeleteDevicesRequest::devices(device_ids()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::StepLimitExceeded { limit: 2, .. }));
    assert!(store.deleted.actions().is_empty());
    Ok(())
});

#[tokio::test(start_paused = true)]
async fn configured_retry_recovers_throttled_delete() -> anyhow::Result<()> {
    let registry = FakeRegistry::succeeding()
        .first_failing(DeviceError::service(429))
        .shared();
    let store = AppStore::shared();
    let service = service(
        FakeContext::connected(),
        registry.clone(),
        store.clone(),
        DeviceWorkflowsConfig {
            retry: Some(RetryPolicy::default()),
            ..Default::default()
        },
    )?;

    let report = service
        .trigger::<DeleteDevicesWorkflow>(&DeleteDevicesRequest::devices(device_ids()))
        .await?;

    assert_eq!(report.status(), Some(&TerminalStatus::Completed));
    assert_eq!(registry.calls(), 2);
    assert_eq!(store.deleted.names(), vec!["NotifySuccess", "RecordCompletion"]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn retried_add_reuses_idempotency_key() -> anyhow::Result<()> {
    let registry = FakeRegistry::succeeding()
        .first_failing(DeviceError::service(503))
        .shared();
    let store = AppStore::shared();
    let service = service(
        FakeContext::connected(),
        registry.clone(),
        store.clone(),
        DeviceWorkflowsConfig {
            retry: Some(RetryPolicy::default()),
            ..Default::default()
        },
    )?;

    let report = service
        .trigger_request(&TriggerRequest::new(
            "BulkAdd",
            json!({ "params": [{ "deviceId": "sensor-1" }] }),
        ))
        .await?;

    assert_eq!(report.status(), Some(&TerminalStatus::Completed));
    let keys = registry.keys();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0], keys[1]);
    assert_eq!(keys[0], format!("{}:2", report.workflow));
    assert_eq!(store.added.names(), vec!["NotifySuccess", "RecordCompletion"]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_triggered_run() -> anyhow::Result<()> {
    let registry = FakeRegistry::succeeding()
        .delayed(Duration::from_secs(30))
        .shared();
    let store = AppStore::shared();
    let service = device_service(FakeContext::connected(), registry, store.clone());
    let (tx, rx) = watch::channel(false);
    let request = TriggerRequest::typed::<DeleteDevicesWorkflow>(&DeleteDevicesRequest::devices(
        device_ids(),
    ))?;

    let run = service.trigger_request_until(&request, rx);
    let stop = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(true).ok();
    };
    let (report, ()) = tokio::join!(run, stop);

    assert_eq!(report?.outcome, RunOutcome::Cancelled);
    assert!(store.deleted.actions().is_empty());
    Ok(())
}
