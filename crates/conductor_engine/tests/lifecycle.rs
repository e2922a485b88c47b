//! Instance lifecycle: registration, execution, waiting, completion and stop.

mod test_utils;

use conductor_core::ConductorConfig;
use conductor_engine::scripted::{ScriptedEngineFactory, ScriptedStatus};
use conductor_engine::{Conductor, CreateOptions, LifecycleError, LifecycleOptions};
use conductor_listeners::{EngineEvent, EventKind};
use conductor_registry::{InstanceId, JsonFileStore, ProcessState, RecordStore};
use test_utils::{
    APPROVAL, Log, RefusingFactory, conductor, recording_bundle, recording_listener, scripted,
    state_of,
};

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn create_registers_instance_as_started() {
    let conductor = conductor();
    let handle = conductor
        .create(CreateOptions::new(APPROVAL).with_instance_id("I1"))
        .unwrap();

    assert_eq!(handle.instance_id().as_str(), "I1");
    assert!(!handle.is_stopped());
    assert!(handle.extensions().is_empty());

    let record = conductor
        .processes()
        .is_registered(&InstanceId::from("I1"))
        .unwrap()
        .unwrap();
    assert_eq!(record.state, ProcessState::Started);
    assert_eq!(record.source, APPROVAL);
    assert!(!record.is_resume);
}

#[test]
fn same_instance_id_registers_once() {
    let conductor = conductor();
    let first = conductor
        .create(CreateOptions::new(APPROVAL).with_instance_id("dup"))
        .unwrap();
    let second = conductor
        .create(CreateOptions::new(APPROVAL).with_instance_id("dup"))
        .unwrap();

    assert_eq!(first.instance_id(), second.instance_id());
    assert_eq!(conductor.processes().records().unwrap().len(), 1);
}

#[test]
fn generated_ids_use_configured_length() {
    let conductor = Conductor::builder(ScriptedEngineFactory)
        .with_instance_id_length(8)
        .build();

    let a = conductor.create(CreateOptions::new(APPROVAL)).unwrap();
    let b = conductor.create(CreateOptions::new(APPROVAL)).unwrap();

    assert_eq!(a.instance_id().as_str().len(), 8);
    assert_ne!(a.instance_id(), b.instance_id());
    assert_eq!(conductor.processes().records().unwrap().len(), 2);
}

#[test]
fn zero_id_length_falls_back_to_default() {
    let conductor = Conductor::builder(ScriptedEngineFactory)
        .with_instance_id_length(0)
        .build();

    let handle = conductor.create(CreateOptions::new("start -> end")).unwrap();

    assert_eq!(
        handle.instance_id().as_str().len(),
        InstanceId::DEFAULT_LENGTH
    );
}

#[test]
fn invalid_definition_is_an_engine_error() {
    let conductor = conductor();
    let err = conductor
        .create(CreateOptions::new("start -> juggle:x").with_instance_id("bad"))
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Engine(_)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Execute
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn execute_records_running_after_acknowledgement() {
    let conductor = conductor();
    let handle = conductor
        .create(CreateOptions::new(APPROVAL).with_instance_id("I1"))
        .unwrap();

    handle.execute(LifecycleOptions::new()).await.unwrap();

    assert_eq!(state_of(&conductor, "I1"), Some(ProcessState::Running));
    assert_eq!(scripted(&handle).status(), ScriptedStatus::Ready);
}

#[tokio::test]
async fn two_task_process_completes() {
    let conductor = conductor();
    let handle = conductor
        .create(CreateOptions::new(APPROVAL).with_instance_id("I1"))
        .unwrap();
    handle.execute(LifecycleOptions::new()).await.unwrap();

    scripted(&handle).run().unwrap();
    assert_eq!(state_of(&conductor, "I1"), Some(ProcessState::Waiting));

    scripted(&handle).signal("approve").unwrap();
    assert_eq!(state_of(&conductor, "I1"), Some(ProcessState::Complete));
}

#[tokio::test]
async fn stopped_instance_stays_stopped_after_end() {
    let conductor = conductor();
    let handle = conductor
        .create(CreateOptions::new(APPROVAL).with_instance_id("I2"))
        .unwrap();
    handle.execute(LifecycleOptions::new()).await.unwrap();
    scripted(&handle).run().unwrap();
    assert_eq!(state_of(&conductor, "I2"), Some(ProcessState::Waiting));

    handle.stop(LifecycleOptions::new()).unwrap();
    assert!(handle.is_stopped());
    assert_eq!(state_of(&conductor, "I2"), Some(ProcessState::Stopped));

    handle.events().emit(&EngineEvent::from(EventKind::End));
    assert_eq!(state_of(&conductor, "I2"), Some(ProcessState::Stopped));
}

#[tokio::test]
async fn engine_error_is_recorded() {
    let conductor = conductor();
    let handle = conductor
        .create(CreateOptions::new("start -> fail:charge -> end").with_instance_id("E1"))
        .unwrap();
    handle.execute(LifecycleOptions::new()).await.unwrap();

    scripted(&handle).run().unwrap();

    assert_eq!(state_of(&conductor, "E1"), Some(ProcessState::Error));
}

#[tokio::test]
async fn caller_listener_fires_before_status_listener() {
    let conductor = conductor();
    let handle = conductor
        .create(CreateOptions::new(APPROVAL).with_instance_id("I1"))
        .unwrap();

    let seen = Log::new();
    let listener = recording_listener(&seen);
    {
        let conductor = conductor.clone();
        let seen = seen.clone();
        listener.on(EventKind::Wait, move |_: &EngineEvent| {
            let state = conductor
                .processes()
                .state(&InstanceId::from("I1"))
                .unwrap();
            seen.push(format!("state-at-wait:{:?}", state));
        });
    }

    handle
        .execute(LifecycleOptions::new().with_listener(listener.clone()))
        .await
        .unwrap();
    scripted(&handle).run().unwrap();

    let entries = seen.entries();
    assert_eq!(entries.first().map(String::as_str), Some("start"));
    assert!(entries.contains(&"state-at-wait:Some(Running)".to_string()));
    assert_eq!(listener.listener_count("wait"), 3);
    assert_eq!(state_of(&conductor, "I1"), Some(ProcessState::Waiting));
}

#[tokio::test]
async fn wait_after_stop_keeps_stopped() {
    let conductor = conductor();
    let handle = conductor
        .create(CreateOptions::new(APPROVAL).with_instance_id("I3"))
        .unwrap();
    let listener = conductor_listeners::ListenerSet::new();
    handle
        .execute(LifecycleOptions::new().with_listener(listener.clone()))
        .await
        .unwrap();
    handle.stop(LifecycleOptions::new()).unwrap();

    listener.emit(&EngineEvent::from(EventKind::Wait));

    assert_eq!(state_of(&conductor, "I3"), Some(ProcessState::Stopped));
}

#[tokio::test]
async fn re_execute_clears_stop_flag() {
    let conductor = conductor();
    let handle = conductor
        .create(CreateOptions::new(APPROVAL).with_instance_id("I4"))
        .unwrap();
    handle.execute(LifecycleOptions::new()).await.unwrap();
    handle.stop(LifecycleOptions::new()).unwrap();

    handle.execute(LifecycleOptions::new()).await.unwrap();

    assert!(!handle.is_stopped());
    assert_eq!(state_of(&conductor, "I4"), Some(ProcessState::Running));
}

#[tokio::test]
async fn reused_listener_carries_one_status_listener() {
    let conductor = conductor();
    let handle = conductor
        .create(CreateOptions::new(APPROVAL).with_instance_id("I5"))
        .unwrap();
    let listener = conductor_listeners::ListenerSet::new();

    for _ in 0..3 {
        handle
            .execute(LifecycleOptions::new().with_listener(listener.clone()))
            .await
            .unwrap();
        handle.stop(LifecycleOptions::new()).unwrap();
    }
    assert_eq!(listener.listener_count("wait"), 1);

    handle
        .execute(LifecycleOptions::new().with_listener(listener.clone()))
        .await
        .unwrap();
    scripted(&handle).run().unwrap();

    assert_eq!(listener.listener_count("wait"), 1);
    assert_eq!(state_of(&conductor, "I5"), Some(ProcessState::Waiting));
}

#[tokio::test]
async fn refused_acknowledgement_records_error_and_skips_after_hooks() {
    let conductor = Conductor::new(RefusingFactory);
    let log = Log::new();
    conductor.hooks().add("audit", recording_bundle("audit", &log));

    let handle = conductor
        .create(CreateOptions::new("anything").with_instance_id("R1"))
        .unwrap();
    let err = handle.execute(LifecycleOptions::new()).await.unwrap_err();

    assert!(matches!(err, LifecycleError::Engine(_)));
    assert_eq!(state_of(&conductor, "R1"), Some(ProcessState::Error));
    assert_eq!(
        log.entries(),
        vec!["audit:onExecuteBefore", "audit:onExecute"]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Stop
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stop_runs_hooks_around_native_stop() {
    let conductor = conductor();
    let log = Log::new();
    let handle = conductor
        .create(
            CreateOptions::new(APPROVAL)
                .with_instance_id("S1")
                .with_hook("audit", recording_bundle("audit", &log)),
        )
        .unwrap();
    handle.execute(LifecycleOptions::new()).await.unwrap();
    scripted(&handle).run().unwrap();
    log.clear();

    handle.stop(LifecycleOptions::new()).unwrap();

    assert_eq!(
        log.entries(),
        vec!["audit:onStopBefore", "audit:onStop", "audit:onStopAfter"]
    );
    assert_eq!(scripted(&handle).status(), ScriptedStatus::Stopped);
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_backed_records_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("processes.json");
    let config = ConductorConfig::from_json_str(&format!(
        r#"{{"store": {{"kind": "file", "path": {}}}, "instance_id_length": 10}}"#,
        serde_json::to_string(&path).unwrap()
    ))
    .unwrap();

    {
        let conductor = Conductor::from_config(&config, ScriptedEngineFactory).unwrap();
        let handle = conductor.create(CreateOptions::new(APPROVAL)).unwrap();
        assert_eq!(handle.instance_id().as_str().len(), 10);
        handle.execute(LifecycleOptions::new()).await.unwrap();
        scripted(&handle).run().unwrap();
    }

    let store = JsonFileStore::open(&path).unwrap();
    let records = store.find_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].state, ProcessState::Waiting);
}
