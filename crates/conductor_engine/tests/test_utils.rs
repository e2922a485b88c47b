//! Shared test utilities for `conductor_engine` integration tests.
//!
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use conductor_engine::hooks::{HookBundle, HookContext, HookError, HookPoint};
use conductor_engine::scripted::{ScriptedEngine, ScriptedEngineFactory};
use conductor_engine::{
    Acknowledgement, Conductor, EngineError, EngineFactory, EngineHandle, EngineOptions,
    EngineSnapshot, LifecycleOptions, ProcessEngine, Resumption,
};
use conductor_listeners::{EngineEvent, EventKind, ListenerSet};
use conductor_registry::{InstanceId, ProcessState};
use parking_lot::Mutex;

// ═══════════════════════════════════════════════════════════════════════════════
// CONDUCTOR SETUP
// ═══════════════════════════════════════════════════════════════════════════════

/// Two user-free tasks around one user task.
pub const APPROVAL: &str = "start -> task:prepare -> user:approve -> task:archive -> end";

/// Creates a conductor over the scripted engine with an in-memory registry.
pub fn conductor() -> Conductor {
    Conductor::new(ScriptedEngineFactory)
}

/// Returns the scripted engine behind a handle.
pub fn scripted(handle: &EngineHandle) -> &ScriptedEngine {
    handle
        .engine_as::<ScriptedEngine>()
        .expect("handle should wrap a scripted engine")
}

/// Reads the recorded state of `id`.
pub fn state_of(conductor: &Conductor, id: &str) -> Option<ProcessState> {
    conductor
        .processes()
        .state(&InstanceId::from(id))
        .expect("store read should succeed")
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared, ordered log of strings.
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// A listener set logging every standard event name.
pub fn recording_listener(log: &Log) -> ListenerSet {
    let listener = ListenerSet::new();
    for kind in EventKind::ALL {
        let log = log.clone();
        listener.on(kind, move |event: &EngineEvent| log.push(event.name()));
    }
    listener
}

/// A bundle logging `label:onPoint` for every hook point, plus `!engine`
/// when the context has no engine handle.
pub fn recording_bundle(label: &'static str, log: &Log) -> HookBundle {
    HookPoint::ALL
        .into_iter()
        .fold(HookBundle::new(), |bundle, point| {
            let log = log.clone();
            bundle.on(
                point,
                move |ctx: &HookContext<'_>, _: &mut LifecycleOptions| -> Result<(), HookError> {
                    let suffix = if ctx.engine().is_some() { "" } else { "!engine" };
                    log.push(format!("{label}:{}{suffix}", ctx.point()));
                    Ok(())
                },
            )
        })
}

// ═══════════════════════════════════════════════════════════════════════════════
// FAILING ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// An engine whose start and resume are never acknowledged successfully.
#[derive(Default)]
pub struct RefusingEngine {
    events: ListenerSet,
}

impl ProcessEngine for RefusingEngine {
    fn execute(&self, _options: EngineOptions) -> Result<Acknowledgement, EngineError> {
        Ok(Box::pin(async {
            Err(EngineError::Rejected("no capacity".to_string()))
        }))
    }

    fn stop(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn snapshot(&self) -> Result<EngineSnapshot, EngineError> {
        Ok(EngineSnapshot::new(serde_json::json!({})))
    }

    fn events(&self) -> &ListenerSet {
        &self.events
    }
}

/// Factory for [`RefusingEngine`].
pub struct RefusingFactory;

impl EngineFactory for RefusingFactory {
    fn create(&self, _source: &str) -> Result<Box<dyn ProcessEngine>, EngineError> {
        Ok(Box::new(RefusingEngine::default()))
    }

    fn resume(
        &self,
        _snapshot: &EngineSnapshot,
        _options: EngineOptions,
    ) -> Result<Resumption, EngineError> {
        Ok(Resumption {
            engine: Box::new(RefusingEngine::default()),
            acknowledged: Box::pin(async {
                Err(EngineError::Rejected("no capacity".to_string()))
            }),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COUNTING FACTORY
// ═══════════════════════════════════════════════════════════════════════════════

/// A scripted engine factory counting how often each operation is called.
#[derive(Clone, Default)]
pub struct CountingFactory {
    creates: Arc<AtomicUsize>,
    resumes: Arc<AtomicUsize>,
}

impl CountingFactory {
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn resumes(&self) -> usize {
        self.resumes.load(Ordering::SeqCst)
    }
}

impl EngineFactory for CountingFactory {
    fn create(&self, source: &str) -> Result<Box<dyn ProcessEngine>, EngineError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        ScriptedEngineFactory.create(source)
    }

    fn resume(
        &self,
        snapshot: &EngineSnapshot,
        options: EngineOptions,
    ) -> Result<Resumption, EngineError> {
        self.resumes.fetch_add(1, Ordering::SeqCst);
        ScriptedEngineFactory.resume(snapshot, options)
    }
}
