//! A small scripted process engine.
//!
//! [`ScriptedEngine`] runs a linear process written as `->`-separated steps:
//!
//! | Step | Behavior |
//! |------|----------|
//! | `start` | start event, passes straight through |
//! | `task:<id>` | service task, completes immediately |
//! | `user:<id>` | user task, emits `wait` and pauses until [`ScriptedEngine::signal`] |
//! | `fail:<id>` | emits `error` and halts |
//! | `end` | end event, emits the process `end` |
//!
//! Events go to the listener passed at execute/resume time first, then to
//! the engine's own [`events`](ProcessEngine::events).
//!
//! Execution is explicit: [`execute`](ProcessEngine::execute) loads the run
//! and acknowledges at once, [`ScriptedEngine::run`] drives it to the next
//! user task or to the end. This keeps the order of acknowledgement and
//! events deterministic.
//!
//! # Example
//!
//! ```
//! use conductor_engine::ProcessEngine;
//! use conductor_engine::scripted::{ScriptedEngine, ScriptedStatus};
//!
//! let engine = ScriptedEngine::parse("start -> task:ship -> user:sign -> end").unwrap();
//! # futures::executor::block_on(async {
//! engine.execute(Default::default()).unwrap().await.unwrap();
//! # });
//! engine.run().unwrap();
//! assert_eq!(engine.waiting_on().as_deref(), Some("sign"));
//!
//! engine.signal("sign").unwrap();
//! assert_eq!(engine.status(), ScriptedStatus::Completed);
//! ```

use core::fmt;

use conductor_listeners::{EngineEvent, EventKind, ListenerSet};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::engine::{Acknowledgement, EngineFactory, EngineSnapshot, ProcessEngine, Resumption};
use crate::error::EngineError;
use crate::options::EngineOptions;

// ─────────────────────────────────────────────────────────────────────────────
// Definition
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Start,
    Task(String),
    User(String),
    Fail(String),
    End,
}

impl Step {
    fn parse(raw: &str) -> Result<Self, EngineError> {
        let raw = raw.trim();
        let step = match raw.split_once(':') {
            None if raw == "start" => Step::Start,
            None if raw == "end" => Step::End,
            Some((kind, id)) if !id.trim().is_empty() => {
                let id = id.trim().to_string();
                match kind.trim() {
                    "task" => Step::Task(id),
                    "user" => Step::User(id),
                    "fail" => Step::Fail(id),
                    other => {
                        return Err(EngineError::Definition(format!(
                            "unknown step kind '{other}'"
                        )));
                    }
                }
            }
            _ => return Err(EngineError::Definition(format!("invalid step '{raw}'"))),
        };
        Ok(step)
    }

    fn activity_id(&self) -> &str {
        match self {
            Step::Start => "start",
            Step::End => "end",
            Step::Task(id) | Step::User(id) | Step::Fail(id) => id,
        }
    }
}

fn parse_definition(source: &str) -> Result<Vec<Step>, EngineError> {
    if source.trim().is_empty() {
        return Err(EngineError::Definition("empty definition".to_string()));
    }
    source.split("->").map(Step::parse).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// ScriptedEngine
// ─────────────────────────────────────────────────────────────────────────────

/// Where a [`ScriptedEngine`] run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptedStatus {
    /// Loaded, never executed.
    Idle,
    /// Executed or resumed, waiting for [`ScriptedEngine::run`].
    Ready,
    /// Advancing through steps.
    Running,
    /// Paused on a user task.
    Waiting,
    /// Reached the end.
    Completed,
    /// Stopped on request.
    Stopped,
    /// Halted on a failing step.
    Failed,
}

impl ScriptedStatus {
    fn is_terminal(self) -> bool {
        matches!(
            self,
            ScriptedStatus::Completed | ScriptedStatus::Stopped | ScriptedStatus::Failed
        )
    }
}

#[derive(Debug)]
struct Run {
    status: ScriptedStatus,
    position: usize,
    variables: Map<String, Value>,
    listener: Option<ListenerSet>,
}

/// Serialized form of a run.
#[derive(Debug, Serialize, Deserialize)]
struct SavedRun {
    source: String,
    status: ScriptedStatus,
    position: usize,
    #[serde(default)]
    variables: Map<String, Value>,
}

/// A linear process engine driven step by step.
///
/// See the [module documentation](self) for the definition format.
pub struct ScriptedEngine {
    source: String,
    steps: Vec<Step>,
    events: ListenerSet,
    run: Mutex<Run>,
}

impl ScriptedEngine {
    /// Parses a definition.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Definition`] for an empty definition or an
    /// unknown step.
    pub fn parse(source: &str) -> Result<Self, EngineError> {
        let steps = parse_definition(source)?;
        Ok(Self {
            source: source.to_string(),
            steps,
            events: ListenerSet::new(),
            run: Mutex::new(Run {
                status: ScriptedStatus::Idle,
                position: 0,
                variables: Map::new(),
                listener: None,
            }),
        })
    }

    /// Rebuilds an engine from a snapshot taken with
    /// [`ProcessEngine::snapshot`].
    ///
    /// An interrupted run comes back [`Ready`](ScriptedStatus::Ready) at the
    /// step it had reached; a finished run keeps its status.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Snapshot`] if the snapshot is malformed, or
    /// [`EngineError::Definition`] if its definition no longer parses.
    pub fn from_snapshot(snapshot: &EngineSnapshot) -> Result<Self, EngineError> {
        let saved: SavedRun = serde_json::from_value(snapshot.as_value().clone())
            .map_err(|error| EngineError::Snapshot(error.to_string()))?;

        let engine = Self::parse(&saved.source)?;
        if saved.position > engine.steps.len() {
            return Err(EngineError::Snapshot(format!(
                "position {} outside a definition of {} steps",
                saved.position,
                engine.steps.len()
            )));
        }

        {
            let mut run = engine.run.lock();
            run.position = saved.position;
            run.variables = saved.variables;
            run.status = match saved.status {
                ScriptedStatus::Completed | ScriptedStatus::Failed => saved.status,
                _ => ScriptedStatus::Ready,
            };
        }
        Ok(engine)
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> ScriptedStatus {
        self.run.lock().status
    }

    /// Id of the user task being waited on, if any.
    #[must_use]
    pub fn waiting_on(&self) -> Option<String> {
        let run = self.run.lock();
        match (run.status, self.steps.get(run.position)) {
            (ScriptedStatus::Waiting, Some(Step::User(id))) => Some(id.clone()),
            _ => None,
        }
    }

    /// Process variables.
    #[must_use]
    pub fn variables(&self) -> Map<String, Value> {
        self.run.lock().variables.clone()
    }

    /// Advances from [`Ready`](ScriptedStatus::Ready) to the next user task
    /// or the end.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Rejected`] unless the engine is ready.
    pub fn run(&self) -> Result<(), EngineError> {
        let (fresh, listener) = {
            let mut run = self.run.lock();
            if run.status != ScriptedStatus::Ready {
                return Err(EngineError::Rejected(format!(
                    "cannot run while {:?}",
                    run.status
                )));
            }
            run.status = ScriptedStatus::Running;
            (run.position == 0, run.listener.clone())
        };

        if fresh {
            self.emit(listener.as_ref(), EngineEvent::from(EventKind::Start));
        }
        self.advance();
        Ok(())
    }

    /// Completes the user task `activity_id` and continues.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSignal`] unless the engine is waiting on
    /// exactly that task.
    pub fn signal(&self, activity_id: &str) -> Result<(), EngineError> {
        let listener = {
            let mut run = self.run.lock();
            let waiting = run.status == ScriptedStatus::Waiting
                && matches!(self.steps.get(run.position), Some(Step::User(id)) if id == activity_id);
            if !waiting {
                return Err(EngineError::InvalidSignal(activity_id.to_string()));
            }
            run.position += 1;
            run.status = ScriptedStatus::Running;
            run.listener.clone()
        };

        tracing::trace!(activity_id, "user task signalled");
        self.complete_activity(listener.as_ref(), activity_id);
        self.advance();
        Ok(())
    }

    fn advance(&self) {
        loop {
            let (step, listener) = {
                let mut run = self.run.lock();
                if run.status != ScriptedStatus::Running {
                    return;
                }
                let Some(step) = self.steps.get(run.position).cloned() else {
                    run.status = ScriptedStatus::Completed;
                    let listener = run.listener.clone();
                    drop(run);
                    self.emit(listener.as_ref(), EngineEvent::from(EventKind::End));
                    return;
                };
                match step {
                    Step::User(_) => run.status = ScriptedStatus::Waiting,
                    Step::Fail(_) => run.status = ScriptedStatus::Failed,
                    Step::End => run.status = ScriptedStatus::Completed,
                    Step::Start | Step::Task(_) => run.position += 1,
                }
                (step, run.listener.clone())
            };

            let listener = listener.as_ref();
            let activity_id = step.activity_id();
            self.emit(listener, activity_event(EventKind::Enter, activity_id));

            match &step {
                Step::Start | Step::Task(_) => self.complete_activity(listener, activity_id),
                Step::User(_) => {
                    self.emit(listener, activity_event(EventKind::Wait, activity_id));
                    return;
                }
                Step::Fail(id) => {
                    let event = activity_event(EventKind::Error, activity_id)
                        .with_data(serde_json::json!({ "message": format!("activity '{id}' failed") }));
                    self.emit(listener, event);
                    return;
                }
                Step::End => {
                    self.emit(listener, activity_event(EventKind::Leave, activity_id));
                    self.emit(listener, EngineEvent::from(EventKind::End));
                    return;
                }
            }
        }
    }

    fn complete_activity(&self, listener: Option<&ListenerSet>, activity_id: &str) {
        self.emit(listener, activity_event(EventKind::Leave, activity_id));
        self.emit(listener, activity_event(EventKind::Taken, activity_id));
    }

    fn emit(&self, listener: Option<&ListenerSet>, event: EngineEvent) {
        tracing::trace!(event = event.name(), activity_id = event.activity_id(), "emit");
        if let Some(listener) = listener {
            listener.emit(&event);
        }
        self.events.emit(&event);
    }

    fn load(&self, options: EngineOptions) {
        let mut run = self.run.lock();
        run.listener = options.listener;
        run.variables.extend(options.variables);
    }
}

fn activity_event(kind: EventKind, activity_id: &str) -> EngineEvent {
    EngineEvent::from(kind).with_activity(activity_id)
}

fn acknowledged() -> Acknowledgement {
    Box::pin(futures::future::ready(Ok(())))
}

impl ProcessEngine for ScriptedEngine {
    fn execute(&self, options: EngineOptions) -> Result<Acknowledgement, EngineError> {
        {
            let mut run = self.run.lock();
            if matches!(
                run.status,
                ScriptedStatus::Running | ScriptedStatus::Waiting
            ) {
                return Err(EngineError::Rejected("already executing".to_string()));
            }
            run.status = ScriptedStatus::Ready;
            run.position = 0;
        }
        self.load(options);
        Ok(acknowledged())
    }

    fn stop(&self) -> Result<(), EngineError> {
        let listener = {
            let mut run = self.run.lock();
            if run.status.is_terminal() {
                return Ok(());
            }
            run.status = ScriptedStatus::Stopped;
            run.listener.clone()
        };
        self.emit(listener.as_ref(), EngineEvent::from(EventKind::End));
        Ok(())
    }

    fn snapshot(&self) -> Result<EngineSnapshot, EngineError> {
        let run = self.run.lock();
        let saved = SavedRun {
            source: self.source.clone(),
            status: run.status,
            position: run.position,
            variables: run.variables.clone(),
        };
        serde_json::to_value(saved)
            .map(EngineSnapshot::new)
            .map_err(|error| EngineError::Snapshot(error.to_string()))
    }

    fn events(&self) -> &ListenerSet {
        &self.events
    }
}

impl fmt::Debug for ScriptedEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedEngine")
            .field("source", &self.source)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ScriptedEngineFactory
// ─────────────────────────────────────────────────────────────────────────────

/// [`EngineFactory`] producing [`ScriptedEngine`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedEngineFactory;

impl EngineFactory for ScriptedEngineFactory {
    fn create(&self, source: &str) -> Result<Box<dyn ProcessEngine>, EngineError> {
        Ok(Box::new(ScriptedEngine::parse(source)?))
    }

    fn resume(
        &self,
        snapshot: &EngineSnapshot,
        options: EngineOptions,
    ) -> Result<Resumption, EngineError> {
        let engine = ScriptedEngine::from_snapshot(snapshot)?;
        engine.load(options);
        Ok(Resumption {
            engine: Box::new(engine),
            acknowledged: acknowledged(),
        })
    }
}
