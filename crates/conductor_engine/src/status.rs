//! Internal listeners that keep process records in step with engine events.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use conductor_listeners::{EngineEvent, EventKind, ListenerSet, create_listeners_for, merge_listeners};
use conductor_registry::{InstanceId, ProcessRegistry, ProcessState};

use crate::error::LifecycleError;
use crate::options::LifecycleOptions;

/// What a status listener needs to update one instance's record.
#[derive(Debug, Clone)]
pub(crate) struct StatusTracker {
    pub(crate) processes: Arc<ProcessRegistry>,
    pub(crate) instance_id: InstanceId,
    pub(crate) stopped: Arc<AtomicBool>,
}

impl StatusTracker {
    /// Records `state`, logging instead of failing.
    ///
    /// Event callbacks have no caller to report a store failure to.
    pub(crate) fn record(&self, state: ProcessState) {
        if let Err(error) = self.processes.update_state(&self.instance_id, state) {
            tracing::warn!(
                instance_id = %self.instance_id,
                %state,
                %error,
                "failed to record process state"
            );
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Merges a `wait` listener into the caller's listener and returns the
    /// resulting set.
    ///
    /// The caller's subscriptions keep firing first.
    pub(crate) fn inject_wait_listener(
        &self,
        options: &mut LifecycleOptions,
    ) -> Result<ListenerSet, LifecycleError> {
        let tracker = self.clone();
        let status = create_listeners_for(
            move |_: &EngineEvent, _: EventKind| {
                if tracker.is_stopped() {
                    tracing::trace!(instance_id = %tracker.instance_id, "wait after stop ignored");
                    return;
                }
                tracker.record(ProcessState::Waiting);
            },
            &[EventKind::Wait],
            None,
        );

        let listener = merge_listeners(Some(&status), options.listener.take())?;
        options.listener = Some(listener.clone());
        Ok(listener)
    }

    /// Subscribes to `end` and `error` on the engine's own events.
    ///
    /// `end` completes the record unless the instance was stopped on
    /// purpose; `error` always marks it failed.
    pub(crate) fn track_completion(&self, events: &ListenerSet) {
        let tracker = self.clone();
        events.on(EventKind::End, move |_: &EngineEvent| {
            if tracker.is_stopped() {
                tracing::debug!(instance_id = %tracker.instance_id, "end after stop, keeping stopped");
                return;
            }
            tracker.record(ProcessState::Complete);
        });

        let tracker = self.clone();
        events.on(EventKind::Error, move |event: &EngineEvent| {
            tracing::debug!(
                instance_id = %tracker.instance_id,
                activity_id = event.activity_id(),
                "engine reported error"
            );
            tracker.record(ProcessState::Error);
        });
    }
}
