//! The decorated engine handle and its intercepted operations.

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use conductor_listeners::ListenerSet;
use conductor_registry::{InstanceId, ProcessState};
use parking_lot::Mutex;

use crate::conductor::Shared;
use crate::engine::{EngineSnapshot, ProcessEngine};
use crate::error::{EngineError, LifecycleError};
use crate::hooks::{HookPoint, HookSet};
use crate::options::LifecycleOptions;
use crate::status::StatusTracker;

/// An executing process engine decorated with its identity, local hooks and
/// stop flag.
///
/// Obtained from [`Conductor::create`](crate::Conductor::create) or
/// [`Conductor::resume`](crate::Conductor::resume). The caller owns the
/// handle; hooks borrow it while they run.
///
/// # Status Tracking
///
/// On binding, the handle subscribes to the engine's own `end` and `error`
/// events. `end` moves the record to `complete` unless the instance was
/// stopped on purpose, `error` moves it to `error` unconditionally.
pub struct EngineHandle {
    instance_id: InstanceId,
    extensions: HookSet,
    stopped: Arc<AtomicBool>,
    engine: Box<dyn ProcessEngine>,
    shared: Arc<Shared>,
    status_listener: Mutex<Option<ListenerSet>>,
}

impl EngineHandle {
    pub(crate) fn bind(
        shared: Arc<Shared>,
        instance_id: InstanceId,
        extensions: HookSet,
        engine: Box<dyn ProcessEngine>,
        stopped: Arc<AtomicBool>,
        status_listener: Option<ListenerSet>,
    ) -> Self {
        let handle = Self {
            instance_id,
            extensions,
            stopped,
            engine,
            shared,
            status_listener: Mutex::new(status_listener),
        };
        handle.tracker().track_completion(handle.engine.events());
        handle
    }

    /// Identity of the instance.
    #[must_use]
    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    /// Hook bundles local to this instance.
    #[must_use]
    pub fn extensions(&self) -> &HookSet {
        &self.extensions
    }

    /// Returns `true` if the instance was stopped and not executed or resumed
    /// since.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// The wrapped engine.
    #[must_use]
    pub fn engine(&self) -> &dyn ProcessEngine {
        &*self.engine
    }

    /// The wrapped engine as its concrete type.
    #[must_use]
    pub fn engine_as<T: ProcessEngine>(&self) -> Option<&T> {
        (*self.engine).downcast_ref::<T>()
    }

    /// The engine-level event set.
    #[must_use]
    pub fn events(&self) -> &ListenerSet {
        self.engine.events()
    }

    /// Serializes the engine state for a later resume.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Engine`] if the engine cannot capture its
    /// state.
    pub fn snapshot(&self) -> Result<EngineSnapshot, LifecycleError> {
        Ok(self.engine.snapshot()?)
    }

    /// Reads the instance's current recorded state.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn state(&self) -> Result<Option<ProcessState>, LifecycleError> {
        Ok(self.shared.processes.state(&self.instance_id)?)
    }

    /// Starts execution.
    ///
    /// 1. Runs `onExecuteBefore`; hooks may change `options`.
    /// 2. Merges a `wait` status listener into `options.listener`, unless
    ///    that set already carries this instance's status listener from an
    ///    earlier `execute` or `resume`.
    /// 3. Hands `listener`, `services` and `variables` to the engine.
    /// 4. Runs `onExecute`, then awaits the engine's acknowledgement.
    /// 5. Clears the stop flag, records `running` and runs `onExecuteAfter`.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::Hook`] if a hook fails; the operation stops there.
    /// - [`LifecycleError::Engine`] if the engine fails to start or
    ///   acknowledge. The record moves to `error` and `onExecuteAfter` is
    ///   skipped.
    /// - [`LifecycleError::Store`] if recording `running` fails.
    pub async fn execute(&self, mut options: LifecycleOptions) -> Result<(), LifecycleError> {
        let hooks = self.merged_hooks();
        tracing::debug!(instance_id = %self.instance_id, hooks = hooks.len(), "execute");

        hooks.run(
            HookPoint::EXECUTE_BEFORE,
            &self.instance_id,
            Some(self),
            &mut options,
        )?;

        self.inject_wait_listener(&mut options)?;

        let acknowledged = match self.engine.execute(options.to_engine_options()) {
            Ok(acknowledged) => acknowledged,
            Err(error) => return Err(self.fail(error)),
        };

        hooks.run(HookPoint::EXECUTE, &self.instance_id, Some(self), &mut options)?;

        if let Err(error) = acknowledged.await {
            return Err(self.fail(error));
        }
        self.mark_running()?;

        hooks.run(
            HookPoint::EXECUTE_AFTER,
            &self.instance_id,
            Some(self),
            &mut options,
        )
    }

    /// Stops execution.
    ///
    /// The stop flag is set and the record moves to `stopped` before the
    /// engine is asked to stop, so an `end` emitted by the stopping engine
    /// does not complete the instance.
    ///
    /// Runs `onStopBefore`, then `onStop` and `onStopAfter` once the engine
    /// has stopped.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::Hook`] if a hook fails.
    /// - [`LifecycleError::Store`] if recording `stopped` fails; the engine
    ///   is not stopped in that case.
    /// - [`LifecycleError::Engine`] if the engine refuses to stop.
    pub fn stop(&self, mut options: LifecycleOptions) -> Result<(), LifecycleError> {
        let hooks = self.merged_hooks();
        tracing::debug!(instance_id = %self.instance_id, hooks = hooks.len(), "stop");

        hooks.run(
            HookPoint::STOP_BEFORE,
            &self.instance_id,
            Some(self),
            &mut options,
        )?;

        self.stopped.store(true, Ordering::SeqCst);
        self.shared
            .processes
            .update_state(&self.instance_id, ProcessState::Stopped)?;

        self.engine.stop()?;

        hooks.run(HookPoint::STOP, &self.instance_id, Some(self), &mut options)?;
        hooks.run(
            HookPoint::STOP_AFTER,
            &self.instance_id,
            Some(self),
            &mut options,
        )
    }

    /// Adds the `wait` status listener once per listener set.
    fn inject_wait_listener(&self, options: &mut LifecycleOptions) -> Result<(), LifecycleError> {
        let mut current = self.status_listener.lock();
        let tracked = current
            .as_ref()
            .zip(options.listener.as_ref())
            .is_some_and(|(current, listener)| current.ptr_eq(listener));
        if tracked {
            tracing::trace!(instance_id = %self.instance_id, "status listener already attached");
            return Ok(());
        }

        *current = Some(self.tracker().inject_wait_listener(options)?);
        Ok(())
    }

    /// Global bundles overlaid with this instance's local ones.
    pub(crate) fn merged_hooks(&self) -> HookSet {
        HookSet::merged(&self.shared.hooks.snapshot(), &self.extensions)
    }

    pub(crate) fn tracker(&self) -> StatusTracker {
        StatusTracker {
            processes: Arc::clone(&self.shared.processes),
            instance_id: self.instance_id.clone(),
            stopped: Arc::clone(&self.stopped),
        }
    }

    /// Handles an acknowledged start or resume.
    pub(crate) fn mark_running(&self) -> Result<(), LifecycleError> {
        self.stopped.store(false, Ordering::SeqCst);
        self.shared
            .processes
            .update_state(&self.instance_id, ProcessState::Running)?;
        tracing::info!(instance_id = %self.instance_id, "process running");
        Ok(())
    }

    /// Records a failed start or resume and converts the error.
    pub(crate) fn fail(&self, error: EngineError) -> LifecycleError {
        tracing::warn!(instance_id = %self.instance_id, %error, "engine failed to acknowledge");
        self.tracker().record(ProcessState::Error);
        LifecycleError::Engine(error)
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("instance_id", &self.instance_id)
            .field("extensions", &self.extensions)
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}
