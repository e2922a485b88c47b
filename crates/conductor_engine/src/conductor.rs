//! The lifecycle instrumenter: creating and resuming tracked instances.

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use conductor_core::{ConductorConfig, ConfigError};
use conductor_registry::{InstanceId, ProcessRegistry, ProcessState, RecordStore, Registration};

use crate::engine::{EngineFactory, EngineSnapshot, Resumption};
use crate::error::LifecycleError;
use crate::handle::EngineHandle;
use crate::hooks::{HookPoint, HookRegistry, HookSet};
use crate::options::{CreateOptions, ResumeOptions};
use crate::resume::PendingResume;
use crate::status::StatusTracker;

/// State shared by a [`Conductor`] and every handle it produced.
pub(crate) struct Shared {
    pub(crate) hooks: Arc<HookRegistry>,
    pub(crate) processes: Arc<ProcessRegistry>,
    pub(crate) factory: Arc<dyn EngineFactory>,
    pub(crate) id_length: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Conductor
// ─────────────────────────────────────────────────────────────────────────────

/// Wraps a process engine with lifecycle hooks and status tracking.
///
/// A `Conductor` owns the global [`HookRegistry`] and the
/// [`ProcessRegistry`] and builds [`EngineHandle`]s through an
/// [`EngineFactory`]. Cloning yields another handle to the same state.
///
/// # Example
///
/// ```
/// use conductor_engine::scripted::{ScriptedEngine, ScriptedEngineFactory};
/// use conductor_engine::{Conductor, CreateOptions, LifecycleOptions};
/// use conductor_registry::ProcessState;
///
/// # futures::executor::block_on(async {
/// let conductor = Conductor::new(ScriptedEngineFactory);
/// let handle = conductor
///     .create(CreateOptions::new("start -> user:approve -> end").with_instance_id("I1"))
///     .unwrap();
///
/// handle.execute(LifecycleOptions::new()).await.unwrap();
/// assert_eq!(handle.state().unwrap(), Some(ProcessState::Running));
///
/// let engine = handle.engine_as::<ScriptedEngine>().unwrap();
/// engine.run().unwrap();
/// assert_eq!(handle.state().unwrap(), Some(ProcessState::Waiting));
///
/// engine.signal("approve").unwrap();
/// assert_eq!(handle.state().unwrap(), Some(ProcessState::Complete));
/// # });
/// ```
#[derive(Clone)]
pub struct Conductor {
    shared: Arc<Shared>,
}

impl Conductor {
    /// Creates a conductor with an in-memory registry and no global hooks.
    #[must_use]
    pub fn new(factory: impl EngineFactory) -> Self {
        Self::builder(factory).build()
    }

    /// Starts building a conductor around `factory`.
    #[must_use]
    pub fn builder(factory: impl EngineFactory) -> ConductorBuilder {
        ConductorBuilder::new(Arc::new(factory))
    }

    /// Creates a conductor using the configured record store and id length.
    ///
    /// Logging is not initialized here; call
    /// [`TracingConfig::init`](conductor_core::TracingConfig::init) on
    /// `config.tracing` if wanted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Store`] if the store cannot be opened.
    pub fn from_config(
        config: &ConductorConfig,
        factory: impl EngineFactory,
    ) -> Result<Self, ConfigError> {
        Ok(Self::builder(factory)
            .with_store(config.store.open()?)
            .with_instance_id_length(config.instance_id_length)
            .build())
    }

    /// The global hook registry.
    #[must_use]
    pub fn hooks(&self) -> &HookRegistry {
        &self.shared.hooks
    }

    /// The process registry.
    #[must_use]
    pub fn processes(&self) -> &ProcessRegistry {
        &self.shared.processes
    }

    /// Creates a tracked instance of `options.source`.
    ///
    /// Registers the instance in `started` (a no-op if the id is already
    /// registered), builds the engine and binds the id and local hooks to
    /// the returned handle. An id is generated when none is given.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::Store`] if registration fails.
    /// - [`LifecycleError::Engine`] if the engine rejects the definition.
    pub fn create(&self, options: CreateOptions) -> Result<EngineHandle, LifecycleError> {
        let CreateOptions {
            source,
            instance_id,
            hooks,
        } = options;
        let instance_id =
            instance_id.unwrap_or_else(|| InstanceId::generate_with_length(self.shared.id_length));

        self.shared
            .processes
            .register(Registration::new(instance_id.clone(), source.as_str()))?;

        let engine = self.shared.factory.create(&source)?;
        tracing::info!(%instance_id, local_hooks = hooks.len(), "created process instance");

        Ok(EngineHandle::bind(
            Arc::clone(&self.shared),
            instance_id,
            hooks,
            engine,
            Arc::new(AtomicBool::new(false)),
            None,
        ))
    }

    /// Resumes an instance from a snapshot.
    ///
    /// Runs synchronously up to handing the snapshot to the engine factory:
    ///
    /// 1. Requires `options.instance_id`.
    /// 2. Registers the instance with `isResume` and the serialized snapshot
    ///    as its source (a no-op if already registered).
    /// 3. Runs `onResumeBefore`; hooks see no engine yet.
    /// 4. Merges a `wait` status listener into the options and resumes the
    ///    engine.
    /// 5. Binds the handle and runs `onResume`.
    ///
    /// The returned [`PendingResume`] exposes the handle immediately.
    /// Awaiting it waits for the engine's acknowledgement, records `running`,
    /// runs `onResumeAfter` and yields the handle.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::MissingInstanceId`] if no id was given. Nothing
    ///   is registered and the engine is not called.
    /// - [`LifecycleError::Hook`], [`LifecycleError::Store`],
    ///   [`LifecycleError::Engine`] as for the other operations.
    pub fn resume(
        &self,
        snapshot: &EngineSnapshot,
        options: ResumeOptions,
    ) -> Result<PendingResume, LifecycleError> {
        let ResumeOptions {
            instance_id,
            hooks: local,
            options: mut lifecycle,
        } = options;
        let Some(instance_id) = instance_id else {
            return Err(LifecycleError::MissingInstanceId);
        };

        self.shared.processes.register(Registration::resumed(
            instance_id.clone(),
            snapshot.to_json_string()?,
        ))?;

        let hooks = HookSet::merged(&self.shared.hooks.snapshot(), &local);
        tracing::debug!(%instance_id, hooks = hooks.len(), "resume");

        hooks.run(HookPoint::RESUME_BEFORE, &instance_id, None, &mut lifecycle)?;

        let stopped = Arc::new(AtomicBool::new(false));
        let tracker = StatusTracker {
            processes: Arc::clone(&self.shared.processes),
            instance_id: instance_id.clone(),
            stopped: Arc::clone(&stopped),
        };
        let status_listener = tracker.inject_wait_listener(&mut lifecycle)?;

        let Resumption {
            engine,
            acknowledged,
        } = match self
            .shared
            .factory
            .resume(snapshot, lifecycle.to_engine_options())
        {
            Ok(resumption) => resumption,
            Err(error) => {
                tracing::warn!(%instance_id, %error, "engine failed to resume");
                tracker.record(ProcessState::Error);
                return Err(error.into());
            }
        };

        let handle = EngineHandle::bind(
            Arc::clone(&self.shared),
            instance_id,
            local,
            engine,
            stopped,
            Some(status_listener),
        );

        hooks.run(
            HookPoint::RESUME,
            handle.instance_id(),
            Some(&handle),
            &mut lifecycle,
        )?;

        Ok(PendingResume::new(handle, hooks, lifecycle, acknowledged))
    }
}

impl fmt::Debug for Conductor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conductor")
            .field("hooks", &self.shared.hooks)
            .field("processes", &self.shared.processes)
            .field("id_length", &self.shared.id_length)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ConductorBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for [`Conductor`].
///
/// Lets several conductors share one hook registry or process registry.
pub struct ConductorBuilder {
    factory: Arc<dyn EngineFactory>,
    hooks: Option<Arc<HookRegistry>>,
    processes: Option<Arc<ProcessRegistry>>,
    id_length: usize,
}

impl ConductorBuilder {
    fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            hooks: None,
            processes: None,
            id_length: InstanceId::DEFAULT_LENGTH,
        }
    }

    /// Uses an existing global hook registry.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<HookRegistry>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Uses an existing process registry.
    #[must_use]
    pub fn with_processes(mut self, processes: Arc<ProcessRegistry>) -> Self {
        self.processes = Some(processes);
        self
    }

    /// Uses a new process registry over `store`.
    #[must_use]
    pub fn with_store(self, store: Arc<dyn RecordStore>) -> Self {
        self.with_processes(Arc::new(ProcessRegistry::new(store)))
    }

    /// Sets the length of generated instance ids.
    ///
    /// 0 keeps [`InstanceId::DEFAULT_LENGTH`].
    #[must_use]
    pub fn with_instance_id_length(mut self, length: usize) -> Self {
        self.id_length = length;
        self
    }

    /// Builds the conductor.
    #[must_use]
    pub fn build(self) -> Conductor {
        Conductor {
            shared: Arc::new(Shared {
                hooks: self.hooks.unwrap_or_default(),
                processes: self
                    .processes
                    .unwrap_or_else(|| Arc::new(ProcessRegistry::in_memory())),
                factory: self.factory,
                id_length: self.id_length,
            }),
        }
    }
}

impl fmt::Debug for ConductorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConductorBuilder")
            .field("id_length", &self.id_length)
            .finish_non_exhaustive()
    }
}
