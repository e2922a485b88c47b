//! Options passed through the intercepted lifecycle operations.

use conductor_listeners::ListenerSet;
use conductor_registry::InstanceId;
use serde_json::{Map, Value};

use crate::hooks::{HookBundle, HookSet};

/// Options for `execute`, `stop` and `resume`.
///
/// Hooks receive these by mutable reference and may change them before the
/// engine sees them. Only `listener`, `services` and `variables` reach the
/// engine; anything in `extra` is visible to hooks but never forwarded.
#[derive(Debug, Clone, Default)]
pub struct LifecycleOptions {
    /// Listener receiving engine events.
    pub listener: Option<ListenerSet>,
    /// Service bindings made available to the process.
    pub services: Map<String, Value>,
    /// Initial process variables.
    pub variables: Map<String, Value>,
    /// Caller or hook data that is not forwarded to the engine.
    pub extra: Map<String, Value>,
}

impl LifecycleOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the listener.
    #[must_use]
    pub fn with_listener(mut self, listener: ListenerSet) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Adds a service binding.
    #[must_use]
    pub fn with_service(mut self, name: impl Into<String>, service: impl Into<Value>) -> Self {
        self.services.insert(name.into(), service.into());
        self
    }

    /// Adds a process variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Adds a value that stays with the lifecycle layer.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns the subset of options forwarded to the engine.
    #[must_use]
    pub fn to_engine_options(&self) -> EngineOptions {
        EngineOptions {
            listener: self.listener.clone(),
            services: self.services.clone(),
            variables: self.variables.clone(),
        }
    }
}

/// The options an engine receives.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Listener receiving engine events.
    pub listener: Option<ListenerSet>,
    /// Service bindings.
    pub services: Map<String, Value>,
    /// Process variables.
    pub variables: Map<String, Value>,
}

/// Options for [`Conductor::create`](crate::Conductor::create).
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// The process definition.
    pub source: String,
    /// Identity to bind; generated when absent.
    pub instance_id: Option<InstanceId>,
    /// Hook bundles local to the new instance.
    pub hooks: HookSet,
}

impl CreateOptions {
    /// Options for a new instance of `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            instance_id: None,
            hooks: HookSet::new(),
        }
    }

    /// Binds an existing instance id.
    #[must_use]
    pub fn with_instance_id(mut self, instance_id: impl Into<InstanceId>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    /// Replaces the local hook bundles.
    #[must_use]
    pub fn with_hooks(mut self, hooks: HookSet) -> Self {
        self.hooks = hooks;
        self
    }

    /// Adds one local hook bundle.
    #[must_use]
    pub fn with_hook(mut self, name: impl Into<String>, bundle: HookBundle) -> Self {
        self.hooks.insert(name, bundle);
        self
    }
}

/// Options for [`Conductor::resume`](crate::Conductor::resume).
#[derive(Debug, Clone, Default)]
pub struct ResumeOptions {
    /// Identity of the instance being resumed. Required.
    pub instance_id: Option<InstanceId>,
    /// Hook bundles local to the resumed instance.
    pub hooks: HookSet,
    /// Options passed through hooks to the engine.
    pub options: LifecycleOptions,
}

impl ResumeOptions {
    /// Creates empty resume options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instance id.
    #[must_use]
    pub fn with_instance_id(mut self, instance_id: impl Into<InstanceId>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    /// Replaces the local hook bundles.
    #[must_use]
    pub fn with_hooks(mut self, hooks: HookSet) -> Self {
        self.hooks = hooks;
        self
    }

    /// Adds one local hook bundle.
    #[must_use]
    pub fn with_hook(mut self, name: impl Into<String>, bundle: HookBundle) -> Self {
        self.hooks.insert(name, bundle);
        self
    }

    /// Sets the options forwarded through hooks to the engine.
    #[must_use]
    pub fn with_options(mut self, options: LifecycleOptions) -> Self {
        self.options = options;
        self
    }
}
