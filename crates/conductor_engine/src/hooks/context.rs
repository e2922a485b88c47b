//! What a hook sees when it runs.

use conductor_registry::InstanceId;

use crate::handle::EngineHandle;
use crate::hooks::HookPoint;

/// Context passed to every hook invocation.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    pub(crate) point: HookPoint,
    pub(crate) extension: &'a str,
    pub(crate) instance_id: &'a InstanceId,
    pub(crate) engine: Option<&'a EngineHandle>,
}

impl<'a> HookContext<'a> {
    /// The hook point being run.
    #[must_use]
    pub fn point(&self) -> HookPoint {
        self.point
    }

    /// Name of the bundle this hook belongs to.
    #[must_use]
    pub fn extension(&self) -> &'a str {
        self.extension
    }

    /// Identity of the instance the operation applies to.
    #[must_use]
    pub fn instance_id(&self) -> &'a InstanceId {
        self.instance_id
    }

    /// The engine handle.
    ///
    /// `None` only in `onResumeBefore`, which runs before the resumed engine
    /// exists.
    #[must_use]
    pub fn engine(&self) -> Option<&'a EngineHandle> {
        self.engine
    }
}
