//! The in-flight result of [`Conductor::resume`](crate::Conductor::resume).

use core::fmt;
use core::future::IntoFuture;

use futures::future::BoxFuture;

use crate::engine::Acknowledgement;
use crate::error::LifecycleError;
use crate::handle::EngineHandle;
use crate::hooks::{HookPoint, HookSet};
use crate::options::LifecycleOptions;

/// A resumed instance whose acknowledgement is still outstanding.
///
/// The handle is bound and tracked as soon as this value exists. Awaiting it
/// completes the resume: on acknowledgement the record moves to `running`,
/// `onResumeAfter` runs and the handle is returned.
///
/// # Example
///
/// ```
/// use conductor_engine::scripted::ScriptedEngineFactory;
/// use conductor_engine::{Conductor, CreateOptions, LifecycleOptions, ResumeOptions};
///
/// # futures::executor::block_on(async {
/// let conductor = Conductor::new(ScriptedEngineFactory);
/// let handle = conductor
///     .create(CreateOptions::new("start -> user:review -> end").with_instance_id("I7"))
///     .unwrap();
/// handle.execute(LifecycleOptions::new()).await.unwrap();
/// handle.stop(LifecycleOptions::new()).unwrap();
///
/// let snapshot = handle.snapshot().unwrap();
/// let pending = conductor
///     .resume(&snapshot, ResumeOptions::new().with_instance_id("I7"))
///     .unwrap();
/// assert_eq!(pending.handle().instance_id().as_str(), "I7");
///
/// let resumed = pending.await.unwrap();
/// assert!(!resumed.is_stopped());
/// # });
/// ```
#[must_use = "a resume completes only when awaited"]
pub struct PendingResume {
    handle: EngineHandle,
    hooks: HookSet,
    options: LifecycleOptions,
    acknowledged: Acknowledgement,
}

impl PendingResume {
    pub(crate) fn new(
        handle: EngineHandle,
        hooks: HookSet,
        options: LifecycleOptions,
        acknowledged: Acknowledgement,
    ) -> Self {
        Self {
            handle,
            hooks,
            options,
            acknowledged,
        }
    }

    /// The bound handle, before acknowledgement.
    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }
}

impl IntoFuture for PendingResume {
    type Output = Result<EngineHandle, LifecycleError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self {
            handle,
            hooks,
            mut options,
            acknowledged,
        } = self;

        Box::pin(async move {
            if let Err(error) = acknowledged.await {
                return Err(handle.fail(error));
            }
            handle.mark_running()?;

            hooks.run(
                HookPoint::RESUME_AFTER,
                handle.instance_id(),
                Some(&handle),
                &mut options,
            )?;
            Ok(handle)
        })
    }
}

impl fmt::Debug for PendingResume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingResume")
            .field("handle", &self.handle)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
