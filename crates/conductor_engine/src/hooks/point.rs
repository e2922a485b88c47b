//! Hook points: which operation, and when.

use core::fmt;
use core::str::FromStr;

/// An intercepted lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleOp {
    /// Starting execution.
    Execute,
    /// Stopping execution.
    Stop,
    /// Resuming from a snapshot.
    Resume,
}

impl LifecycleOp {
    /// Every operation.
    pub const ALL: [LifecycleOp; 3] = [LifecycleOp::Execute, LifecycleOp::Stop, LifecycleOp::Resume];

    fn as_str(self) -> &'static str {
        match self {
            LifecycleOp::Execute => "Execute",
            LifecycleOp::Stop => "Stop",
            LifecycleOp::Resume => "Resume",
        }
    }
}

/// When a hook runs relative to the engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the engine is called.
    Before,
    /// After the engine call is issued, before it is acknowledged.
    During,
    /// After the engine acknowledged the call.
    After,
}

impl Phase {
    /// Every phase, in execution order.
    pub const ALL: [Phase; 3] = [Phase::Before, Phase::During, Phase::After];

    fn suffix(self) -> &'static str {
        match self {
            Phase::Before => "Before",
            Phase::During => "",
            Phase::After => "After",
        }
    }
}

/// A place in a lifecycle operation where hooks run.
///
/// Named `on<Op><Phase>`, e.g. `onExecuteBefore`, `onStop` or
/// `onResumeAfter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookPoint {
    /// The operation.
    pub op: LifecycleOp,
    /// The phase within the operation.
    pub phase: Phase,
}

impl HookPoint {
    /// `onExecuteBefore`
    pub const EXECUTE_BEFORE: HookPoint = HookPoint::new(LifecycleOp::Execute, Phase::Before);
    /// `onExecute`
    pub const EXECUTE: HookPoint = HookPoint::new(LifecycleOp::Execute, Phase::During);
    /// `onExecuteAfter`
    pub const EXECUTE_AFTER: HookPoint = HookPoint::new(LifecycleOp::Execute, Phase::After);
    /// `onStopBefore`
    pub const STOP_BEFORE: HookPoint = HookPoint::new(LifecycleOp::Stop, Phase::Before);
    /// `onStop`
    pub const STOP: HookPoint = HookPoint::new(LifecycleOp::Stop, Phase::During);
    /// `onStopAfter`
    pub const STOP_AFTER: HookPoint = HookPoint::new(LifecycleOp::Stop, Phase::After);
    /// `onResumeBefore`
    pub const RESUME_BEFORE: HookPoint = HookPoint::new(LifecycleOp::Resume, Phase::Before);
    /// `onResume`
    pub const RESUME: HookPoint = HookPoint::new(LifecycleOp::Resume, Phase::During);
    /// `onResumeAfter`
    pub const RESUME_AFTER: HookPoint = HookPoint::new(LifecycleOp::Resume, Phase::After);

    /// Every hook point, grouped by operation.
    pub const ALL: [HookPoint; 9] = [
        HookPoint::EXECUTE_BEFORE,
        HookPoint::EXECUTE,
        HookPoint::EXECUTE_AFTER,
        HookPoint::STOP_BEFORE,
        HookPoint::STOP,
        HookPoint::STOP_AFTER,
        HookPoint::RESUME_BEFORE,
        HookPoint::RESUME,
        HookPoint::RESUME_AFTER,
    ];

    /// Creates a hook point.
    #[must_use]
    pub const fn new(op: LifecycleOp, phase: Phase) -> Self {
        Self { op, phase }
    }

    /// Returns the conventional name, e.g. `onExecuteBefore`.
    #[must_use]
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "on{}{}", self.op.as_str(), self.phase.suffix())
    }
}

/// Error returned when parsing an unknown hook point name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hook point '{0}'")]
pub struct UnknownHookPoint(pub String);

impl FromStr for HookPoint {
    type Err = UnknownHookPoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookPoint::ALL
            .into_iter()
            .find(|point| point.name() == s)
            .ok_or_else(|| UnknownHookPoint(s.to_string()))
    }
}
