//! Error types for listener construction and merging.

/// Contract violations when building or merging listener sets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListenerError {
    /// Neither a source nor a target was supplied to a merge.
    #[error("expected at least one of target or source")]
    NothingToMerge,

    /// A target set was requested but none was supplied.
    #[error("expected target but got none")]
    MissingTarget,
}
