//! Lifecycle instrumentation and status tracking for process-engine instances.
//!

pub use conductor_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use conductor_internal::prelude::*;
}
