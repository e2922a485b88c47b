//! Merging two listener sets into one.

use crate::error::ListenerError;
use crate::set::ListenerSet;

/// Copies every subscription of `source` onto `target` and returns `target`.
///
/// - If only one side is present it is returned unchanged.
/// - For each event name, subscriptions from `source` are appended after the
///   subscriptions `target` already holds, in their original order.
/// - One-shot subscriptions stay one-shot on `target`.
/// - `source` is never modified.
///
/// Merging a set into itself returns it unchanged.
///
/// # Errors
///
/// Returns [`ListenerError::NothingToMerge`] if both sides are absent.
///
/// # Example
///
/// ```
/// use conductor_listeners::{EngineEvent, ListenerSet, merge_listeners};
///
/// let source = ListenerSet::new();
/// source.on("event1", |_: &EngineEvent| {});
/// source.once("event2", |_: &EngineEvent| {});
///
/// let target = ListenerSet::new();
/// target.on("event2", |_: &EngineEvent| {});
///
/// let merged = merge_listeners(Some(&source), Some(target)).unwrap();
/// assert_eq!(merged.total_listener_count(), 3);
/// assert_eq!(source.total_listener_count(), 2);
/// ```
pub fn merge_listeners(
    source: Option<&ListenerSet>,
    target: Option<ListenerSet>,
) -> Result<ListenerSet, ListenerError> {
    match (source, target) {
        (None, None) => Err(ListenerError::NothingToMerge),
        (Some(source), None) => Ok(source.clone()),
        (None, Some(target)) => Ok(target),
        (Some(source), Some(target)) => {
            if source.ptr_eq(&target) {
                return Ok(target);
            }
            let copied = source.subscriptions();
            tracing::trace!(count = copied.len(), "merging listener subscriptions");
            for subscription in copied {
                target.subscribe(subscription);
            }
            Ok(target)
        }
    }
}
