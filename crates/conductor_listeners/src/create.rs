//! Building listener sets that forward engine events to one callback.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::ListenerError;
use crate::event::{EngineEvent, EventKind};
use crate::set::ListenerSet;

/// Callback receiving every forwarded event together with its kind.
pub type EventCallback = Arc<dyn Fn(&EngineEvent, EventKind) + Send + Sync>;

/// Options for [`create_listeners`].
///
/// Every standard event is enabled by default. Options can also be
/// deserialized from a map of event names to flags, e.g. `{"wait": false}`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(from = "HashMap<EventKind, bool>")]
pub struct ListenerOptions {
    disabled: Vec<EventKind>,
    // `Some(None)` records that a target was requested without a set.
    target: Option<Option<ListenerSet>>,
}

impl ListenerOptions {
    /// Creates options subscribing to every standard event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops forwarding `kind`.
    #[must_use]
    pub fn disable(self, kind: EventKind) -> Self {
        self.with_event(kind, false)
    }

    /// Sets whether `kind` is forwarded.
    #[must_use]
    pub fn with_event(mut self, kind: EventKind, enabled: bool) -> Self {
        self.disabled.retain(|disabled| *disabled != kind);
        if !enabled {
            self.disabled.push(kind);
        }
        self
    }

    /// Attaches the subscriptions to an existing set instead of a new one.
    ///
    /// Passing `None` records a target request without a set, which
    /// [`create_listeners`] rejects.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<Option<ListenerSet>>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Returns `true` if `kind` is forwarded.
    #[must_use]
    pub fn is_enabled(&self, kind: EventKind) -> bool {
        !self.disabled.contains(&kind)
    }

    /// Returns the enabled events, in subscription order.
    #[must_use]
    pub fn enabled_events(&self) -> Vec<EventKind> {
        EventKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }
}

impl From<HashMap<EventKind, bool>> for ListenerOptions {
    fn from(flags: HashMap<EventKind, bool>) -> Self {
        flags
            .into_iter()
            .fold(Self::default(), |options, (kind, enabled)| {
                options.with_event(kind, enabled)
            })
    }
}

/// Builds a listener set forwarding the standard engine events to `callback`.
///
/// Every event in [`EventKind::ALL`] is subscribed unless disabled in
/// `options`. With [`ListenerOptions::with_target`] the subscriptions are
/// added to the given set, which is returned.
///
/// # Errors
///
/// Returns [`ListenerError::MissingTarget`] if a target was requested but
/// none was supplied.
///
/// # Example
///
/// ```
/// use conductor_listeners::{EventKind, ListenerOptions, create_listeners};
///
/// let listeners = create_listeners(
///     |event, kind| tracing::info!(event = event.name(), %kind, "engine event"),
///     ListenerOptions::new().disable(EventKind::Wait),
/// )
/// .unwrap();
///
/// assert_eq!(listeners.event_names().len(), 8);
/// assert_eq!(listeners.listener_count("wait"), 0);
/// ```
pub fn create_listeners<F>(callback: F, options: ListenerOptions) -> Result<ListenerSet, ListenerError>
where
    F: Fn(&EngineEvent, EventKind) + Send + Sync + 'static,
{
    let target = match options.target.clone() {
        Some(None) => return Err(ListenerError::MissingTarget),
        Some(Some(target)) => Some(target),
        None => None,
    };
    Ok(create_listeners_for(
        callback,
        &options.enabled_events(),
        target,
    ))
}

/// Subscribes `callback` to exactly the given events.
///
/// Creates a new set unless `target` is supplied.
pub fn create_listeners_for<F>(
    callback: F,
    events: &[EventKind],
    target: Option<ListenerSet>,
) -> ListenerSet
where
    F: Fn(&EngineEvent, EventKind) + Send + Sync + 'static,
{
    let listeners = target.unwrap_or_default();
    let callback: EventCallback = Arc::new(callback);

    for kind in events.iter().copied() {
        let callback = Arc::clone(&callback);
        listeners.on(kind, move |event: &EngineEvent| callback(event, kind));
    }
    listeners
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn noop(_: &EngineEvent, _: EventKind) {}

    #[test]
    fn subscribes_every_event_by_default() {
        let listeners = create_listeners(noop, ListenerOptions::new()).unwrap();

        let names = listeners.event_names();
        assert_eq!(names.len(), EventKind::ALL.len());
        for kind in EventKind::ALL {
            assert_eq!(listeners.listener_count(kind.as_str()), 1);
        }
    }

    #[test]
    fn disabled_events_are_skipped() {
        let listeners =
            create_listeners(noop, ListenerOptions::new().disable(EventKind::Wait)).unwrap();

        assert_eq!(listeners.event_names().len(), 8);
        assert_eq!(listeners.listener_count("wait"), 0);
    }

    #[test]
    fn every_event_can_be_muted() {
        let muted = EventKind::ALL
            .into_iter()
            .fold(ListenerOptions::new(), ListenerOptions::disable);

        let listeners = create_listeners(noop, muted).unwrap();
        assert!(listeners.event_names().is_empty());
    }

    #[test]
    fn attaches_to_given_target() {
        let target = ListenerSet::new();
        target.on("custom", |_: &EngineEvent| {});

        let listeners =
            create_listeners(noop, ListenerOptions::new().with_target(target.clone())).unwrap();

        assert!(listeners.ptr_eq(&target));
        assert_eq!(target.total_listener_count(), 1 + EventKind::ALL.len());
    }

    #[test]
    fn requested_but_absent_target_is_an_error() {
        let result = create_listeners(noop, ListenerOptions::new().with_target(None));
        assert_eq!(result.unwrap_err(), ListenerError::MissingTarget);
    }

    #[test]
    fn callback_receives_event_kind() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let listeners = create_listeners(
            move |_: &EngineEvent, kind| seen_clone.lock().push(kind),
            ListenerOptions::new(),
        )
        .unwrap();

        listeners.emit(&EngineEvent::from(EventKind::Enter));
        listeners.emit(&EngineEvent::from(EventKind::Taken));

        assert_eq!(*seen.lock(), vec![EventKind::Enter, EventKind::Taken]);
    }

    #[test]
    fn options_deserialize_from_flags() {
        let options: ListenerOptions =
            serde_json::from_str(r#"{"wait": false, "end": true, "taken": false}"#).unwrap();

        assert!(!options.is_enabled(EventKind::Wait));
        assert!(!options.is_enabled(EventKind::Taken));
        assert!(options.is_enabled(EventKind::End));
        assert_eq!(options.enabled_events().len(), 7);
    }

    #[test]
    fn explicit_event_list() {
        let listeners = create_listeners_for(noop, &[EventKind::Wait], None);
        assert_eq!(listeners.event_names(), vec!["wait"]);
    }
}
