//! The [`ListenerSet`] subscription surface.

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::event::EngineEvent;

/// Type-erased listener callback.
pub type ListenerFn = Arc<dyn Fn(&EngineEvent) + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// Subscription
// ─────────────────────────────────────────────────────────────────────────────

/// A single registration on a [`ListenerSet`].
///
/// The one-shot flag travels with the subscription so that copying it onto
/// another set (see [`merge_listeners`](crate::merge_listeners)) keeps its
/// semantics.
#[derive(Clone)]
pub struct Subscription {
    event: String,
    callback: ListenerFn,
    once: bool,
}

impl Subscription {
    /// Creates a persistent subscription.
    #[must_use]
    pub fn persistent(event: impl Into<String>, callback: ListenerFn) -> Self {
        Self {
            event: event.into(),
            callback,
            once: false,
        }
    }

    /// Creates a subscription that fires at most once.
    #[must_use]
    pub fn one_shot(event: impl Into<String>, callback: ListenerFn) -> Self {
        Self {
            event: event.into(),
            callback,
            once: true,
        }
    }

    /// Returns the event name this subscription listens to.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Returns `true` if the subscription is removed after its first call.
    #[must_use]
    pub fn is_once(&self) -> bool {
        self.once
    }

    /// Returns the callback.
    #[must_use]
    pub fn callback(&self) -> &ListenerFn {
        &self.callback
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ListenerSet
// ─────────────────────────────────────────────────────────────────────────────

/// A named-event subscription surface.
///
/// Cloning a `ListenerSet` yields another handle to the same subscriptions,
/// so a set handed to an engine keeps observing registrations made later
/// through any clone.
///
/// # Ordering
///
/// Event names keep the order in which they were first subscribed, and the
/// subscriptions for one name fire in registration order. There is no upper
/// bound on subscriptions per name.
///
/// # Reentrancy
///
/// Callbacks run after the internal lock is released, so a listener may
/// subscribe, emit, or inspect the same set. Subscriptions added while an
/// event is being dispatched are not called for that event.
#[derive(Clone, Default)]
pub struct ListenerSet {
    events: Arc<Mutex<IndexMap<String, Vec<Subscription>>>>,
}

impl ListenerSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `listener` to every emission of `event`.
    pub fn on<F>(&self, event: impl Into<String>, listener: F) -> &Self
    where
        F: Fn(&EngineEvent) + Send + Sync + 'static,
    {
        self.subscribe(Subscription::persistent(event, Arc::new(listener)))
    }

    /// Subscribes `listener` to the next emission of `event` only.
    pub fn once<F>(&self, event: impl Into<String>, listener: F) -> &Self
    where
        F: Fn(&EngineEvent) + Send + Sync + 'static,
    {
        self.subscribe(Subscription::one_shot(event, Arc::new(listener)))
    }

    /// Appends an existing subscription, keeping its one-shot flag.
    pub fn subscribe(&self, subscription: Subscription) -> &Self {
        self.events
            .lock()
            .entry(subscription.event.clone())
            .or_default()
            .push(subscription);
        self
    }

    /// Dispatches `event` to every subscription for its name.
    ///
    /// One-shot subscriptions are removed before any callback runs.
    /// Returns the number of callbacks invoked.
    pub fn emit(&self, event: &EngineEvent) -> usize {
        let due = {
            let mut events = self.events.lock();
            let Some(subscriptions) = events.get_mut(event.name()) else {
                return 0;
            };
            let due = subscriptions.clone();
            subscriptions.retain(|subscription| !subscription.once);
            if subscriptions.is_empty() {
                events.shift_remove(event.name());
            }
            due
        };

        for subscription in &due {
            (subscription.callback)(event);
        }
        due.len()
    }

    /// Returns the number of subscriptions for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.events.lock().get(event).map_or(0, Vec::len)
    }

    /// Returns the number of subscriptions across all events.
    #[must_use]
    pub fn total_listener_count(&self) -> usize {
        self.events.lock().values().map(Vec::len).sum()
    }

    /// Returns the names that currently have at least one subscription.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.events.lock().keys().cloned().collect()
    }

    /// Returns a snapshot of every subscription, grouped by event name in
    /// first-subscription order.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.events.lock().values().flatten().cloned().collect()
    }

    /// Removes every subscription for `event`.
    pub fn remove_all(&self, event: &str) {
        self.events.lock().shift_remove(event);
    }

    /// Returns `true` if both handles refer to the same subscriptions.
    #[must_use]
    pub fn ptr_eq(&self, other: &ListenerSet) -> bool {
        Arc::ptr_eq(&self.events, &other.events)
    }
}

impl fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events = self.events.lock();
        f.debug_map()
            .entries(events.iter().map(|(name, subs)| (name, subs.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn emit_calls_listeners_in_registration_order() {
        let set = ListenerSet::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            set.on(EventKind::Wait, move |_: &EngineEvent| {
                order.lock().push(name);
            });
        }

        let invoked = set.emit(&EngineEvent::from(EventKind::Wait));

        assert_eq!(invoked, 3);
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn once_fires_at_most_once() {
        let set = ListenerSet::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        set.once("end", move |_: &EngineEvent| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(set.listener_count("end"), 1);
        set.emit(&EngineEvent::new("end"));
        set.emit(&EngineEvent::new("end"));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(set.listener_count("end"), 0);
        assert!(set.event_names().is_empty());
    }

    #[test]
    fn persistent_listener_survives_once_removal() {
        let set = ListenerSet::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let persistent = Arc::clone(&calls);
        set.on("wait", move |_: &EngineEvent| {
            persistent.fetch_add(1, Ordering::SeqCst);
        });
        let one_shot = Arc::clone(&calls);
        set.once("wait", move |_: &EngineEvent| {
            one_shot.fetch_add(10, Ordering::SeqCst);
        });

        set.emit(&EngineEvent::new("wait"));
        set.emit(&EngineEvent::new("wait"));

        assert_eq!(calls.load(Ordering::SeqCst), 12);
        assert_eq!(set.listener_count("wait"), 1);
    }

    #[test]
    fn emit_without_subscribers_is_noop() {
        let set = ListenerSet::new();
        assert_eq!(set.emit(&EngineEvent::new("start")), 0);
    }

    #[test]
    fn listener_may_subscribe_during_dispatch() {
        let set = ListenerSet::new();
        let inner = set.clone();

        set.once("start", move |_: &EngineEvent| {
            inner.on("end", |_: &EngineEvent| {});
        });

        set.emit(&EngineEvent::new("start"));
        assert_eq!(set.listener_count("end"), 1);
    }

    #[test]
    fn clones_share_subscriptions() {
        let set = ListenerSet::new();
        let clone = set.clone();
        clone.on("taken", |_: &EngineEvent| {});

        assert!(set.ptr_eq(&clone));
        assert_eq!(set.total_listener_count(), 1);
        assert!(!set.ptr_eq(&ListenerSet::new()));
    }

    #[test]
    fn remove_all_drops_event() {
        let set = ListenerSet::new();
        set.on("leave", |_: &EngineEvent| {});
        set.on("leave", |_: &EngineEvent| {});
        set.on("enter", |_: &EngineEvent| {});

        set.remove_all("leave");

        assert_eq!(set.event_names(), vec!["enter".to_string()]);
    }
}
