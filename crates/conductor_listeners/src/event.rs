//! Engine event names and payloads.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The standard events a process engine emits.
///
/// The string form of each variant is the event name used on a
/// [`ListenerSet`](crate::ListenerSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The process or an activity started.
    Start,
    /// An activity was entered.
    Enter,
    /// The process or an activity ended.
    End,
    /// An activity is waiting for an external signal.
    Wait,
    /// An activity was left.
    Leave,
    /// A sequence flow was taken.
    Taken,
    /// An activity was cancelled.
    Cancel,
    /// The engine reported a failure.
    Error,
    /// A flow or activity was discarded.
    Discarded,
}

impl EventKind {
    /// Every standard event, in the order [`create_listeners`](crate::create_listeners)
    /// subscribes to them.
    pub const ALL: [EventKind; 9] = [
        EventKind::Wait,
        EventKind::Error,
        EventKind::Start,
        EventKind::End,
        EventKind::Enter,
        EventKind::Cancel,
        EventKind::Taken,
        EventKind::Leave,
        EventKind::Discarded,
    ];

    /// Returns the event name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Enter => "enter",
            EventKind::End => "end",
            EventKind::Wait => "wait",
            EventKind::Leave => "leave",
            EventKind::Taken => "taken",
            EventKind::Cancel => "cancel",
            EventKind::Error => "error",
            EventKind::Discarded => "discarded",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a name that is not a standard event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown engine event '{0}'")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A single event emitted by a process engine.
///
/// `name` is free-form so that engines can emit events outside the standard
/// set; [`EngineEvent::kind`] recovers the standard variant when there is one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineEvent {
    name: String,
    activity_id: Option<String>,
    #[serde(default)]
    data: Value,
}

impl EngineEvent {
    /// Creates an event with the given name and no payload.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            activity_id: None,
            data: Value::Null,
        }
    }

    /// Sets the id of the activity (element) the event concerns.
    #[must_use]
    pub fn with_activity(mut self, activity_id: impl Into<String>) -> Self {
        self.activity_id = Some(activity_id.into());
        self
    }

    /// Attaches an arbitrary JSON payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Returns the event name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the standard event kind, if the name is one.
    #[must_use]
    pub fn kind(&self) -> Option<EventKind> {
        self.name.parse().ok()
    }

    /// Returns the activity id, if the event concerns a single activity.
    #[must_use]
    pub fn activity_id(&self) -> Option<&str> {
        self.activity_id.as_deref()
    }

    /// Returns the event payload (`Null` when none was attached).
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }
}

impl From<EventKind> for EngineEvent {
    fn from(kind: EventKind) -> Self {
        Self::new(kind.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_match_engine_vocabulary() {
        assert_eq!(EventKind::Start.as_str(), "start");
        assert_eq!(EventKind::Enter.as_str(), "enter");
        assert_eq!(EventKind::End.as_str(), "end");
        assert_eq!(EventKind::Taken.as_str(), "taken");
        assert_eq!(EventKind::Discarded.as_str(), "discarded");
        assert_eq!(EventKind::Leave.as_str(), "leave");
        assert_eq!(EventKind::Wait.as_str(), "wait");
        assert_eq!(EventKind::Error.as_str(), "error");
        assert_eq!(EventKind::Cancel.as_str(), "cancel");
    }

    #[test]
    fn parse_round_trips_every_kind() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>(), Ok(kind));
        }
        assert!("signal".parse::<EventKind>().is_err());
    }

    #[test]
    fn event_kind_recovered_from_name() {
        let event = EngineEvent::from(EventKind::Wait).with_activity("userTask");
        assert_eq!(event.kind(), Some(EventKind::Wait));
        assert_eq!(event.activity_id(), Some("userTask"));
        assert!(event.data().is_null());

        assert_eq!(EngineEvent::new("custom").kind(), None);
    }

    #[test]
    fn kinds_serialize_lowercase() {
        let json = serde_json::to_string(&EventKind::Discarded).unwrap();
        assert_eq!(json, "\"discarded\"");
    }
}
