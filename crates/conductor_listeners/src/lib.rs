//! Named-event listener sets for process engines.
//!
//! A process engine reports its progress by emitting named events (`start`,
//! `wait`, `end`, ...). Interested parties subscribe to those names on a
//! [`ListenerSet`]. This crate provides:
//!
//! - [`ListenerSet`] - A cloneable subscription surface supporting persistent
//!   ([`ListenerSet::on`]) and one-shot ([`ListenerSet::once`]) subscriptions
//! - [`merge_listeners`] - Copies every subscription of one set onto another
//!   without losing one-shot semantics or ordering
//! - [`create_listeners`] - Builds a set that forwards the standard engine
//!   events to a single callback
//!
//! # Example
//!
//! ```
//! use conductor_listeners::{EngineEvent, EventKind, ListenerSet, merge_listeners};
//!
//! let caller = ListenerSet::new();
//! caller.on(EventKind::Wait, |event: &EngineEvent| {
//!     assert_eq!(event.name(), "wait");
//! });
//!
//! let internal = ListenerSet::new();
//! internal.once(EventKind::Wait, |_: &EngineEvent| {});
//!
//! let merged = merge_listeners(Some(&internal), Some(caller)).unwrap();
//! assert_eq!(merged.listener_count("wait"), 2);
//! ```

mod create;
mod error;
mod event;
mod merge;
mod set;

pub use create::{EventCallback, ListenerOptions, create_listeners, create_listeners_for};
pub use error::ListenerError;
pub use event::{EngineEvent, EventKind, UnknownEventKind};
pub use merge::merge_listeners;
pub use set::{ListenerFn, ListenerSet, Subscription};
