//! Change notification primitives.
//!
//! - [`event_emitter`]: typed fan-out of change notifications
//!   ([`EventEmitter<T>`]) with per-listener panic isolation.
//! - [`subscription`]: [`Subscription`], the explicit unsubscribe handle
//!   returned by every subscribe/watch call in the crate.

pub mod event_emitter;
pub mod subscription;

pub use event_emitter::{EventEmitter, ListenerId};
pub use subscription::Subscription;
