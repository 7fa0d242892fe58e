//! Realtime broadcast layer: per-sprint channels, the event wire format,
//! and the session subscriber that folds events into a document.

pub mod bus;
pub mod event;
pub mod subscriber;

pub use bus::{ChannelRegistry, DEFAULT_CHANNEL_CAPACITY};
pub use event::SprintEvent;
pub use subscriber::{SprintSubscriber, SubscriberPhase};
