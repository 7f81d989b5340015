//! Core domain types for audiopool.

pub mod channel;
pub mod event;
pub mod platform;

pub use channel::{ChannelId, ChannelState};
pub use event::{ChannelEvent, HostEvent};
pub use platform::Platform;
