//! Notifications delivered by the audio host.

use serde::{Deserialize, Serialize};

use super::ChannelId;

/// Something the host reported about a single audio context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum ChannelEvent {
    /// Playback reached the end of the clip.
    Ended,
    /// Playback was stopped, by us or by the host.
    Stopped,
    /// Playback was paused.
    Paused,
    /// The host failed to play the clip. The context is unusable afterwards.
    Error(String),
}

impl ChannelEvent {
    /// Returns true for end, stop and pause, which all hand the channel back.
    pub const fn is_release(&self) -> bool {
        !matches!(self, Self::Error(_))
    }
}

/// Events flowing from the host into the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A pooled or background-music context changed state.
    Channel {
        channel: ChannelId,
        event: ChannelEvent,
    },
    /// An external interruption (incoming call, focus loss) has ended.
    InterruptionEnded,
}

impl HostEvent {
    pub const fn channel(channel: ChannelId, event: ChannelEvent) -> Self {
        Self::Channel { channel, event }
    }
}
