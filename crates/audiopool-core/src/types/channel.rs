//! Channel identity and per-channel playback state.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ChannelEvent;

/// Identifier of one host audio context owned by the pool.
///
/// Ids are handed out monotonically and never reused, so a replacement
/// channel created after a host error is distinguishable from the one it
/// replaced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(pub u64);

impl ChannelId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The id following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// Host-confirmed state of a pooled effect channel.
///
/// `Idle -> Playing -> (Ended | Stopped | Paused) -> Idle`, or
/// `Playing -> Error -> Destroyed`. `Destroyed` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelState {
    #[default]
    Idle,
    Playing,
    Destroyed,
}

impl ChannelState {
    /// State after a play request was issued to the host.
    pub const fn play(self) -> Self {
        match self {
            Self::Destroyed => Self::Destroyed,
            Self::Idle | Self::Playing => Self::Playing,
        }
    }

    /// State after the host reported `event`.
    pub const fn apply(self, event: &ChannelEvent) -> Self {
        match (self, event) {
            (Self::Destroyed, _) | (_, ChannelEvent::Error(_)) => Self::Destroyed,
            (_, ChannelEvent::Ended | ChannelEvent::Stopped | ChannelEvent::Paused) => Self::Idle,
        }
    }

    pub const fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_lifecycle() {
        let state = ChannelState::default();
        assert_eq!(state, ChannelState::Idle);

        let state = state.play();
        assert_eq!(state, ChannelState::Playing);

        for event in [ChannelEvent::Ended, ChannelEvent::Stopped, ChannelEvent::Paused] {
            assert_eq!(ChannelState::Playing.apply(&event), ChannelState::Idle);
        }
    }

    #[test]
    fn test_late_release_keeps_idle() {
        assert_eq!(
            ChannelState::Idle.apply(&ChannelEvent::Stopped),
            ChannelState::Idle
        );
    }

    #[test]
    fn test_destroyed_is_terminal() {
        let state = ChannelState::Playing.apply(&ChannelEvent::Error("decode".into()));
        assert!(state.is_destroyed());
        assert!(state.play().is_destroyed());
        assert!(state.apply(&ChannelEvent::Ended).is_destroyed());
    }

    #[test]
    fn test_channel_id_display() {
        assert_eq!(ChannelId::new(3).to_string(), "ch3");
        assert_eq!(ChannelId::new(3).next(), ChannelId::new(4));
    }
}
