//! Services for the audiopool application.
//!
//! This module contains:
//! - Playback service driving the channel pool on a tick loop

pub mod playback;
