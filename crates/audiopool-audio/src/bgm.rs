//! Background music on its own dedicated channel.

use audiopool_core::ChannelId;
use tracing::{debug, info, warn};

use crate::host::AudioContext;

/// Thin proxy over the host context reserved for background music.
#[derive(Debug)]
pub struct BackgroundMusic<C> {
    channel: ChannelId,
    context: C,
}

impl<C: AudioContext> BackgroundMusic<C> {
    pub(crate) const fn new(channel: ChannelId, context: C) -> Self {
        Self { channel, context }
    }

    pub const fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Point the music channel at `source`. With `autoplay` the host starts
    /// it as soon as the source is set.
    pub fn play(&mut self, source: &str, loop_playback: bool, autoplay: bool) {
        info!(
            "Background music: {} (loop: {}, autoplay: {})",
            source, loop_playback, autoplay
        );
        self.context.set_loop(loop_playback);
        self.context.set_autoplay(autoplay);
        self.context.set_src(source);
    }

    pub fn pause(&mut self) {
        if !self.context.paused() {
            self.context.pause();
        }
    }

    /// Resume paused music. Does nothing until a source has been set.
    pub fn resume(&mut self) {
        if self.context.src().is_empty() {
            warn!("Cannot resume background music: play_bgm has not been called");
            return;
        }
        if self.context.paused() {
            debug!("Resuming background music");
            self.context.play();
        }
    }

    pub fn stop(&mut self) {
        self.context.stop();
    }

    pub fn is_playing(&self) -> bool {
        !self.context.paused()
    }
}
