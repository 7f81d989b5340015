//! A single pooled playback channel.

use audiopool_core::{ChannelEvent, ChannelId, ChannelState};

use crate::host::AudioContext;

/// Host context plus the manager's bookkeeping for it.
///
/// `is_playing` is the requested state, set as soon as `play` is issued.
/// `state` only moves when the host confirms a transition.
#[derive(Debug)]
pub struct PlaybackHandle<C> {
    id: ChannelId,
    context: C,
    source: String,
    is_playing: bool,
    state: ChannelState,
    /// Eviction stops whose `Stopped` notification has not arrived yet.
    pending_stops: u32,
}

impl<C: AudioContext> PlaybackHandle<C> {
    pub(crate) fn new(id: ChannelId, context: C) -> Self {
        Self {
            id,
            context,
            source: String::new(),
            is_playing: false,
            state: ChannelState::Idle,
            pending_stops: 0,
        }
    }

    pub const fn id(&self) -> ChannelId {
        self.id
    }

    /// Source of the clip last started on this channel.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub const fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub const fn state(&self) -> ChannelState {
        self.state
    }

    pub const fn pending_stops(&self) -> u32 {
        self.pending_stops
    }

    /// Point the context at `source` and start it.
    pub(crate) fn start(&mut self, source: &str) {
        self.context.set_src(source);
        // A context the host still reports as running would resume mid-clip.
        if !self.context.paused() {
            self.context.seek(0.0);
        }
        source.clone_into(&mut self.source);
        self.is_playing = true;
        self.state = self.state.play();
        self.context.play();
    }

    /// Cut the current clip short so the channel can be reused.
    pub(crate) fn evict(&mut self) {
        self.pending_stops += 1;
        self.context.stop();
    }

    pub(crate) fn stop(&mut self) {
        self.context.stop();
    }

    /// Apply an end, stop or pause notification.
    ///
    /// Returns false when the notification only acknowledges an eviction
    /// stop, in which case the clip started since then keeps playing.
    pub(crate) fn release(&mut self, event: &ChannelEvent) -> bool {
        if matches!(event, ChannelEvent::Stopped) && self.pending_stops > 0 {
            self.pending_stops -= 1;
            return false;
        }
        self.is_playing = false;
        self.state = self.state.apply(event);
        true
    }

    /// Tear down the host context after a playback error.
    pub(crate) fn destroy(&mut self, error: &ChannelEvent) {
        self.is_playing = false;
        self.state = self.state.apply(error);
        self.context.destroy();
    }
}
