//! Channel arbitration between sound effects and background music.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use audiopool_core::{ChannelEvent, ChannelId, HostEvent, PoolConfig, Result};
use crossbeam_channel::Receiver;
use tracing::{debug, error, info};

use crate::bgm::BackgroundMusic;
use crate::handle::PlaybackHandle;
use crate::host::{event_queue, AudioContext, AudioHost, EventSink};
use crate::pool::EffectPool;

/// Owns every audio channel the application uses.
///
/// One channel is reserved for background music, the rest form the effect
/// pool. The manager takes ownership of the host, so an application holds
/// exactly one and passes it down by reference.
pub struct AudioPoolManager<H: AudioHost> {
    host: H,
    config: PoolConfig,
    pool: EffectPool<H::Context>,
    bgm: BackgroundMusic<H::Context>,
    sink: EventSink,
    events: Receiver<HostEvent>,
    next_channel: ChannelId,
}

impl<H: AudioHost> AudioPoolManager<H> {
    /// Create the manager and pre-warm the effect pool.
    pub fn new(mut host: H, config: PoolConfig) -> Result<Self> {
        config.validate()?;

        let (sink, events) = event_queue();
        let capacity = config.effect_capacity();

        let bgm_channel = ChannelId::new(0);
        let mut bgm_context = host.create_context()?;
        bgm_context.subscribe(bgm_channel, sink.clone());
        host.on_interruption_end(sink.clone());

        let mut manager = Self {
            host,
            config,
            pool: EffectPool::with_capacity(capacity),
            bgm: BackgroundMusic::new(bgm_channel, bgm_context),
            sink,
            events,
            next_channel: bgm_channel.next(),
        };

        for _ in 0..capacity {
            manager.create_channel()?;
        }

        info!(
            "Audio pool ready on {}: {} effect channels + 1 music channel",
            manager.host.platform(),
            capacity
        );
        Ok(manager)
    }

    /// Create one effect channel and add it to the pool.
    fn create_channel(&mut self) -> Result<ChannelId> {
        let mut context = self.host.create_context()?;
        let id = self.next_channel;
        self.next_channel = id.next();

        context.subscribe(id, self.sink.clone());
        self.pool.insert(PlaybackHandle::new(id, context));
        debug!("Created effect channel {id}");
        Ok(id)
    }

    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Channels the effect pool holds when healthy.
    pub const fn capacity(&self) -> usize {
        self.config.effect_capacity()
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn idle_count(&self) -> usize {
        self.pool.idle_count()
    }

    /// Channels playing an effect, oldest first.
    pub fn in_flight(&self) -> Vec<ChannelId> {
        self.pool.in_flight().collect()
    }

    /// Pooled effect channels in creation order.
    pub fn channels(&self) -> Vec<ChannelId> {
        self.pool.channels().collect()
    }

    pub fn handle(&self, id: ChannelId) -> Option<&PlaybackHandle<H::Context>> {
        self.pool.get(id)
    }

    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        self.pool.check_invariants()
    }

    // Effects

    /// Play a sound effect on the next available channel.
    ///
    /// When every channel is busy the oldest effect is cut off. Playback
    /// failures are reported later through host events, not here.
    pub fn play_effect(&mut self, source: &str) -> Result<ChannelId> {
        let id = self.pool.play(source)?;
        debug!("Playing {source} on {id}");
        Ok(id)
    }

    /// Stop every effect channel. Channels return to idle as the host
    /// confirms each stop.
    pub fn stop_all_effects(&mut self) {
        debug!("Stopping all {} effect channels", self.pool.len());
        self.pool.stop_all();
    }

    // Background music

    pub fn play_bgm(&mut self, source: &str, loop_playback: bool, autoplay: bool) {
        self.bgm.play(source, loop_playback, autoplay);
    }

    /// Play looping, autoplaying background music.
    pub fn play_bgm_default(&mut self, source: &str) {
        self.play_bgm(source, true, true);
    }

    pub fn pause_bgm(&mut self) {
        self.bgm.pause();
    }

    pub fn resume_bgm(&mut self) {
        self.bgm.resume();
    }

    pub fn stop_bgm(&mut self) {
        self.bgm.stop();
    }

    pub fn bgm_is_playing(&self) -> bool {
        self.bgm.is_playing()
    }

    pub const fn bgm_channel(&self) -> ChannelId {
        self.bgm.channel()
    }

    // Host events

    /// Handle every host event queued so far. Returns how many were handled.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::InterruptionEnded => {
                info!("Audio interruption ended, resuming background music");
                self.resume_bgm();
            }
            HostEvent::Channel { channel, event } if channel == self.bgm.channel() => {
                match event {
                    ChannelEvent::Error(message) => {
                        error!("Background music error: {message}");
                    }
                    other => debug!("Background music {:?}", other),
                }
            }
            HostEvent::Channel {
                channel,
                event: ChannelEvent::Error(message),
            } => self.on_effect_error(channel, &message),
            HostEvent::Channel { channel, event } => self.on_effect_end(channel, &event),
        }
    }

    fn on_effect_end(&mut self, id: ChannelId, event: &ChannelEvent) {
        match self.pool.release(id, event) {
            Some(true) => debug!("Channel {id} released ({:?})", event),
            Some(false) => debug!("Channel {id} confirmed eviction stop"),
            None => debug!("Ignoring {:?} for retired channel {id}", event),
        }
    }

    /// Destroy a failed channel and replace it to keep the pool full.
    fn on_effect_error(&mut self, id: ChannelId, message: &str) {
        error!("Effect playback failed on {id}: {message}");

        let Some(mut handle) = self.pool.remove(id) else {
            debug!("Ignoring error for retired channel {id}");
            return;
        };
        handle.destroy(&ChannelEvent::Error(message.to_string()));

        if self.pool.len() < self.capacity() {
            match self.create_channel() {
                Ok(replacement) => info!("Replaced failed channel {id} with {replacement}"),
                Err(e) => error!("Failed to replace channel {id}: {e}"),
            }
        }
    }
}
