//! Playback service driving the channel pool on the simulated host.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use std::time::Duration;

use audiopool_audio::{AudioPoolManager, SimulatedHost};
use audiopool_core::{BgmConfig, ConfigFile, Platform, Result};
use tracing::{debug, info};

/// How often the host clock advances and host events are handled.
const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Ticks between two effects.
const TICKS_PER_EFFECT: u32 = 4;

/// Upper bound on ticks spent waiting for effects to finish.
const MAX_DRAIN_TICKS: u32 = 400;

/// Totals reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub played: usize,
    pub evicted: usize,
    pub events: usize,
}

/// Owns the manager and the host it runs on.
pub struct PlaybackService {
    manager: AudioPoolManager<SimulatedHost>,
    host: SimulatedHost,
    stats: SessionStats,
}

impl PlaybackService {
    /// Build the host for the configured platform and size the pool for it.
    pub fn new(config: &ConfigFile) -> Result<Self> {
        let platform = config.platform.clone().unwrap_or(Platform::Unknown);
        let host = SimulatedHost::new(platform.clone())
            .with_clip_length(Duration::from_millis(config.clip_millis));

        let pool_config = config.resolve(&platform);
        info!(
            "Platform {} allows {} concurrent channels",
            platform, pool_config.max_concurrent_channels
        );

        let manager = AudioPoolManager::new(host.clone(), pool_config)?;
        Ok(Self {
            manager,
            host,
            stats: SessionStats::default(),
        })
    }

    pub const fn manager(&self) -> &AudioPoolManager<SimulatedHost> {
        &self.manager
    }

    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn start_bgm(&mut self, bgm: &BgmConfig) {
        self.manager
            .play_bgm(&bgm.source, bgm.loop_playback, bgm.autoplay);
        if !bgm.autoplay {
            self.manager.resume_bgm();
        }
    }

    /// Play `effects` one after another, then wait for the pool to drain.
    ///
    /// Halfway through, an interruption is simulated to exercise the
    /// background music resume path.
    pub async fn run(&mut self, effects: &[String]) -> Result<SessionStats> {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        let halfway = effects.len() / 2;

        for (i, source) in effects.iter().enumerate() {
            if i == halfway && self.manager.bgm_is_playing() {
                info!("Simulating an audio interruption");
                self.manager.pause_bgm();
                self.host.interrupt_end();
            }

            self.play(source)?;
            for _ in 0..TICKS_PER_EFFECT {
                interval.tick().await;
                self.tick();
            }
        }

        let mut waited = 0;
        while !self.manager.in_flight().is_empty() && waited < MAX_DRAIN_TICKS {
            interval.tick().await;
            self.tick();
            waited += 1;
        }

        Ok(self.stats)
    }

    fn play(&mut self, source: &str) -> Result<()> {
        let busy = self.manager.idle_count() == 0;
        let channel = self.manager.play_effect(source)?;

        self.stats.played += 1;
        if busy {
            self.stats.evicted += 1;
        }
        info!(
            "{} -> {} ({} idle, {} in flight)",
            source,
            channel,
            self.manager.idle_count(),
            self.manager.in_flight().len()
        );
        Ok(())
    }

    fn tick(&mut self) {
        self.host.tick(TICK_INTERVAL);
        let handled = self.manager.pump_events();
        if handled > 0 {
            debug!("Handled {} host events", handled);
        }
        self.stats.events += handled;
    }

    /// Stop everything and handle the resulting notifications.
    pub fn shutdown(&mut self) {
        self.manager.stop_all_effects();
        self.manager.stop_bgm();
        self.stats.events += self.manager.pump_events();
        info!(
            "Session finished: {} played, {} evicted, {} host events",
            self.stats.played, self.stats.evicted, self.stats.events
        );
    }
}
