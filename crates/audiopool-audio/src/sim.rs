//! In-memory audio host.
//!
//! Records every call made on its contexts and emits host notifications the
//! way a real host does: `stop` reports `Stopped`, pausing a running context
//! reports `Paused`, clips report `Ended` once [`SimulatedHost::tick`] has
//! advanced past their length. Used for headless runs and tests.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use audiopool_core::{ChannelEvent, ChannelId, Error, HostEvent, Platform, Result};
use parking_lot::Mutex;
use tracing::trace;

use crate::host::{AudioContext, AudioHost, EventSink};

const DEFAULT_CLIP_LENGTH: Duration = Duration::from_millis(800);

/// A call made on a simulated context.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Play,
    Pause,
    Stop,
    Seek(f64),
    Destroy,
    SetSrc(String),
    SetLoop(bool),
    SetAutoplay(bool),
}

/// Observable state of one simulated context.
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    pub channel: Option<ChannelId>,
    pub src: String,
    pub loop_playback: bool,
    pub autoplay: bool,
    pub paused: bool,
    pub position: Duration,
    pub destroyed: bool,
    pub calls: Vec<HostCall>,
}

impl ContextSnapshot {
    fn new() -> Self {
        Self {
            channel: None,
            src: String::new(),
            loop_playback: false,
            autoplay: false,
            paused: true,
            position: Duration::ZERO,
            destroyed: false,
            calls: Vec::new(),
        }
    }

    /// Number of times `call` was made.
    pub fn count(&self, call: &HostCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

#[derive(Debug)]
struct SimContextState {
    snapshot: ContextSnapshot,
    sink: Option<EventSink>,
}

impl SimContextState {
    fn notify(&self, event: ChannelEvent) {
        match (&self.sink, self.snapshot.channel) {
            (Some(sink), Some(channel)) => sink.channel(channel, event),
            _ => trace!("Unsubscribed context dropped {:?}", event),
        }
    }
}

#[derive(Debug)]
struct SimState {
    platform: Platform,
    contexts: Vec<SimContextState>,
    interruption_sinks: Vec<EventSink>,
    fail_creation: bool,
    clip_length: Duration,
    clip_lengths: HashMap<String, Duration>,
}

impl SimState {
    fn context_mut(&mut self, channel: ChannelId) -> Option<&mut SimContextState> {
        self.contexts
            .iter_mut()
            .find(|c| c.snapshot.channel == Some(channel))
    }

    fn length_of(&self, src: &str) -> Duration {
        self.clip_lengths
            .get(src)
            .copied()
            .unwrap_or(self.clip_length)
    }
}

/// In-memory [`AudioHost`].
///
/// Clones share state, so a test can keep one clone for inspection while the
/// manager owns another.
#[derive(Debug, Clone)]
pub struct SimulatedHost {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedHost {
    pub fn new(platform: Platform) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                platform,
                contexts: Vec::new(),
                interruption_sinks: Vec::new(),
                fail_creation: false,
                clip_length: DEFAULT_CLIP_LENGTH,
                clip_lengths: HashMap::new(),
            })),
        }
    }

    /// Length used for clips without an explicit length.
    #[must_use]
    pub fn with_clip_length(self, length: Duration) -> Self {
        self.state.lock().clip_length = length;
        self
    }

    pub fn set_clip_length(&self, src: impl Into<String>, length: Duration) {
        self.state.lock().clip_lengths.insert(src.into(), length);
    }

    /// Make subsequent `create_context` calls fail.
    pub fn set_fail_creation(&self, fail: bool) {
        self.state.lock().fail_creation = fail;
    }

    /// Number of contexts ever created, destroyed ones included.
    pub fn created(&self) -> usize {
        self.state.lock().contexts.len()
    }

    /// Number of contexts not yet destroyed.
    pub fn live(&self) -> usize {
        self.state
            .lock()
            .contexts
            .iter()
            .filter(|c| !c.snapshot.destroyed)
            .count()
    }

    pub fn snapshot(&self, channel: ChannelId) -> Option<ContextSnapshot> {
        self.state
            .lock()
            .contexts
            .iter()
            .find(|c| c.snapshot.channel == Some(channel))
            .map(|c| c.snapshot.clone())
    }

    /// Calls made on the context subscribed as `channel`.
    pub fn calls(&self, channel: ChannelId) -> Vec<HostCall> {
        self.snapshot(channel).map(|s| s.calls).unwrap_or_default()
    }

    /// Override the paused flag the host reports, as a host whose flag lags
    /// behind playback would.
    pub fn set_paused(&self, channel: ChannelId, paused: bool) {
        if let Some(context) = self.state.lock().context_mut(channel) {
            context.snapshot.paused = paused;
        }
    }

    /// Advance every running clip by `elapsed`, ending those that run out.
    pub fn tick(&self, elapsed: Duration) {
        let mut state = self.state.lock();
        let default_length = state.clip_length;
        let lengths = state.clip_lengths.clone();

        for context in &mut state.contexts {
            let snapshot = &mut context.snapshot;
            if snapshot.destroyed || snapshot.paused {
                continue;
            }

            let length = lengths
                .get(&snapshot.src)
                .copied()
                .unwrap_or(default_length);
            snapshot.position += elapsed;
            if snapshot.position < length {
                continue;
            }

            if snapshot.loop_playback && !length.is_zero() {
                let over = snapshot.position.as_nanos() % length.as_nanos();
                snapshot.position = Duration::from_nanos(over as u64);
            } else {
                snapshot.position = Duration::ZERO;
                snapshot.paused = true;
                context.notify(ChannelEvent::Ended);
            }
        }
    }

    /// Report a playback failure on `channel`.
    pub fn fail(&self, channel: ChannelId, message: impl Into<String>) {
        if let Some(context) = self.state.lock().context_mut(channel) {
            context.snapshot.paused = true;
            context.notify(ChannelEvent::Error(message.into()));
        }
    }

    /// Report that an external interruption has ended.
    pub fn interrupt_end(&self) {
        for sink in &self.state.lock().interruption_sinks {
            sink.emit(HostEvent::InterruptionEnded);
        }
    }
}

impl AudioHost for SimulatedHost {
    type Context = SimContext;

    fn platform(&self) -> Platform {
        self.state.lock().platform.clone()
    }

    fn create_context(&mut self) -> Result<SimContext> {
        let mut state = self.state.lock();
        if state.fail_creation {
            return Err(Error::ContextCreation(
                "simulated host refused a new context".to_string(),
            ));
        }

        let index = state.contexts.len();
        state.contexts.push(SimContextState {
            snapshot: ContextSnapshot::new(),
            sink: None,
        });

        Ok(SimContext {
            index,
            state: Arc::clone(&self.state),
        })
    }

    fn on_interruption_end(&mut self, sink: EventSink) {
        self.state.lock().interruption_sinks.push(sink);
    }
}

/// Context handed out by [`SimulatedHost`].
#[derive(Debug)]
pub struct SimContext {
    index: usize,
    state: Arc<Mutex<SimState>>,
}

impl SimContext {
    fn with<R>(&self, f: impl FnOnce(&mut SimContextState, Duration) -> R) -> R {
        let mut state = self.state.lock();
        let length = state.length_of(&state.contexts[self.index].snapshot.src);
        f(&mut state.contexts[self.index], length)
    }

    fn record(&self, call: HostCall) {
        self.with(|context, _| context.snapshot.calls.push(call));
    }
}

impl AudioContext for SimContext {
    fn play(&mut self) {
        self.record(HostCall::Play);
        self.with(|context, _| context.snapshot.paused = false);
    }

    fn pause(&mut self) {
        self.record(HostCall::Pause);
        self.with(|context, _| {
            if !context.snapshot.paused {
                context.snapshot.paused = true;
                context.notify(ChannelEvent::Paused);
            }
        });
    }

    fn stop(&mut self) {
        self.record(HostCall::Stop);
        self.with(|context, _| {
            context.snapshot.paused = true;
            context.snapshot.position = Duration::ZERO;
            context.notify(ChannelEvent::Stopped);
        });
    }

    fn seek(&mut self, position: f64) {
        self.record(HostCall::Seek(position));
        self.with(|context, length| {
            context.snapshot.position = Duration::from_secs_f64(position.max(0.0)).min(length);
        });
    }

    fn destroy(&mut self) {
        self.record(HostCall::Destroy);
        self.with(|context, _| {
            context.snapshot.destroyed = true;
            context.snapshot.paused = true;
            context.sink = None;
        });
    }

    fn src(&self) -> String {
        self.with(|context, _| context.snapshot.src.clone())
    }

    fn set_src(&mut self, src: &str) {
        self.record(HostCall::SetSrc(src.to_string()));
        self.with(|context, _| {
            src.clone_into(&mut context.snapshot.src);
            if context.snapshot.autoplay && !src.is_empty() {
                context.snapshot.position = Duration::ZERO;
                context.snapshot.paused = false;
            }
        });
    }

    fn set_loop(&mut self, loop_playback: bool) {
        self.record(HostCall::SetLoop(loop_playback));
        self.with(|context, _| context.snapshot.loop_playback = loop_playback);
    }

    fn set_autoplay(&mut self, autoplay: bool) {
        self.record(HostCall::SetAutoplay(autoplay));
        self.with(|context, _| context.snapshot.autoplay = autoplay);
    }

    fn paused(&self) -> bool {
        self.with(|context, _| context.snapshot.paused)
    }

    fn subscribe(&mut self, channel: ChannelId, sink: EventSink) {
        self.with(|context, _| {
            context.snapshot.channel = Some(channel);
            context.sink = Some(sink);
        });
    }
}
