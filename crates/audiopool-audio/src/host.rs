//! Capabilities the embedding audio host provides.
//!
//! A host hands out fire-and-forget playback contexts and reports what
//! happened to them later through an [`EventSink`]. Implementations may call
//! the sink from any thread; the manager drains the queue on its own loop.

use audiopool_core::{ChannelEvent, ChannelId, HostEvent, Platform, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::trace;

/// One host playback instance.
///
/// Every call returns immediately. The host confirms state changes later
/// through the sink registered with [`AudioContext::subscribe`].
pub trait AudioContext {
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    /// Seek to a position in seconds.
    fn seek(&mut self, position: f64);
    /// Release host resources. The context must not be used afterwards.
    fn destroy(&mut self);

    fn src(&self) -> String;
    fn set_src(&mut self, src: &str);
    fn set_loop(&mut self, loop_playback: bool);
    fn set_autoplay(&mut self, autoplay: bool);
    /// Host-reported paused flag. May lag behind `play` and `stop` calls.
    fn paused(&self) -> bool;

    /// Forward this context's end, stop, pause and error notifications to
    /// `sink`, tagged with `channel`.
    fn subscribe(&mut self, channel: ChannelId, sink: EventSink);
}

/// Process-wide host services.
pub trait AudioHost {
    type Context: AudioContext;

    /// Platform name, queried once at startup.
    fn platform(&self) -> Platform;

    fn create_context(&mut self) -> Result<Self::Context>;

    /// Deliver [`HostEvent::InterruptionEnded`] to `sink` whenever an external
    /// interruption such as a phone call ends.
    fn on_interruption_end(&mut self, sink: EventSink);
}

/// Sending half of the host event queue.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<HostEvent>,
}

impl EventSink {
    /// Queue an event for the manager.
    ///
    /// Events sent after the manager is dropped are discarded.
    pub fn emit(&self, event: HostEvent) {
        if let Err(e) = self.tx.send(event) {
            trace!("Dropping host event, manager is gone: {:?}", e.into_inner());
        }
    }

    /// Queue an event about a single channel.
    pub fn channel(&self, channel: ChannelId, event: ChannelEvent) {
        self.emit(HostEvent::channel(channel, event));
    }
}

/// Create a connected sink and receiver.
pub fn event_queue() -> (EventSink, Receiver<HostEvent>) {
    let (tx, rx) = unbounded();
    (EventSink { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_delivers_in_order() {
        let (sink, rx) = event_queue();
        sink.channel(ChannelId::new(1), ChannelEvent::Ended);
        sink.emit(HostEvent::InterruptionEnded);

        assert_eq!(
            rx.try_recv().ok(),
            Some(HostEvent::channel(ChannelId::new(1), ChannelEvent::Ended))
        );
        assert_eq!(rx.try_recv().ok(), Some(HostEvent::InterruptionEnded));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_sink_outlives_receiver() {
        let (sink, rx) = event_queue();
        drop(rx);
        sink.emit(HostEvent::InterruptionEnded);
    }
}
