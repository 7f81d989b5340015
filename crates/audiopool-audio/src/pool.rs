//! Effect channel pool with oldest-first eviction.
//!
//! Every pooled channel is either idle or listed exactly once in the
//! in-flight queue, ordered by when its current clip started.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use std::collections::VecDeque;

use audiopool_core::{ChannelEvent, ChannelId, Error, Result};
use tracing::debug;

use crate::handle::PlaybackHandle;
use crate::host::AudioContext;

/// Reusable sound-effect channels.
#[derive(Debug)]
pub struct EffectPool<C> {
    /// All live channels, in creation order.
    handles: Vec<PlaybackHandle<C>>,
    /// Channels playing an effect, oldest first.
    in_flight: VecDeque<ChannelId>,
}

impl<C: AudioContext> EffectPool<C> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity),
            in_flight: VecDeque::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, handle: PlaybackHandle<C>) {
        self.handles.push(handle);
    }

    /// Number of live channels.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Channels not currently asked to play anything.
    pub fn idle_count(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_playing()).count()
    }

    /// Channels playing an effect, oldest first.
    pub fn in_flight(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.in_flight.iter().copied()
    }

    /// All live channels in creation order.
    pub fn channels(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.handles.iter().map(PlaybackHandle::id)
    }

    pub fn get(&self, id: ChannelId) -> Option<&PlaybackHandle<C>> {
        self.handles.iter().find(|h| h.id() == id)
    }

    fn get_mut(&mut self, id: ChannelId) -> Option<&mut PlaybackHandle<C>> {
        self.handles.iter_mut().find(|h| h.id() == id)
    }

    /// Pick the channel for the next effect.
    ///
    /// Prefers the first idle channel in creation order. When every channel
    /// is busy, the one that started playing first is stopped and reused.
    pub fn acquire(&mut self) -> Result<ChannelId> {
        if let Some(handle) = self.handles.iter().find(|h| !h.is_playing()) {
            debug!("Reusing idle channel {}", handle.id());
            return Ok(handle.id());
        }

        let pool_len = self.handles.len();
        let oldest = self.in_flight.pop_front().ok_or(Error::PoolExhausted {
            pool_len,
            in_flight: 0,
        })?;
        let handle = self
            .get_mut(oldest)
            .ok_or_else(|| Error::Internal(format!("In-flight channel {oldest} is not pooled")))?;

        debug!(
            "All {} channels busy, evicting {} ({})",
            pool_len,
            oldest,
            handle.source()
        );
        handle.evict();
        Ok(oldest)
    }

    /// Start `source` on an acquired channel and queue it as newest.
    pub fn play(&mut self, source: &str) -> Result<ChannelId> {
        let id = self.acquire()?;
        self.get_mut(id)
            .ok_or_else(|| Error::Internal(format!("Acquired channel {id} is not pooled")))?
            .start(source);

        self.dequeue(id);
        self.in_flight.push_back(id);
        Ok(id)
    }

    /// Hand a channel back after an end, stop or pause notification.
    ///
    /// Returns `None` for channels no longer in the pool.
    pub fn release(&mut self, id: ChannelId, event: &ChannelEvent) -> Option<bool> {
        let released = self.get_mut(id)?.release(event);
        if released {
            self.dequeue(id);
        }
        Some(released)
    }

    /// Take a channel out of the pool entirely.
    pub(crate) fn remove(&mut self, id: ChannelId) -> Option<PlaybackHandle<C>> {
        self.dequeue(id);
        let index = self.handles.iter().position(|h| h.id() == id)?;
        Some(self.handles.remove(index))
    }

    /// Issue a stop to every channel, playing or not.
    ///
    /// Bookkeeping happens when the host confirms the stops.
    pub fn stop_all(&mut self) {
        for handle in &mut self.handles {
            handle.stop();
        }
    }

    fn dequeue(&mut self, id: ChannelId) {
        self.in_flight.retain(|&queued| queued != id);
    }

    /// Verify that idle and in-flight channels partition the pool.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        for (i, id) in self.in_flight.iter().enumerate() {
            if self.in_flight.iter().skip(i + 1).any(|other| other == id) {
                return Err(format!("{id} queued twice"));
            }
            match self.get(*id) {
                None => return Err(format!("{id} in flight but not pooled")),
                Some(handle) if !handle.is_playing() => {
                    return Err(format!("{id} in flight but idle"));
                }
                Some(_) => {}
            }
        }

        let playing = self.handles.len() - self.idle_count();
        if playing != self.in_flight.len() {
            return Err(format!(
                "{playing} channels playing but {} in flight",
                self.in_flight.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{event_queue, AudioHost};
    use crate::sim::{HostCall, SimulatedHost};
    use audiopool_core::{ChannelState, Platform};

    fn pool_of(size: u64) -> (EffectPool<crate::sim::SimContext>, SimulatedHost) {
        let mut host = SimulatedHost::new(Platform::Unknown);
        let (sink, _rx) = event_queue();
        let mut pool = EffectPool::with_capacity(size as usize);
        for raw in 0..size {
            let mut context = host.create_context().unwrap();
            let id = ChannelId::new(raw);
            context.subscribe(id, sink.clone());
            pool.insert(PlaybackHandle::new(id, context));
        }
        (pool, host)
    }

    #[test]
    fn test_acquire_prefers_first_idle() {
        let (mut pool, _host) = pool_of(3);
        assert_eq!(pool.acquire().unwrap(), ChannelId::new(0));

        pool.play("a.mp3").unwrap();
        assert_eq!(pool.acquire().unwrap(), ChannelId::new(1));
        assert_eq!(pool.idle_count(), 2);
    }

    #[test]
    fn test_play_queues_newest_last() {
        let (mut pool, _host) = pool_of(3);
        let a = pool.play("a.mp3").unwrap();
        let b = pool.play("b.mp3").unwrap();

        assert_eq!(pool.in_flight().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(pool.get(a).unwrap().state(), ChannelState::Playing);
        assert!(pool.check_invariants().is_ok());
    }

    #[test]
    fn test_evicts_oldest_when_full() {
        let (mut pool, host) = pool_of(2);
        let a = pool.play("a.mp3").unwrap();
        let b = pool.play("b.mp3").unwrap();
        let c = pool.play("c.mp3").unwrap();

        assert_eq!(c, a);
        assert_eq!(pool.in_flight().collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(pool.get(a).unwrap().source(), "c.mp3");
        assert_eq!(pool.get(a).unwrap().pending_stops(), 1);
        assert!(host.calls(a).contains(&HostCall::Stop));
        assert!(pool.check_invariants().is_ok());
    }

    #[test]
    fn test_eviction_stop_is_absorbed() {
        let (mut pool, _host) = pool_of(1);
        let a = pool.play("a.mp3").unwrap();
        pool.play("b.mp3").unwrap();

        assert_eq!(pool.release(a, &ChannelEvent::Stopped), Some(false));
        assert!(pool.get(a).unwrap().is_playing());
        assert_eq!(pool.in_flight().count(), 1);

        assert_eq!(pool.release(a, &ChannelEvent::Ended), Some(true));
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.in_flight().count(), 0);
    }

    #[test]
    fn test_release_unknown_channel() {
        let (mut pool, _host) = pool_of(1);
        assert_eq!(pool.release(ChannelId::new(42), &ChannelEvent::Ended), None);
    }

    #[test]
    fn test_remove_clears_queue() {
        let (mut pool, _host) = pool_of(2);
        let a = pool.play("a.mp3").unwrap();
        assert!(pool.remove(a).is_some());
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.in_flight().count(), 0);
        assert!(pool.check_invariants().is_ok());
    }

    #[test]
    fn test_empty_pool_is_exhausted() {
        let (mut pool, _host) = pool_of(0);
        assert!(matches!(
            pool.acquire(),
            Err(Error::PoolExhausted { pool_len: 0, .. })
        ));
    }

    #[test]
    fn test_stop_all_leaves_bookkeeping() {
        let (mut pool, host) = pool_of(2);
        let a = pool.play("a.mp3").unwrap();
        pool.stop_all();

        assert!(pool.get(a).unwrap().is_playing());
        for id in pool.channels().collect::<Vec<_>>() {
            assert!(host.calls(id).contains(&HostCall::Stop));
        }
    }
}
