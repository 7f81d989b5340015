//! # audiopool-audio
//!
//! Arbitrates a host's limited audio channels between sound effects and
//! background music.
//!
//! Features:
//! - Fixed effect pool with oldest-first eviction when every channel is busy
//! - Self-healing pool: channels that fail on the host are replaced
//! - Host notifications delivered through a crossbeam queue
//! - In-memory simulated host for headless runs

pub mod bgm;
pub mod handle;
pub mod host;
pub mod manager;
pub mod pool;
pub mod sim;

pub use bgm::BackgroundMusic;
pub use handle::PlaybackHandle;
pub use host::{event_queue, AudioContext, AudioHost, EventSink};
pub use manager::AudioPoolManager;
pub use pool::EffectPool;
pub use sim::{ContextSnapshot, HostCall, SimContext, SimulatedHost};
