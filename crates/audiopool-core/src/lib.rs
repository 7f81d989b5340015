//! # audiopool-core
//!
//! Core types, configuration, and error handling for the audiopool channel manager.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    BgmConfig, ConfigFile, PoolConfig, ANDROID_MAX_CONCURRENT, BGM_RESERVED_CHANNELS,
    DEFAULT_MAX_CONCURRENT,
};
pub use error::{Error, Result};
pub use types::*;
