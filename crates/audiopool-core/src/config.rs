//! Pool sizing and on-disk configuration.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::{Error, Platform, Result};

/// Concurrent audio channels most hosts allow.
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Android hosts document ten channels but only deliver five.
pub const ANDROID_MAX_CONCURRENT: usize = 5;

/// Channels kept out of the effect pool for background music.
pub const BGM_RESERVED_CHANNELS: usize = 1;

/// Default clip length used by the simulated host, in milliseconds.
const DEFAULT_CLIP_MILLIS: u64 = 800;

/// Sizing of the channel pool, resolved once at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolConfig {
    /// Total channels the host allows, background music included.
    pub max_concurrent_channels: usize,
}

impl PoolConfig {
    pub const fn new(max_concurrent_channels: usize) -> Self {
        Self {
            max_concurrent_channels,
        }
    }

    /// Channel cap for a host platform.
    pub fn for_platform(platform: &Platform) -> Self {
        match platform {
            Platform::Android => Self::new(ANDROID_MAX_CONCURRENT),
            _ => Self::new(DEFAULT_MAX_CONCURRENT),
        }
    }

    /// Number of channels available to sound effects.
    pub const fn effect_capacity(&self) -> usize {
        self.max_concurrent_channels
            .saturating_sub(BGM_RESERVED_CHANNELS)
    }

    /// Reject configurations that would leave the effect pool empty.
    pub fn validate(&self) -> Result<()> {
        if self.effect_capacity() == 0 {
            return Err(Error::InvalidConfig(format!(
                "max_concurrent_channels must be at least {}, got {}",
                BGM_RESERVED_CHANNELS + 1,
                self.max_concurrent_channels
            )));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT)
    }
}

/// Background music started by the application on launch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BgmConfig {
    pub source: String,
    #[serde(default = "default_true", rename = "loop")]
    pub loop_playback: bool,
    #[serde(default = "default_true")]
    pub autoplay: bool,
}

const fn default_true() -> bool {
    true
}

/// Settings file, stored as JSON. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigFile {
    /// Overrides the platform default channel cap.
    pub max_concurrent_channels: Option<usize>,
    /// Platform to report when running on the simulated host.
    pub platform: Option<Platform>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
    /// Effect sources the application plays in order.
    pub effects: Vec<String>,
    pub bgm: Option<BgmConfig>,
    /// Length of every clip on the simulated host.
    pub clip_millis: u64,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            max_concurrent_channels: None,
            platform: None,
            log_filter: None,
            effects: Vec::new(),
            bgm: None,
            clip_millis: DEFAULT_CLIP_MILLIS,
        }
    }
}

impl ConfigFile {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Load from `path` when given, else from [`ConfigFile::default_path`]
    /// if that file exists, else fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Ok(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Location of the per-user settings file.
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "audiopool", "audiopool")
            .ok_or_else(|| Error::Config("Failed to determine config directory".to_string()))?;

        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Resolve the pool sizing for `platform`, honouring the override.
    pub fn resolve(&self, platform: &Platform) -> PoolConfig {
        self.max_concurrent_channels
            .map_or_else(|| PoolConfig::for_platform(platform), PoolConfig::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_platform_caps() {
        assert_eq!(
            PoolConfig::for_platform(&Platform::Android).max_concurrent_channels,
            5
        );
        assert_eq!(
            PoolConfig::for_platform(&Platform::Ios).max_concurrent_channels,
            10
        );
        assert_eq!(PoolConfig::default().effect_capacity(), 9);
    }

    #[test]
    fn test_validate() {
        assert!(PoolConfig::new(2).validate().is_ok());
        assert!(matches!(
            PoolConfig::new(1).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(PoolConfig::new(0).validate().is_err());
    }

    #[test]
    fn test_override_wins() {
        let config = ConfigFile {
            max_concurrent_channels: Some(3),
            ..ConfigFile::default()
        };
        assert_eq!(config.resolve(&Platform::Android), PoolConfig::new(3));
        assert_eq!(
            ConfigFile::default().resolve(&Platform::Android),
            PoolConfig::new(5)
        );
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "platform": "Android",
                "effects": ["hit.mp3", "coin.mp3"],
                "bgm": {{ "source": "theme.mp3", "loop": false }}
            }}"#
        )
        .unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        assert_eq!(config.platform, Some(Platform::Android));
        assert_eq!(config.effects.len(), 2);
        assert_eq!(config.clip_millis, DEFAULT_CLIP_MILLIS);

        let bgm = config.bgm.unwrap();
        assert_eq!(bgm.source, "theme.mp3");
        assert!(!bgm.loop_playback);
        assert!(bgm.autoplay);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigFile::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_load_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            ConfigFile::load(file.path()),
            Err(Error::Json(_))
        ));
    }
}
