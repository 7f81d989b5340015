//! Host platform identification.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Platform reported by the audio host at startup.
///
/// Parsing is case-insensitive and never fails; unknown names are kept in
/// [`Platform::Other`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    Android,
    Ios,
    Windows,
    Mac,
    Devtools,
    #[default]
    Unknown,
    Other(String),
}

impl Platform {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Windows => "windows",
            Self::Mac => "mac",
            Self::Devtools => "devtools",
            Self::Unknown => "",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl From<&str> for Platform {
    fn from(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "android" => Self::Android,
            "ios" => Self::Ios,
            "windows" => Self::Windows,
            "mac" | "macos" => Self::Mac,
            "devtools" => Self::Devtools,
            "" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Platform {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.as_str().to_string()
    }
}

impl FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_case_insensitive() {
        assert_eq!(Platform::from("Android"), Platform::Android);
        assert_eq!(Platform::from("ANDROID "), Platform::Android);
        assert_eq!(Platform::from("iOS"), Platform::Ios);
    }

    #[test]
    fn test_platform_unknown() {
        assert_eq!(Platform::from(""), Platform::Unknown);
        assert_eq!(
            Platform::from("Harmony"),
            Platform::Other("harmony".to_string())
        );
    }

    #[test]
    fn test_platform_serde() {
        let platform: Platform = serde_json::from_str("\"android\"").unwrap();
        assert_eq!(platform, Platform::Android);
        assert_eq!(serde_json::to_string(&Platform::Mac).unwrap(), "\"mac\"");
    }
}
