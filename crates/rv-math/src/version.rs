//! Semantic version of the published math package

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{MathError, Result};

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:-([a-zA-Z0-9.]+))?(?:\+([a-zA-Z0-9.]+))?$")
        .expect("version pattern compiles")
});

/// Semantic version published in the index
///
/// Serialized as its string form (`"1.0.0-rc.1"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct GameVersion {
    /// Major version (math changes that alter published odds)
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Patch version
    pub patch: u32,
    /// Prerelease tag (e.g., "rc.1")
    pub prerelease: Option<String>,
    /// Build metadata
    pub build: Option<String>,
}

impl GameVersion {
    /// Parse version from string
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// Check if this is a stable release (no prerelease tag)
    pub fn is_stable(&self) -> bool {
        self.prerelease.is_none()
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }

        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }

        Ok(())
    }
}

impl FromStr for GameVersion {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = VERSION_PATTERN
            .captures(s)
            .ok_or_else(|| MathError::InvalidVersion(s.to_string()))?;

        let component = |idx: usize| -> Result<u32> {
            caps[idx]
                .parse()
                .map_err(|_| MathError::InvalidVersion(format!("{} (component {})", s, &caps[idx])))
        };

        Ok(Self {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
            prerelease: caps.get(4).map(|m| m.as_str().to_string()),
            build: caps.get(5).map(|m| m.as_str().to_string()),
        })
    }
}

impl TryFrom<String> for GameVersion {
    type Error = MathError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<GameVersion> for String {
    fn from(version: GameVersion) -> Self {
        version.to_string()
    }
}
