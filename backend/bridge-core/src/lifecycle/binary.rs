//! Which native binary runs on which platform.

use crate::error::LaunchError;

use std::env::consts::{ARCH, OS};
use std::path::{Path, PathBuf};

use log::debug;

const BINARIES: [(&str, &str, &str); 6] = [
    ("linux", "x86_64", "neutralino-linux_x64"),
    ("linux", "aarch64", "neutralino-linux_arm64"),
    ("linux", "arm", "neutralino-linux_armhf"),
    ("macos", "x86_64", "neutralino-mac_x64"),
    ("macos", "aarch64", "neutralino-mac_arm64"),
    ("windows", "x86_64", "neutralino-win_x64.exe"),
];

/// Operating system and CPU architecture, spelled like `std::env::consts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    pub fn current() -> Self {
        Self::new(OS, ARCH)
    }
}

/// Lookup table from platform to binary file name.
#[derive(Debug, Clone)]
pub struct BinaryCatalog {
    entries: Vec<(Platform, String)>,
}

impl Default for BinaryCatalog {
    fn default() -> Self {
        Self {
            entries: BINARIES
                .iter()
                .map(|(os, arch, name)| (Platform::new(*os, *arch), name.to_string()))
                .collect(),
        }
    }
}

impl BinaryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the binary for a platform.
    pub fn with_entry(mut self, platform: Platform, name: impl Into<String>) -> Self {
        self.entries.retain(|(existing, _)| *existing != platform);
        self.entries.push((platform, name.into()));
        self
    }

    pub fn binary_name(&self, platform: &Platform) -> Option<&str> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == platform)
            .map(|(_, name)| name.as_str())
    }

    /// Path of the binary for `platform` inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::UnsupportedPlatform`] when the platform has no entry.
    #[track_caller]
    pub fn resolve(&self, dir: &Path, platform: &Platform) -> Result<PathBuf, LaunchError> {
        let Some(name) = self.binary_name(platform) else {
            return Err(LaunchError::unsupported_platform(&platform.os, &platform.arch));
        };

        let path = dir.join(name);
        debug!(
            "Resolved native binary for {}_{}: {}",
            platform.os,
            platform.arch,
            path.display()
        );
        Ok(path)
    }
}
