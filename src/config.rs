// SPDX-License-Identifier: GPL-3.0-only

//! User configuration.
//!
//! Settings are read from a JSON file. Every field is optional; missing
//! fields take their defaults:
//!
//! ```json
//! {
//!     "accessible": true,
//!     "theme": "light",
//!     "animation_duration_ms": 1000,
//!     "service_url": "http://localhost:8000",
//!     "request_timeout_ms": 3000,
//!     "layout_path": "layouts/qwerty.json"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::app_settings::{DEFAULT_ANIMATION_DURATION_MS, DEFAULT_REQUEST_TIMEOUT_MS};
use crate::renderer::{clamp_duration_ms, KeyboardMode};

// ============================================================================
// Error Types
// ============================================================================

/// Error raised while loading a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read
    Io {
        /// Underlying I/O error
        source: std::io::Error,
        /// Path of the file
        file_path: String,
    },
    /// The file is not valid configuration JSON
    Json {
        /// Underlying JSON error
        source: serde_json::Error,
        /// Path of the file, if loaded from disk
        file_path: Option<String>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { source, file_path } => {
                write!(f, "Failed to read config '{}': {}", file_path, source)
            }
            ConfigError::Json { source, file_path } => match file_path {
                Some(path) => write!(
                    f,
                    "Invalid config '{}' at line {}: {}",
                    path,
                    source.line(),
                    source
                ),
                None => write!(f, "Invalid config at line {}: {}", source.line(), source),
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Json { source, .. } => Some(source),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Colour theme of the keyboard. Cosmetic only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Returns the other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// User configuration for a keyboard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether predicted keys grow
    pub accessible: bool,
    /// Colour theme
    pub theme: Theme,
    /// Duration of one animation run in milliseconds
    pub animation_duration_ms: u64,
    /// Base URL of the prediction server; the frequency stub is used when unset
    pub service_url: Option<String>,
    /// Timeout for each prediction request in milliseconds
    pub request_timeout_ms: u64,
    /// JSON layout file; the built-in QWERTY layout is used when unset
    pub layout_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accessible: true,
            theme: Theme::Light,
            animation_duration_ms: DEFAULT_ANIMATION_DURATION_MS,
            service_url: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            layout_path: None,
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Json` if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file_path = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            source,
            file_path: file_path.clone(),
        })?;

        let config = Self::from_json_str(&content).map_err(|e| match e {
            ConfigError::Json { source, .. } => ConfigError::Json {
                source,
                file_path: Some(file_path.clone()),
            },
            other => other,
        })?;

        tracing::info!("Loaded config from {}", file_path);
        Ok(config)
    }

    /// Parses configuration from a JSON string.
    ///
    /// The animation duration is clamped into its supported range.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_json::from_str(json).map_err(|source| ConfigError::Json {
            source,
            file_path: None,
        })?;
        config.animation_duration_ms = clamp_duration_ms(config.animation_duration_ms);
        Ok(config)
    }

    /// Sets the animation duration, clamping it into range.
    ///
    /// Returns the value actually stored.
    pub fn set_animation_duration_ms(&mut self, duration_ms: u64) -> u64 {
        self.animation_duration_ms = clamp_duration_ms(duration_ms);
        self.animation_duration_ms
    }

    /// Returns the sizing mode selected by `accessible`.
    pub fn mode(&self) -> KeyboardMode {
        KeyboardMode::from_accessible(self.accessible)
    }

    /// Returns the prediction request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

// ============================================================================
// Tests
// ============================================================================
