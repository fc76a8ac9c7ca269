// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Scheduler configuration, loadable from RON.
//!
//! ```ron
//! (
//!     frameloop: demand,
//!     max_pending_frames: 30,
//!     phases: ["input", "update", "render"],
//!     default_phase: "update",
//! )
//! ```

use cadence_core::{Frameloop, DEFAULT_PHASE, DEFAULT_PHASES, MAX_PENDING_FRAMES};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a [`SchedulerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read scheduler config '{path}': {source}")]
    Io {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The text is not valid RON for a [`SchedulerConfig`].
    #[error("invalid scheduler config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The values parsed but are inconsistent.
    #[error("invalid scheduler config: {0}")]
    Invalid(String),
}

/// Tunables for a scheduler instance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Initial loop mode.
    pub frameloop: Frameloop,
    /// Cap on pending demand-mode frames.
    pub max_pending_frames: u32,
    /// Seed phases, in execution order.
    pub phases: Vec<String>,
    /// Phase for jobs registered without phase or constraints.
    pub default_phase: String,
    /// Backlog policy for throttled jobs that do not choose one.
    pub default_drop: bool,
    /// Capacity of the scheduler event bus.
    pub event_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frameloop: Frameloop::Always,
            max_pending_frames: MAX_PENDING_FRAMES,
            phases: DEFAULT_PHASES.iter().map(|phase| phase.to_string()).collect(),
            default_phase: DEFAULT_PHASE.to_string(),
            default_drop: true,
            event_capacity: 1024,
        }
    }
}

impl SchedulerConfig {
    /// Parses and validates a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a RON configuration file.
    pub fn from_ron_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loading scheduler config from {}", path.display());
        Self::from_ron_str(&text)
    }

    /// Checks the values for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pending_frames == 0 {
            return Err(ConfigError::Invalid(
                "max_pending_frames must be at least 1".into(),
            ));
        }
        if self.phases.is_empty() {
            return Err(ConfigError::Invalid("phases must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for phase in &self.phases {
            if phase.is_empty() {
                return Err(ConfigError::Invalid("phase names must not be empty".into()));
            }
            if !seen.insert(phase.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate phase '{phase}'")));
            }
        }
        if !seen.contains(self.default_phase.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "default phase '{}' is not listed in phases",
                self.default_phase
            )));
        }
        Ok(())
    }
}
