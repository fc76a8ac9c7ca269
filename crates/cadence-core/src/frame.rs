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

//! The per-tick frame-state value and the loop modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// Upper bound on pending demand-mode frames.
pub const MAX_PENDING_FRAMES: u32 = 60;

/// The value handed to every job callback of a root on one tick.
///
/// It combines the root's custom state with the tick timing. The root state
/// is reachable through `Deref`, so `state.camera` works when the root state
/// has a `camera` field.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState<S> {
    /// Absolute tick timestamp in milliseconds.
    pub time: f64,
    /// Seconds since the previous tick; zero on the first tick after a start.
    pub delta: f64,
    /// Seconds since the loop first started, excluding stopped periods.
    pub elapsed: f64,
    /// Monotonically increasing tick counter.
    pub frame: u64,
    /// The root's custom state, produced by its state accessor.
    pub root: S,
}

impl<S> Deref for FrameState<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.root
    }
}

/// How the tick loop is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frameloop {
    /// The loop runs continuously while at least one root exists.
    #[default]
    Always,
    /// The loop runs only while invalidated frames are pending.
    Demand,
    /// The loop never runs by itself; only manual stepping executes jobs.
    Never,
}

impl fmt::Display for Frameloop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frameloop::Always => write!(f, "always"),
            Frameloop::Demand => write!(f, "demand"),
            Frameloop::Never => write!(f, "never"),
        }
    }
}

impl FromStr for Frameloop {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "always" => Ok(Frameloop::Always),
            "demand" => Ok(Frameloop::Demand),
            "never" => Ok(Frameloop::Never),
            other => Err(format!("unknown frameloop mode '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Scene {
        camera: &'static str,
    }

    #[test]
    fn frame_state_derefs_to_root_state() {
        let state = FrameState {
            time: 16.0,
            delta: 0.016,
            elapsed: 1.0,
            frame: 3,
            root: Scene { camera: "main" },
        };
        assert_eq!(state.camera, "main");
        assert_eq!(state.frame, 3);
    }

    #[test]
    fn frameloop_round_trips_through_text() {
        for mode in [Frameloop::Always, Frameloop::Demand, Frameloop::Never] {
            assert_eq!(mode.to_string().parse::<Frameloop>(), Ok(mode));
        }
        assert_eq!("DEMAND".parse::<Frameloop>(), Ok(Frameloop::Demand));
        assert!("sometimes".parse::<Frameloop>().is_err());
        assert_eq!(Frameloop::default(), Frameloop::Always);
    }
}
