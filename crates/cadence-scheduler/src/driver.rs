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

//! A blocking host loop for environments without a display callback.
//!
//! The scheduler itself never owns a thread or a timer: something outside
//! has to call [`Scheduler::host_tick`]. [`FrameDriver`] is that something
//! for CLIs, headless tools and tests. It paces ticks to a target rate on the
//! calling thread.

use crate::Scheduler;
use cadence_core::Frameloop;
use std::thread;
use std::time::{Duration, Instant};

/// Paces [`Scheduler::host_tick`] calls at a fixed rate on the current thread.
#[derive(Debug, Clone)]
pub struct FrameDriver {
    tick_duration: Duration,
    max_idle_polls: Option<u32>,
}

/// What a [`FrameDriver::run`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriverReport {
    /// Polls that executed a tick.
    pub ticks: u64,
    /// Polls skipped because the loop was stopped.
    pub idle_polls: u64,
    /// Wall-clock time spent inside `run`.
    pub wall_time: Duration,
}

impl FrameDriver {
    /// Creates a driver polling `target_fps` times per second.
    ///
    /// Non-finite or non-positive rates fall back to 60.
    pub fn new(target_fps: f64) -> Self {
        let fps = if target_fps.is_finite() && target_fps > 0.0 {
            target_fps
        } else {
            log::warn!("FrameDriver: invalid target fps {target_fps}, using 60");
            60.0
        };
        Self {
            tick_duration: Duration::from_secs_f64(1.0 / fps),
            max_idle_polls: None,
        }
    }

    /// Returns from [`run`](Self::run) after this many consecutive polls
    /// without a tick, unless the mode is `always`.
    pub fn with_idle_limit(mut self, polls: u32) -> Self {
        self.max_idle_polls = Some(polls);
        self
    }

    /// The pause between two polls.
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Polls the scheduler until `should_exit` returns `true` or the idle
    /// limit is reached.
    ///
    /// Timestamps come from the scheduler's clock.
    pub fn run<S, F>(&self, scheduler: &Scheduler<S>, mut should_exit: F) -> DriverReport
    where
        S: 'static,
        F: FnMut(&Scheduler<S>) -> bool,
    {
        let started = Instant::now();
        let mut report = DriverReport::default();
        let mut idle_streak = 0u32;

        log::debug!(
            "FrameDriver: running at {:.1} polls/s",
            1.0 / self.tick_duration.as_secs_f64()
        );
        while !should_exit(scheduler) {
            let poll_start = Instant::now();

            if scheduler.host_tick(scheduler.now()) {
                report.ticks += 1;
                idle_streak = 0;
            } else {
                report.idle_polls += 1;
                idle_streak = idle_streak.saturating_add(1);
                if let Some(limit) = self.max_idle_polls {
                    if idle_streak >= limit && scheduler.frameloop() != Frameloop::Always {
                        log::debug!("FrameDriver: idle for {idle_streak} poll(s), returning");
                        break;
                    }
                }
            }

            let elapsed = poll_start.elapsed();
            if elapsed < self.tick_duration {
                thread::sleep(self.tick_duration - elapsed);
            }
        }

        report.wall_time = started.elapsed();
        report
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(60.0)
    }
}
