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

//! The data model of a registered per-tick job.
//!
//! A [`Job`] is pure scheduling metadata. The callback itself is owned by the
//! scheduler next to it, so the metadata can be sorted, rate-limited and
//! mutated without touching user code.

use crate::rate_limit;
use std::collections::BTreeSet;

/// The phase a job lands in when neither a phase nor a constraint is given.
pub const DEFAULT_PHASE: &str = "update";

/// Scheduling metadata for one registered callback.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Unique across the whole scheduler, not just one root.
    pub id: String,
    /// Name of the phase bucket the job runs in.
    pub phase: String,
    /// Job ids or phase names this job must run before.
    pub before: BTreeSet<String>,
    /// Job ids or phase names this job must run after.
    pub after: BTreeSet<String>,
    /// Higher runs earlier within a bucket.
    pub priority: i32,
    /// Monotonic insertion counter, used as the FIFO tie-break.
    pub index: u64,
    /// Optional throttle target in frames per second.
    pub fps: Option<f64>,
    /// `true` skips missed ticks, `false` catches up in whole intervals.
    pub drop: bool,
    /// Disabled jobs are neither sorted nor dispatched.
    pub enabled: bool,
    /// Timestamp (ms) of the last run, owned by the rate limiter.
    pub last_run: Option<f64>,
    /// Marks internally reserved jobs such as a default render step.
    pub system: bool,
}

impl Job {
    /// Creates an enabled, unthrottled job in the default phase.
    pub fn new(id: impl Into<String>, index: u64) -> Self {
        Self {
            id: id.into(),
            phase: DEFAULT_PHASE.to_string(),
            before: BTreeSet::new(),
            after: BTreeSet::new(),
            priority: 0,
            index,
            fps: None,
            drop: true,
            enabled: true,
            last_run: None,
            system: false,
        }
    }

    /// Moves the job into `phase`.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Adds a "runs before `target`" constraint.
    pub fn with_before(mut self, target: impl Into<String>) -> Self {
        self.before.insert(target.into());
        self
    }

    /// Adds a "runs after `target`" constraint.
    pub fn with_after(mut self, target: impl Into<String>) -> Self {
        self.after.insert(target.into());
        self
    }

    /// Sets the throttle target and backlog policy.
    pub fn with_fps(mut self, fps: f64, drop: bool) -> Self {
        self.fps = Some(fps);
        self.drop = drop;
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the throttle interval in milliseconds, if the job is throttled.
    ///
    /// Non-finite or non-positive `fps` values mean "unthrottled".
    pub fn interval_ms(&self) -> Option<f64> {
        match self.fps {
            Some(fps) if fps.is_finite() && fps > 0.0 => Some(1000.0 / fps),
            _ => None,
        }
    }

    /// Returns `true` if this job names `target` in `before` or `after`.
    pub fn references(&self, target: &str) -> bool {
        self.before.contains(target) || self.after.contains(target)
    }

    /// Applies a partial update in place.
    ///
    /// Priority, fps and drop changes never request a re-sort. An enabled
    /// change requests one only when the state actually flips, and resets
    /// the job's timing on re-enable. Phase or constraint changes always
    /// request one.
    pub fn apply(&mut self, update: JobUpdate) -> JobUpdateOutcome {
        let mut outcome = JobUpdateOutcome::default();

        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(fps) = update.fps {
            self.fps = fps;
        }
        if let Some(drop) = update.drop {
            self.drop = drop;
        }
        if let Some(enabled) = update.enabled {
            if enabled != self.enabled {
                self.enabled = enabled;
                if enabled {
                    rate_limit::reset_job_timing(self);
                }
                outcome.resort = true;
                outcome.enabled_changed = Some(enabled);
            }
        }
        if let Some(phase) = update.phase {
            self.phase = phase;
            outcome.resort = true;
        }
        if let Some(before) = update.before {
            self.before = before.into_iter().collect();
            outcome.resort = true;
        }
        if let Some(after) = update.after {
            self.after = after.into_iter().collect();
            outcome.resort = true;
        }

        outcome
    }
}

/// What [`Job::apply`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobUpdateOutcome {
    /// The owning root must rebuild its sorted list.
    pub resort: bool,
    /// The new enabled state, if it flipped.
    pub enabled_changed: Option<bool>,
}

/// Registration options for a job.
///
/// Every field is optional; the builder methods mirror the option table of
/// the registration API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobOptions {
    /// Explicit job id. An id is generated when absent.
    pub id: Option<String>,
    /// Owning root. The first registered root is used when absent.
    pub root_id: Option<String>,
    /// Explicit phase. Resolved from the constraints when absent.
    pub phase: Option<String>,
    /// Priority within the bucket, default 0.
    pub priority: i32,
    /// Job ids or phase names to run before.
    pub before: Vec<String>,
    /// Job ids or phase names to run after.
    pub after: Vec<String>,
    /// Throttle target in frames per second.
    pub fps: Option<f64>,
    /// Backlog policy; the scheduler's configured default applies when absent.
    pub drop: Option<bool>,
    /// Initial enabled state, default `true`.
    pub enabled: Option<bool>,
    /// Marks an internally reserved job.
    pub system: bool,
}

impl JobOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the job id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the owning root.
    pub fn root(mut self, root_id: impl Into<String>) -> Self {
        self.root_id = Some(root_id.into());
        self
    }

    /// Sets the phase.
    pub fn phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    /// Sets the priority.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Adds a "runs before" target.
    pub fn before(mut self, target: impl Into<String>) -> Self {
        self.before.push(target.into());
        self
    }

    /// Adds a "runs after" target.
    pub fn after(mut self, target: impl Into<String>) -> Self {
        self.after.push(target.into());
        self
    }

    /// Sets the throttle target.
    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Sets the backlog policy.
    pub fn drop(mut self, drop: bool) -> Self {
        self.drop = Some(drop);
        self
    }

    /// Sets the initial enabled state.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Marks the job as system-reserved.
    pub fn system(mut self, system: bool) -> Self {
        self.system = system;
        self
    }
}

/// A partial update for a registered job. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    /// New priority.
    pub priority: Option<i32>,
    /// New throttle target; `Some(None)` removes the throttle.
    pub fps: Option<Option<f64>>,
    /// New backlog policy.
    pub drop: Option<bool>,
    /// New enabled state.
    pub enabled: Option<bool>,
    /// New phase.
    pub phase: Option<String>,
    /// Replacement "runs before" set.
    pub before: Option<Vec<String>>,
    /// Replacement "runs after" set.
    pub after: Option<Vec<String>>,
}

impl JobUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the priority.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets or clears the throttle target.
    pub fn fps(mut self, fps: Option<f64>) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Sets the backlog policy.
    pub fn drop(mut self, drop: bool) -> Self {
        self.drop = Some(drop);
        self
    }

    /// Sets the enabled state.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Moves the job to another phase.
    pub fn phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    /// Replaces the "runs before" set.
    pub fn before<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.before = Some(targets.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the "runs after" set.
    pub fn after<I, T>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.after = Some(targets.into_iter().map(Into::into).collect());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_defaults() {
        let job = Job::new("a", 7);
        assert_eq!(job.phase, DEFAULT_PHASE);
        assert_eq!(job.priority, 0);
        assert_eq!(job.index, 7);
        assert!(job.enabled);
        assert!(job.drop);
        assert!(job.interval_ms().is_none());
    }

    #[test]
    fn test_interval_ignores_invalid_fps() {
        assert_eq!(Job::new("a", 0).with_fps(10.0, true).interval_ms(), Some(100.0));
        assert!(Job::new("a", 0).with_fps(0.0, true).interval_ms().is_none());
        assert!(Job::new("a", 0).with_fps(-5.0, true).interval_ms().is_none());
        assert!(Job::new("a", 0).with_fps(f64::NAN, true).interval_ms().is_none());
    }

    #[test]
    fn test_priority_fps_drop_update_needs_no_resort() {
        let mut job = Job::new("a", 0);
        let outcome = job.apply(JobUpdate::new().priority(5).fps(Some(30.0)).drop(false));
        assert!(!outcome.resort);
        assert_eq!(outcome.enabled_changed, None);
        assert_eq!(job.priority, 5);
        assert_eq!(job.fps, Some(30.0));
        assert!(!job.drop);
    }

    #[test]
    fn test_enabled_resorts_only_on_change() {
        let mut job = Job::new("a", 0);
        assert!(!job.apply(JobUpdate::new().enabled(true)).resort);

        let outcome = job.apply(JobUpdate::new().enabled(false));
        assert!(outcome.resort);
        assert_eq!(outcome.enabled_changed, Some(false));
    }

    #[test]
    fn test_reenable_resets_timing() {
        let mut job = Job::new("a", 0).with_fps(10.0, true).with_enabled(false);
        job.last_run = Some(500.0);
        job.apply(JobUpdate::new().enabled(true));
        assert!(job.last_run.is_none());
    }

    #[test]
    fn test_phase_and_constraints_always_resort() {
        let mut job = Job::new("a", 0);
        assert!(job.apply(JobUpdate::new().phase(DEFAULT_PHASE)).resort);
        assert!(job.apply(JobUpdate::new().before(["b"])).resort);
        assert!(job.references("b"));
        assert!(job.apply(JobUpdate::new().after(Vec::<String>::new())).resort);
    }

    #[test]
    fn test_options_builder() {
        let options = JobOptions::new()
            .id("cam")
            .root("main")
            .phase("render")
            .priority(3)
            .before("post")
            .after("physics")
            .fps(30.0)
            .drop(false)
            .enabled(false)
            .system(true);
        assert_eq!(options.id.as_deref(), Some("cam"));
        assert_eq!(options.root_id.as_deref(), Some("main"));
        assert_eq!(options.before, vec!["post".to_string()]);
        assert_eq!(options.after, vec!["physics".to_string()]);
        assert_eq!(options.drop, Some(false));
        assert_eq!(options.enabled, Some(false));
        assert!(options.system);
    }
}
