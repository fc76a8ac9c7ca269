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

//! The Scheduler Core.
//!
//! A [`Scheduler`] owns the roots, their job registries, the phase graph and
//! the tick loop. It is a cheap, single-threaded handle: clones share one
//! instance, and callbacks may capture a [`WeakScheduler`] to call back into
//! it without creating a reference cycle.
//!
//! # Example
//!
//! ```rust
//! use cadence_scheduler::{JobOptions, RootOptions, Scheduler};
//!
//! let scheduler: Scheduler<u32> = Scheduler::new();
//! let _root = scheduler.register_root("main", RootOptions::new(|| 7));
//! let _job = scheduler.register(
//!     |state, _delta| {
//!         assert_eq!(state.root, 7);
//!         Ok(())
//!     },
//!     JobOptions::new().id("tick").phase("physics"),
//! );
//! scheduler.step(Some(16.0));
//! assert_eq!(scheduler.frame_count(), 1);
//! ```

mod frameloop;
mod handle;
mod state;

pub use handle::{HookHandle, JobHandle, RootHandle, Subscription};
pub use state::{ErrorHandler, HookCallback, IdleCallback, JobCallback, JobStateListener, StateFn};

use crate::clock::{Clock, SystemClock};
use crate::config::SchedulerConfig;
use cadence_core::{
    EventBus, FrameState, FrameStats, HookStage, Job, JobOptions, JobUpdate, PhaseGraph,
    PhaseOptions, SchedulerError, SchedulerEvent,
};
use state::{shared, Hook, JobSlot, Listener, Root, SchedulerState, Shared};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

pub(crate) struct Inner<S: 'static> {
    pub(crate) state: RefCell<SchedulerState<S>>,
    pub(crate) clock: Box<dyn Clock>,
    next_hook_token: std::cell::Cell<u64>,
}

/// A cooperative, single-threaded per-tick job scheduler.
///
/// `S` is the custom state each root contributes to the frame state of its
/// jobs.
pub struct Scheduler<S: 'static = ()> {
    inner: Rc<Inner<S>>,
}

impl<S: 'static> Clone for Scheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: 'static> std::fmt::Debug for Scheduler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Scheduler")
            .field("roots", &state.roots.len())
            .field("jobs", &state.owners.len())
            .field("frameloop", &state.frameloop)
            .field("running", &state.running)
            .field("frame", &state.frame)
            .finish()
    }
}

/// A non-owning reference to a [`Scheduler`].
pub struct WeakScheduler<S: 'static = ()> {
    inner: Weak<Inner<S>>,
}

impl<S: 'static> Clone for WeakScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S: 'static> WeakScheduler<S> {
    /// Returns the scheduler if it is still alive.
    pub fn upgrade(&self) -> Option<Scheduler<S>> {
        self.inner.upgrade().map(|inner| Scheduler { inner })
    }
}

/// Registration options for a root.
pub struct RootOptions<S: 'static> {
    get_state: Rc<StateFn<S>>,
    on_error: Option<Box<ErrorHandler>>,
    parents: Vec<String>,
}

impl<S: 'static> RootOptions<S> {
    /// Creates options with the root's state accessor.
    pub fn new(get_state: impl Fn() -> S + 'static) -> Self {
        Self {
            get_state: Rc::new(get_state),
            on_error: None,
            parents: Vec::new(),
        }
    }

    /// Installs a handler receiving this root's callback failures.
    pub fn on_error(mut self, handler: impl FnMut(&SchedulerError) + 'static) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// Declares `root_id` as an owner of this root (e.g. the root a portal
    /// renders into). Taking over this root also takes over its owners.
    pub fn parent(mut self, root_id: impl Into<String>) -> Self {
        self.parents.push(root_id.into());
        self
    }
}

impl<S: Default + 'static> Default for RootOptions<S> {
    fn default() -> Self {
        Self::new(S::default)
    }
}

impl<S: 'static> Scheduler<S> {
    /// Creates a scheduler with the default configuration and the system clock.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default(), SystemClock::new())
    }

    /// Creates a scheduler from a configuration and a clock.
    pub fn with_config(config: SchedulerConfig, clock: impl Clock + 'static) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("Scheduler: {e}; continuing with the given values");
        }
        let state = SchedulerState {
            phases: PhaseGraph::with_phases(config.phases, config.default_phase),
            roots: Vec::new(),
            owners: HashMap::new(),
            next_job_index: 0,
            next_auto_id: 0,
            next_listener_id: 0,
            max_pending_frames: config.max_pending_frames.max(1),
            default_drop: config.default_drop,
            frameloop: config.frameloop,
            running: false,
            pending_frames: 0,
            last_tick: None,
            elapsed: 0.0,
            frame: 0,
            loop_ticks: 0,
            stats: FrameStats::new(),
            before_hooks: Vec::new(),
            after_hooks: Vec::new(),
            idle_callbacks: Vec::new(),
            listeners: HashMap::new(),
            events: EventBus::with_capacity(config.event_capacity),
        };
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(state),
                clock: Box::new(clock),
                next_hook_token: std::cell::Cell::new(0),
            }),
        }
    }

    /// Returns a weak handle suitable for capture inside callbacks.
    pub fn downgrade(&self) -> WeakScheduler<S> {
        WeakScheduler {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Current time of the scheduler's clock, in milliseconds.
    pub fn now(&self) -> f64 {
        self.inner.clock.now_ms()
    }

    // --- Roots ---

    /// Registers a rendering root.
    ///
    /// Duplicate ids are rejected with a warning and yield a detached handle.
    /// The first root starts the loop when the mode is `always`.
    pub fn register_root(&self, id: impl Into<String>, options: RootOptions<S>) -> RootHandle<S> {
        let id = id.into();
        let first_root = {
            let mut state = self.inner.state.borrow_mut();
            if state.root(&id).is_some() {
                log::warn!("Scheduler: root '{id}' is already registered; ignoring");
                return RootHandle::detached(self.downgrade());
            }
            let on_error = options.on_error.map(shared);
            state
                .roots
                .push(Root::new(id.clone(), options.get_state, on_error, options.parents));
            state.events.publish(SchedulerEvent::RootRegistered {
                root_id: id.clone(),
            });
            log::info!("Scheduler: registered root '{id}'");
            state.roots.len() == 1 && state.frameloop == cadence_core::Frameloop::Always
        };
        if first_root {
            self.start();
        }
        RootHandle::new(self.downgrade(), id)
    }

    /// Removes a root, its jobs and their pause/resume subscriptions.
    ///
    /// The loop stops when the last root goes away.
    pub fn unregister_root(&self, id: &str) -> bool {
        let now_empty = {
            let mut state = self.inner.state.borrow_mut();
            let Some(position) = state.roots.iter().position(|root| root.id == id) else {
                log::debug!("Scheduler: unregister_root('{id}'): no such root");
                return false;
            };
            let root = state.roots.remove(position);
            for job_id in root.jobs.keys() {
                state.owners.remove(job_id);
                state.listeners.remove(job_id);
                state.events.publish(SchedulerEvent::JobUnregistered {
                    job_id: job_id.clone(),
                    root_id: root.id.clone(),
                });
            }
            state.events.publish(SchedulerEvent::RootUnregistered {
                root_id: root.id.clone(),
            });
            log::info!(
                "Scheduler: unregistered root '{id}' ({} job(s) dropped)",
                root.jobs.len()
            );
            state.roots.is_empty()
        };
        if now_empty {
            self.stop();
        }
        true
    }

    /// Ids of the registered roots, in registration order.
    pub fn root_ids(&self) -> Vec<String> {
        let state = self.inner.state.borrow();
        state.roots.iter().map(|root| root.id.clone()).collect()
    }

    // --- Jobs ---

    /// Registers a per-tick callback.
    ///
    /// Without `root_id` the first registered root is used; without any root
    /// the call is logged and returns a detached handle whose callback never
    /// runs. A duplicate id replaces the existing job.
    pub fn register<F>(&self, callback: F, options: JobOptions) -> JobHandle<S>
    where
        F: FnMut(&FrameState<S>, f64) -> anyhow::Result<()> + 'static,
    {
        let mut state = self.inner.state.borrow_mut();

        let root_id = match options
            .root_id
            .clone()
            .or_else(|| state.roots.first().map(|root| root.id.clone()))
        {
            Some(root_id) if state.root(&root_id).is_some() => root_id,
            requested => {
                log::warn!(
                    "Scheduler: cannot register job '{}': {}; it will never run",
                    options.id.as_deref().unwrap_or("<anonymous>"),
                    match requested {
                        Some(root_id) => format!("root '{root_id}' does not exist"),
                        None => "no root is registered".to_string(),
                    }
                );
                return JobHandle::detached(self.downgrade());
            }
        };

        let id = match options.id.clone() {
            Some(id) => id,
            None => loop {
                let candidate = format!("job-{}", state.next_auto_id);
                state.next_auto_id += 1;
                if !state.owners.contains_key(&candidate) {
                    break candidate;
                }
            },
        };

        if state.owners.contains_key(&id) {
            log::warn!("Scheduler: job '{id}' is already registered; replacing it");
            state.remove_job(&id);
        }

        let phase = resolve_phase(&mut state, &root_id, &options);
        let index = state.next_job_index;
        state.next_job_index += 1;

        let mut job = Job::new(id.clone(), index).with_phase(phase);
        job.before = options.before.iter().cloned().collect();
        job.after = options.after.iter().cloned().collect();
        job.priority = options.priority;
        job.fps = options.fps;
        job.drop = options.drop.unwrap_or(state.default_drop);
        job.enabled = options.enabled.unwrap_or(true);
        job.system = options.system;
        if job.fps.is_some() && job.interval_ms().is_none() {
            log::warn!("Scheduler: job '{id}' has invalid fps {:?}; running unthrottled", job.fps);
        }

        let slot = Rc::new(JobSlot {
            job: RefCell::new(job),
            root_id: root_id.clone(),
            callback: RefCell::new(Box::new(callback) as Box<JobCallback<S>>),
        });
        if let Some(root) = state.root_mut(&root_id) {
            root.jobs.insert(id.clone(), slot);
            root.needs_rebuild = true;
        }
        state.owners.insert(id.clone(), root_id.clone());
        state.events.publish(SchedulerEvent::JobRegistered {
            job_id: id.clone(),
            root_id,
        });
        log::trace!("Scheduler: registered job '{id}' (index {index})");
        drop(state);

        JobHandle::new(self.downgrade(), id, index)
    }

    /// Removes a job, searching every root when `root_id` is `None`.
    ///
    /// A job removed from inside a callback still finishes the current
    /// tick's already-captured order; the next tick omits it.
    pub fn unregister(&self, id: &str, root_id: Option<&str>) -> bool {
        let mut state = self.inner.state.borrow_mut();
        if let Some(root_id) = root_id {
            if state.owners.get(id).map(String::as_str) != Some(root_id) {
                log::debug!("Scheduler: job '{id}' is not registered on root '{root_id}'");
                return false;
            }
        }
        state.remove_job(id).is_some()
    }

    pub(crate) fn job_index(&self, id: &str) -> Option<u64> {
        let state = self.inner.state.borrow();
        let slot = state.find_job(id)?;
        let index = slot.job.borrow().index;
        Some(index)
    }

    /// Returns a snapshot of a job's scheduling metadata.
    pub fn job(&self, id: &str) -> Option<Job> {
        let state = self.inner.state.borrow();
        let slot = state.find_job(id)?;
        let job = slot.job.borrow().clone();
        Some(job)
    }

    /// Ids of a root's jobs, in registration order.
    pub fn job_ids(&self, root_id: &str) -> Vec<String> {
        let state = self.inner.state.borrow();
        let Some(root) = state.root(root_id) else {
            return Vec::new();
        };
        let mut jobs: Vec<(u64, String)> = root
            .jobs
            .values()
            .map(|slot| {
                let job = slot.job.borrow();
                (job.index, job.id.clone())
            })
            .collect();
        jobs.sort_unstable();
        jobs.into_iter().map(|(_, id)| id).collect()
    }

    /// Applies a partial update to a job.
    ///
    /// Returns `false`, after a warning, if the job does not exist.
    pub fn update_job(&self, id: &str, update: JobUpdate) -> bool {
        let (enabled_changed, listeners) = {
            let mut state = self.inner.state.borrow_mut();
            let Some(slot) = state.find_job(id) else {
                log::warn!("Scheduler: update_job: unknown job '{id}'");
                return false;
            };
            if let Some(phase) = &update.phase {
                if !state.phases.has_phase(phase) {
                    log::debug!("Scheduler: job '{id}' moved to unknown phase '{phase}'");
                }
            }
            let outcome = slot.job.borrow_mut().apply(update);
            if outcome.resort {
                if let Some(root) = state.root_mut(&slot.root_id) {
                    root.needs_rebuild = true;
                }
            }
            let listeners = match outcome.enabled_changed {
                Some(enabled) => {
                    let job_id = id.to_string();
                    state.events.publish(if enabled {
                        SchedulerEvent::JobResumed { job_id }
                    } else {
                        SchedulerEvent::JobPaused { job_id }
                    });
                    state.listeners_for(id)
                }
                None => Vec::new(),
            };
            (outcome.enabled_changed, listeners)
        };

        if let Some(enabled) = enabled_changed {
            for listener in listeners {
                match listener.try_borrow_mut() {
                    Ok(mut listener) => (*listener)(!enabled),
                    Err(_) => log::warn!("Scheduler: skipping re-entrant job state listener for '{id}'"),
                }
            }
        }
        true
    }

    /// Disables a job.
    pub fn pause_job(&self, id: &str) -> bool {
        self.update_job(id, JobUpdate::new().enabled(false))
    }

    /// Re-enables a job, clearing its throttle backlog.
    pub fn resume_job(&self, id: &str) -> bool {
        self.update_job(id, JobUpdate::new().enabled(true))
    }

    /// Returns `true` if the job exists and is disabled.
    pub fn is_job_paused(&self, id: &str) -> bool {
        self.job(id).map(|job| !job.enabled).unwrap_or(false)
    }

    /// Subscribes to pause (`true`) / resume (`false`) transitions of a job.
    ///
    /// The job does not have to exist yet.
    pub fn subscribe_job_state(
        &self,
        id: &str,
        listener: impl FnMut(bool) + 'static,
    ) -> Subscription<S> {
        let mut state = self.inner.state.borrow_mut();
        let listener_id = state.next_listener_id;
        state.next_listener_id += 1;
        state
            .listeners
            .entry(id.to_string())
            .or_default()
            .push(Listener {
                id: listener_id,
                callback: shared(Box::new(listener) as Box<JobStateListener>),
            });
        Subscription::new(self.downgrade(), id.to_string(), listener_id)
    }

    pub(crate) fn unsubscribe(&self, job_id: &str, listener_id: u64) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let Some(listeners) = state.listeners.get_mut(job_id) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|listener| listener.id != listener_id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            state.listeners.remove(job_id);
        }
        removed
    }

    // --- Phases ---

    /// Inserts a phase; every root re-sorts on its next tick.
    pub fn add_phase(&self, name: &str, options: PhaseOptions) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let added = state.phases.add_phase(name, options);
        if added {
            state.mark_all_dirty();
        }
        added
    }

    /// Returns `true` if `name` is a known phase.
    pub fn has_phase(&self, name: &str) -> bool {
        self.inner.state.borrow().phases.has_phase(name)
    }

    /// The phases in execution order; the same allocation until the next change.
    pub fn phases(&self) -> Rc<[String]> {
        self.inner.state.borrow().phases.ordered_phases()
    }

    // --- Global hooks ---

    /// Registers a hook that runs once per tick before or after all roots.
    ///
    /// An existing hook with the same id in the same stage is replaced.
    pub fn register_global(
        &self,
        stage: HookStage,
        id: impl Into<String>,
        callback: impl FnMut(f64) -> anyhow::Result<()> + 'static,
    ) -> HookHandle<S> {
        let id = id.into();
        let token = self.next_hook_token();
        let mut state = self.inner.state.borrow_mut();
        let hooks = state.hooks_mut(stage);
        if let Some(position) = hooks.iter().position(|hook| hook.id == id) {
            log::warn!("Scheduler: global {stage} hook '{id}' already exists; replacing it");
            hooks.remove(position);
        }
        hooks.push(Hook {
            id,
            token,
            callback: shared(Box::new(callback) as Box<HookCallback>),
        });
        HookHandle::global(self.downgrade(), stage, token)
    }

    /// Removes a global hook by id.
    pub fn unregister_global(&self, stage: HookStage, id: &str) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let hooks = state.hooks_mut(stage);
        let before = hooks.len();
        hooks.retain(|hook| hook.id != id);
        hooks.len() != before
    }

    pub(crate) fn unregister_global_token(&self, stage: HookStage, token: u64) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let hooks = state.hooks_mut(stage);
        let before = hooks.len();
        hooks.retain(|hook| hook.token != token);
        hooks.len() != before
    }

    /// Registers a callback fired when a demand-mode loop goes idle.
    pub fn on_idle(&self, callback: impl FnMut(f64) + 'static) -> HookHandle<S> {
        let token = self.next_hook_token();
        let mut state = self.inner.state.borrow_mut();
        let callback: Shared<IdleCallback> = shared(Box::new(callback) as Box<IdleCallback>);
        state.idle_callbacks.push((token, callback));
        HookHandle::idle(self.downgrade(), token)
    }

    pub(crate) fn remove_idle(&self, token: u64) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let before = state.idle_callbacks.len();
        state.idle_callbacks.retain(|(id, _)| *id != token);
        state.idle_callbacks.len() != before
    }

    fn next_hook_token(&self) -> u64 {
        let token = self.inner.next_hook_token.get();
        self.inner.next_hook_token.set(token + 1);
        token
    }

    // --- Takeover ---

    /// Records that a job suppresses the default behavior of a root and of
    /// every root in its ownership chain.
    pub fn take_over(&self, root_id: &str) -> bool {
        self.adjust_takeover(root_id, |count| count.saturating_add(1))
    }

    /// Undoes one [`take_over`](Self::take_over). Counts never go below zero.
    pub fn release_takeover(&self, root_id: &str) -> bool {
        self.adjust_takeover(root_id, |count| count.saturating_sub(1))
    }

    fn adjust_takeover(&self, root_id: &str, adjust: impl Fn(u32) -> u32) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let chain = state.ownership_chain(root_id);
        if chain.is_empty() {
            log::warn!("Scheduler: takeover on unknown root '{root_id}'");
            return false;
        }
        for id in chain {
            if let Some(root) = state.root_mut(&id) {
                root.takeover_count = adjust(root.takeover_count);
            }
        }
        true
    }

    /// The takeover count of a root.
    pub fn takeover_count(&self, root_id: &str) -> Option<u32> {
        let state = self.inner.state.borrow();
        state.root(root_id).map(|root| root.takeover_count)
    }

    /// Returns `true` if anything currently takes over the root.
    pub fn is_taken_over(&self, root_id: &str) -> bool {
        self.takeover_count(root_id).unwrap_or(0) > 0
    }

    /// Returns `true` if an enabled, non-system job occupies `phase` on the root.
    pub fn has_user_jobs_in_phase(&self, root_id: &str, phase: &str) -> bool {
        let state = self.inner.state.borrow();
        let Some(root) = state.root(root_id) else {
            return false;
        };
        root.jobs.values().any(|slot| {
            let job = slot.job.borrow();
            job.enabled && !job.system && job.phase == phase
        })
    }

    // --- Observability ---

    /// A receiver of scheduler events. Clones compete for the same events.
    pub fn events(&self) -> flume::Receiver<SchedulerEvent> {
        self.inner.state.borrow().events.receiver()
    }

    /// Timing statistics over recent ticks.
    pub fn frame_stats(&self) -> FrameStats {
        self.inner.state.borrow().stats.clone()
    }
}

impl<S: 'static> Default for Scheduler<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks the phase of a job being registered.
///
/// An explicit phase wins. Otherwise a constraint naming a phase resolves to
/// a synthetic `before:`/`after:` phase, and a constraint naming a job of the
/// same root shares that job's phase so the bucket sort can honor it.
fn resolve_phase<S: 'static>(
    state: &mut SchedulerState<S>,
    root_id: &str,
    options: &JobOptions,
) -> String {
    if let Some(phase) = &options.phase {
        if !state.phases.has_phase(phase) {
            log::debug!("Scheduler: phase '{phase}' is unknown; its jobs run after known phases");
        }
        return phase.clone();
    }

    let before = options
        .before
        .first()
        .map(String::as_str)
        .filter(|target| state.phases.has_phase(target));
    let after = options
        .after
        .first()
        .map(String::as_str)
        .filter(|target| state.phases.has_phase(target));
    if before.is_some() || after.is_some() {
        let known = state.phases.len();
        let phase = state.phases.resolve_constraint_phase(before, after);
        if state.phases.len() != known {
            state.mark_all_dirty();
        }
        return phase;
    }

    if let Some(root) = state.root(root_id) {
        for target in options.before.iter().chain(&options.after) {
            if let Some(slot) = root.jobs.get(target) {
                return slot.job.borrow().phase.clone();
            }
        }
    }

    state.phases.default_phase().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use cadence_core::Frameloop;

    fn scheduler() -> Scheduler {
        let config = SchedulerConfig {
            frameloop: Frameloop::Never,
            ..SchedulerConfig::default()
        };
        Scheduler::with_config(config, ManualClock::new(0.0))
    }

    #[test]
    fn weak_handle_follows_scheduler_lifetime() {
        let scheduler = scheduler();
        let weak = scheduler.downgrade();
        assert!(weak.upgrade().is_some());
        drop(scheduler);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn clones_share_state() {
        let scheduler = scheduler();
        let clone = scheduler.clone();
        let _root = clone.register_root("main", RootOptions::default());
        assert_eq!(scheduler.root_ids(), ["main"]);
    }

    #[test]
    fn unknown_constraint_targets_fall_back_to_default_phase() {
        let scheduler = scheduler();
        let _root = scheduler.register_root("main", RootOptions::default());
        let _job = scheduler.register(
            |_, _| Ok(()),
            JobOptions::new().id("j").before("nothing").after("nobody"),
        );
        assert_eq!(scheduler.job("j").map(|job| job.phase), Some("update".into()));
        assert_eq!(scheduler.phases().len(), DEFAULT_PHASE_COUNT);
    }

    #[test]
    fn explicit_phase_wins_over_constraints() {
        let scheduler = scheduler();
        let _root = scheduler.register_root("main", RootOptions::default());
        let _job = scheduler.register(
            |_, _| Ok(()),
            JobOptions::new().id("j").phase("input").after("render"),
        );
        assert_eq!(scheduler.job("j").map(|job| job.phase), Some("input".into()));
        assert!(!scheduler.has_phase("after:render"));
    }

    #[test]
    fn job_options_override_configured_drop() {
        let config = SchedulerConfig {
            default_drop: false,
            ..SchedulerConfig::default()
        };
        let scheduler: Scheduler = Scheduler::with_config(config, ManualClock::new(0.0));
        let _root = scheduler.register_root("main", RootOptions::default());
        let _a = scheduler.register(|_, _| Ok(()), JobOptions::new().id("a").fps(30.0));
        let _b = scheduler.register(|_, _| Ok(()), JobOptions::new().id("b").fps(30.0).drop(true));
        assert_eq!(scheduler.job("a").map(|job| job.drop), Some(false));
        assert_eq!(scheduler.job("b").map(|job| job.drop), Some(true));
    }

    const DEFAULT_PHASE_COUNT: usize = cadence_core::DEFAULT_PHASES.len();
}
