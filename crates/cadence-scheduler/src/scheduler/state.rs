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

//! Internal state of a scheduler instance.
//!
//! Everything here sits behind one `RefCell`. No borrow of it is ever held
//! while user code runs, so callbacks may freely call back into the
//! scheduler.

use cadence_core::{
    rebuild_sorted_jobs, EventBus, FrameState, FrameStats, Frameloop, HookStage, Job,
    PhaseGraph, SchedulerError, SchedulerEvent,
};
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::Rc;

/// A job callback: receives the frame state and the delta in seconds.
pub type JobCallback<S> = dyn FnMut(&FrameState<S>, f64) -> anyhow::Result<()>;
/// Produces a root's custom state for one tick.
pub type StateFn<S> = dyn Fn() -> S;
/// Receives callback failures of a root.
pub type ErrorHandler = dyn FnMut(&SchedulerError);
/// A global before/after hook: receives the tick timestamp in milliseconds.
pub type HookCallback = dyn FnMut(f64) -> anyhow::Result<()>;
/// Called with the last tick timestamp when a demand-mode loop goes idle.
pub type IdleCallback = dyn FnMut(f64);
/// Observes pause (`true`) and resume (`false`) transitions of a job.
pub type JobStateListener = dyn FnMut(bool);

pub(crate) type Shared<T> = Rc<RefCell<Box<T>>>;

pub(crate) fn shared<T: ?Sized>(value: Box<T>) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// A registered job: sortable metadata next to its callback.
pub(crate) struct JobSlot<S: 'static> {
    pub(crate) job: RefCell<Job>,
    pub(crate) root_id: String,
    pub(crate) callback: RefCell<Box<JobCallback<S>>>,
}

/// Borrowed view used to feed the sorter without cloning jobs.
struct SlotView<'a, S: 'static> {
    job: Ref<'a, Job>,
    slot: &'a Rc<JobSlot<S>>,
}

impl<S: 'static> Deref for SlotView<'_, S> {
    type Target = Job;

    fn deref(&self) -> &Job {
        &self.job
    }
}

/// One rendering surface with its own job set.
pub(crate) struct Root<S: 'static> {
    pub(crate) id: String,
    pub(crate) get_state: Rc<StateFn<S>>,
    pub(crate) on_error: Option<Shared<ErrorHandler>>,
    pub(crate) jobs: HashMap<String, Rc<JobSlot<S>>>,
    pub(crate) sorted_jobs: Rc<[Rc<JobSlot<S>>]>,
    pub(crate) needs_rebuild: bool,
    pub(crate) takeover_count: u32,
    pub(crate) parents: Vec<String>,
}

impl<S: 'static> Root<S> {
    pub(crate) fn new(
        id: String,
        get_state: Rc<StateFn<S>>,
        on_error: Option<Shared<ErrorHandler>>,
        parents: Vec<String>,
    ) -> Self {
        Self {
            id,
            get_state,
            on_error,
            jobs: HashMap::new(),
            sorted_jobs: Rc::from(Vec::new()),
            needs_rebuild: false,
            takeover_count: 0,
            parents,
        }
    }

    /// Returns the dispatch order, rebuilding it first if it is stale.
    pub(crate) fn sorted(&mut self, phases: &PhaseGraph) -> Rc<[Rc<JobSlot<S>>]> {
        if self.needs_rebuild {
            let borrowed: Vec<SlotView<'_, S>> = self
                .jobs
                .values()
                .map(|slot| SlotView {
                    job: slot.job.borrow(),
                    slot,
                })
                .collect();
            let sorted: Vec<Rc<JobSlot<S>>> = rebuild_sorted_jobs(&borrowed, phases)
                .into_iter()
                .map(|view| Rc::clone(view.slot))
                .collect();
            drop(borrowed);

            log::trace!(
                "Root '{}': rebuilt dispatch order ({} of {} jobs enabled)",
                self.id,
                sorted.len(),
                self.jobs.len()
            );
            self.sorted_jobs = Rc::from(sorted);
            self.needs_rebuild = false;
        }
        Rc::clone(&self.sorted_jobs)
    }
}

pub(crate) struct Hook {
    pub(crate) id: String,
    /// Distinguishes a hook from a later replacement with the same id.
    pub(crate) token: u64,
    pub(crate) callback: Shared<HookCallback>,
}

pub(crate) struct Listener {
    pub(crate) id: u64,
    pub(crate) callback: Shared<JobStateListener>,
}

/// The mutable state of one scheduler.
pub(crate) struct SchedulerState<S: 'static> {
    pub(crate) phases: PhaseGraph,
    /// Roots in registration order.
    pub(crate) roots: Vec<Root<S>>,
    /// Which root owns each job id.
    pub(crate) owners: HashMap<String, String>,
    pub(crate) next_job_index: u64,
    pub(crate) next_auto_id: u64,
    pub(crate) next_listener_id: u64,
    pub(crate) max_pending_frames: u32,
    pub(crate) default_drop: bool,

    pub(crate) frameloop: Frameloop,
    pub(crate) running: bool,
    pub(crate) pending_frames: u32,
    pub(crate) last_tick: Option<f64>,
    pub(crate) elapsed: f64,
    pub(crate) frame: u64,
    pub(crate) loop_ticks: u64,
    pub(crate) stats: FrameStats,

    pub(crate) before_hooks: Vec<Hook>,
    pub(crate) after_hooks: Vec<Hook>,
    pub(crate) idle_callbacks: Vec<(u64, Shared<IdleCallback>)>,
    pub(crate) listeners: HashMap<String, Vec<Listener>>,
    pub(crate) events: EventBus<SchedulerEvent>,
}

impl<S: 'static> SchedulerState<S> {
    pub(crate) fn root(&self, id: &str) -> Option<&Root<S>> {
        self.roots.iter().find(|root| root.id == id)
    }

    pub(crate) fn root_mut(&mut self, id: &str) -> Option<&mut Root<S>> {
        self.roots.iter_mut().find(|root| root.id == id)
    }

    /// Finds a job and its root by id, anywhere in the scheduler.
    pub(crate) fn find_job(&self, job_id: &str) -> Option<Rc<JobSlot<S>>> {
        let root_id = self.owners.get(job_id)?;
        self.root(root_id)?.jobs.get(job_id).cloned()
    }

    /// Removes a job from whichever root owns it.
    pub(crate) fn remove_job(&mut self, job_id: &str) -> Option<Rc<JobSlot<S>>> {
        let root_id = self.owners.remove(job_id)?;
        let root = self.root_mut(&root_id)?;
        let slot = root.jobs.remove(job_id)?;
        root.needs_rebuild = true;
        self.events.publish(SchedulerEvent::JobUnregistered {
            job_id: job_id.to_string(),
            root_id,
        });
        Some(slot)
    }

    pub(crate) fn mark_all_dirty(&mut self) {
        for root in &mut self.roots {
            root.needs_rebuild = true;
        }
    }

    /// Snapshot of a stage's hooks, taken so none of them runs under a borrow.
    pub(crate) fn hooks(&self, stage: HookStage) -> Vec<(String, Shared<HookCallback>)> {
        let hooks = match stage {
            HookStage::Before => &self.before_hooks,
            HookStage::After => &self.after_hooks,
        };
        hooks
            .iter()
            .map(|hook| (hook.id.clone(), Rc::clone(&hook.callback)))
            .collect()
    }

    pub(crate) fn hooks_mut(&mut self, stage: HookStage) -> &mut Vec<Hook> {
        match stage {
            HookStage::Before => &mut self.before_hooks,
            HookStage::After => &mut self.after_hooks,
        }
    }

    pub(crate) fn listeners_for(&self, job_id: &str) -> Vec<Shared<JobStateListener>> {
        self.listeners
            .get(job_id)
            .map(|listeners| {
                listeners
                    .iter()
                    .map(|listener| Rc::clone(&listener.callback))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Roots reached from `root_id` through the explicit parent lists,
    /// `root_id` included. Cycles in the lists are tolerated.
    pub(crate) fn ownership_chain(&self, root_id: &str) -> Vec<String> {
        let mut chain: Vec<String> = Vec::new();
        let mut pending = vec![root_id.to_string()];
        while let Some(id) = pending.pop() {
            if chain.contains(&id) {
                continue;
            }
            if let Some(root) = self.root(&id) {
                pending.extend(root.parents.iter().cloned());
                chain.push(id);
            }
        }
        chain
    }
}
