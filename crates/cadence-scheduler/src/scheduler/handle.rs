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

//! Handles returned by registrations.
//!
//! Handles hold a [`WeakScheduler`] so they never keep a scheduler alive.
//! Dropping a handle does not unregister anything; call `unregister` (or
//! `cancel`) explicitly. Once the scheduler is gone every operation is a
//! no-op.

use super::{Scheduler, WeakScheduler};
use cadence_core::{HookStage, JobUpdate};

/// Handle to a registered root.
pub struct RootHandle<S: 'static = ()> {
    scheduler: WeakScheduler<S>,
    id: Option<String>,
}

impl<S: 'static> RootHandle<S> {
    pub(crate) fn new(scheduler: WeakScheduler<S>, id: String) -> Self {
        Self {
            scheduler,
            id: Some(id),
        }
    }

    pub(crate) fn detached(scheduler: WeakScheduler<S>) -> Self {
        Self {
            scheduler,
            id: None,
        }
    }

    /// The root id, or `None` if the registration was rejected.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns `true` if the registration was accepted.
    pub fn is_attached(&self) -> bool {
        self.id.is_some()
    }

    /// Removes the root and all of its jobs.
    pub fn unregister(&self) -> bool {
        match (&self.id, self.scheduler.upgrade()) {
            (Some(id), Some(scheduler)) => scheduler.unregister_root(id),
            _ => false,
        }
    }
}

/// Handle to a registered job.
///
/// A handle only controls the registration that produced it: once the id is
/// re-registered, the old handle stops affecting it.
pub struct JobHandle<S: 'static = ()> {
    scheduler: WeakScheduler<S>,
    id: Option<String>,
    index: u64,
}

impl<S: 'static> Clone for JobHandle<S> {
    fn clone(&self) -> Self {
        Self {
            scheduler: self.scheduler.clone(),
            id: self.id.clone(),
            index: self.index,
        }
    }
}

impl<S: 'static> JobHandle<S> {
    pub(crate) fn new(scheduler: WeakScheduler<S>, id: String, index: u64) -> Self {
        Self {
            scheduler,
            id: Some(id),
            index,
        }
    }

    pub(crate) fn detached(scheduler: WeakScheduler<S>) -> Self {
        Self {
            scheduler,
            id: None,
            index: u64::MAX,
        }
    }

    /// The job id, or `None` for a rejected registration.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns `true` while this handle's registration is live.
    pub fn is_registered(&self) -> bool {
        self.live().is_some()
    }

    fn live(&self) -> Option<(Scheduler<S>, &str)> {
        let id = self.id.as_deref()?;
        let scheduler = self.scheduler.upgrade()?;
        (scheduler.job_index(id) == Some(self.index)).then_some((scheduler, id))
    }

    /// Removes the job.
    pub fn unregister(&self) -> bool {
        self.live()
            .is_some_and(|(scheduler, id)| scheduler.unregister(id, None))
    }

    /// Runs the job once right now, bypassing its rate limit and pause state.
    pub fn step(&self, timestamp: Option<f64>) -> bool {
        self.live()
            .is_some_and(|(scheduler, id)| scheduler.step_job(id, timestamp))
    }

    /// Disables the job.
    pub fn pause(&self) -> bool {
        self.live()
            .is_some_and(|(scheduler, id)| scheduler.pause_job(id))
    }

    /// Re-enables the job.
    pub fn resume(&self) -> bool {
        self.live()
            .is_some_and(|(scheduler, id)| scheduler.resume_job(id))
    }

    /// Returns `true` if the job is registered and disabled.
    pub fn is_paused(&self) -> bool {
        self.live()
            .is_some_and(|(scheduler, id)| scheduler.is_job_paused(id))
    }

    /// Applies a partial update to the job.
    pub fn update(&self, update: JobUpdate) -> bool {
        self.live()
            .is_some_and(|(scheduler, id)| scheduler.update_job(id, update))
    }

    /// Subscribes to this job's pause/resume transitions.
    pub fn subscribe(&self, listener: impl FnMut(bool) + 'static) -> Option<Subscription<S>> {
        let (scheduler, id) = self.live()?;
        Some(scheduler.subscribe_job_state(id, listener))
    }
}

/// Handle to a global hook or an idle callback.
pub struct HookHandle<S: 'static = ()> {
    scheduler: WeakScheduler<S>,
    target: HookTarget,
}

#[derive(Clone, Copy)]
enum HookTarget {
    Global { stage: HookStage, token: u64 },
    Idle(u64),
}

impl<S: 'static> HookHandle<S> {
    pub(crate) fn global(scheduler: WeakScheduler<S>, stage: HookStage, token: u64) -> Self {
        Self {
            scheduler,
            target: HookTarget::Global { stage, token },
        }
    }

    pub(crate) fn idle(scheduler: WeakScheduler<S>, token: u64) -> Self {
        Self {
            scheduler,
            target: HookTarget::Idle(token),
        }
    }

    /// Removes the callback. Has no effect if it was already replaced.
    pub fn unregister(&self) -> bool {
        let Some(scheduler) = self.scheduler.upgrade() else {
            return false;
        };
        match self.target {
            HookTarget::Global { stage, token } => scheduler.unregister_global_token(stage, token),
            HookTarget::Idle(token) => scheduler.remove_idle(token),
        }
    }
}

/// A pause/resume subscription.
pub struct Subscription<S: 'static = ()> {
    scheduler: WeakScheduler<S>,
    job_id: String,
    id: u64,
}

impl<S: 'static> Subscription<S> {
    pub(crate) fn new(scheduler: WeakScheduler<S>, job_id: String, id: u64) -> Self {
        Self {
            scheduler,
            job_id,
            id,
        }
    }

    /// The observed job id.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Stops the listener from receiving further transitions.
    pub fn cancel(&self) -> bool {
        self.scheduler
            .upgrade()
            .is_some_and(|scheduler| scheduler.unsubscribe(&self.job_id, self.id))
    }
}
