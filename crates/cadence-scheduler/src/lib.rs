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

//! # Cadence Scheduler
//!
//! A cooperative, single-threaded per-tick job scheduler. Jobs register
//! against a root, run once per tick in phase order, and can be prioritized,
//! constrained relative to each other, throttled, paused or stepped.
//!
//! The scheduler never owns a timer. The host calls
//! [`Scheduler::host_tick`] from its frame callback, or uses
//! [`driver::FrameDriver`] to pace ticks on the current thread.

#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod driver;
mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, SchedulerConfig};
pub use driver::{DriverReport, FrameDriver};
pub use scheduler::{
    ErrorHandler, HookCallback, HookHandle, IdleCallback, JobCallback, JobHandle,
    JobStateListener, RootHandle, RootOptions, Scheduler, StateFn, Subscription, WeakScheduler,
};

pub use cadence_core::{
    FrameState, FrameStats, Frameloop, HookStage, Job, JobOptions, JobUpdate, PhaseOptions,
    SchedulerError, SchedulerEvent,
};
