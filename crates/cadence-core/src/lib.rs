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

//! # Cadence Core
//!
//! Foundational crate for the Cadence frame scheduler. It holds the pieces
//! that carry no scheduler state of their own:
//!
//! - [`job`]: the data model of a registered per-tick job and its options.
//! - [`phase`]: the ordered graph of named execution phases.
//! - [`rate_limit`]: the per-job FPS throttle (drop vs. catch-up).
//! - [`sort`]: turns a job set and a phase graph into an execution order.
//! - [`graph`]: the stable topological sort used for intra-phase constraints.
//! - [`frame`]: the frame-state value handed to every callback, and loop modes.
//! - [`event`], [`metrics`], [`error`]: observability and failure taxonomy.

#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod frame;
pub mod graph;
pub mod job;
pub mod metrics;
pub mod phase;
pub mod rate_limit;
pub mod sort;

pub use error::{HookStage, SchedulerError};
pub use event::{EventBus, SchedulerEvent};
pub use frame::{FrameState, Frameloop, MAX_PENDING_FRAMES};
pub use job::{Job, JobOptions, JobUpdate, JobUpdateOutcome, DEFAULT_PHASE};
pub use metrics::FrameStats;
pub use phase::{PhaseGraph, PhaseOptions, DEFAULT_PHASES};
pub use rate_limit::{reset_job_timing, should_run};
pub use sort::rebuild_sorted_jobs;
