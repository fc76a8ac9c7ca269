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

//! Scheduler events for observers that prefer a channel over callbacks.

mod bus;

pub use self::bus::EventBus;

/// Something observable happened inside the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    /// A root was registered.
    RootRegistered {
        /// The new root.
        root_id: String,
    },
    /// A root and all its jobs were removed.
    RootUnregistered {
        /// The removed root.
        root_id: String,
    },
    /// A job was registered (or replaced an older job with the same id).
    JobRegistered {
        /// The new job.
        job_id: String,
        /// Its owning root.
        root_id: String,
    },
    /// A job was removed.
    JobUnregistered {
        /// The removed job.
        job_id: String,
        /// Its former root.
        root_id: String,
    },
    /// A job was disabled.
    JobPaused {
        /// The paused job.
        job_id: String,
    },
    /// A job was re-enabled.
    JobResumed {
        /// The resumed job.
        job_id: String,
    },
    /// The tick loop started.
    LoopStarted,
    /// The tick loop stopped.
    LoopStopped,
    /// A demand-mode loop ran out of pending frames.
    LoopIdle {
        /// Timestamp (ms) of the last tick before going idle.
        timestamp: f64,
    },
}
