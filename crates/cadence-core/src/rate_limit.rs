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

//! Per-job FPS throttling.
//!
//! [`should_run`] is the only writer of [`Job::last_run`]. It decides whether
//! a job runs on the tick at `now` (milliseconds) and advances its timing
//! bookkeeping when it does. At most one run is granted per call: catch-up
//! only moves the timestamp used for the next decision.

use crate::job::Job;

/// Decides whether `job` runs at `now`, updating `last_run` when it does.
pub fn should_run(job: &mut Job, now: f64) -> bool {
    if !job.enabled {
        return false;
    }

    let Some(interval) = job.interval_ms() else {
        return true;
    };

    let Some(last_run) = job.last_run else {
        job.last_run = Some(now);
        return true;
    };

    let since = now - last_run;
    if since < 0.0 {
        // The host clock went backwards; resync instead of stalling forever.
        log::debug!(
            "Job '{}': tick time {now} precedes last run {last_run}, resyncing",
            job.id
        );
        job.last_run = Some(now);
        return false;
    }
    if since < interval {
        return false;
    }

    if job.drop {
        job.last_run = Some(now);
    } else {
        let owed = (since / interval).floor();
        let mut next = last_run + owed * interval;
        if now - next > interval {
            next = now;
        }
        job.last_run = Some(next);
    }

    true
}

/// Clears the timing state so a re-enabled job has no stale backlog.
pub fn reset_job_timing(job: &mut Job) {
    job.last_run = None;
}
