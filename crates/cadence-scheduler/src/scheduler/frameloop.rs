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

//! The tick loop: loop state, demand mode and per-tick dispatch.

use super::state::{ErrorHandler, JobSlot, Shared};
use super::Scheduler;
use cadence_core::{
    should_run, FrameState, Frameloop, HookStage, SchedulerError, SchedulerEvent,
};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

impl<S: 'static> Scheduler<S> {
    /// Starts the loop. Has no effect when already running or in `never` mode.
    ///
    /// The first tick after a start reports a zero delta.
    pub fn start(&self) {
        let mut state = self.inner.state.borrow_mut();
        if state.running {
            return;
        }
        if state.frameloop == Frameloop::Never {
            log::debug!("Scheduler: start ignored, frameloop is 'never'");
            return;
        }
        state.running = true;
        state.last_tick = None;
        state.loop_ticks = 0;
        state.events.publish(SchedulerEvent::LoopStarted);
        log::debug!("Scheduler: loop started ({} mode)", state.frameloop);
    }

    /// Stops the loop and drops any frames still owed in `demand` mode.
    pub fn stop(&self) {
        let mut state = self.inner.state.borrow_mut();
        // A stopped loop owes no frames.
        state.pending_frames = 0;
        if !state.running {
            return;
        }
        state.running = false;
        state.events.publish(SchedulerEvent::LoopStopped);
        log::debug!(
            "Scheduler: loop stopped after {} tick(s)",
            state.loop_ticks
        );
    }

    /// Returns `true` while the loop is running.
    pub fn is_running(&self) -> bool {
        self.inner.state.borrow().running
    }

    /// The current loop mode.
    pub fn frameloop(&self) -> Frameloop {
        self.inner.state.borrow().frameloop
    }

    /// Switches the loop mode, starting or stopping the loop to match.
    pub fn set_frameloop(&self, mode: Frameloop) {
        let (has_roots, pending) = {
            let mut state = self.inner.state.borrow_mut();
            if state.frameloop == mode {
                return;
            }
            log::debug!("Scheduler: frameloop {} -> {mode}", state.frameloop);
            if state.frameloop == Frameloop::Demand {
                state.pending_frames = 0;
            }
            state.frameloop = mode;
            (!state.roots.is_empty(), state.pending_frames)
        };
        match mode {
            Frameloop::Always if has_roots => self.start(),
            Frameloop::Always => {}
            Frameloop::Demand if pending > 0 => self.start(),
            Frameloop::Demand | Frameloop::Never => self.stop(),
        }
    }

    /// Requests one more frame in `demand` mode.
    pub fn invalidate(&self) {
        self.invalidate_frames(1, false);
    }

    /// Requests `frames` frames in `demand` mode.
    ///
    /// With `stack` the request adds to the pending count, otherwise the
    /// pending count is raised to at least `frames`. Either way it is capped
    /// at the configured maximum. Ignored in other modes.
    pub fn invalidate_frames(&self, frames: u32, stack: bool) {
        let should_start = {
            let mut state = self.inner.state.borrow_mut();
            if state.frameloop != Frameloop::Demand {
                log::trace!("Scheduler: invalidate ignored in {} mode", state.frameloop);
                return;
            }
            if frames == 0 {
                return;
            }
            let requested = if stack {
                state.pending_frames.saturating_add(frames)
            } else {
                state.pending_frames.max(frames)
            };
            state.pending_frames = requested.min(state.max_pending_frames);
            !state.running
        };
        if should_start {
            self.start();
        }
    }

    /// Frames still owed in `demand` mode.
    pub fn pending_frames(&self) -> u32 {
        self.inner.state.borrow().pending_frames
    }

    /// Total ticks executed over the scheduler's lifetime.
    pub fn frame_count(&self) -> u64 {
        self.inner.state.borrow().frame
    }

    /// Seconds of loop time accumulated from tick deltas.
    pub fn elapsed(&self) -> f64 {
        self.inner.state.borrow().elapsed
    }

    /// Entry point for the host's frame callback.
    ///
    /// Runs one tick if the loop is running and returns whether it did. In
    /// `demand` mode the tick consumes one pending frame before dispatch, so
    /// jobs may request further frames while it runs. When none remain after
    /// the tick the loop stops and the idle callbacks fire once.
    pub fn host_tick(&self, timestamp: f64) -> bool {
        {
            let mut state = self.inner.state.borrow_mut();
            if !state.running {
                return false;
            }
            if state.frameloop == Frameloop::Demand {
                state.pending_frames = state.pending_frames.saturating_sub(1);
            }
        }
        self.execute_frame(timestamp);

        let idle_callbacks = {
            let mut state = self.inner.state.borrow_mut();
            if state.frameloop != Frameloop::Demand || !state.running || state.pending_frames > 0 {
                return true;
            }
            state.running = false;
            state.events.publish(SchedulerEvent::LoopStopped);
            state.events.publish(SchedulerEvent::LoopIdle { timestamp });
            log::debug!("Scheduler: demand loop idle at {timestamp:.1}ms");
            state
                .idle_callbacks
                .iter()
                .map(|(_, callback)| Rc::clone(callback))
                .collect::<Vec<_>>()
        };
        for callback in idle_callbacks {
            match callback.try_borrow_mut() {
                Ok(mut callback) => (*callback)(timestamp),
                Err(_) => log::warn!("Scheduler: skipping re-entrant idle callback"),
            }
        }
        true
    }

    /// Runs one tick immediately, whatever the loop state.
    ///
    /// Without a timestamp the scheduler clock is read.
    pub fn step(&self, timestamp: Option<f64>) {
        let timestamp = timestamp.unwrap_or_else(|| self.now());
        self.execute_frame(timestamp);
    }

    /// Runs a single job once, bypassing its rate limit and pause state.
    ///
    /// The job's throttle timing is left untouched.
    pub fn step_job(&self, id: &str, timestamp: Option<f64>) -> bool {
        let timestamp = timestamp.unwrap_or_else(|| self.now());
        let found = {
            let state = self.inner.state.borrow();
            state.find_job(id).and_then(|slot| {
                let root = state.root(&slot.root_id)?;
                let delta = state
                    .last_tick
                    .map(|last| ((timestamp - last) / 1000.0).max(0.0))
                    .unwrap_or(0.0);
                let frame_state_parts = (delta, state.elapsed, state.frame);
                Some((
                    Rc::clone(&slot),
                    Rc::clone(&root.get_state),
                    root.on_error.clone(),
                    frame_state_parts,
                ))
            })
        };
        let Some((slot, get_state, on_error, (delta, elapsed, frame))) = found else {
            log::warn!("Scheduler: step_job: unknown job '{id}'");
            return false;
        };

        let frame_state = FrameState {
            time: timestamp,
            delta,
            elapsed,
            frame,
            root: get_state(),
        };
        if let Err(error) = self.invoke_job(&slot, &frame_state, delta) {
            self.report(on_error.as_ref(), error);
        }
        true
    }

    /// Routes an error to the most recently registered root's handler, or
    /// logs it when there is none.
    pub fn trigger_error(&self, error: impl Into<SchedulerError>) {
        let handler = {
            let state = self.inner.state.borrow();
            state.roots.last().and_then(|root| root.on_error.clone())
        };
        self.report(handler.as_ref(), error.into());
    }

    fn execute_frame(&self, timestamp: f64) {
        let (delta, elapsed, frame, root_ids) = {
            let mut state = self.inner.state.borrow_mut();
            let delta = state
                .last_tick
                .map(|last| ((timestamp - last) / 1000.0).max(0.0))
                .unwrap_or(0.0);
            state.last_tick = Some(timestamp);
            state.elapsed += delta;
            state.frame += 1;
            state.loop_ticks += 1;
            state.stats.record(delta);
            let root_ids: Vec<String> = state.roots.iter().map(|root| root.id.clone()).collect();
            (delta, state.elapsed, state.frame, root_ids)
        };

        self.run_hooks(HookStage::Before, timestamp);

        for root_id in root_ids {
            let captured = {
                let mut guard = self.inner.state.borrow_mut();
                let state = &mut *guard;
                let phases = &state.phases;
                state
                    .roots
                    .iter_mut()
                    .find(|root| root.id == root_id)
                    .map(|root| {
                        (
                            root.sorted(phases),
                            Rc::clone(&root.get_state),
                            root.on_error.clone(),
                        )
                    })
            };
            // Removed by an earlier callback this tick.
            let Some((jobs, get_state, on_error)) = captured else {
                continue;
            };

            let frame_state = FrameState {
                time: timestamp,
                delta,
                elapsed,
                frame,
                root: get_state(),
            };
            for slot in jobs.iter() {
                let due = should_run(&mut slot.job.borrow_mut(), timestamp);
                if !due {
                    continue;
                }
                if let Err(error) = self.invoke_job(slot, &frame_state, delta) {
                    self.report(on_error.as_ref(), error);
                }
            }
        }

        self.run_hooks(HookStage::After, timestamp);
    }

    fn invoke_job(
        &self,
        slot: &JobSlot<S>,
        frame_state: &FrameState<S>,
        delta: f64,
    ) -> Result<(), SchedulerError> {
        let Ok(mut callback) = slot.callback.try_borrow_mut() else {
            log::warn!(
                "Scheduler: job '{}' is already running; skipping nested call",
                slot.job.borrow().id
            );
            return Ok(());
        };
        let result = panic::catch_unwind(AssertUnwindSafe(|| (*callback)(frame_state, delta)));
        drop(callback);

        let job_id = slot.job.borrow().id.clone();
        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(SchedulerError::JobFailed {
                job_id,
                root_id: slot.root_id.clone(),
                error,
            }),
            Err(payload) => Err(SchedulerError::JobPanicked {
                job_id,
                root_id: slot.root_id.clone(),
                message: SchedulerError::panic_message(payload.as_ref()),
            }),
        }
    }

    fn run_hooks(&self, stage: HookStage, timestamp: f64) {
        let hooks = self.inner.state.borrow().hooks(stage);
        for (hook_id, callback) in hooks {
            let Ok(mut callback) = callback.try_borrow_mut() else {
                log::warn!("Scheduler: global {stage} hook '{hook_id}' is already running");
                continue;
            };
            let result = panic::catch_unwind(AssertUnwindSafe(|| (*callback)(timestamp)));
            drop(callback);

            let error = match result {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => SchedulerError::HookFailed {
                    stage,
                    hook_id,
                    error,
                },
                Err(payload) => SchedulerError::HookPanicked {
                    stage,
                    hook_id,
                    message: SchedulerError::panic_message(payload.as_ref()),
                },
            };
            self.trigger_error(error);
        }
    }

    fn report(&self, handler: Option<&Shared<ErrorHandler>>, error: SchedulerError) {
        let Some(handler) = handler else {
            log::error!("Scheduler: {error}");
            return;
        };
        log::warn!("Scheduler: {error}");
        match handler.try_borrow_mut() {
            Ok(mut handler) => (*handler)(&error),
            Err(_) => log::error!("Scheduler: error handler is busy, dropping: {error}"),
        }
    }
}
