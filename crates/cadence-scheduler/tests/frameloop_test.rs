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

use cadence_scheduler::{
    Frameloop, JobOptions, ManualClock, RootOptions, Scheduler, SchedulerConfig, SchedulerEvent,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn scheduler_in(mode: Frameloop) -> Scheduler {
    let config = SchedulerConfig {
        frameloop: mode,
        ..SchedulerConfig::default()
    };
    Scheduler::with_config(config, ManualClock::new(0.0))
}

fn counting_job(scheduler: &Scheduler) -> Rc<Cell<u32>> {
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    let _job = scheduler.register(
        move |_, _| {
            counter.set(counter.get() + 1);
            Ok(())
        },
        JobOptions::new().id("counter"),
    );
    runs
}

#[test]
fn test_always_mode_follows_root_lifetime() {
    let scheduler = scheduler_in(Frameloop::Always);
    assert!(!scheduler.is_running());

    let root = scheduler.register_root("main", RootOptions::default());
    assert!(scheduler.is_running());
    let runs = counting_job(&scheduler);

    assert!(scheduler.host_tick(0.0));
    assert!(scheduler.host_tick(16.0));
    assert_eq!(runs.get(), 2);

    assert!(root.unregister());
    assert!(!scheduler.is_running());
    assert!(!scheduler.host_tick(32.0));
    assert_eq!(runs.get(), 2);
}

#[test]
fn test_start_and_stop_are_idempotent() {
    let scheduler = scheduler_in(Frameloop::Always);
    let events = scheduler.events();
    scheduler.start();
    scheduler.start();
    scheduler.stop();
    scheduler.stop();

    let loop_events: Vec<SchedulerEvent> = events.try_iter().collect();
    assert_eq!(
        loop_events,
        [SchedulerEvent::LoopStarted, SchedulerEvent::LoopStopped]
    );
}

#[test]
fn test_demand_invalidate_runs_one_frame_then_idles() {
    // --- 1. ARRANGE ---
    let scheduler = scheduler_in(Frameloop::Demand);
    let _root = scheduler.register_root("main", RootOptions::default());
    let runs = counting_job(&scheduler);
    let idle_at = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&idle_at);
    let _idle = scheduler.on_idle(move |timestamp| sink.borrow_mut().push(timestamp));
    assert!(!scheduler.is_running());
    assert!(!scheduler.host_tick(0.0));

    // --- 2. ACT ---
    scheduler.invalidate();
    assert!(scheduler.is_running());
    let ticked = scheduler.host_tick(16.0);

    // --- 3. ASSERT ---
    assert!(ticked);
    assert_eq!(runs.get(), 1);
    assert!(!scheduler.is_running());
    assert_eq!(*idle_at.borrow(), [16.0]);

    assert!(!scheduler.host_tick(32.0));
    assert_eq!(runs.get(), 1);
    assert_eq!(idle_at.borrow().len(), 1);
}

#[test]
fn test_demand_frames_set_stack_and_cap() {
    let scheduler = scheduler_in(Frameloop::Demand);
    let _root = scheduler.register_root("main", RootOptions::default());

    scheduler.invalidate_frames(3, false);
    assert_eq!(scheduler.pending_frames(), 3);
    scheduler.invalidate_frames(2, false);
    assert_eq!(scheduler.pending_frames(), 3);
    scheduler.invalidate_frames(2, true);
    assert_eq!(scheduler.pending_frames(), 5);
    scheduler.invalidate_frames(500, true);
    assert_eq!(scheduler.pending_frames(), 60);

    let mut ticks = 0;
    while scheduler.host_tick(ticks as f64 * 16.0) {
        ticks += 1;
    }
    assert_eq!(ticks, 60);
    assert_eq!(scheduler.pending_frames(), 0);
}

#[test]
fn test_demand_job_can_keep_requesting_frames() {
    // --- 1. ARRANGE ---
    let scheduler = scheduler_in(Frameloop::Demand);
    let _root = scheduler.register_root("main", RootOptions::default());
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    let weak = scheduler.downgrade();
    let _animate = scheduler.register(
        move |_, _| {
            counter.set(counter.get() + 1);
            if counter.get() < 4 {
                if let Some(scheduler) = weak.upgrade() {
                    scheduler.invalidate();
                }
            }
            Ok(())
        },
        JobOptions::new().id("animate"),
    );
    let idles = Rc::new(Cell::new(0));
    let idle_counter = Rc::clone(&idles);
    let _idle = scheduler.on_idle(move |_| idle_counter.set(idle_counter.get() + 1));

    // --- 2. ACT ---
    scheduler.invalidate();
    let mut timestamp = 0.0;
    while scheduler.host_tick(timestamp) {
        timestamp += 16.0;
    }

    // --- 3. ASSERT ---
    assert_eq!(runs.get(), 4);
    assert_eq!(idles.get(), 1);
    assert!(!scheduler.is_running());
    assert_eq!(scheduler.pending_frames(), 0);
}

#[test]
fn test_leaving_demand_mode_drops_pending_frames() {
    let scheduler = scheduler_in(Frameloop::Demand);
    let _root = scheduler.register_root("main", RootOptions::default());
    let runs = counting_job(&scheduler);

    scheduler.invalidate_frames(5, false);
    scheduler.set_frameloop(Frameloop::Always);
    assert_eq!(scheduler.pending_frames(), 0);
    scheduler.set_frameloop(Frameloop::Demand);
    assert!(!scheduler.is_running());
    assert!(!scheduler.host_tick(0.0));
    assert_eq!(runs.get(), 0);

    scheduler.invalidate_frames(5, false);
    scheduler.stop();
    assert_eq!(scheduler.pending_frames(), 0);
    // Restarting by hand still yields a single frame before idling.
    scheduler.start();
    assert!(scheduler.host_tick(16.0));
    assert!(!scheduler.is_running());
    assert_eq!(runs.get(), 1);
}

#[test]
fn test_invalidate_is_ignored_outside_demand_mode() {
    let scheduler = scheduler_in(Frameloop::Never);
    let _root = scheduler.register_root("main", RootOptions::default());
    scheduler.invalidate();
    assert_eq!(scheduler.pending_frames(), 0);
    assert!(!scheduler.is_running());
}

#[test]
fn test_never_mode_only_runs_manual_steps() {
    let scheduler = scheduler_in(Frameloop::Never);
    let _root = scheduler.register_root("main", RootOptions::default());
    let runs = counting_job(&scheduler);

    scheduler.start();
    assert!(!scheduler.is_running());
    assert!(!scheduler.host_tick(0.0));

    scheduler.step(Some(0.0));
    assert!(scheduler.step_job("counter", Some(1.0)));
    assert_eq!(runs.get(), 2);
}

#[test]
fn test_switching_modes_starts_and_stops_loop() {
    let scheduler = scheduler_in(Frameloop::Never);
    let _root = scheduler.register_root("main", RootOptions::default());

    scheduler.set_frameloop(Frameloop::Always);
    assert!(scheduler.is_running());

    scheduler.set_frameloop(Frameloop::Demand);
    assert!(!scheduler.is_running());
    scheduler.invalidate();
    assert!(scheduler.is_running());

    scheduler.set_frameloop(Frameloop::Never);
    assert!(!scheduler.is_running());
    assert_eq!(scheduler.frameloop(), Frameloop::Never);
}

#[test]
fn test_elapsed_excludes_stopped_time() {
    let scheduler = scheduler_in(Frameloop::Always);
    let _root = scheduler.register_root("main", RootOptions::default());

    scheduler.host_tick(0.0);
    scheduler.host_tick(100.0);
    scheduler.stop();
    scheduler.start();
    // The first tick after a restart has no delta, however long the gap.
    scheduler.host_tick(10_000.0);
    scheduler.host_tick(10_100.0);

    assert!((scheduler.elapsed() - 0.2).abs() < 1e-9);
    assert_eq!(scheduler.frame_count(), 4);
}

#[test]
fn test_frame_stats_track_tick_deltas() {
    let scheduler = scheduler_in(Frameloop::Always);
    let _root = scheduler.register_root("main", RootOptions::default());
    for tick in 0..5 {
        scheduler.host_tick(tick as f64 * 20.0);
    }

    let stats = scheduler.frame_stats();
    assert_eq!(stats.ticks(), 5);
    assert_eq!(stats.samples(), 4);
    assert!((stats.average_delta() - 0.02).abs() < 1e-9);
    assert!((stats.average_fps() - 50.0).abs() < 1e-6);
}

#[test]
fn test_step_uses_scheduler_clock() {
    let clock = ManualClock::new(500.0);
    let config = SchedulerConfig {
        frameloop: Frameloop::Never,
        ..SchedulerConfig::default()
    };
    let scheduler: Scheduler = Scheduler::with_config(config, clock.clone());
    let _root = scheduler.register_root("main", RootOptions::default());
    let times = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&times);
    let _job = scheduler.register(
        move |state, _| {
            sink.borrow_mut().push(state.time);
            Ok(())
        },
        JobOptions::new(),
    );

    scheduler.step(None);
    clock.advance(16.0);
    scheduler.step(None);
    assert_eq!(*times.borrow(), [500.0, 516.0]);
}

#[test]
fn test_lifecycle_events_are_published() {
    let scheduler = scheduler_in(Frameloop::Always);
    let events = scheduler.events();
    let root = scheduler.register_root("main", RootOptions::default());
    let job = scheduler.register(|_, _| Ok(()), JobOptions::new().id("tick"));
    job.pause();
    root.unregister();

    let received: Vec<SchedulerEvent> = events.try_iter().collect();
    assert_eq!(
        received,
        [
            SchedulerEvent::RootRegistered {
                root_id: "main".into()
            },
            SchedulerEvent::LoopStarted,
            SchedulerEvent::JobRegistered {
                job_id: "tick".into(),
                root_id: "main".into()
            },
            SchedulerEvent::JobPaused {
                job_id: "tick".into()
            },
            SchedulerEvent::JobUnregistered {
                job_id: "tick".into(),
                root_id: "main".into()
            },
            SchedulerEvent::RootUnregistered {
                root_id: "main".into()
            },
            SchedulerEvent::LoopStopped,
        ]
    );
}
