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

// Cadence Sandbox
// Drives a scheduler headlessly: phased jobs, a throttled job, then demand mode.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use cadence_core::{Frameloop, HookStage, JobOptions, PhaseOptions};
use cadence_scheduler::{FrameDriver, RootOptions, Scheduler, SchedulerConfig, SystemClock};

/// The state the "main" root hands to its jobs every tick.
#[derive(Clone)]
struct World {
    position: Rc<Cell<f64>>,
    velocity: f64,
}

fn build_scheduler() -> Result<Scheduler<World>> {
    let config = match std::env::args().nth(1) {
        Some(path) => SchedulerConfig::from_ron_file(path)?,
        None => SchedulerConfig::default(),
    };
    log::info!(
        "Sandbox: {} mode, phases {:?}",
        config.frameloop,
        config.phases
    );
    Ok(Scheduler::with_config(config, SystemClock::new()))
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let scheduler = build_scheduler()?;
    let world = World {
        position: Rc::new(Cell::new(0.0)),
        velocity: 2.5,
    };
    let root_state = world.clone();
    let _root = scheduler.register_root(
        "main",
        RootOptions::new(move || root_state.clone())
            .on_error(|error| log::error!("Sandbox: {error}")),
    );

    // --- Jobs, registered out of phase order on purpose ---
    let _draw = scheduler.register(
        |state, _| {
            log::debug!("draw frame {} at x={:.3}", state.frame, state.position.get());
            Ok(())
        },
        JobOptions::new().id("draw").phase("render"),
    );
    let _integrate = scheduler.register(
        |state, delta| {
            state.position.set(state.position.get() + state.velocity * delta);
            Ok(())
        },
        JobOptions::new().id("integrate").phase("physics"),
    );
    let _telemetry = scheduler.register(
        |state, _| {
            log::info!(
                "telemetry: frame {} elapsed {:.2}s x={:.3}",
                state.frame,
                state.elapsed,
                state.position.get()
            );
            Ok(())
        },
        JobOptions::new().id("telemetry").phase("finish").fps(4.0),
    );

    scheduler.add_phase("post", PhaseOptions::after("render"));
    let _bloom = scheduler.register(
        |_, _| Ok(()),
        JobOptions::new().id("bloom").phase("post"),
    );
    let _flaky = scheduler.register(
        |state, _| {
            if state.frame % 30 == 0 {
                anyhow::bail!("dropped a packet on frame {}", state.frame);
            }
            Ok(())
        },
        JobOptions::new().id("network").phase("input"),
    );
    let _present = scheduler.register_global(HookStage::After, "present", |_| Ok(()));

    log::info!("Sandbox: phase order {:?}", scheduler.phases());

    // --- Continuous loop for about one second ---
    let driver = FrameDriver::new(60.0);
    if scheduler.frameloop() == Frameloop::Never {
        scheduler.set_frameloop(Frameloop::Always);
    }
    let report = driver.run(&scheduler, |s| s.elapsed() >= 1.0 || !s.is_running());
    log::info!(
        "Sandbox: continuous run: {} ticks in {:?}",
        report.ticks,
        report.wall_time
    );

    // --- Demand mode: three frames, then idle ---
    scheduler.set_frameloop(Frameloop::Demand);
    let idle = scheduler.on_idle(|timestamp| log::info!("Sandbox: idle at {timestamp:.1}ms"));
    scheduler.invalidate_frames(3, false);
    let report = driver.clone().with_idle_limit(5).run(&scheduler, |_| false);
    log::info!("Sandbox: demand run: {} ticks", report.ticks);
    idle.unregister();

    let stats = scheduler.frame_stats();
    log::info!(
        "Sandbox: {} ticks, avg {:.1} fps, jitter {:.6}, final x={:.3}",
        stats.ticks(),
        stats.average_fps(),
        stats.jitter(),
        world.position.get()
    );
    Ok(())
}
