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

use cadence_core::phase::{PhaseGraph, PhaseOptions};
use cadence_core::{rebuild_sorted_jobs, should_run, Job};
use std::sync::{Mutex, OnceLock};

/// Keeps every warning logged by this test binary.
struct WarningLog(Mutex<Vec<String>>);

impl log::Log for WarningLog {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            if let Ok(mut lines) = self.0.lock() {
                lines.push(record.args().to_string());
            }
        }
    }

    fn flush(&self) {}
}

fn warnings() -> &'static WarningLog {
    static LOGGER: OnceLock<&'static WarningLog> = OnceLock::new();
    LOGGER.get_or_init(|| {
        let logger: &'static WarningLog = Box::leak(Box::new(WarningLog(Mutex::new(Vec::new()))));
        let _ = log::set_logger(logger);
        log::set_max_level(log::LevelFilter::Warn);
        logger
    })
}

fn ids<'a>(sorted: &[&'a Job]) -> Vec<&'a str> {
    sorted.iter().map(|job| job.id.as_str()).collect()
}

#[test]
fn test_phase_order_wins_over_registration_order() {
    // --- 1. ARRANGE ---
    let physics = Job::new("physics", 0).with_phase("physics");
    let render = Job::new("render", 1).with_phase("render");
    let update = Job::new("update", 2).with_phase("update");
    let jobs = [&physics, &render, &update];

    // --- 2. ACT ---
    let sorted = rebuild_sorted_jobs(&jobs, &PhaseGraph::new());

    // --- 3. ASSERT ---
    let order: Vec<&str> = sorted.iter().map(|job| job.id.as_str()).collect();
    assert_eq!(order, ["physics", "update", "render"]);
}

#[test]
fn test_priority_ten_always_precedes_priority_one() {
    for registration in [[10, 1], [1, 10]] {
        let first = Job::new(format!("p{}", registration[0]), 0).with_priority(registration[0]);
        let second = Job::new(format!("p{}", registration[1]), 1).with_priority(registration[1]);
        let jobs = [&first, &second];
        let sorted = rebuild_sorted_jobs(&jobs, &PhaseGraph::new());
        assert_eq!(sorted[0].id, "p10", "registration order {registration:?}");
    }
}

#[test]
fn test_three_job_cycle_yields_each_job_exactly_once() {
    let a = Job::new("a", 0).with_before("b");
    let b = Job::new("b", 1).with_before("c");
    let c = Job::new("c", 2).with_before("a");
    let jobs = [&a, &b, &c];

    let sorted = rebuild_sorted_jobs(&jobs, &PhaseGraph::new());
    let mut seen = ids(&sorted.iter().map(|job| **job).collect::<Vec<_>>());
    assert_eq!(seen.len(), 3);
    seen.sort_unstable();
    assert_eq!(seen, ["a", "b", "c"]);
}

#[test]
fn test_cycle_is_reported_as_warning() {
    let logger = warnings();
    let spin = Job::new("spin", 0).with_phase("render").with_after("draw");
    let draw = Job::new("draw", 1).with_phase("render").with_after("blit");
    let blit = Job::new("blit", 2).with_phase("render").with_after("spin");
    let jobs = [&spin, &draw, &blit];

    let sorted = rebuild_sorted_jobs(&jobs, &PhaseGraph::new());

    assert_eq!(ids(&sorted.iter().map(|job| **job).collect::<Vec<_>>()), ["spin", "draw", "blit"]);
    let lines = logger.0.lock().map(|lines| lines.clone()).unwrap_or_default();
    assert!(
        lines.iter().any(|line| line.contains("cyclic")
            && line.contains("'render'")
            && line.contains(r#"["spin", "draw", "blit"]"#)),
        "warnings: {lines:?}"
    );
}

#[test]
fn test_synthetic_constraint_phase_orders_relative_to_anchor() {
    let mut graph = PhaseGraph::new();
    let phase = graph.resolve_constraint_phase(None, Some("render"));
    graph.add_phase("post", PhaseOptions::after("render"));

    let overlay = Job::new("overlay", 0).with_phase(phase);
    let draw = Job::new("draw", 1).with_phase("render");
    let post = Job::new("post", 2).with_phase("post");
    let jobs = [&post, &overlay, &draw];

    let sorted = rebuild_sorted_jobs(&jobs, &graph);
    let order: Vec<&str> = sorted.iter().map(|job| job.id.as_str()).collect();
    assert_eq!(order, ["draw", "post", "overlay"]);
}

#[test]
fn test_fps_ten_drop_scenario() {
    let mut job = Job::new("throttled", 0).with_fps(10.0, true);
    assert!(should_run(&mut job, 0.0));
    assert!(!should_run(&mut job, 50.0));
    assert!(should_run(&mut job, 150.0));
    assert_eq!(job.last_run, Some(150.0));
}
