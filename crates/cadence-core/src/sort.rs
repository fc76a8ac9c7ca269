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

//! Builds the execution order of one root's jobs.

use crate::graph::topological_sort::stable_topological_sort;
use crate::job::Job;
use crate::phase::PhaseGraph;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::ops::Deref;

/// Orders the enabled jobs of one root for dispatch.
///
/// Jobs are bucketed by phase in the graph's order; buckets for phases the
/// graph does not know are appended after every known phase, ordered by
/// their earliest-registered job. Inside a bucket jobs run by descending
/// priority, then ascending insertion index. A bucket whose jobs reference
/// each other through `before`/`after` is ordered topologically instead,
/// ties still broken by priority and index. A cycle is logged and its jobs
/// are appended in registration order.
///
/// The function only reads its inputs; the same inputs always yield the
/// same order.
pub fn rebuild_sorted_jobs<'a, J>(jobs: &'a [J], graph: &PhaseGraph) -> Vec<&'a J>
where
    J: Deref<Target = Job>,
{
    let phases = graph.ordered_phases();
    let mut known: Vec<Vec<&'a J>> = vec![Vec::new(); phases.len()];
    let mut unknown: HashMap<&'a str, Vec<&'a J>> = HashMap::new();

    for job in jobs.iter().filter(|job| job.enabled) {
        match phases.iter().position(|phase| *phase == job.phase) {
            Some(position) => known[position].push(job),
            None => unknown.entry(job.phase.as_str()).or_default().push(job),
        }
    }

    let mut unknown: Vec<(&'a str, Vec<&'a J>)> = unknown.into_iter().collect();
    if !unknown.is_empty() {
        log::debug!(
            "Sorter: {} job bucket(s) use phases unknown to the graph; running them last",
            unknown.len()
        );
    }
    unknown.sort_by_key(|(phase, bucket)| {
        let first = bucket.iter().map(|job| job.index).min().unwrap_or(u64::MAX);
        (first, *phase)
    });

    let mut sorted = Vec::with_capacity(jobs.len());
    for bucket in known
        .into_iter()
        .chain(unknown.into_iter().map(|(_, bucket)| bucket))
    {
        sorted.extend(sort_bucket(bucket));
    }
    sorted
}

fn sort_bucket<'a, J>(mut bucket: Vec<&'a J>) -> Vec<&'a J>
where
    J: Deref<Target = Job>,
{
    bucket.sort_by_key(|job| (Reverse(job.priority), job.index));
    if bucket.len() < 2 {
        return bucket;
    }

    let positions: HashMap<&str, usize> = bucket
        .iter()
        .enumerate()
        .map(|(position, job)| (job.id.as_str(), position))
        .collect();

    let mut edges = Vec::new();
    for (position, job) in bucket.iter().enumerate() {
        for target in &job.before {
            if let Some(&other) = positions.get(target.as_str()) {
                edges.push((position, other));
            }
        }
        for target in &job.after {
            if let Some(&other) = positions.get(target.as_str()) {
                edges.push((other, position));
            }
        }
    }

    if edges.is_empty() {
        return bucket;
    }

    let order = match stable_topological_sort(0..bucket.len(), edges) {
        Ok(order) => order,
        Err(cycle) => {
            let mut unresolved = cycle.unresolved;
            unresolved.sort_by_key(|&position| bucket[position].index);
            log::warn!(
                "Sorter: cyclic before/after constraints in phase '{}' between {:?}; \
                 falling back to registration order for them",
                bucket[0].phase,
                unresolved
                    .iter()
                    .map(|&position| bucket[position].id.as_str())
                    .collect::<Vec<_>>()
            );
            let mut order = cycle.sorted;
            order.extend(unresolved);
            order
        }
    };

    order.into_iter().map(|position| bucket[position]).collect()
}
