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

//! The ordered graph of named execution phases.
//!
//! Phases are coarse, append-once buckets. The graph keeps them in a flat
//! ordered list and memoizes a shared snapshot of that order, so callers can
//! detect a change of order with [`Rc::ptr_eq`] instead of comparing lists.

use crate::job::DEFAULT_PHASE;
use std::cell::RefCell;
use std::rc::Rc;

/// The canonical phases every graph starts with, in execution order.
pub const DEFAULT_PHASES: [&str; 6] = ["start", "input", "physics", "update", "render", "finish"];

/// Where to insert a new phase relative to an existing one.
///
/// When both anchors are given, `before` wins. When neither is given, or
/// the anchor does not exist, the phase is appended at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseOptions {
    /// Insert immediately before this phase.
    pub before: Option<String>,
    /// Insert immediately after this phase.
    pub after: Option<String>,
}

impl PhaseOptions {
    /// Anchors the new phase immediately before `phase`.
    pub fn before(phase: impl Into<String>) -> Self {
        Self {
            before: Some(phase.into()),
            after: None,
        }
    }

    /// Anchors the new phase immediately after `phase`.
    pub fn after(phase: impl Into<String>) -> Self {
        Self {
            before: None,
            after: Some(phase.into()),
        }
    }
}

/// An ordered sequence of unique phase names.
#[derive(Debug, Clone)]
pub struct PhaseGraph {
    phases: Vec<String>,
    default_phase: String,
    ordered: RefCell<Option<Rc<[String]>>>,
}

impl PhaseGraph {
    /// Creates a graph seeded with [`DEFAULT_PHASES`].
    pub fn new() -> Self {
        Self::with_phases(DEFAULT_PHASES, DEFAULT_PHASE)
    }

    /// Creates a graph seeded with a custom phase list.
    ///
    /// Duplicate names are skipped. If `default_phase` is missing from the
    /// list it is appended so jobs without a phase always have a home.
    pub fn with_phases<I, T>(phases: I, default_phase: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut graph = Self {
            phases: Vec::new(),
            default_phase: default_phase.into(),
            ordered: RefCell::new(None),
        };
        for phase in phases {
            let phase = phase.into();
            if graph.has_phase(&phase) {
                log::warn!("PhaseGraph: duplicate seed phase '{phase}' ignored");
                continue;
            }
            graph.phases.push(phase);
        }
        if !graph.has_phase(&graph.default_phase) {
            log::warn!(
                "PhaseGraph: default phase '{}' missing from seed, appending it",
                graph.default_phase
            );
            let default_phase = graph.default_phase.clone();
            graph.phases.push(default_phase);
        }
        graph
    }

    /// Inserts `name` relative to an existing phase.
    ///
    /// Returns `false`, after logging a warning, if the phase already exists.
    pub fn add_phase(&mut self, name: &str, options: PhaseOptions) -> bool {
        if self.has_phase(name) {
            log::warn!("PhaseGraph: phase '{name}' already exists, ignoring");
            return false;
        }

        let position = match (&options.before, &options.after) {
            (Some(anchor), _) => self.position(anchor),
            (None, Some(anchor)) => self.position(anchor).map(|index| index + 1),
            (None, None) => Some(self.phases.len()),
        };

        let index = position.unwrap_or_else(|| {
            log::warn!(
                "PhaseGraph: anchor for phase '{name}' not found ({options:?}), appending"
            );
            self.phases.len()
        });

        self.phases.insert(index, name.to_string());
        *self.ordered.get_mut() = None;
        log::debug!("PhaseGraph: added phase '{name}' at position {index}");
        true
    }

    /// Returns `true` if `name` is a known phase.
    pub fn has_phase(&self, name: &str) -> bool {
        self.phases.iter().any(|phase| phase == name)
    }

    /// Returns the position of `name` in execution order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.phases.iter().position(|phase| phase == name)
    }

    /// Returns the phase used for jobs that specify none.
    pub fn default_phase(&self) -> &str {
        &self.default_phase
    }

    /// Returns the number of phases.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Returns `true` if the graph holds no phases.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Returns the phases in execution order.
    ///
    /// The same allocation is returned until the next [`add_phase`](Self::add_phase).
    pub fn ordered_phases(&self) -> Rc<[String]> {
        self.ordered
            .borrow_mut()
            .get_or_insert_with(|| Rc::from(self.phases.as_slice()))
            .clone()
    }

    /// Resolves a raw before/after constraint into a phase name.
    ///
    /// A constraint that names a known phase yields a synthetic
    /// `before:<phase>` or `after:<phase>` phase, created next to its anchor
    /// on first use. Anything else resolves to the default phase.
    pub fn resolve_constraint_phase(&mut self, before: Option<&str>, after: Option<&str>) -> String {
        if let Some(target) = before.filter(|target| self.has_phase(target)) {
            let name = format!("before:{target}");
            if !self.has_phase(&name) {
                self.add_phase(&name, PhaseOptions::before(target));
            }
            return name;
        }
        if let Some(target) = after.filter(|target| self.has_phase(target)) {
            let name = format!("after:{target}");
            if !self.has_phase(&name) {
                self.add_phase(&name, PhaseOptions::after(target));
            }
            return name;
        }
        self.default_phase.clone()
    }
}

impl Default for PhaseGraph {
    fn default() -> Self {
        Self::new()
    }
}
