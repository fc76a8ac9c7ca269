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

//! Rolling statistics over recent tick timings.

/// The last `N` tick deltas, in seconds, with a running sum.
///
/// Overwrites the oldest sample once full.
#[derive(Debug, Clone)]
struct DeltaWindow<const N: usize> {
    samples: [f64; N],
    /// Slot the next sample goes into.
    next: usize,
    len: usize,
    sum: f64,
}

impl<const N: usize> DeltaWindow<N> {
    fn new() -> Self {
        Self {
            samples: [0.0; N],
            next: 0,
            len: 0,
            sum: 0.0,
        }
    }

    fn push(&mut self, delta: f64) {
        if self.len == N {
            self.sum -= self.samples[self.next];
        } else {
            self.len += 1;
        }
        self.samples[self.next] = delta;
        self.sum += delta;
        self.next = (self.next + 1) % N;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn latest(&self) -> Option<f64> {
        (self.len > 0).then(|| self.samples[(self.next + N - 1) % N])
    }

    /// Samples from oldest to newest.
    fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let oldest = (self.next + N - self.len) % N;
        (0..self.len).map(move |offset| self.samples[(oldest + offset) % N])
    }

    fn mean(&self) -> f64 {
        if self.len == 0 {
            0.0
        } else {
            self.sum / self.len as f64
        }
    }

    /// Population variance; zero below two samples.
    fn variance(&self) -> f64 {
        if self.len < 2 {
            return 0.0;
        }
        let mean = self.mean();
        self.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / self.len as f64
    }

    fn extremes(&self) -> Option<(f64, f64)> {
        self.iter().fold(None, |acc, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
    }
}

impl<const N: usize> Default for DeltaWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Tick timing statistics over the last 120 ticks (2s at 60Hz).
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    deltas: DeltaWindow<120>,
    ticks: u64,
}

impl FrameStats {
    /// Creates empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the delta (seconds) of one tick.
    ///
    /// Zero deltas (the first tick after a start) count as ticks but are not
    /// sampled, so they cannot skew the rate.
    pub fn record(&mut self, delta: f64) {
        self.ticks += 1;
        if delta > 0.0 && delta.is_finite() {
            self.deltas.push(delta);
        }
    }

    /// Total ticks recorded.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of deltas currently sampled.
    pub fn samples(&self) -> usize {
        self.deltas.len()
    }

    /// Mean delta in seconds.
    pub fn average_delta(&self) -> f64 {
        self.deltas.mean()
    }

    /// Mean tick rate in frames per second, or `0.0` without samples.
    pub fn average_fps(&self) -> f64 {
        let avg = self.average_delta();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    /// Shortest sampled delta in seconds, or `0.0` without samples.
    pub fn min_delta(&self) -> f64 {
        self.deltas.extremes().map_or(0.0, |(lo, _)| lo)
    }

    /// Longest sampled delta in seconds, or `0.0` without samples.
    pub fn max_delta(&self) -> f64 {
        self.deltas.extremes().map_or(0.0, |(_, hi)| hi)
    }

    /// Variance of the sampled deltas; high values indicate stutter.
    pub fn jitter(&self) -> f64 {
        self.deltas.variance()
    }

    /// The most recent sampled delta.
    pub fn last_delta(&self) -> Option<f64> {
        self.deltas.latest()
    }
}
