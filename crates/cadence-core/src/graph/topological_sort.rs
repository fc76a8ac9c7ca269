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

//! A stable variant of Kahn's algorithm for topological sorting.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

/// An error indicating that a cycle was detected in the graph.
///
/// The sort does not discard work on failure: `sorted` holds every node that
/// could be ordered, and `unresolved` the nodes stuck on a cycle (or behind
/// one), in their original input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError<T> {
    /// Nodes that reached zero in-degree, in topological order.
    pub sorted: Vec<T>,
    /// Nodes that never reached zero in-degree, in input order.
    pub unresolved: Vec<T>,
}

/// Performs a topological sort that prefers the input order among ready nodes.
///
/// `nodes` must be given in preference order: whenever several nodes are
/// free to run, the one that appears first in `nodes` is emitted first. The
/// ready set is a min-heap over input positions, so a node that becomes
/// ready late still slots in ahead of lower-preference ready nodes.
///
/// # Arguments
///
/// * `nodes`: The unique nodes of the graph, in preference order.
/// * `edges`: Directed edges as `(parent, child)`: `parent` comes first.
///   Edges naming unknown nodes are ignored, as are self-loops.
///
/// # Returns
///
/// * `Ok(Vec<T>)`: Every node, in a valid topological order.
/// * `Err(CycleError)`: The partial order plus the nodes left on a cycle.
pub fn stable_topological_sort<T>(
    nodes: impl IntoIterator<Item = T>,
    edges: impl IntoIterator<Item = (T, T)>,
) -> Result<Vec<T>, CycleError<T>>
where
    T: Copy + Eq + Hash,
{
    let node_list: Vec<T> = nodes.into_iter().collect();
    if node_list.is_empty() {
        return Ok(Vec::new());
    }

    let rank: HashMap<T, usize> = node_list
        .iter()
        .enumerate()
        .map(|(position, node)| (*node, position))
        .collect();

    let mut adjacency_list: Vec<Vec<usize>> = vec![Vec::new(); node_list.len()];
    let mut in_degree: Vec<usize> = vec![0; node_list.len()];

    // 1. Build adjacency list and in-degree counts from edges.
    for (parent, child) in edges {
        let (Some(&from), Some(&to)) = (rank.get(&parent), rank.get(&child)) else {
            continue;
        };
        if from == to || adjacency_list[from].contains(&to) {
            continue;
        }
        adjacency_list[from].push(to);
        in_degree[to] += 1;
    }

    // 2. Seed the ready heap with every node of in-degree 0.
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(position, _)| Reverse(position))
        .collect();

    // 3. Always emit the best-ranked ready node.
    let mut sorted_list = Vec::with_capacity(node_list.len());
    let mut emitted = vec![false; node_list.len()];
    while let Some(Reverse(position)) = ready.pop() {
        sorted_list.push(node_list[position]);
        emitted[position] = true;
        for &child in &adjacency_list[position] {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                ready.push(Reverse(child));
            }
        }
    }

    // 4. Check for cycles.
    if sorted_list.len() != node_list.len() {
        let unresolved = node_list
            .iter()
            .zip(&emitted)
            .filter(|(_, done)| !**done)
            .map(|(node, _)| *node)
            .collect();
        Err(CycleError {
            sorted: sorted_list,
            unresolved,
        })
    } else {
        Ok(sorted_list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph() {
        let sorted = stable_topological_sort(Vec::<u32>::new(), Vec::new());
        assert_eq!(sorted, Ok(Vec::new()));
    }

    #[test]
    fn test_no_edges_preserves_input_order() {
        let sorted = stable_topological_sort([3, 1, 2], []);
        assert_eq!(sorted, Ok(vec![3, 1, 2]));
    }

    #[test]
    fn test_edges_override_input_order() {
        // 'c' must come before 'a' although 'a' is preferred.
        let sorted = stable_topological_sort(['a', 'b', 'c'], [('c', 'a')]);
        assert_eq!(sorted, Ok(vec!['b', 'c', 'a']));
    }

    #[test]
    fn test_late_ready_node_keeps_its_rank() {
        // 'b' becomes ready after 'd' is emitted, but still precedes 'e'.
        let sorted = stable_topological_sort(['a', 'b', 'c', 'd', 'e'], [('d', 'b')]);
        assert_eq!(sorted, Ok(vec!['a', 'c', 'd', 'b', 'e']));
    }

    #[test]
    fn test_duplicate_and_unknown_edges_are_ignored() {
        let sorted = stable_topological_sort([1, 2], [(2, 1), (2, 1), (9, 1), (1, 1)]);
        assert_eq!(sorted, Ok(vec![2, 1]));
    }

    #[test]
    fn test_cycle_reports_partial_order_and_unresolved() {
        let result = stable_topological_sort([1, 2, 3, 4], [(1, 2), (2, 3), (3, 1)]);
        let err = result.expect_err("cycle should be detected");
        assert_eq!(err.sorted, vec![4]);
        assert_eq!(err.unresolved, vec![1, 2, 3]);
    }
}
