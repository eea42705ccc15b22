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


//! Kahn's algorithm and reachability over generic directed graphs.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// An error indicating that a cycle was detected in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError;

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "graph contains a cycle")
    }
}

impl std::error::Error for CycleError {}

/// Performs a topological sort on a generic directed graph.
///
/// Edges are `(parent, child)` pairs; parents come before their children in
/// the result. Among nodes that become ready together, input order is kept.
///
/// # Returns
///
/// * `Ok(Vec<T>)`: the nodes in a valid topological order.
/// * `Err(CycleError)`: if the graph contains one or more cycles.
pub fn topological_sort<T>(
    nodes: impl IntoIterator<Item = T>,
    edges: impl IntoIterator<Item = (T, T)>,
) -> Result<Vec<T>, CycleError>
where
    T: Copy + Eq + Hash,
{
    let node_list: Vec<T> = nodes.into_iter().collect();
    if node_list.is_empty() {
        return Ok(Vec::new());
    }

    let mut adjacency_list: HashMap<T, Vec<T>> = HashMap::new();
    let mut in_degree: HashMap<T, usize> = node_list.iter().map(|id| (*id, 0)).collect();

    // 1. Build adjacency list and in-degree counts from edges.
    for (parent, child) in edges {
        adjacency_list.entry(parent).or_default().push(child);
        if let Some(degree) = in_degree.get_mut(&child) {
            *degree += 1;
        }
    }

    // 2. Seed the queue with roots.
    let mut queue: VecDeque<T> = node_list
        .iter()
        .copied()
        .filter(|node| in_degree.get(node).copied().unwrap_or(0) == 0)
        .collect();

    // 3. Process the queue.
    let mut sorted_list = Vec::with_capacity(node_list.len());
    while let Some(parent_node) = queue.pop_front() {
        sorted_list.push(parent_node);
        if let Some(children) = adjacency_list.get(&parent_node) {
            for &child_node in children {
                if let Some(degree) = in_degree.get_mut(&child_node) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(child_node);
                    }
                }
            }
        }
    }

    // 4. Check for cycles.
    if sorted_list.len() != node_list.len() {
        Err(CycleError)
    } else {
        Ok(sorted_list)
    }
}

/// Returns every node reachable from `start` by following `edges`, including
/// `start` itself.
pub fn reachable_from<T>(start: T, edges: impl IntoIterator<Item = (T, T)>) -> HashSet<T>
where
    T: Copy + Eq + Hash,
{
    let mut adjacency_list: HashMap<T, Vec<T>> = HashMap::new();
    for (from, to) in edges {
        adjacency_list.entry(from).or_default().push(to);
    }

    let mut seen = HashSet::from([start]);
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        for &next in adjacency_list.get(&node).into_iter().flatten() {
            if seen.insert(next) {
                stack.push(next);
            }
        }
    }
    seen
}
