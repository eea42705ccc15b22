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


use crate::error::DataError;
use crate::field::FieldData;
use crate::object::DeepClone;
use std::sync::Arc;

/// Vertices joined by edges, with per-vertex and per-edge attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    directed: bool,
    vertices: usize,
    edges: Arc<Vec<(usize, usize)>>,
    vertex_data: FieldData,
    edge_data: FieldData,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            ..Self::default()
        }
    }

    /// Returns `true` for a directed graph.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self) -> usize {
        self.vertices += 1;
        self.vertices - 1
    }

    /// Adds an edge and returns its index.
    pub fn add_edge(&mut self, source: usize, target: usize) -> Result<usize, DataError> {
        for v in [source, target] {
            if v >= self.vertices {
                return Err(DataError::MissingElement {
                    what: "vertex",
                    index: v,
                });
            }
        }
        let edges = Arc::make_mut(&mut self.edges);
        edges.push((source, target));
        Ok(edges.len() - 1)
    }

    /// Number of vertices.
    pub fn number_of_vertices(&self) -> usize {
        self.vertices
    }

    /// Number of edges.
    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Edge endpoints.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Number of edges touching `vertex`, counting both directions.
    pub fn degree(&self, vertex: usize) -> usize {
        self.edges
            .iter()
            .map(|&(s, t)| usize::from(s == vertex) + usize::from(t == vertex))
            .sum()
    }

    /// Per-vertex attributes.
    pub fn vertex_data(&self) -> &FieldData {
        &self.vertex_data
    }

    /// Per-vertex attributes, mutably.
    pub fn vertex_data_mut(&mut self) -> &mut FieldData {
        &mut self.vertex_data
    }

    /// Per-edge attributes.
    pub fn edge_data(&self) -> &FieldData {
        &self.edge_data
    }

    /// Per-edge attributes, mutably.
    pub fn edge_data_mut(&mut self) -> &mut FieldData {
        &mut self.edge_data
    }
}

impl DeepClone for Graph {
    fn deep_clone(&self) -> Self {
        Self {
            directed: self.directed,
            vertices: self.vertices,
            edges: Arc::new(self.edges.as_ref().clone()),
            vertex_data: self.vertex_data.deep_clone(),
            edge_data: self.edge_data.deep_clone(),
        }
    }
}
