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


//! Leaf datasets: the non-composite payloads.

mod graph;
mod image;
mod point_set;
mod table;
mod unstructured;

pub use self::graph::Graph;
pub use self::image::ImageGrid;
pub use self::point_set::PointSet;
pub use self::table::Table;
pub use self::unstructured::{CellType, UnstructuredGrid};

use tributary_core::Bounds;

/// Name of the per-cell ghost marker array.
pub const GHOST_ARRAY_NAME: &str = "GhostType";

/// Ghost marker bit: the cell is a copy of a cell owned elsewhere.
pub const GHOST_DUPLICATE: u8 = 1;

/// Ghost marker bit: the cell is hidden because a finer level refines it.
pub const GHOST_REFINED: u8 = 8;

fn bounds_of_points(points: &[f64]) -> Bounds {
    points.chunks_exact(3).fold(Bounds::INVALID, |mut b, p| {
        b.include_point([p[0], p[1], p[2]]);
        b
    })
}
