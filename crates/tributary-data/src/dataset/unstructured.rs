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


use super::{bounds_of_points, GHOST_ARRAY_NAME};
use crate::array::DataArray;
use crate::error::DataError;
use crate::field::FieldData;
use crate::object::{DeepClone, HasBounds, HasGhostLayers};
use std::sync::Arc;
use tributary_core::Bounds;

/// Linear cell shapes, with their legacy ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    /// A single point.
    Vertex,
    /// Two-point segment.
    Line,
    /// Three-point triangle.
    Triangle,
    /// Four-point quadrilateral.
    Quad,
    /// Four-point tetrahedron.
    Tetra,
    /// Eight-point hexahedron.
    Hexahedron,
    /// Six-point wedge.
    Wedge,
    /// Five-point pyramid.
    Pyramid,
}

impl CellType {
    /// Every supported cell type.
    pub const ALL: [CellType; 8] = [
        CellType::Vertex,
        CellType::Line,
        CellType::Triangle,
        CellType::Quad,
        CellType::Tetra,
        CellType::Hexahedron,
        CellType::Wedge,
        CellType::Pyramid,
    ];

    /// Legacy integer id.
    pub const fn legacy_id(self) -> u8 {
        match self {
            CellType::Vertex => 1,
            CellType::Line => 3,
            CellType::Triangle => 5,
            CellType::Quad => 9,
            CellType::Tetra => 10,
            CellType::Hexahedron => 12,
            CellType::Wedge => 13,
            CellType::Pyramid => 14,
        }
    }

    /// Inverse of [`CellType::legacy_id`].
    pub fn from_legacy_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.legacy_id() == id)
    }

    /// Number of points defining the cell.
    pub const fn number_of_points(self) -> usize {
        match self {
            CellType::Vertex => 1,
            CellType::Line => 2,
            CellType::Triangle => 3,
            CellType::Quad | CellType::Tetra => 4,
            CellType::Pyramid => 5,
            CellType::Wedge => 6,
            CellType::Hexahedron => 8,
        }
    }

    /// Topological dimension.
    pub const fn dimension(self) -> u8 {
        match self {
            CellType::Vertex => 0,
            CellType::Line => 1,
            CellType::Triangle | CellType::Quad => 2,
            CellType::Tetra | CellType::Hexahedron | CellType::Wedge | CellType::Pyramid => 3,
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            CellType::Vertex => "vertex",
            CellType::Line => "line",
            CellType::Triangle => "triangle",
            CellType::Quad => "quad",
            CellType::Tetra => "tetra",
            CellType::Hexahedron => "hexahedron",
            CellType::Wedge => "wedge",
            CellType::Pyramid => "pyramid",
        }
    }
}

/// Explicit cells over a shared point list.
#[derive(Debug, Clone, PartialEq)]
pub struct UnstructuredGrid {
    points: DataArray,
    cell_types: Arc<Vec<CellType>>,
    connectivity: Arc<Vec<usize>>,
    offsets: Arc<Vec<usize>>,
    point_data: FieldData,
    cell_data: FieldData,
    ghost_levels: u32,
}

impl Default for UnstructuredGrid {
    fn default() -> Self {
        Self {
            points: DataArray::from_f64("Points", 3, Vec::new()),
            cell_types: Arc::default(),
            connectivity: Arc::default(),
            offsets: Arc::new(vec![0]),
            point_data: FieldData::new(),
            cell_data: FieldData::new(),
            ghost_levels: 0,
        }
    }
}

impl UnstructuredGrid {
    /// Creates a grid over `points` with no cells.
    pub fn from_points(points: Vec<[f64; 3]>) -> Self {
        Self {
            points: DataArray::from_f64("Points", 3, points.into_iter().flatten().collect()),
            ..Self::default()
        }
    }

    /// Coordinates as a 3-component array.
    pub fn points(&self) -> &DataArray {
        &self.points
    }

    /// Number of points.
    pub fn number_of_points(&self) -> usize {
        self.points.number_of_tuples()
    }

    /// Number of cells.
    pub fn number_of_cells(&self) -> usize {
        self.cell_types.len()
    }

    /// Appends a cell and returns its index.
    pub fn insert_next_cell(&mut self, cell: CellType, ids: &[usize]) -> Result<usize, DataError> {
        if ids.len() != cell.number_of_points() {
            return Err(DataError::InvalidCell {
                cell: cell.name(),
                expected: cell.number_of_points(),
                found: ids.len(),
            });
        }
        let n = self.number_of_points();
        if let Some(&bad) = ids.iter().find(|&&id| id >= n) {
            return Err(DataError::MissingElement {
                what: "point",
                index: bad,
            });
        }
        Arc::make_mut(&mut self.cell_types).push(cell);
        Arc::make_mut(&mut self.connectivity).extend_from_slice(ids);
        let end = self.connectivity.len();
        Arc::make_mut(&mut self.offsets).push(end);
        Ok(self.cell_types.len() - 1)
    }

    /// Type and point ids of cell `index`.
    pub fn cell(&self, index: usize) -> Option<(CellType, &[usize])> {
        let ty = *self.cell_types.get(index)?;
        let start = *self.offsets.get(index)?;
        let end = *self.offsets.get(index + 1)?;
        Some((ty, &self.connectivity[start..end]))
    }

    /// Iterates over every cell.
    pub fn cells(&self) -> impl Iterator<Item = (CellType, &[usize])> + '_ {
        (0..self.number_of_cells()).filter_map(move |i| self.cell(i))
    }

    /// Returns `true` if every cell has type `cell`. Vacuously true when empty.
    pub fn all_cells_are(&self, cell: CellType) -> bool {
        self.cell_types.iter().all(|&c| c == cell)
    }

    /// Per-point attributes.
    pub fn point_data(&self) -> &FieldData {
        &self.point_data
    }

    /// Per-point attributes, mutably.
    pub fn point_data_mut(&mut self) -> &mut FieldData {
        &mut self.point_data
    }

    /// Per-cell attributes.
    pub fn cell_data(&self) -> &FieldData {
        &self.cell_data
    }

    /// Per-cell attributes, mutably.
    pub fn cell_data_mut(&mut self) -> &mut FieldData {
        &mut self.cell_data
    }

    /// Records how many ghost layers the grid carries.
    pub fn set_ghost_levels(&mut self, levels: u32) {
        self.ghost_levels = levels;
    }

    /// Returns `true` if both grids share their cell storage.
    pub fn shares_cells(&self, other: &UnstructuredGrid) -> bool {
        Arc::ptr_eq(&self.connectivity, &other.connectivity)
    }

    /// Checks attribute array lengths against point and cell counts.
    pub fn validate(&self) -> Result<(), DataError> {
        super::image::check_lengths(&self.point_data, self.number_of_points())?;
        super::image::check_lengths(&self.cell_data, self.number_of_cells())
    }
}

impl HasBounds for UnstructuredGrid {
    fn bounds(&self) -> Bounds {
        self.points
            .as_f64()
            .map_or(Bounds::INVALID, bounds_of_points)
    }
}

impl HasGhostLayers for UnstructuredGrid {
    fn ghost_levels(&self) -> u32 {
        self.ghost_levels
    }

    fn cell_ghost_markers(&self) -> Option<&[u8]> {
        self.cell_data.array(GHOST_ARRAY_NAME).and_then(|a| a.as_u8())
    }
}

impl DeepClone for UnstructuredGrid {
    fn deep_clone(&self) -> Self {
        Self {
            points: self.points.deep_clone(),
            cell_types: Arc::new(self.cell_types.as_ref().clone()),
            connectivity: Arc::new(self.connectivity.as_ref().clone()),
            offsets: Arc::new(self.offsets.as_ref().clone()),
            point_data: self.point_data.deep_clone(),
            cell_data: self.cell_data.deep_clone(),
            ghost_levels: self.ghost_levels,
        }
    }
}
