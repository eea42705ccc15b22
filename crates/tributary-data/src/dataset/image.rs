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


use super::{GHOST_ARRAY_NAME, GHOST_DUPLICATE};
use crate::error::DataError;
use crate::field::FieldData;
use crate::object::{DeepClone, HasBounds, HasGhostLayers};
use tributary_core::{Bounds, Extent};

/// A uniform rectilinear lattice of points over a structured extent.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGrid {
    extent: Extent,
    origin: [f64; 3],
    spacing: [f64; 3],
    point_data: FieldData,
    cell_data: FieldData,
    ghost_levels: u32,
}

impl Default for ImageGrid {
    fn default() -> Self {
        Self::new(Extent::EMPTY, [0.0; 3], [1.0; 3])
    }
}

impl ImageGrid {
    /// Creates a grid without attributes.
    pub fn new(extent: Extent, origin: [f64; 3], spacing: [f64; 3]) -> Self {
        Self {
            extent,
            origin,
            spacing,
            point_data: FieldData::new(),
            cell_data: FieldData::new(),
            ghost_levels: 0,
        }
    }

    /// Node extent.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Replaces the extent. Attribute arrays are not resized.
    pub fn set_extent(&mut self, extent: Extent) {
        self.extent = extent;
    }

    /// Position of node `(0, 0, 0)`.
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Sets the origin.
    pub fn set_origin(&mut self, origin: [f64; 3]) {
        self.origin = origin;
    }

    /// Distance between neighbouring nodes per axis.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Sets the spacing.
    pub fn set_spacing(&mut self, spacing: [f64; 3]) {
        self.spacing = spacing;
    }

    /// Node counts per axis.
    pub fn dimensions(&self) -> [i32; 3] {
        self.extent.dimensions()
    }

    /// Number of nodes.
    pub fn number_of_points(&self) -> usize {
        self.extent.number_of_points()
    }

    /// Number of cells.
    pub fn number_of_cells(&self) -> usize {
        self.extent.number_of_cells()
    }

    /// World position of node `ijk`.
    pub fn point(&self, ijk: [i32; 3]) -> [f64; 3] {
        [
            self.origin[0] + f64::from(ijk[0]) * self.spacing[0],
            self.origin[1] + f64::from(ijk[1]) * self.spacing[1],
            self.origin[2] + f64::from(ijk[2]) * self.spacing[2],
        ]
    }

    /// Per-node attributes.
    pub fn point_data(&self) -> &FieldData {
        &self.point_data
    }

    /// Per-node attributes, mutably.
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

    /// Checks that every attribute array matches the point or cell count.
    pub fn validate(&self) -> Result<(), DataError> {
        check_lengths(&self.point_data, self.number_of_points())?;
        check_lengths(&self.cell_data, self.number_of_cells())
    }

    /// Copies the part of the grid inside `sub`, clipped to the grid's extent.
    /// Attribute tuples are gathered into new arrays.
    pub fn extract(&self, sub: &Extent) -> ImageGrid {
        let Some(target) = self.extent.intersection(sub) else {
            return ImageGrid::new(Extent::EMPTY, self.origin, self.spacing);
        };
        let point_ids: Vec<usize> = target
            .iter_points()
            .map(|ijk| self.extent.point_offset(ijk))
            .collect();
        let own_cells = self.extent.cell_extent();
        let cell_ids: Vec<usize> = target
            .cell_extent()
            .iter_points()
            .map(|ijk| own_cells.point_offset(ijk))
            .collect();

        ImageGrid {
            extent: target,
            origin: self.origin,
            spacing: self.spacing,
            point_data: self.point_data.gather(&point_ids),
            cell_data: self.cell_data.gather(&cell_ids),
            ghost_levels: self.ghost_levels,
        }
    }

    /// Marks every cell of the grid outside `real` as a duplicate ghost.
    pub fn mark_ghost_cells(&mut self, real: &Extent) {
        let cells = self.extent.cell_extent();
        let real_cells = real.cell_extent();
        let markers: Vec<u8> = cells
            .iter_points()
            .map(|ijk| {
                if real_cells.contains_point(ijk) {
                    0
                } else {
                    GHOST_DUPLICATE
                }
            })
            .collect();
        self.cell_data
            .add_array(crate::array::DataArray::from_u8(GHOST_ARRAY_NAME, 1, markers));
    }
}

pub(crate) fn check_lengths(fields: &FieldData, expected: usize) -> Result<(), DataError> {
    match fields.iter().find(|a| a.number_of_tuples() != expected) {
        Some(array) => Err(DataError::ArrayLength {
            name: array.name().to_string(),
            expected,
            found: array.number_of_tuples(),
        }),
        None => Ok(()),
    }
}

impl HasBounds for ImageGrid {
    fn bounds(&self) -> Bounds {
        Bounds::from_extent(&self.extent, self.origin, self.spacing)
    }
}

impl HasGhostLayers for ImageGrid {
    fn ghost_levels(&self) -> u32 {
        self.ghost_levels
    }

    fn cell_ghost_markers(&self) -> Option<&[u8]> {
        self.cell_data.array(GHOST_ARRAY_NAME).and_then(|a| a.as_u8())
    }
}

impl DeepClone for ImageGrid {
    fn deep_clone(&self) -> Self {
        Self {
            point_data: self.point_data.deep_clone(),
            cell_data: self.cell_data.deep_clone(),
            ..self.clone()
        }
    }
}
