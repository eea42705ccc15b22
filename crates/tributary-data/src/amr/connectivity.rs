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


//! Ghost-layer construction across the grids of an AMR tiling.
//!
//! Grids are registered with their level and node extent. Grids of one
//! level may touch but not overlap, and in a balanced hierarchy grids that
//! touch differ by at most one level. A node on a boundary shared by grids
//! of the same level belongs to the grid with the lowest id; every other
//! grid sees it as a ghost node, whatever the registration order.

use super::GridDescription;
use crate::array::DataArray;
use crate::dataset::{ImageGrid, GHOST_ARRAY_NAME, GHOST_DUPLICATE, GHOST_REFINED};
use crate::error::{DataError, RefinementError};
use crate::field::FieldData;
use std::collections::BTreeMap;
use tributary_core::Extent;

/// Position of a node along one axis relative to a grid's real extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// On or below the lower boundary.
    Low,
    /// Strictly inside.
    Interior,
    /// On or above the upper boundary.
    High,
}

/// Level relation of a neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Same level.
    SameLevel,
    /// One level coarser.
    Coarser,
    /// One level finer.
    Finer,
}

/// A grid touching or overlapping another one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridNeighbor {
    /// Neighbor grid id.
    pub grid: usize,
    /// Level of the neighbor relative to the grid.
    pub relation: Relation,
    /// Shared node range, in the index space of the grid's own level.
    pub overlap: Extent,
}

/// A grid after ghost-layer creation.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostedGrid {
    real: Extent,
    ghosted: Extent,
    node_ghosts: Vec<u8>,
    cell_ghosts: Vec<u8>,
    cell_data: FieldData,
}

impl GhostedGrid {
    /// The registered node extent.
    pub fn real_extent(&self) -> Extent {
        self.real
    }

    /// The node extent grown by the ghost layers.
    pub fn ghosted_extent(&self) -> Extent {
        self.ghosted
    }

    /// Per-node ghost markers over the ghosted extent, x-fastest.
    pub fn node_ghosts(&self) -> &[u8] {
        &self.node_ghosts
    }

    /// Per-cell ghost markers over the ghosted extent, x-fastest.
    pub fn cell_ghosts(&self) -> &[u8] {
        &self.cell_ghosts
    }

    /// Returns `true` if node `ijk` of the ghosted extent is a ghost.
    pub fn is_node_ghost(&self, ijk: [i32; 3]) -> bool {
        self.ghosted.contains_point(ijk)
            && self.node_ghosts[self.ghosted.point_offset(ijk)] & GHOST_DUPLICATE != 0
    }

    /// Ghost markers of cell `ijk`, `None` outside the ghosted extent.
    pub fn cell_ghost(&self, ijk: [i32; 3]) -> Option<u8> {
        let cells = self.ghosted.cell_extent();
        cells
            .contains_point(ijk)
            .then(|| self.cell_ghosts[cells.point_offset(ijk)])
    }

    /// Cell fields over the ghosted extent, filled by
    /// [`AmrGridConnectivity::transfer_ghost_data`].
    pub fn cell_data(&self) -> &FieldData {
        &self.cell_data
    }

    /// Builds an image grid over the ghosted extent carrying the transferred
    /// fields and the cell ghost array.
    pub fn to_image_grid(&self, origin: [f64; 3], spacing: [f64; 3]) -> ImageGrid {
        let mut grid = ImageGrid::new(self.ghosted, origin, spacing);
        for array in self.cell_data.iter() {
            grid.cell_data_mut().add_array(array.clone());
        }
        grid.cell_data_mut().add_array(DataArray::from_u8(
            GHOST_ARRAY_NAME,
            1,
            self.cell_ghosts.clone(),
        ));
        grid
    }
}

#[derive(Debug, Clone)]
struct GridRecord {
    level: usize,
    extent: Extent,
    fields: FieldData,
    neighbors: Vec<GridNeighbor>,
    ghosted: Option<GhostedGrid>,
}

/// Neighbor detection, ghost masks and ghost data transfer for a set of
/// AMR grids.
#[derive(Debug, Clone)]
pub struct AmrGridConnectivity {
    description: GridDescription,
    constant_ratio: Option<i32>,
    level_ratios: BTreeMap<usize, i32>,
    balanced: bool,
    grids: BTreeMap<usize, GridRecord>,
    whole: Vec<Extent>,
}

impl AmrGridConnectivity {
    /// Creates an engine for grids with the given active axes.
    pub fn new(description: GridDescription) -> Self {
        Self {
            description,
            constant_ratio: None,
            level_ratios: BTreeMap::new(),
            balanced: true,
            grids: BTreeMap::new(),
            whole: Vec::new(),
        }
    }

    /// Declares one refinement ratio for every level.
    pub fn with_constant_ratio(mut self, ratio: i32) -> Self {
        self.constant_ratio = Some(ratio);
        self
    }

    /// Whether touching grids must differ by at most one level (default).
    pub fn set_balanced_refinement(&mut self, balanced: bool) {
        self.balanced = balanced;
    }

    /// Sets the ratio between `level` and `level + 1`.
    pub fn set_refinement_ratio(&mut self, level: usize, ratio: i32) -> Result<(), DataError> {
        self.record_ratio(level, ratio)
    }

    /// The ratio between `level` and `level + 1`.
    pub fn refinement_ratio(&self, level: usize) -> Option<i32> {
        self.level_ratios.get(&level).copied().or(self.constant_ratio)
    }

    /// Registers grid `id` at `level` with its node extent. `ratio`, when
    /// given, is the ratio between `level` and `level + 1`.
    pub fn register_grid(
        &mut self,
        id: usize,
        level: usize,
        extent: Extent,
        ratio: Option<i32>,
    ) -> Result<(), DataError> {
        if self.grids.contains_key(&id) {
            return Err(DataError::DuplicateGrid(id));
        }
        if let Some(ratio) = ratio {
            self.record_ratio(level, ratio)?;
        }
        self.grids.insert(
            id,
            GridRecord {
                level,
                extent,
                fields: FieldData::new(),
                neighbors: Vec::new(),
                ghosted: None,
            },
        );
        self.whole.clear();
        Ok(())
    }

    /// Attaches a cell field to grid `id`; one tuple per real cell.
    pub fn register_cell_field(&mut self, id: usize, array: DataArray) -> Result<(), DataError> {
        let grid = self.grids.get_mut(&id).ok_or(DataError::UnknownGrid(id))?;
        let expected = grid.extent.number_of_cells();
        if array.number_of_tuples() != expected {
            return Err(DataError::ArrayLength {
                name: array.name().to_string(),
                expected,
                found: array.number_of_tuples(),
            });
        }
        grid.fields.add_array(array);
        Ok(())
    }

    /// Number of registered grids.
    pub fn number_of_grids(&self) -> usize {
        self.grids.len()
    }

    /// Level of grid `id`.
    pub fn grid_level(&self, id: usize) -> Option<usize> {
        self.grids.get(&id).map(|g| g.level)
    }

    /// Node extent covering every grid of `level`, once neighbors are computed.
    pub fn whole_extent(&self, level: usize) -> Option<Extent> {
        self.whole.get(level).copied()
    }

    /// Neighbors of grid `id`, sorted by id.
    pub fn neighbors(&self, id: usize) -> &[GridNeighbor] {
        self.grids.get(&id).map_or(&[], |g| g.neighbors.as_slice())
    }

    /// Finds the neighbors of every grid and the whole extent of every level.
    pub fn compute_neighbors(&mut self) -> Result<(), DataError> {
        self.compute_whole_extents()?;
        let ids: Vec<usize> = self.grids.keys().copied().collect();
        let mut found: BTreeMap<usize, Vec<GridNeighbor>> = BTreeMap::new();
        for (pos, &a) in ids.iter().enumerate() {
            for &b in &ids[pos + 1..] {
                let (ga, gb) = (&self.grids[&a], &self.grids[&b]);
                let (fine_id, coarse_id) = if ga.level >= gb.level { (a, b) } else { (b, a) };
                let fine = &self.grids[&fine_id];
                let coarse = &self.grids[&coarse_id];
                let gap = fine.level - coarse.level;
                match gap {
                    0 => {
                        if let Some(overlap) = fine.extent.intersection(&coarse.extent) {
                            for (me, other) in [(a, b), (b, a)] {
                                found.entry(me).or_default().push(GridNeighbor {
                                    grid: other,
                                    relation: Relation::SameLevel,
                                    overlap,
                                });
                            }
                        }
                    }
                    1 => {
                        let ratio = self.ratio_or_missing(coarse.level)?;
                        let refined = coarse.extent.refine(ratio);
                        if let Some(fine_overlap) = fine.extent.intersection(&refined) {
                            found.entry(fine_id).or_default().push(GridNeighbor {
                                grid: coarse_id,
                                relation: Relation::Coarser,
                                overlap: fine_overlap,
                            });
                            let coarse_overlap = coarse
                                .extent
                                .intersection(&fine.extent.coarsen(ratio))
                                .unwrap_or(Extent::EMPTY);
                            found.entry(coarse_id).or_default().push(GridNeighbor {
                                grid: fine_id,
                                relation: Relation::Finer,
                                overlap: coarse_overlap,
                            });
                        }
                    }
                    _ => {
                        let mut shrunk = fine.extent;
                        for level in (coarse.level..fine.level).rev() {
                            shrunk = shrunk.coarsen(self.ratio_or_missing(level)?);
                        }
                        if self.balanced && shrunk.intersection(&coarse.extent).is_some() {
                            return Err(RefinementError::Unbalanced {
                                first: a,
                                second: b,
                                levels: gap,
                            }
                            .into());
                        }
                    }
                }
            }
        }
        for (id, grid) in &mut self.grids {
            let mut neighbors = found.remove(id).unwrap_or_default();
            neighbors.sort_by_key(|n| n.grid);
            grid.neighbors = neighbors;
        }
        log::trace!("AMR connectivity: {} grids, {} levels", ids.len(), self.whole.len());
        Ok(())
    }

    /// Grows every grid by `layers` nodes (clipped to its level's whole
    /// extent) and fills the node and cell ghost masks.
    pub fn create_ghost_layers(&mut self, layers: u32) -> Result<(), DataError> {
        if self.whole.is_empty() {
            self.compute_neighbors()?;
        }
        let n = i32::try_from(layers).unwrap_or(i32::MAX);
        let mut built = Vec::with_capacity(self.grids.len());
        for (&id, grid) in &self.grids {
            let whole = self.whole[grid.level];
            let real = grid.extent;
            let ghosted = real.grow(n).clip(&whole);
            let node_ghosts = ghosted
                .iter_points()
                .map(|p| {
                    if !real.contains_point(p) || self.owned_by_lower_id(id, grid.level, p) {
                        GHOST_DUPLICATE
                    } else {
                        0
                    }
                })
                .collect();
            let real_cells = real.cell_extent();
            let cell_ghosts = ghosted
                .cell_extent()
                .iter_points()
                .map(|c| {
                    let mut marker = if real_cells.contains_point(c) {
                        0
                    } else {
                        GHOST_DUPLICATE
                    };
                    if self.refined_by_finer(grid.level, c) {
                        marker |= GHOST_REFINED;
                    }
                    marker
                })
                .collect();
            built.push((
                id,
                GhostedGrid {
                    real,
                    ghosted,
                    node_ghosts,
                    cell_ghosts,
                    cell_data: FieldData::new(),
                },
            ));
        }
        for (id, ghosted) in built {
            if let Some(grid) = self.grids.get_mut(&id) {
                grid.ghosted = Some(ghosted);
            }
        }
        Ok(())
    }

    /// The ghosted grid `id`, after [`AmrGridConnectivity::create_ghost_layers`].
    pub fn ghosted_grid(&self, id: usize) -> Option<&GhostedGrid> {
        self.grids.get(&id)?.ghosted.as_ref()
    }

    /// The ghosted node extent of grid `id`.
    pub fn ghosted_extent(&self, id: usize) -> Option<Extent> {
        self.ghosted_grid(id).map(GhostedGrid::ghosted_extent)
    }

    /// Orientation of node `ijk` on each axis relative to the real extent
    /// of grid `id`. Inactive axes are always interior.
    pub fn node_orientation(&self, id: usize, ijk: [i32; 3]) -> Option<[Orientation; 3]> {
        let real = self.grids.get(&id)?.extent;
        let axes = self.description.active_axes();
        let mut out = [Orientation::Interior; 3];
        for axis in (0..3).filter(|&a| axes[a]) {
            out[axis] = if ijk[axis] <= real.lo(axis) {
                Orientation::Low
            } else if ijk[axis] >= real.hi(axis) {
                Orientation::High
            } else {
                Orientation::Interior
            };
        }
        Some(out)
    }

    /// Fills the ghost cells of every registered cell field.
    ///
    /// A ghost cell takes its value from a grid of the same level holding
    /// the cell, else the average of the finer cells covering it, else the
    /// coarser cell containing it. Cells with no source are NaN.
    pub fn transfer_ghost_data(&mut self) -> Result<(), DataError> {
        let mut filled = Vec::with_capacity(self.grids.len());
        for (&id, grid) in &self.grids {
            let ghosted = grid.ghosted.as_ref().ok_or(DataError::MissingElement {
                what: "ghost layers",
                index: id,
            })?;
            let cells = ghosted.ghosted.cell_extent();
            let mut out = FieldData::new();
            for array in grid.fields.iter() {
                let components = array.components();
                let mut values = Vec::with_capacity(cells.number_of_points() * components);
                for ijk in cells.iter_points() {
                    values.extend(self.ghost_tuple(id, grid.level, ijk, array.name(), components));
                }
                out.add_array(DataArray::from_f64(array.name(), components, values));
            }
            filled.push((id, out));
        }
        for (id, data) in filled {
            if let Some(ghosted) = self.grids.get_mut(&id).and_then(|g| g.ghosted.as_mut()) {
                ghosted.cell_data = data;
            }
        }
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn record_ratio(&mut self, level: usize, ratio: i32) -> Result<(), DataError> {
        if ratio < 2 {
            return Err(RefinementError::RatioTooSmall { level, ratio }.into());
        }
        if let Some(declared) = self.constant_ratio {
            if declared != ratio {
                return Err(RefinementError::ConstantRatioMismatch {
                    level,
                    declared,
                    actual: ratio,
                }
                .into());
            }
        }
        match self.level_ratios.get(&level) {
            Some(&first) if first != ratio => Err(RefinementError::LevelRatioMismatch {
                level,
                first,
                second: ratio,
            }
            .into()),
            _ => {
                self.level_ratios.insert(level, ratio);
                Ok(())
            }
        }
    }

    fn ratio_or_missing(&self, level: usize) -> Result<i32, DataError> {
        self.refinement_ratio(level)
            .ok_or_else(|| RefinementError::MissingRatio(level).into())
    }

    fn compute_whole_extents(&mut self) -> Result<(), DataError> {
        let Some(max_level) = self.grids.values().map(|g| g.level).max() else {
            self.whole.clear();
            return Ok(());
        };
        let mut root = Extent::EMPTY;
        for grid in self.grids.values() {
            let mut ext = grid.extent;
            for level in (0..grid.level).rev() {
                ext = ext.coarsen(self.ratio_or_missing(level)?);
            }
            root = root.union(&ext);
        }
        let mut whole = Vec::with_capacity(max_level + 1);
        whole.push(root);
        for level in 0..max_level {
            let next = whole[level].refine(self.ratio_or_missing(level)?);
            whole.push(next);
        }
        self.whole = whole;
        Ok(())
    }

    fn owned_by_lower_id(&self, id: usize, level: usize, node: [i32; 3]) -> bool {
        self.grids
            .range(..id)
            .any(|(_, g)| g.level == level && g.extent.contains_point(node))
    }

    fn refined_by_finer(&self, level: usize, cell: [i32; 3]) -> bool {
        let Some(ratio) = self.refinement_ratio(level) else {
            return false;
        };
        let fine = self.fine_cells(cell, ratio);
        self.grids.values().any(|g| {
            g.level == level + 1 && g.extent.cell_extent().intersection(&fine).is_some()
        })
    }

    /// Cells one level finer covering coarse cell `cell`.
    fn fine_cells(&self, cell: [i32; 3], ratio: i32) -> Extent {
        let axes = self.description.active_axes();
        let mut out = [0; 6];
        for axis in 0..3 {
            let (lo, hi) = if axes[axis] {
                (cell[axis] * ratio, cell[axis] * ratio + ratio - 1)
            } else {
                (cell[axis], cell[axis])
            };
            out[2 * axis] = lo;
            out[2 * axis + 1] = hi;
        }
        Extent(out)
    }

    fn coarse_cell(&self, cell: [i32; 3], ratio: i32) -> [i32; 3] {
        let axes = self.description.active_axes();
        let mut out = cell;
        for axis in (0..3).filter(|&a| axes[a]) {
            out[axis] = cell[axis].div_euclid(ratio);
        }
        out
    }

    fn cell_value(grid: &GridRecord, cell: [i32; 3], name: &str, components: usize) -> Option<Vec<f64>> {
        let cells = grid.extent.cell_extent();
        if !cells.contains_point(cell) {
            return None;
        }
        let tuple = cells.point_offset(cell);
        let array = grid.fields.array(name)?;
        (0..components).map(|c| array.component(tuple, c)).collect()
    }

    fn ghost_tuple(&self, id: usize, level: usize, cell: [i32; 3], name: &str, components: usize) -> Vec<f64> {
        let at_level = |l: usize| self.grids.iter().filter(move |(_, g)| g.level == l);

        if let Some(v) = Self::cell_value(&self.grids[&id], cell, name, components) {
            return v;
        }
        if let Some(v) = at_level(level)
            .filter(|(other, _)| **other != id)
            .find_map(|(_, g)| Self::cell_value(g, cell, name, components))
        {
            return v;
        }
        if let Some(ratio) = self.refinement_ratio(level) {
            let mut sum = vec![0.0; components];
            let mut count = 0usize;
            for fine in self.fine_cells(cell, ratio).iter_points() {
                if let Some(v) = at_level(level + 1).find_map(|(_, g)| Self::cell_value(g, fine, name, components)) {
                    sum.iter_mut().zip(&v).for_each(|(s, x)| *s += x);
                    count += 1;
                }
            }
            if count > 0 {
                return sum.into_iter().map(|s| s / count as f64).collect();
            }
        }
        if let Some(ratio) = level.checked_sub(1).and_then(|l| self.refinement_ratio(l)) {
            let coarse = self.coarse_cell(cell, ratio);
            if let Some(v) = at_level(level - 1).find_map(|(_, g)| Self::cell_value(g, coarse, name, components)) {
                return v;
            }
        }
        vec![f64::NAN; components]
    }
}
