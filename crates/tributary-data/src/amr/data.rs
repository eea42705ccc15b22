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


use super::{AmrBox, AmrMode, GridDescription};
use crate::composite::{CompositeIter, IterOptions};
use crate::dataset::{ImageGrid, GHOST_ARRAY_NAME, GHOST_REFINED};
use crate::array::DataArray;
use crate::error::{DataError, RefinementError};
use crate::object::{DataHandle, DataObjectType, DeepClone, HasBounds, HasChildren};
use tributary_core::Bounds;

/// Relative tolerance when deriving integer ratios from spacing.
const RATIO_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
struct AmrLevel {
    spacing: [f64; 3],
    refinement_ratio: Option<i32>,
    boxes: Vec<AmrBox>,
    blocks: Vec<Option<DataHandle>>,
}

impl AmrLevel {
    fn with_blocks(count: usize) -> Self {
        Self {
            spacing: [1.0; 3],
            refinement_ratio: None,
            boxes: vec![AmrBox::INVALID; count],
            blocks: vec![None; count],
        }
    }
}

/// Parent/child relations between boxes of adjacent levels.
#[derive(Debug, Clone, Default)]
struct Relations {
    /// `parents[level][index]`: boxes of `level - 1` overlapping the box.
    parents: Vec<Vec<Vec<usize>>>,
    /// `children[level][index]`: boxes of `level + 1` overlapping the box.
    children: Vec<Vec<Vec<usize>>>,
}

/// An AMR hierarchy: per-level spacing, boxes and image blocks.
///
/// The refinement ratio stored for level `l` relates `l` to `l + 1`.
#[derive(Debug, Clone)]
pub struct AmrData {
    mode: AmrMode,
    description: GridDescription,
    origin: [f64; 3],
    constant_ratio: Option<i32>,
    levels: Vec<AmrLevel>,
    relations: Option<Relations>,
    blanking: Option<Vec<Vec<Vec<bool>>>>,
}

impl AmrData {
    /// Creates a hierarchy with no levels.
    pub fn new(mode: AmrMode) -> Self {
        Self {
            mode,
            description: GridDescription::XyzGrid,
            origin: [0.0; 3],
            constant_ratio: None,
            levels: Vec::new(),
            relations: None,
            blanking: None,
        }
    }

    /// Overlapping or non-overlapping.
    pub fn mode(&self) -> AmrMode {
        self.mode
    }

    /// Resets the hierarchy to `blocks_per_level.len()` levels with the given
    /// number of (empty) blocks each.
    pub fn initialize(&mut self, blocks_per_level: &[usize]) {
        self.levels = blocks_per_level
            .iter()
            .map(|&n| AmrLevel::with_blocks(n))
            .collect();
        self.invalidate();
    }

    // ── Structure ────────────────────────────────────────────────────────

    /// Number of levels.
    pub fn number_of_levels(&self) -> usize {
        self.levels.len()
    }

    /// Number of block slots on `level`, zero when out of range.
    pub fn number_of_blocks(&self, level: usize) -> usize {
        self.levels.get(level).map_or(0, |l| l.blocks.len())
    }

    /// Number of block slots on all levels.
    pub fn total_blocks(&self) -> usize {
        self.levels.iter().map(|l| l.blocks.len()).sum()
    }

    /// The block at (`level`, `index`), if present.
    pub fn block(&self, level: usize, index: usize) -> Option<&DataHandle> {
        self.levels.get(level)?.blocks.get(index)?.as_ref()
    }

    /// Stores an image block at (`level`, `index`); `None` blanks the slot.
    pub fn set_child_at(
        &mut self,
        level: usize,
        index: usize,
        child: Option<DataHandle>,
    ) -> Result<(), DataError> {
        if let Some(handle) = &child {
            if handle.data_type() != DataObjectType::ImageGrid {
                return Err(DataError::InvalidChild {
                    parent: self.mode.data_type(),
                    child: handle.data_type(),
                });
            }
        }
        *self.slot_mut(level, index)? = child;
        Ok(())
    }

    /// Stores `grid` at (`level`, `index`) and records its box and spacing.
    pub fn set_grid(&mut self, level: usize, index: usize, grid: ImageGrid) -> Result<(), DataError> {
        self.set_amr_box(level, index, AmrBox::from_node_extent(&grid.extent()))?;
        self.set_spacing(level, grid.spacing())?;
        let handle = DataHandle::new(crate::object::DataObject::new(
            crate::object::DataKind::ImageGrid(grid),
        ));
        self.set_child_at(level, index, Some(handle))
    }

    /// Flat index of (`level`, `index`), level-major from zero.
    pub fn flat_index(&self, level: usize, index: usize) -> Option<usize> {
        if index >= self.number_of_blocks(level) {
            return None;
        }
        let before: usize = self.levels[..level].iter().map(|l| l.blocks.len()).sum();
        Some(before + index)
    }

    /// Inverse of [`AmrData::flat_index`].
    pub fn level_and_index(&self, flat: usize) -> Option<(usize, usize)> {
        let mut rest = flat;
        for (level, l) in self.levels.iter().enumerate() {
            if rest < l.blocks.len() {
                return Some((level, rest));
            }
            rest -= l.blocks.len();
        }
        None
    }

    /// Iterates over the blocks level-major.
    pub fn iter(&self, options: IterOptions) -> CompositeIter<'_> {
        CompositeIter::over_amr(self, options)
    }

    // ── Metadata ─────────────────────────────────────────────────────────

    /// Active axes of the blocks.
    pub fn grid_description(&self) -> GridDescription {
        self.description
    }

    /// Sets the active axes of the blocks.
    pub fn set_grid_description(&mut self, description: GridDescription) {
        self.description = description;
    }

    /// Global origin.
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Sets the global origin.
    pub fn set_origin(&mut self, origin: [f64; 3]) {
        self.origin = origin;
    }

    /// Spacing of `level`.
    pub fn spacing(&self, level: usize) -> Option<[f64; 3]> {
        self.levels.get(level).map(|l| l.spacing)
    }

    /// Sets the spacing of `level`.
    pub fn set_spacing(&mut self, level: usize, spacing: [f64; 3]) -> Result<(), DataError> {
        self.level_mut(level)?.spacing = spacing;
        self.invalidate();
        Ok(())
    }

    /// The box at (`level`, `index`).
    pub fn amr_box(&self, level: usize, index: usize) -> Option<AmrBox> {
        self.levels.get(level)?.boxes.get(index).copied()
    }

    /// Sets the box at (`level`, `index`).
    pub fn set_amr_box(&mut self, level: usize, index: usize, b: AmrBox) -> Result<(), DataError> {
        let lvl = self.level_mut(level)?;
        let len = lvl.boxes.len();
        *lvl.boxes
            .get_mut(index)
            .ok_or(DataError::IndexOutOfRange { index, len })? = b;
        self.invalidate();
        Ok(())
    }

    /// Bounds of the box at (`level`, `index`).
    pub fn bounds(&self, level: usize, index: usize) -> Option<Bounds> {
        let b = self.amr_box(level, index)?;
        Some(b.bounds(self.origin, self.spacing(level)?))
    }

    /// Declares one ratio for every level.
    pub fn set_constant_refinement_ratio(&mut self, ratio: i32) {
        self.constant_ratio = Some(ratio);
        self.invalidate();
    }

    /// The declared constant ratio, if any.
    pub fn constant_refinement_ratio(&self) -> Option<i32> {
        self.constant_ratio
    }

    /// Sets the ratio between `level` and `level + 1`.
    pub fn set_refinement_ratio(&mut self, level: usize, ratio: i32) -> Result<(), DataError> {
        if ratio < 2 {
            return Err(RefinementError::RatioTooSmall { level, ratio }.into());
        }
        self.level_mut(level)?.refinement_ratio = Some(ratio);
        self.invalidate();
        Ok(())
    }

    /// The ratio between `level` and `level + 1`: the per-level value, else
    /// the constant one.
    pub fn refinement_ratio(&self, level: usize) -> Option<i32> {
        self.levels
            .get(level)?
            .refinement_ratio
            .or(self.constant_ratio)
    }

    // ── Derived information ──────────────────────────────────────────────

    /// Derives per-level ratios from the spacing of adjacent levels.
    ///
    /// Every active axis must agree on an integer ratio of at least two, and
    /// a declared constant ratio must match. The finest level copies the
    /// ratio above it.
    pub fn generate_refinement_ratio(&mut self) -> Result<(), DataError> {
        let axes = self.description.active_axes();
        let mut ratios = Vec::with_capacity(self.levels.len());
        for level in 0..self.levels.len().saturating_sub(1) {
            let coarse = self.levels[level].spacing;
            let fine = self.levels[level + 1].spacing;
            let mut found: Option<i32> = None;
            for axis in (0..3).filter(|&a| axes[a]) {
                let measured = coarse[axis] / fine[axis];
                let rounded = measured.round();
                if !measured.is_finite() || (measured - rounded).abs() > RATIO_TOLERANCE * measured {
                    return Err(RefinementError::NonIntegerRatio {
                        level,
                        ratio: measured,
                    }
                    .into());
                }
                let ratio = rounded as i32;
                match found {
                    Some(first) if first != ratio => {
                        return Err(RefinementError::LevelRatioMismatch {
                            level,
                            first,
                            second: ratio,
                        }
                        .into())
                    }
                    _ => found = Some(ratio),
                }
            }
            let ratio = found.or(self.constant_ratio).unwrap_or(2);
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
            ratios.push(ratio);
        }
        if !self.levels.is_empty() {
            let last = ratios.last().copied().or(self.constant_ratio).unwrap_or(2);
            ratios.push(last);
        }
        for (level, ratio) in self.levels.iter_mut().zip(ratios) {
            level.refinement_ratio = Some(ratio);
        }
        self.invalidate();
        Ok(())
    }

    /// Links every box with the overlapping boxes of adjacent levels.
    pub fn generate_parent_child_information(&mut self) -> Result<(), DataError> {
        let n = self.levels.len();
        let mut relations = Relations {
            parents: self.levels.iter().map(|l| vec![Vec::new(); l.boxes.len()]).collect(),
            children: self.levels.iter().map(|l| vec![Vec::new(); l.boxes.len()]).collect(),
        };
        for level in 1..n {
            let ratio = self
                .refinement_ratio(level - 1)
                .ok_or(RefinementError::MissingRatio(level - 1))?;
            for (index, b) in self.levels[level].boxes.iter().enumerate() {
                if b.is_invalid() {
                    continue;
                }
                let coarse = b.coarsen(ratio);
                for (parent, p) in self.levels[level - 1].boxes.iter().enumerate() {
                    if !p.is_invalid() && p.intersects(&coarse) {
                        relations.parents[level][index].push(parent);
                        relations.children[level - 1][parent].push(index);
                    }
                }
            }
        }
        self.relations = Some(relations);
        Ok(())
    }

    /// Boxes of `level - 1` overlapping (`level`, `index`). Requires
    /// [`AmrData::generate_parent_child_information`].
    pub fn parents(&self, level: usize, index: usize) -> Option<&[usize]> {
        self.relations
            .as_ref()?
            .parents
            .get(level)?
            .get(index)
            .map(Vec::as_slice)
    }

    /// Boxes of `level + 1` overlapping (`level`, `index`).
    pub fn children(&self, level: usize, index: usize) -> Option<&[usize]> {
        self.relations
            .as_ref()?
            .children
            .get(level)?
            .get(index)
            .map(Vec::as_slice)
    }

    /// Computes per-cell visibility for every box.
    ///
    /// In overlapping mode a cell is hidden when a box of the next finer
    /// level covers it. Non-overlapping hierarchies hide nothing.
    pub fn generate_blanking(&mut self) -> Result<(), DataError> {
        if self.mode == AmrMode::Overlapping && self.relations.is_none() {
            self.generate_parent_child_information()?;
        }
        let mut masks = Vec::with_capacity(self.levels.len());
        for (level, lvl) in self.levels.iter().enumerate() {
            let mut level_masks = Vec::with_capacity(lvl.boxes.len());
            for (index, b) in lvl.boxes.iter().enumerate() {
                let mut mask = vec![true; b.number_of_cells()];
                if self.mode == AmrMode::Overlapping && level + 1 < self.levels.len() {
                    let ratio = self
                        .refinement_ratio(level)
                        .ok_or(RefinementError::MissingRatio(level))?;
                    let covers: Vec<AmrBox> = self
                        .children(level, index)
                        .unwrap_or_default()
                        .iter()
                        .map(|&c| self.levels[level + 1].boxes[c].coarsen(ratio))
                        .collect();
                    for (visible, cell) in mask.iter_mut().zip(b.cells()) {
                        *visible = !covers.iter().any(|c| c.contains_cell(cell));
                    }
                }
                level_masks.push(mask);
            }
            masks.push(level_masks);
        }
        self.blanking = Some(masks);
        Ok(())
    }

    /// Returns `true` if blanking is generated and no box, spacing or ratio
    /// changed since.
    pub fn is_blanking_current(&self) -> bool {
        self.blanking.is_some()
    }

    /// Per-cell visibility of (`level`, `index`), x-fastest; `None` when
    /// blanking is not current.
    pub fn visibility(&self, level: usize, index: usize) -> Option<&[bool]> {
        self.blanking
            .as_ref()?
            .get(level)?
            .get(index)
            .map(Vec::as_slice)
    }

    /// Number of visible cells of (`level`, `index`).
    pub fn number_of_visible_cells(&self, level: usize, index: usize) -> Option<usize> {
        Some(self.visibility(level, index)?.iter().filter(|v| **v).count())
    }

    /// A copy of the block at (`level`, `index`) whose ghost array marks
    /// hidden cells as refined.
    pub fn blanked_block(&self, level: usize, index: usize) -> Result<Option<ImageGrid>, DataError> {
        let Some(handle) = self.block(level, index) else {
            return Ok(None);
        };
        let Some(grid) = handle.as_image_grid() else {
            return Ok(None);
        };
        let mask = self.visibility(level, index).ok_or(DataError::MissingElement {
            what: "blanking",
            index,
        })?;
        if mask.len() != grid.number_of_cells() {
            return Err(DataError::ArrayLength {
                name: GHOST_ARRAY_NAME.to_string(),
                expected: grid.number_of_cells(),
                found: mask.len(),
            });
        }
        let mut markers: Vec<u8> = grid
            .cell_data()
            .array(GHOST_ARRAY_NAME)
            .and_then(DataArray::as_u8)
            .map_or_else(|| vec![0; mask.len()], <[u8]>::to_vec);
        for (marker, visible) in markers.iter_mut().zip(mask) {
            if !visible {
                *marker |= GHOST_REFINED;
            }
        }
        let mut out = grid.clone();
        out.cell_data_mut()
            .add_array(DataArray::from_u8(GHOST_ARRAY_NAME, 1, markers));
        Ok(Some(out))
    }

    /// Checks the box layout.
    ///
    /// Boxes of one level must not overlap. In overlapping mode every box
    /// above level 0 must also lie inside the boxes of the coarser level.
    pub fn validate(&self) -> Result<(), DataError> {
        for (level, lvl) in self.levels.iter().enumerate() {
            for (first, a) in lvl.boxes.iter().enumerate() {
                if a.is_invalid() {
                    continue;
                }
                for (offset, b) in lvl.boxes[first + 1..].iter().enumerate() {
                    if !b.is_invalid() && a.intersects(b) {
                        return Err(DataError::OverlappingBoxes {
                            level,
                            first,
                            second: first + 1 + offset,
                        });
                    }
                }
            }
            if self.mode == AmrMode::Overlapping && level > 0 {
                self.check_coverage(level)?;
            }
        }
        Ok(())
    }

    /// Copy with the same levels and boxes but no blocks.
    pub fn metadata_copy(&self) -> AmrData {
        let mut out = self.clone();
        for level in &mut out.levels {
            level.blocks.iter_mut().for_each(|b| *b = None);
        }
        out
    }

    /// Returns `true` if both hierarchies have the same level and block counts.
    pub fn same_structure(&self, other: &AmrData) -> bool {
        self.levels.len() == other.levels.len()
            && self
                .levels
                .iter()
                .zip(&other.levels)
                .all(|(a, b)| a.blocks.len() == b.blocks.len())
    }

    /// Stores a block without type checks. Out-of-range slots are ignored.
    pub(crate) fn replace_block(&mut self, level: usize, index: usize, block: Option<DataHandle>) {
        if let Ok(slot) = self.slot_mut(level, index) {
            *slot = block;
        }
    }

    fn check_coverage(&self, level: usize) -> Result<(), DataError> {
        let ratio = self
            .refinement_ratio(level - 1)
            .ok_or(RefinementError::MissingRatio(level - 1))?;
        let parents = &self.levels[level - 1].boxes;
        for (index, b) in self.levels[level].boxes.iter().enumerate() {
            if b.is_invalid() {
                continue;
            }
            let covered = b
                .coarsen(ratio)
                .cells()
                .all(|cell| parents.iter().any(|p| !p.is_invalid() && p.contains_cell(cell)));
            if !covered {
                return Err(DataError::UncoveredBox { level, index });
            }
        }
        Ok(())
    }

    fn level_mut(&mut self, level: usize) -> Result<&mut AmrLevel, DataError> {
        let levels = self.levels.len();
        self.levels
            .get_mut(level)
            .ok_or(DataError::LevelOutOfRange { level, levels })
    }

    fn slot_mut(&mut self, level: usize, index: usize) -> Result<&mut Option<DataHandle>, DataError> {
        let lvl = self.level_mut(level)?;
        let len = lvl.blocks.len();
        lvl.blocks
            .get_mut(index)
            .ok_or(DataError::IndexOutOfRange { index, len })
    }

    fn invalidate(&mut self) {
        self.relations = None;
        self.blanking = None;
    }
}

impl HasBounds for AmrData {
    fn bounds(&self) -> Bounds {
        let mut out = Bounds::INVALID;
        for (level, lvl) in self.levels.iter().enumerate() {
            for b in lvl.boxes.iter().filter(|b| !b.is_invalid()) {
                out = out.merge(&b.bounds(self.origin, self.levels[level].spacing));
            }
        }
        out
    }
}

impl HasChildren for AmrData {
    fn number_of_children(&self) -> usize {
        self.total_blocks()
    }

    fn child(&self, index: usize) -> Option<&DataHandle> {
        let (level, index) = self.level_and_index(index)?;
        self.block(level, index)
    }
}

impl DeepClone for AmrData {
    fn deep_clone(&self) -> Self {
        let mut out = self.clone();
        for level in &mut out.levels {
            for block in &mut level.blocks {
                *block = block.as_ref().map(DeepClone::deep_clone);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tributary_core::Extent;

    /// Two levels in 2D: one 8x8 coarse box refined by 2 in its lower-left
    /// quarter.
    fn two_level() -> AmrData {
        let mut amr = AmrData::new(AmrMode::Overlapping);
        amr.set_grid_description(GridDescription::XyPlane);
        amr.initialize(&[1, 1]);
        let coarse = ImageGrid::new(Extent::new(0, 8, 0, 8, 0, 0), [0.0; 3], [1.0, 1.0, 1.0]);
        let fine = ImageGrid::new(Extent::new(0, 8, 0, 8, 0, 0), [0.0; 3], [0.5, 0.5, 1.0]);
        amr.set_grid(0, 0, coarse).unwrap();
        amr.set_grid(1, 0, fine).unwrap();
        amr
    }

    #[test]
    fn refinement_ratio_from_spacing() {
        let mut amr = two_level();
        amr.generate_refinement_ratio().unwrap();
        assert_eq!(amr.refinement_ratio(0), Some(2));
        assert_eq!(amr.refinement_ratio(1), Some(2));
    }

    #[test]
    fn constant_ratio_mismatch_is_rejected() {
        let mut amr = two_level();
        amr.set_constant_refinement_ratio(4);
        let err = amr.generate_refinement_ratio().unwrap_err();
        assert!(matches!(
            err,
            DataError::InconsistentRefinement(RefinementError::ConstantRatioMismatch {
                declared: 4,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn non_integer_ratio_is_rejected() {
        let mut amr = two_level();
        amr.set_spacing(1, [0.4, 0.4, 1.0]).unwrap();
        assert!(matches!(
            amr.generate_refinement_ratio(),
            Err(DataError::InconsistentRefinement(RefinementError::NonIntegerRatio { level: 0, .. }))
        ));
    }

    #[test]
    fn blanking_hides_refined_cells() {
        // --- 1. ARRANGE ---
        let mut amr = two_level();
        amr.generate_refinement_ratio().unwrap();

        // --- 2. ACT ---
        amr.generate_blanking().unwrap();

        // --- 3. ASSERT ---
        assert_eq!(amr.parents(1, 0), Some(&[0][..]));
        assert_eq!(amr.children(0, 0), Some(&[0][..]));
        assert_eq!(amr.number_of_visible_cells(0, 0), Some(64 - 16));
        assert_eq!(amr.number_of_visible_cells(1, 0), Some(64));
        let mask = amr.visibility(0, 0).unwrap();
        assert!(!mask[0]);
        assert!(mask[4]);
    }

    #[test]
    fn changes_invalidate_blanking() {
        let mut amr = two_level();
        amr.generate_refinement_ratio().unwrap();
        amr.generate_blanking().unwrap();
        assert!(amr.is_blanking_current());

        amr.set_spacing(1, [0.5, 0.5, 1.0]).unwrap();
        assert!(!amr.is_blanking_current());
        assert!(amr.visibility(0, 0).is_none());
    }

    #[test]
    fn blanked_block_marks_refined_cells() {
        let mut amr = two_level();
        amr.generate_refinement_ratio().unwrap();
        amr.generate_blanking().unwrap();
        let grid = amr.blanked_block(0, 0).unwrap().unwrap();
        let ghosts = grid.cell_data().array(GHOST_ARRAY_NAME).unwrap();
        assert_eq!(ghosts.as_u8().unwrap()[0], GHOST_REFINED);
        assert_eq!(ghosts.as_u8().unwrap()[63], 0);
    }

    #[test]
    fn same_level_overlap_is_rejected() {
        let mut amr = AmrData::new(AmrMode::NonOverlapping);
        amr.initialize(&[2]);
        amr.set_amr_box(0, 0, AmrBox::new([0, 0, 0], [3, 3, 3])).unwrap();
        amr.set_amr_box(0, 1, AmrBox::new([3, 0, 0], [6, 3, 3])).unwrap();
        assert_eq!(
            amr.validate(),
            Err(DataError::OverlappingBoxes {
                level: 0,
                first: 0,
                second: 1
            })
        );
    }

    #[test]
    fn uncovered_fine_box_is_rejected() {
        let mut amr = two_level();
        amr.generate_refinement_ratio().unwrap();
        assert_eq!(amr.validate(), Ok(()));

        amr.set_amr_box(1, 0, AmrBox::new([12, 12, 0], [19, 19, -1])).unwrap();
        assert_eq!(
            amr.validate(),
            Err(DataError::UncoveredBox { level: 1, index: 0 })
        );
    }

    #[test]
    fn flat_indices_are_level_major() {
        let mut amr = AmrData::new(AmrMode::Overlapping);
        amr.initialize(&[2, 3]);
        assert_eq!(amr.total_blocks(), 5);
        assert_eq!(amr.flat_index(1, 2), Some(4));
        assert_eq!(amr.level_and_index(2), Some((1, 0)));
        assert_eq!(amr.flat_index(0, 2), None);
    }

    #[test]
    fn box_bounds_use_level_spacing() {
        let amr = two_level();
        let b = amr.bounds(1, 0).unwrap();
        assert_relative_eq!(b.0[1], 4.0);
        assert_relative_eq!(HasBounds::bounds(&amr).0[1], 8.0);
    }

    #[test]
    fn non_image_blocks_are_rejected() {
        let mut amr = AmrData::new(AmrMode::Overlapping);
        amr.initialize(&[1]);
        let table = DataHandle::new(crate::object::DataObject::of_type(DataObjectType::Table));
        assert!(matches!(
            amr.set_child_at(0, 0, Some(table)),
            Err(DataError::InvalidChild { .. })
        ));
    }
}
