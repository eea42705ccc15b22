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


use serde::{Deserialize, Serialize};
use tributary_core::{Bounds, Extent};

/// A box of cells `[lo, hi]` (inclusive) in the index space of one level.
///
/// An inactive axis of a lower-dimensional dataset is stored as
/// `hi == lo - 1` and is left alone by refinement and coarsening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmrBox {
    lo: [i32; 3],
    hi: [i32; 3],
}

impl AmrBox {
    /// A box with no cells, used for slots whose box is not set yet.
    pub const INVALID: AmrBox = AmrBox {
        lo: [0; 3],
        hi: [-2; 3],
    };

    /// Creates a box from its cell corners.
    pub const fn new(lo: [i32; 3], hi: [i32; 3]) -> Self {
        Self { lo, hi }
    }

    /// Converts a node extent into the box of its cells. A degenerate axis
    /// becomes an inactive one.
    pub fn from_node_extent(extent: &Extent) -> Self {
        let mut lo = [0; 3];
        let mut hi = [0; 3];
        for axis in 0..3 {
            lo[axis] = extent.lo(axis);
            hi[axis] = extent.hi(axis) - 1;
        }
        Self { lo, hi }
    }

    /// Lower cell corner.
    pub fn lo(&self) -> [i32; 3] {
        self.lo
    }

    /// Upper cell corner.
    pub fn hi(&self) -> [i32; 3] {
        self.hi
    }

    /// Returns `true` if `axis` is inactive.
    pub fn is_inactive(&self, axis: usize) -> bool {
        self.hi[axis] == self.lo[axis] - 1
    }

    /// Returns `true` if some axis has `hi < lo - 1`, or every axis is inactive.
    pub fn is_invalid(&self) -> bool {
        (0..3).any(|a| self.hi[a] < self.lo[a] - 1) || (0..3).all(|a| self.is_inactive(a))
    }

    /// Cells per axis; an inactive axis counts as one layer.
    pub fn cell_dimensions(&self) -> [i32; 3] {
        let mut d = [1; 3];
        for (axis, out) in d.iter_mut().enumerate() {
            if !self.is_inactive(axis) {
                *out = (self.hi[axis] - self.lo[axis] + 1).max(0);
            }
        }
        d
    }

    /// Number of cells.
    pub fn number_of_cells(&self) -> usize {
        if self.is_invalid() {
            return 0;
        }
        self.cell_dimensions()
            .iter()
            .map(|&v| v as usize)
            .product()
    }

    /// Returns `true` if cell `ijk` is inside. Inactive axes are ignored.
    pub fn contains_cell(&self, ijk: [i32; 3]) -> bool {
        (0..3).all(|a| self.is_inactive(a) || (ijk[a] >= self.lo[a] && ijk[a] <= self.hi[a]))
    }

    /// The common cells of two boxes.
    pub fn intersection(&self, other: &AmrBox) -> Option<AmrBox> {
        let mut out = *self;
        for axis in 0..3 {
            if self.is_inactive(axis) {
                continue;
            }
            out.lo[axis] = self.lo[axis].max(other.lo[axis]);
            out.hi[axis] = self.hi[axis].min(other.hi[axis]);
            if out.hi[axis] < out.lo[axis] {
                return None;
            }
        }
        Some(out)
    }

    /// Returns `true` if the boxes share at least one cell.
    pub fn intersects(&self, other: &AmrBox) -> bool {
        self.intersection(other).is_some()
    }

    /// The same cells one level finer.
    pub fn refine(&self, ratio: i32) -> AmrBox {
        let mut out = *self;
        for axis in 0..3 {
            if !self.is_inactive(axis) {
                out.lo[axis] = self.lo[axis] * ratio;
                out.hi[axis] = (self.hi[axis] + 1) * ratio - 1;
            }
        }
        out
    }

    /// The coarse cells covering this box one level coarser.
    pub fn coarsen(&self, ratio: i32) -> AmrBox {
        let mut out = *self;
        for axis in 0..3 {
            if !self.is_inactive(axis) {
                out.lo[axis] = self.lo[axis].div_euclid(ratio);
                out.hi[axis] = self.hi[axis].div_euclid(ratio);
            }
        }
        out
    }

    /// Iterates over the cells in x-fastest order.
    pub fn cells(&self) -> impl Iterator<Item = [i32; 3]> {
        self.cell_extent().iter_points().collect::<Vec<_>>().into_iter()
    }

    /// Cell index range as an extent; inactive axes collapse to `lo`.
    pub fn cell_extent(&self) -> Extent {
        if self.is_invalid() {
            return Extent::EMPTY;
        }
        let mut out = [0; 6];
        for axis in 0..3 {
            out[2 * axis] = self.lo[axis];
            out[2 * axis + 1] = if self.is_inactive(axis) {
                self.lo[axis]
            } else {
                self.hi[axis]
            };
        }
        Extent(out)
    }

    /// Node extent of the box.
    pub fn node_extent(&self) -> Extent {
        if self.is_invalid() {
            return Extent::EMPTY;
        }
        let mut out = [0; 6];
        for axis in 0..3 {
            out[2 * axis] = self.lo[axis];
            out[2 * axis + 1] = self.hi[axis] + 1;
        }
        Extent(out)
    }

    /// Spatial bounds at the given origin and level spacing.
    pub fn bounds(&self, origin: [f64; 3], spacing: [f64; 3]) -> Bounds {
        Bounds::from_extent(&self.node_extent(), origin, spacing)
    }

    /// Packs the corners as `[lo0, lo1, lo2, hi0, hi1, hi2]`.
    pub fn serialize(&self) -> [i32; 6] {
        [
            self.lo[0], self.lo[1], self.lo[2], self.hi[0], self.hi[1], self.hi[2],
        ]
    }

    /// Inverse of [`AmrBox::serialize`].
    pub fn deserialize(packed: [i32; 6]) -> Self {
        Self {
            lo: [packed[0], packed[1], packed[2]],
            hi: [packed[3], packed[4], packed[5]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refine_and_coarsen_are_consistent() {
        let b = AmrBox::new([1, 2, 0], [3, 4, -1]);
        let fine = b.refine(2);
        assert_eq!(fine, AmrBox::new([2, 4, 0], [7, 9, -1]));
        assert_eq!(fine.coarsen(2), b);
        assert!(fine.is_inactive(2));
    }

    #[test]
    fn counts_ignore_inactive_axes() {
        let b = AmrBox::new([0, 0, 0], [3, 1, -1]);
        assert_eq!(b.number_of_cells(), 8);
        assert_eq!(b.cells().count(), 8);
        assert_eq!(b.node_extent(), Extent::new(0, 4, 0, 2, 0, 0));
    }

    #[test]
    fn node_extent_round_trip() {
        let ext = Extent::new(0, 10, 0, 10, 0, 0);
        let b = AmrBox::from_node_extent(&ext);
        assert_eq!(b.node_extent(), ext);
        assert_eq!(b.number_of_cells(), 100);
    }

    #[test]
    fn intersection() {
        let a = AmrBox::new([0, 0, 0], [4, 4, 4]);
        let b = AmrBox::new([3, 3, 3], [9, 9, 9]);
        assert_eq!(a.intersection(&b), Some(AmrBox::new([3, 3, 3], [4, 4, 4])));
        assert!(!a.intersects(&AmrBox::new([5, 0, 0], [6, 4, 4])));
    }

    #[test]
    fn serialization_order() {
        let b = AmrBox::new([1, 2, 3], [4, 5, 6]);
        assert_eq!(b.serialize(), [1, 2, 3, 4, 5, 6]);
        assert_eq!(AmrBox::deserialize(b.serialize()), b);
    }
}
