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


//! Integer index-space extents and floating-point bounds.
//!
//! An [`Extent`] is an inclusive node range `[x0, x1, y0, y1, z0, z1]` on a
//! structured lattice. An axis with `lo == hi` is degenerate (a 2D or 1D
//! dataset) and is left untouched by growing, refining and coarsening.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive structured node extent `[x0, x1, y0, y1, z0, z1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent(pub [i32; 6]);

impl Extent {
    /// The canonical empty extent.
    pub const EMPTY: Self = Self([0, -1, 0, -1, 0, -1]);

    /// Creates an extent from its six bounds.
    pub const fn new(x0: i32, x1: i32, y0: i32, y1: i32, z0: i32, z1: i32) -> Self {
        Self([x0, x1, y0, y1, z0, z1])
    }

    /// Builds the zero-based extent of a lattice with the given node dimensions.
    pub fn from_dimensions(dims: [i32; 3]) -> Self {
        Self([0, dims[0] - 1, 0, dims[1] - 1, 0, dims[2] - 1])
    }

    /// Lower bound on `axis`.
    #[inline]
    pub fn lo(&self, axis: usize) -> i32 {
        self.0[2 * axis]
    }

    /// Upper bound on `axis`.
    #[inline]
    pub fn hi(&self, axis: usize) -> i32 {
        self.0[2 * axis + 1]
    }

    /// Returns `true` if any axis has `hi < lo`.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|a| self.hi(a) < self.lo(a))
    }

    /// Returns `true` if `axis` spans a single node.
    pub fn is_degenerate(&self, axis: usize) -> bool {
        self.lo(axis) == self.hi(axis)
    }

    /// Number of non-degenerate axes.
    pub fn dimensionality(&self) -> usize {
        (0..3).filter(|&a| self.hi(a) > self.lo(a)).count()
    }

    /// Node counts per axis (zero on an empty extent).
    pub fn dimensions(&self) -> [i32; 3] {
        if self.is_empty() {
            return [0, 0, 0];
        }
        [
            self.hi(0) - self.lo(0) + 1,
            self.hi(1) - self.lo(1) + 1,
            self.hi(2) - self.lo(2) + 1,
        ]
    }

    /// Cell counts per axis. A degenerate axis contributes one cell layer.
    pub fn cell_dimensions(&self) -> [i32; 3] {
        if self.is_empty() {
            return [0, 0, 0];
        }
        let d = self.dimensions();
        [(d[0] - 1).max(1), (d[1] - 1).max(1), (d[2] - 1).max(1)]
    }

    /// Inclusive cell index range covered by this node extent.
    pub fn cell_extent(&self) -> Extent {
        if self.is_empty() {
            return Self::EMPTY;
        }
        let mut out = self.0;
        for axis in 0..3 {
            if !self.is_degenerate(axis) {
                out[2 * axis + 1] -= 1;
            }
        }
        Extent(out)
    }

    /// Total number of nodes.
    pub fn number_of_points(&self) -> usize {
        let d = self.dimensions();
        d.iter().map(|&v| v.max(0) as usize).product()
    }

    /// Total number of cells.
    pub fn number_of_cells(&self) -> usize {
        let d = self.cell_dimensions();
        d.iter().map(|&v| v.max(0) as usize).product()
    }

    /// Returns `true` if node `(i, j, k)` lies inside the extent.
    pub fn contains_point(&self, ijk: [i32; 3]) -> bool {
        (0..3).all(|a| ijk[a] >= self.lo(a) && ijk[a] <= self.hi(a))
    }

    /// Returns `true` if `other` is completely inside this extent.
    pub fn contains(&self, other: &Extent) -> bool {
        if other.is_empty() {
            return true;
        }
        (0..3).all(|a| other.lo(a) >= self.lo(a) && other.hi(a) <= self.hi(a))
    }

    /// The common part of two extents, `None` if they do not touch.
    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        let mut out = [0; 6];
        for axis in 0..3 {
            out[2 * axis] = self.lo(axis).max(other.lo(axis));
            out[2 * axis + 1] = self.hi(axis).min(other.hi(axis));
        }
        let out = Extent(out);
        (!out.is_empty()).then_some(out)
    }

    /// The smallest extent containing both.
    pub fn union(&self, other: &Extent) -> Extent {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let mut out = [0; 6];
        for axis in 0..3 {
            out[2 * axis] = self.lo(axis).min(other.lo(axis));
            out[2 * axis + 1] = self.hi(axis).max(other.hi(axis));
        }
        Extent(out)
    }

    /// Grows every non-degenerate axis by `n` nodes on both sides,
    /// saturating at the `i32` range.
    pub fn grow(&self, n: i32) -> Extent {
        let mut out = self.0;
        for axis in 0..3 {
            if !self.is_degenerate(axis) {
                out[2 * axis] = out[2 * axis].saturating_sub(n);
                out[2 * axis + 1] = out[2 * axis + 1].saturating_add(n);
            }
        }
        Extent(out)
    }

    /// Clamps this extent into `whole`.
    pub fn clip(&self, whole: &Extent) -> Extent {
        let mut out = self.0;
        for axis in 0..3 {
            out[2 * axis] = out[2 * axis].max(whole.lo(axis));
            out[2 * axis + 1] = out[2 * axis + 1].min(whole.hi(axis));
        }
        Extent(out)
    }

    /// Node extent one level finer for refinement ratio `ratio`.
    pub fn refine(&self, ratio: i32) -> Extent {
        let mut out = self.0;
        for axis in 0..3 {
            if !self.is_degenerate(axis) {
                out[2 * axis] *= ratio;
                out[2 * axis + 1] *= ratio;
            }
        }
        Extent(out)
    }

    /// Node extent one level coarser for refinement ratio `ratio`.
    ///
    /// The result covers every fine node: lower bounds round down, upper
    /// bounds round up.
    pub fn coarsen(&self, ratio: i32) -> Extent {
        let mut out = self.0;
        for axis in 0..3 {
            if !self.is_degenerate(axis) {
                out[2 * axis] = out[2 * axis].div_euclid(ratio);
                let hi = out[2 * axis + 1];
                out[2 * axis + 1] = hi.div_euclid(ratio) + i32::from(hi.rem_euclid(ratio) != 0);
            }
        }
        Extent(out)
    }

    /// Linear offset of node `(i, j, k)` in x-fastest order.
    pub fn point_offset(&self, ijk: [i32; 3]) -> usize {
        let d = self.dimensions();
        let i = (ijk[0] - self.lo(0)) as usize;
        let j = (ijk[1] - self.lo(1)) as usize;
        let k = (ijk[2] - self.lo(2)) as usize;
        i + d[0] as usize * (j + d[1] as usize * k)
    }

    /// Iterates all `(i, j, k)` nodes in x-fastest order.
    pub fn iter_points(&self) -> impl Iterator<Item = [i32; 3]> + '_ {
        let ext = *self;
        let empty = self.is_empty();
        (ext.lo(2)..=ext.hi(2))
            .flat_map(move |k| (ext.lo(1)..=ext.hi(1)).map(move |j| (j, k)))
            .flat_map(move |(j, k)| (ext.lo(0)..=ext.hi(0)).map(move |i| [i, j, k]))
            .filter(move |_| !empty)
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<[i32; 6]> for Extent {
    fn from(value: [i32; 6]) -> Self {
        Self(value)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &self.0;
        write!(
            f,
            "[{}, {}] x [{}, {}] x [{}, {}]",
            e[0], e[1], e[2], e[3], e[4], e[5]
        )
    }
}

/// Splits a whole extent into streaming pieces.
///
/// Pieces are produced by recursive bisection along the currently longest
/// axis. Neighbouring pieces share their boundary node layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtentTranslator;

impl ExtentTranslator {
    /// Returns the extent of `piece` out of `num_pieces`, grown by
    /// `ghost_levels` and clipped to `whole`.
    ///
    /// Pieces that cannot be carved out of a too-small extent are empty.
    pub fn piece_to_extent(
        whole: &Extent,
        piece: u32,
        num_pieces: u32,
        ghost_levels: u32,
    ) -> Extent {
        if whole.is_empty() || num_pieces == 0 || piece >= num_pieces {
            return Extent::EMPTY;
        }
        let mut ext = *whole;
        let mut piece = piece;
        let mut count = num_pieces;
        while count > 1 {
            let axis = (0..3)
                .max_by_key(|&a| (ext.hi(a) - ext.lo(a), std::cmp::Reverse(a)))
                .unwrap_or(0);
            let size = ext.hi(axis) - ext.lo(axis);
            if size < 1 {
                return if piece == 0 { ext } else { Extent::EMPTY };
            }
            let first = count / 2;
            let mid = ext.lo(axis) + (i64::from(size) * i64::from(first) / i64::from(count)) as i32;
            if piece < first {
                ext.0[2 * axis + 1] = mid;
                count = first;
            } else {
                ext.0[2 * axis] = mid;
                piece -= first;
                count -= first;
            }
        }
        if ghost_levels > 0 {
            ext = ext.grow(i32::try_from(ghost_levels).unwrap_or(i32::MAX)).clip(whole);
        }
        ext
    }
}

/// Axis-aligned floating-point bounds `[xmin, xmax, ymin, ymax, zmin, zmax]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds(pub [f64; 6]);

impl Bounds {
    /// Bounds that contain nothing. Merging with `INVALID` yields the other operand.
    pub const INVALID: Self = Self([
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
    ]);

    /// Bounds of a structured extent placed at `origin` with `spacing`.
    pub fn from_extent(extent: &Extent, origin: [f64; 3], spacing: [f64; 3]) -> Self {
        if extent.is_empty() {
            return Self::INVALID;
        }
        let mut out = [0.0; 6];
        for axis in 0..3 {
            let a = origin[axis] + f64::from(extent.lo(axis)) * spacing[axis];
            let b = origin[axis] + f64::from(extent.hi(axis)) * spacing[axis];
            out[2 * axis] = a.min(b);
            out[2 * axis + 1] = a.max(b);
        }
        Self(out)
    }

    /// Returns `true` if min <= max on every axis.
    pub fn is_valid(&self) -> bool {
        (0..3).all(|a| self.0[2 * a] <= self.0[2 * a + 1])
    }

    /// Expands to include `point`.
    pub fn include_point(&mut self, point: [f64; 3]) {
        for axis in 0..3 {
            self.0[2 * axis] = self.0[2 * axis].min(point[axis]);
            self.0[2 * axis + 1] = self.0[2 * axis + 1].max(point[axis]);
        }
    }

    /// The smallest bounds containing both.
    pub fn merge(&self, other: &Bounds) -> Bounds {
        let mut out = [0.0; 6];
        for axis in 0..3 {
            out[2 * axis] = self.0[2 * axis].min(other.0[2 * axis]);
            out[2 * axis + 1] = self.0[2 * axis + 1].max(other.0[2 * axis + 1]);
        }
        Bounds(out)
    }

    /// Returns `true` if the two boxes share at least one point.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.is_valid()
            && other.is_valid()
            && (0..3).all(|a| {
                self.0[2 * a] <= other.0[2 * a + 1] && other.0[2 * a] <= self.0[2 * a + 1]
            })
    }

    /// Geometric centre.
    pub fn center(&self) -> [f64; 3] {
        [
            0.5 * (self.0[0] + self.0[1]),
            0.5 * (self.0[2] + self.0[3]),
            0.5 * (self.0[4] + self.0[5]),
        ]
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::INVALID
    }
}
