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


//! Error types for data-model violations.

use crate::object::DataObjectType;
use thiserror::Error;

/// Ways an AMR hierarchy can violate its declared refinement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefinementError {
    /// A constant ratio was declared but the data implies another one.
    #[error("level {level}: declared constant ratio {declared} but found {actual}")]
    ConstantRatioMismatch {
        /// Coarser of the two levels involved.
        level: usize,
        /// The declared constant ratio.
        declared: i32,
        /// The ratio implied by the data.
        actual: i32,
    },
    /// Grids of one level were registered with different ratios.
    #[error("level {level}: grids disagree on the refinement ratio ({first} vs {second})")]
    LevelRatioMismatch {
        /// The level.
        level: usize,
        /// Ratio of the first grid seen.
        first: i32,
        /// Conflicting ratio.
        second: i32,
    },
    /// Spacing between two levels is not an integer multiple.
    #[error("level {level}: spacing ratio {ratio} is not an integer")]
    NonIntegerRatio {
        /// Coarser of the two levels involved.
        level: usize,
        /// The measured ratio.
        ratio: f64,
    },
    /// A refinement ratio below two.
    #[error("level {level}: refinement ratio {ratio} is below 2")]
    RatioTooSmall {
        /// The level.
        level: usize,
        /// The offending ratio.
        ratio: i32,
    },
    /// Two grids overlap across more than one level.
    #[error("grids {first} and {second} overlap across {levels} levels; refinement is not balanced")]
    Unbalanced {
        /// First grid id.
        first: usize,
        /// Second grid id.
        second: usize,
        /// Level difference.
        levels: usize,
    },
    /// No refinement ratio is known for a level.
    #[error("level {0} has no refinement ratio")]
    MissingRatio(usize),
}

/// Errors raised by data objects.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// A child or block index is out of range.
    #[error("index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current length.
        len: usize,
    },
    /// An AMR level is out of range.
    #[error("level {level} out of range ({levels} levels)")]
    LevelOutOfRange {
        /// Requested level.
        level: usize,
        /// Number of levels.
        levels: usize,
    },
    /// A container cannot hold a child of the given type.
    #[error("a {parent} cannot hold a {child} child")]
    InvalidChild {
        /// The container type.
        parent: DataObjectType,
        /// The rejected child type.
        child: DataObjectType,
    },
    /// An operation needed a different data type.
    #[error("expected a {expected}, found a {found}")]
    TypeMismatch {
        /// What the operation needed.
        expected: DataObjectType,
        /// What it got.
        found: DataObjectType,
    },
    /// AMR refinement is inconsistent.
    #[error("inconsistent refinement: {0}")]
    InconsistentRefinement(#[from] RefinementError),
    /// Two boxes of one level overlap.
    #[error("level {level}: boxes {first} and {second} overlap")]
    OverlappingBoxes {
        /// The level.
        level: usize,
        /// First box index.
        first: usize,
        /// Second box index.
        second: usize,
    },
    /// A refined box is not covered by its parent level.
    #[error("level {level}: box {index} is not covered by the next coarser level")]
    UncoveredBox {
        /// The level of the uncovered box.
        level: usize,
        /// The box index.
        index: usize,
    },
    /// An array does not match the size of the structure it is attached to.
    #[error("array '{name}' has {found} tuples, expected {expected}")]
    ArrayLength {
        /// Array name.
        name: String,
        /// Expected tuple count.
        expected: usize,
        /// Actual tuple count.
        found: usize,
    },
    /// A cell was given the wrong number of point ids.
    #[error("{cell} cells take {expected} points, got {found}")]
    InvalidCell {
        /// The cell type name.
        cell: &'static str,
        /// Expected point count.
        expected: usize,
        /// Provided point count.
        found: usize,
    },
    /// A referenced point, vertex or row does not exist.
    #[error("{what} {index} does not exist")]
    MissingElement {
        /// What kind of element.
        what: &'static str,
        /// Its index.
        index: usize,
    },
    /// A grid id was registered twice with the connectivity engine.
    #[error("grid {0} is already registered")]
    DuplicateGrid(usize),
    /// A grid id is unknown to the connectivity engine.
    #[error("grid {0} is not registered")]
    UnknownGrid(usize),
    /// An annotation handle is stale or invalid.
    #[error("annotation handle is stale")]
    StaleAnnotation,
}
