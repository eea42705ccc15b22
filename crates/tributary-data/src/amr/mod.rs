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


//! Adaptive mesh refinement hierarchies.
//!
//! An AMR object stores, per level, a spacing, a list of cell boxes and one
//! optional image block per box. Parent/child relations and blanking masks
//! are derived from the boxes and regenerated on demand; any change to
//! boxes, spacing or refinement ratios discards them.

mod amr_box;
mod connectivity;
mod data;

pub use self::amr_box::AmrBox;
pub use self::connectivity::{AmrGridConnectivity, GhostedGrid, GridNeighbor, Orientation, Relation};
pub use self::data::AmrData;

use crate::object::DataObjectType;
use serde::{Deserialize, Serialize};

/// Whether finer levels overlap the coarser ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmrMode {
    /// Every level covers its region completely; coarse cells under finer
    /// boxes are blanked.
    Overlapping,
    /// Levels tile space without overlap.
    NonOverlapping,
}

impl AmrMode {
    /// The matching type tag.
    pub const fn data_type(self) -> DataObjectType {
        match self {
            AmrMode::Overlapping => DataObjectType::OverlappingAmr,
            AmrMode::NonOverlapping => DataObjectType::NonOverlappingAmr,
        }
    }
}

/// Which axes of a structured dataset are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridDescription {
    /// A single point.
    SinglePoint,
    /// Varies along x only.
    XLine,
    /// Varies along y only.
    YLine,
    /// Varies along z only.
    ZLine,
    /// Varies along x and y.
    XyPlane,
    /// Varies along y and z.
    YzPlane,
    /// Varies along x and z.
    XzPlane,
    /// Varies along all axes.
    XyzGrid,
    /// No points.
    Empty,
}

impl GridDescription {
    const CODES: [(GridDescription, i32); 9] = [
        (GridDescription::SinglePoint, 1),
        (GridDescription::XLine, 2),
        (GridDescription::YLine, 3),
        (GridDescription::ZLine, 4),
        (GridDescription::XyPlane, 5),
        (GridDescription::YzPlane, 6),
        (GridDescription::XzPlane, 7),
        (GridDescription::XyzGrid, 8),
        (GridDescription::Empty, 9),
    ];

    /// Legacy integer code.
    pub fn code(self) -> i32 {
        Self::CODES
            .iter()
            .find(|(d, _)| *d == self)
            .map_or(0, |(_, c)| *c)
    }

    /// Inverse of [`GridDescription::code`].
    pub fn from_code(code: i32) -> Option<Self> {
        Self::CODES.iter().find(|(_, c)| *c == code).map(|(d, _)| *d)
    }

    /// Active axes.
    pub const fn active_axes(self) -> [bool; 3] {
        match self {
            GridDescription::SinglePoint | GridDescription::Empty => [false, false, false],
            GridDescription::XLine => [true, false, false],
            GridDescription::YLine => [false, true, false],
            GridDescription::ZLine => [false, false, true],
            GridDescription::XyPlane => [true, true, false],
            GridDescription::YzPlane => [false, true, true],
            GridDescription::XzPlane => [true, false, true],
            GridDescription::XyzGrid => [true, true, true],
        }
    }

    /// Description matching a set of active axes.
    pub fn from_active_axes(axes: [bool; 3]) -> Self {
        match axes {
            [false, false, false] => GridDescription::SinglePoint,
            [true, false, false] => GridDescription::XLine,
            [false, true, false] => GridDescription::YLine,
            [false, false, true] => GridDescription::ZLine,
            [true, true, false] => GridDescription::XyPlane,
            [false, true, true] => GridDescription::YzPlane,
            [true, false, true] => GridDescription::XzPlane,
            [true, true, true] => GridDescription::XyzGrid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_codes_round_trip() {
        for (d, _) in GridDescription::CODES {
            assert_eq!(GridDescription::from_code(d.code()), Some(d));
        }
        assert_eq!(
            GridDescription::from_active_axes([true, true, false]),
            GridDescription::XyPlane
        );
    }
}
