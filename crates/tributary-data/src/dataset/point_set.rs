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


use super::bounds_of_points;
use crate::array::DataArray;
use crate::error::DataError;
use crate::field::FieldData;
use crate::object::{DeepClone, HasBounds};
use tributary_core::Bounds;

const POINTS_NAME: &str = "Points";

/// A list of points with per-point attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    points: DataArray,
    point_data: FieldData,
}

impl Default for PointSet {
    fn default() -> Self {
        Self::from_points(Vec::new())
    }
}

impl PointSet {
    /// Creates a point set from coordinates.
    pub fn from_points(points: Vec<[f64; 3]>) -> Self {
        let flat = points.into_iter().flatten().collect();
        Self {
            points: DataArray::from_f64(POINTS_NAME, 3, flat),
            point_data: FieldData::new(),
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

    /// Coordinates of point `index`.
    pub fn point(&self, index: usize) -> Option<[f64; 3]> {
        let xyz = self.points.as_f64()?.get(index * 3..index * 3 + 3)?;
        Some([xyz[0], xyz[1], xyz[2]])
    }

    /// Appends a point and returns its index.
    pub fn insert_next_point(&mut self, point: [f64; 3]) -> usize {
        if let Some(values) = self.points.f64_mut() {
            values.extend_from_slice(&point);
        }
        self.number_of_points() - 1
    }

    /// Per-point attributes.
    pub fn point_data(&self) -> &FieldData {
        &self.point_data
    }

    /// Per-point attributes, mutably.
    pub fn point_data_mut(&mut self) -> &mut FieldData {
        &mut self.point_data
    }

    /// Checks that every attribute array has one tuple per point.
    pub fn validate(&self) -> Result<(), DataError> {
        super::image::check_lengths(&self.point_data, self.number_of_points())
    }
}

impl HasBounds for PointSet {
    fn bounds(&self) -> Bounds {
        self.points
            .as_f64()
            .map_or(Bounds::INVALID, bounds_of_points)
    }
}

impl DeepClone for PointSet {
    fn deep_clone(&self) -> Self {
        Self {
            points: self.points.deep_clone(),
            point_data: self.point_data.deep_clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_bounds() {
        let mut set = PointSet::default();
        assert!(!set.bounds().is_valid());

        set.insert_next_point([1.0, -1.0, 0.0]);
        let last = set.insert_next_point([3.0, 2.0, 5.0]);

        assert_eq!(last, 1);
        assert_eq!(set.point(1), Some([3.0, 2.0, 5.0]));
        assert_eq!(set.bounds(), Bounds([1.0, 3.0, -1.0, 2.0, 0.0, 5.0]));
    }

    #[test]
    fn inserting_into_a_shallow_copy_leaves_source_alone() {
        let source = PointSet::from_points(vec![[0.0; 3]]);
        let mut copy = source.clone();
        copy.insert_next_point([1.0; 3]);

        assert_eq!(source.number_of_points(), 1);
        assert_eq!(copy.number_of_points(), 2);
    }
}
