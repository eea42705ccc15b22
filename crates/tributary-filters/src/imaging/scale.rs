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


//! Parameterised scaling of a point array.

use crate::SCALARS;
use std::any::Any;
use tributary_core::{InformationVector, ModifiedTime, TimeStamp};
use tributary_data::{DataArray, DataKind, DataObject, DataTypeConstraint, FieldData};
use tributary_pipeline::{Algorithm, AlgorithmError, InputPortInfo, PortData, Request};

/// Multiplies one point array of a dataset by a factor.
///
/// Accepts any dataset. Fed a composite input, it runs once per block.
/// Geometry and every other array are shared with the input.
#[derive(Debug)]
pub struct ScaleFilter {
    factor: f64,
    array: String,
    mtime: ModifiedTime,
    executions: usize,
}

impl ScaleFilter {
    /// Scales the default scalar array by `factor`.
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            array: SCALARS.to_string(),
            mtime: ModifiedTime::new(),
            executions: 0,
        }
    }

    /// Selects the point array to scale.
    pub fn with_array(mut self, name: impl Into<String>) -> Self {
        self.array = name.into();
        self
    }

    /// The scale factor.
    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Changes the scale factor.
    pub fn set_factor(&mut self, factor: f64) {
        if self.factor != factor {
            self.factor = factor;
            self.mtime.modified();
        }
    }

    /// Number of times the filter has run, blocks counted separately.
    #[must_use]
    pub fn executions(&self) -> usize {
        self.executions
    }

    fn scale(&self, points: &mut FieldData) -> Result<(), AlgorithmError> {
        let array = points
            .array_mut(&self.array)
            .ok_or_else(|| AlgorithmError::bad_input(0, format!("no point array {:?}", self.array)))?;
        match array.f64_mut() {
            Some(values) => values.iter_mut().for_each(|v| *v *= self.factor),
            None => {
                let scaled: Vec<f64> = (0..array.len())
                    .filter_map(|i| array.value(i))
                    .map(|v| v * self.factor)
                    .collect();
                *array = DataArray::from_f64(array.name().to_string(), array.components(), scaled);
            }
        }
        Ok(())
    }
}

impl Algorithm for ScaleFilter {
    fn name(&self) -> &str {
        "ScaleFilter"
    }

    fn fill_input_port_information(&self, _port: usize) -> InputPortInfo {
        InputPortInfo::new(DataTypeConstraint::DataSet)
    }

    fn modified_time(&self) -> TimeStamp {
        self.mtime.get()
    }

    fn request_data(
        &mut self,
        _request: &Request,
        inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        let input = inputs
            .first()
            .and_then(|v| v.data(0))
            .ok_or_else(|| AlgorithmError::bad_input(0, "no input data"))?;
        let mut kind = input.kind().clone();
        match &mut kind {
            DataKind::ImageGrid(grid) => self.scale(grid.point_data_mut())?,
            DataKind::PointSet(set) => self.scale(set.point_data_mut())?,
            DataKind::UnstructuredGrid(grid) => self.scale(grid.point_data_mut())?,
            _ => {
                return Err(AlgorithmError::bad_input(
                    0,
                    format!("cannot scale a {}", input.data_type()),
                ))
            }
        }
        self.executions += 1;
        outputs.set_data(0, DataObject::new(kind));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tributary_data::ImageGrid;
    use tributary_core::Extent;

    #[test]
    fn integer_arrays_are_promoted() {
        let filter = ScaleFilter::new(0.5).with_array("ids");
        let mut grid = ImageGrid::new(Extent::new(0, 2, 0, 0, 0, 0), [0.0; 3], [1.0; 3]);
        grid.point_data_mut()
            .add_array(DataArray::from_i32("ids", 1, vec![2, 4, 6]));

        filter.scale(grid.point_data_mut()).unwrap();

        let ids = grid.point_data().array("ids").unwrap();
        assert_eq!(ids.as_f64(), Some(&[1.0, 2.0, 3.0][..]));
    }

    #[test]
    fn missing_array_is_a_bad_input() {
        let filter = ScaleFilter::new(2.0).with_array("nope");
        let mut points = FieldData::new();
        assert!(matches!(
            filter.scale(&mut points),
            Err(AlgorithmError::BadInput { port: 0, .. })
        ));
    }
}
