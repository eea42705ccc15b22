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


//! Fan-in concatenation of point sets and unstructured grids.

use std::any::Any;
use tributary_core::{InformationVector, ModifiedTime, TimeStamp};
use tributary_data::{
    DataArray, DataKind, DataObject, DataObjectType, DataTypeConstraint, FieldData,
    UnstructuredGrid,
};
use tributary_pipeline::{
    Algorithm, AlgorithmError, InputPortInfo, OutputPortInfo, PortData, Request,
};

/// Concatenates every dataset connected to its single repeatable input
/// into one unstructured grid.
///
/// Cells of unstructured inputs are kept with their point ids shifted.
/// A point array is kept only when every input carries it with the same
/// component count.
#[derive(Debug, Default)]
pub struct AppendFilter {
    mtime: ModifiedTime,
}

impl AppendFilter {
    /// Creates the filter.
    pub fn new() -> Self {
        Self::default()
    }
}

struct Part<'a> {
    points: &'a DataArray,
    point_data: &'a FieldData,
    grid: Option<&'a UnstructuredGrid>,
}

fn part(object: &DataObject) -> Option<Part<'_>> {
    match object.kind() {
        DataKind::PointSet(set) => Some(Part {
            points: set.points(),
            point_data: set.point_data(),
            grid: None,
        }),
        DataKind::UnstructuredGrid(grid) => Some(Part {
            points: grid.points(),
            point_data: grid.point_data(),
            grid: Some(grid),
        }),
        _ => None,
    }
}

fn shared_arrays(parts: &[Part<'_>]) -> Vec<DataArray> {
    let Some(first) = parts.first() else {
        return Vec::new();
    };
    first
        .point_data
        .iter()
        .filter(|array| {
            parts.iter().all(|p| {
                p.point_data
                    .array(array.name())
                    .is_some_and(|other| other.components() == array.components())
            })
        })
        .map(|array| {
            let values: Vec<f64> = parts
                .iter()
                .filter_map(|p| p.point_data.array(array.name()))
                .flat_map(|a| (0..a.len()).filter_map(|i| a.value(i)))
                .collect();
            DataArray::from_f64(array.name().to_string(), array.components(), values)
        })
        .collect()
}

impl Algorithm for AppendFilter {
    fn name(&self) -> &str {
        "AppendFilter"
    }

    fn fill_input_port_information(&self, _port: usize) -> InputPortInfo {
        InputPortInfo::new(DataTypeConstraint::OneOf(vec![
            DataObjectType::PointSet,
            DataObjectType::UnstructuredGrid,
        ]))
        .repeatable()
    }

    fn fill_output_port_information(&self, _port: usize) -> OutputPortInfo {
        OutputPortInfo::Concrete(DataObjectType::UnstructuredGrid)
    }

    fn modified_time(&self) -> TimeStamp {
        self.mtime.get()
    }

    fn request_data(
        &mut self,
        request: &Request,
        inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        let vector = inputs
            .first()
            .ok_or_else(|| AlgorithmError::bad_input(0, "no input port"))?;
        let handles: Vec<_> = (0..vector.len()).filter_map(|c| vector.data(c)).collect();
        let parts: Vec<Part<'_>> = handles
            .iter()
            .map(|h| part(h).ok_or_else(|| AlgorithmError::bad_input(0, format!("cannot append a {}", h.data_type()))))
            .collect::<Result<_, _>>()?;

        let points: Vec<[f64; 3]> = parts
            .iter()
            .flat_map(|p| {
                (0..p.points.number_of_tuples()).map(move |t| {
                    [0, 1, 2].map(|c| p.points.component(t, c).unwrap_or(0.0))
                })
            })
            .collect();
        let mut merged = UnstructuredGrid::from_points(points);

        let mut offset = 0;
        for (i, p) in parts.iter().enumerate() {
            request.check_abort()?;
            if let Some(grid) = p.grid {
                for (cell, ids) in grid.cells() {
                    let shifted: Vec<usize> = ids.iter().map(|id| id + offset).collect();
                    merged.insert_next_cell(cell, &shifted)?;
                }
            }
            offset += p.points.number_of_tuples();
            request.set_progress((i + 1) as f64 / parts.len() as f64);
        }
        for array in shared_arrays(&parts) {
            merged.point_data_mut().add_array(array);
        }
        log::trace!(
            "AppendFilter merged {} inputs into {} points",
            parts.len(),
            merged.number_of_points()
        );
        outputs.set_data(0, DataObject::new(DataKind::UnstructuredGrid(merged)));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
