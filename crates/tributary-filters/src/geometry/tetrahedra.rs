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


//! A consumer that only accepts tetrahedral meshes.

use std::any::Any;
use tributary_core::{InformationVector, ModifiedTime, TimeStamp};
use tributary_data::{
    CellType, DataArray, DataKind, DataObject, DataObjectType, DataTypeConstraint,
    UnstructuredGrid,
};
use tributary_pipeline::{Algorithm, AlgorithmError, InputPortInfo, PortData, Request};

/// Name of the cell array holding tetrahedron volumes.
pub const VOLUME: &str = "volume";

/// Annotates a tetrahedral mesh with per-cell volumes.
///
/// Any non-tetrahedral cell makes the filter fail.
#[derive(Debug, Default)]
pub struct TetrahedraOnly {
    mtime: ModifiedTime,
}

impl TetrahedraOnly {
    /// Creates the filter.
    pub fn new() -> Self {
        Self::default()
    }
}

fn tetra_volume(grid: &UnstructuredGrid, ids: &[usize]) -> f64 {
    let p = |id: usize| [0, 1, 2].map(|c| grid.points().component(id, c).unwrap_or(0.0));
    let [a, b, c, d] = [p(ids[0]), p(ids[1]), p(ids[2]), p(ids[3])];
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let w = [d[0] - a[0], d[1] - a[1], d[2] - a[2]];
    let det = u[0] * (v[1] * w[2] - v[2] * w[1]) - u[1] * (v[0] * w[2] - v[2] * w[0])
        + u[2] * (v[0] * w[1] - v[1] * w[0]);
    det.abs() / 6.0
}

impl Algorithm for TetrahedraOnly {
    fn name(&self) -> &str {
        "TetrahedraOnly"
    }

    fn fill_input_port_information(&self, _port: usize) -> InputPortInfo {
        InputPortInfo::new(DataTypeConstraint::exactly(DataObjectType::UnstructuredGrid))
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
        let grid = inputs
            .first()
            .and_then(|v| v.data(0))
            .and_then(|d| d.as_unstructured_grid())
            .ok_or_else(|| AlgorithmError::bad_input(0, "expected an unstructured grid"))?;
        if let Some((index, (cell, _))) = grid
            .cells()
            .enumerate()
            .find(|(_, (cell, _))| *cell != CellType::Tetra)
        {
            return Err(AlgorithmError::bad_input(
                0,
                format!("cell {index} is a {}, only tetrahedra are supported", cell.name()),
            ));
        }
        let volumes: Vec<f64> = grid.cells().map(|(_, ids)| tetra_volume(grid, ids)).collect();
        let mut output = grid.clone();
        output
            .cell_data_mut()
            .add_array(DataArray::from_f64(VOLUME, 1, volumes));
        outputs.set_data(0, DataObject::new(DataKind::UnstructuredGrid(output)));
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
    use approx::assert_relative_eq;

    #[test]
    fn unit_tetra_volume() {
        let mut grid = UnstructuredGrid::from_points(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]);
        grid.insert_next_cell(CellType::Tetra, &[0, 1, 2, 3]).unwrap();
        assert_relative_eq!(tetra_volume(&grid, &[0, 1, 2, 3]), 1.0 / 6.0);
    }
}
