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

//! Small algorithms shared by the integration tests.

#![allow(dead_code)]

use std::any::Any;
use tributary_core::information::keys::{
    ORIGIN, SPACING, TIME_STEPS, UPDATE_EXTENT, UPDATE_TIME_STEP, WHOLE_EXTENT,
};
use tributary_core::{Extent, InformationVector, ModifiedTime, TimeStamp};
use tributary_data::{
    DataArray, DataKind, DataObject, DataObjectType, DataTypeConstraint, ImageGrid, Table,
};
use tributary_pipeline::{
    Algorithm, AlgorithmError, InputPortInfo, OutputPortInfo, PortData, Request,
};

macro_rules! any_impl {
    () => {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    };
}

/// The point values of an image output, in point order.
pub fn values(data: &DataObject) -> Vec<f64> {
    data.as_image_grid()
        .and_then(|image| image.point_data().array("value"))
        .and_then(|array| array.as_f64())
        .map(<[f64]>::to_vec)
        .unwrap_or_default()
}

// ─── Ramp ───────────────────────────────────────────────────────────────────

/// Image source whose point value is `offset + i + time`.
pub struct Ramp {
    whole: Extent,
    offset: f64,
    time_steps: Option<Vec<f64>>,
    whole_only: bool,
    mtime: ModifiedTime,
    pub executions: usize,
    pub requested: Vec<Extent>,
}

impl Ramp {
    pub fn new(whole: Extent) -> Self {
        Self {
            whole,
            offset: 0.0,
            time_steps: None,
            whole_only: false,
            mtime: ModifiedTime::new(),
            executions: 0,
            requested: Vec::new(),
        }
    }

    pub fn with_time_steps(mut self, steps: Vec<f64>) -> Self {
        self.time_steps = Some(steps);
        self
    }

    /// Always generates the whole extent, whatever was requested.
    pub fn whole_only(mut self) -> Self {
        self.whole_only = true;
        self
    }

    pub fn set_offset(&mut self, offset: f64) {
        if self.offset != offset {
            self.offset = offset;
            self.mtime.modified();
        }
    }
}

impl Algorithm for Ramp {
    fn name(&self) -> &str {
        "Ramp"
    }

    fn number_of_input_ports(&self) -> usize {
        0
    }

    fn fill_output_port_information(&self, _port: usize) -> OutputPortInfo {
        OutputPortInfo::Concrete(DataObjectType::ImageGrid)
    }

    fn modified_time(&self) -> TimeStamp {
        self.mtime.get()
    }

    fn request_information(
        &mut self,
        _request: &Request,
        _inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        let info = outputs.get_mut(0).ok_or_else(|| AlgorithmError::failed("no output"))?;
        info.set(&WHOLE_EXTENT, self.whole);
        info.set(&ORIGIN, [0.0; 3]);
        info.set(&SPACING, [1.0; 3]);
        if let Some(steps) = &self.time_steps {
            info.set(&TIME_STEPS, steps.clone());
        }
        Ok(())
    }

    fn request_data(
        &mut self,
        request: &Request,
        _inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        let info = outputs.get(0).ok_or_else(|| AlgorithmError::failed("no output"))?;
        let extent = match info.get(&UPDATE_EXTENT) {
            Some(e) if !self.whole_only => e.clip(&self.whole),
            _ => self.whole,
        };
        let time = info.get(&UPDATE_TIME_STEP).copied().unwrap_or(0.0);
        self.executions += 1;
        self.requested.push(extent);

        let mut image = ImageGrid::new(extent, [0.0; 3], [1.0; 3]);
        let values: Vec<f64> = extent
            .iter_points()
            .map(|ijk| self.offset + f64::from(ijk[0]) + time)
            .collect();
        image
            .point_data_mut()
            .add_array(DataArray::from_f64("value", 1, values));
        request.set_progress(1.0);
        outputs.set_data(0, DataObject::new(DataKind::ImageGrid(image)));
        Ok(())
    }

    any_impl!();
}

// ─── Scale ──────────────────────────────────────────────────────────────────

/// Multiplies the `value` point array of an image.
pub struct Scale {
    factor: f64,
    fail: bool,
    mtime: ModifiedTime,
    pub executions: usize,
}

impl Scale {
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            fail: false,
            mtime: ModifiedTime::new(),
            executions: 0,
        }
    }

    pub fn set_factor(&mut self, factor: f64) {
        self.factor = factor;
        self.mtime.modified();
    }

    pub fn set_fail(&mut self, fail: bool) {
        self.fail = fail;
        self.mtime.modified();
    }
}

impl Algorithm for Scale {
    fn name(&self) -> &str {
        "Scale"
    }

    fn fill_input_port_information(&self, _port: usize) -> InputPortInfo {
        InputPortInfo::new(DataTypeConstraint::exactly(DataObjectType::ImageGrid))
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
        if self.fail {
            request.warn("about to fail");
            return Err(AlgorithmError::failed("scale failed on purpose"));
        }
        let input = inputs[0]
            .data(0)
            .and_then(|d| d.as_image_grid())
            .ok_or_else(|| AlgorithmError::bad_input(0, "expected an image"))?;
        let mut image = input.clone();
        if let Some(values) = image
            .point_data_mut()
            .array_mut("value")
            .and_then(DataArray::f64_mut)
        {
            values.iter_mut().for_each(|v| *v *= self.factor);
        }
        self.executions += 1;
        outputs.set_data(0, DataObject::new(DataKind::ImageGrid(image)));
        Ok(())
    }

    any_impl!();
}

// ─── Crop ───────────────────────────────────────────────────────────────────

/// Requests and keeps only a sub-extent of its input.
pub struct Crop {
    voi: Extent,
    mtime: ModifiedTime,
}

impl Crop {
    pub fn new(voi: Extent) -> Self {
        Self {
            voi,
            mtime: ModifiedTime::new(),
        }
    }
}

impl Algorithm for Crop {
    fn name(&self) -> &str {
        "Crop"
    }

    fn fill_input_port_information(&self, _port: usize) -> InputPortInfo {
        InputPortInfo::new(DataTypeConstraint::exactly(DataObjectType::ImageGrid))
    }

    fn modified_time(&self) -> TimeStamp {
        self.mtime.get()
    }

    fn request_information(
        &mut self,
        _request: &Request,
        _inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        if let Some(info) = outputs.get_mut(0) {
            let whole = info.get(&WHOLE_EXTENT).map_or(self.voi, |w| {
                w.intersection(&self.voi).unwrap_or(Extent::EMPTY)
            });
            info.set(&WHOLE_EXTENT, whole);
        }
        Ok(())
    }

    fn request_update_extent(
        &mut self,
        _request: &Request,
        inputs: &mut [InformationVector],
        _outputs: &InformationVector,
    ) -> Result<(), AlgorithmError> {
        for info in inputs[0].iter_mut() {
            info.set(&UPDATE_EXTENT, self.voi);
        }
        Ok(())
    }

    fn request_data(
        &mut self,
        _request: &Request,
        inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        let input = inputs[0]
            .data(0)
            .and_then(|d| d.as_image_grid())
            .ok_or_else(|| AlgorithmError::bad_input(0, "expected an image"))?;
        outputs.set_data(0, DataObject::new(DataKind::ImageGrid(input.extract(&self.voi))));
        Ok(())
    }

    any_impl!();
}

// ─── Gather ─────────────────────────────────────────────────────────────────

/// Fan-in: a table with one row per connected image, holding its point count.
pub struct Gather {
    mtime: ModifiedTime,
}

impl Gather {
    pub fn new() -> Self {
        Self {
            mtime: ModifiedTime::new(),
        }
    }
}

impl Algorithm for Gather {
    fn name(&self) -> &str {
        "Gather"
    }

    fn fill_input_port_information(&self, _port: usize) -> InputPortInfo {
        InputPortInfo::new(DataTypeConstraint::exactly(DataObjectType::ImageGrid)).repeatable()
    }

    fn fill_output_port_information(&self, _port: usize) -> OutputPortInfo {
        OutputPortInfo::Concrete(DataObjectType::Table)
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
        let counts: Vec<f64> = (0..inputs[0].len())
            .filter_map(|c| inputs[0].data(c))
            .map(|d| d.as_image_grid().map_or(0.0, |i| i.number_of_points() as f64))
            .collect();
        let mut table = Table::new();
        table.add_column(DataArray::from_f64("points", 1, counts))?;
        outputs.set_data(0, DataObject::new(DataKind::Table(table)));
        Ok(())
    }

    any_impl!();
}
