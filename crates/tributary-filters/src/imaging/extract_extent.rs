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


//! Volume-of-interest extraction.

use std::any::Any;
use tributary_core::information::keys::{UPDATE_EXTENT, WHOLE_BOUNDS, WHOLE_EXTENT};
use tributary_core::{Extent, InformationVector, ModifiedTime, TimeStamp};
use tributary_data::{DataKind, DataObject, DataObjectType, DataTypeConstraint};
use tributary_pipeline::{Algorithm, AlgorithmError, InputPortInfo, PortData, Request};

/// Crops an image grid to a volume of interest.
///
/// The output advertises the intersection of the input whole extent with
/// the volume of interest, and only that part of the input is requested
/// upstream.
#[derive(Debug)]
pub struct ExtractExtent {
    voi: Extent,
    mtime: ModifiedTime,
}

impl ExtractExtent {
    /// Creates a crop to `voi`.
    pub fn new(voi: Extent) -> Self {
        Self {
            voi,
            mtime: ModifiedTime::new(),
        }
    }

    /// The volume of interest.
    #[must_use]
    pub fn voi(&self) -> Extent {
        self.voi
    }

    /// Changes the volume of interest.
    pub fn set_voi(&mut self, voi: Extent) {
        if self.voi != voi {
            self.voi = voi;
            self.mtime.modified();
        }
    }
}

impl Algorithm for ExtractExtent {
    fn name(&self) -> &str {
        "ExtractExtent"
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
        let Some(info) = outputs.get_mut(0) else {
            return Ok(());
        };
        let whole = info
            .get(&WHOLE_EXTENT)
            .map_or(self.voi, |w| w.intersection(&self.voi).unwrap_or(Extent::EMPTY));
        info.set(&WHOLE_EXTENT, whole);
        info.remove(&WHOLE_BOUNDS);
        Ok(())
    }

    fn request_update_extent(
        &mut self,
        _request: &Request,
        inputs: &mut [InformationVector],
        outputs: &InformationVector,
    ) -> Result<(), AlgorithmError> {
        let wanted = outputs
            .get(0)
            .and_then(|info| info.get(&UPDATE_EXTENT))
            .and_then(|e| e.intersection(&self.voi))
            .unwrap_or(self.voi);
        for info in inputs.iter_mut().flat_map(|v| v.iter_mut()) {
            info.set(&UPDATE_EXTENT, wanted);
        }
        Ok(())
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
            .and_then(|d| d.as_image_grid())
            .ok_or_else(|| AlgorithmError::bad_input(0, "expected an image grid"))?;
        let wanted = outputs
            .get(0)
            .and_then(|info| info.get(&UPDATE_EXTENT))
            .copied()
            .unwrap_or(self.voi);
        let target = wanted.intersection(&self.voi).unwrap_or(Extent::EMPTY);
        outputs.set_data(0, DataObject::new(DataKind::ImageGrid(input.extract(&target))));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
