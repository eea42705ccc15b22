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


//! A structured image source that honors extent, piece and time requests.

use crate::SCALARS;
use std::any::Any;
use tributary_core::information::keys::{
    CAN_HANDLE_PIECE_REQUEST, ORIGIN, SPACING, TIME_RANGE, TIME_STEPS, UPDATE_EXTENT,
    UPDATE_GHOST_LEVELS, UPDATE_NUMBER_OF_PIECES, UPDATE_PIECE_NUMBER, UPDATE_TIME_STEP,
    WHOLE_BOUNDS, WHOLE_EXTENT,
};
use tributary_core::{Bounds, Extent, ExtentTranslator, InformationVector, ModifiedTime, TimeStamp};
use tributary_data::{DataArray, DataKind, DataObject, DataObjectType, ImageGrid};
use tributary_pipeline::{Algorithm, AlgorithmError, OutputPortInfo, PortData, Request};

/// Generates an image grid whose point scalar is the linear point index
/// within the whole extent, plus the requested time.
///
/// Only the requested sub-extent is generated. The last
/// [`ImageSource::HISTORY`] extents actually produced are recorded and can be
/// inspected through [`ImageSource::generated_extents`].
#[derive(Debug)]
pub struct ImageSource {
    whole_extent: Extent,
    origin: [f64; 3],
    spacing: [f64; 3],
    time_steps: Vec<f64>,
    mtime: ModifiedTime,
    generated: Vec<Extent>,
}

impl ImageSource {
    /// Number of generated extents kept for inspection.
    pub const HISTORY: usize = 256;

    /// Creates a source over `whole_extent` with unit spacing at the origin.
    pub fn new(whole_extent: Extent) -> Self {
        Self {
            whole_extent,
            origin: [0.0; 3],
            spacing: [1.0; 3],
            time_steps: Vec::new(),
            mtime: ModifiedTime::new(),
            generated: Vec::new(),
        }
    }

    /// The largest extent this source can produce.
    #[must_use]
    pub fn whole_extent(&self) -> Extent {
        self.whole_extent
    }

    /// Changes the whole extent.
    pub fn set_whole_extent(&mut self, extent: Extent) {
        if self.whole_extent != extent {
            self.whole_extent = extent;
            self.mtime.modified();
        }
    }

    /// Changes the geometry of the generated grid.
    pub fn set_geometry(&mut self, origin: [f64; 3], spacing: [f64; 3]) {
        if self.origin != origin || self.spacing != spacing {
            self.origin = origin;
            self.spacing = spacing;
            self.mtime.modified();
        }
    }

    /// Advertises discrete time steps. They are sorted ascending.
    pub fn set_time_steps(&mut self, mut steps: Vec<f64>) {
        steps.sort_by(f64::total_cmp);
        if self.time_steps != steps {
            self.time_steps = steps;
            self.mtime.modified();
        }
    }

    /// Most recent extents produced, oldest first.
    #[must_use]
    pub fn generated_extents(&self) -> &[Extent] {
        &self.generated
    }

    /// Forgets the recorded extents.
    pub fn clear_generated_extents(&mut self) {
        self.generated.clear();
    }

    /// Marks the source as modified, forcing the next update to regenerate.
    pub fn modified(&mut self) {
        self.mtime.modified();
    }

    fn scalar(&self, ijk: [i32; 3], time: f64) -> f64 {
        let [nx, ny, _] = self.whole_extent.dimensions();
        let i = i64::from(ijk[0] - self.whole_extent.lo(0));
        let j = i64::from(ijk[1] - self.whole_extent.lo(1));
        let k = i64::from(ijk[2] - self.whole_extent.lo(2));
        (i + j * i64::from(nx) + k * i64::from(nx) * i64::from(ny)) as f64 + time
    }
}

impl Algorithm for ImageSource {
    fn name(&self) -> &str {
        "ImageSource"
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
        let info = outputs
            .get_mut(0)
            .ok_or_else(|| AlgorithmError::failed("image source has no output information"))?;
        info.set(&WHOLE_EXTENT, self.whole_extent);
        info.set(&ORIGIN, self.origin);
        info.set(&SPACING, self.spacing);
        info.set(
            &WHOLE_BOUNDS,
            Bounds::from_extent(&self.whole_extent, self.origin, self.spacing),
        );
        info.set(&CAN_HANDLE_PIECE_REQUEST, true);
        match (self.time_steps.first(), self.time_steps.last()) {
            (Some(&first), Some(&last)) => {
                info.set(&TIME_STEPS, self.time_steps.clone());
                info.set(&TIME_RANGE, [first, last]);
            }
            _ => {
                info.remove(&TIME_STEPS);
                info.remove(&TIME_RANGE);
            }
        }
        Ok(())
    }

    fn request_data(
        &mut self,
        request: &Request,
        _inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        let info = outputs
            .get(0)
            .ok_or_else(|| AlgorithmError::failed("image source has no output information"))?;
        let extent = info
            .get(&UPDATE_EXTENT)
            .map_or(self.whole_extent, |e| e.clip(&self.whole_extent));
        let time = info.get(&UPDATE_TIME_STEP).copied().unwrap_or(0.0);
        let ghost_levels = info.get(&UPDATE_GHOST_LEVELS).copied().unwrap_or(0);
        let piece = info.get(&UPDATE_PIECE_NUMBER).copied().unwrap_or(0);
        let pieces = info.get(&UPDATE_NUMBER_OF_PIECES).copied().unwrap_or(1);
        log::trace!("ImageSource generating {extent:?} at t={time}");

        let mut grid = ImageGrid::new(extent, self.origin, self.spacing);
        let values: Vec<f64> = extent
            .iter_points()
            .map(|ijk| self.scalar(ijk, time))
            .collect();
        grid.point_data_mut()
            .add_array(DataArray::from_f64(SCALARS, 1, values));
        if ghost_levels > 0 {
            let real = ExtentTranslator::piece_to_extent(
                &self.whole_extent,
                u32::try_from(piece).unwrap_or(0),
                u32::try_from(pieces).unwrap_or(1),
                0,
            );
            grid.set_ghost_levels(u32::try_from(ghost_levels).unwrap_or(0));
            grid.mark_ghost_cells(&real);
        }
        if self.generated.len() >= Self::HISTORY {
            self.generated.remove(0);
        }
        self.generated.push(extent);
        request.set_progress(1.0);
        outputs.set_data(0, DataObject::new(DataKind::ImageGrid(grid)));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
