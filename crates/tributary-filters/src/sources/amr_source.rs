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


//! A synthetic two-dimensional overlapping AMR source.

use crate::SCALARS;
use std::any::Any;
use tributary_core::{Extent, InformationVector, ModifiedTime, TimeStamp};
use tributary_data::keys::{COMPOSITE_METADATA, UPDATE_COMPOSITE_INDICES};
use tributary_data::{
    AmrBox, AmrData, AmrMode, DataArray, DataHandle, DataKind, DataObject, DataObjectType,
    GridDescription, ImageGrid,
};
use tributary_pipeline::{Algorithm, AlgorithmError, OutputPortInfo, PortData, Request};

/// Produces an overlapping AMR hierarchy in the XY plane.
///
/// Level 0 is one square box of `root_cells` cells per side with unit
/// spacing. Every finer level refines the lower-left quadrant of block 0 of
/// the level above by two and splits it into two blocks along X. The point
/// scalar is `x + y`, so blocks agree where they overlap.
///
/// When a consumer narrows the request with composite indices, only the
/// selected blocks are generated; the others keep their box and stay empty.
#[derive(Debug)]
pub struct AmrSource {
    root_cells: i32,
    levels: usize,
    mtime: ModifiedTime,
    generated: Vec<(usize, usize)>,
}

impl AmrSource {
    /// Creates a source with `levels` levels over a `root_cells` square.
    pub fn new(root_cells: i32, levels: usize) -> Self {
        Self {
            root_cells: root_cells.max(1),
            levels: levels.max(1),
            mtime: ModifiedTime::new(),
            generated: Vec::new(),
        }
    }

    /// Changes the number of levels.
    pub fn set_levels(&mut self, levels: usize) {
        let levels = levels.max(1);
        if self.levels != levels {
            self.levels = levels;
            self.mtime.modified();
        }
    }

    /// `(level, index)` of every block generated so far, in order.
    #[must_use]
    pub fn generated_blocks(&self) -> &[(usize, usize)] {
        &self.generated
    }

    /// Boxes of every level, as cell ranges in the level's index space.
    fn layout(&self) -> Vec<Vec<AmrBox>> {
        let n = self.root_cells;
        let mut levels = vec![vec![AmrBox::new([0, 0, 0], [n - 1, n - 1, -1])]];
        for _ in 1..self.levels {
            let parent = levels[levels.len() - 1][0];
            let (lo, hi) = (parent.lo(), parent.hi());
            let half = |axis: usize| ((hi[axis] - lo[axis] + 1) / 2).max(1);
            let (hx, hy) = (half(0), half(1));
            let (x0, y0) = (2 * lo[0], 2 * lo[1]);
            let y1 = y0 + 2 * hy - 1;
            levels.push(vec![
                AmrBox::new([x0, y0, 0], [x0 + hx - 1, y1, -1]),
                AmrBox::new([x0 + hx, y0, 0], [x0 + 2 * hx - 1, y1, -1]),
            ]);
        }
        levels
    }

    /// Builds the hierarchy. Blocks are generated where `wanted` says so.
    fn build(&self, wanted: impl Fn(usize) -> bool) -> Result<(AmrData, Vec<(usize, usize)>), AlgorithmError> {
        let layout = self.layout();
        let mut amr = AmrData::new(AmrMode::Overlapping);
        amr.set_grid_description(GridDescription::XyPlane);
        amr.set_origin([0.0; 3]);
        amr.set_constant_refinement_ratio(2);
        amr.initialize(&layout.iter().map(Vec::len).collect::<Vec<_>>());

        let mut generated = Vec::new();
        for (level, boxes) in layout.iter().enumerate() {
            let h = 0.5_f64.powi(i32::try_from(level).unwrap_or(i32::MAX));
            let spacing = [h, h, h];
            amr.set_spacing(level, spacing)?;
            for (index, b) in boxes.iter().enumerate() {
                let flat = amr.flat_index(level, index).map_or(0, |f| f + 1);
                if !wanted(flat) {
                    amr.set_amr_box(level, index, *b)?;
                    continue;
                }
                let extent = Extent::new(b.lo()[0], b.hi()[0] + 1, b.lo()[1], b.hi()[1] + 1, 0, 0);
                let mut grid = ImageGrid::new(extent, [0.0; 3], spacing);
                let values: Vec<f64> = extent
                    .iter_points()
                    .map(|ijk| f64::from(ijk[0]) * h + f64::from(ijk[1]) * h)
                    .collect();
                grid.point_data_mut()
                    .add_array(DataArray::from_f64(SCALARS, 1, values));
                amr.set_grid(level, index, grid)?;
                generated.push((level, index));
            }
        }
        amr.validate()?;
        Ok((amr, generated))
    }
}

impl Algorithm for AmrSource {
    fn name(&self) -> &str {
        "AmrSource"
    }

    fn number_of_input_ports(&self) -> usize {
        0
    }

    fn fill_output_port_information(&self, _port: usize) -> OutputPortInfo {
        OutputPortInfo::Concrete(DataObjectType::OverlappingAmr)
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
        let (amr, _) = self.build(|_| false)?;
        let mut structure = amr.metadata_copy();
        for (level, boxes) in self.layout().iter().enumerate() {
            for index in 0..boxes.len() {
                structure.set_child_at(
                    level,
                    index,
                    Some(DataHandle::new(DataObject::of_type(DataObjectType::ImageGrid))),
                )?;
            }
        }
        outputs
            .get_mut(0)
            .ok_or_else(|| AlgorithmError::failed("AMR source has no output information"))?
            .set(
                &COMPOSITE_METADATA,
                DataHandle::new(DataObject::new(DataKind::Amr(structure))),
            );
        Ok(())
    }

    fn request_data(
        &mut self,
        request: &Request,
        _inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        let selection = outputs
            .get(0)
            .and_then(|info| info.get_cloned(&UPDATE_COMPOSITE_INDICES));
        let (mut amr, generated) = self.build(|flat| {
            selection
                .as_ref()
                .map_or(true, |wanted| wanted.contains(&flat))
        })?;
        amr.generate_blanking()?;
        log::debug!("AmrSource generated {} of {} blocks", generated.len(), amr.total_blocks());
        self.generated.extend(generated);
        request.set_progress(1.0);
        outputs.set_data(0, DataObject::new(DataKind::Amr(amr)));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
