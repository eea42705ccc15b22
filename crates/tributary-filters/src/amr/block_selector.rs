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


//! Pulls a few blocks out of an AMR hierarchy.

use std::any::Any;
use tributary_core::{InformationVector, ModifiedTime, TimeStamp};
use tributary_data::keys::{COMPOSITE_METADATA, UPDATE_COMPOSITE_INDICES};
use tributary_data::{
    AmrData, CompositeData, CompositeKind, DataHandle, DataKind, DataObject, DataObjectType,
    DataTypeConstraint,
};
use tributary_pipeline::{
    Algorithm, AlgorithmError, InputPortInfo, OutputPortInfo, PortData, Request,
};

/// Copies the selected `(level, index)` blocks of an AMR input into a
/// multiblock, one child per selection entry.
///
/// The selection travels upstream as composite indices, so a source that
/// honors them only generates the blocks asked for. Entries naming a block
/// that does not exist produce an empty child and a warning.
#[derive(Debug, Default)]
pub struct AmrBlockSelector {
    blocks: Vec<(usize, usize)>,
    mtime: ModifiedTime,
}

impl AmrBlockSelector {
    /// Creates a selector for `blocks`, given as `(level, index)` pairs.
    pub fn new(blocks: impl IntoIterator<Item = (usize, usize)>) -> Self {
        Self {
            blocks: blocks.into_iter().collect(),
            mtime: ModifiedTime::new(),
        }
    }

    /// The current selection.
    #[must_use]
    pub fn blocks(&self) -> &[(usize, usize)] {
        &self.blocks
    }

    /// Replaces the selection.
    pub fn set_blocks(&mut self, blocks: impl IntoIterator<Item = (usize, usize)>) {
        let blocks: Vec<_> = blocks.into_iter().collect();
        if self.blocks != blocks {
            self.blocks = blocks;
            self.mtime.modified();
        }
    }

    fn child_name(level: usize, index: usize) -> String {
        format!("level{level}_block{index}")
    }

    fn selection(&self, amr: &AmrData) -> Vec<usize> {
        self.blocks
            .iter()
            .filter_map(|&(level, index)| amr.flat_index(level, index))
            .map(|flat| flat + 1)
            .collect()
    }
}

impl Algorithm for AmrBlockSelector {
    fn name(&self) -> &str {
        "AmrBlockSelector"
    }

    fn fill_input_port_information(&self, _port: usize) -> InputPortInfo {
        InputPortInfo::new(DataTypeConstraint::Amr)
    }

    fn fill_output_port_information(&self, _port: usize) -> OutputPortInfo {
        OutputPortInfo::Concrete(DataObjectType::MultiBlock)
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
        let mut structure = CompositeData::new(CompositeKind::MultiBlock);
        for &(level, index) in &self.blocks {
            let slot = structure.append_child(Some(DataHandle::new(DataObject::of_type(
                DataObjectType::ImageGrid,
            ))))?;
            structure.set_child_name(slot, Self::child_name(level, index))?;
        }
        outputs
            .get_mut(0)
            .ok_or_else(|| AlgorithmError::failed("block selector has no output information"))?
            .set(
                &COMPOSITE_METADATA,
                DataHandle::new(DataObject::new(DataKind::Composite(structure))),
            );
        Ok(())
    }

    fn request_update_extent(
        &mut self,
        _request: &Request,
        inputs: &mut [InformationVector],
        _outputs: &InformationVector,
    ) -> Result<(), AlgorithmError> {
        let Some(selection) = inputs
            .first()
            .and_then(|v| v.get(0))
            .and_then(|info| info.get(&COMPOSITE_METADATA))
            .and_then(|d| d.as_amr())
            .map(|amr| self.selection(amr))
        else {
            return Ok(());
        };
        log::trace!("AmrBlockSelector requests flat indices {selection:?}");
        if let Some(info) = inputs.first_mut().and_then(|v| v.get_mut(0)) {
            info.set(&UPDATE_COMPOSITE_INDICES, selection);
        }
        Ok(())
    }

    fn request_data(
        &mut self,
        request: &Request,
        inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        let amr = inputs
            .first()
            .and_then(|v| v.data(0))
            .and_then(|d| d.as_amr())
            .ok_or_else(|| AlgorithmError::bad_input(0, "expected an AMR hierarchy"))?;

        let mut selected = CompositeData::new(CompositeKind::MultiBlock);
        for &(level, index) in &self.blocks {
            let block = amr.block(level, index).cloned();
            if block.is_none() {
                request.warn(format!("AMR block ({level}, {index}) is not available"));
            }
            let slot = selected.append_child(block)?;
            selected.set_child_name(slot, Self::child_name(level, index))?;
        }
        outputs.set_data(0, DataObject::new(DataKind::Composite(selected)));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
