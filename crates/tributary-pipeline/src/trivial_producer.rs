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

//! A source node that publishes an existing data object.

use crate::algorithm::Algorithm;
use crate::error::AlgorithmError;
use crate::port::OutputPortInfo;
use crate::request::Request;
use std::any::Any;
use tributary_core::information::keys::{ORIGIN, SPACING, WHOLE_EXTENT};
use tributary_core::{InformationVector, ModifiedTime, TimeStamp};
use tributary_data::keys::{COMPOSITE_METADATA, DATA_OBJECT};
use tributary_data::{DataHandle, DataKind, DataObject};

/// Wraps a data object as a zero-input source.
///
/// The object is shared with the output, not copied. Image grids advertise
/// their extent as the whole extent; composite objects advertise their
/// structure.
#[derive(Debug)]
pub struct TrivialProducer {
    data: DataHandle,
    mtime: ModifiedTime,
}

impl TrivialProducer {
    /// Publishes `data`.
    pub fn new(data: DataObject) -> Self {
        Self {
            data: DataHandle::new(data),
            mtime: ModifiedTime::new(),
        }
    }

    /// Replaces the published object.
    pub fn set_data(&mut self, data: DataObject) {
        self.data = DataHandle::new(data);
        self.mtime.modified();
    }

    /// The published object.
    #[must_use]
    pub fn data(&self) -> &DataHandle {
        &self.data
    }
}

impl Algorithm for TrivialProducer {
    fn name(&self) -> &str {
        "TrivialProducer"
    }

    fn number_of_input_ports(&self) -> usize {
        0
    }

    fn fill_output_port_information(&self, _port: usize) -> OutputPortInfo {
        OutputPortInfo::Concrete(self.data.data_type())
    }

    /// Also advanced by `modified()` on the published object.
    fn modified_time(&self) -> TimeStamp {
        self.mtime.get().max(self.data.modified_time())
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
        match self.data.kind() {
            DataKind::ImageGrid(image) => {
                info.set(&WHOLE_EXTENT, image.extent());
                info.set(&ORIGIN, image.origin());
                info.set(&SPACING, image.spacing());
            }
            DataKind::Composite(_) | DataKind::Amr(_) => {
                info.set(
                    &COMPOSITE_METADATA,
                    DataHandle::new(self.data.structure_placeholder()),
                );
            }
            _ => {}
        }
        Ok(())
    }

    fn request_data(
        &mut self,
        _request: &Request,
        _inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        match outputs.get_mut(0) {
            Some(info) => {
                info.set(&DATA_OBJECT, self.data.clone());
                Ok(())
            }
            None => Err(AlgorithmError::failed("no output port")),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
