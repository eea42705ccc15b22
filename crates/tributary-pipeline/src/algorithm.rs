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

//! # Algorithm Contract
//!
//! The trait every pipeline stage implements.
//!
//! The executive drives an algorithm through five passes, each delivered as a
//! [`Request`] to [`Algorithm::process_request`], which dispatches to one
//! named hook per [`RequestKind`]. Every hook has a default, so a simple
//! filter only implements [`Algorithm::request_data`].
//!
//! Hooks receive the port information directly: `inputs` holds one
//! [`InformationVector`] per input port with one map per connection,
//! `outputs` one map per output port. Data objects live in those maps under
//! [`DATA_OBJECT`](tributary_data::keys::DATA_OBJECT); the [`PortData`]
//! helpers read and write them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tributary_pipeline::{Algorithm, AlgorithmError, PortData, Request};
//!
//! struct Passthrough { mtime: ModifiedTime }
//!
//! impl Algorithm for Passthrough {
//!     fn name(&self) -> &str { "Passthrough" }
//!     fn modified_time(&self) -> TimeStamp { self.mtime.get() }
//!
//!     fn request_data(
//!         &mut self,
//!         _request: &Request,
//!         inputs: &[InformationVector],
//!         outputs: &mut InformationVector,
//!     ) -> Result<(), AlgorithmError> {
//!         let input = inputs[0].data(0).ok_or_else(|| AlgorithmError::bad_input(0, "no data"))?;
//!         outputs.set_data(0, input.shallow_copied());
//!         Ok(())
//!     }
//!
//!     fn as_any(&self) -> &dyn std::any::Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
//! }
//! ```
//!
//! [`PortData`]: crate::PortData

use crate::error::AlgorithmError;
use crate::port::{InputPortInfo, OutputPortInfo};
use crate::request::{Request, RequestKind};
use std::any::Any;
use tributary_core::{InformationVector, TimeStamp};

/// A pipeline stage.
pub trait Algorithm: Send + 'static {
    /// Human-readable name, used in logs and events.
    fn name(&self) -> &str;

    /// Number of input ports. Fixed for the lifetime of the algorithm.
    fn number_of_input_ports(&self) -> usize {
        1
    }

    /// Number of output ports. Fixed for the lifetime of the algorithm.
    fn number_of_output_ports(&self) -> usize {
        1
    }

    /// Declares what input `port` accepts.
    fn fill_input_port_information(&self, _port: usize) -> InputPortInfo {
        InputPortInfo::default()
    }

    /// Declares what output `port` produces.
    fn fill_output_port_information(&self, _port: usize) -> OutputPortInfo {
        OutputPortInfo::default()
    }

    /// Time of the last parameter change.
    fn modified_time(&self) -> TimeStamp;

    /// Whether the algorithm always needs the whole extent of its inputs,
    /// whatever was requested downstream.
    fn requires_whole_extent(&self) -> bool {
        false
    }

    /// Creates output objects when their type cannot be declared up front.
    /// Outputs left without an object of the declared type are allocated by
    /// the executive afterwards.
    fn request_data_object(
        &mut self,
        _request: &Request,
        _inputs: &[InformationVector],
        _outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        Ok(())
    }

    /// Publishes meta-data on the outputs. Downstream-propagating entries of
    /// the first input are already copied when this runs.
    fn request_information(
        &mut self,
        _request: &Request,
        _inputs: &[InformationVector],
        _outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        Ok(())
    }

    /// Narrows the output time request into input requests. The output
    /// request is already copied to every input when this runs.
    fn request_update_time(
        &mut self,
        _request: &Request,
        _inputs: &mut [InformationVector],
        _outputs: &InformationVector,
    ) -> Result<(), AlgorithmError> {
        Ok(())
    }

    /// Narrows the output extent or piece request into input requests. The
    /// output request is already copied to every input when this runs.
    fn request_update_extent(
        &mut self,
        _request: &Request,
        _inputs: &mut [InformationVector],
        _outputs: &InformationVector,
    ) -> Result<(), AlgorithmError> {
        Ok(())
    }

    /// Fills the outputs. The output maps hold fresh, empty objects of the
    /// right types; replacing them is allowed.
    fn request_data(
        &mut self,
        request: &Request,
        inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError>;

    /// Entry point used by the executive.
    fn process_request(
        &mut self,
        request: &Request,
        inputs: &mut [InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        match request.kind() {
            RequestKind::DataObject => self.request_data_object(request, inputs, outputs),
            RequestKind::Information => self.request_information(request, inputs, outputs),
            RequestKind::UpdateTime => self.request_update_time(request, inputs, outputs),
            RequestKind::UpdateExtent => self.request_update_extent(request, inputs, outputs),
            RequestKind::Data => self.request_data(request, inputs, outputs),
        }
    }

    /// Returns a reference to the concrete type as `Any`.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to the concrete type as `Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
