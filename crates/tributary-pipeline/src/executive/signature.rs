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

//! Update requests and the record of the last execution of an output port.

use tributary_core::information::keys::{
    EXACT_EXTENT, TIME_STEPS, UPDATE_EXTENT, UPDATE_GHOST_LEVELS, UPDATE_NUMBER_OF_PIECES,
    UPDATE_PIECE_NUMBER, UPDATE_TIME_STEP, WHOLE_EXTENT,
};
use tributary_core::{Extent, ExtentTranslator, Information, TimeStamp};
use tributary_data::keys::UPDATE_COMPOSITE_INDICES;

/// What a consumer asks of an output port.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    /// Structured sub-extent. `None` means the whole extent, or the piece's
    /// share of it.
    pub extent: Option<Extent>,
    /// Piece index.
    pub piece: u32,
    /// Number of pieces.
    pub number_of_pieces: u32,
    /// Ghost levels around the piece.
    pub ghost_levels: u32,
    /// Requested time value.
    pub time_step: Option<f64>,
    /// Flat indices of the composite blocks wanted. `None` means all.
    pub composite_indices: Option<Vec<usize>>,
    /// The consumer needs exactly `extent`, not a superset.
    pub exact_extent: bool,
}

impl Default for UpdateRequest {
    fn default() -> Self {
        Self {
            extent: None,
            piece: 0,
            number_of_pieces: 1,
            ghost_levels: 0,
            time_step: None,
            composite_indices: None,
            exact_extent: false,
        }
    }
}

impl UpdateRequest {
    /// The whole output.
    pub fn whole() -> Self {
        Self::default()
    }

    /// One piece of `number_of_pieces`.
    pub fn for_piece(piece: u32, number_of_pieces: u32, ghost_levels: u32) -> Self {
        Self {
            piece,
            number_of_pieces: number_of_pieces.max(1),
            ghost_levels,
            ..Self::default()
        }
    }

    /// A structured sub-extent.
    pub fn for_extent(extent: Extent) -> Self {
        Self {
            extent: Some(extent),
            ..Self::default()
        }
    }

    /// Adds a time request.
    #[must_use]
    pub fn with_time_step(mut self, time: f64) -> Self {
        self.time_step = Some(time);
        self
    }

    /// Adds a composite block selection.
    #[must_use]
    pub fn with_composite_indices(mut self, indices: Vec<usize>) -> Self {
        self.composite_indices = Some(indices);
        self
    }

    /// Requests exactly the extent, no more.
    #[must_use]
    pub fn exact(mut self) -> Self {
        self.exact_extent = true;
        self
    }

    /// Reads a request from port information.
    pub fn from_information(info: &Information) -> Self {
        let count = |v: Option<&i32>| v.and_then(|v| u32::try_from(*v).ok());
        Self {
            extent: info.get_cloned(&UPDATE_EXTENT),
            piece: count(info.get(&UPDATE_PIECE_NUMBER)).unwrap_or(0),
            number_of_pieces: count(info.get(&UPDATE_NUMBER_OF_PIECES))
                .unwrap_or(1)
                .max(1),
            ghost_levels: count(info.get(&UPDATE_GHOST_LEVELS)).unwrap_or(0),
            time_step: info.get_cloned(&UPDATE_TIME_STEP),
            composite_indices: info.get_cloned(&UPDATE_COMPOSITE_INDICES),
            exact_extent: info.get(&EXACT_EXTENT).copied().unwrap_or(false),
        }
    }

    /// Writes the request into port information, removing the entries of
    /// unset fields.
    pub fn write_to(&self, info: &mut Information) {
        let signed = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
        match self.extent {
            Some(extent) => info.set(&UPDATE_EXTENT, extent),
            None => {
                info.remove(&UPDATE_EXTENT);
            }
        }
        info.set(&UPDATE_PIECE_NUMBER, signed(self.piece));
        info.set(&UPDATE_NUMBER_OF_PIECES, signed(self.number_of_pieces));
        info.set(&UPDATE_GHOST_LEVELS, signed(self.ghost_levels));
        match self.time_step {
            Some(time) => info.set(&UPDATE_TIME_STEP, time),
            None => {
                info.remove(&UPDATE_TIME_STEP);
            }
        }
        match &self.composite_indices {
            Some(indices) => info.set(&UPDATE_COMPOSITE_INDICES, indices.clone()),
            None => {
                info.remove(&UPDATE_COMPOSITE_INDICES);
            }
        }
        if self.exact_extent {
            info.set(&EXACT_EXTENT, true);
        } else {
            info.remove(&EXACT_EXTENT);
        }
    }

    /// Resolves the request against the producer's meta-data: a piece
    /// request becomes an extent when a whole extent is advertised, and a
    /// time request snaps to an advertised time step.
    pub(crate) fn resolve(mut self, producer: &Information) -> Self {
        if self.extent.is_none() {
            if let Some(whole) = producer.get(&WHOLE_EXTENT) {
                self.extent = Some(ExtentTranslator::piece_to_extent(
                    whole,
                    self.piece,
                    self.number_of_pieces,
                    self.ghost_levels,
                ));
            }
        }
        if let (Some(time), Some(steps)) = (self.time_step, producer.get(&TIME_STEPS)) {
            self.time_step = Some(snap_time(time, steps));
        }
        self
    }
}

/// The largest step not after `time`, or the first step.
fn snap_time(time: f64, steps: &[f64]) -> f64 {
    steps
        .iter()
        .copied()
        .take_while(|&step| step <= time)
        .last()
        .or_else(|| steps.first().copied())
        .unwrap_or(time)
}

/// What an output port was last computed from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExecutionSignature {
    /// When the execution completed.
    pub completed: TimeStamp,
    /// Modification times of the consumed input objects, per port and
    /// connection.
    pub inputs: Vec<Vec<Option<TimeStamp>>>,
    /// The request served.
    pub request: UpdateRequest,
    /// Modification time of the installed output object.
    pub output: Option<TimeStamp>,
}

impl ExecutionSignature {
    /// Returns the reason the output must be recomputed, or `None` if the
    /// cached output is still valid.
    pub fn staleness(
        &self,
        parameters: TimeStamp,
        inputs: &[Vec<Option<TimeStamp>>],
        request: &UpdateRequest,
        output: Option<TimeStamp>,
    ) -> Option<&'static str> {
        if parameters > self.completed {
            Some("parameters changed")
        } else if self.inputs != inputs {
            Some("input data changed")
        } else if &self.request != request {
            Some("request changed")
        } else if self.output != output {
            Some("output object replaced")
        } else {
            None
        }
    }
}
