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

//! Piece-by-piece updates of one output.

use crate::error::PipelineError;
use crate::pipeline::{NodeId, Pipeline};
use tributary_data::DataHandle;

/// Drives repeated [`Pipeline::update_piece`] calls over an output.
///
/// Each piece is handed to a sink before the next one is requested, so only
/// one piece is alive in the pipeline at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingDriver {
    number_of_pieces: u32,
    ghost_levels: u32,
}

impl StreamingDriver {
    /// Streams in `number_of_pieces` pieces (at least one).
    pub fn new(number_of_pieces: u32) -> Self {
        Self {
            number_of_pieces: number_of_pieces.max(1),
            ghost_levels: 0,
        }
    }

    /// Requests `ghost_levels` layers around every piece.
    #[must_use]
    pub fn with_ghost_levels(mut self, ghost_levels: u32) -> Self {
        self.ghost_levels = ghost_levels;
        self
    }

    /// Number of pieces.
    #[must_use]
    pub fn number_of_pieces(&self) -> u32 {
        self.number_of_pieces
    }

    /// Ghost levels per piece.
    #[must_use]
    pub fn ghost_levels(&self) -> u32 {
        self.ghost_levels
    }

    /// Updates every piece of output `port` of `node` in order and passes
    /// each result to `sink`. Stops at the first error or abort.
    pub fn run<F>(
        &self,
        pipeline: &mut Pipeline,
        node: NodeId,
        port: usize,
        mut sink: F,
    ) -> Result<(), PipelineError>
    where
        F: FnMut(u32, DataHandle),
    {
        for piece in 0..self.number_of_pieces {
            pipeline.update_piece(node, port, piece, self.number_of_pieces, self.ghost_levels)?;
            let Some(output) = pipeline.output(node, port) else {
                tributary_core::fatal!("{node}:{port} has no output after a successful update");
                return Err(PipelineError::InvalidPort {
                    node,
                    direction: "output",
                    port,
                });
            };
            log::debug!("Streamed piece {}/{} of {node}:{port}", piece + 1, self.number_of_pieces);
            sink(piece, output);
        }
        Ok(())
    }

    /// Updates every piece and collects the results.
    pub fn collect(
        &self,
        pipeline: &mut Pipeline,
        node: NodeId,
        port: usize,
    ) -> Result<Vec<DataHandle>, PipelineError> {
        let mut pieces = Vec::with_capacity(self.number_of_pieces as usize);
        self.run(pipeline, node, port, |_, piece| pieces.push(piece))?;
        Ok(pieces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_least_one_piece() {
        let driver = StreamingDriver::new(0).with_ghost_levels(2);
        assert_eq!(driver.number_of_pieces(), 1);
        assert_eq!(driver.ghost_levels(), 2);
    }
}
