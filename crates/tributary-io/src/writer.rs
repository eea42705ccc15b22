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


//! The legacy composite writer as a sink algorithm.

use crate::legacy::{self, DEFAULT_TITLE};
use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};
use tributary_core::{InformationVector, ModifiedTime, TimeStamp};
use tributary_data::DataTypeConstraint;
use tributary_pipeline::{
    Algorithm, AlgorithmError, InputPortInfo, NodeId, Pipeline, PipelineError, PortData, Request,
};

/// Writes its composite input in the legacy format, to a file or to an
/// in-memory string.
#[derive(Debug)]
pub struct CompositeDataWriter {
    file_name: Option<PathBuf>,
    title: String,
    output: Option<String>,
    mtime: ModifiedTime,
}

impl Default for CompositeDataWriter {
    fn default() -> Self {
        Self {
            file_name: None,
            title: DEFAULT_TITLE.to_string(),
            output: None,
            mtime: ModifiedTime::new(),
        }
    }
}

impl CompositeDataWriter {
    /// Creates a writer keeping its output in memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer for `path`.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file_name: Some(path.into()),
            ..Self::default()
        }
    }

    /// Writes to `path`, or only in memory when `None`.
    pub fn set_file_name(&mut self, path: Option<PathBuf>) {
        if self.file_name != path {
            self.file_name = path;
            self.mtime.modified();
        }
    }

    /// The destination file, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    /// Sets the title line.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if self.title != title {
            self.title = title;
            self.mtime.modified();
        }
    }

    /// The text produced by the last write.
    #[must_use]
    pub fn output_string(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Brings the input of the writer at `node` up to date and writes it,
    /// even if nothing changed since the last write.
    pub fn write(pipeline: &mut Pipeline, node: NodeId) -> Result<(), PipelineError> {
        pipeline
            .algorithm_mut::<CompositeDataWriter>(node)
            .ok_or(PipelineError::InvalidNode(node))?
            .mtime
            .modified();
        pipeline.update_sink(node)
    }
}

impl Algorithm for CompositeDataWriter {
    fn name(&self) -> &str {
        "CompositeDataWriter"
    }

    fn number_of_output_ports(&self) -> usize {
        0
    }

    fn fill_input_port_information(&self, _port: usize) -> InputPortInfo {
        InputPortInfo::new(DataTypeConstraint::Composite)
    }

    fn modified_time(&self) -> TimeStamp {
        self.mtime.get()
    }

    fn request_data(
        &mut self,
        _request: &Request,
        inputs: &[InformationVector],
        _outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        let input = inputs
            .first()
            .and_then(|v| v.data(0))
            .ok_or_else(|| AlgorithmError::bad_input(0, "nothing to write"))?;
        let text = legacy::to_legacy_string(input, &self.title)?;
        if let Some(path) = &self.file_name {
            fs::write(path, &text).map_err(|e| {
                AlgorithmError::failed(format!("cannot write {}: {e}", path.display()))
            })?;
            log::debug!("CompositeDataWriter wrote {} bytes to {}", text.len(), path.display());
        }
        self.output = Some(text);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
