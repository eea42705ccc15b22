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


//! The legacy composite reader as a source algorithm.

use crate::legacy::{self, LegacyFormatError};
use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};
use tributary_core::{InformationVector, ModifiedTime, TimeStamp};
use tributary_pipeline::{Algorithm, AlgorithmError, PortData, Request};

impl From<LegacyFormatError> for AlgorithmError {
    fn from(error: LegacyFormatError) -> Self {
        match error {
            LegacyFormatError::Data(inner) => AlgorithmError::Data(inner),
            other => AlgorithmError::failed(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Source {
    File(PathBuf),
    Text(String),
}

/// Reads a legacy composite file.
///
/// The output type is not known until the file is opened: it is taken from
/// the `DATASET` line while the output objects are created, so consumers
/// connected to the reader see the right type before any data is read.
#[derive(Debug, Default)]
pub struct CompositeDataReader {
    source: Option<Source>,
    mtime: ModifiedTime,
}

impl CompositeDataReader {
    /// Creates a reader with nothing to read yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reader for `path`.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let mut reader = Self::new();
        reader.set_file_name(path);
        reader
    }

    /// Reads from `path`.
    pub fn set_file_name(&mut self, path: impl Into<PathBuf>) {
        let source = Some(Source::File(path.into()));
        if self.source != source {
            self.source = source;
            self.mtime.modified();
        }
    }

    /// The file being read, if reading from a file.
    #[must_use]
    pub fn file_name(&self) -> Option<&Path> {
        match &self.source {
            Some(Source::File(path)) => Some(path),
            _ => None,
        }
    }

    /// Reads from an in-memory string instead of a file.
    pub fn set_input_string(&mut self, text: impl Into<String>) {
        let source = Some(Source::Text(text.into()));
        if self.source != source {
            self.source = source;
            self.mtime.modified();
        }
    }

    fn text(&self) -> Result<String, AlgorithmError> {
        match &self.source {
            Some(Source::File(path)) => fs::read_to_string(path).map_err(|e| {
                AlgorithmError::failed(format!("cannot read {}: {e}", path.display()))
            }),
            Some(Source::Text(text)) => Ok(text.clone()),
            None => Err(AlgorithmError::failed("no file name or input string set")),
        }
    }
}

impl Algorithm for CompositeDataReader {
    fn name(&self) -> &str {
        "CompositeDataReader"
    }

    fn number_of_input_ports(&self) -> usize {
        0
    }

    fn modified_time(&self) -> TimeStamp {
        self.mtime.get()
    }

    fn request_data_object(
        &mut self,
        _request: &Request,
        _inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        let data_type = legacy::peek_data_type(&self.text()?)?;
        if outputs.data(0).map(|d| d.data_type()) != Some(data_type) {
            log::debug!("CompositeDataReader output type is {data_type}");
            outputs.set_data(0, tributary_data::DataObject::of_type(data_type));
        }
        Ok(())
    }

    fn request_data(
        &mut self,
        request: &Request,
        _inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        let object = legacy::from_legacy_str(&self.text()?)?;
        request.set_progress(1.0);
        outputs.set_data(0, object);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
