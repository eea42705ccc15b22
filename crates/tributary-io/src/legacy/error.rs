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


//! Errors of the legacy codec.

use thiserror::Error;
use tributary_data::{DataError, DataObjectType};

/// A failure while encoding or decoding the legacy format.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LegacyFormatError {
    /// The first line is not a legacy header.
    #[error("not a legacy data file: first line is {0:?}")]
    BadHeader(String),
    /// Only ASCII files are supported.
    #[error("unsupported file encoding {0:?}, expected ASCII")]
    UnsupportedEncoding(String),
    /// The text ended in the middle of an object.
    #[error("unexpected end of file, expected {0}")]
    UnexpectedEof(&'static str),
    /// A line did not start with the keyword the grammar requires.
    #[error("line {line}: expected {expected}, found {found:?}")]
    Expected {
        /// 1-based line number.
        line: usize,
        /// What the grammar requires.
        expected: &'static str,
        /// The offending line.
        found: String,
    },
    /// A token could not be parsed as a number.
    #[error("line {line}: invalid number {token:?}")]
    InvalidNumber {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },
    /// The `DATASET` keyword is unknown.
    #[error("line {line}: unknown dataset kind {kind:?}")]
    UnknownDataset {
        /// 1-based line number.
        line: usize,
        /// The keyword.
        kind: String,
    },
    /// A `CHILD` line announced a type that does not match what follows.
    #[error("line {line}: child announced as {announced}, found {found}")]
    ChildTypeMismatch {
        /// 1-based line number.
        line: usize,
        /// Type id on the `CHILD` line.
        announced: i32,
        /// Type found in the nested object.
        found: DataObjectType,
    },
    /// An array element type is unknown.
    #[error("line {line}: unknown array type {name:?}")]
    UnknownArrayType {
        /// 1-based line number.
        line: usize,
        /// The type name.
        name: String,
    },
    /// The object cannot be written in this format.
    #[error("{0} objects cannot be written in the legacy composite format")]
    Unsupported(DataObjectType),
    /// The decoded object is invalid.
    #[error(transparent)]
    Data(#[from] DataError),
}
