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


//! # Tributary IO
//!
//! Reading and writing composite datasets in the legacy ASCII format.
//!
//! [`legacy`] holds the text codec. [`CompositeDataReader`] and
//! [`CompositeDataWriter`] wrap it as pipeline algorithms, and [`file`] has
//! one-call helpers for applications that do not need a pipeline.

#![warn(missing_docs)]

pub mod file;
pub mod legacy;
pub mod reader;
pub mod writer;

pub use legacy::LegacyFormatError;
pub use reader::CompositeDataReader;
pub use writer::CompositeDataWriter;
