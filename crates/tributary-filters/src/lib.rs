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


//! # Tributary Filters
//!
//! Small, complete algorithms built on the [`Algorithm`](tributary_pipeline::Algorithm)
//! contract. They keep the numerics trivial and exist to drive every part
//! of the request protocol: whole-extent advertisement, extent narrowing,
//! time steps, fan-in, per-block execution and composite index selection.

#![warn(missing_docs)]

pub mod amr;
pub mod geometry;
pub mod imaging;
pub mod sources;

pub use amr::AmrBlockSelector;
pub use geometry::{AppendFilter, TetrahedraOnly};
pub use imaging::{ExtractExtent, ScaleFilter};
pub use sources::{AmrSource, ImageSource};

/// Name of the point array generated by the sources.
pub const SCALARS: &str = "scalars";
