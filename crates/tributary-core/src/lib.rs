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

//! # Tributary Core
//!
//! Foundational crate containing the primitives every other pipeline crate
//! builds on: modification timestamps, index-space extents, the synchronous
//! observer [`Subject`](event::Subject), typed [`Information`] maps, the
//! factory registry and the generic graph utilities.

#![warn(missing_docs)]

pub mod diagnostics;
pub mod event;
pub mod extent;
pub mod graph;
pub mod information;
pub mod registry;
pub mod telemetry;
pub mod time;

pub use extent::{Bounds, Extent, ExtentTranslator};
pub use information::{Information, InformationError, InformationKey, InformationVector};
pub use time::{ModifiedTime, TimeStamp};

#[doc(hidden)]
pub use log as __private_log;
