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


//! Information keys defined by the data model.

use crate::object::DataHandle;
use tributary_core::information::{InformationKey, Propagation};

const LOC: &str = "tributary_data";

/// The data object held by an output port.
pub const DATA_OBJECT: InformationKey<DataHandle> = InformationKey::new(LOC, "DATA_OBJECT");

/// Structure of a composite output (a metadata copy with empty leaves),
/// published during the information pass.
pub const COMPOSITE_METADATA: InformationKey<DataHandle> =
    InformationKey::with_propagation(LOC, "COMPOSITE_METADATA", Propagation::Downstream);

/// Flat indices of the composite blocks a consumer wants. Absent means all.
pub const UPDATE_COMPOSITE_INDICES: InformationKey<Vec<usize>> =
    InformationKey::with_propagation(LOC, "UPDATE_COMPOSITE_INDICES", Propagation::Upstream);

/// Flat index of the block currently processed when a non-composite
/// algorithm is looped over the blocks of a composite input.
pub const CURRENT_FLAT_INDEX: InformationKey<usize> = InformationKey::new(LOC, "CURRENT_FLAT_INDEX");
