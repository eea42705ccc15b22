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

//! Port declarations and data access helpers for algorithms.

use tributary_core::InformationVector;
use tributary_data::keys::DATA_OBJECT;
use tributary_data::{DataHandle, DataObject, DataObjectType, DataTypeConstraint};

/// What an input port accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputPortInfo {
    /// Data types the port accepts.
    pub constraint: DataTypeConstraint,
    /// The port may stay unconnected.
    pub optional: bool,
    /// The port accepts more than one connection.
    pub repeatable: bool,
}

impl InputPortInfo {
    /// A required, single-connection port accepting `constraint`.
    pub fn new(constraint: DataTypeConstraint) -> Self {
        Self {
            constraint,
            optional: false,
            repeatable: false,
        }
    }

    /// Marks the port optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the port repeatable.
    #[must_use]
    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }
}

/// What an output port produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPortInfo {
    /// Always the given type.
    Concrete(DataObjectType),
    /// The type of the first connection on the given input port.
    SameAsInput(usize),
}

impl Default for OutputPortInfo {
    fn default() -> Self {
        OutputPortInfo::SameAsInput(0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Data access
// ─────────────────────────────────────────────────────────────────────────────

/// Reading and writing the data object stored in port information.
///
/// Input vectors hold one map per connection, output vectors one per port.
pub trait PortData {
    /// The data object at `index`.
    fn data(&self, index: usize) -> Option<&DataHandle>;

    /// The data object at `index`, mutably, if nobody else holds it.
    fn data_mut(&mut self, index: usize) -> Option<&mut DataObject>;

    /// Replaces the data object at `index`.
    fn set_data(&mut self, index: usize, object: DataObject);
}

impl PortData for InformationVector {
    fn data(&self, index: usize) -> Option<&DataHandle> {
        self.get(index).and_then(|info| info.get(&DATA_OBJECT))
    }

    fn data_mut(&mut self, index: usize) -> Option<&mut DataObject> {
        self.get_mut(index)
            .and_then(|info| info.get_mut(&DATA_OBJECT))
            .and_then(DataHandle::get_mut)
    }

    fn set_data(&mut self, index: usize, object: DataObject) {
        if self.len() <= index {
            self.resize(index + 1);
        }
        if let Some(info) = self.get_mut(index) {
            info.set(&DATA_OBJECT, DataHandle::new(object));
        }
    }
}
