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


//! Composite containers: multi-block trees, multi-piece and partitioned
//! datasets, and partitioned collections.

mod iter;

pub use self::iter::{CompositeItem, CompositeIter, IterOptions};

use crate::error::DataError;
use crate::object::{DataHandle, DataObjectType, DeepClone, HasBounds, HasChildren};
use tributary_core::information::keys;
use tributary_core::{Bounds, Information};

/// Flavour of a [`CompositeData`], deciding which children it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    /// Any child, nesting allowed.
    MultiBlock,
    /// Non-composite pieces of one dataset.
    MultiPiece,
    /// Non-composite partitions of one dataset.
    Partitioned,
    /// Partitioned datasets only.
    PartitionedCollection,
}

impl CompositeKind {
    /// The matching type tag.
    pub const fn data_type(self) -> DataObjectType {
        match self {
            CompositeKind::MultiBlock => DataObjectType::MultiBlock,
            CompositeKind::MultiPiece => DataObjectType::MultiPiece,
            CompositeKind::Partitioned => DataObjectType::Partitioned,
            CompositeKind::PartitionedCollection => DataObjectType::PartitionedCollection,
        }
    }

    /// Returns `true` if a child of type `child` may be stored.
    pub fn accepts(self, child: DataObjectType) -> bool {
        match self {
            CompositeKind::MultiBlock => true,
            CompositeKind::MultiPiece | CompositeKind::Partitioned => !child.is_composite(),
            CompositeKind::PartitionedCollection => child == DataObjectType::Partitioned,
        }
    }
}

/// One child slot: an optional child plus its metadata (such as `NAME`).
#[derive(Debug, Clone, Default)]
pub struct CompositeSlot {
    data: Option<DataHandle>,
    metadata: Information,
}

impl CompositeSlot {
    /// The child, `None` when the slot is empty.
    pub fn data(&self) -> Option<&DataHandle> {
        self.data.as_ref()
    }

    /// Per-child metadata.
    pub fn metadata(&self) -> &Information {
        &self.metadata
    }
}

/// An ordered list of child slots.
#[derive(Debug, Clone)]
pub struct CompositeData {
    kind: CompositeKind,
    slots: Vec<CompositeSlot>,
}

impl CompositeData {
    /// Creates an empty container.
    pub fn new(kind: CompositeKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
        }
    }

    /// The container flavour.
    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    /// Grows with empty slots or truncates, dropping the removed children.
    pub fn set_number_of_children(&mut self, count: usize) {
        self.slots.resize_with(count, CompositeSlot::default);
    }

    /// Stores `child` in slot `index`; `None` empties the slot.
    pub fn set_child(&mut self, index: usize, child: Option<DataHandle>) -> Result<(), DataError> {
        let len = self.slots.len();
        if index >= len {
            return Err(DataError::IndexOutOfRange { index, len });
        }
        if let Some(handle) = &child {
            self.check_child(handle.data_type())?;
        }
        self.slots[index].data = child;
        Ok(())
    }

    /// Appends a slot holding `child` and returns its index.
    pub fn append_child(&mut self, child: Option<DataHandle>) -> Result<usize, DataError> {
        if let Some(handle) = &child {
            self.check_child(handle.data_type())?;
        }
        self.slots.push(CompositeSlot {
            data: child,
            metadata: Information::new(),
        });
        Ok(self.slots.len() - 1)
    }

    /// Removes slot `index`, shifting later slots down.
    pub fn remove_child(&mut self, index: usize) -> Result<Option<DataHandle>, DataError> {
        let len = self.slots.len();
        if index >= len {
            return Err(DataError::IndexOutOfRange { index, len });
        }
        Ok(self.slots.remove(index).data)
    }

    /// Metadata of slot `index`.
    pub fn child_metadata(&self, index: usize) -> Option<&Information> {
        self.slots.get(index).map(|s| &s.metadata)
    }

    /// Metadata of slot `index`, mutably.
    pub fn child_metadata_mut(&mut self, index: usize) -> Option<&mut Information> {
        self.slots.get_mut(index).map(|s| &mut s.metadata)
    }

    /// The `NAME` recorded for slot `index`.
    pub fn child_name(&self, index: usize) -> Option<&str> {
        self.child_metadata(index)?.get(&keys::NAME).map(String::as_str)
    }

    /// Records a `NAME` for slot `index`.
    pub fn set_child_name(&mut self, index: usize, name: impl Into<String>) -> Result<(), DataError> {
        let len = self.slots.len();
        let meta = self
            .child_metadata_mut(index)
            .ok_or(DataError::IndexOutOfRange { index, len })?;
        meta.set(&keys::NAME, name.into());
        Ok(())
    }

    /// Every slot, in order.
    pub fn slots(&self) -> &[CompositeSlot] {
        &self.slots
    }

    /// Iterates over the children.
    pub fn iter(&self, options: IterOptions) -> CompositeIter<'_> {
        CompositeIter::over_composite(self, options)
    }

    /// Number of non-composite objects in the tree, counted recursively.
    pub fn number_of_leaves(&self) -> usize {
        self.iter(IterOptions::default()).count()
    }

    /// Appends a slot without type checks; used when rebuilding a tree
    /// whose leaves were produced by an algorithm.
    pub(crate) fn push_slot(&mut self, data: Option<DataHandle>, metadata: Information) {
        self.slots.push(CompositeSlot { data, metadata });
    }

    fn check_child(&self, child: DataObjectType) -> Result<(), DataError> {
        if self.kind.accepts(child) {
            Ok(())
        } else {
            Err(DataError::InvalidChild {
                parent: self.kind.data_type(),
                child,
            })
        }
    }
}

impl HasChildren for CompositeData {
    fn number_of_children(&self) -> usize {
        self.slots.len()
    }

    fn child(&self, index: usize) -> Option<&DataHandle> {
        self.slots.get(index).and_then(|s| s.data.as_ref())
    }
}

impl HasBounds for CompositeData {
    fn bounds(&self) -> Bounds {
        self.slots
            .iter()
            .filter_map(|s| s.data.as_ref())
            .fold(Bounds::INVALID, |acc, child| acc.merge(&child.bounds()))
    }
}

impl DeepClone for CompositeData {
    fn deep_clone(&self) -> Self {
        Self {
            kind: self.kind,
            slots: self
                .slots
                .iter()
                .map(|s| CompositeSlot {
                    data: s.data.as_ref().map(DeepClone::deep_clone),
                    metadata: s.metadata.clone(),
                })
                .collect(),
        }
    }
}
