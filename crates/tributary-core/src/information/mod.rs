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


//! # Information
//!
//! Typed, heterogeneous key/value maps exchanged between the executive and
//! algorithms during every pipeline pass.
//!
//! Keys are [`InformationKey<T>`] constants declared next to the code that
//! owns their meaning. A key identifies itself by `(location, name)`, so two
//! crates can declare keys with the same short name without clashing. Values
//! must be clonable and comparable: request information is compared when
//! deciding whether an output is stale.
//!
//! ```
//! use tributary_core::information::{keys, Information};
//! use tributary_core::Extent;
//!
//! let mut info = Information::new();
//! info.set(&keys::WHOLE_EXTENT, Extent::new(0, 9, 0, 9, 0, 0));
//! assert_eq!(info.get(&keys::WHOLE_EXTENT).map(|e| e.number_of_points()), Some(100));
//! ```

mod key;
pub mod keys;

pub use self::key::{InformationKey, KeyId, Propagation};

use crate::time::{ModifiedTime, TimeStamp};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors raised when reading an [`Information`] map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InformationError {
    /// A required key has no value.
    #[error("information key {0} is missing")]
    Missing(KeyId),
}

// ─────────────────────────────────────────────────────────────────────────────
// Value erasure
// ─────────────────────────────────────────────────────────────────────────────

/// Object-safe view of a value stored in an [`Information`] map.
pub trait InformationValue: Any + Send + Sync + fmt::Debug {
    /// Clones the value behind a fresh box.
    fn clone_box(&self) -> Box<dyn InformationValue>;
    /// Compares with another erased value of possibly different type.
    fn eq_dyn(&self, other: &dyn InformationValue) -> bool;
    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;
    /// Mutable upcast for downcasting to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Owning upcast for downcasting to the concrete type.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> InformationValue for T
where
    T: Any + Clone + PartialEq + Send + Sync + fmt::Debug,
{
    fn clone_box(&self) -> Box<dyn InformationValue> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn InformationValue) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

struct Entry {
    propagation: Propagation,
    value: Box<dyn InformationValue>,
}

impl Clone for Entry {
    fn clone(&self) -> Self {
        Self {
            propagation: self.propagation,
            value: self.value.clone_box(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Information
// ─────────────────────────────────────────────────────────────────────────────

/// A typed map from [`InformationKey`]s to values.
///
/// The map carries its own modification time, advanced by every mutation.
#[derive(Clone, Default)]
pub struct Information {
    entries: BTreeMap<KeyId, Entry>,
    mtime: ModifiedTime,
}

impl Information {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any previous value for `key`.
    pub fn set<T>(&mut self, key: &InformationKey<T>, value: T)
    where
        T: InformationValue + Clone + PartialEq,
    {
        self.entries.insert(
            key.id(),
            Entry {
                propagation: key.propagation(),
                value: Box::new(value),
            },
        );
        self.mtime.modified();
    }

    /// Returns the value for `key`, if present.
    pub fn get<T: 'static>(&self, key: &InformationKey<T>) -> Option<&T> {
        self.entries
            .get(&key.id())
            .and_then(|e| e.value.as_any().downcast_ref::<T>())
    }

    /// Returns the value for `key`, or an error naming the missing key.
    pub fn require<T: 'static>(&self, key: &InformationKey<T>) -> Result<&T, InformationError> {
        self.get(key).ok_or(InformationError::Missing(key.id()))
    }

    /// Returns a mutable reference to the value for `key`, if present.
    /// Counts as a mutation.
    pub fn get_mut<T: 'static>(&mut self, key: &InformationKey<T>) -> Option<&mut T> {
        self.mtime.modified();
        self.entries
            .get_mut(&key.id())
            .and_then(|e| e.value.as_any_mut().downcast_mut::<T>())
    }

    /// Returns a copy of the value for `key`, if present.
    pub fn get_cloned<T: Clone + 'static>(&self, key: &InformationKey<T>) -> Option<T> {
        self.get(key).cloned()
    }

    /// Returns `true` if `key` has a value.
    pub fn has<T>(&self, key: &InformationKey<T>) -> bool {
        self.entries.contains_key(&key.id())
    }

    /// Removes and returns the value for `key`.
    pub fn remove<T: 'static>(&mut self, key: &InformationKey<T>) -> Option<T> {
        let entry = self.entries.remove(&key.id())?;
        self.mtime.modified();
        entry.value.into_any().downcast::<T>().ok().map(|value| *value)
    }

    /// Copies the value of `key` from `other`, or removes it here if `other`
    /// has none.
    pub fn copy_entry_from<T>(&mut self, other: &Information, key: &InformationKey<T>) {
        match other.entries.get(&key.id()) {
            Some(entry) => {
                self.entries.insert(key.id(), entry.clone());
            }
            None => {
                self.entries.remove(&key.id());
            }
        }
        self.mtime.modified();
    }

    /// Copies every entry of `other` into `self`, overwriting duplicates.
    pub fn copy_from(&mut self, other: &Information) {
        for (id, entry) in &other.entries {
            self.entries.insert(*id, entry.clone());
        }
        self.mtime.modified();
    }

    /// Returns `true` if both maps hold equal values for `key`, or neither
    /// holds one.
    pub fn same_value<T>(&self, other: &Information, key: &InformationKey<T>) -> bool {
        match (self.entries.get(&key.id()), other.entries.get(&key.id())) {
            (Some(a), Some(b)) => a.value.eq_dyn(b.value.as_ref()),
            (None, None) => true,
            _ => false,
        }
    }

    /// Copies the entries of `other` whose keys are marked with `direction`.
    /// Entries already present in `self` are kept.
    pub fn propagate_from(&mut self, other: &Information, direction: Propagation) {
        for (id, entry) in &other.entries {
            if entry.propagation == direction && !self.entries.contains_key(id) {
                self.entries.insert(*id, entry.clone());
            }
        }
        self.mtime.modified();
    }

    /// Removes every entry marked with `direction`.
    pub fn remove_propagating(&mut self, direction: Propagation) {
        self.entries.retain(|_, entry| entry.propagation != direction);
        self.mtime.modified();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.mtime.modified();
    }

    /// Iterates over the identities of every key with a value.
    pub fn keys(&self) -> impl Iterator<Item = KeyId> + '_ {
        self.entries.keys().copied()
    }

    /// Time of the last mutation.
    pub fn modified_time(&self) -> TimeStamp {
        self.mtime.get()
    }
}

impl PartialEq for Information {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(id, entry)| {
                other
                    .entries
                    .get(id)
                    .is_some_and(|o| entry.value.eq_dyn(o.value.as_ref()))
            })
    }
}

impl fmt::Debug for Information {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(id, e)| (id, &e.value)))
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// InformationVector
// ─────────────────────────────────────────────────────────────────────────────

/// An ordered list of [`Information`] maps, one per port or connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InformationVector {
    items: Vec<Information>,
}

impl InformationVector {
    /// Creates an empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a vector holding `len` empty maps.
    pub fn with_len(len: usize) -> Self {
        Self {
            items: vec![Information::new(); len],
        }
    }

    /// Number of maps.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Grows or truncates to `len` maps.
    pub fn resize(&mut self, len: usize) {
        self.items.resize_with(len, Information::new);
    }

    /// Appends a map.
    pub fn push(&mut self, info: Information) {
        self.items.push(info);
    }

    /// The map at `index`.
    pub fn get(&self, index: usize) -> Option<&Information> {
        self.items.get(index)
    }

    /// The map at `index`, mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Information> {
        self.items.get_mut(index)
    }

    /// Iterates over the maps.
    pub fn iter(&self) -> std::slice::Iter<'_, Information> {
        self.items.iter()
    }

    /// Iterates mutably over the maps.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Information> {
        self.items.iter_mut()
    }

    /// Consumes the vector, returning its maps.
    pub fn into_inner(self) -> Vec<Information> {
        self.items
    }
}

impl From<Vec<Information>> for InformationVector {
    fn from(items: Vec<Information>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a InformationVector {
    type Item = &'a Information;
    type IntoIter = std::slice::Iter<'a, Information>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
