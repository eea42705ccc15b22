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


//! Named collections of arrays attached to points, cells, rows or whole objects.

use crate::array::DataArray;
use crate::object::DeepClone;

/// An ordered set of uniquely named [`DataArray`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldData {
    arrays: Vec<DataArray>,
}

impl FieldData {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an array, replacing any array with the same name. Returns its index.
    pub fn add_array(&mut self, array: DataArray) -> usize {
        match self.arrays.iter().position(|a| a.name() == array.name()) {
            Some(index) => {
                self.arrays[index] = array;
                index
            }
            None => {
                self.arrays.push(array);
                self.arrays.len() - 1
            }
        }
    }

    /// The array named `name`.
    pub fn array(&self, name: &str) -> Option<&DataArray> {
        self.arrays.iter().find(|a| a.name() == name)
    }

    /// The array named `name`, mutably.
    pub fn array_mut(&mut self, name: &str) -> Option<&mut DataArray> {
        self.arrays.iter_mut().find(|a| a.name() == name)
    }

    /// The array at `index`.
    pub fn array_at(&self, index: usize) -> Option<&DataArray> {
        self.arrays.get(index)
    }

    /// Removes and returns the array named `name`.
    pub fn remove_array(&mut self, name: &str) -> Option<DataArray> {
        let index = self.arrays.iter().position(|a| a.name() == name)?;
        Some(self.arrays.remove(index))
    }

    /// Number of arrays.
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Returns `true` if there are no arrays.
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Iterates over the arrays in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, DataArray> {
        self.arrays.iter()
    }

    /// Removes every array.
    pub fn clear(&mut self) {
        self.arrays.clear();
    }

    /// Tuple count shared by every array, or `None` if they disagree.
    /// An empty collection reports `Some(0)`.
    pub fn common_tuple_count(&self) -> Option<usize> {
        let mut counts = self.arrays.iter().map(DataArray::number_of_tuples);
        let first = counts.next().unwrap_or(0);
        counts.all(|n| n == first).then_some(first)
    }

    /// Builds a collection holding the listed tuples of every array.
    pub fn gather(&self, tuples: &[usize]) -> FieldData {
        FieldData {
            arrays: self
                .arrays
                .iter()
                .map(|a| a.gather(tuples.iter().copied()))
                .collect(),
        }
    }
}

impl DeepClone for FieldData {
    fn deep_clone(&self) -> Self {
        Self {
            arrays: self.arrays.iter().map(DeepClone::deep_clone).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FieldData {
    type Item = &'a DataArray;
    type IntoIter = std::slice::Iter<'a, DataArray>;

    fn into_iter(self) -> Self::IntoIter {
        self.arrays.iter()
    }
}
