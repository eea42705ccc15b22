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


//! Typed attribute arrays with shared, copy-on-write storage.
//!
//! Storage sits behind an `Arc`, so a shallow copy of an array is a pointer
//! copy. Writers go through `Arc::make_mut`: a buffer still visible through
//! another handle is cloned before it is touched, which keeps previously
//! published data intact.

use crate::object::DeepClone;
use std::sync::Arc;

/// The element storage of a [`DataArray`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    /// 64-bit floats.
    Float64(Arc<Vec<f64>>),
    /// 32-bit signed integers.
    Int32(Arc<Vec<i32>>),
    /// Bytes, used for masks and ghost markers.
    UInt8(Arc<Vec<u8>>),
}

impl ArrayValues {
    fn len(&self) -> usize {
        match self {
            ArrayValues::Float64(v) => v.len(),
            ArrayValues::Int32(v) => v.len(),
            ArrayValues::UInt8(v) => v.len(),
        }
    }
}

/// A named array of fixed-width tuples.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    name: String,
    components: usize,
    values: ArrayValues,
}

impl DataArray {
    /// Creates a float array. `values.len()` should be a multiple of `components`.
    pub fn from_f64(name: impl Into<String>, components: usize, values: Vec<f64>) -> Self {
        Self::from_values(name, components, ArrayValues::Float64(Arc::new(values)))
    }

    /// Creates an integer array.
    pub fn from_i32(name: impl Into<String>, components: usize, values: Vec<i32>) -> Self {
        Self::from_values(name, components, ArrayValues::Int32(Arc::new(values)))
    }

    /// Creates a byte array.
    pub fn from_u8(name: impl Into<String>, components: usize, values: Vec<u8>) -> Self {
        Self::from_values(name, components, ArrayValues::UInt8(Arc::new(values)))
    }

    /// Creates an array from already-built storage.
    pub fn from_values(name: impl Into<String>, components: usize, values: ArrayValues) -> Self {
        Self {
            name: name.into(),
            components: components.max(1),
            values,
        }
    }

    /// Array name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the array.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Components per tuple.
    pub fn components(&self) -> usize {
        self.components
    }

    /// Number of tuples.
    pub fn number_of_tuples(&self) -> usize {
        self.values.len() / self.components
    }

    /// Number of scalar values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the array holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    /// The underlying storage.
    pub fn values(&self) -> &ArrayValues {
        &self.values
    }

    /// Scalar value `index` converted to `f64`.
    pub fn value(&self, index: usize) -> Option<f64> {
        match &self.values {
            ArrayValues::Float64(v) => v.get(index).copied(),
            ArrayValues::Int32(v) => v.get(index).map(|x| f64::from(*x)),
            ArrayValues::UInt8(v) => v.get(index).map(|x| f64::from(*x)),
        }
    }

    /// Component `component` of tuple `tuple`, converted to `f64`.
    pub fn component(&self, tuple: usize, component: usize) -> Option<f64> {
        if component >= self.components {
            return None;
        }
        self.value(tuple * self.components + component)
    }

    /// Float storage, if this is a float array.
    pub fn as_f64(&self) -> Option<&[f64]> {
        match &self.values {
            ArrayValues::Float64(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Integer storage, if this is an integer array.
    pub fn as_i32(&self) -> Option<&[i32]> {
        match &self.values {
            ArrayValues::Int32(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Byte storage, if this is a byte array.
    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.values {
            ArrayValues::UInt8(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Writable float storage. Clones the buffer first if it is shared.
    pub fn f64_mut(&mut self) -> Option<&mut Vec<f64>> {
        match &mut self.values {
            ArrayValues::Float64(v) => Some(Arc::make_mut(v)),
            _ => None,
        }
    }

    /// Writable integer storage. Clones the buffer first if it is shared.
    pub fn i32_mut(&mut self) -> Option<&mut Vec<i32>> {
        match &mut self.values {
            ArrayValues::Int32(v) => Some(Arc::make_mut(v)),
            _ => None,
        }
    }

    /// Writable byte storage. Clones the buffer first if it is shared.
    pub fn u8_mut(&mut self) -> Option<&mut Vec<u8>> {
        match &mut self.values {
            ArrayValues::UInt8(v) => Some(Arc::make_mut(v)),
            _ => None,
        }
    }

    /// Returns `true` if both arrays point at the same buffer.
    pub fn shares_storage(&self, other: &DataArray) -> bool {
        match (&self.values, &other.values) {
            (ArrayValues::Float64(a), ArrayValues::Float64(b)) => Arc::ptr_eq(a, b),
            (ArrayValues::Int32(a), ArrayValues::Int32(b)) => Arc::ptr_eq(a, b),
            (ArrayValues::UInt8(a), ArrayValues::UInt8(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Legacy element type name.
    pub fn type_name(&self) -> &'static str {
        match self.values {
            ArrayValues::Float64(_) => "double",
            ArrayValues::Int32(_) => "int",
            ArrayValues::UInt8(_) => "unsigned_char",
        }
    }

    /// Builds a new array from the listed tuples, in order. Out-of-range
    /// tuple indices are skipped.
    pub fn gather(&self, tuples: impl IntoIterator<Item = usize>) -> DataArray {
        let c = self.components;
        let n = self.number_of_tuples();
        let indices: Vec<usize> = tuples.into_iter().filter(|&t| t < n).collect();
        fn pick<T: Copy>(src: &[T], indices: &[usize], c: usize) -> Vec<T> {
            indices
                .iter()
                .flat_map(|&t| src[t * c..(t + 1) * c].iter().copied())
                .collect()
        }
        let values = match &self.values {
            ArrayValues::Float64(v) => ArrayValues::Float64(Arc::new(pick(v, &indices, c))),
            ArrayValues::Int32(v) => ArrayValues::Int32(Arc::new(pick(v, &indices, c))),
            ArrayValues::UInt8(v) => ArrayValues::UInt8(Arc::new(pick(v, &indices, c))),
        };
        DataArray::from_values(self.name.clone(), c, values)
    }

    /// Minimum and maximum of one component, or `None` for an empty array.
    pub fn range(&self, component: usize) -> Option<(f64, f64)> {
        (0..self.number_of_tuples())
            .filter_map(|t| self.component(t, component))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl DeepClone for DataArray {
    fn deep_clone(&self) -> Self {
        let values = match &self.values {
            ArrayValues::Float64(v) => ArrayValues::Float64(Arc::new(v.as_ref().clone())),
            ArrayValues::Int32(v) => ArrayValues::Int32(Arc::new(v.as_ref().clone())),
            ArrayValues::UInt8(v) => ArrayValues::UInt8(Arc::new(v.as_ref().clone())),
        };
        Self {
            name: self.name.clone(),
            components: self.components,
            values,
        }
    }
}
