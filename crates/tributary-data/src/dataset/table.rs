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


use crate::array::DataArray;
use crate::error::DataError;
use crate::field::FieldData;
use crate::object::DeepClone;

/// Rows of named columns. Every column has one tuple per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: FieldData,
}

impl Table {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a column. The first column fixes the row count;
    /// later columns must match it.
    pub fn add_column(&mut self, column: DataArray) -> Result<usize, DataError> {
        let replacing = self.columns.array(column.name()).is_some();
        if !self.columns.is_empty() && !(replacing && self.columns.len() == 1) {
            let rows = self.number_of_rows();
            if column.number_of_tuples() != rows {
                return Err(DataError::ArrayLength {
                    name: column.name().to_string(),
                    expected: rows,
                    found: column.number_of_tuples(),
                });
            }
        }
        Ok(self.columns.add_array(column))
    }

    /// The column named `name`.
    pub fn column(&self, name: &str) -> Option<&DataArray> {
        self.columns.array(name)
    }

    /// Every column.
    pub fn columns(&self) -> &FieldData {
        &self.columns
    }

    /// Number of rows.
    pub fn number_of_rows(&self) -> usize {
        self.columns.array_at(0).map_or(0, DataArray::number_of_tuples)
    }

    /// Number of columns.
    pub fn number_of_columns(&self) -> usize {
        self.columns.len()
    }

    /// First component of `column` at `row`.
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        self.column(column)?.component(row, 0)
    }
}

impl DeepClone for Table {
    fn deep_clone(&self) -> Self {
        Self {
            columns: self.columns.deep_clone(),
        }
    }
}
