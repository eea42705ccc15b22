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


//! Type requirements of algorithm input ports.

use crate::object::DataObjectType;
use std::fmt;

/// Which data types an input port accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DataTypeConstraint {
    /// Any data object.
    #[default]
    Any,
    /// Point sets, image grids and unstructured grids.
    DataSet,
    /// Composite containers and AMR hierarchies.
    Composite,
    /// AMR hierarchies only.
    Amr,
    /// Exactly one of the listed types.
    OneOf(Vec<DataObjectType>),
}

impl DataTypeConstraint {
    /// Constraint accepting a single type.
    pub fn exactly(data_type: DataObjectType) -> Self {
        DataTypeConstraint::OneOf(vec![data_type])
    }

    /// Returns `true` if `data_type` satisfies the constraint.
    pub fn accepts(&self, data_type: DataObjectType) -> bool {
        match self {
            DataTypeConstraint::Any => true,
            DataTypeConstraint::DataSet => data_type.is_dataset(),
            DataTypeConstraint::Composite => data_type.is_composite(),
            DataTypeConstraint::Amr => data_type.is_amr(),
            DataTypeConstraint::OneOf(types) => types.contains(&data_type),
        }
    }
}

impl fmt::Display for DataTypeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataTypeConstraint::Any => f.write_str("any data object"),
            DataTypeConstraint::DataSet => f.write_str("dataset"),
            DataTypeConstraint::Composite => f.write_str("composite dataset"),
            DataTypeConstraint::Amr => f.write_str("AMR dataset"),
            DataTypeConstraint::OneOf(types) => {
                for (i, t) in types.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{t}")?;
                }
                Ok(())
            }
        }
    }
}
