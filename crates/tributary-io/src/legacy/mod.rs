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


//! # Legacy composite format
//!
//! An ASCII format in the spirit of the classic legacy files. A file is a
//! three-line header followed by one object:
//!
//! ```text
//! # vtk DataFile Version 5.1
//! <title>
//! ASCII
//! DATASET MULTIBLOCK
//! CHILDREN 2
//! CHILD 6 [left]
//! DATASET STRUCTURED_POINTS
//! ...
//! ENDCHILD
//! CHILD -1
//! ENDCHILD
//! ```
//!
//! Multi-block, multi-piece, partitioned and partitioned-collection objects
//! list their children with `CHILDREN n` and `CHILD <type-id> [name]` ...
//! `ENDCHILD` pairs, an empty slot using the id `-1`. Partitioned
//! collections end with `DATAASSEMBLY 0`.
//!
//! Overlapping AMR objects write `GRID_DESCRIPTION`, `ORIGIN`, `LEVELS n`
//! followed by one `<blocks> <dx> <dy> <dz>` line per level, the packed
//! boxes under `AMRBOXES <count> 6`, then one `CHILD <level> <index>` ...
//! `ENDCHILD` pair per present block.
//!
//! Leaf objects use a compact encoding:
//!
//! | Type               | Keyword             | Geometry                                 |
//! |--------------------|---------------------|------------------------------------------|
//! | image grid         | `STRUCTURED_POINTS` | `EXTENT`, `ORIGIN`, `SPACING`            |
//! | point set          | `POLYDATA`          | `POINTS n double`                        |
//! | unstructured grid  | `UNSTRUCTURED_GRID` | `POINTS`, `CELLS n size`, `CELL_TYPES n` |
//! | table              | `TABLE`             | `ROW_DATA n`                             |
//!
//! Arrays are written as `FIELD FieldData k` blocks of
//! `<name> <components> <tuples> <type>` headers followed by the values.
//! Object-level field data follows the `DATASET` line, point and cell
//! arrays follow `POINT_DATA n` and `CELL_DATA n`.

mod decode;
mod encode;
mod error;

pub use self::decode::{from_legacy_str, peek_data_type};
pub use self::encode::to_legacy_string;
pub use self::error::LegacyFormatError;

use tributary_data::DataObjectType;

/// First line of every file.
pub const HEADER: &str = "# vtk DataFile Version 5.1";

/// Title used when none is given.
pub const DEFAULT_TITLE: &str = "tributary composite data";

const DATASET_KEYWORDS: [(DataObjectType, &str); 9] = [
    (DataObjectType::MultiBlock, "MULTIBLOCK"),
    (DataObjectType::MultiPiece, "MULTIPIECE"),
    (DataObjectType::Partitioned, "PARTITIONED"),
    (DataObjectType::PartitionedCollection, "PARTITIONED_COLLECTION"),
    (DataObjectType::OverlappingAmr, "OVERLAPPING_AMR"),
    (DataObjectType::ImageGrid, "STRUCTURED_POINTS"),
    (DataObjectType::PointSet, "POLYDATA"),
    (DataObjectType::UnstructuredGrid, "UNSTRUCTURED_GRID"),
    (DataObjectType::Table, "TABLE"),
];

/// The `DATASET` keyword of `data_type`, if the format supports it.
pub fn dataset_keyword(data_type: DataObjectType) -> Option<&'static str> {
    DATASET_KEYWORDS
        .iter()
        .find(|(t, _)| *t == data_type)
        .map(|(_, k)| *k)
}

/// Inverse of [`dataset_keyword`].
pub fn dataset_type(keyword: &str) -> Option<DataObjectType> {
    DATASET_KEYWORDS
        .iter()
        .find(|(_, k)| *k == keyword)
        .map(|(t, _)| *t)
}

/// Array names cannot hold whitespace in the format.
fn escape_name(name: &str) -> String {
    name.replace('%', "%25").replace(' ', "%20")
}

fn unescape_name(name: &str) -> String {
    name.replace("%20", " ").replace("%25", "%")
}
