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


//! # Tributary Data
//!
//! The data objects that flow through a pipeline.
//!
//! Every object is a [`DataObject`]: a closed [`DataKind`] payload plus field
//! data, an [`Information`](tributary_core::Information) side-map, a
//! modification time and an observer [`Subject`](tributary_core::event::Subject).
//! Objects are shared through [`DataHandle`]s; mutation requires unique
//! access, so a published object is never written behind a reader's back.
//!
//! Payloads are plain structs with capability traits
//! ([`HasBounds`], [`HasChildren`], [`HasGhostLayers`]) instead of a class
//! hierarchy. Composite payloads hold child handles; AMR payloads add box
//! metadata, derived blanking and the ghost-layer connectivity engine.

#![warn(missing_docs)]

pub mod amr;
pub mod annotation;
pub mod array;
pub mod composite;
pub mod constraint;
pub mod dataset;
pub mod error;
pub mod factory;
pub mod field;
pub mod keys;
pub mod object;

pub use amr::{AmrBox, AmrData, AmrGridConnectivity, AmrMode, GridDescription};
pub use annotation::{Annotation, AnnotationId, AnnotationLayers};
pub use array::{ArrayValues, DataArray};
pub use composite::{CompositeData, CompositeItem, CompositeIter, CompositeKind, IterOptions};
pub use constraint::DataTypeConstraint;
pub use dataset::{CellType, Graph, ImageGrid, PointSet, Table, UnstructuredGrid};
pub use error::{DataError, RefinementError};
pub use factory::DataObjectFactory;
pub use field::FieldData;
pub use object::{
    DataHandle, DataKind, DataObject, DataObjectType, DeepClone, HasBounds, HasChildren,
    HasGhostLayers,
};
