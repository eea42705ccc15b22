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


//! The data object, its shared handle and the capability traits.

use crate::amr::AmrData;
use crate::annotation::AnnotationLayers;
use crate::composite::{CompositeData, CompositeIter, CompositeKind, IterOptions};
use crate::dataset::{Graph, ImageGrid, PointSet, Table, UnstructuredGrid};
use crate::error::DataError;
use crate::field::FieldData;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use tributary_core::event::{EventKind, Subject};
use tributary_core::{Bounds, Information, ModifiedTime, TimeStamp};

/// Produces a value-independent copy: no storage is shared with the source.
///
/// `Clone` on data payloads is the shallow copy (array buffers and child
/// handles are shared); `DeepClone` is the deep one.
pub trait DeepClone {
    /// Returns a copy that shares no storage with `self`.
    fn deep_clone(&self) -> Self;
}

// ─────────────────────────────────────────────────────────────────────────────
// Type tags
// ─────────────────────────────────────────────────────────────────────────────

/// The concrete kind of a data object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataObjectType {
    /// Points with attributes.
    PointSet,
    /// Uniform rectilinear lattice.
    ImageGrid,
    /// Explicit cells over a point list.
    UnstructuredGrid,
    /// Rows and named columns.
    Table,
    /// Vertices and edges.
    Graph,
    /// Tree of arbitrary blocks.
    MultiBlock,
    /// Flat list of pieces of one dataset.
    MultiPiece,
    /// Flat list of partitions of one dataset.
    Partitioned,
    /// List of partitioned datasets.
    PartitionedCollection,
    /// AMR hierarchy where finer levels overlap coarser ones.
    OverlappingAmr,
    /// AMR hierarchy without cross-level overlap.
    NonOverlappingAmr,
    /// Annotations over another object.
    AnnotationLayers,
}

impl DataObjectType {
    /// Every type, in declaration order.
    pub const ALL: [DataObjectType; 12] = [
        DataObjectType::PointSet,
        DataObjectType::ImageGrid,
        DataObjectType::UnstructuredGrid,
        DataObjectType::Table,
        DataObjectType::Graph,
        DataObjectType::MultiBlock,
        DataObjectType::MultiPiece,
        DataObjectType::Partitioned,
        DataObjectType::PartitionedCollection,
        DataObjectType::OverlappingAmr,
        DataObjectType::NonOverlappingAmr,
        DataObjectType::AnnotationLayers,
    ];

    /// Stable integer id used by the legacy file format.
    pub const fn legacy_id(self) -> i32 {
        match self {
            DataObjectType::PointSet => 0,
            DataObjectType::UnstructuredGrid => 4,
            DataObjectType::ImageGrid => 6,
            DataObjectType::MultiBlock => 13,
            DataObjectType::Table => 19,
            DataObjectType::Graph => 20,
            DataObjectType::AnnotationLayers => 28,
            DataObjectType::MultiPiece => 29,
            DataObjectType::OverlappingAmr => 30,
            DataObjectType::NonOverlappingAmr => 31,
            DataObjectType::Partitioned => 37,
            DataObjectType::PartitionedCollection => 38,
        }
    }

    /// Inverse of [`DataObjectType::legacy_id`].
    pub fn from_legacy_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.legacy_id() == id)
    }

    /// Stable type name, used as the factory key.
    pub const fn name(self) -> &'static str {
        match self {
            DataObjectType::PointSet => "PointSet",
            DataObjectType::ImageGrid => "ImageGrid",
            DataObjectType::UnstructuredGrid => "UnstructuredGrid",
            DataObjectType::Table => "Table",
            DataObjectType::Graph => "Graph",
            DataObjectType::MultiBlock => "MultiBlock",
            DataObjectType::MultiPiece => "MultiPiece",
            DataObjectType::Partitioned => "Partitioned",
            DataObjectType::PartitionedCollection => "PartitionedCollection",
            DataObjectType::OverlappingAmr => "OverlappingAmr",
            DataObjectType::NonOverlappingAmr => "NonOverlappingAmr",
            DataObjectType::AnnotationLayers => "AnnotationLayers",
        }
    }

    /// Inverse of [`DataObjectType::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Geometric leaf datasets: point sets, image grids, unstructured grids.
    pub const fn is_dataset(self) -> bool {
        matches!(
            self,
            DataObjectType::PointSet | DataObjectType::ImageGrid | DataObjectType::UnstructuredGrid
        )
    }

    /// Containers of child objects, AMR included.
    pub const fn is_composite(self) -> bool {
        matches!(
            self,
            DataObjectType::MultiBlock
                | DataObjectType::MultiPiece
                | DataObjectType::Partitioned
                | DataObjectType::PartitionedCollection
                | DataObjectType::OverlappingAmr
                | DataObjectType::NonOverlappingAmr
        )
    }

    /// AMR hierarchies.
    pub const fn is_amr(self) -> bool {
        matches!(
            self,
            DataObjectType::OverlappingAmr | DataObjectType::NonOverlappingAmr
        )
    }
}

impl fmt::Display for DataObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Capabilities
// ─────────────────────────────────────────────────────────────────────────────

/// Objects with a spatial extent.
pub trait HasBounds {
    /// Axis-aligned bounds; [`Bounds::INVALID`] when empty.
    fn bounds(&self) -> Bounds;
}

/// Objects owning child data objects.
pub trait HasChildren {
    /// Number of child slots, empty ones included.
    fn number_of_children(&self) -> usize;
    /// The child in slot `index`; `None` for an empty slot or out of range.
    fn child(&self, index: usize) -> Option<&DataHandle>;
}

/// Objects that can carry ghost cells.
pub trait HasGhostLayers {
    /// Number of ghost layers the object was generated with.
    fn ghost_levels(&self) -> u32;
    /// Per-cell ghost markers, if present.
    fn cell_ghost_markers(&self) -> Option<&[u8]>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Payload
// ─────────────────────────────────────────────────────────────────────────────

/// The payload of a [`DataObject`].
#[derive(Debug, Clone)]
pub enum DataKind {
    /// See [`PointSet`].
    PointSet(PointSet),
    /// See [`ImageGrid`].
    ImageGrid(ImageGrid),
    /// See [`UnstructuredGrid`].
    UnstructuredGrid(UnstructuredGrid),
    /// See [`Table`].
    Table(Table),
    /// See [`Graph`].
    Graph(Graph),
    /// Multi-block, multi-piece, partitioned and partitioned collections.
    Composite(CompositeData),
    /// Overlapping and non-overlapping AMR.
    Amr(AmrData),
    /// See [`AnnotationLayers`].
    AnnotationLayers(AnnotationLayers),
}

impl DataKind {
    /// An empty payload of the given type.
    pub fn empty(data_type: DataObjectType) -> Self {
        use crate::amr::AmrMode;
        match data_type {
            DataObjectType::PointSet => DataKind::PointSet(PointSet::default()),
            DataObjectType::ImageGrid => DataKind::ImageGrid(ImageGrid::default()),
            DataObjectType::UnstructuredGrid => {
                DataKind::UnstructuredGrid(UnstructuredGrid::default())
            }
            DataObjectType::Table => DataKind::Table(Table::default()),
            DataObjectType::Graph => DataKind::Graph(Graph::default()),
            DataObjectType::MultiBlock => {
                DataKind::Composite(CompositeData::new(CompositeKind::MultiBlock))
            }
            DataObjectType::MultiPiece => {
                DataKind::Composite(CompositeData::new(CompositeKind::MultiPiece))
            }
            DataObjectType::Partitioned => {
                DataKind::Composite(CompositeData::new(CompositeKind::Partitioned))
            }
            DataObjectType::PartitionedCollection => {
                DataKind::Composite(CompositeData::new(CompositeKind::PartitionedCollection))
            }
            DataObjectType::OverlappingAmr => DataKind::Amr(AmrData::new(AmrMode::Overlapping)),
            DataObjectType::NonOverlappingAmr => {
                DataKind::Amr(AmrData::new(AmrMode::NonOverlapping))
            }
            DataObjectType::AnnotationLayers => {
                DataKind::AnnotationLayers(AnnotationLayers::default())
            }
        }
    }

    /// The type tag of this payload.
    pub fn data_type(&self) -> DataObjectType {
        match self {
            DataKind::PointSet(_) => DataObjectType::PointSet,
            DataKind::ImageGrid(_) => DataObjectType::ImageGrid,
            DataKind::UnstructuredGrid(_) => DataObjectType::UnstructuredGrid,
            DataKind::Table(_) => DataObjectType::Table,
            DataKind::Graph(_) => DataObjectType::Graph,
            DataKind::Composite(c) => c.kind().data_type(),
            DataKind::Amr(a) => a.mode().data_type(),
            DataKind::AnnotationLayers(_) => DataObjectType::AnnotationLayers,
        }
    }
}

impl DeepClone for DataKind {
    fn deep_clone(&self) -> Self {
        match self {
            DataKind::PointSet(p) => DataKind::PointSet(p.deep_clone()),
            DataKind::ImageGrid(g) => DataKind::ImageGrid(g.deep_clone()),
            DataKind::UnstructuredGrid(g) => DataKind::UnstructuredGrid(g.deep_clone()),
            DataKind::Table(t) => DataKind::Table(t.deep_clone()),
            DataKind::Graph(g) => DataKind::Graph(g.deep_clone()),
            DataKind::Composite(c) => DataKind::Composite(c.deep_clone()),
            DataKind::Amr(a) => DataKind::Amr(a.deep_clone()),
            DataKind::AnnotationLayers(a) => DataKind::AnnotationLayers(a.deep_clone()),
        }
    }
}

impl HasBounds for DataKind {
    fn bounds(&self) -> Bounds {
        match self {
            DataKind::PointSet(p) => p.bounds(),
            DataKind::ImageGrid(g) => g.bounds(),
            DataKind::UnstructuredGrid(g) => g.bounds(),
            DataKind::Composite(c) => c.bounds(),
            DataKind::Amr(a) => HasBounds::bounds(a),
            DataKind::Table(_) | DataKind::Graph(_) | DataKind::AnnotationLayers(_) => {
                Bounds::INVALID
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DataObject
// ─────────────────────────────────────────────────────────────────────────────

/// A unit of data flowing through the pipeline.
///
/// Any mutation through `&mut self` advances the modification time. Copies
/// made with [`DataObject::shallow_copy`] and [`DataObject::deep_copy`] are
/// stamped after their source.
pub struct DataObject {
    kind: DataKind,
    field_data: FieldData,
    information: Information,
    mtime: ModifiedTime,
    subject: Subject,
}

macro_rules! payload_accessors {
    ($($variant:ident => $ty:ty, $get:ident, $get_mut:ident;)*) => {
        $(
            #[doc = concat!("The payload as a [`", stringify!($ty), "`].")]
            pub fn $get(&self) -> Option<&$ty> {
                match &self.kind {
                    DataKind::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            #[doc = concat!("The payload as a mutable [`", stringify!($ty), "`]. Counts as a modification.")]
            ///
            /// `Modified` observers are notified before the reference is handed
            /// out, so they still see the old content. Call
            /// [`DataObject::modified`] once the edit is done if they must see
            /// the new one.
            pub fn $get_mut(&mut self) -> Option<&mut $ty> {
                if !matches!(self.kind, DataKind::$variant(_)) {
                    return None;
                }
                self.modified();
                match &mut self.kind {
                    DataKind::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        )*
    };
}

impl DataObject {
    /// Wraps a payload.
    pub fn new(kind: DataKind) -> Self {
        Self {
            kind,
            field_data: FieldData::new(),
            information: Information::new(),
            mtime: ModifiedTime::new(),
            subject: Subject::new(),
        }
    }

    /// An empty object of the given type.
    pub fn of_type(data_type: DataObjectType) -> Self {
        Self::new(DataKind::empty(data_type))
    }

    /// The type tag.
    pub fn data_type(&self) -> DataObjectType {
        self.kind.data_type()
    }

    /// The payload.
    pub fn kind(&self) -> &DataKind {
        &self.kind
    }

    /// The payload, mutably. Counts as a modification.
    ///
    /// Observers are notified before the edit, as with the typed `_mut`
    /// accessors.
    pub fn kind_mut(&mut self) -> &mut DataKind {
        self.modified();
        &mut self.kind
    }

    payload_accessors! {
        PointSet => PointSet, as_point_set, as_point_set_mut;
        ImageGrid => ImageGrid, as_image_grid, as_image_grid_mut;
        UnstructuredGrid => UnstructuredGrid, as_unstructured_grid, as_unstructured_grid_mut;
        Table => Table, as_table, as_table_mut;
        Graph => Graph, as_graph, as_graph_mut;
        Composite => CompositeData, as_composite, as_composite_mut;
        Amr => AmrData, as_amr, as_amr_mut;
        AnnotationLayers => AnnotationLayers, as_annotation_layers, as_annotation_layers_mut;
    }

    /// Arrays attached to the object as a whole.
    pub fn field_data(&self) -> &FieldData {
        &self.field_data
    }

    /// Whole-object arrays, mutably. Counts as a modification.
    pub fn field_data_mut(&mut self) -> &mut FieldData {
        self.modified();
        &mut self.field_data
    }

    /// The side-map (time step, piece, extent descriptors).
    pub fn information(&self) -> &Information {
        &self.information
    }

    /// The side-map, mutably. Does not change the modification time.
    pub fn information_mut(&mut self) -> &mut Information {
        &mut self.information
    }

    /// Time of the last modification.
    pub fn modified_time(&self) -> TimeStamp {
        self.mtime.get()
    }

    /// Advances the modification time and notifies `Modified` observers.
    ///
    /// Mutable accessors call this on entry; call it again after an in-place
    /// edit to announce the finished content.
    pub fn modified(&self) -> TimeStamp {
        let stamp = self.mtime.modified();
        self.subject.invoke_event(EventKind::Modified, None);
        stamp
    }

    /// Observer list of this object.
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Resets the payload to an empty one of the same type and drops every
    /// field array.
    pub fn initialize(&mut self) {
        self.kind = DataKind::empty(self.data_type());
        self.field_data.clear();
        self.modified();
    }

    /// Copies the structure of `source` and shares its array storage and
    /// children.
    pub fn shallow_copy(&mut self, source: &DataObject) -> Result<(), DataError> {
        self.check_same_type(source)?;
        self.kind = source.kind.clone();
        self.field_data = source.field_data.clone();
        self.information = source.information.clone();
        self.modified();
        Ok(())
    }

    /// Copies `source` without sharing any storage; composite children are
    /// deep copied into new handles.
    pub fn deep_copy(&mut self, source: &DataObject) -> Result<(), DataError> {
        self.check_same_type(source)?;
        self.kind = source.kind.deep_clone();
        self.field_data = source.field_data.deep_clone();
        self.information = source.information.clone();
        self.modified();
        Ok(())
    }

    /// A new object that is a shallow copy of `self`.
    pub fn shallow_copied(&self) -> DataObject {
        let mut copy = DataObject::new(self.kind.clone());
        copy.field_data = self.field_data.clone();
        copy.information = self.information.clone();
        copy
    }

    /// A new object that is a deep copy of `self`.
    pub fn deep_copied(&self) -> DataObject {
        let mut copy = DataObject::new(self.kind.deep_clone());
        copy.field_data = self.field_data.deep_clone();
        copy.information = self.information.clone();
        copy
    }

    /// Iterates over the children of a composite or AMR object. Leaf objects
    /// yield nothing.
    pub fn composite_iter(&self, options: IterOptions) -> CompositeIter<'_> {
        CompositeIter::new(self, options)
    }

    /// Rebuilds a composite tree, replacing every non-empty leaf with the
    /// result of `f(flat_index, leaf)`.
    ///
    /// Inner nodes, empty slots and slot metadata are preserved, and flat
    /// indices match [`CompositeIter`]. An AMR root stays AMR while every
    /// result is an image grid; otherwise it becomes a multi-block holding
    /// one multi-piece per level. A leaf root is returned as a shallow copy.
    pub fn map_leaves<E, F>(&self, mut f: F) -> Result<DataObject, E>
    where
        F: FnMut(usize, &DataHandle) -> Result<Option<DataHandle>, E>,
    {
        let mut next = 1;
        map_object(self, &mut next, &mut f)
    }

    /// A copy of the composite structure whose leaves are empty objects of
    /// the same types. A leaf object yields an empty object of its type.
    pub fn structure_placeholder(&self) -> DataObject {
        if !self.data_type().is_composite() {
            return DataObject::of_type(self.data_type());
        }
        let mapped: Result<DataObject, std::convert::Infallible> = self.map_leaves(|_, leaf| {
            Ok(Some(DataHandle::new(DataObject::of_type(leaf.data_type()))))
        });
        match mapped {
            Ok(object) => object,
            Err(never) => match never {},
        }
    }

    /// Returns `true` if both objects have the same type and, for composite
    /// objects, the same slots holding children of the same types.
    pub fn matches_structure(&self, other: &DataObject) -> bool {
        if self.data_type() != other.data_type() {
            return false;
        }
        match (&self.kind, &other.kind) {
            (DataKind::Composite(a), DataKind::Composite(b)) => {
                a.slots().len() == b.slots().len()
                    && a.slots().iter().zip(b.slots()).all(|(x, y)| {
                        match (x.data(), y.data()) {
                            (None, None) => true,
                            (Some(x), Some(y)) => x.matches_structure(y),
                            _ => false,
                        }
                    })
            }
            (DataKind::Amr(a), DataKind::Amr(b)) => a.same_structure(b),
            _ => true,
        }
    }

    fn check_same_type(&self, source: &DataObject) -> Result<(), DataError> {
        if self.data_type() == source.data_type() {
            Ok(())
        } else {
            Err(DataError::TypeMismatch {
                expected: self.data_type(),
                found: source.data_type(),
            })
        }
    }
}

fn map_object<E, F>(object: &DataObject, next: &mut usize, f: &mut F) -> Result<DataObject, E>
where
    F: FnMut(usize, &DataHandle) -> Result<Option<DataHandle>, E>,
{
    let kind = match object.kind() {
        DataKind::Composite(c) => {
            let mut out = CompositeData::new(c.kind());
            for slot in c.slots() {
                let flat = *next;
                *next += 1;
                let data = match slot.data() {
                    None => None,
                    Some(child) if child.data_type().is_composite() => {
                        Some(DataHandle::new(map_object(child, next, f)?))
                    }
                    Some(leaf) => f(flat, leaf)?,
                };
                out.push_slot(data, slot.metadata().clone());
            }
            DataKind::Composite(out)
        }
        DataKind::Amr(a) => map_amr(a, next, f)?,
        _ => return Ok(object.shallow_copied()),
    };
    let mut out = DataObject::new(kind);
    out.field_data = object.field_data.clone();
    out.information = object.information.clone();
    Ok(out)
}

fn map_amr<E, F>(amr: &AmrData, next: &mut usize, f: &mut F) -> Result<DataKind, E>
where
    F: FnMut(usize, &DataHandle) -> Result<Option<DataHandle>, E>,
{
    let mut mapped: Vec<Vec<Option<DataHandle>>> = Vec::with_capacity(amr.number_of_levels());
    for level in 0..amr.number_of_levels() {
        let mut blocks = Vec::with_capacity(amr.number_of_blocks(level));
        for index in 0..amr.number_of_blocks(level) {
            let flat = *next;
            *next += 1;
            blocks.push(match amr.block(level, index) {
                Some(block) => f(flat, block)?,
                None => None,
            });
        }
        mapped.push(blocks);
    }

    let all_images = mapped
        .iter()
        .flatten()
        .flatten()
        .all(|h| h.data_type() == DataObjectType::ImageGrid);
    if all_images {
        let mut out = amr.metadata_copy();
        for (level, blocks) in mapped.into_iter().enumerate() {
            for (index, block) in blocks.into_iter().enumerate() {
                out.replace_block(level, index, block);
            }
        }
        return Ok(DataKind::Amr(out));
    }

    let mut levels = CompositeData::new(CompositeKind::MultiBlock);
    for blocks in mapped {
        let mut pieces = CompositeData::new(CompositeKind::MultiPiece);
        for block in blocks {
            pieces.push_slot(block, Information::new());
        }
        let pieces = DataHandle::new(DataObject::new(DataKind::Composite(pieces)));
        levels.push_slot(Some(pieces), Information::new());
    }
    Ok(DataKind::Composite(levels))
}

impl HasBounds for DataObject {
    fn bounds(&self) -> Bounds {
        self.kind.bounds()
    }
}

impl Drop for DataObject {
    fn drop(&mut self) {
        self.subject.remove_all_observers();
    }
}

impl fmt::Debug for DataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataObject")
            .field("type", &self.data_type())
            .field("mtime", &self.mtime.get())
            .field("field_arrays", &self.field_data.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DataHandle
// ─────────────────────────────────────────────────────────────────────────────

/// A shared, reference-counted handle to a [`DataObject`].
///
/// Cloning (or [`register`](DataHandle::register)) adds an owner, dropping
/// (or [`unregister`](DataHandle::unregister)) removes one; the object is
/// destroyed with its last owner. Equality is identity.
#[derive(Clone)]
pub struct DataHandle(Arc<DataObject>);

impl DataHandle {
    /// Takes ownership of `object`.
    pub fn new(object: DataObject) -> Self {
        Self(Arc::new(object))
    }

    /// Adds an owner.
    #[must_use]
    pub fn register(&self) -> DataHandle {
        self.clone()
    }

    /// Removes this owner.
    pub fn unregister(self) {
        drop(self);
    }

    /// Current number of owners.
    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Mutable access, available only to the sole owner.
    pub fn get_mut(&mut self) -> Option<&mut DataObject> {
        Arc::get_mut(&mut self.0)
    }

    /// Recovers the object if this is the sole owner.
    pub fn try_unwrap(self) -> Result<DataObject, DataHandle> {
        Arc::try_unwrap(self.0).map_err(DataHandle)
    }

    /// Returns `true` if both handles refer to the same object.
    pub fn ptr_eq(a: &DataHandle, b: &DataHandle) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl Deref for DataHandle {
    type Target = DataObject;

    fn deref(&self) -> &DataObject {
        &self.0
    }
}

impl From<DataObject> for DataHandle {
    fn from(object: DataObject) -> Self {
        Self::new(object)
    }
}

impl PartialEq for DataHandle {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl DeepClone for DataHandle {
    fn deep_clone(&self) -> Self {
        DataHandle::new(self.0.deep_copied())
    }
}

impl fmt::Debug for DataHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DataHandle").field(&*self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::DataArray;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn legacy_ids_round_trip() {
        for t in DataObjectType::ALL {
            assert_eq!(DataObjectType::from_legacy_id(t.legacy_id()), Some(t));
            assert_eq!(DataObjectType::from_name(t.name()), Some(t));
        }
        assert_eq!(DataObjectType::from_legacy_id(99), None);
    }

    #[test]
    fn modified_is_strictly_increasing_and_notifies() {
        let object = DataObject::of_type(DataObjectType::Table);
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        object.subject().add_observer(EventKind::Modified, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        let before = object.modified_time();
        let after = object.modified();

        assert!(after > before);
        assert_eq!(object.modified_time(), after);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn explicit_modified_after_edit_announces_new_content() {
        // --- 1. ARRANGE ---
        let mut object = DataObject::of_type(DataObjectType::Table);
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        object.subject().add_observer(EventKind::Modified, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        // --- 2. ACT ---
        let table = object.as_table_mut().unwrap();
        let entered = hits.load(Ordering::SeqCst);
        table
            .add_column(DataArray::from_f64("x", 1, vec![1.0, 2.0]))
            .unwrap();
        let edited = object.modified_time();
        let announced = object.modified();

        // --- 3. ASSERT ---
        assert_eq!(entered, 1, "Accessor notifies on entry");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(announced > edited);
        assert_eq!(object.as_table().unwrap().number_of_rows(), 2);
    }

    #[test]
    fn payload_mutation_bumps_time() {
        let mut object = DataObject::of_type(DataObjectType::ImageGrid);
        let before = object.modified_time();
        assert!(object.as_table_mut().is_none());
        assert_eq!(object.modified_time(), before);

        object.as_image_grid_mut().unwrap().set_spacing([2.0, 2.0, 2.0]);
        assert!(object.modified_time() > before);
    }

    #[test]
    fn handle_reference_counting() {
        let handle = DataHandle::new(DataObject::of_type(DataObjectType::PointSet));
        assert_eq!(handle.reference_count(), 1);

        let second = handle.register();
        assert_eq!(handle.reference_count(), 2);
        assert!(DataHandle::ptr_eq(&handle, &second));

        second.unregister();
        assert_eq!(handle.reference_count(), 1);
    }

    #[test]
    fn shared_handle_refuses_mutation() {
        let mut handle = DataHandle::new(DataObject::of_type(DataObjectType::PointSet));
        let reader = handle.register();
        assert!(handle.get_mut().is_none());

        drop(reader);
        assert!(handle.get_mut().is_some());
    }

    #[test]
    fn drop_fires_delete_once() {
        let deletes = Arc::new(AtomicUsize::new(0));
        {
            let object = DataObject::of_type(DataObjectType::Graph);
            let d = Arc::clone(&deletes);
            object.subject().add_observer(EventKind::Delete, move |_| {
                d.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(deletes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn copies_are_stamped_after_source() {
        let mut source = DataObject::of_type(DataObjectType::Table);
        source
            .field_data_mut()
            .add_array(DataArray::from_f64("f", 1, vec![1.0]));

        let mut target = DataObject::of_type(DataObjectType::Table);
        source.modified();
        target.shallow_copy(&source).unwrap();
        assert!(target.modified_time() > source.modified_time());

        source.modified();
        target.deep_copy(&source).unwrap();
        assert!(target.modified_time() > source.modified_time());
    }

    #[test]
    fn copy_between_types_is_rejected() {
        let source = DataObject::of_type(DataObjectType::Table);
        let mut target = DataObject::of_type(DataObjectType::Graph);
        assert_eq!(
            target.shallow_copy(&source),
            Err(DataError::TypeMismatch {
                expected: DataObjectType::Graph,
                found: DataObjectType::Table,
            })
        );
    }

    fn nested() -> DataObject {
        let mut inner = DataObject::of_type(DataObjectType::MultiPiece);
        inner
            .as_composite_mut()
            .unwrap()
            .append_child(Some(DataHandle::new(DataObject::of_type(DataObjectType::ImageGrid))))
            .unwrap();
        let mut root = DataObject::of_type(DataObjectType::MultiBlock);
        let c = root.as_composite_mut().unwrap();
        c.append_child(Some(DataHandle::new(DataObject::of_type(DataObjectType::Table))))
            .unwrap();
        c.append_child(None).unwrap();
        c.append_child(Some(DataHandle::new(inner))).unwrap();
        c.set_child_name(0, "table").unwrap();
        root
    }

    #[test]
    fn map_leaves_uses_iterator_flat_indices() {
        let root = nested();
        let mut seen = Vec::new();
        let mapped: Result<DataObject, DataError> = root.map_leaves(|flat, leaf| {
            seen.push(flat);
            Ok(Some(leaf.clone()))
        });
        let mapped = mapped.unwrap();

        let expected: Vec<usize> = root
            .composite_iter(IterOptions::default())
            .map(|i| i.flat_index)
            .collect();
        assert_eq!(seen, expected);
        assert!(mapped.matches_structure(&root));
        assert_eq!(mapped.as_composite().unwrap().child_name(0), Some("table"));
    }

    #[test]
    fn placeholder_keeps_structure_but_not_content() {
        let mut root = nested();
        let table = root.as_composite().unwrap().slots()[0].data().unwrap().clone();
        let placeholder = root.structure_placeholder();
        assert!(placeholder.matches_structure(&root));
        let copy = placeholder.as_composite().unwrap().slots()[0].data().unwrap().clone();
        assert!(!DataHandle::ptr_eq(&table, &copy));

        root.as_composite_mut().unwrap().set_child(1, Some(table)).unwrap();
        assert!(!placeholder.matches_structure(&root));
    }

    #[test]
    fn amr_with_non_image_results_becomes_multiblock() {
        use crate::amr::AmrMode;
        let mut amr = AmrData::new(AmrMode::Overlapping);
        amr.initialize(&[1, 2]);
        for (level, index) in [(0, 0), (1, 0), (1, 1)] {
            amr.set_child_at(
                level,
                index,
                Some(DataHandle::new(DataObject::of_type(DataObjectType::ImageGrid))),
            )
            .unwrap();
        }
        let object = DataObject::new(DataKind::Amr(amr));

        let same: Result<DataObject, DataError> = object.map_leaves(|_, b| Ok(Some(b.clone())));
        assert_eq!(same.unwrap().data_type(), DataObjectType::OverlappingAmr);

        let points: Result<DataObject, DataError> = object.map_leaves(|_, _| {
            Ok(Some(DataHandle::new(DataObject::of_type(DataObjectType::PointSet))))
        });
        let points = points.unwrap();
        let levels = points.as_composite().unwrap();
        assert_eq!(levels.kind(), CompositeKind::MultiBlock);
        assert_eq!(levels.slots().len(), 2);
        assert_eq!(levels.number_of_leaves(), 3);
    }
}
