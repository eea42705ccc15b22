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


//! Object to text.

use super::{dataset_keyword, escape_name, LegacyFormatError, HEADER};
use tributary_data::{
    AmrData, ArrayValues, CompositeData, DataArray, DataKind, DataObject, DataObjectType,
    FieldData, ImageGrid, UnstructuredGrid,
};

const VALUES_PER_LINE: usize = 9;

#[derive(Default)]
struct Emitter {
    out: String,
}

impl Emitter {
    fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn values<T: ToString>(&mut self, values: impl IntoIterator<Item = T>, per_line: usize) {
        let mut row = Vec::with_capacity(per_line);
        for value in values {
            row.push(value.to_string());
            if row.len() == per_line {
                self.line(row.join(" "));
                row.clear();
            }
        }
        if !row.is_empty() {
            self.line(row.join(" "));
        }
    }

    fn array(&mut self, array: &DataArray) {
        self.line(format!(
            "{} {} {} {}",
            escape_name(array.name()),
            array.components(),
            array.number_of_tuples(),
            array.type_name()
        ));
        match array.values() {
            ArrayValues::Float64(v) => self.values(v.iter(), VALUES_PER_LINE),
            ArrayValues::Int32(v) => self.values(v.iter(), VALUES_PER_LINE),
            ArrayValues::UInt8(v) => self.values(v.iter(), VALUES_PER_LINE),
        }
    }

    fn field(&mut self, field: &FieldData) {
        self.line(format!("FIELD FieldData {}", field.len()));
        for array in field.iter() {
            self.array(array);
        }
    }

    fn attributes(&mut self, keyword: &str, count: usize, field: &FieldData) {
        if field.is_empty() {
            return;
        }
        self.line(format!("{keyword} {count}"));
        self.field(field);
    }

    fn points(&mut self, points: &DataArray) {
        let n = points.number_of_tuples();
        self.line(format!("POINTS {n} double"));
        self.values(
            (0..n).flat_map(|t| (0..3).map(move |c| points.component(t, c).unwrap_or(0.0))),
            VALUES_PER_LINE,
        );
    }

    fn object(&mut self, object: &DataObject) -> Result<(), LegacyFormatError> {
        let data_type = object.data_type();
        let keyword = dataset_keyword(data_type).ok_or(LegacyFormatError::Unsupported(data_type))?;
        self.line(format!("DATASET {keyword}"));
        if !object.field_data().is_empty() {
            self.field(object.field_data());
        }
        match object.kind() {
            DataKind::Composite(composite) => self.children(composite, data_type)?,
            DataKind::Amr(amr) => self.amr(amr)?,
            DataKind::ImageGrid(grid) => self.image(grid),
            DataKind::PointSet(set) => {
                self.points(set.points());
                self.attributes("POINT_DATA", set.number_of_points(), set.point_data());
            }
            DataKind::UnstructuredGrid(grid) => self.unstructured(grid),
            DataKind::Table(table) => {
                self.line(format!("ROW_DATA {}", table.number_of_rows()));
                self.field(table.columns());
            }
            _ => return Err(LegacyFormatError::Unsupported(data_type)),
        }
        Ok(())
    }

    fn children(
        &mut self,
        composite: &CompositeData,
        data_type: DataObjectType,
    ) -> Result<(), LegacyFormatError> {
        self.line(format!("CHILDREN {}", composite.slots().len()));
        for (index, slot) in composite.slots().iter().enumerate() {
            let id = slot.data().map_or(-1, |d| d.data_type().legacy_id());
            match composite.child_name(index) {
                Some(name) => self.line(format!("CHILD {id} [{}]", name.replace('\n', " "))),
                None => self.line(format!("CHILD {id}")),
            }
            if let Some(child) = slot.data() {
                self.object(child)?;
            }
            self.line("ENDCHILD");
        }
        if data_type == DataObjectType::PartitionedCollection {
            self.line("DATAASSEMBLY 0");
        }
        Ok(())
    }

    fn amr(&mut self, amr: &AmrData) -> Result<(), LegacyFormatError> {
        let levels = amr.number_of_levels();
        let [ox, oy, oz] = amr.origin();
        self.line(format!("GRID_DESCRIPTION {}", amr.grid_description().code()));
        self.line(format!("ORIGIN {ox} {oy} {oz}"));
        self.line(format!("LEVELS {levels}"));
        for level in 0..levels {
            let [dx, dy, dz] = amr.spacing(level).unwrap_or_default();
            self.line(format!("{} {dx} {dy} {dz}", amr.number_of_blocks(level)));
        }

        let boxes: Vec<[i32; 6]> = (0..levels)
            .flat_map(|level| (0..amr.number_of_blocks(level)).map(move |index| (level, index)))
            .map(|(level, index)| {
                amr.amr_box(level, index)
                    .map_or([0, 0, 0, -1, -1, -1], |b| b.serialize())
            })
            .collect();
        self.line(format!("AMRBOXES {} 6", boxes.len()));
        for packed in &boxes {
            self.values(packed.iter(), 6);
        }

        for level in 0..levels {
            for index in 0..amr.number_of_blocks(level) {
                if let Some(block) = amr.block(level, index) {
                    self.line(format!("CHILD {level} {index}"));
                    self.object(block)?;
                    self.line("ENDCHILD");
                }
            }
        }
        Ok(())
    }

    fn image(&mut self, grid: &ImageGrid) {
        let [x0, x1, y0, y1, z0, z1] = grid.extent().0;
        let [ox, oy, oz] = grid.origin();
        let [sx, sy, sz] = grid.spacing();
        self.line(format!("EXTENT {x0} {x1} {y0} {y1} {z0} {z1}"));
        self.line(format!("ORIGIN {ox} {oy} {oz}"));
        self.line(format!("SPACING {sx} {sy} {sz}"));
        self.attributes("POINT_DATA", grid.number_of_points(), grid.point_data());
        self.attributes("CELL_DATA", grid.number_of_cells(), grid.cell_data());
    }

    fn unstructured(&mut self, grid: &UnstructuredGrid) {
        self.points(grid.points());
        let size: usize = grid.cells().map(|(_, ids)| ids.len() + 1).sum();
        self.line(format!("CELLS {} {size}", grid.number_of_cells()));
        for (_, ids) in grid.cells() {
            let mut row = vec![ids.len().to_string()];
            row.extend(ids.iter().map(ToString::to_string));
            self.line(row.join(" "));
        }
        self.line(format!("CELL_TYPES {}", grid.number_of_cells()));
        self.values(grid.cells().map(|(cell, _)| cell.legacy_id()), VALUES_PER_LINE);
        self.attributes("POINT_DATA", grid.number_of_points(), grid.point_data());
        self.attributes("CELL_DATA", grid.number_of_cells(), grid.cell_data());
    }
}

/// Encodes `object` as a complete legacy file.
///
/// Newlines in `title` are replaced by spaces.
pub fn to_legacy_string(object: &DataObject, title: &str) -> Result<String, LegacyFormatError> {
    let mut emitter = Emitter::default();
    emitter.line(HEADER);
    emitter.line(title.replace(['\n', '\r'], " "));
    emitter.line("ASCII");
    emitter.object(object)?;
    Ok(emitter.out)
}
