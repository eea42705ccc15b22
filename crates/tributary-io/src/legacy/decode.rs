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


//! Text to object.

use super::{dataset_type, unescape_name, LegacyFormatError};
use std::str::FromStr;
use tributary_core::Extent;
use tributary_data::{
    AmrBox, AmrData, AmrMode, CellType, CompositeData, CompositeKind, DataArray, DataHandle,
    DataKind, DataObject, DataObjectType, FieldData, GridDescription, ImageGrid, PointSet, Table,
    UnstructuredGrid,
};

/// Any version of the legacy header is accepted.
const HEADER_PREFIX: &str = "# vtk DataFile Version";
const MAX_PREALLOCATED: usize = 4096;

/// A line cursor that skips blank lines and remembers line numbers.
struct Cursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    /// Tokens left over from a value line consumed only in part.
    pending: Vec<&'a str>,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
            pending: Vec::new(),
        }
    }

    /// 1-based number of the line last returned.
    fn line_number(&self) -> usize {
        self.pos
    }

    /// The next line, verbatim.
    fn raw(&mut self, expected: &'static str) -> Result<&'a str, LegacyFormatError> {
        let line = self
            .lines
            .get(self.pos)
            .ok_or(LegacyFormatError::UnexpectedEof(expected))?;
        self.pos += 1;
        Ok(line.trim_end_matches('\r'))
    }

    fn skip_blank(&mut self) {
        while self.lines.get(self.pos).is_some_and(|l| l.trim().is_empty()) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<&'a str> {
        self.skip_blank();
        self.lines.get(self.pos).map(|l| l.trim())
    }

    fn next(&mut self, expected: &'static str) -> Result<&'a str, LegacyFormatError> {
        self.skip_blank();
        self.raw(expected).map(str::trim)
    }

    /// Reads a line starting with `keyword` and returns the remaining tokens.
    fn keyword(&mut self, keyword: &'static str) -> Result<Vec<&'a str>, LegacyFormatError> {
        let line = self.next(keyword)?;
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some(keyword) {
            return Err(self.expected(keyword, line));
        }
        Ok(tokens.collect())
    }

    fn expected(&self, expected: &'static str, found: &str) -> LegacyFormatError {
        LegacyFormatError::Expected {
            line: self.line_number(),
            expected,
            found: found.to_string(),
        }
    }

    fn number<T: FromStr>(&self, token: Option<&&str>) -> Result<T, LegacyFormatError> {
        let token = token.copied().unwrap_or("");
        token.parse().map_err(|_| LegacyFormatError::InvalidNumber {
            line: self.line_number(),
            token: token.to_string(),
        })
    }

    /// `count` records of `width` values each, or an error if the total
    /// does not fit in memory addressing.
    fn scaled(&self, count: usize, width: usize) -> Result<usize, LegacyFormatError> {
        count
            .checked_mul(width)
            .ok_or_else(|| LegacyFormatError::InvalidNumber {
                line: self.line_number(),
                token: count.to_string(),
            })
    }

    /// Reads `count` whitespace separated values, spanning as many lines as
    /// needed.
    fn values<T: FromStr>(&mut self, count: usize, expected: &'static str) -> Result<Vec<T>, LegacyFormatError> {
        // Header counts are untrusted; grow past this as values arrive.
        let mut values = Vec::with_capacity(count.min(MAX_PREALLOCATED));
        while values.len() < count {
            if self.pending.is_empty() {
                let line = self.next(expected)?;
                self.pending = line.split_whitespace().rev().collect();
            }
            while values.len() < count {
                let Some(token) = self.pending.pop() else {
                    break;
                };
                values.push(self.number(Some(&token))?);
            }
        }
        if !self.pending.is_empty() {
            let rest = self.pending.iter().rev().copied().collect::<Vec<_>>().join(" ");
            self.pending.clear();
            return Err(self.expected("end of values", &rest));
        }
        Ok(values)
    }

    fn triple(&self, tokens: &[&str]) -> Result<[f64; 3], LegacyFormatError> {
        Ok([
            self.number(tokens.first())?,
            self.number(tokens.get(1))?,
            self.number(tokens.get(2))?,
        ])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Header
// ─────────────────────────────────────────────────────────────────────────────

fn header<'a>(cursor: &mut Cursor<'a>) -> Result<&'a str, LegacyFormatError> {
    let first = cursor.raw("file header")?;
    if !first.starts_with(HEADER_PREFIX) {
        return Err(LegacyFormatError::BadHeader(first.to_string()));
    }
    let title = cursor.raw("title line")?;
    let encoding = cursor.raw("file encoding")?.trim();
    if !encoding.eq_ignore_ascii_case("ASCII") {
        return Err(LegacyFormatError::UnsupportedEncoding(encoding.to_string()));
    }
    Ok(title)
}

fn dataset(cursor: &mut Cursor<'_>) -> Result<DataObjectType, LegacyFormatError> {
    let tokens = cursor.keyword("DATASET")?;
    let kind = tokens.first().copied().unwrap_or("");
    dataset_type(kind).ok_or_else(|| LegacyFormatError::UnknownDataset {
        line: cursor.line_number(),
        kind: kind.to_string(),
    })
}

/// Reads the header and `DATASET` line of `text` and returns the type of
/// the object it holds.
pub fn peek_data_type(text: &str) -> Result<DataObjectType, LegacyFormatError> {
    let mut cursor = Cursor::new(text);
    header(&mut cursor)?;
    dataset(&mut cursor)
}

/// Decodes a complete legacy file.
pub fn from_legacy_str(text: &str) -> Result<DataObject, LegacyFormatError> {
    let mut cursor = Cursor::new(text);
    let title = header(&mut cursor)?;
    log::trace!("Decoding legacy file {title:?}");
    object(&mut cursor)
}

// ─────────────────────────────────────────────────────────────────────────────
// Objects
// ─────────────────────────────────────────────────────────────────────────────

fn object(cursor: &mut Cursor<'_>) -> Result<DataObject, LegacyFormatError> {
    let data_type = dataset(cursor)?;
    let field = if cursor.peek().is_some_and(|l| l.starts_with("FIELD")) {
        Some(field_data(cursor)?)
    } else {
        None
    };
    let kind = match data_type {
        DataObjectType::MultiBlock => DataKind::Composite(children(cursor, CompositeKind::MultiBlock)?),
        DataObjectType::MultiPiece => DataKind::Composite(children(cursor, CompositeKind::MultiPiece)?),
        DataObjectType::Partitioned => DataKind::Composite(children(cursor, CompositeKind::Partitioned)?),
        DataObjectType::PartitionedCollection => {
            let composite = children(cursor, CompositeKind::PartitionedCollection)?;
            cursor.keyword("DATAASSEMBLY")?;
            DataKind::Composite(composite)
        }
        DataObjectType::OverlappingAmr => DataKind::Amr(amr(cursor)?),
        DataObjectType::ImageGrid => DataKind::ImageGrid(image(cursor)?),
        DataObjectType::PointSet => DataKind::PointSet(point_set(cursor)?),
        DataObjectType::UnstructuredGrid => DataKind::UnstructuredGrid(unstructured(cursor)?),
        DataObjectType::Table => DataKind::Table(table(cursor)?),
        other => return Err(LegacyFormatError::Unsupported(other)),
    };
    let mut object = DataObject::new(kind);
    if let Some(field) = field {
        *object.field_data_mut() = field;
    }
    Ok(object)
}

fn children(cursor: &mut Cursor<'_>, kind: CompositeKind) -> Result<CompositeData, LegacyFormatError> {
    let tokens = cursor.keyword("CHILDREN")?;
    let count: usize = cursor.number(tokens.first())?;
    let mut composite = CompositeData::new(kind);
    for _ in 0..count {
        let line = cursor.next("CHILD")?;
        let rest = line
            .strip_prefix("CHILD ")
            .ok_or_else(|| cursor.expected("CHILD", line))?
            .trim();
        let (id_token, name) = match rest.split_once(char::is_whitespace) {
            Some((id, name)) => (id, Some(name.trim())),
            None => (rest, None),
        };
        let announced: i32 = cursor.number(Some(&id_token))?;
        let child = if announced < 0 {
            None
        } else {
            let child = object(cursor)?;
            if child.data_type().legacy_id() != announced {
                return Err(LegacyFormatError::ChildTypeMismatch {
                    line: cursor.line_number(),
                    announced,
                    found: child.data_type(),
                });
            }
            Some(DataHandle::new(child))
        };
        let slot = composite.append_child(child)?;
        if let Some(name) = name.and_then(|n| n.strip_prefix('[')).and_then(|n| n.strip_suffix(']')) {
            composite.set_child_name(slot, name)?;
        }
        cursor.keyword("ENDCHILD")?;
    }
    Ok(composite)
}

fn amr(cursor: &mut Cursor<'_>) -> Result<AmrData, LegacyFormatError> {
    let tokens = cursor.keyword("GRID_DESCRIPTION")?;
    let code: i32 = cursor.number(tokens.first())?;
    let description = GridDescription::from_code(code).ok_or_else(|| LegacyFormatError::InvalidNumber {
        line: cursor.line_number(),
        token: code.to_string(),
    })?;
    let tokens = cursor.keyword("ORIGIN")?;
    let origin = cursor.triple(&tokens)?;
    let tokens = cursor.keyword("LEVELS")?;
    let levels: usize = cursor.number(tokens.first())?;

    let mut blocks = Vec::with_capacity(levels.min(MAX_PREALLOCATED));
    let mut spacings = Vec::with_capacity(levels.min(MAX_PREALLOCATED));
    for _ in 0..levels {
        let line = cursor.next("level description")?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        blocks.push(cursor.number::<usize>(tokens.first())?);
        spacings.push(cursor.triple(tokens.get(1..).unwrap_or_default())?);
    }

    let mut amr = AmrData::new(AmrMode::Overlapping);
    amr.set_grid_description(description);
    amr.set_origin(origin);
    amr.initialize(&blocks);
    for (level, spacing) in spacings.into_iter().enumerate() {
        amr.set_spacing(level, spacing)?;
    }

    let tokens = cursor.keyword("AMRBOXES")?;
    let count: usize = cursor.number(tokens.first())?;
    let total = cursor.scaled(count, 6)?;
    let packed: Vec<i32> = cursor.values(total, "AMR boxes")?;
    let mut chunks = packed.chunks_exact(6);
    for (level, &n) in blocks.iter().enumerate() {
        for index in 0..n {
            if let Some(chunk) = chunks.next() {
                let mut values = [0; 6];
                values.copy_from_slice(chunk);
                amr.set_amr_box(level, index, AmrBox::deserialize(values))?;
            }
        }
    }

    while cursor.peek().is_some_and(|l| l.starts_with("CHILD ")) {
        let tokens = cursor.keyword("CHILD")?;
        let level: usize = cursor.number(tokens.first())?;
        let index: usize = cursor.number(tokens.get(1))?;
        let block = object(cursor)?;
        amr.set_child_at(level, index, Some(DataHandle::new(block)))?;
        cursor.keyword("ENDCHILD")?;
    }
    if levels > 1 {
        amr.generate_refinement_ratio()?;
    }
    Ok(amr)
}

// ─────────────────────────────────────────────────────────────────────────────
// Leaves
// ─────────────────────────────────────────────────────────────────────────────

fn field_data(cursor: &mut Cursor<'_>) -> Result<FieldData, LegacyFormatError> {
    let tokens = cursor.keyword("FIELD")?;
    let count: usize = cursor.number(tokens.get(1))?;
    let mut field = FieldData::new();
    for _ in 0..count {
        field.add_array(array(cursor)?);
    }
    Ok(field)
}

fn array(cursor: &mut Cursor<'_>) -> Result<DataArray, LegacyFormatError> {
    let line = cursor.next("array header")?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [name, components, tuples, type_name] = tokens[..] else {
        return Err(cursor.expected("array header", line));
    };
    let name = unescape_name(name);
    let components: usize = cursor.number(Some(&components))?;
    let tuples: usize = cursor.number(Some(&tuples))?;
    let count = cursor.scaled(tuples, components)?;
    let array = match type_name {
        "double" | "float" => DataArray::from_f64(name, components, cursor.values(count, "array values")?),
        "int" => DataArray::from_i32(name, components, cursor.values(count, "array values")?),
        "unsigned_char" => DataArray::from_u8(name, components, cursor.values(count, "array values")?),
        other => {
            return Err(LegacyFormatError::UnknownArrayType {
                line: cursor.line_number(),
                name: other.to_string(),
            })
        }
    };
    Ok(array)
}

/// Reads an optional `<keyword> n` section followed by a field block.
fn attributes(cursor: &mut Cursor<'_>, keyword: &'static str) -> Result<Option<FieldData>, LegacyFormatError> {
    if !cursor.peek().is_some_and(|l| l.split_whitespace().next() == Some(keyword)) {
        return Ok(None);
    }
    cursor.keyword(keyword)?;
    field_data(cursor).map(Some)
}

fn points(cursor: &mut Cursor<'_>) -> Result<Vec<[f64; 3]>, LegacyFormatError> {
    let tokens = cursor.keyword("POINTS")?;
    let count: usize = cursor.number(tokens.first())?;
    let total = cursor.scaled(count, 3)?;
    let flat: Vec<f64> = cursor.values(total, "point coordinates")?;
    Ok(flat.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect())
}

fn image(cursor: &mut Cursor<'_>) -> Result<ImageGrid, LegacyFormatError> {
    let tokens = cursor.keyword("EXTENT")?;
    let mut bounds = [0; 6];
    for (i, slot) in bounds.iter_mut().enumerate() {
        *slot = cursor.number(tokens.get(i))?;
    }
    let tokens = cursor.keyword("ORIGIN")?;
    let origin = cursor.triple(&tokens)?;
    let tokens = cursor.keyword("SPACING")?;
    let spacing = cursor.triple(&tokens)?;
    let mut grid = ImageGrid::new(Extent(bounds), origin, spacing);
    if let Some(field) = attributes(cursor, "POINT_DATA")? {
        *grid.point_data_mut() = field;
    }
    if let Some(field) = attributes(cursor, "CELL_DATA")? {
        *grid.cell_data_mut() = field;
    }
    grid.validate()?;
    Ok(grid)
}

fn point_set(cursor: &mut Cursor<'_>) -> Result<PointSet, LegacyFormatError> {
    let mut set = PointSet::from_points(points(cursor)?);
    if let Some(field) = attributes(cursor, "POINT_DATA")? {
        *set.point_data_mut() = field;
    }
    set.validate()?;
    Ok(set)
}

fn unstructured(cursor: &mut Cursor<'_>) -> Result<UnstructuredGrid, LegacyFormatError> {
    let mut grid = UnstructuredGrid::from_points(points(cursor)?);
    let tokens = cursor.keyword("CELLS")?;
    let cells: usize = cursor.number(tokens.first())?;
    let size: usize = cursor.number(tokens.get(1))?;
    let connectivity: Vec<usize> = cursor.values(size, "cell connectivity")?;
    let tokens = cursor.keyword("CELL_TYPES")?;
    let typed: usize = cursor.number(tokens.first())?;
    let types: Vec<u8> = cursor.values(typed, "cell types")?;

    let mut rest = connectivity.as_slice();
    for id in types.into_iter().take(cells) {
        let cell = CellType::from_legacy_id(id).ok_or_else(|| LegacyFormatError::InvalidNumber {
            line: cursor.line_number(),
            token: id.to_string(),
        })?;
        let Some((&n, tail)) = rest.split_first() else {
            return Err(LegacyFormatError::UnexpectedEof("cell connectivity"));
        };
        if tail.len() < n {
            return Err(LegacyFormatError::UnexpectedEof("cell connectivity"));
        }
        let (ids, tail) = tail.split_at(n);
        grid.insert_next_cell(cell, ids)?;
        rest = tail;
    }
    if let Some(field) = attributes(cursor, "POINT_DATA")? {
        *grid.point_data_mut() = field;
    }
    if let Some(field) = attributes(cursor, "CELL_DATA")? {
        *grid.cell_data_mut() = field;
    }
    grid.validate()?;
    Ok(grid)
}

fn table(cursor: &mut Cursor<'_>) -> Result<Table, LegacyFormatError> {
    cursor.keyword("ROW_DATA")?;
    let columns = field_data(cursor)?;
    let mut table = Table::new();
    for column in columns.iter() {
        table.add_column(column.clone())?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTIBLOCK: &str = "# vtk DataFile Version 5.1
demo
ASCII
DATASET MULTIBLOCK
CHILDREN 2
CHILD 0 [cloud]
DATASET POLYDATA
POINTS 2 double
0 0 0 1 2
3
ENDCHILD
CHILD -1
ENDCHILD
";

    #[test]
    fn values_may_span_lines() {
        let object = from_legacy_str(MULTIBLOCK).unwrap();
        let composite = object.as_composite().unwrap();
        let cloud = composite.slots()[0].data().unwrap().as_point_set().unwrap();

        assert_eq!(cloud.point(1), Some([1.0, 2.0, 3.0]));
        assert_eq!(composite.child_name(0), Some("cloud"));
        assert!(composite.slots()[1].data().is_none());
    }

    #[test]
    fn peeks_the_dataset_kind() {
        assert_eq!(peek_data_type(MULTIBLOCK), Ok(DataObjectType::MultiBlock));
    }

    #[test]
    fn rejects_foreign_files() {
        let result = from_legacy_str("hello\nworld\nASCII\n");
        assert!(matches!(result, Err(LegacyFormatError::BadHeader(_))));
    }

    #[test]
    fn rejects_binary_files() {
        let result = peek_data_type("# vtk DataFile Version 5.1\nt\nBINARY\n");
        assert_eq!(
            result,
            Err(LegacyFormatError::UnsupportedEncoding("BINARY".to_string()))
        );
    }

    #[test]
    fn reports_child_type_mismatch() {
        let text = MULTIBLOCK.replace("CHILD 0 [cloud]", "CHILD 6 [cloud]");
        let result = from_legacy_str(&text);
        assert!(matches!(
            result,
            Err(LegacyFormatError::ChildTypeMismatch { announced: 6, found: DataObjectType::PointSet, .. })
        ));
    }

    #[test]
    fn reports_truncated_files() {
        let text = MULTIBLOCK.lines().take(8).collect::<Vec<_>>().join("\n");
        assert!(matches!(
            from_legacy_str(&text),
            Err(LegacyFormatError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn rejects_box_counts_that_overflow() {
        // --- 1. ARRANGE ---
        let text = "# vtk DataFile Version 5.1
amr
ASCII
DATASET OVERLAPPING_AMR
GRID_DESCRIPTION 8
ORIGIN 0 0 0
LEVELS 1
1 1 1 1
AMRBOXES 3074457345618258603 6
";

        // --- 2. ACT ---
        let result = from_legacy_str(text);

        // --- 3. ASSERT ---
        assert!(matches!(
            result,
            Err(LegacyFormatError::InvalidNumber { ref token, .. }) if token == "3074457345618258603"
        ));
    }

    #[test]
    fn huge_point_count_fails_without_preallocating() {
        // --- 1. ARRANGE ---
        let text = "# vtk DataFile Version 5.1
cloud
ASCII
DATASET POLYDATA
POINTS 2305843009213693952 double
0 0 0
";

        // --- 2. ACT ---
        let result = from_legacy_str(text);

        // --- 3. ASSERT ---
        assert!(matches!(result, Err(LegacyFormatError::UnexpectedEof(_))));
    }
}
