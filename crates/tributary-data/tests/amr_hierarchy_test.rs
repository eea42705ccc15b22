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


use approx::assert_relative_eq;
use tributary_core::Extent;
use tributary_data::amr::{AmrBox, AmrData, AmrGridConnectivity, AmrMode, GridDescription};
use tributary_data::{DataKind, DataObject, DataObjectType, HasBounds, ImageGrid, IterOptions};

/// A 2D hierarchy: a 16x16 root and two 8x8 refined patches side by side.
fn hierarchy() -> AmrData {
    let mut amr = AmrData::new(AmrMode::Overlapping);
    amr.set_grid_description(GridDescription::XyPlane);
    amr.set_origin([0.0, 0.0, 0.0]);
    amr.initialize(&[1, 2]);
    amr.set_grid(
        0,
        0,
        ImageGrid::new(Extent::new(0, 16, 0, 16, 0, 0), [0.0; 3], [1.0, 1.0, 1.0]),
    )
    .unwrap();
    amr.set_grid(
        1,
        0,
        ImageGrid::new(Extent::new(0, 8, 0, 8, 0, 0), [0.0; 3], [0.5, 0.5, 1.0]),
    )
    .unwrap();
    amr.set_grid(
        1,
        1,
        ImageGrid::new(Extent::new(8, 16, 0, 8, 0, 0), [0.0; 3], [0.5, 0.5, 1.0]),
    )
    .unwrap();
    amr
}

#[test]
fn test_hierarchy_metadata_and_blanking() {
    // --- 1. ARRANGE ---
    let mut amr = hierarchy();

    // --- 2. ACT ---
    amr.generate_refinement_ratio().unwrap();
    amr.validate().unwrap();
    amr.generate_blanking().unwrap();

    // --- 3. ASSERT ---
    assert_eq!(amr.refinement_ratio(0), Some(2));
    assert_eq!(amr.children(0, 0), Some(&[0, 1][..]));
    // Each patch hides 4x4 coarse cells.
    assert_eq!(amr.number_of_visible_cells(0, 0), Some(256 - 32));
    assert_eq!(amr.amr_box(1, 1), Some(AmrBox::new([8, 0, 0], [15, 7, -1])));

    let bounds = amr.bounds(1, 1).unwrap();
    assert_relative_eq!(bounds.0[0], 4.0);
    assert_relative_eq!(bounds.0[1], 8.0);
    assert_relative_eq!(HasBounds::bounds(&amr).0[3], 16.0);
}

#[test]
fn test_amr_iteration_is_level_major() {
    let object = DataObject::new(DataKind::Amr(hierarchy()));
    let visited: Vec<(usize, usize, usize)> = object
        .composite_iter(IterOptions::default())
        .map(|item| (item.flat_index, item.level, item.index))
        .collect();
    assert_eq!(visited, vec![(1, 0, 0), (2, 1, 0), (3, 1, 1)]);
    assert_eq!(object.data_type(), DataObjectType::OverlappingAmr);
}

#[test]
fn test_connectivity_from_hierarchy_boxes() {
    // --- 1. ARRANGE ---
    let amr = hierarchy();
    let mut conn = AmrGridConnectivity::new(GridDescription::XyPlane).with_constant_ratio(2);
    let mut id = 0;
    for level in 0..amr.number_of_levels() {
        for index in 0..amr.number_of_blocks(level) {
            if level == 1 {
                let b = amr.amr_box(level, index).unwrap();
                conn.register_grid(id, level, b.node_extent(), None).unwrap();
                id += 1;
            }
        }
    }

    // --- 2. ACT ---
    conn.create_ghost_layers(1).unwrap();

    // --- 3. ASSERT ---
    // The patches share the x = 8 line; grid 0 owns it.
    let left = conn.ghosted_grid(0).unwrap();
    let right = conn.ghosted_grid(1).unwrap();
    assert!(!left.is_node_ghost([8, 4, 0]));
    assert!(right.is_node_ghost([8, 4, 0]));
    assert_eq!(left.ghosted_extent(), Extent::new(0, 9, 0, 8, 0, 0));
    assert_eq!(conn.neighbors(0).len(), 1);
}
