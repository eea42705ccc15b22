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
use tributary_core::information::keys::DATA_EXTENT;
use tributary_core::Extent;
use tributary_data::{
    CellType, DataArray, DataKind, DataObject, IterOptions, PointSet, UnstructuredGrid,
};
use tributary_filters::geometry::VOLUME;
use tributary_filters::{
    AmrBlockSelector, AmrSource, AppendFilter, ExtractExtent, ImageSource, ScaleFilter,
    TetrahedraOnly, SCALARS,
};
use tributary_pipeline::{AlgorithmError, Pipeline, PipelineError};

fn scalars(data: &DataObject) -> Vec<f64> {
    data.as_image_grid()
        .and_then(|g| g.point_data().array(SCALARS))
        .and_then(DataArray::as_f64)
        .map(<[f64]>::to_vec)
        .unwrap_or_default()
}

fn tetra(offset: f64) -> UnstructuredGrid {
    let mut grid = UnstructuredGrid::from_points(vec![
        [offset, 0.0, 0.0],
        [offset + 1.0, 0.0, 0.0],
        [offset, 1.0, 0.0],
        [offset, 0.0, 1.0],
    ]);
    grid.insert_next_cell(CellType::Tetra, &[0, 1, 2, 3]).unwrap();
    grid.point_data_mut()
        .add_array(DataArray::from_f64("weight", 1, vec![offset; 4]));
    grid
}

#[test]
fn test_crop_narrows_the_source_request() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(ImageSource::new(Extent::new(0, 99, 0, 0, 0, 0)));
    let crop = pipeline.add(ExtractExtent::new(Extent::new(10, 20, 0, 0, 0, 0)));
    pipeline.connect(source, 0, crop, 0).unwrap();

    // --- 2. ACT ---
    pipeline.update(crop, 0).unwrap();

    // --- 3. ASSERT ---
    let generated = pipeline
        .algorithm::<ImageSource>(source)
        .unwrap()
        .generated_extents()
        .to_vec();
    assert_eq!(
        generated,
        vec![Extent::new(10, 20, 0, 0, 0, 0)],
        "The source should only generate the cropped extent"
    );
    let output = pipeline.output(crop, 0).unwrap();
    let values = scalars(&output);
    assert_eq!(values.len(), 11);
    assert_eq!(values.first(), Some(&10.0));
    assert_eq!(values.last(), Some(&20.0));
    assert_eq!(
        pipeline.output_information(source, 0).unwrap().get(&DATA_EXTENT),
        Some(&Extent::new(10, 20, 0, 0, 0, 0))
    );
}

#[test]
fn test_moving_the_crop_regenerates_only_the_new_extent() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(ImageSource::new(Extent::new(0, 99, 0, 0, 0, 0)));
    let crop = pipeline.add(ExtractExtent::new(Extent::new(10, 20, 0, 0, 0, 0)));
    pipeline.connect(source, 0, crop, 0).unwrap();
    pipeline.update(crop, 0).unwrap();

    // --- 2. ACT ---
    pipeline
        .algorithm_mut::<ExtractExtent>(crop)
        .unwrap()
        .set_voi(Extent::new(50, 59, 0, 0, 0, 0));
    pipeline.update(crop, 0).unwrap();

    // --- 3. ASSERT ---
    let generated = pipeline
        .algorithm::<ImageSource>(source)
        .unwrap()
        .generated_extents()
        .to_vec();
    assert_eq!(
        generated,
        vec![Extent::new(10, 20, 0, 0, 0, 0), Extent::new(50, 59, 0, 0, 0, 0)]
    );
    let output = pipeline.output(crop, 0).unwrap();
    assert_eq!(scalars(&output).first(), Some(&50.0));
}

#[test]
fn test_append_concatenates_fan_in() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let first = pipeline.add_data(DataObject::new(DataKind::UnstructuredGrid(tetra(0.0))));
    let second = pipeline.add_data(DataObject::new(DataKind::UnstructuredGrid(tetra(5.0))));
    let mut cloud = PointSet::from_points(vec![[9.0, 9.0, 9.0]]);
    cloud
        .point_data_mut()
        .add_array(DataArray::from_f64("other", 1, vec![1.0]));
    let third = pipeline.add_data(DataObject::new(DataKind::PointSet(cloud)));
    let append = pipeline.add(AppendFilter::new());
    for producer in [first, second, third] {
        pipeline.connect(producer, 0, append, 0).unwrap();
    }

    // --- 2. ACT ---
    pipeline.update(append, 0).unwrap();

    // --- 3. ASSERT ---
    let output = pipeline.output(append, 0).unwrap();
    let merged = output.as_unstructured_grid().unwrap();
    assert_eq!(merged.number_of_points(), 9);
    assert_eq!(merged.number_of_cells(), 2);
    assert_eq!(merged.cell(1), Some((CellType::Tetra, &[4, 5, 6, 7][..])));
    assert!(
        merged.point_data().array("weight").is_none(),
        "An array missing from one input should be dropped"
    );
}

#[test]
fn test_append_keeps_shared_arrays() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let append = pipeline.add(AppendFilter::new());
    for offset in [1.0, 2.0] {
        let producer =
            pipeline.add_data(DataObject::new(DataKind::UnstructuredGrid(tetra(offset))));
        pipeline.connect(producer, 0, append, 0).unwrap();
    }

    // --- 2. ACT ---
    pipeline.update(append, 0).unwrap();

    // --- 3. ASSERT ---
    let output = pipeline.output(append, 0).unwrap();
    let weights = output
        .as_unstructured_grid()
        .and_then(|g| g.point_data().array("weight"))
        .and_then(DataArray::as_f64)
        .map(<[f64]>::to_vec)
        .unwrap();
    assert_eq!(weights, vec![1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0]);
}

#[test]
fn test_tetrahedra_only_contains_its_failure() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let mut triangles = UnstructuredGrid::from_points(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    triangles
        .insert_next_cell(CellType::Triangle, &[0, 1, 2])
        .unwrap();
    let filter = pipeline.add(TetrahedraOnly::new());
    pipeline
        .set_input_data(filter, 0, DataObject::new(DataKind::UnstructuredGrid(triangles)))
        .unwrap();
    let image = pipeline.add(ImageSource::new(Extent::new(0, 3, 0, 0, 0, 0)));
    let scale = pipeline.add(ScaleFilter::new(2.0));
    pipeline.connect(image, 0, scale, 0).unwrap();

    // --- 2. ACT ---
    let failed = pipeline.update(filter, 0);
    let healthy = pipeline.update(scale, 0);

    // --- 3. ASSERT ---
    match failed {
        Err(PipelineError::AlgorithmInternal {
            source: AlgorithmError::BadInput { port: 0, message },
            ..
        }) => assert!(message.contains("triangle"), "unexpected message: {message}"),
        other => panic!("expected a bad input failure, got {other:?}"),
    }
    assert!(
        pipeline.output(filter, 0).map_or(true, |d| d
            .as_unstructured_grid()
            .is_some_and(|g| g.number_of_cells() == 0)),
        "A failed run should not publish a result"
    );
    assert!(healthy.is_ok(), "An unrelated branch should still update");
    assert_eq!(scalars(&pipeline.output(scale, 0).unwrap()), vec![0.0, 2.0, 4.0, 6.0]);
}

#[test]
fn test_tetrahedra_only_recovers_with_valid_input() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let filter = pipeline.add(TetrahedraOnly::new());
    let mut mixed = tetra(0.0);
    mixed.insert_next_cell(CellType::Line, &[0, 1]).unwrap();
    pipeline
        .set_input_data(filter, 0, DataObject::new(DataKind::UnstructuredGrid(mixed)))
        .unwrap();
    assert!(pipeline.update(filter, 0).is_err());

    // --- 2. ACT ---
    pipeline
        .set_input_data(filter, 0, DataObject::new(DataKind::UnstructuredGrid(tetra(0.0))))
        .unwrap();
    pipeline.update(filter, 0).unwrap();

    // --- 3. ASSERT ---
    let output = pipeline.output(filter, 0).unwrap();
    let volume = output
        .as_unstructured_grid()
        .and_then(|g| g.cell_data().array(VOLUME))
        .and_then(|a| a.value(0))
        .unwrap();
    assert_relative_eq!(volume, 1.0 / 6.0);
}

#[test]
fn test_block_selector_only_generates_selected_blocks() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(AmrSource::new(8, 3));
    let selector = pipeline.add(AmrBlockSelector::new([(1, 1), (2, 0)]));
    pipeline.connect(source, 0, selector, 0).unwrap();

    // --- 2. ACT ---
    pipeline.update(selector, 0).unwrap();

    // --- 3. ASSERT ---
    let generated = pipeline
        .algorithm::<AmrSource>(source)
        .unwrap()
        .generated_blocks()
        .to_vec();
    assert_eq!(generated, vec![(1, 1), (2, 0)]);

    let output = pipeline.output(selector, 0).unwrap();
    let composite = output.as_composite().unwrap();
    assert_eq!(composite.slots().len(), 2);
    assert_eq!(composite.child_name(0), Some("level1_block1"));
    assert_eq!(composite.child_name(1), Some("level2_block0"));
    let leaves = output
        .composite_iter(IterOptions::default())
        .filter(|item| item.data.is_some())
        .count();
    assert_eq!(leaves, 2);
}

#[test]
fn test_block_selector_warns_about_missing_blocks() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(AmrSource::new(4, 2));
    let selector = pipeline.add(AmrBlockSelector::new([(0, 0), (5, 0)]));
    pipeline.connect(source, 0, selector, 0).unwrap();

    // --- 2. ACT ---
    pipeline.update(selector, 0).unwrap();

    // --- 3. ASSERT ---
    let output = pipeline.output(selector, 0).unwrap();
    let composite = output.as_composite().unwrap();
    assert!(composite.slots()[0].data().is_some());
    assert!(composite.slots()[1].data().is_none());
}

#[test]
fn test_scale_runs_per_block_over_amr() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(AmrSource::new(4, 2));
    let scale = pipeline.add(ScaleFilter::new(2.0));
    pipeline.connect(source, 0, scale, 0).unwrap();

    // --- 2. ACT ---
    pipeline.update(scale, 0).unwrap();

    // --- 3. ASSERT ---
    let output = pipeline.output(scale, 0).unwrap();
    let amr = output.as_amr().expect("image blocks should keep the AMR container");
    let fine = amr.block(1, 0).unwrap();
    assert_eq!(scalars(fine).last(), Some(&6.0));
    assert_eq!(pipeline.algorithm::<ScaleFilter>(scale).unwrap().executions(), 3);
}
