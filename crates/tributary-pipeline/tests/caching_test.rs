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

mod common;

use common::{values, Crop, Gather, Ramp, Scale};
use tributary_core::Extent;
use tributary_data::{DataHandle, DataObjectType};
use tributary_pipeline::{Pipeline, PipelineError};

fn ramp_and_scale() -> (Pipeline, tributary_pipeline::NodeId, tributary_pipeline::NodeId) {
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 9, 0, 0, 0, 0)));
    let scale = pipeline.add(Scale::new(2.0));
    pipeline.connect(source, 0, scale, 0).unwrap();
    (pipeline, source, scale)
}

#[test]
fn test_second_update_is_a_no_op() {
    // --- 1. ARRANGE ---
    let (mut pipeline, source, scale) = ramp_and_scale();
    pipeline.update(scale, 0).unwrap();
    let first = pipeline.output(scale, 0).unwrap();

    // --- 2. ACT ---
    pipeline.update(scale, 0).unwrap();

    // --- 3. ASSERT ---
    let second = pipeline.output(scale, 0).unwrap();
    assert!(DataHandle::ptr_eq(&first, &second), "Cached output must be reused");
    assert_eq!(second.modified_time(), first.modified_time());
    assert_eq!(pipeline.algorithm::<Ramp>(source).unwrap().executions, 1);
    assert_eq!(pipeline.algorithm::<Scale>(scale).unwrap().executions, 1);
    assert_eq!(values(&second)[..3], [0.0, 2.0, 4.0]);
}

#[test]
fn test_downstream_parameter_change_does_not_rerun_upstream() {
    // --- 1. ARRANGE ---
    let (mut pipeline, source, scale) = ramp_and_scale();
    pipeline.update(scale, 0).unwrap();
    let upstream_output = pipeline.output(source, 0).unwrap();

    // --- 2. ACT ---
    pipeline.algorithm_mut::<Scale>(scale).unwrap().set_factor(3.0);
    pipeline.update(scale, 0).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(pipeline.algorithm::<Ramp>(source).unwrap().executions, 1);
    assert_eq!(pipeline.algorithm::<Scale>(scale).unwrap().executions, 2);
    assert!(DataHandle::ptr_eq(
        &upstream_output,
        &pipeline.output(source, 0).unwrap()
    ));
    assert_eq!(values(&pipeline.output(scale, 0).unwrap())[1], 3.0);
}

#[test]
fn test_upstream_parameter_change_reruns_downstream() {
    // --- 1. ARRANGE ---
    let (mut pipeline, source, scale) = ramp_and_scale();
    pipeline.update(scale, 0).unwrap();

    // --- 2. ACT ---
    pipeline.algorithm_mut::<Ramp>(source).unwrap().set_offset(10.0);
    pipeline.update(scale, 0).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(pipeline.algorithm::<Ramp>(source).unwrap().executions, 2);
    assert_eq!(pipeline.algorithm::<Scale>(scale).unwrap().executions, 2);
    assert_eq!(values(&pipeline.output(scale, 0).unwrap())[0], 20.0);
}

#[test]
fn test_fan_out_branches_are_independent() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 4, 0, 0, 0, 0)));
    let double = pipeline.add(Scale::new(2.0));
    let negate = pipeline.add(Scale::new(-1.0));
    pipeline.connect(source, 0, double, 0).unwrap();
    pipeline.connect(source, 0, negate, 0).unwrap();

    // --- 2. ACT ---
    pipeline.update(double, 0).unwrap();
    pipeline.update(negate, 0).unwrap();
    pipeline.algorithm_mut::<Scale>(double).unwrap().set_factor(4.0);
    pipeline.update(double, 0).unwrap();
    pipeline.update(negate, 0).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(pipeline.algorithm::<Ramp>(source).unwrap().executions, 1);
    assert_eq!(pipeline.algorithm::<Scale>(double).unwrap().executions, 2);
    assert_eq!(pipeline.algorithm::<Scale>(negate).unwrap().executions, 1);
    assert_eq!(values(&pipeline.output(double, 0).unwrap())[1], 4.0);
    assert_eq!(values(&pipeline.output(negate, 0).unwrap())[1], -1.0);
    let input = pipeline.output(source, 0).unwrap();
    assert_eq!(values(&input)[1], 1.0, "Consumers must not write their input");
}

#[test]
fn test_diamond_with_different_requests_settles() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 99, 0, 0, 0, 0)));
    let head = pipeline.add(Crop::new(Extent::new(0, 10, 0, 0, 0, 0)));
    let tail = pipeline.add(Crop::new(Extent::new(50, 60, 0, 0, 0, 0)));
    let gather = pipeline.add(Gather::new());
    pipeline.connect(source, 0, head, 0).unwrap();
    pipeline.connect(source, 0, tail, 0).unwrap();
    pipeline.connect(head, 0, gather, 0).unwrap();
    pipeline.connect(tail, 0, gather, 0).unwrap();
    pipeline.update(gather, 0).unwrap();
    let first = pipeline.output(gather, 0).unwrap();
    assert_eq!(pipeline.algorithm::<Ramp>(source).unwrap().executions, 2);

    // --- 2. ACT ---
    pipeline.update(gather, 0).unwrap();
    pipeline.update(gather, 0).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(
        pipeline.algorithm::<Ramp>(source).unwrap().executions,
        2,
        "Unchanged diamond must not re-execute the shared source"
    );
    assert!(DataHandle::ptr_eq(&first, &pipeline.output(gather, 0).unwrap()));
    let table = first.as_table().unwrap();
    assert_eq!(table.value(0, "points"), Some(11.0));
    assert_eq!(table.value(1, "points"), Some(11.0));
}

#[test]
fn test_diamond_reruns_after_source_change() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 99, 0, 0, 0, 0)));
    let head = pipeline.add(Crop::new(Extent::new(0, 10, 0, 0, 0, 0)));
    let tail = pipeline.add(Crop::new(Extent::new(50, 60, 0, 0, 0, 0)));
    let gather = pipeline.add(Gather::new());
    pipeline.connect(source, 0, head, 0).unwrap();
    pipeline.connect(source, 0, tail, 0).unwrap();
    pipeline.connect(head, 0, gather, 0).unwrap();
    pipeline.connect(tail, 0, gather, 0).unwrap();
    pipeline.update(gather, 0).unwrap();
    let first = pipeline.output(gather, 0).unwrap();

    // --- 2. ACT ---
    pipeline.algorithm_mut::<Ramp>(source).unwrap().set_offset(1.0);
    pipeline.update(gather, 0).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(pipeline.algorithm::<Ramp>(source).unwrap().executions, 4);
    assert!(!DataHandle::ptr_eq(&first, &pipeline.output(gather, 0).unwrap()));
}

#[test]
fn test_middle_change_reruns_only_downstream() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 9, 0, 0, 0, 0)));
    let middle = pipeline.add(Scale::new(2.0));
    let last = pipeline.add(Scale::new(3.0));
    pipeline.connect(source, 0, middle, 0).unwrap();
    pipeline.connect(middle, 0, last, 0).unwrap();
    pipeline.update(last, 0).unwrap();

    // --- 2. ACT ---
    pipeline.algorithm_mut::<Scale>(middle).unwrap().set_factor(4.0);
    pipeline.update(last, 0).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(pipeline.algorithm::<Ramp>(source).unwrap().executions, 1);
    assert_eq!(pipeline.algorithm::<Scale>(middle).unwrap().executions, 2);
    assert_eq!(pipeline.algorithm::<Scale>(last).unwrap().executions, 2);
    assert_eq!(values(&pipeline.output(last, 0).unwrap())[1], 12.0);
}

#[test]
fn test_fan_in_on_repeatable_port() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let small = pipeline.add(Ramp::new(Extent::new(0, 2, 0, 0, 0, 0)));
    let large = pipeline.add(Ramp::new(Extent::new(0, 5, 0, 0, 0, 0)));
    let gather = pipeline.add(Gather::new());
    pipeline.connect(small, 0, gather, 0).unwrap();
    pipeline.connect(large, 0, gather, 0).unwrap();

    // --- 2. ACT ---
    pipeline.update(gather, 0).unwrap();

    // --- 3. ASSERT ---
    let output = pipeline.output(gather, 0).unwrap();
    assert_eq!(output.data_type(), DataObjectType::Table);
    let table = output.as_table().unwrap();
    assert_eq!(table.value(0, "points"), Some(3.0));
    assert_eq!(table.value(1, "points"), Some(6.0));
}

#[test]
fn test_set_input_data_replaces_source_and_invalidates() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let scale = pipeline.add(Scale::new(2.0));
    let image = |n: i32| {
        let mut grid = tributary_data::ImageGrid::new(Extent::new(0, n, 0, 0, 0, 0), [0.0; 3], [1.0; 3]);
        grid.point_data_mut().add_array(tributary_data::DataArray::from_f64(
            "value",
            1,
            vec![1.0; (n + 1) as usize],
        ));
        tributary_data::DataObject::new(tributary_data::DataKind::ImageGrid(grid))
    };
    let producer = pipeline.set_input_data(scale, 0, image(3)).unwrap();
    pipeline.update(scale, 0).unwrap();

    // --- 2. ACT ---
    let same_producer = pipeline.set_input_data(scale, 0, image(5)).unwrap();
    pipeline.update(scale, 0).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(producer, same_producer);
    assert_eq!(pipeline.len(), 2);
    assert_eq!(pipeline.algorithm::<Scale>(scale).unwrap().executions, 2);
    assert_eq!(values(&pipeline.output(scale, 0).unwrap()), vec![2.0; 6]);
}

#[test]
fn test_upstream_order_lists_producers_first() {
    let (pipeline, source, scale) = ramp_and_scale();
    assert_eq!(pipeline.upstream_order(scale).unwrap(), vec![source, scale]);
    assert_eq!(pipeline.upstream_order(source).unwrap(), vec![source]);

    let mut other = Pipeline::new();
    let foreign = (0..4).map(|_| other.add(Scale::new(1.0))).last().unwrap();
    assert!(matches!(
        pipeline.upstream_order(foreign),
        Err(PipelineError::InvalidNode(_))
    ));
}
