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

use common::{values, Crop, Ramp, Scale};
use tributary_core::information::keys::{DATA_EXTENT, DATA_TIME_STEP};
use tributary_core::Extent;
use tributary_pipeline::{Pipeline, StreamingDriver, UpdateRequest};

#[test]
fn test_request_narrows_source_extent() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 99, 0, 0, 0, 0)));
    let crop = pipeline.add(Crop::new(Extent::new(10, 20, 0, 0, 0, 0)));
    pipeline.connect(source, 0, crop, 0).unwrap();

    // --- 2. ACT ---
    pipeline.update(crop, 0).unwrap();

    // --- 3. ASSERT ---
    let ramp = pipeline.algorithm::<Ramp>(source).unwrap();
    assert_eq!(ramp.requested, vec![Extent::new(10, 20, 0, 0, 0, 0)]);
    let output = pipeline.output(crop, 0).unwrap();
    assert_eq!(output.as_image_grid().unwrap().extent(), Extent::new(10, 20, 0, 0, 0, 0));
    assert_eq!(values(&output).first(), Some(&10.0));
    assert_eq!(
        output.information().get(&DATA_EXTENT),
        Some(&Extent::new(10, 20, 0, 0, 0, 0))
    );
}

#[test]
fn test_pieces_are_translated_to_extents() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 20, 0, 0, 0, 0)));
    let scale = pipeline.add(Scale::new(1.0));
    pipeline.connect(source, 0, scale, 0).unwrap();

    // --- 2. ACT ---
    let pieces = StreamingDriver::new(2)
        .collect(&mut pipeline, scale, 0)
        .unwrap();

    // --- 3. ASSERT ---
    let extents: Vec<Extent> = pieces
        .iter()
        .map(|p| p.as_image_grid().unwrap().extent())
        .collect();
    assert_eq!(
        extents,
        vec![Extent::new(0, 10, 0, 0, 0, 0), Extent::new(10, 20, 0, 0, 0, 0)]
    );
    assert_eq!(pipeline.algorithm::<Ramp>(source).unwrap().executions, 2);
}

#[test]
fn test_ghost_levels_grow_pieces_within_whole_extent() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 20, 0, 0, 0, 0)));

    // --- 2. ACT ---
    pipeline.update_piece(source, 0, 0, 2, 1).unwrap();

    // --- 3. ASSERT ---
    let output = pipeline.output(source, 0).unwrap();
    assert_eq!(output.as_image_grid().unwrap().extent(), Extent::new(0, 11, 0, 0, 0, 0));
}

#[test]
fn test_same_piece_twice_is_cached_but_new_piece_is_not() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 20, 0, 0, 0, 0)));

    // --- 2. ACT ---
    pipeline.update_piece(source, 0, 1, 4, 0).unwrap();
    pipeline.update_piece(source, 0, 1, 4, 0).unwrap();
    pipeline.update_piece(source, 0, 2, 4, 0).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(pipeline.algorithm::<Ramp>(source).unwrap().executions, 2);
}

#[test]
fn test_time_requests_snap_to_advertised_steps() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source =
        pipeline.add(Ramp::new(Extent::new(0, 3, 0, 0, 0, 0)).with_time_steps(vec![0.0, 1.0, 2.0]));
    let scale = pipeline.add(Scale::new(1.0));
    pipeline.connect(source, 0, scale, 0).unwrap();

    // --- 2. ACT ---
    pipeline.update_time(scale, 0, 1.4).unwrap();
    let at_one = pipeline.output(scale, 0).unwrap();
    pipeline.update_time(scale, 0, 1.9).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(values(&at_one)[0], 1.0);
    assert_eq!(at_one.information().get(&DATA_TIME_STEP), Some(&1.0));
    assert_eq!(
        pipeline.algorithm::<Ramp>(source).unwrap().executions,
        1,
        "1.9 snaps to the same step as 1.4"
    );
}

#[test]
fn test_explicit_extent_request() {
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 50, 0, 0, 0, 0)));
    pipeline
        .update_with(
            source,
            0,
            UpdateRequest::for_extent(Extent::new(5, 7, 0, 0, 0, 0)).exact(),
        )
        .unwrap();
    assert_eq!(values(&pipeline.output(source, 0).unwrap()), vec![5.0, 6.0, 7.0]);
}

#[test]
fn test_exact_extent_crops_oversized_output() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 50, 0, 0, 0, 0)).whole_only());

    // --- 2. ACT ---
    pipeline
        .update_with(
            source,
            0,
            UpdateRequest::for_extent(Extent::new(5, 7, 0, 0, 0, 0)).exact(),
        )
        .unwrap();

    // --- 3. ASSERT ---
    let output = pipeline.output(source, 0).unwrap();
    assert_eq!(values(&output), vec![5.0, 6.0, 7.0]);
    assert_eq!(
        output.information().get(&DATA_EXTENT),
        Some(&Extent::new(5, 7, 0, 0, 0, 0))
    );
    assert_eq!(
        pipeline.algorithm::<Ramp>(source).unwrap().requested,
        vec![Extent::new(0, 50, 0, 0, 0, 0)]
    );
}

#[test]
fn test_inexact_request_keeps_oversized_output() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 50, 0, 0, 0, 0)).whole_only());

    // --- 2. ACT ---
    pipeline
        .update_with(source, 0, UpdateRequest::for_extent(Extent::new(5, 7, 0, 0, 0, 0)))
        .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(values(&pipeline.output(source, 0).unwrap()).len(), 51);
}
