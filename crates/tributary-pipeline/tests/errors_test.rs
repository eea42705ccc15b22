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

use common::{values, Gather, Ramp, Scale};
use tributary_core::Extent;
use tributary_data::DataHandle;
use tributary_pipeline::{AlgorithmError, Pipeline, PipelineError};

fn ramp() -> Ramp {
    Ramp::new(Extent::new(0, 4, 0, 0, 0, 0))
}

#[test]
fn test_failure_is_contained_to_its_branch() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(ramp());
    let failing = pipeline.add(Scale::new(2.0));
    let healthy = pipeline.add(Scale::new(3.0));
    pipeline.connect(source, 0, failing, 0).unwrap();
    pipeline.connect(source, 0, healthy, 0).unwrap();
    pipeline.update(failing, 0).unwrap();
    let before = pipeline.output(failing, 0).unwrap();
    pipeline.algorithm_mut::<Scale>(failing).unwrap().set_fail(true);

    // --- 2. ACT ---
    let result = pipeline.update(failing, 0);
    let healthy_result = pipeline.update(healthy, 0);

    // --- 3. ASSERT ---
    assert_eq!(
        result,
        Err(PipelineError::AlgorithmInternal {
            node: failing,
            algorithm: "Scale".to_string(),
            source: AlgorithmError::failed("scale failed on purpose"),
        })
    );
    let after = pipeline.output(failing, 0).unwrap();
    assert!(DataHandle::ptr_eq(&before, &after), "previous output is kept");
    assert_eq!(values(&after), vec![0.0, 2.0, 4.0, 6.0, 8.0]);

    assert!(healthy_result.is_ok());
    assert_eq!(
        values(&pipeline.output(healthy, 0).unwrap()),
        vec![0.0, 3.0, 6.0, 9.0, 12.0]
    );
    assert_eq!(pipeline.algorithm::<Ramp>(source).unwrap().executions, 1);
}

#[test]
fn test_failed_node_is_retried_on_next_update() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(ramp());
    let scale = pipeline.add(Scale::new(2.0));
    pipeline.connect(source, 0, scale, 0).unwrap();
    pipeline.algorithm_mut::<Scale>(scale).unwrap().set_fail(true);
    assert!(pipeline.update(scale, 0).is_err());

    // --- 2. ACT ---
    let again = pipeline.update(scale, 0);
    pipeline.algorithm_mut::<Scale>(scale).unwrap().set_fail(false);
    let recovered = pipeline.update(scale, 0);

    // --- 3. ASSERT ---
    assert!(again.is_err(), "a failure is never cached as success");
    assert!(recovered.is_ok());
    assert_eq!(pipeline.algorithm::<Scale>(scale).unwrap().executions, 1);
}

#[test]
fn test_upstream_failure_is_wrapped() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(ramp());
    let failing = pipeline.add(Scale::new(2.0));
    let downstream = pipeline.add(Scale::new(1.0));
    pipeline.connect(source, 0, failing, 0).unwrap();
    pipeline.connect(failing, 0, downstream, 0).unwrap();
    pipeline.algorithm_mut::<Scale>(failing).unwrap().set_fail(true);

    // --- 2. ACT ---
    let error = pipeline.update(downstream, 0).unwrap_err();

    // --- 3. ASSERT ---
    assert!(matches!(
        error,
        PipelineError::UpstreamFailed { node, .. } if node == downstream
    ));
    assert!(matches!(
        error.root_cause(),
        PipelineError::AlgorithmInternal { node, .. } if *node == failing
    ));
    assert_eq!(pipeline.algorithm::<Scale>(downstream).unwrap().executions, 0);
}

#[test]
fn test_missing_required_input() {
    let mut pipeline = Pipeline::new();
    let scale = pipeline.add(Scale::new(1.0));
    assert_eq!(
        pipeline.update(scale, 0),
        Err(PipelineError::MissingRequiredInput {
            node: scale,
            port: 0
        })
    );
}

#[test]
fn test_connection_type_is_checked_when_connecting() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(ramp());
    let gather = pipeline.add(Gather::new());
    let scale = pipeline.add(Scale::new(1.0));
    pipeline.connect(source, 0, gather, 0).unwrap();

    // --- 2. ACT ---
    let result = pipeline.connect(gather, 0, scale, 0);

    // --- 3. ASSERT ---
    match result {
        Err(PipelineError::ConnectionType {
            consumer,
            port,
            found,
            ..
        }) => {
            assert_eq!(consumer, scale);
            assert_eq!(port, 0);
            assert_eq!(found, "Table");
        }
        other => panic!("expected a connection type error, got {other:?}"),
    }
    assert!(pipeline.input_connections(scale, 0).unwrap().is_empty());
}

#[test]
fn test_cycles_are_rejected() {
    let mut pipeline = Pipeline::new();
    let a = pipeline.add(Scale::new(1.0));
    let b = pipeline.add(Scale::new(1.0));
    pipeline.connect(a, 0, b, 0).unwrap();
    assert_eq!(
        pipeline.connect(b, 0, a, 0),
        Err(PipelineError::Cycle {
            producer: b,
            consumer: a
        })
    );
}

#[test]
fn test_single_connection_ports_reject_a_second_producer() {
    let mut pipeline = Pipeline::new();
    let first = pipeline.add(ramp());
    let second = pipeline.add(ramp());
    let scale = pipeline.add(Scale::new(1.0));
    pipeline.connect(first, 0, scale, 0).unwrap();
    assert_eq!(
        pipeline.connect(second, 0, scale, 0),
        Err(PipelineError::PortNotRepeatable {
            node: scale,
            port: 0
        })
    );
}

#[test]
fn test_invalid_ports() {
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(ramp());
    let scale = pipeline.add(Scale::new(1.0));
    assert!(matches!(
        pipeline.connect(source, 1, scale, 0),
        Err(PipelineError::InvalidPort { direction: "output", port: 1, .. })
    ));
    assert!(matches!(
        pipeline.update(scale, 3),
        Err(PipelineError::InvalidPort { .. })
    ));
}
