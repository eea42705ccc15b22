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

use common::{Ramp, Scale};
use std::sync::{Arc, Mutex};
use tributary_core::event::EventKind;
use tributary_core::telemetry::{ExecutionEvent, Outcome, PassKind};
use tributary_core::Extent;
use tributary_pipeline::{Pipeline, PipelineContext};

type Log = Arc<Mutex<Vec<(EventKind, Option<String>)>>>;

fn record(pipeline: &Pipeline, node: tributary_pipeline::NodeId) -> Log {
    let log: Log = Arc::default();
    let sink = Arc::clone(&log);
    pipeline
        .subject(node)
        .unwrap()
        .add_observer(EventKind::Any, move |ctx| {
            let detail = ctx
                .data::<String>()
                .cloned()
                .or_else(|| ctx.data::<f64>().map(|p| format!("{p:.1}")));
            sink.lock().unwrap().push((ctx.event(), detail));
        });
    log
}

#[test]
fn test_execution_fires_start_progress_end() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 3, 0, 0, 0, 0)));
    let log = record(&pipeline, source);

    // --- 2. ACT ---
    pipeline.update(source, 0).unwrap();
    pipeline.update(source, 0).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            (EventKind::Start, None),
            (EventKind::Progress, Some("1.0".to_string())),
            (EventKind::End, None),
        ],
        "a cached update fires nothing"
    );
}

#[test]
fn test_failure_fires_warning_then_error() {
    // --- 1. ARRANGE ---
    let mut pipeline = Pipeline::new();
    let source = pipeline.add(Ramp::new(Extent::new(0, 3, 0, 0, 0, 0)));
    let scale = pipeline.add(Scale::new(1.0));
    pipeline.connect(source, 0, scale, 0).unwrap();
    pipeline.algorithm_mut::<Scale>(scale).unwrap().set_fail(true);
    let log = record(&pipeline, scale);

    // --- 2. ACT ---
    let result = pipeline.update(scale, 0);

    // --- 3. ASSERT ---
    let error = result.unwrap_err().to_string();
    let events = log.lock().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], (EventKind::Start, None));
    assert_eq!(
        events[1],
        (EventKind::Warning, Some("about to fail".to_string()))
    );
    assert_eq!(events[2], (EventKind::Error, Some(error)));
}

#[test]
fn test_execution_events_reach_the_channel() {
    // --- 1. ARRANGE ---
    let (tx, rx) = flume::unbounded::<ExecutionEvent>();
    let mut pipeline = Pipeline::with_context(PipelineContext::new().with_event_sender(tx));
    let source = pipeline.add(Ramp::new(Extent::new(0, 3, 0, 0, 0, 0)));
    let scale = pipeline.add(Scale::new(2.0));
    pipeline.connect(source, 0, scale, 0).unwrap();

    // --- 2. ACT ---
    pipeline.update(scale, 0).unwrap();
    pipeline.update(scale, 0).unwrap();

    // --- 3. ASSERT ---
    let data: Vec<(String, Outcome)> = rx
        .drain()
        .filter(|e| e.pass == PassKind::Data)
        .map(|e| (e.algorithm, e.outcome))
        .collect();
    assert_eq!(
        data,
        vec![
            ("Ramp".to_string(), Outcome::Executed),
            ("Scale".to_string(), Outcome::Executed),
            ("Ramp".to_string(), Outcome::Skipped),
            ("Scale".to_string(), Outcome::Skipped),
        ]
    );
}

#[test]
fn test_information_pass_is_reported_once_until_something_changes() {
    // --- 1. ARRANGE ---
    let (tx, rx) = flume::unbounded::<ExecutionEvent>();
    let mut pipeline = Pipeline::with_context(PipelineContext::new().with_event_sender(tx));
    let source = pipeline.add(Ramp::new(Extent::new(0, 3, 0, 0, 0, 0)));

    // --- 2. ACT ---
    pipeline.update(source, 0).unwrap();
    pipeline.update(source, 0).unwrap();
    pipeline.algorithm_mut::<Ramp>(source).unwrap().set_offset(1.0);
    pipeline.update(source, 0).unwrap();

    // --- 3. ASSERT ---
    let information = rx
        .drain()
        .filter(|e| e.pass == PassKind::Information)
        .count();
    assert_eq!(information, 2);
}
