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

use tributary_core::telemetry::{Outcome, PassKind};
use tributary_core::Extent;
use tributary_filters::{ImageSource, ScaleFilter};
use tributary_pipeline::{Pipeline, PipelineContext};
use tributary_telemetry::TelemetryService;

#[test]
fn test_service_counts_cached_updates_as_skipped() {
    // --- 1. ARRANGE ---
    let mut telemetry = TelemetryService::new();
    let mut pipeline =
        Pipeline::with_context(PipelineContext::new().with_event_sender(telemetry.sender()));
    let source = pipeline.add(ImageSource::new(Extent::new(0, 9, 0, 0, 0, 0)));
    let scale = pipeline.add(ScaleFilter::new(3.0));
    pipeline.connect(source, 0, scale, 0).unwrap();

    // --- 2. ACT ---
    pipeline.update(scale, 0).unwrap();
    pipeline.update(scale, 0).unwrap();
    let taken = telemetry.tick();

    // --- 3. ASSERT ---
    let metrics = telemetry.metrics();
    assert!(taken > 0, "The executive should have published events");
    assert_eq!(metrics.executions("ImageSource"), 1);
    assert_eq!(metrics.executions("ScaleFilter"), 1);
    assert_eq!(
        metrics.count("ScaleFilter", PassKind::Data, &Outcome::Skipped),
        1,
        "The second update should be served from the cache"
    );
    let json = metrics.to_json().unwrap();
    assert!(json.contains("ScaleFilter"));
}

#[test]
fn test_service_records_failures() {
    // --- 1. ARRANGE ---
    let mut telemetry = TelemetryService::new();
    let mut pipeline =
        Pipeline::with_context(PipelineContext::new().with_event_sender(telemetry.sender()));
    let scale = pipeline.add(ScaleFilter::new(2.0).with_array("missing"));
    let source = pipeline.add(ImageSource::new(Extent::new(0, 3, 0, 0, 0, 0)));
    pipeline.connect(source, 0, scale, 0).unwrap();

    // --- 2. ACT ---
    assert!(pipeline.update(scale, 0).is_err());
    telemetry.tick();

    // --- 3. ASSERT ---
    let snapshot = telemetry.metrics().snapshot();
    assert!(snapshot
        .entries
        .iter()
        .any(|e| e.algorithm == "ScaleFilter" && e.outcome == "failed"));
    assert!(snapshot.last_failure.is_some());
}
