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


//! Service owning the event channel of one or more pipelines.

use crate::metrics::ExecutionMetrics;
use tributary_core::event::EventBus;
use tributary_core::telemetry::ExecutionEvent;

/// Collects execution events and folds them into [`ExecutionMetrics`].
///
/// Hand [`TelemetryService::sender`] to a pipeline context, then call
/// [`TelemetryService::tick`] whenever the counters should catch up.
#[derive(Debug, Default)]
pub struct TelemetryService {
    bus: EventBus<ExecutionEvent>,
    metrics: ExecutionMetrics,
}

impl TelemetryService {
    /// Creates a service with an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sending end for a pipeline context.
    pub fn sender(&self) -> flume::Sender<ExecutionEvent> {
        self.bus.sender()
    }

    /// Folds every queued event into the counters. Returns how many were
    /// taken.
    pub fn tick(&mut self) -> usize {
        let taken = self.metrics.ingest(self.bus.receiver());
        if taken > 0 {
            log::trace!("Telemetry ingested {taken} execution events");
        }
        taken
    }

    /// The counters.
    pub fn metrics(&self) -> &ExecutionMetrics {
        &self.metrics
    }

    /// The counters, mutably.
    pub fn metrics_mut(&mut self) -> &mut ExecutionMetrics {
        &mut self.metrics
    }
}
