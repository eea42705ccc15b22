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


//! Counters aggregated from [`ExecutionEvent`]s.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tributary_core::telemetry::{ExecutionEvent, Outcome, PassKind};

/// Coarse outcome used as a counter label.
fn outcome_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Executed => "executed",
        Outcome::Skipped => "skipped",
        Outcome::Aborted => "aborted",
        Outcome::Failed(_) => "failed",
    }
}

fn pass_order(pass: PassKind) -> u8 {
    match pass {
        PassKind::DataObject => 0,
        PassKind::Information => 1,
        PassKind::UpdateTime => 2,
        PassKind::UpdateExtent => 3,
        PassKind::Data => 4,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct MetricKey {
    algorithm: String,
    pass: u8,
    outcome: &'static str,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counter {
    count: u64,
    total: Duration,
}

/// One counter of a [`MetricsSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    /// Algorithm name.
    pub algorithm: String,
    /// Pass the events belong to.
    pub pass: PassKind,
    /// `executed`, `skipped`, `aborted` or `failed`.
    pub outcome: String,
    /// Number of events.
    pub count: u64,
    /// Summed algorithm time, in microseconds.
    pub total_micros: u64,
}

/// A serializable copy of every counter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total number of events recorded.
    pub events: u64,
    /// Last failure message seen, if any.
    pub last_failure: Option<String>,
    /// Counters ordered by algorithm, pass and outcome.
    pub entries: Vec<MetricEntry>,
}

/// Per (algorithm, pass, outcome) event counters.
#[derive(Debug, Default)]
pub struct ExecutionMetrics {
    counters: BTreeMap<MetricKey, (PassKind, Counter)>,
    events: u64,
    last_failure: Option<String>,
}

impl ExecutionMetrics {
    /// Creates empty counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one event.
    pub fn record(&mut self, event: &ExecutionEvent) {
        let key = MetricKey {
            algorithm: event.algorithm.clone(),
            pass: pass_order(event.pass),
            outcome: outcome_label(&event.outcome),
        };
        let (_, counter) = self
            .counters
            .entry(key)
            .or_insert((event.pass, Counter::default()));
        counter.count += 1;
        counter.total += event.duration;
        self.events += 1;
        if let Outcome::Failed(message) = &event.outcome {
            log::debug!("{} failed during {}: {message}", event.algorithm, event.pass);
            self.last_failure = Some(message.clone());
        }
    }

    /// Records every event queued on `receiver` without blocking and returns
    /// how many were taken.
    pub fn ingest(&mut self, receiver: &flume::Receiver<ExecutionEvent>) -> usize {
        let mut taken = 0;
        while let Ok(event) = receiver.try_recv() {
            self.record(&event);
            taken += 1;
        }
        taken
    }

    /// Number of events recorded for `algorithm` in `pass` with `outcome`.
    #[must_use]
    pub fn count(&self, algorithm: &str, pass: PassKind, outcome: &Outcome) -> u64 {
        let key = MetricKey {
            algorithm: algorithm.to_string(),
            pass: pass_order(pass),
            outcome: outcome_label(outcome),
        };
        self.counters.get(&key).map_or(0, |(_, c)| c.count)
    }

    /// Number of data passes in which `algorithm` actually ran.
    #[must_use]
    pub fn executions(&self, algorithm: &str) -> u64 {
        self.count(algorithm, PassKind::Data, &Outcome::Executed)
    }

    /// Total number of events recorded.
    #[must_use]
    pub fn total_events(&self) -> u64 {
        self.events
    }

    /// Forgets every counter.
    pub fn clear(&mut self) {
        self.counters.clear();
        self.events = 0;
        self.last_failure = None;
    }

    /// Copies the counters into a serializable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events: self.events,
            last_failure: self.last_failure.clone(),
            entries: self
                .counters
                .iter()
                .map(|(key, (pass, counter))| MetricEntry {
                    algorithm: key.algorithm.clone(),
                    pass: *pass,
                    outcome: key.outcome.to_string(),
                    count: counter.count,
                    total_micros: u64::try_from(counter.total.as_micros()).unwrap_or(u64::MAX),
                })
                .collect(),
        }
    }

    /// The snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}
