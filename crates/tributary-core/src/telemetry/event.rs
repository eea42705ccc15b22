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


//! Event types describing pipeline execution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The pass of the request protocol an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassKind {
    /// Output data object creation.
    DataObject,
    /// Meta-data propagation.
    Information,
    /// Time-dependent staleness refinement.
    UpdateTime,
    /// Request propagation toward sources.
    UpdateExtent,
    /// Data generation.
    Data,
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassKind::DataObject => write!(f, "DataObject"),
            PassKind::Information => write!(f, "Information"),
            PassKind::UpdateTime => write!(f, "UpdateTime"),
            PassKind::UpdateExtent => write!(f, "UpdateExtent"),
            PassKind::Data => write!(f, "Data"),
        }
    }
}

/// How a pass ended for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The algorithm ran and succeeded.
    Executed,
    /// The cached output was still valid; the algorithm did not run.
    Skipped,
    /// The algorithm was aborted on request.
    Aborted,
    /// The algorithm failed with the given message.
    Failed(String),
}

/// A single record of a node going through a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    /// Arena index of the node.
    pub node: u32,
    /// Algorithm name of the node.
    pub algorithm: String,
    /// The pass.
    pub pass: PassKind,
    /// How it ended.
    pub outcome: Outcome,
    /// Wall-clock time spent in the algorithm.
    pub duration: Duration,
}
