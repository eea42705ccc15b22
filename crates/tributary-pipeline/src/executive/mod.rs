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

//! # Executive
//!
//! The demand-driven executive that walks a [`Pipeline`](crate::Pipeline)
//! through the request passes.
//!
//! For `update(node, port)` the passes run in this order:
//!
//! 1. **DataObject**, over the upstream subgraph in topological order.
//! 2. **Information**, same order, skipped per node while its pipeline
//!    modification time is not newer than its last information time.
//! 3. **UpdateTime / UpdateExtent**, top-down: each node narrows the request
//!    it received into requests for its inputs.
//! 4. **Data**, bottom-up: producers are brought up to date first, then the
//!    node runs only if its output is stale.
//!
//! Passes 3 and 4 are interleaved per connection so that a producer shared
//! by two consumers serves each consumer's own request.

mod composite;
mod passes;
mod signature;

pub use self::signature::UpdateRequest;
pub(crate) use self::signature::ExecutionSignature;

/// Which executive drives a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutiveKind {
    /// Extents, pieces and time; composite inputs must be accepted by the
    /// algorithm itself.
    Streaming,
    /// Streaming plus composite support: structure meta-data, block
    /// selection, per-block execution of non-composite algorithms and
    /// structure validation.
    #[default]
    Composite,
}
