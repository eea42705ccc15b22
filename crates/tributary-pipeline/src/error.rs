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

//! Errors raised by algorithms and by the executive.

use crate::pipeline::NodeId;
use thiserror::Error;
use tributary_data::{DataError, RefinementError};

/// A failure reported by an algorithm from one of its request hooks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgorithmError {
    /// An input the algorithm needs is absent or of an unexpected type.
    #[error("input {port}: {message}")]
    BadInput {
        /// Input port index.
        port: usize,
        /// What was wrong.
        message: String,
    },
    /// The algorithm noticed the abort flag and stopped.
    #[error("execution aborted")]
    Aborted,
    /// A data-model operation failed.
    #[error(transparent)]
    Data(#[from] DataError),
    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

impl AlgorithmError {
    /// Convenience constructor for [`AlgorithmError::BadInput`].
    pub fn bad_input(port: usize, message: impl Into<String>) -> Self {
        AlgorithmError::BadInput {
            port,
            message: message.into(),
        }
    }

    /// Convenience constructor for [`AlgorithmError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        AlgorithmError::Failed(message.into())
    }
}

/// Errors returned by [`Pipeline`](crate::Pipeline) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// A producer's output type is not accepted by the consumer's input port.
    #[error("{consumer} input {port} requires {expected}, got {found}")]
    ConnectionType {
        /// Consumer node.
        consumer: NodeId,
        /// Consumer input port.
        port: usize,
        /// Rendered constraint of the port.
        expected: String,
        /// Rendered type offered by the producer.
        found: String,
    },
    /// A non-optional input port has no connection.
    #[error("{node} input {port} is required but not connected")]
    MissingRequiredInput {
        /// The node.
        node: NodeId,
        /// The unconnected port.
        port: usize,
    },
    /// A composite output does not have the structure announced during the
    /// information pass.
    #[error("{node} output {port} does not match its announced composite structure")]
    CompositeStructureMismatch {
        /// The node.
        node: NodeId,
        /// The output port.
        port: usize,
    },
    /// An AMR hierarchy failed refinement checks.
    #[error("inconsistent refinement: {0}")]
    InconsistentRefinement(#[from] RefinementError),
    /// An algorithm hook failed.
    #[error("{node} ({algorithm}) failed: {source}")]
    AlgorithmInternal {
        /// The node.
        node: NodeId,
        /// Algorithm name.
        algorithm: String,
        /// What the algorithm reported.
        source: AlgorithmError,
    },
    /// The run was aborted through the abort flag.
    #[error("execution aborted")]
    Aborted,
    /// A producer further upstream failed.
    #[error("{node} could not update its inputs: {source}")]
    UpstreamFailed {
        /// The node whose input failed.
        node: NodeId,
        /// The upstream failure.
        source: Box<PipelineError>,
    },
    /// The node id does not belong to this pipeline.
    #[error("{0} does not exist")]
    InvalidNode(NodeId),
    /// The port index is out of range for the node.
    #[error("{node} has no {direction} port {port}")]
    InvalidPort {
        /// The node.
        node: NodeId,
        /// `"input"` or `"output"`.
        direction: &'static str,
        /// The requested port.
        port: usize,
    },
    /// The connection would close a cycle.
    #[error("connecting {producer} to {consumer} would create a cycle")]
    Cycle {
        /// Producer of the rejected connection.
        producer: NodeId,
        /// Consumer of the rejected connection.
        consumer: NodeId,
    },
    /// A second connection on a non-repeatable input port.
    #[error("{node} input {port} accepts a single connection")]
    PortNotRepeatable {
        /// The node.
        node: NodeId,
        /// The port.
        port: usize,
    },
}

impl PipelineError {
    /// The innermost error of an [`UpstreamFailed`](PipelineError::UpstreamFailed) chain.
    pub fn root_cause(&self) -> &PipelineError {
        match self {
            PipelineError::UpstreamFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_unwraps_upstream_chain() {
        let inner = PipelineError::MissingRequiredInput {
            node: NodeId::from_index(0),
            port: 0,
        };
        let outer = PipelineError::UpstreamFailed {
            node: NodeId::from_index(2),
            source: Box::new(PipelineError::UpstreamFailed {
                node: NodeId::from_index(1),
                source: Box::new(inner.clone()),
            }),
        };
        assert_eq!(outer.root_cause(), &inner);
    }

    #[test]
    fn refinement_errors_convert() {
        let err: PipelineError = RefinementError::MissingRatio(1).into();
        assert!(matches!(
            err,
            PipelineError::InconsistentRefinement(RefinementError::MissingRatio(1))
        ));
        assert_eq!(err.to_string(), "inconsistent refinement: level 1 has no refinement ratio");
    }
}
