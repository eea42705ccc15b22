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

//! # Pipeline
//!
//! The arena owning every node of a pipeline graph.
//!
//! Nodes are addressed by [`NodeId`]. A node owns its algorithm, its
//! executive state and one [`Information`] map per output port; consumers
//! record their input connections, producers never refer to their
//! consumers. Fan-out is always allowed, fan-in only on repeatable ports.

use crate::algorithm::Algorithm;
use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::executive::{ExecutionSignature, ExecutiveKind, UpdateRequest};
use crate::port::OutputPortInfo;
use crate::request::AbortFlag;
use crate::trivial_producer::TrivialProducer;
use std::fmt;
use std::sync::Arc;
use tributary_core::event::Subject;
use tributary_core::graph::{reachable_from, topological_sort};
use tributary_core::{Extent, Information, ModifiedTime, TimeStamp};
use tributary_data::keys::DATA_OBJECT;
use tributary_data::{DataHandle, DataObject};

/// Identifies a node within its [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node #{}", self.0)
    }
}

/// One input connection: the producer and its output port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    /// Producing node.
    pub producer: NodeId,
    /// Output port of the producer.
    pub port: usize,
}

#[derive(Default)]
pub(crate) struct OutputState {
    pub information: Information,
    pub signature: Option<ExecutionSignature>,
}

pub(crate) struct Node {
    pub algorithm: Box<dyn Algorithm>,
    pub executive: ExecutiveKind,
    pub inputs: Vec<Vec<Connection>>,
    pub outputs: Vec<OutputState>,
    /// Request state of a node without outputs.
    pub sink: OutputState,
    pub connection_time: ModifiedTime,
    pub information_time: TimeStamp,
    pub subject: Arc<Subject>,
}

impl Node {
    fn new(algorithm: Box<dyn Algorithm>, executive: ExecutiveKind) -> Self {
        let inputs = vec![Vec::new(); algorithm.number_of_input_ports()];
        let outputs = (0..algorithm.number_of_output_ports())
            .map(|_| OutputState::default())
            .collect();
        Self {
            algorithm,
            executive,
            inputs,
            outputs,
            sink: OutputState::default(),
            connection_time: ModifiedTime::new(),
            information_time: TimeStamp::ZERO,
            subject: Arc::new(Subject::new()),
        }
    }

    /// The request state of output `port`, or of the node itself when it
    /// has no outputs.
    pub fn state(&self, port: usize) -> &OutputState {
        self.outputs.get(port).unwrap_or(&self.sink)
    }

    pub fn state_mut(&mut self, port: usize) -> &mut OutputState {
        match self.outputs.get_mut(port) {
            Some(state) => state,
            None => &mut self.sink,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline
// ─────────────────────────────────────────────────────────────────────────────

/// A graph of algorithms and the executive state needed to update it.
///
/// A pipeline is driven from one thread at a time; it is `Send`, so
/// independent pipelines can live on independent threads.
pub struct Pipeline {
    pub(crate) nodes: Vec<Node>,
    pub(crate) context: PipelineContext,
    pub(crate) abort: AbortFlag,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::with_context(PipelineContext::default())
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field(
                "nodes",
                &self
                    .nodes
                    .iter()
                    .map(|n| n.algorithm.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Pipeline {
    /// An empty pipeline with the default context.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty pipeline using `context`.
    pub fn with_context(context: PipelineContext) -> Self {
        Self {
            nodes: Vec::new(),
            context,
            abort: AbortFlag::new(),
        }
    }

    /// The pipeline configuration.
    #[must_use]
    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// The pipeline configuration, mutably.
    pub fn context_mut(&mut self) -> &mut PipelineContext {
        &mut self.context
    }

    /// The flag that cancels the running update. It is cleared when an
    /// update starts.
    #[must_use]
    pub fn abort_flag(&self) -> AbortFlag {
        self.abort.clone()
    }

    // ── Nodes ──────────────────────────────────────────────────────────

    /// Adds an algorithm driven by the composite executive.
    pub fn add<A: Algorithm>(&mut self, algorithm: A) -> NodeId {
        self.add_with_executive(algorithm, ExecutiveKind::Composite)
    }

    /// Adds an algorithm driven by the given executive.
    pub fn add_with_executive<A: Algorithm>(
        &mut self,
        algorithm: A,
        executive: ExecutiveKind,
    ) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        log::debug!("Adding {} as {id} ({executive:?})", algorithm.name());
        self.nodes.push(Node::new(Box::new(algorithm), executive));
        id
    }

    /// Adds a source node producing `data` as is.
    pub fn add_data(&mut self, data: DataObject) -> NodeId {
        self.add(TrivialProducer::new(data))
    }

    /// Feeds `data` into input `port` of `consumer` through a source node.
    ///
    /// If the port is already fed by a single source node, that node's data
    /// is replaced; otherwise the port's connections are replaced by a new
    /// source node. Returns the source node.
    pub fn set_input_data(
        &mut self,
        consumer: NodeId,
        port: usize,
        data: DataObject,
    ) -> Result<NodeId, PipelineError> {
        let existing = match self.input_connections(consumer, port)? {
            [only] => Some(only.producer),
            _ => None,
        };
        if let Some(producer) = existing {
            if let Some(source) = self.algorithm_mut::<TrivialProducer>(producer) {
                source.set_data(data);
                return Ok(producer);
            }
        }
        self.disconnect(consumer, port)?;
        let producer = self.add_data(data);
        self.connect(producer, 0, consumer, port)?;
        Ok(producer)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the pipeline has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The algorithm name of `node`.
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.index()).map(|n| n.algorithm.name())
    }

    /// The executive driving `node`.
    pub fn executive(&self, node: NodeId) -> Option<ExecutiveKind> {
        self.nodes.get(node.index()).map(|n| n.executive)
    }

    /// The algorithm of `node`, if it has type `A`.
    pub fn algorithm<A: Algorithm>(&self, node: NodeId) -> Option<&A> {
        self.nodes
            .get(node.index())
            .and_then(|n| n.algorithm.as_any().downcast_ref::<A>())
    }

    /// The algorithm of `node`, mutably, if it has type `A`. Parameter
    /// setters are expected to advance the algorithm's modification time.
    pub fn algorithm_mut<A: Algorithm>(&mut self, node: NodeId) -> Option<&mut A> {
        self.nodes
            .get_mut(node.index())
            .and_then(|n| n.algorithm.as_any_mut().downcast_mut::<A>())
    }

    /// The observer subject of `node`. `Start`, `End`, `Progress`, `Error`,
    /// `Warning` and `Abort` events are fired on it around the data pass.
    pub fn subject(&self, node: NodeId) -> Option<&Subject> {
        self.nodes.get(node.index()).map(|n| n.subject.as_ref())
    }

    // ── Connections ────────────────────────────────────────────────────

    /// Connects output `producer_port` of `producer` to input
    /// `consumer_port` of `consumer`.
    pub fn connect(
        &mut self,
        producer: NodeId,
        producer_port: usize,
        consumer: NodeId,
        consumer_port: usize,
    ) -> Result<(), PipelineError> {
        self.check_output_port(producer, producer_port)?;
        self.check_input_port(consumer, consumer_port)?;

        let node = &self.nodes[consumer.index()];
        let info = node.algorithm.fill_input_port_information(consumer_port);
        if !info.repeatable && !node.inputs[consumer_port].is_empty() {
            return Err(PipelineError::PortNotRepeatable {
                node: consumer,
                port: consumer_port,
            });
        }

        if let OutputPortInfo::Concrete(produced) = self.nodes[producer.index()]
            .algorithm
            .fill_output_port_information(producer_port)
        {
            let iterated = node.executive == ExecutiveKind::Composite && produced.is_composite();
            if !info.constraint.accepts(produced) && !iterated {
                return Err(PipelineError::ConnectionType {
                    consumer,
                    port: consumer_port,
                    expected: info.constraint.to_string(),
                    found: produced.to_string(),
                });
            }
        }

        if producer == consumer || self.upstream_of(producer).contains(&consumer) {
            return Err(PipelineError::Cycle { producer, consumer });
        }

        let node = &mut self.nodes[consumer.index()];
        node.inputs[consumer_port].push(Connection {
            producer,
            port: producer_port,
        });
        node.connection_time.modified();
        log::debug!("Connected {producer}:{producer_port} -> {consumer}:{consumer_port}");
        Ok(())
    }

    /// Removes every connection of input `port` of `consumer`.
    pub fn disconnect(&mut self, consumer: NodeId, port: usize) -> Result<(), PipelineError> {
        self.check_input_port(consumer, port)?;
        let node = &mut self.nodes[consumer.index()];
        if !node.inputs[port].is_empty() {
            node.inputs[port].clear();
            node.connection_time.modified();
        }
        Ok(())
    }

    /// The connections of input `port` of `node`, in connection order.
    pub fn input_connections(
        &self,
        node: NodeId,
        port: usize,
    ) -> Result<&[Connection], PipelineError> {
        self.check_input_port(node, port)?;
        Ok(&self.nodes[node.index()].inputs[port])
    }

    /// `node` and every node it depends on, producers before consumers.
    pub fn upstream_order(&self, node: NodeId) -> Result<Vec<NodeId>, PipelineError> {
        self.check_node(node)?;
        let upstream = self.upstream_of(node);
        let nodes: Vec<NodeId> = (0..self.nodes.len())
            .map(NodeId::from_index)
            .filter(|id| upstream.contains(id))
            .collect();
        let edges: Vec<(NodeId, NodeId)> = self
            .edges()
            .filter(|(p, c)| upstream.contains(p) && upstream.contains(c))
            .collect();
        topological_sort(nodes, edges).map_err(|_| {
            tributary_core::fatal!("Cycle found upstream of {node} despite connection checks");
            PipelineError::Cycle {
                producer: node,
                consumer: node,
            }
        })
    }

    // ── Outputs ────────────────────────────────────────────────────────

    /// The data object currently held by output `port` of `node`.
    pub fn output(&self, node: NodeId, port: usize) -> Option<DataHandle> {
        self.output_information(node, port)
            .and_then(|info| info.get_cloned(&DATA_OBJECT))
    }

    /// The information map of output `port` of `node`.
    pub fn output_information(&self, node: NodeId, port: usize) -> Option<&Information> {
        self.nodes
            .get(node.index())
            .and_then(|n| n.outputs.get(port))
            .map(|o| &o.information)
    }

    // ── Updates ────────────────────────────────────────────────────────

    /// Brings output `port` of `node` up to date for the whole extent.
    pub fn update(&mut self, node: NodeId, port: usize) -> Result<(), PipelineError> {
        self.update_with(node, port, UpdateRequest::whole())
    }

    /// Brings output `port` of `node` up to date for one piece.
    pub fn update_piece(
        &mut self,
        node: NodeId,
        port: usize,
        piece: u32,
        number_of_pieces: u32,
        ghost_levels: u32,
    ) -> Result<(), PipelineError> {
        self.update_with(
            node,
            port,
            UpdateRequest::for_piece(piece, number_of_pieces, ghost_levels),
        )
    }

    /// Brings output `port` of `node` up to date for a structured sub-extent.
    pub fn update_extent(
        &mut self,
        node: NodeId,
        port: usize,
        extent: Extent,
    ) -> Result<(), PipelineError> {
        self.update_with(node, port, UpdateRequest::for_extent(extent))
    }

    /// Brings a node without outputs, such as a writer, up to date. It runs
    /// when its inputs or parameters changed since its last execution.
    pub fn update_sink(&mut self, node: NodeId) -> Result<(), PipelineError> {
        self.check_node(node)?;
        if !self.nodes[node.index()].outputs.is_empty() {
            return Err(PipelineError::InvalidPort {
                node,
                direction: "output",
                port: 0,
            });
        }
        self.run_update(node, 0, UpdateRequest::whole())
    }

    /// Brings output `port` of `node` up to date for a time value.
    pub fn update_time(&mut self, node: NodeId, port: usize, time: f64) -> Result<(), PipelineError> {
        self.update_with(node, port, UpdateRequest::whole().with_time_step(time))
    }

    // ── Internals ──────────────────────────────────────────────────────

    pub(crate) fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes.iter().enumerate().flat_map(|(index, node)| {
            let consumer = NodeId::from_index(index);
            node.inputs
                .iter()
                .flatten()
                .map(move |c| (c.producer, consumer))
        })
    }

    fn upstream_of(&self, node: NodeId) -> std::collections::HashSet<NodeId> {
        reachable_from(node, self.edges().map(|(p, c)| (c, p)))
    }

    pub(crate) fn check_node(&self, node: NodeId) -> Result<(), PipelineError> {
        if node.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(PipelineError::InvalidNode(node))
        }
    }

    pub(crate) fn check_input_port(&self, node: NodeId, port: usize) -> Result<(), PipelineError> {
        self.check_node(node)?;
        if port < self.nodes[node.index()].inputs.len() {
            Ok(())
        } else {
            Err(PipelineError::InvalidPort {
                node,
                direction: "input",
                port,
            })
        }
    }

    pub(crate) fn check_output_port(&self, node: NodeId, port: usize) -> Result<(), PipelineError> {
        self.check_node(node)?;
        if port < self.nodes[node.index()].outputs.len() {
            Ok(())
        } else {
            Err(PipelineError::InvalidPort {
                node,
                direction: "output",
                port,
            })
        }
    }
}
