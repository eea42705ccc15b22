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

//! The request passes, implemented on [`Pipeline`].

use super::composite::{self, LeafPlan};
use super::{ExecutionSignature, ExecutiveKind, UpdateRequest};
use crate::error::{AlgorithmError, PipelineError};
use crate::pipeline::{NodeId, Pipeline};
use crate::port::{OutputPortInfo, PortData};
use crate::request::{Request, RequestKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tributary_core::event::EventKind;
use tributary_core::information::keys::{
    DATA_EXTENT, DATA_NUMBER_OF_GHOST_LEVELS, DATA_NUMBER_OF_PIECES, DATA_PIECE_NUMBER,
    DATA_TIME_STEP, WHOLE_EXTENT,
};
use tributary_core::information::Propagation;
use tributary_core::telemetry::{ExecutionEvent, Outcome, PassKind};
use tributary_core::{Extent, InformationVector, TimeStamp};
use tributary_data::keys::{COMPOSITE_METADATA, DATA_OBJECT};
use tributary_data::{DataError, DataHandle, DataKind, DataObject, DataObjectType};

impl Pipeline {
    /// Brings output `port` of `node` up to date for `request`.
    ///
    /// Producers are updated first. Nodes whose output is still valid for
    /// the request are skipped. On failure every output keeps its previous
    /// data and timestamps.
    pub fn update_with(
        &mut self,
        node: NodeId,
        port: usize,
        request: UpdateRequest,
    ) -> Result<(), PipelineError> {
        self.check_output_port(node, port)?;
        self.run_update(node, port, request)
    }

    pub(crate) fn run_update(
        &mut self,
        node: NodeId,
        port: usize,
        request: UpdateRequest,
    ) -> Result<(), PipelineError> {
        self.abort.reset();
        let order = self.upstream_order(node)?;
        log::debug!("Updating {node}:{port} over {} node(s)", order.len());

        for &id in &order {
            self.data_object_pass(id)?;
        }
        let mut pipeline_times = HashMap::with_capacity(order.len());
        for &id in &order {
            self.information_pass(id, &mut pipeline_times)?;
        }
        self.data_pass(node, port, request, &pipeline_times)
    }

    // ── DataObject ─────────────────────────────────────────────────────

    fn data_object_pass(&mut self, id: NodeId) -> Result<(), PipelineError> {
        let mut inputs = self.gather_inputs(id);
        self.check_input_types(id, &inputs)?;
        let plan = self.leaf_plan(id, &inputs);
        let request = self.request(id, RequestKind::DataObject, None);
        let mut outputs = self.output_vector(id);
        let before: Vec<Option<DataHandle>> = (0..outputs.len())
            .map(|p| outputs.data(p).cloned())
            .collect();

        let node = &mut self.nodes[id.index()];
        node.algorithm
            .process_request(&request, &mut inputs, &mut outputs)
            .map_err(|e| internal(id, node.algorithm.name(), e))?;

        for (port, previous) in before.iter().enumerate() {
            if outputs.data(port) != previous.as_ref() {
                continue;
            }
            let expected = match (&plan, port) {
                (Some(plan), 0) => Some(plan.output_type()),
                _ => match node.algorithm.fill_output_port_information(port) {
                    OutputPortInfo::Concrete(data_type) => Some(data_type),
                    OutputPortInfo::SameAsInput(input) => inputs
                        .get(input)
                        .and_then(|v| v.data(0))
                        .map(|d| d.data_type()),
                },
            };
            let Some(expected) = expected else {
                continue;
            };
            if outputs.data(port).map(|d| d.data_type()) != Some(expected) {
                log::trace!("{id}: allocating a {expected} for output {port}");
                outputs.set_data(port, self.context.factory().create_type(expected));
            }
        }
        self.install_outputs(id, outputs);
        Ok(())
    }

    fn check_input_types(
        &self,
        id: NodeId,
        inputs: &[InformationVector],
    ) -> Result<(), PipelineError> {
        let node = &self.nodes[id.index()];
        for (port, vector) in inputs.iter().enumerate() {
            let constraint = node.algorithm.fill_input_port_information(port).constraint;
            for data in vector.iter().filter_map(|info| info.get(&DATA_OBJECT)) {
                let found = data.data_type();
                let iterated = node.executive == ExecutiveKind::Composite && found.is_composite();
                if !constraint.accepts(found) && !iterated {
                    log::error!("{id} input {port}: {constraint} required, got {found}");
                    return Err(PipelineError::ConnectionType {
                        consumer: id,
                        port,
                        expected: constraint.to_string(),
                        found: found.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    // ── Information ────────────────────────────────────────────────────

    fn information_pass(
        &mut self,
        id: NodeId,
        pipeline_times: &mut HashMap<NodeId, TimeStamp>,
    ) -> Result<(), PipelineError> {
        let node = &self.nodes[id.index()];
        let mut pipeline_time = node
            .algorithm
            .modified_time()
            .max(node.connection_time.get());
        for connection in node.inputs.iter().flatten() {
            let producer = &self.nodes[connection.producer.index()];
            pipeline_time = pipeline_time.max(producer.information_time);
            if let Some(&upstream) = pipeline_times.get(&connection.producer) {
                pipeline_time = pipeline_time.max(upstream);
            }
        }
        pipeline_times.insert(id, pipeline_time);
        if !node.information_time.is_zero() && pipeline_time <= node.information_time {
            log::trace!("{id}: information is current");
            return Ok(());
        }

        let mut inputs = self.gather_inputs(id);
        let mut outputs = self.output_vector(id);
        for info in outputs.iter_mut() {
            info.remove_propagating(Propagation::Downstream);
            if let Some(first) = inputs.first().and_then(|v| v.get(0)) {
                info.propagate_from(first, Propagation::Downstream);
            }
        }
        let plan = self.leaf_plan(id, &inputs);
        let request = self.request(id, RequestKind::Information, None);
        self.context
            .diagnostics()
            .pass(self.nodes[id.index()].algorithm.name(), "REQUEST_INFORMATION");

        let started = Instant::now();
        let node = &mut self.nodes[id.index()];
        let result = node
            .algorithm
            .process_request(&request, &mut inputs, &mut outputs);
        if let Err(error) = result {
            let error = internal(id, node.algorithm.name(), error);
            log::error!("{error}");
            self.publish(id, PassKind::Information, Outcome::Failed(error.to_string()), started.elapsed());
            return Err(error);
        }
        if let Some(plan) = &plan {
            composite::announce_leaf_structure(plan, &mut outputs);
        }
        node.information_time = TimeStamp::next();
        self.install_outputs(id, outputs);
        self.publish(id, PassKind::Information, Outcome::Executed, started.elapsed());
        Ok(())
    }

    // ── UpdateTime / UpdateExtent / Data ───────────────────────────────

    fn data_pass(
        &mut self,
        id: NodeId,
        port: usize,
        request: UpdateRequest,
        pipeline_times: &HashMap<NodeId, TimeStamp>,
    ) -> Result<(), PipelineError> {
        if self.abort.is_set() {
            return Err(PipelineError::Aborted);
        }
        self.check_required_inputs(id)?;

        let request = request.resolve(&self.nodes[id.index()].state(port).information);
        request.write_to(&mut self.nodes[id.index()].state_mut(port).information);
        if self.is_current(id, port, &request, pipeline_times) {
            log::trace!("{id}: output {port} and everything upstream are up to date");
            for upstream in self.upstream_order(id)? {
                self.publish(upstream, PassKind::Data, Outcome::Skipped, Duration::ZERO);
            }
            return Ok(());
        }
        let mut inputs = self.gather_inputs(id);
        self.copy_request_upstream(id, port, &request, &mut inputs);
        self.narrow_requests(id, port, &mut inputs)?;

        let connections = self.nodes[id.index()].inputs.clone();
        for (input_port, vector) in connections.iter().enumerate() {
            for (index, connection) in vector.iter().enumerate() {
                let upstream = inputs[input_port]
                    .get(index)
                    .map(UpdateRequest::from_information)
                    .unwrap_or_default();
                self.data_pass(connection.producer, connection.port, upstream, pipeline_times)
                    .map_err(|e| match e {
                        PipelineError::Aborted => PipelineError::Aborted,
                        other => PipelineError::UpstreamFailed {
                            node: id,
                            source: Box::new(other),
                        },
                    })?;
            }
        }

        let inputs = self.gather_inputs(id);
        let consumed: Vec<Vec<Option<TimeStamp>>> = inputs
            .iter()
            .map(|v| v.iter().map(|info| info.get(&DATA_OBJECT).map(|d| d.modified_time())).collect())
            .collect();
        let node = &self.nodes[id.index()];
        let state = node.state(port);
        let output = state.information.get(&DATA_OBJECT).map(|d| d.modified_time());
        let reason = match &state.signature {
            None => Some("never executed"),
            Some(signature) => signature.staleness(
                node.algorithm.modified_time(),
                &consumed,
                &request,
                output,
            ),
        };
        match reason {
            None => {
                log::trace!("{id}: output {port} is up to date");
                self.publish(id, PassKind::Data, Outcome::Skipped, Duration::ZERO);
                Ok(())
            }
            Some(reason) => {
                log::debug!("{} ({id}) executing: {reason}", node.algorithm.name());
                self.execute(id, port, request, inputs, consumed)
            }
        }
    }

    /// Returns `true` if output `port` of `id` was computed for `request`
    /// after the last change anywhere upstream.
    ///
    /// Producers are not consulted: one shared by several consumers may have
    /// been re-executed for another request since, without invalidating
    /// what this node built from its earlier output.
    fn is_current(
        &self,
        id: NodeId,
        port: usize,
        request: &UpdateRequest,
        pipeline_times: &HashMap<NodeId, TimeStamp>,
    ) -> bool {
        let node = &self.nodes[id.index()];
        let state = node.state(port);
        let Some(signature) = &state.signature else {
            return false;
        };
        let pipeline_time = pipeline_times
            .get(&id)
            .copied()
            .unwrap_or_else(|| node.algorithm.modified_time());
        let output = state.information.get(&DATA_OBJECT).map(|d| d.modified_time());
        pipeline_time <= signature.completed
            && node.algorithm.modified_time() <= signature.completed
            && &signature.request == request
            && signature.output == output
    }

    fn check_required_inputs(&self, id: NodeId) -> Result<(), PipelineError> {
        let node = &self.nodes[id.index()];
        for (port, connections) in node.inputs.iter().enumerate() {
            if connections.is_empty() && !node.algorithm.fill_input_port_information(port).optional {
                log::error!("{} ({id}): input {port} is required", node.algorithm.name());
                let error = PipelineError::MissingRequiredInput { node: id, port };
                self.publish(id, PassKind::Data, Outcome::Failed(error.to_string()), Duration::ZERO);
                return Err(error);
            }
        }
        Ok(())
    }

    /// Default input requests: a copy of the output request. The extent is
    /// only meaningful upstream when the output is structured.
    fn copy_request_upstream(
        &self,
        id: NodeId,
        port: usize,
        request: &UpdateRequest,
        inputs: &mut [InformationVector],
    ) {
        let node = &self.nodes[id.index()];
        let whole_extent = node.algorithm.requires_whole_extent();
        let structured = node
            .state(port)
            .information
            .get(&DATA_OBJECT)
            .is_some_and(|d| d.data_type() == DataObjectType::ImageGrid);
        let default = UpdateRequest {
            extent: request.extent.filter(|_| structured),
            ..request.clone()
        };
        for info in inputs.iter_mut().flat_map(|v| v.iter_mut()) {
            match info.get_cloned(&WHOLE_EXTENT).filter(|_| whole_extent) {
                Some(whole) => UpdateRequest {
                    extent: Some(whole),
                    time_step: request.time_step,
                    composite_indices: request.composite_indices.clone(),
                    ..UpdateRequest::default()
                }
                .write_to(info),
                None => default.write_to(info),
            }
        }
    }

    fn narrow_requests(
        &mut self,
        id: NodeId,
        port: usize,
        inputs: &mut [InformationVector],
    ) -> Result<(), PipelineError> {
        let mut outputs = self.output_vector(id);
        let time = self.request(id, RequestKind::UpdateTime, Some(port));
        let extent = time.with_kind(RequestKind::UpdateExtent);
        let node = &mut self.nodes[id.index()];
        for request in [time, extent] {
            node.algorithm
                .process_request(&request, inputs, &mut outputs)
                .map_err(|e| internal(id, node.algorithm.name(), e))?;
        }
        Ok(())
    }

    fn execute(
        &mut self,
        id: NodeId,
        port: usize,
        request: UpdateRequest,
        mut inputs: Vec<InformationVector>,
        consumed: Vec<Vec<Option<TimeStamp>>>,
    ) -> Result<(), PipelineError> {
        let plan = self.leaf_plan(id, &inputs);
        let data_request = self.request(id, RequestKind::Data, Some(port));
        let mut outputs = self.output_vector(id);
        for p in 0..outputs.len() {
            if let Some(data_type) = outputs.data(p).map(|d| d.data_type()) {
                outputs.set_data(p, self.context.factory().create_type(data_type));
            }
        }

        let node = &mut self.nodes[id.index()];
        let name = node.algorithm.name().to_string();
        node.subject.invoke_event(EventKind::Start, None);
        let started = Instant::now();
        let result = match &plan {
            Some(plan) => composite::execute_per_leaf(
                node.algorithm.as_mut(),
                plan,
                &data_request,
                &inputs,
                &mut outputs,
                self.context.factory(),
                request.composite_indices.as_deref(),
            ),
            None => node
                .algorithm
                .process_request(&data_request, &mut inputs, &mut outputs),
        }
        .and_then(|()| data_request.check_abort());
        let duration = started.elapsed();

        if let Err(error) = result {
            let error = internal(id, &name, error);
            if error == PipelineError::Aborted {
                log::warn!("{name} ({id}) aborted; keeping previous output");
                node.subject.invoke_event(EventKind::Abort, None);
                self.publish(id, PassKind::Data, Outcome::Aborted, duration);
            } else {
                log::error!("{error}");
                let message = error.to_string();
                node.subject.invoke_event(EventKind::Error, Some(&message));
                self.publish(id, PassKind::Data, Outcome::Failed(message), duration);
            }
            return Err(error);
        }

        if node.executive == ExecutiveKind::Composite {
            self.validate_structure(id, &outputs, duration)?;
        }
        if let (true, Some(extent)) = (request.exact_extent, request.extent) {
            crop_to_extent(&mut outputs, port, &extent);
        }
        stamp_data_information(&mut outputs, &request);

        let completed = TimeStamp::next();
        let node = &mut self.nodes[id.index()];
        for (p, (state, info)) in node
            .outputs
            .iter_mut()
            .zip(outputs.into_inner())
            .enumerate()
        {
            let served = if p == port {
                request.clone()
            } else {
                UpdateRequest::from_information(&info)
            };
            state.signature = Some(ExecutionSignature {
                completed,
                inputs: consumed.clone(),
                request: served,
                output: info.get(&DATA_OBJECT).map(|d| d.modified_time()),
            });
            state.information = info;
        }
        if node.outputs.is_empty() {
            node.sink.signature = Some(ExecutionSignature {
                completed,
                inputs: consumed,
                request,
                output: None,
            });
        }
        node.subject.invoke_event(EventKind::End, None);
        log::debug!("{name} ({id}) executed in {duration:?}");
        self.publish(id, PassKind::Data, Outcome::Executed, duration);
        Ok(())
    }

    fn validate_structure(
        &self,
        id: NodeId,
        outputs: &InformationVector,
        duration: Duration,
    ) -> Result<(), PipelineError> {
        for (port, info) in outputs.iter().enumerate() {
            let (Some(data), Some(announced)) = (info.get(&DATA_OBJECT), info.get(&COMPOSITE_METADATA))
            else {
                continue;
            };
            if data.data_type().is_composite() && !composite::same_shape(data, announced) {
                let error = PipelineError::CompositeStructureMismatch { node: id, port };
                log::error!("{error}");
                let message = error.to_string();
                self.nodes[id.index()]
                    .subject
                    .invoke_event(EventKind::Error, Some(&message));
                self.publish(id, PassKind::Data, Outcome::Failed(message), duration);
                return Err(error);
            }
        }
        Ok(())
    }

    // ── Helpers ────────────────────────────────────────────────────────

    fn request(&self, id: NodeId, kind: RequestKind, port: Option<usize>) -> Request {
        let node = &self.nodes[id.index()];
        Request::new(
            kind,
            port,
            self.abort.clone(),
            Arc::clone(&node.subject),
            self.context.diagnostics(),
            format!("{} ({id})", node.algorithm.name()),
        )
    }

    fn gather_inputs(&self, id: NodeId) -> Vec<InformationVector> {
        self.nodes[id.index()]
            .inputs
            .iter()
            .map(|connections| {
                connections
                    .iter()
                    .map(|c| self.nodes[c.producer.index()].outputs[c.port].information.clone())
                    .collect::<Vec<_>>()
                    .into()
            })
            .collect()
    }

    fn output_vector(&self, id: NodeId) -> InformationVector {
        self.nodes[id.index()]
            .outputs
            .iter()
            .map(|o| o.information.clone())
            .collect::<Vec<_>>()
            .into()
    }

    fn install_outputs(&mut self, id: NodeId, outputs: InformationVector) {
        let node = &mut self.nodes[id.index()];
        for (state, info) in node.outputs.iter_mut().zip(outputs.into_inner()) {
            state.information = info;
        }
    }

    fn leaf_plan(&self, id: NodeId, inputs: &[InformationVector]) -> Option<LeafPlan> {
        let node = &self.nodes[id.index()];
        if node.executive != ExecutiveKind::Composite {
            return None;
        }
        let input_type = inputs.first()?.data(0)?.data_type();
        if !input_type.is_composite()
            || node
                .algorithm
                .fill_input_port_information(0)
                .constraint
                .accepts(input_type)
        {
            return None;
        }
        let leaf_output = match node.algorithm.fill_output_port_information(0) {
            OutputPortInfo::Concrete(data_type) => Some(data_type),
            OutputPortInfo::SameAsInput(_) => None,
        };
        Some(LeafPlan {
            input_type,
            leaf_output,
        })
    }

    fn publish(&self, id: NodeId, pass: PassKind, outcome: Outcome, duration: Duration) {
        self.context.publish(ExecutionEvent {
            node: u32::try_from(id.index()).unwrap_or(u32::MAX),
            algorithm: self.nodes[id.index()].algorithm.name().to_string(),
            pass,
            outcome,
            duration,
        });
    }
}

/// Maps an algorithm failure to the pipeline error reported for `id`.
fn internal(id: NodeId, algorithm: &str, error: AlgorithmError) -> PipelineError {
    match error {
        AlgorithmError::Aborted => PipelineError::Aborted,
        AlgorithmError::Data(DataError::InconsistentRefinement(inner)) => {
            PipelineError::InconsistentRefinement(inner)
        }
        source => PipelineError::AlgorithmInternal {
            node: id,
            algorithm: algorithm.to_string(),
            source,
        },
    }
}

/// Records what was actually produced on each output object.
/// Trims an image output larger than an exact-extent request down to the
/// requested extent. Field data is carried over.
fn crop_to_extent(outputs: &mut InformationVector, port: usize, extent: &Extent) {
    let Some(data) = outputs.data(port) else {
        return;
    };
    let DataKind::ImageGrid(image) = data.kind() else {
        return;
    };
    if image.extent() == *extent {
        return;
    }
    log::trace!("cropping output {port} from {:?} to exact extent {extent:?}", image.extent());
    let mut cropped = DataObject::new(DataKind::ImageGrid(image.extract(extent)));
    *cropped.field_data_mut() = data.field_data().clone();
    outputs.set_data(port, cropped);
}

fn stamp_data_information(outputs: &mut InformationVector, request: &UpdateRequest) {
    let signed = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
    for port in 0..outputs.len() {
        let Some(object) = outputs.data_mut(port) else {
            continue;
        };
        let extent = match object.kind() {
            DataKind::ImageGrid(image) => Some(image.extent()),
            _ => None,
        };
        let info = object.information_mut();
        if let Some(extent) = extent {
            info.set(&DATA_EXTENT, extent);
        }
        info.set(&DATA_PIECE_NUMBER, signed(request.piece));
        info.set(&DATA_NUMBER_OF_PIECES, signed(request.number_of_pieces));
        info.set(&DATA_NUMBER_OF_GHOST_LEVELS, signed(request.ghost_levels));
        match request.time_step {
            Some(time) => info.set(&DATA_TIME_STEP, time),
            None => {
                info.remove(&DATA_TIME_STEP);
            }
        }
    }
}
