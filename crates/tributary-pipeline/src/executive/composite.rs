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

//! Composite support: per-block execution and structure checks.

use crate::algorithm::Algorithm;
use crate::error::AlgorithmError;
use crate::port::PortData;
use crate::request::Request;
use tributary_core::InformationVector;
use tributary_data::keys::{COMPOSITE_METADATA, CURRENT_FLAT_INDEX, DATA_OBJECT};
use tributary_data::{DataHandle, DataKind, DataObject, DataObjectFactory, DataObjectType, IterOptions};

/// How a non-composite algorithm is looped over a composite input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LeafPlan {
    /// Type of the composite input.
    pub input_type: DataObjectType,
    /// Declared leaf output type, `None` when it follows the input leaf.
    pub leaf_output: Option<DataObjectType>,
}

impl LeafPlan {
    /// Type of the assembled output. AMR stays AMR only for image leaves.
    pub fn output_type(&self) -> DataObjectType {
        match self.leaf_output {
            Some(leaf) if self.input_type.is_amr() && leaf != DataObjectType::ImageGrid => {
                DataObjectType::MultiBlock
            }
            _ => self.input_type,
        }
    }
}

/// Rewrites the structure announced by the input into the one the loop
/// will produce.
pub(crate) fn announce_leaf_structure(plan: &LeafPlan, outputs: &mut InformationVector) {
    let Some(leaf) = plan.leaf_output else {
        return;
    };
    let Some(info) = outputs.get_mut(0) else {
        return;
    };
    let Some(announced) = info.get_cloned(&COMPOSITE_METADATA) else {
        return;
    };
    let mapped: Result<DataObject, std::convert::Infallible> = announced
        .map_leaves(|_, _| Ok(Some(DataHandle::new(DataObject::of_type(leaf)))));
    match mapped {
        Ok(structure) => info.set(&COMPOSITE_METADATA, DataHandle::new(structure)),
        Err(never) => match never {},
    }
}

/// Runs `algorithm` once per leaf of the composite on input 0, in flat
/// index order, and installs the assembled result on output 0.
///
/// Leaves outside `selection` produce empty slots. The abort flag is
/// checked before every leaf.
pub(crate) fn execute_per_leaf(
    algorithm: &mut dyn Algorithm,
    plan: &LeafPlan,
    request: &Request,
    inputs: &[InformationVector],
    outputs: &mut InformationVector,
    factory: &DataObjectFactory,
    selection: Option<&[usize]>,
) -> Result<(), AlgorithmError> {
    let composite = inputs
        .first()
        .and_then(|v| v.data(0))
        .cloned()
        .ok_or_else(|| AlgorithmError::bad_input(0, "composite input disappeared"))?;
    let total = composite.composite_iter(IterOptions::default()).count().max(1);
    let mut done = 0usize;

    let assembled = composite.map_leaves::<AlgorithmError, _>(|flat, leaf| {
        request.check_abort()?;
        if selection.is_some_and(|wanted| !wanted.contains(&flat)) {
            return Ok(None);
        }
        let mut leaf_inputs = inputs.to_vec();
        if let Some(info) = leaf_inputs[0].get_mut(0) {
            info.set(&DATA_OBJECT, leaf.clone());
            info.set(&CURRENT_FLAT_INDEX, flat);
        }
        let mut leaf_outputs = outputs.clone();
        leaf_outputs.set_data(0, factory.create_type(plan.leaf_output.unwrap_or(leaf.data_type())));

        algorithm.process_request(request, &mut leaf_inputs, &mut leaf_outputs)?;

        done += 1;
        request.set_progress(done as f64 / total as f64);
        Ok(leaf_outputs.data(0).cloned())
    })?;

    outputs.set_data(0, assembled);
    Ok(())
}

/// Returns `true` if both objects have the same type and the same slot and
/// block counts.
pub(crate) fn same_shape(a: &DataObject, b: &DataObject) -> bool {
    a.data_type() == b.data_type() && shape(a) == shape(b)
}

fn shape(object: &DataObject) -> Vec<usize> {
    let mut counts = Vec::new();
    push_shape(object, &mut counts);
    counts
}

fn push_shape(object: &DataObject, counts: &mut Vec<usize>) {
    match object.kind() {
        DataKind::Composite(composite) => {
            counts.push(composite.slots().len());
            for child in composite.slots().iter().filter_map(|s| s.data()) {
                if child.data_type().is_composite() {
                    push_shape(child, counts);
                }
            }
        }
        DataKind::Amr(amr) => {
            counts.push(amr.number_of_levels());
            counts.extend((0..amr.number_of_levels()).map(|level| amr.number_of_blocks(level)));
        }
        _ => {}
    }
}
