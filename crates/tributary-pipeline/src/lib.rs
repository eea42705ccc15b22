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

//! # Tributary Pipeline
//!
//! The demand-driven executive.
//!
//! A [`Pipeline`] owns a graph of [`Algorithm`]s connected through ports.
//! Calling [`Pipeline::update`] on an output walks the upstream graph
//! through the request passes (data object, information, update time,
//! update extent, data), re-running only the nodes whose output is stale
//! for the request. Composite inputs fed to algorithms that do not accept
//! them are processed block by block.

#![warn(missing_docs)]

pub mod algorithm;
pub mod context;
pub mod error;
pub mod executive;
pub mod pipeline;
pub mod port;
pub mod request;
pub mod streaming;
pub mod trivial_producer;

pub use algorithm::Algorithm;
pub use context::PipelineContext;
pub use error::{AlgorithmError, PipelineError};
pub use executive::{ExecutiveKind, UpdateRequest};
pub use pipeline::{Connection, NodeId, Pipeline};
pub use port::{InputPortInfo, OutputPortInfo, PortData};
pub use request::{AbortFlag, Request, RequestKind};
pub use streaming::StreamingDriver;
pub use trivial_producer::TrivialProducer;
