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

//! Per-pipeline configuration, passed once to [`Pipeline::with_context`].
//!
//! [`Pipeline::with_context`]: crate::Pipeline::with_context

use tributary_core::diagnostics::DiagnosticSettings;
use tributary_core::telemetry::ExecutionEvent;
use tributary_data::DataObjectFactory;

/// Everything a pipeline needs that is not owned by a node.
#[derive(Debug, Default)]
pub struct PipelineContext {
    factory: DataObjectFactory,
    diagnostics: DiagnosticSettings,
    events: Option<flume::Sender<ExecutionEvent>>,
}

impl PipelineContext {
    /// A context with the built-in factory, warnings on and no event sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the data-object factory.
    #[must_use]
    pub fn with_factory(mut self, factory: DataObjectFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Replaces the diagnostic switches.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticSettings) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Turns forwarding of algorithm warnings to the log on or off.
    #[must_use]
    pub fn with_warnings(mut self, enabled: bool) -> Self {
        self.diagnostics.warnings_enabled = enabled;
        self
    }

    /// Publishes an [`ExecutionEvent`] per pass and node on `sender`.
    #[must_use]
    pub fn with_event_sender(mut self, sender: flume::Sender<ExecutionEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// The data-object factory.
    #[must_use]
    pub fn factory(&self) -> &DataObjectFactory {
        &self.factory
    }

    /// The data-object factory, mutably, to register overrides.
    pub fn factory_mut(&mut self) -> &mut DataObjectFactory {
        &mut self.factory
    }

    /// The diagnostic switches.
    #[must_use]
    pub fn diagnostics(&self) -> DiagnosticSettings {
        self.diagnostics
    }

    pub(crate) fn publish(&self, event: ExecutionEvent) {
        if let Some(sender) = &self.events {
            if sender.send(event).is_err() {
                log::trace!("Execution event dropped: receiver disconnected");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tributary_core::telemetry::{Outcome, PassKind};

    fn event() -> ExecutionEvent {
        ExecutionEvent {
            node: 0,
            algorithm: "Source".into(),
            pass: PassKind::Data,
            outcome: Outcome::Executed,
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn publish_reaches_configured_receiver() {
        let (tx, rx) = flume::unbounded();
        let context = PipelineContext::new().with_event_sender(tx);
        context.publish(event());
        assert_eq!(rx.try_recv().ok(), Some(event()));
    }

    #[test]
    fn publish_without_receiver_is_silent() {
        let (tx, rx) = flume::unbounded();
        drop(rx);
        let context = PipelineContext::new().with_event_sender(tx).with_warnings(false);
        context.publish(event());
        assert!(!context.diagnostics().warnings_enabled);
    }
}
