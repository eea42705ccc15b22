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

//! Requests sent by the executive to algorithms.

use crate::error::AlgorithmError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tributary_core::diagnostics::DiagnosticSettings;
use tributary_core::event::{EventKind, Subject};

/// The pass a [`Request`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Create or replace output data objects.
    DataObject,
    /// Publish meta-data about the outputs.
    Information,
    /// Narrow a time request into input requests.
    UpdateTime,
    /// Narrow an extent/piece request into input requests.
    UpdateExtent,
    /// Generate the output data.
    Data,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::DataObject => "REQUEST_DATA_OBJECT",
            RequestKind::Information => "REQUEST_INFORMATION",
            RequestKind::UpdateTime => "REQUEST_UPDATE_TIME",
            RequestKind::UpdateExtent => "REQUEST_UPDATE_EXTENT",
            RequestKind::Data => "REQUEST_DATA",
        };
        f.write_str(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AbortFlag
// ─────────────────────────────────────────────────────────────────────────────

/// A cancellation flag shared between a pipeline and whoever may cancel it.
///
/// Algorithms poll it voluntarily; the composite executive polls it before
/// every block.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    /// Creates a cleared flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Clears a previous request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Returns `true` if cancellation was requested.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

/// One request of the protocol, as seen by an algorithm.
#[derive(Debug, Clone)]
pub struct Request {
    kind: RequestKind,
    output_port: Option<usize>,
    abort: AbortFlag,
    subject: Arc<Subject>,
    diagnostics: DiagnosticSettings,
    source: String,
}

impl Request {
    pub(crate) fn new(
        kind: RequestKind,
        output_port: Option<usize>,
        abort: AbortFlag,
        subject: Arc<Subject>,
        diagnostics: DiagnosticSettings,
        source: String,
    ) -> Self {
        Self {
            kind,
            output_port,
            abort,
            subject,
            diagnostics,
            source,
        }
    }

    /// A request detached from any pipeline, for driving algorithms by hand.
    pub fn standalone(kind: RequestKind) -> Self {
        Self::new(
            kind,
            None,
            AbortFlag::new(),
            Arc::new(Subject::new()),
            DiagnosticSettings::default(),
            String::from("standalone"),
        )
    }

    /// The pass.
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// The output port that triggered the request, if any.
    #[must_use]
    pub fn output_port(&self) -> Option<usize> {
        self.output_port
    }

    /// The shared abort flag.
    #[must_use]
    pub fn abort_flag(&self) -> &AbortFlag {
        &self.abort
    }

    /// Returns [`AlgorithmError::Aborted`] if cancellation was requested.
    pub fn check_abort(&self) -> Result<(), AlgorithmError> {
        if self.abort.is_set() {
            Err(AlgorithmError::Aborted)
        } else {
            Ok(())
        }
    }

    /// Reports progress in `[0, 1]` through a `Progress` event on the node.
    pub fn set_progress(&self, progress: f64) {
        let progress = progress.clamp(0.0, 1.0);
        log::trace!("{}: progress {progress:.2}", self.source);
        self.subject.invoke_event(EventKind::Progress, Some(&progress));
    }

    /// Reports a warning through a `Warning` event on the node, and to the
    /// log if warnings are enabled.
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        self.diagnostics.warn(&self.source, &message);
        self.subject.invoke_event(EventKind::Warning, Some(&message));
    }

    pub(crate) fn with_kind(&self, kind: RequestKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn abort_flag_is_shared_between_clones() {
        let flag = AbortFlag::new();
        let other = flag.clone();
        other.abort();
        assert!(flag.is_set());
        flag.reset();
        assert!(!other.is_set());
    }

    #[test]
    fn check_abort_reports_cancellation() {
        let request = Request::standalone(RequestKind::Data);
        assert_eq!(request.check_abort(), Ok(()));
        request.abort_flag().abort();
        assert_eq!(request.check_abort(), Err(AlgorithmError::Aborted));
    }

    #[test]
    fn progress_is_clamped_and_dispatched() {
        let subject = Arc::new(Subject::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        subject.add_observer(EventKind::Progress, move |ctx| {
            if let Some(p) = ctx.data::<f64>() {
                sink.lock().unwrap().push(*p);
            }
        });
        let request = Request::new(
            RequestKind::Data,
            Some(0),
            AbortFlag::new(),
            subject,
            DiagnosticSettings::default(),
            "test".into(),
        );

        request.set_progress(0.5);
        request.set_progress(2.0);

        assert_eq!(*seen.lock().unwrap(), vec![0.5, 1.0]);
    }
}
