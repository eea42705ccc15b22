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


//! Diagnostic channels shared by every pipeline crate.
//!
//! Regular failures are reported through the `log` facade at the usual
//! levels. Broken internal invariants go to the dedicated
//! [`FATAL_TARGET`] so they can be filtered and alerted on separately; they
//! abort the current request only and never the host process.

/// Log target used for impossible states and corrupt invariants.
pub const FATAL_TARGET: &str = "tributary::fatal";

/// Reports a broken invariant on the fatal channel.
///
/// ```rust
/// tributary_core::fatal!("executive state {} is unreachable", 3);
/// ```
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {
        $crate::__private_log::error!(target: $crate::diagnostics::FATAL_TARGET, $($arg)+)
    };
}

/// Per-pipeline switch replacing a process-wide "display warnings" flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticSettings {
    /// Whether algorithm warnings are forwarded to the log.
    pub warnings_enabled: bool,
    /// Whether per-pass debug messages are emitted.
    pub debug_passes: bool,
}

impl DiagnosticSettings {
    /// Logs `message` as a warning if warnings are enabled.
    pub fn warn(&self, source: &str, message: &str) {
        if self.warnings_enabled {
            log::warn!("{source}: {message}");
        }
    }

    /// Logs a per-pass debug message if enabled.
    pub fn pass(&self, source: &str, pass: &str) {
        if self.debug_passes {
            log::debug!("{source}: {pass}");
        }
    }
}

impl Default for DiagnosticSettings {
    fn default() -> Self {
        Self {
            warnings_enabled: true,
            debug_passes: true,
        }
    }
}
