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


//! Synchronous observer dispatch and asynchronous event channels.
//!
//! Two complementary mechanisms live here:
//!
//! - [`Subject`]: the synchronous, priority-ordered observer list attached to
//!   every data object and pipeline node. Dispatch happens on the caller's
//!   stack and observers may mutate the list while it is being walked.
//! - [`EventBus`]: a generic, thread-safe MPSC channel used to ship execution
//!   records to consumers that must not run inside the pipeline's call tree
//!   (telemetry, logging sinks).

mod bus;
mod observer;

pub use self::bus::EventBus;
pub use self::observer::{EventContext, ObserverTag, Subject};

/// The kind of an event dispatched through a [`Subject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Wildcard: an observer registered for `Any` receives every event.
    Any,
    /// The object's modification time advanced.
    Modified,
    /// The object is being torn down. Fired exactly once.
    Delete,
    /// An algorithm started its data pass.
    Start,
    /// An algorithm finished its data pass.
    End,
    /// Progress report; the payload is an `f64` in `[0, 1]`.
    Progress,
    /// An algorithm reported an error; the payload is a `String`.
    Error,
    /// An algorithm reported a warning; the payload is a `String`.
    Warning,
    /// Execution was aborted on request.
    Abort,
    /// Application-defined event.
    User(u32),
}

impl EventKind {
    /// Returns `true` if an observer registered for `self` should receive `event`.
    #[inline]
    pub fn accepts(self, event: EventKind) -> bool {
        self == EventKind::Any || self == event
    }
}
