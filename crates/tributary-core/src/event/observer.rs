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


//! The synchronous observer list attached to objects.

use super::EventKind;
use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identifies a registered observer. Tags increase monotonically per subject.
pub type ObserverTag = u64;

type Callback = Arc<dyn Fn(&EventContext<'_>) + Send + Sync>;

/// What an observer sees while it is being invoked.
pub struct EventContext<'a> {
    subject: &'a Subject,
    event: EventKind,
    data: Option<&'a dyn Any>,
    tag: ObserverTag,
    abort: Cell<bool>,
}

impl<'a> EventContext<'a> {
    /// The subject dispatching the event. Observers may add or remove
    /// observers on it, or invoke further events, while running.
    pub fn subject(&self) -> &'a Subject {
        self.subject
    }

    /// The event being dispatched.
    pub fn event(&self) -> EventKind {
        self.event
    }

    /// The tag of the observer currently running.
    pub fn tag(&self) -> ObserverTag {
        self.tag
    }

    /// The event payload, if it has type `T`.
    pub fn data<T: 'static>(&self) -> Option<&'a T> {
        self.data.and_then(|d| d.downcast_ref::<T>())
    }

    /// Stops dispatch of this event after the current observer returns.
    /// Ignored for passive observers.
    pub fn abort(&self) {
        self.abort.set(true);
    }
}

struct ObserverEntry {
    tag: ObserverTag,
    event: EventKind,
    priority: f32,
    passive: bool,
    callback: Callback,
}

#[derive(Default)]
struct SubjectState {
    entries: Vec<ObserverEntry>,
    next_tag: ObserverTag,
    focus: Vec<ObserverTag>,
    // One flag per active dispatch depth; set whenever the list changes.
    list_modified: Vec<bool>,
    delete_fired: bool,
}

impl SubjectState {
    fn mark_modified(&mut self) {
        for flag in &mut self.list_modified {
            *flag = true;
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Passive,
    Focus,
    Remainder,
}

enum PhaseOutcome {
    Completed { ran: bool },
    Aborted,
}

/// A priority-ordered list of observers supporting re-entrant dispatch.
///
/// Observers run in descending priority; observers with equal priority run in
/// registration order. Dispatch is done in three phases:
///
/// 1. passive observers, which must not modify the list or abort;
/// 2. focus observers (see [`Subject::grab_focus`]); if any ran, the remainder
///    phase is skipped;
/// 3. every other matching observer.
///
/// Each observer runs at most once per dispatch, observers registered during
/// a dispatch are not invoked by it, and the internal lock is never held while
/// a callback runs, so callbacks may freely call back into the subject.
#[derive(Default)]
pub struct Subject {
    state: Mutex<SubjectState>,
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Subject")
            .field("observers", &state.entries.len())
            .field("focus", &state.focus)
            .finish()
    }
}

impl Subject {
    /// Creates an empty subject.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SubjectState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(
        &self,
        event: EventKind,
        priority: f32,
        passive: bool,
        callback: Callback,
    ) -> ObserverTag {
        let mut state = self.state();
        let tag = state.next_tag;
        state.next_tag += 1;
        let position = state
            .entries
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(state.entries.len());
        state.entries.insert(
            position,
            ObserverEntry {
                tag,
                event,
                priority,
                passive,
                callback,
            },
        );
        state.mark_modified();
        tag
    }

    /// Registers an observer with priority `0.0`.
    pub fn add_observer<F>(&self, event: EventKind, callback: F) -> ObserverTag
    where
        F: Fn(&EventContext<'_>) + Send + Sync + 'static,
    {
        self.insert(event, 0.0, false, Arc::new(callback))
    }

    /// Registers an observer with an explicit priority. Higher runs first.
    pub fn add_observer_with_priority<F>(
        &self,
        event: EventKind,
        priority: f32,
        callback: F,
    ) -> ObserverTag
    where
        F: Fn(&EventContext<'_>) + Send + Sync + 'static,
    {
        self.insert(event, priority, false, Arc::new(callback))
    }

    /// Registers a passive observer. Passive observers run before all others
    /// and may neither abort the event nor modify the observer list.
    pub fn add_passive_observer<F>(
        &self,
        event: EventKind,
        priority: f32,
        callback: F,
    ) -> ObserverTag
    where
        F: Fn(&EventContext<'_>) + Send + Sync + 'static,
    {
        self.insert(event, priority, true, Arc::new(callback))
    }

    /// Removes the observer with `tag`. Returns `false` if it was not registered.
    pub fn remove_observer(&self, tag: ObserverTag) -> bool {
        let mut state = self.state();
        let before = state.entries.len();
        state.entries.retain(|e| e.tag != tag);
        state.focus.retain(|t| *t != tag);
        let removed = state.entries.len() != before;
        if removed {
            state.mark_modified();
        }
        removed
    }

    /// Removes every observer registered for exactly `event`.
    pub fn remove_observers(&self, event: EventKind) {
        let mut state = self.state();
        let before = state.entries.len();
        state.entries.retain(|e| e.event != event);
        if state.entries.len() != before {
            let SubjectState { entries, focus, .. } = &mut *state;
            focus.retain(|t| entries.iter().any(|e| e.tag == *t));
            state.mark_modified();
        }
    }

    /// Fires [`EventKind::Delete`] if it has not fired yet, then discards
    /// every observer. Safe to call more than once.
    pub fn remove_all_observers(&self) {
        let fire = {
            let mut state = self.state();
            !std::mem::replace(&mut state.delete_fired, true)
        };
        if fire {
            self.invoke_event(EventKind::Delete, None);
        }
        let mut state = self.state();
        state.entries.clear();
        state.focus.clear();
        state.mark_modified();
    }

    /// Returns `true` if any observer would receive `event`.
    pub fn has_observer(&self, event: EventKind) -> bool {
        self.state().entries.iter().any(|e| e.event.accepts(event))
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.state().entries.len()
    }

    /// Gives the observers with the given tags exclusive handling: while
    /// focus is held and any of them runs for an event, non-passive,
    /// non-focus observers are skipped for that event.
    pub fn grab_focus(&self, tags: &[ObserverTag]) {
        let mut state = self.state();
        state.focus = tags.to_vec();
    }

    /// Releases any focus grabbed with [`Subject::grab_focus`].
    pub fn release_focus(&self) {
        self.state().focus.clear();
    }

    /// Dispatches `event` with an optional payload. Returns `true` if an
    /// observer aborted the event.
    pub fn invoke_event(&self, event: EventKind, data: Option<&dyn Any>) -> bool {
        let (max_tag, focus) = {
            let mut state = self.state();
            state.list_modified.push(false);
            (state.next_tag, state.focus.clone())
        };

        let mut visited: Vec<ObserverTag> = Vec::new();
        let aborted = self.dispatch(event, data, max_tag, &focus, &mut visited);

        self.state().list_modified.pop();
        aborted
    }

    fn dispatch(
        &self,
        event: EventKind,
        data: Option<&dyn Any>,
        max_tag: ObserverTag,
        focus: &[ObserverTag],
        visited: &mut Vec<ObserverTag>,
    ) -> bool {
        if let PhaseOutcome::Aborted =
            self.run_phase(Phase::Passive, event, data, max_tag, focus, visited)
        {
            return true;
        }
        if !focus.is_empty() {
            match self.run_phase(Phase::Focus, event, data, max_tag, focus, visited) {
                PhaseOutcome::Aborted => return true,
                PhaseOutcome::Completed { ran: true } => return false,
                PhaseOutcome::Completed { ran: false } => {}
            }
        }
        matches!(
            self.run_phase(Phase::Remainder, event, data, max_tag, focus, visited),
            PhaseOutcome::Aborted
        )
    }

    fn run_phase(
        &self,
        phase: Phase,
        event: EventKind,
        data: Option<&dyn Any>,
        max_tag: ObserverTag,
        focus: &[ObserverTag],
        visited: &mut Vec<ObserverTag>,
    ) -> PhaseOutcome {
        let mut cursor = 0;
        let mut ran = false;
        loop {
            let candidate = {
                let state = self.state();
                let Some(entry) = state.entries.get(cursor) else {
                    break;
                };
                let in_phase = match phase {
                    Phase::Passive => entry.passive,
                    Phase::Focus => focus.contains(&entry.tag),
                    Phase::Remainder => true,
                };
                let eligible = in_phase
                    && entry.tag < max_tag
                    && entry.event.accepts(event)
                    && visited.binary_search(&entry.tag).is_err();
                eligible.then(|| (entry.tag, entry.passive, Arc::clone(&entry.callback)))
            };

            if let Some((tag, passive, callback)) = candidate {
                if let Err(slot) = visited.binary_search(&tag) {
                    visited.insert(slot, tag);
                }
                let context = EventContext {
                    subject: self,
                    event,
                    data,
                    tag,
                    abort: Cell::new(false),
                };
                callback(&context);
                ran = true;
                if context.abort.get() {
                    if passive {
                        log::error!("Passive observer {tag} tried to abort {event:?}; ignored.");
                    } else {
                        return PhaseOutcome::Aborted;
                    }
                }
            }

            let restart = {
                let mut state = self.state();
                match state.list_modified.last_mut() {
                    Some(flag) if *flag => {
                        *flag = false;
                        true
                    }
                    _ => false,
                }
            };
            if restart {
                if phase == Phase::Passive {
                    log::warn!("A passive observer modified the observer list during {event:?}.");
                }
                cursor = 0;
            } else {
                cursor += 1;
            }
        }
        PhaseOutcome::Completed { ran }
    }
}
