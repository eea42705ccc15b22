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


//! Process-wide modification timestamps.
//!
//! Every semantic mutation in the pipeline is tagged with a value drawn from a
//! single global atomic counter. Values are unique and strictly increasing, so
//! staleness is decided by comparing timestamps and never by wall-clock time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// The last timestamp handed out. Incremented before every issue.
static GLOBAL_MODIFIED_TIME: AtomicU64 = AtomicU64::new(0);

/// A point on the global modification clock.
///
/// `TimeStamp::ZERO` precedes every issued value and marks "never happened".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimeStamp(u64);

impl TimeStamp {
    /// The stamp that precedes all issued stamps.
    pub const ZERO: Self = Self(0);

    /// Issues a fresh stamp, strictly greater than every stamp issued before.
    pub fn next() -> Self {
        Self(GLOBAL_MODIFIED_TIME.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Returns the most recently issued stamp without advancing the clock.
    pub fn latest() -> Self {
        Self(GLOBAL_MODIFIED_TIME.load(Ordering::Acquire))
    }

    /// The raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Returns `true` if this stamp was never set.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Interior-mutable modification time owned by an object.
///
/// Objects shared behind an `Arc` still need to report mutations (for example a
/// parameter change on an algorithm, or `modified()` on a published data
/// object), so the stamp lives in an atomic.
#[derive(Debug)]
pub struct ModifiedTime(AtomicU64);

impl ModifiedTime {
    /// Creates a modification time stamped with a fresh value.
    pub fn new() -> Self {
        Self(AtomicU64::new(TimeStamp::next().value()))
    }

    /// Creates a modification time that has never been stamped.
    pub const fn never() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Returns the current stamp.
    pub fn get(&self) -> TimeStamp {
        TimeStamp(self.0.load(Ordering::Acquire))
    }

    /// Advances to a fresh stamp and returns it.
    pub fn modified(&self) -> TimeStamp {
        let stamp = TimeStamp::next();
        self.0.store(stamp.value(), Ordering::Release);
        stamp
    }

    /// Records an externally issued stamp.
    pub fn set(&self, stamp: TimeStamp) {
        self.0.store(stamp.value(), Ordering::Release);
    }
}

impl Default for ModifiedTime {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ModifiedTime {
    fn clone(&self) -> Self {
        Self(AtomicU64::new(self.get().value()))
    }
}
