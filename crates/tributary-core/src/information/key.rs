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


use std::fmt;
use std::marker::PhantomData;

/// How the executive copies an entry between pipeline stages by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Propagation {
    /// Never copied automatically.
    None,
    /// Copied from input information to output information during the
    /// information pass (meta-data such as whole extent or time steps).
    Downstream,
    /// Copied from output requests to input requests during the update-extent
    /// pass (requests such as piece number or ghost levels).
    Upstream,
}

/// Identity of an information key: the module that declared it plus its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId {
    /// Declaring location, conventionally the declaring module's path.
    pub location: &'static str,
    /// Short name of the key.
    pub name: &'static str,
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.location, self.name)
    }
}

/// A typed key into an [`Information`](super::Information) map.
pub struct InformationKey<T> {
    id: KeyId,
    propagation: Propagation,
    _marker: PhantomData<fn() -> T>,
}

impl<T> InformationKey<T> {
    /// Declares a key that is never propagated automatically.
    pub const fn new(location: &'static str, name: &'static str) -> Self {
        Self::with_propagation(location, name, Propagation::None)
    }

    /// Declares a key with an explicit propagation direction.
    pub const fn with_propagation(
        location: &'static str,
        name: &'static str,
        propagation: Propagation,
    ) -> Self {
        Self {
            id: KeyId { location, name },
            propagation,
            _marker: PhantomData,
        }
    }

    /// The key's identity.
    pub const fn id(&self) -> KeyId {
        self.id
    }

    /// The key's short name.
    pub const fn name(&self) -> &'static str {
        self.id.name
    }

    /// The key's default propagation direction.
    pub const fn propagation(&self) -> Propagation {
        self.propagation
    }
}

impl<T> fmt::Debug for InformationKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InformationKey({})", self.id)
    }
}
