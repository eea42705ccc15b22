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


//! A name-keyed factory registry with runtime-switchable overrides.
//!
//! The [`FactoryRegistry`] maps type names to constructors. An override
//! registered for a name takes precedence over the base constructor while it
//! is enabled, which lets an application substitute specialised
//! implementations without touching the code that requests them.
//!
//! There is no global instance: the registry is owned by whoever needs it and
//! passed around explicitly.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Constructor<T> = Arc<dyn Fn() -> T + Send + Sync>;

struct OverrideEntry<T> {
    name: &'static str,
    description: &'static str,
    enabled: bool,
    constructor: Constructor<T>,
}

/// Describes a registered override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideInfo {
    /// The name being overridden.
    pub base: &'static str,
    /// The name of the replacement.
    pub name: &'static str,
    /// Free-form description.
    pub description: &'static str,
    /// Whether the override is currently used.
    pub enabled: bool,
}

/// Creates values of type `T` by name.
///
/// # Example
///
/// ```rust
/// use tributary_core::registry::FactoryRegistry;
///
/// let mut registry = FactoryRegistry::<String>::new();
/// registry.register("greeting", || "hello".to_string());
/// registry.register_override("greeting", "loud", "shouts", || "HELLO".to_string());
///
/// assert_eq!(registry.create("greeting").as_deref(), Some("HELLO"));
/// registry.set_override_enabled("greeting", "loud", false);
/// assert_eq!(registry.create("greeting").as_deref(), Some("hello"));
/// ```
pub struct FactoryRegistry<T> {
    constructors: HashMap<&'static str, Constructor<T>>,
    overrides: HashMap<&'static str, Vec<OverrideEntry<T>>>,
}

impl<T> Default for FactoryRegistry<T> {
    fn default() -> Self {
        Self {
            constructors: HashMap::new(),
            overrides: HashMap::new(),
        }
    }
}

impl<T> fmt::Debug for FactoryRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.constructors.keys().collect();
        names.sort();
        f.debug_struct("FactoryRegistry")
            .field("constructors", &names)
            .field("overrides", &self.override_info().len())
            .finish()
    }
}

impl<T> FactoryRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the base constructor for `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: &'static str, constructor: F)
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.constructors.insert(name, Arc::new(constructor));
    }

    /// Registers an enabled override for `base`. Later overrides are consulted
    /// first.
    pub fn register_override<F>(
        &mut self,
        base: &'static str,
        name: &'static str,
        description: &'static str,
        constructor: F,
    ) where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.overrides.entry(base).or_default().insert(
            0,
            OverrideEntry {
                name,
                description,
                enabled: true,
                constructor: Arc::new(constructor),
            },
        );
    }

    /// Enables or disables an override. Returns `false` if it does not exist.
    pub fn set_override_enabled(&mut self, base: &str, name: &str, enabled: bool) -> bool {
        let Some(entry) = self
            .overrides
            .get_mut(base)
            .and_then(|list| list.iter_mut().find(|o| o.name == name))
        else {
            return false;
        };
        entry.enabled = enabled;
        log::debug!("Override '{name}' for '{base}' enabled = {enabled}");
        true
    }

    /// Removes every override registered for `base`.
    pub fn clear_overrides(&mut self, base: &str) {
        self.overrides.remove(base);
    }

    /// Constructs a value for `name`, preferring enabled overrides.
    #[must_use]
    pub fn create(&self, name: &str) -> Option<T> {
        let overridden = self
            .overrides
            .get(name)
            .and_then(|list| list.iter().find(|o| o.enabled));
        match overridden {
            Some(entry) => Some((entry.constructor)()),
            None => self.constructors.get(name).map(|ctor| ctor()),
        }
    }

    /// Returns `true` if `name` has a base constructor.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Names with a base constructor, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.constructors.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Describes every registered override.
    #[must_use]
    pub fn override_info(&self) -> Vec<OverrideInfo> {
        let mut info: Vec<_> = self
            .overrides
            .iter()
            .flat_map(|(base, list)| {
                list.iter().map(move |o| OverrideInfo {
                    base: *base,
                    name: o.name,
                    description: o.description,
                    enabled: o.enabled,
                })
            })
            .collect();
        info.sort_by(|a, b| (a.base, a.name).cmp(&(b.base, b.name)));
        info
    }

    /// Number of base constructors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns `true` if no base constructor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}
