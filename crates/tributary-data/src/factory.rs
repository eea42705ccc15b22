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


//! Construction of data objects by type name.

use crate::object::{DataObject, DataObjectType};
use tributary_core::registry::{FactoryRegistry, OverrideInfo};

/// Creates empty data objects by type, honouring registered overrides.
///
/// Every [`DataObjectType`] is registered under its name. An override must
/// produce an object of the type it replaces; one that does not is ignored.
#[derive(Debug)]
pub struct DataObjectFactory {
    registry: FactoryRegistry<DataObject>,
}

impl Default for DataObjectFactory {
    fn default() -> Self {
        let mut registry = FactoryRegistry::new();
        for data_type in DataObjectType::ALL {
            registry.register(data_type.name(), move || DataObject::of_type(data_type));
        }
        Self { registry }
    }
}

impl DataObjectFactory {
    /// A factory knowing every built-in type.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an object from its type name.
    pub fn create(&self, name: &str) -> Option<DataObject> {
        self.registry.create(name)
    }

    /// Creates an object of `data_type`.
    pub fn create_type(&self, data_type: DataObjectType) -> DataObject {
        match self.registry.create(data_type.name()) {
            Some(object) if object.data_type() == data_type => object,
            Some(object) => {
                log::warn!(
                    "Override for '{data_type}' produced a '{}'; using the built-in type",
                    object.data_type()
                );
                DataObject::of_type(data_type)
            }
            None => DataObject::of_type(data_type),
        }
    }

    /// Registers an enabled override for the type named `base`.
    pub fn register_override<F>(
        &mut self,
        base: &'static str,
        name: &'static str,
        description: &'static str,
        constructor: F,
    ) where
        F: Fn() -> DataObject + Send + Sync + 'static,
    {
        self.registry
            .register_override(base, name, description, constructor);
    }

    /// Enables or disables an override; `false` if it does not exist.
    pub fn set_override_enabled(&mut self, base: &str, name: &str, enabled: bool) -> bool {
        self.registry.set_override_enabled(base, name, enabled)
    }

    /// Every registered override.
    #[must_use]
    pub fn override_info(&self) -> Vec<OverrideInfo> {
        self.registry.override_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ImageGrid;
    use crate::object::DataKind;
    use tributary_core::Extent;

    #[test]
    fn creates_every_builtin_type() {
        let factory = DataObjectFactory::new();
        for data_type in DataObjectType::ALL {
            assert_eq!(factory.create_type(data_type).data_type(), data_type);
            assert!(factory.create(data_type.name()).is_some());
        }
        assert!(factory.create("NoSuchType").is_none());
    }

    #[test]
    fn overrides_can_be_toggled() {
        // --- 1. ARRANGE ---
        let mut factory = DataObjectFactory::new();
        factory.register_override("ImageGrid", "unit-image", "a 2x2 grid", || {
            DataObject::new(DataKind::ImageGrid(ImageGrid::new(
                Extent::new(0, 1, 0, 1, 0, 0),
                [0.0; 3],
                [1.0; 3],
            )))
        });

        // --- 2. ACT & ASSERT ---
        let image = factory.create_type(DataObjectType::ImageGrid);
        assert_eq!(image.as_image_grid().unwrap().number_of_points(), 4);

        assert!(factory.set_override_enabled("ImageGrid", "unit-image", false));
        let image = factory.create_type(DataObjectType::ImageGrid);
        assert_eq!(image.as_image_grid().unwrap().number_of_points(), 0);
        assert_eq!(factory.override_info().len(), 1);
    }

    #[test]
    fn mistyped_override_is_ignored() {
        let mut factory = DataObjectFactory::new();
        factory.register_override("Table", "bad", "wrong type", || {
            DataObject::of_type(DataObjectType::Graph)
        });
        assert_eq!(
            factory.create_type(DataObjectType::Table).data_type(),
            DataObjectType::Table
        );
    }
}
