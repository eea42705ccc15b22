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


//! Annotation layers: labelled selections with a "current" annotation.

use crate::error::DataError;
use crate::object::DeepClone;
use serde::{Deserialize, Serialize};
use tributary_core::Information;

/// Generational handle to an [`Annotation`] inside an [`AnnotationLayers`].
///
/// A handle to a removed annotation stays stale even after its slot is
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationId {
    /// Slot index.
    pub index: u32,
    /// Incremented every time the slot is reused.
    pub generation: u32,
}

/// A labelled selection of element ids.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Annotation {
    /// Display label.
    pub label: String,
    /// Disabled annotations are kept but ignored by consumers.
    pub enabled: bool,
    /// Optional RGB color.
    pub color: Option<[f64; 3]>,
    /// Selected element ids.
    pub selection: Vec<usize>,
    /// Free-form metadata.
    pub information: Information,
}

impl Annotation {
    /// An enabled annotation selecting `selection`.
    pub fn new(label: impl Into<String>, selection: Vec<usize>) -> Self {
        Self {
            label: label.into(),
            enabled: true,
            color: None,
            selection,
            information: Information::new(),
        }
    }
}

/// An ordered set of annotations plus a non-owning "current" handle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotationLayers {
    slots: Vec<(AnnotationId, Option<Annotation>)>,
    freed: Vec<u32>,
    order: Vec<AnnotationId>,
    current: Option<AnnotationId>,
}

impl AnnotationLayers {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `annotation`, reusing a freed slot when one exists.
    pub fn add_annotation(&mut self, annotation: Annotation) -> AnnotationId {
        let id = if let Some(index) = self.freed.pop() {
            let (slot_id, slot) = &mut self.slots[index as usize];
            slot_id.generation += 1;
            *slot = Some(annotation);
            *slot_id
        } else {
            let id = AnnotationId {
                index: self.slots.len() as u32,
                generation: 0,
            };
            self.slots.push((id, Some(annotation)));
            id
        };
        self.order.push(id);
        id
    }

    /// Removes an annotation. Clears the current handle if it pointed there.
    pub fn remove_annotation(&mut self, id: AnnotationId) -> Option<Annotation> {
        let (slot_id, slot) = self.slots.get_mut(id.index as usize)?;
        if *slot_id != id {
            return None;
        }
        let removed = slot.take()?;
        self.freed.push(id.index);
        self.order.retain(|o| *o != id);
        if self.current == Some(id) {
            self.current = None;
        }
        Some(removed)
    }

    /// The annotation behind `id`, `None` when stale.
    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.slots
            .get(id.index as usize)
            .and_then(|(slot_id, slot)| if *slot_id == id { slot.as_ref() } else { None })
    }

    /// Mutable access to the annotation behind `id`.
    pub fn annotation_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.slots
            .get_mut(id.index as usize)
            .and_then(|(slot_id, slot)| if *slot_id == id { slot.as_mut() } else { None })
    }

    /// Number of live annotations.
    pub fn number_of_annotations(&self) -> usize {
        self.order.len()
    }

    /// Live annotations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (AnnotationId, &Annotation)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.annotation(id).map(|a| (id, a)))
    }

    /// Points the current handle at `id`.
    pub fn set_current(&mut self, id: Option<AnnotationId>) -> Result<(), DataError> {
        if let Some(id) = id {
            if self.annotation(id).is_none() {
                return Err(DataError::StaleAnnotation);
            }
        }
        self.current = id;
        Ok(())
    }

    /// The current annotation, if it is still alive.
    pub fn current(&self) -> Option<&Annotation> {
        self.current.and_then(|id| self.annotation(id))
    }

    /// The current handle.
    pub fn current_id(&self) -> Option<AnnotationId> {
        self.current
    }

    /// Union of the selections of all enabled annotations, sorted.
    pub fn combined_selection(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .iter()
            .filter(|(_, a)| a.enabled)
            .flat_map(|(_, a)| a.selection.iter().copied())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Removes every annotation.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl DeepClone for AnnotationLayers {
    fn deep_clone(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_handles_do_not_resolve() {
        let mut layers = AnnotationLayers::new();
        let a = layers.add_annotation(Annotation::new("a", vec![1, 2]));
        layers.remove_annotation(a).unwrap();
        let b = layers.add_annotation(Annotation::new("b", vec![3]));

        assert_eq!(a.index, b.index);
        assert_ne!(a.generation, b.generation);
        assert!(layers.annotation(a).is_none());
        assert_eq!(layers.annotation(b).unwrap().label, "b");
        assert_eq!(layers.set_current(Some(a)), Err(DataError::StaleAnnotation));
    }

    #[test]
    fn current_is_cleared_on_removal() {
        let mut layers = AnnotationLayers::new();
        let a = layers.add_annotation(Annotation::new("a", vec![1]));
        layers.set_current(Some(a)).unwrap();
        assert_eq!(layers.current().unwrap().label, "a");

        layers.remove_annotation(a);
        assert!(layers.current().is_none());
        assert!(layers.current_id().is_none());
    }

    #[test]
    fn combined_selection_skips_disabled() {
        let mut layers = AnnotationLayers::new();
        layers.add_annotation(Annotation::new("a", vec![3, 1]));
        let b = layers.add_annotation(Annotation::new("b", vec![1, 7]));
        layers.add_annotation(Annotation::new("c", vec![9]));
        layers.annotation_mut(b).unwrap().enabled = false;

        assert_eq!(layers.combined_selection(), vec![1, 3, 9]);
        let labels: Vec<&str> = layers.iter().map(|(_, a)| a.label.as_str()).collect();
        assert_eq!(labels, ["a", "b", "c"]);
    }
}
