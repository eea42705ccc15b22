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


use super::{CompositeData, CompositeSlot};
use crate::amr::AmrData;
use crate::object::{DataHandle, DataKind, DataObject};
use std::iter::FusedIterator;
use tributary_core::Information;

/// Traversal switches for a [`CompositeIter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterOptions {
    /// Skip empty slots.
    pub skip_empty: bool,
    /// Yield only non-composite children.
    pub leaves_only: bool,
    /// Descend into nested composites.
    pub traverse_subtree: bool,
}

impl Default for IterOptions {
    fn default() -> Self {
        Self {
            skip_empty: true,
            leaves_only: true,
            traverse_subtree: true,
        }
    }
}

impl IterOptions {
    /// Visits every slot, empty and composite ones included.
    pub fn everything() -> Self {
        Self {
            skip_empty: false,
            leaves_only: false,
            traverse_subtree: true,
        }
    }

    /// Only the direct children of the root.
    pub fn direct_children() -> Self {
        Self {
            skip_empty: true,
            leaves_only: false,
            traverse_subtree: false,
        }
    }
}

/// One visited slot.
#[derive(Debug, Clone, Copy)]
pub struct CompositeItem<'a> {
    /// Pre-order position in the whole tree; the root is 0. Stable for a
    /// given structure whatever the options.
    pub flat_index: usize,
    /// AMR level, or nesting depth for other containers.
    pub level: usize,
    /// Position within the level or parent.
    pub index: usize,
    /// The child, `None` for an empty slot.
    pub data: Option<&'a DataHandle>,
    /// Slot metadata (absent for AMR blocks).
    pub metadata: Option<&'a Information>,
}

#[derive(Clone, Copy)]
enum Frame<'a> {
    Slots {
        slots: &'a [CompositeSlot],
        depth: usize,
        next: usize,
    },
    Amr {
        amr: &'a AmrData,
        level: usize,
        index: usize,
    },
}

struct Step<'a> {
    level: usize,
    index: usize,
    data: Option<&'a DataHandle>,
    metadata: Option<&'a Information>,
}

impl<'a> Frame<'a> {
    fn for_object(object: &'a DataObject, depth: usize) -> Option<Self> {
        match object.kind() {
            DataKind::Composite(c) => Some(Self::for_composite(c, depth)),
            DataKind::Amr(a) => Some(Self::for_amr(a)),
            _ => None,
        }
    }

    fn for_composite(composite: &'a CompositeData, depth: usize) -> Self {
        Frame::Slots {
            slots: composite.slots(),
            depth,
            next: 0,
        }
    }

    fn for_amr(amr: &'a AmrData) -> Self {
        Frame::Amr {
            amr,
            level: 0,
            index: 0,
        }
    }

    fn advance(&mut self) -> Option<Step<'a>> {
        match self {
            Frame::Slots { slots, depth, next } => {
                let slot = slots.get(*next)?;
                let step = Step {
                    level: *depth,
                    index: *next,
                    data: slot.data(),
                    metadata: Some(slot.metadata()),
                };
                *next += 1;
                Some(step)
            }
            Frame::Amr { amr, level, index } => loop {
                if *level >= amr.number_of_levels() {
                    return None;
                }
                if *index < amr.number_of_blocks(*level) {
                    let step = Step {
                        level: *level,
                        index: *index,
                        data: amr.block(*level, *index),
                        metadata: None,
                    };
                    *index += 1;
                    return Some(step);
                }
                *level += 1;
                *index = 0;
            },
        }
    }
}

/// Number of slots below `object`, empty ones included.
fn subtree_size(object: &DataObject) -> usize {
    match object.kind() {
        DataKind::Composite(c) => c
            .slots()
            .iter()
            .map(|s| 1 + s.data().map_or(0, |d| subtree_size(d)))
            .sum(),
        DataKind::Amr(a) => a.total_blocks(),
        _ => 0,
    }
}

/// A lazy, restartable walk over a composite tree.
///
/// Children are visited level-major, then by index; each slot is visited at
/// most once per pass.
pub struct CompositeIter<'a> {
    root: Option<Frame<'a>>,
    options: IterOptions,
    stack: Vec<Frame<'a>>,
    next_flat: usize,
}

impl<'a> CompositeIter<'a> {
    /// Walks the children of `root`. A leaf root yields nothing.
    pub fn new(root: &'a DataObject, options: IterOptions) -> Self {
        Self::from_frame(Frame::for_object(root, 0), options)
    }

    /// Walks the children of a bare composite payload.
    pub fn over_composite(root: &'a CompositeData, options: IterOptions) -> Self {
        Self::from_frame(Some(Frame::for_composite(root, 0)), options)
    }

    /// Walks the blocks of a bare AMR payload.
    pub fn over_amr(root: &'a AmrData, options: IterOptions) -> Self {
        Self::from_frame(Some(Frame::for_amr(root)), options)
    }

    fn from_frame(root: Option<Frame<'a>>, options: IterOptions) -> Self {
        let mut iter = Self {
            root,
            options,
            stack: Vec::new(),
            next_flat: 1,
        };
        iter.restart();
        iter
    }

    /// Goes back to the first child.
    pub fn restart(&mut self) {
        self.stack.clear();
        self.stack.extend(self.root);
        self.next_flat = 1;
    }

    /// The options in use.
    pub fn options(&self) -> IterOptions {
        self.options
    }
}

impl<'a> Iterator for CompositeIter<'a> {
    type Item = CompositeItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let step = self.stack.last_mut()?.advance();
            let Some(step) = step else {
                self.stack.pop();
                continue;
            };
            let flat_index = self.next_flat;
            self.next_flat += 1;

            let item = CompositeItem {
                flat_index,
                level: step.level,
                index: step.index,
                data: step.data,
                metadata: step.metadata,
            };

            let Some(handle) = step.data else {
                if self.options.skip_empty {
                    continue;
                }
                return Some(item);
            };

            let object: &'a DataObject = handle;
            if let Some(frame) = Frame::for_object(object, self.stack.len()) {
                if self.options.traverse_subtree {
                    self.stack.push(frame);
                } else {
                    self.next_flat += subtree_size(object);
                }
                if self.options.leaves_only {
                    continue;
                }
            }
            return Some(item);
        }
    }
}

impl FusedIterator for CompositeIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::CompositeKind;
    use crate::object::DataObjectType;

    fn leaf() -> Option<DataHandle> {
        Some(DataHandle::new(DataObject::of_type(DataObjectType::ImageGrid)))
    }

    /// root: [leaf, empty, [leaf, leaf], leaf]
    fn tree() -> DataObject {
        let mut inner = DataObject::of_type(DataObjectType::MultiBlock);
        let c = inner.as_composite_mut().unwrap();
        c.append_child(leaf()).unwrap();
        c.append_child(leaf()).unwrap();

        let mut root = DataObject::of_type(DataObjectType::MultiBlock);
        let c = root.as_composite_mut().unwrap();
        c.append_child(leaf()).unwrap();
        c.append_child(None).unwrap();
        c.append_child(Some(DataHandle::new(inner))).unwrap();
        c.append_child(leaf()).unwrap();
        root
    }

    fn flat(iter: CompositeIter<'_>) -> Vec<usize> {
        iter.map(|item| item.flat_index).collect()
    }

    #[test]
    fn default_visits_leaves_once() {
        let root = tree();
        assert_eq!(flat(root.composite_iter(IterOptions::default())), vec![1, 4, 5, 6]);
    }

    #[test]
    fn everything_includes_empty_and_inner_nodes() {
        let root = tree();
        let items: Vec<_> = root.composite_iter(IterOptions::everything()).collect();
        assert_eq!(
            items.iter().map(|i| i.flat_index).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );
        assert!(items[1].data.is_none());
        assert_eq!(items[3].level, 1);
    }

    #[test]
    fn flat_indices_are_stable_without_descent() {
        let root = tree();
        assert_eq!(flat(root.composite_iter(IterOptions::direct_children())), vec![1, 3, 6]);
    }

    #[test]
    fn restart_replays_the_walk() {
        let root = tree();
        let mut iter = root.composite_iter(IterOptions::default());
        let first: Vec<_> = iter.by_ref().map(|i| i.flat_index).collect();
        assert!(iter.next().is_none());

        iter.restart();
        let second: Vec<_> = iter.map(|i| i.flat_index).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn leaf_root_yields_nothing() {
        let root = DataObject::of_type(DataObjectType::Table);
        assert_eq!(root.composite_iter(IterOptions::everything()).count(), 0);
    }

    #[test]
    fn bare_payload_iteration() {
        let mut pieces = crate::composite::CompositeData::new(CompositeKind::MultiPiece);
        pieces.append_child(leaf()).unwrap();
        pieces.append_child(None).unwrap();
        assert_eq!(pieces.iter(IterOptions::default()).count(), 1);
        assert_eq!(pieces.number_of_leaves(), 1);
    }
}
