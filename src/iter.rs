// Copyright 2019 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Lazy iterators over an [`crate::index::Index`]'s contents.
//!
//! [`QueryIter`] is the lazy form of `query_list`: it keeps two explicit work
//! stacks, one of nodes already known to be fully inside the query region and
//! one of nodes that still need a per-item filter, so that once a
//! fully-contained subtree is entered every one of its items is drained
//! before the iterator returns to partial-overlap work.

use crate::entry::HandleArena;
use crate::node::NodeArena;
use crate::shape::{QueryRegion, ShapePolicy};
use crate::types::{HandleKey, NodeId};
use std::iter::FusedIterator;
use std::marker::PhantomData;

/// Iterator returned by `Index::query_iter`.
pub struct QueryIter<'a, T, S> {
    arena: &'a NodeArena,
    handles: &'a HandleArena<T>,
    query: QueryRegion,
    fully_nodes: Vec<NodeId>,
    mixed_nodes: Vec<NodeId>,
    fully_items: Vec<HandleKey>,
    mixed_items: Vec<HandleKey>,
    _s: PhantomData<S>,
}

impl<'a, T, S: ShapePolicy<T>> QueryIter<'a, T, S> {
    pub(crate) fn new(arena: &'a NodeArena, handles: &'a HandleArena<T>, root: NodeId, query: QueryRegion) -> Self {
        Self {
            arena,
            handles,
            query,
            fully_nodes: Vec::new(),
            mixed_nodes: vec![root],
            fully_items: Vec::new(),
            mixed_items: Vec::new(),
            _s: PhantomData,
        }
    }
}

impl<'a, T: Clone, S: ShapePolicy<T>> Iterator for QueryIter<'a, T, S> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(key) = self.fully_items.pop() {
                if let Some(v) = self.handles.data(key) {
                    return Some(v);
                }
                continue;
            }

            if let Some(id) = self.fully_nodes.pop() {
                self.fully_items
                    .extend(self.arena.node(id).items().iter().copied());
                if let Some(children) = self.arena.node(id).children() {
                    self.fully_nodes.extend(children);
                }
                continue;
            }

            while let Some(key) = self.mixed_items.pop() {
                if let Some(matched) = self.handles.with_data(key, |item| {
                    if S::query_intersects_item(self.query, item) {
                        Some(item.clone())
                    } else {
                        None
                    }
                }) {
                    if let Some(v) = matched {
                        return Some(v);
                    }
                }
            }

            if let Some(id) = self.mixed_nodes.pop() {
                let rect = self.arena.rect(id);
                if S::query_contains_node(self.query, rect) {
                    self.fully_nodes.push(id);
                    continue;
                }
                if !S::query_intersects_node(self.query, rect) {
                    continue;
                }
                self.mixed_items
                    .extend(self.arena.node(id).items().iter().copied());
                if let Some(children) = self.arena.node(id).children() {
                    self.mixed_nodes.extend(children);
                }
                continue;
            }

            return None;
        }
    }
}

impl<'a, T: Clone, S: ShapePolicy<T>> FusedIterator for QueryIter<'a, T, S> {}

/// Iterator over every item in an [`crate::index::Index`], in no particular
/// order. Returned by `Index::iter`.
pub struct AllItems<'a, T> {
    handles: &'a HandleArena<T>,
    remaining: Vec<HandleKey>,
}

impl<'a, T> AllItems<'a, T> {
    pub(crate) fn new(handles: &'a HandleArena<T>, keys: Vec<HandleKey>) -> Self {
        Self {
            handles,
            remaining: keys,
        }
    }
}

impl<'a, T: Clone> Iterator for AllItems<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while let Some(key) = self.remaining.pop() {
            if let Some(v) = self.handles.data(key) {
                return Some(v);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining.len()))
    }
}

impl<'a, T: Clone> FusedIterator for AllItems<'a, T> {}
