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

use crate::bulk;
use crate::entry::{HandleArena, ItemHandle};
use crate::error::{QuadtreeError, QuadtreeResult};
use crate::geometry::Rectangle;
use crate::iter::{AllItems, QueryIter};
use crate::node::NodeArena;
use crate::shape::{QueryRegion, ShapePolicy};
use crate::types::{HandleKey, NodeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

/// A snapshot of a tree's current shape, for diagnostics and tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    /// Number of live nodes (leaf and internal) in the tree.
    pub node_count: usize,
    /// Depth of the deepest leaf below the root.
    pub max_depth: usize,
    /// Number of items currently indexed.
    pub item_count: usize,
}

/// A dynamic, in-memory region quadtree.
///
/// `Index<T, S>` is parameterized over
///  - `T`, the item type being stored, and
///  - `S`, a [`ShapePolicy<T>`] that tells the tree how to test `T` for
///    containment and intersection.
///
/// Two policies ship with the crate: [`crate::shape::RectShape`] for items
/// with a rectangular footprint (`T: HasRect`), and
/// [`crate::shape::PointShape`] for items that are themselves points
/// (`T: HasPoint`).
///
/// `T` must be `Eq + Hash + Clone`: a reverse lookup from item to handle is
/// kept alongside the tree so `contains`/`remove`/`move_item` can address an
/// item by value, and queries hand back owned clones rather than borrows tied
/// to an internal lock.
///
/// ```
/// use region_quadtree::{HasRect, Index, Rectangle, RectShape};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// struct Fence(Rectangle);
/// impl HasRect for Fence {
///     fn rect(&self) -> Rectangle {
///         self.0
///     }
/// }
///
/// let mut idx = Index::<Fence, RectShape>::new(Rectangle::new(0.0, 0.0, 100.0, 100.0));
/// idx.add(Fence(Rectangle::new(1.0, 1.0, 2.0, 2.0))).unwrap();
/// assert_eq!(idx.len(), 1);
/// assert_eq!(idx.count(Rectangle::new(0.0, 0.0, 10.0, 10.0)), 1);
/// ```
pub struct Index<T, S> {
    arena: NodeArena,
    handles: HandleArena<T>,
    by_item: HashMap<T, HandleKey>,
    root: NodeId,
    thread_level: u32,
    _s: PhantomData<S>,
}

impl<T, S> Index<T, S> {
    /// Creates a new, empty index covering `rect`.
    ///
    /// `thread_level` defaults to the number of available CPUs and governs
    /// how much the bulk loader (see [`Self::add_bulk`]) fans out; override
    /// it with [`Self::with_thread_level`].
    pub fn new(rect: Rectangle) -> Self {
        let (arena, root) = NodeArena::new(rect);
        Self {
            arena,
            handles: HandleArena::new(),
            by_item: HashMap::new(),
            root,
            thread_level: std::thread::available_parallelism()
                .map(|n| n.get() as u32)
                .unwrap_or(1),
            _s: PhantomData,
        }
    }

    /// Overrides the bulk loader's fan-out width. A level of `0` or `1`
    /// disables parallelism.
    pub fn with_thread_level(mut self, thread_level: u32) -> Self {
        self.thread_level = thread_level;
        self
    }

    /// The region this index covers.
    pub fn rect(&self) -> Rectangle {
        self.arena.rect(self.root)
    }

    /// Number of items currently indexed.
    pub fn len(&self) -> usize {
        self.by_item.len()
    }

    /// Whether the index holds no items.
    pub fn is_empty(&self) -> bool {
        self.by_item.is_empty()
    }

    /// A snapshot of the tree's current node count, depth, and item count.
    pub fn tree_stats(&self) -> TreeStats {
        TreeStats {
            node_count: self.arena.live_node_count(),
            max_depth: self.arena.max_depth(self.root),
            item_count: self.by_item.len(),
        }
    }
}

impl<T: Eq + Hash, S> Index<T, S> {
    /// Whether `item` is currently indexed.
    pub fn contains(&self, item: &T) -> bool {
        self.by_item.contains_key(item)
    }
}

impl<T: Eq + Hash + Clone, S: ShapePolicy<T>> Index<T, S> {
    /// Indexes `item`. Fails with [`QuadtreeError::DuplicateInsert`] if an
    /// equal item is already present.
    ///
    /// An item whose footprint falls entirely outside the index's region is
    /// still accepted — it's kept directly at the root, per the root
    /// exception described in the crate's design notes — rather than
    /// rejected, so a single outlier can't make the whole index unusable.
    pub fn add(&mut self, item: T) -> QuadtreeResult<()> {
        if self.by_item.contains_key(&item) {
            return Err(QuadtreeError::DuplicateInsert);
        }
        let key = self.handles.insert(ItemHandle::new(item.clone(), self.root));
        self.by_item.insert(item, key);
        self.arena
            .insert::<T, S>(self.root, self.root, key, &self.handles, true);
        Ok(())
    }

    /// Indexes every item in `items`, skipping (and not counting) any already
    /// present. Returns the number actually added.
    pub fn add_range(&mut self, items: impl IntoIterator<Item = T>) -> usize {
        items
            .into_iter()
            .filter(|item| self.add(item.clone()).is_ok())
            .count()
    }

    /// Loads `items` via the one-pass parallel bulk loader instead of one
    /// incremental insert per item.
    ///
    /// Requires the index to currently be empty — [`QuadtreeError::BulkPreconditionViolated`]
    /// otherwise. Bulk-loading into a populated index would require merging
    /// the new batch's Morton ordering with the existing tree's shape, which
    /// this loader doesn't attempt; add the items incrementally instead, or
    /// drain the index first with [`Self::clear`].
    pub fn add_bulk(&mut self, items: Vec<T>) -> QuadtreeResult<()> {
        if !self.arena.is_leaf(self.root) || !self.arena.node(self.root).items().is_empty() {
            return Err(QuadtreeError::BulkPreconditionViolated);
        }
        let mut keys = Vec::with_capacity(items.len());
        for item in items {
            if self.by_item.contains_key(&item) {
                return Err(QuadtreeError::DuplicateInsert);
            }
            let key = self.handles.insert(ItemHandle::new(item.clone(), self.root));
            self.by_item.insert(item, key);
            keys.push(key);
        }
        bulk::bulk_build::<T, S>(&mut self.arena, &self.handles, self.root, keys, self.thread_level);
        Ok(())
    }

    /// Removes `item` if present. Returns whether it was found.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.by_item.remove(item) {
            Some(key) => {
                let owner = self
                    .handles
                    .owner(key)
                    .expect("an item tracked by by_item always has a live handle");
                self.handles.remove(key);
                let removed = self.arena.remove_local(owner, key);
                debug_assert!(
                    removed,
                    "by_item and the node arena disagree about an item's owner"
                );
                self.arena.condense_upwards::<T, S>(owner, &self.handles);
                true
            }
            None => false,
        }
    }

    /// Removes every item matching `query`, returning the removed items.
    pub fn remove_region(&mut self, query: impl Into<QueryRegion>) -> Vec<T> {
        let matched = self.query_to_vec(query);
        for item in &matched {
            self.remove(item);
        }
        matched
    }

    /// Removes every item for which `predicate` returns `true`. Returns
    /// whether any were removed.
    ///
    /// Two-phase, like [`Self::remove_region`]: the matching set is gathered
    /// before any removal starts, so `predicate` never observes a partially
    /// mutated tree. Each match is then removed (and its former owner
    /// condensed) one at a time rather than batched, since this crate's
    /// single-writer model (see the crate's concurrency design notes) leaves
    /// nothing for a background task to overlap with the map erase.
    pub fn remove_all(&mut self, mut predicate: impl FnMut(&T) -> bool) -> bool {
        let matched: Vec<T> = self.to_vec().into_iter().filter(|item| predicate(item)).collect();
        let any_removed = !matched.is_empty();
        for item in &matched {
            self.remove(item);
        }
        any_removed
    }

    /// Replaces `old` with `new`, re-homing it in the tree to match `new`'s
    /// footprint. Returns whether `old` was found.
    pub fn move_item(&mut self, old: &T, new: T) -> bool {
        match self.by_item.remove(old) {
            Some(key) => {
                self.handles.set_data(key, new.clone());
                self.by_item.insert(new, key);
                self.arena.relocate::<T, S>(key, self.root, &self.handles);
                true
            }
            None => false,
        }
    }

    /// Empties the index, keeping its covered region.
    pub fn clear(&mut self) {
        let rect = self.arena.rect(self.root);
        let (arena, root) = NodeArena::new(rect);
        self.arena = arena;
        self.root = root;
        self.handles.clear();
        self.by_item.clear();
    }

    /// Number of items matching `query`.
    pub fn count(&self, query: impl Into<QueryRegion>) -> usize {
        self.arena
            .query_count::<T, S>(self.root, query.into(), &self.handles)
    }

    /// Clones of every item matching `query`.
    pub fn query_to_vec(&self, query: impl Into<QueryRegion>) -> Vec<T> {
        let mut out = Vec::new();
        self.arena
            .query_list::<T, S>(self.root, query.into(), &self.handles, &mut out);
        out
    }

    /// Calls `visit` on every item matching `query`.
    pub fn query_visit(&self, query: impl Into<QueryRegion>, mut visit: impl FnMut(&T)) {
        self.arena
            .query_visit::<T, S>(self.root, query.into(), &self.handles, &mut visit);
    }

    /// As [`Self::query_visit`], threading a caller-owned `payload` through
    /// every call instead of requiring `visit` to capture it.
    pub fn query_visit_with<P>(
        &self,
        query: impl Into<QueryRegion>,
        payload: &mut P,
        mut visit: impl FnMut(&T, &mut P),
    ) {
        self.arena
            .query_visit_with::<T, S, P>(self.root, query.into(), &self.handles, payload, &mut visit);
    }

    /// Writes clones of every item matching `query` into `buf`. Returns the
    /// number written.
    ///
    /// # Panics
    /// Panics if more matching items exist than `buf` can hold.
    pub fn query_fill(&self, query: impl Into<QueryRegion>, buf: &mut [T]) -> usize {
        self.arena
            .query_fill::<T, S>(self.root, query.into(), &self.handles, buf, 0)
    }

    /// A lazy iterator over items matching `query`.
    ///
    /// Prefer this over [`Self::query_to_vec`] when the caller may stop
    /// early, since it never materializes more of the tree than it has to.
    pub fn query_iter(&self, query: impl Into<QueryRegion>) -> QueryIter<'_, T, S> {
        QueryIter::new(&self.arena, &self.handles, self.root, query.into())
    }

    /// An iterator over every indexed item, in no particular order.
    pub fn iter(&self) -> AllItems<'_, T> {
        AllItems::new(&self.handles, self.by_item.values().copied().collect())
    }

    /// Clones of every indexed item, in no particular order.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// An indented textual dump of the tree's current shape: one line per
    /// node giving its rect and local item count. Diagnostic/test tooling
    /// only, not part of the crate's data model.
    pub fn debug_tree(&self) -> String {
        let mut out = String::new();
        self.arena.debug_fmt(self.root, 0, &mut out);
        out
    }
}
