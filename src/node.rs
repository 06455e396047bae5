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

//! [`Node`], the tree's internal cell, and [`NodeArena`], the slab that owns
//! them.
//!
//! Nodes address their parent and children by [`NodeId`] rather than by
//! `Box`/`Rc`, so a node can hold a back-pointer to its parent without a
//! reference cycle. All structural algorithms — insert, subdivide, condense,
//! relocate, and the four query traversals — live here as methods on
//! [`NodeArena`] rather than on [`Node`] itself, since a recursive descent
//! needs `&mut` access to the whole arena, not just to one node.
//!
//! A node never attempts to rebalance an already-subdivided subtree toward a
//! more even item distribution after a run of skewed inserts — condensation
//! (see [`NodeArena::condense_this`]) only ever shrinks, it never reshapes.
//! An equivalent heuristic existed but was inoperative upstream, so it's
//! intentionally not carried over here.

use crate::entry::HandleArena;
use crate::geometry::{Point, Rectangle};
use crate::shape::{QueryRegion, ShapePolicy};
use crate::types::{HandleKey, NodeId, MAX_ITEMS_PER_NODE, MAX_OPTIMIZE_DELETION_READD};

/// The four children of a subdivided node, in the order [`Rectangle::quarter_at`]
/// produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Quadrant {
    Northeast = 0,
    Northwest = 1,
    Southeast = 2,
    Southwest = 3,
}

/// A single cell of the tree.
///
/// `items` holds the handles whose footprint is fully inside `rect` but
/// doesn't fit uniquely inside any one child (or, for a leaf, all handles
/// stored at this level).
#[derive(Debug)]
pub(crate) struct Node {
    rect: Rectangle,
    parent: Option<NodeId>,
    children: Option<[NodeId; 4]>,
    items: Vec<HandleKey>,
}

impl Node {
    pub(crate) fn rect(&self) -> Rectangle {
        self.rect
    }

    pub(crate) fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn children(&self) -> Option<[NodeId; 4]> {
        self.children
    }

    pub(crate) fn items(&self) -> &[HandleKey] {
        &self.items
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// The slab that owns every [`Node`] in one tree, addressed by [`NodeId`].
pub(crate) struct NodeArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl NodeArena {
    /// Builds a fresh arena holding a single root node covering `rect`.
    pub(crate) fn new(rect: Rectangle) -> (Self, NodeId) {
        let mut arena = Self {
            slots: Vec::new(),
            free: Vec::new(),
        };
        let root = arena.alloc(rect, None);
        (arena, root)
    }

    pub(crate) fn alloc(&mut self, rect: Rectangle, parent: Option<NodeId>) -> NodeId {
        let node = Node {
            rect,
            parent,
            children: None,
            items: Vec::new(),
        };
        if let Some(slot) = self.free.pop() {
            let s = &mut self.slots[slot as usize];
            s.node = Some(node);
            NodeId {
                slot,
                generation: s.generation,
            }
        } else {
            let slot = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId { slot, generation: 0 }
        }
    }

    /// Turns the leaf `id` into an internal node with four fresh, empty
    /// children split at `mid`, without touching `id`'s existing items.
    /// Returns `None` (leaving `id` untouched) if `id`'s rect or `mid` is
    /// degenerate.
    pub(crate) fn split_at(&mut self, id: NodeId, mid: Point) -> Option<[NodeId; 4]> {
        let rect = self.rect(id);
        if !rect.is_finite()
            || rect.area() < crate::types::MIN_SPLIT_AREA
            || !mid.x.is_finite()
            || !mid.y.is_finite()
        {
            return None;
        }
        let quarters = rect.quarter_at(mid);
        let mut child_ids = [id; 4];
        for (i, quarter) in quarters.into_iter().enumerate() {
            child_ids[i] = self.alloc(quarter, Some(id));
        }
        self.node_mut(id).children = Some(child_ids);
        Some(child_ids)
    }

    /// Appends `key` to `id`'s own item list and records `id` as its owner,
    /// without any containment check. Used where the caller has already
    /// established `key` belongs directly at `id` (bulk-load leaves, and
    /// straddlers bucketed by the bulk loader).
    pub(crate) fn place_leaf_item<T>(&mut self, id: NodeId, key: HandleKey, handles: &HandleArena<T>) {
        self.node_mut(id).items.push(key);
        handles.set_owner(key, id);
    }

    /// Index (0..4) into `children` of the one child whose rect uniquely
    /// contains the item at `key`, or `None` if it straddles.
    pub(crate) fn bucket_index<T, S: ShapePolicy<T>>(
        &self,
        children: [NodeId; 4],
        handles: &HandleArena<T>,
        key: HandleKey,
    ) -> Option<usize> {
        let mut found = None;
        for (i, child) in children.into_iter().enumerate() {
            let rect = self.rect(child);
            let contains = handles
                .with_data(key, |item| S::node_contains_item(rect, item))
                .unwrap_or(false);
            if contains {
                if found.is_some() {
                    return None;
                }
                found = Some(i);
            }
        }
        found
    }

    fn free_one(&mut self, id: NodeId) {
        let s = &mut self.slots[id.slot as usize];
        debug_assert_eq!(s.generation, id.generation, "freeing a stale NodeId");
        s.node = None;
        s.generation = s.generation.wrapping_add(1);
        self.free.push(id.slot);
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        let s = &self.slots[id.slot as usize];
        debug_assert_eq!(s.generation, id.generation, "stale NodeId");
        s.node.as_ref().expect("NodeId refers to a freed slot")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        let s = &mut self.slots[id.slot as usize];
        debug_assert_eq!(s.generation, id.generation, "stale NodeId");
        s.node.as_mut().expect("NodeId refers to a freed slot")
    }

    pub(crate) fn rect(&self, id: NodeId) -> Rectangle {
        self.node(id).rect
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub(crate) fn children(&self, id: NodeId) -> Option<[NodeId; 4]> {
        self.node(id).children
    }

    pub(crate) fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).children.is_none()
    }

    /// Number of live (non-freed) slots in the arena — every node in the
    /// tree, leaf and internal alike.
    pub(crate) fn live_node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Greatest child-of-child depth under `id`, zero if `id` is a leaf.
    pub(crate) fn max_depth(&self, id: NodeId) -> usize {
        match self.node(id).children {
            None => 0,
            Some(children) => {
                1 + children
                    .iter()
                    .map(|&c| self.max_depth(c))
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// Sum of `items.len()` across `id`'s whole subtree. Used by condensation
    /// bookkeeping; unlike [`Self::all_items_count`] it does not stop early on
    /// an inconsistent owner, since it's never handed untrusted state.
    pub(crate) fn subtree_item_count(&self, id: NodeId) -> usize {
        let node = self.node(id);
        let mut total = node.items.len();
        if let Some(children) = node.children {
            for c in children {
                total += self.subtree_item_count(c);
            }
        }
        total
    }

    fn is_empty_leaf(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.children.is_none() && node.items.is_empty()
    }

    fn collect_subtree_items(&self, id: NodeId, out: &mut Vec<HandleKey>) {
        out.extend_from_slice(&self.node(id).items);
        if let Some(children) = self.node(id).children {
            for c in children {
                self.collect_subtree_items(c, out);
            }
        }
    }

    fn free_children_recursive(&mut self, id: NodeId) {
        if let Some(children) = self.node(id).children {
            for c in children {
                self.free_children_recursive(c);
                self.free_one(c);
            }
            self.node_mut(id).children = None;
        }
    }

    /// Among `children`, returns the one whose rect uniquely contains the
    /// item at `key`. `None` if zero or more than one child's rect contains
    /// it — either way the item stays (or ends up) at the parent level.
    fn unique_containing_child<T, S: ShapePolicy<T>>(
        &self,
        children: [NodeId; 4],
        handles: &HandleArena<T>,
        key: HandleKey,
    ) -> Option<NodeId> {
        let mut found = None;
        for child in children {
            let rect = self.rect(child);
            let contains = handles
                .with_data(key, |item| S::node_contains_item(rect, item))
                .unwrap_or(false);
            if contains {
                if found.is_some() {
                    return None;
                }
                found = Some(child);
            }
        }
        found
    }

    /// Inserts `key` into the subtree rooted at `id`, descending as far as a
    /// unique child will take it and subdividing leaves that overflow.
    ///
    /// `root` is the id at which an item whose footprint has drifted outside
    /// every rect in the tree is kept anyway, rather than forwarded further
    /// up a (nonexistent) parent.
    pub(crate) fn insert<T, S: ShapePolicy<T>>(
        &mut self,
        id: NodeId,
        root: NodeId,
        key: HandleKey,
        handles: &HandleArena<T>,
        can_subdivide: bool,
    ) {
        let rect = self.rect(id);
        let contains = handles
            .with_data(key, |item| S::node_contains_item(rect, item))
            .expect("handle key must be valid during insert");

        if !contains && id != root {
            let parent = self
                .parent(id)
                .expect("a non-root node always has a parent");
            return self.insert::<T, S>(parent, root, key, handles, can_subdivide);
        }

        if self.is_leaf(id) {
            if self.node(id).items.len() < MAX_ITEMS_PER_NODE || !can_subdivide {
                self.node_mut(id).items.push(key);
                handles.set_owner(key, id);
                return;
            }
            if !self.subdivide::<T, S>(id, handles, None) {
                self.node_mut(id).items.push(key);
                handles.set_owner(key, id);
                return;
            }
        }

        let children = self
            .node(id)
            .children
            .expect("leaf was just subdivided or was already internal");
        match self.unique_containing_child::<T, S>(children, handles, key) {
            Some(child) => self.insert::<T, S>(child, root, key, handles, can_subdivide),
            None => {
                self.node_mut(id).items.push(key);
                handles.set_owner(key, id);
            }
        }
    }

    /// Turns the leaf `id` into an internal node with four fresh children,
    /// redistributing its current items. Declines (returns `false`) if `id`'s
    /// rect (or the split point) is degenerate, leaving `id` a leaf.
    pub(crate) fn subdivide<T, S: ShapePolicy<T>>(
        &mut self,
        id: NodeId,
        handles: &HandleArena<T>,
        midpoint: Option<Point>,
    ) -> bool {
        let rect = self.rect(id);
        let mid = midpoint.unwrap_or_else(|| rect.center());
        let child_ids = match self.split_at(id, mid) {
            Some(c) => c,
            None => {
                log::trace!("declining to subdivide a degenerate rect {:?}", rect);
                return false;
            }
        };

        let old_items = std::mem::take(&mut self.node_mut(id).items);
        log::debug!(
            "subdividing node covering {:?}, redistributing {} items",
            rect,
            old_items.len()
        );
        for key in old_items {
            match self.unique_containing_child::<T, S>(child_ids, handles, key) {
                Some(child) => self.insert::<T, S>(child, child, key, handles, true),
                None => {
                    self.node_mut(id).items.push(key);
                    handles.set_owner(key, id);
                }
            }
        }
        true
    }

    /// Removes `key` from `owner`'s own item list (not recursing into
    /// children, since the caller already knows `owner` from the handle
    /// arena). Returns whether it was found.
    pub(crate) fn remove_local(&mut self, owner: NodeId, key: HandleKey) -> bool {
        let items = &mut self.node_mut(owner).items;
        if let Some(pos) = items.iter().position(|&k| k == key) {
            items.swap_remove(pos);
            true
        } else {
            false
        }
    }

    /// Walks up from `start`'s parent, attempting [`Self::condense_this`] at
    /// each ancestor, stopping at the first one that declines to restructure.
    pub(crate) fn condense_upwards<T, S: ShapePolicy<T>>(
        &mut self,
        start: NodeId,
        handles: &HandleArena<T>,
    ) {
        let mut current = self.parent(start);
        while let Some(id) = current {
            if !self.condense_this::<T, S>(id, handles) {
                break;
            }
            current = self.parent(id);
        }
    }

    /// Attempts to shrink the internal node `id`. Returns `true` if `id`'s
    /// structure changed (a signal to the caller that its parent may now be a
    /// condensation candidate too); `false` (a no-op) if `id` is already a
    /// leaf or none of the five cases apply.
    ///
    /// Cases, in order: (1) the whole subtree is small enough to flatten and
    /// rebuild regardless of shape; (2) all four children are empty leaves,
    /// so `id` becomes a leaf; (3) exactly one child is non-empty, so its
    /// grandchildren and items are promoted onto `id`; (4) the subtree is
    /// still under a looser rebuild threshold; (5) otherwise, no-op.
    pub(crate) fn condense_this<T, S: ShapePolicy<T>>(
        &mut self,
        id: NodeId,
        handles: &HandleArena<T>,
    ) -> bool {
        let children = match self.node(id).children {
            Some(c) => c,
            None => return false,
        };

        let total = self.subtree_item_count(id);
        if total <= MAX_ITEMS_PER_NODE {
            log::debug!("condensing node (tiny subtree, {} items) by rebuild", total);
            self.rebuild_flat::<T, S>(id, handles);
            return true;
        }

        let empty: Vec<bool> = children.iter().map(|&c| self.is_empty_leaf(c)).collect();
        let empty_count = empty.iter().filter(|b| **b).count();

        if empty_count == 4 {
            for c in children {
                self.free_one(c);
            }
            self.node_mut(id).children = None;
            log::debug!("condensing node: all four children empty");
            return true;
        }

        if empty_count == 3 {
            let nonempty = children[empty.iter().position(|b| !*b).unwrap()];
            let grandchildren = self.node(nonempty).children;
            let promoted = std::mem::take(&mut self.node_mut(nonempty).items);
            let keep_own_items = !self.node(id).items.is_empty();

            for c in children {
                if c != nonempty {
                    self.free_one(c);
                }
            }
            self.node_mut(id).children = grandchildren;
            if let Some(gc) = grandchildren {
                for g in gc {
                    self.node_mut(g).parent = Some(id);
                }
            }
            self.free_one(nonempty);

            if keep_own_items {
                for key in promoted {
                    self.insert::<T, S>(id, id, key, handles, true);
                }
            } else {
                for &key in &promoted {
                    handles.set_owner(key, id);
                }
                self.node_mut(id).items = promoted;
            }
            log::debug!("condensing node: promoting solitary non-empty child");
            return true;
        }

        if total < MAX_OPTIMIZE_DELETION_READD {
            log::debug!(
                "condensing node (subtree under rebuild threshold, {} items) by rebuild",
                total
            );
            self.rebuild_flat::<T, S>(id, handles);
            return true;
        }

        false
    }

    /// Collapses `id`'s whole subtree to a leaf, then re-adds every item it
    /// held via the bulk loader's recursive-quartering build, exactly as a
    /// fresh `add_bulk` on an empty node would.
    fn rebuild_flat<T, S: ShapePolicy<T>>(&mut self, id: NodeId, handles: &HandleArena<T>) {
        let mut items = Vec::new();
        self.collect_subtree_items(id, &mut items);
        self.free_children_recursive(id);
        self.node_mut(id).items.clear();
        crate::bulk::bulk_build::<T, S>(self, handles, id, items, 0);
    }

    /// Moves `key` to wherever its current footprint now belongs.
    ///
    /// Always removes the handle from its present owner before re-inserting
    /// it, so the old entry never survives alongside the new one: whatever
    /// the new footprint's relationship to the tree (still fits deeper in
    /// the same subtree, has drifted up past the old owner, or has drifted
    /// all the way outside the root), [`Self::insert`] re-derives the
    /// correct destination from scratch the same way a fresh `add` would.
    pub(crate) fn relocate<T, S: ShapePolicy<T>>(
        &mut self,
        key: HandleKey,
        root: NodeId,
        handles: &HandleArena<T>,
    ) {
        let owner = handles.owner(key).expect("relocate on an unknown handle");
        self.remove_local(owner, key);
        self.insert::<T, S>(owner, root, key, handles, true);
        self.condense_upwards::<T, S>(owner, handles);
    }

    // -- queries --

    /// Number of items matching `query`, dumping whole subtrees in one shot
    /// where `query` fully contains a node's rect.
    pub(crate) fn query_count<T, S: ShapePolicy<T>>(
        &self,
        id: NodeId,
        query: QueryRegion,
        handles: &HandleArena<T>,
    ) -> usize {
        let rect = self.rect(id);
        if S::query_contains_node(query, rect) {
            return self.all_items_count(id, handles);
        }
        if !S::query_intersects_node(query, rect) {
            return 0;
        }
        let mut count = self
            .node(id)
            .items
            .iter()
            .filter(|&&k| {
                handles
                    .with_data(k, |item| S::query_intersects_item(query, item))
                    .unwrap_or(false)
            })
            .count();
        if let Some(children) = self.node(id).children {
            for c in children {
                count += self.query_count::<T, S>(c, query, handles);
            }
        }
        count
    }

    /// `subtree_item_count`'s query-path sibling: stops early in a node's own
    /// item list the moment an entry's recorded owner disagrees with `id`,
    /// mirroring the "all objects" guard used elsewhere for a dump-everything
    /// traversal.
    fn all_items_count<T>(&self, id: NodeId, handles: &HandleArena<T>) -> usize {
        let node = self.node(id);
        let mut n = 0;
        for &k in &node.items {
            if handles.owner(k) != Some(id) {
                break;
            }
            n += 1;
        }
        if let Some(children) = node.children {
            for c in children {
                n += self.all_items_count(c, handles);
            }
        }
        n
    }

    fn visit_all<T>(&self, id: NodeId, handles: &HandleArena<T>, visit: &mut dyn FnMut(&T)) {
        let node = self.node(id);
        for &k in &node.items {
            if handles.owner(k) != Some(id) {
                break;
            }
            handles.with_data(k, |item| visit(item));
        }
        if let Some(children) = node.children {
            for c in children {
                self.visit_all(c, handles, visit);
            }
        }
    }

    /// Invokes `visit` on every item matching `query`.
    pub(crate) fn query_visit<T, S: ShapePolicy<T>>(
        &self,
        id: NodeId,
        query: QueryRegion,
        handles: &HandleArena<T>,
        visit: &mut dyn FnMut(&T),
    ) {
        let rect = self.rect(id);
        if S::query_contains_node(query, rect) {
            self.visit_all(id, handles, visit);
            return;
        }
        if !S::query_intersects_node(query, rect) {
            return;
        }
        for &k in &self.node(id).items {
            handles.with_data(k, |item| {
                if S::query_intersects_item(query, item) {
                    visit(item);
                }
            });
        }
        if let Some(children) = self.node(id).children {
            for c in children {
                self.query_visit::<T, S>(c, query, handles, visit);
            }
        }
    }

    /// As [`Self::query_visit`], but threads a caller-owned payload through
    /// every call instead of requiring `visit` to capture it.
    pub(crate) fn query_visit_with<T, S: ShapePolicy<T>, P>(
        &self,
        id: NodeId,
        query: QueryRegion,
        handles: &HandleArena<T>,
        payload: &mut P,
        visit: &mut dyn FnMut(&T, &mut P),
    ) {
        let rect = self.rect(id);
        if S::query_contains_node(query, rect) {
            self.visit_all_with(id, handles, payload, visit);
            return;
        }
        if !S::query_intersects_node(query, rect) {
            return;
        }
        for &k in &self.node(id).items {
            handles.with_data(k, |item| {
                if S::query_intersects_item(query, item) {
                    visit(item, payload);
                }
            });
        }
        if let Some(children) = self.node(id).children {
            for c in children {
                self.query_visit_with::<T, S, P>(c, query, handles, payload, visit);
            }
        }
    }

    fn visit_all_with<T, P>(
        &self,
        id: NodeId,
        handles: &HandleArena<T>,
        payload: &mut P,
        visit: &mut dyn FnMut(&T, &mut P),
    ) {
        let node = self.node(id);
        for &k in &node.items {
            if handles.owner(k) != Some(id) {
                break;
            }
            handles.with_data(k, |item| visit(item, payload));
        }
        if let Some(children) = node.children {
            for c in children {
                self.visit_all_with(c, handles, payload, visit);
            }
        }
    }

    /// Appends clones of every item matching `query` to `out`.
    pub(crate) fn query_list<T: Clone, S: ShapePolicy<T>>(
        &self,
        id: NodeId,
        query: QueryRegion,
        handles: &HandleArena<T>,
        out: &mut Vec<T>,
    ) {
        self.query_visit::<T, S>(id, query, handles, &mut |item| out.push(item.clone()));
    }

    /// Writes an indented textual dump of the subtree rooted at `id` into
    /// `out`, one line per node: its rect, its own item count, and (for a
    /// leaf) nothing further. Diagnostic/test tooling only.
    pub(crate) fn debug_fmt(&self, id: NodeId, depth: usize, out: &mut String) {
        use std::fmt::Write;
        let node = self.node(id);
        let _ = writeln!(
            out,
            "{}{:?} [{} item(s)]",
            "  ".repeat(depth),
            node.rect,
            node.items.len()
        );
        if let Some(children) = node.children {
            for c in children {
                self.debug_fmt(c, depth + 1, out);
            }
        }
    }

    /// Writes clones of every item matching `query` into `buf`, starting at
    /// `start`. Returns the number written.
    ///
    /// # Panics
    /// Panics if more matching items exist than `buf.len() - start` can hold.
    pub(crate) fn query_fill<T: Clone, S: ShapePolicy<T>>(
        &self,
        id: NodeId,
        query: QueryRegion,
        handles: &HandleArena<T>,
        buf: &mut [T],
        start: usize,
    ) -> usize {
        let mut idx = start;
        self.query_visit::<T, S>(id, query, handles, &mut |item| {
            buf[idx] = item.clone();
            idx += 1;
        });
        idx - start
    }
}
