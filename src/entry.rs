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

//! [`ItemHandle`], the stable identity of an item stored in the tree, and
//! [`HandleArena`], the keyed store that owns them.
//!
//! Mirrors the teacher crate's `Entry` + `StoreType` pair: a node's item
//! list holds handle *keys* (`u64`s), and the arena is the single place
//! those keys resolve to the actual item value and its current owner.

use crate::types::{HandleKey, NodeId};
use std::collections::HashMap;
use std::sync::Mutex;

/// One item's stable identity within the tree: its value and a back-pointer
/// to the node currently storing it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemHandle<T> {
    data: T,
    owner: NodeId,
}

impl<T> ItemHandle<T> {
    pub(crate) fn new(data: T, owner: NodeId) -> Self {
        Self { data, owner }
    }

    /// A reference to the stored item.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// The node currently storing this handle.
    pub(crate) fn owner(&self) -> NodeId {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: NodeId) {
        self.owner = owner;
    }

    pub(crate) fn set_data(&mut self, data: T) {
        self.data = data;
    }
}

/// The keyed store of [`ItemHandle`]s for one [`crate::index::Index`].
///
/// Guarded internally by a `Mutex` so the bulk loader's parallel subtree
/// construction can assign owners concurrently (see §5 of the design doc);
/// all other operations take the lock uncontended.
#[derive(Debug, Default)]
pub(crate) struct HandleArena<T> {
    slots: Mutex<HashMap<HandleKey, ItemHandle<T>>>,
    next_key: Mutex<HandleKey>,
}

impl<T> HandleArena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            next_key: Mutex::new(0),
        }
    }

    /// Allocates a new handle key and stores `handle` under it.
    pub(crate) fn insert(&self, handle: ItemHandle<T>) -> HandleKey {
        let key = {
            let mut next = self.next_key.lock().unwrap();
            let key = *next;
            *next += 1;
            key
        };
        self.slots.lock().unwrap().insert(key, handle);
        key
    }

    pub(crate) fn remove(&self, key: HandleKey) -> Option<ItemHandle<T>> {
        self.slots.lock().unwrap().remove(&key)
    }

    pub(crate) fn owner(&self, key: HandleKey) -> Option<NodeId> {
        self.slots.lock().unwrap().get(&key).map(ItemHandle::owner)
    }

    pub(crate) fn set_owner(&self, key: HandleKey, owner: NodeId) {
        if let Some(handle) = self.slots.lock().unwrap().get_mut(&key) {
            handle.set_owner(owner);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    pub(crate) fn clear(&self) {
        self.slots.lock().unwrap().clear();
    }
}

impl<T: Clone> HandleArena<T> {
    pub(crate) fn data(&self, key: HandleKey) -> Option<T> {
        self.slots.lock().unwrap().get(&key).map(|h| h.data.clone())
    }
}

impl<T> HandleArena<T> {
    pub(crate) fn with_data<R>(&self, key: HandleKey, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.slots.lock().unwrap().get(&key).map(|h| f(&h.data))
    }

    pub(crate) fn set_data(&self, key: HandleKey, data: T) {
        if let Some(handle) = self.slots.lock().unwrap().get_mut(&key) {
            handle.set_data(data);
        }
    }
}
