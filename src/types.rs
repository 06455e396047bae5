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

// d888888b db    db d8888b. d88888b .d8888.
// `~~88~~' `8b  d8' 88  `8D 88'     88'  YP
//    88     `8bd8'  88oodD' 88ooooo `8bo.
//    88       88    88~~~   88~~~~~   `Y8b.
//    88       88    88      88.     db   8D
//    YP       YP    88      Y88888P `8888Y'

//! Process-wide constants and the id types used to address nodes and handles.
//!
//! These are `pub const`s rather than a mutable configuration record, per the
//! crate's design stance: thresholds that change tree shape are compile-time
//! facts, not runtime state.

/// Maximum number of handles a leaf holds before it subdivides.
pub const MAX_ITEMS_PER_NODE: usize = 10;

/// During condensation, a node may be rebuilt flat if its subtree holds fewer
/// than this many items, even if not all of its children are empty.
pub const MAX_OPTIMIZE_DELETION_READD: usize = 22;

/// Bulk-load recursion only subdivides a range longer than this.
pub const BULK_SPLIT_MIN_LEN: usize = 8;

/// Bulk-load recursion (and auto-midpoint subdivision) declines to split a
/// region with area smaller than this.
pub const MIN_SPLIT_AREA: f32 = 0.01;

/// A stable reference to a slot in a [`crate::node::NodeArena`].
///
/// Carries a generation counter alongside the slot index so that a `NodeId`
/// captured before a slot was freed (by condensation) and reused can be
/// detected as stale rather than silently aliasing an unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

/// The key under which an [`crate::entry::ItemHandle`] is stored in a
/// [`crate::entry::HandleArena`]. Monotonically increasing, never reused.
pub type HandleKey = u64;
