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

//! The one-pass bulk loader: bounding-box reduction, a Morton (Z-order) sort,
//! and a recursive quartering build, used both by `Index::add_bulk` and by
//! condensation's subtree rebuild.
//!
//! The bounding-box reduction and the per-item Morton key computation are the
//! genuinely data-parallel passes (read-only over the handle arena) and are
//! the ones `thread_level` actually fans out across `rayon`. The tree build
//! itself mutates a single [`NodeArena`] and stays single-threaded — fanning
//! that out too would need either `unsafe` slab partitioning or per-call
//! locking fine-grained enough to erase the benefit, neither of which this
//! crate's dependency stack (no `unsafe`, no lock-free crates) supports.
//!
//! Each recursion level recomputes its own bounding box, re-sorts its own
//! slice by Morton key, and re-derives its split point from that box's
//! center, then buckets items into a child by an actual geometric
//! containment test (see [`NodeArena::bucket_index`]) rather than by array
//! position. An index-based quartering of one global sort (split at
//! `start + len/4`-style count boundaries) is cheaper but can hand a child a
//! range that doesn't actually fit its nominal quadrant, pushing items back
//! up as straddlers for reasons that have nothing to do with their
//! footprint; recomputing the box per level keeps every split tight to the
//! items actually being placed, at the cost of re-sorting smaller slices
//! level by level instead of walking one global sort.

use crate::entry::HandleArena;
use crate::geometry::Point;
use crate::node::NodeArena;
use crate::shape::ShapePolicy;
use crate::types::{HandleKey, NodeId, MAX_ITEMS_PER_NODE};
use rayon::prelude::*;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug)]
struct Extrema {
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
}

impl Extrema {
    fn singleton(p: Point) -> Self {
        Self {
            min_x: p.x,
            max_x: p.x,
            min_y: p.y,
            max_y: p.y,
        }
    }

    /// Folds `other` in. Each of the four extrema is updated independently,
    /// so a chunk that only ever sees small x values still correctly widens
    /// `max_y`/`min_y` from whatever `other` contributes — unlike a version
    /// that tracks a single running "extreme point" per corner, which can
    /// silently drop an axis when the widest-x chunk and the widest-y chunk
    /// are different chunks.
    fn merge(&mut self, other: Extrema) {
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }
}

fn bounding_extrema<T, S: ShapePolicy<T>>(
    handles: &HandleArena<T>,
    items: &[HandleKey],
    thread_level: u32,
) -> Extrema {
    debug_assert!(!items.is_empty());
    let point_at = |k: HandleKey| -> Point {
        handles
            .with_data(k, |item| S::morton_point(item))
            .expect("handle key must be valid during bulk load")
    };

    if thread_level == 0 || items.len() < MAX_ITEMS_PER_NODE {
        let mut iter = items.iter().map(|&k| point_at(k));
        let mut acc = Extrema::singleton(iter.next().unwrap());
        for p in iter {
            acc.merge(Extrema::singleton(p));
        }
        return acc;
    }

    let chunk_count = (thread_level as usize).min(items.len()).max(1);
    let chunk_size = (items.len() + chunk_count - 1) / chunk_count;
    let acc = Mutex::new(Extrema::singleton(point_at(items[0])));
    rayon::scope(|scope| {
        for chunk in items.chunks(chunk_size) {
            let acc = &acc;
            let point_at = &point_at;
            scope.spawn(move |_| {
                let mut local = Extrema::singleton(point_at(chunk[0]));
                for &k in &chunk[1..] {
                    local.merge(Extrema::singleton(point_at(k)));
                }
                acc.lock().unwrap().merge(local);
            });
        }
    });
    acc.into_inner().unwrap()
}

/// Spreads the low 16 bits of `v` out so each occupies every other bit,
/// leaving room to interleave with the other axis.
fn spread_bits(v: u16) -> u32 {
    let mut x = v as u32;
    x = (x | (x << 8)) & 0x00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333;
    x = (x | (x << 1)) & 0x5555_5555;
    x
}

fn normalize(v: f32, min: f32, max: f32) -> u16 {
    if (max - min).abs() < f32::EPSILON {
        return 0;
    }
    let t = ((v - min) / (max - min)).clamp(0.0, 1.0);
    (t * u16::MAX as f32).round() as u16
}

fn morton_key(p: Point, ex: Extrema) -> u32 {
    let nx = normalize(p.x, ex.min_x, ex.max_x);
    let ny = normalize(p.y, ex.min_y, ex.max_y);
    spread_bits(nx) | (spread_bits(ny) << 1)
}

/// Builds `id`'s subtree (assumed to currently be an empty leaf) from
/// `items`, via one bounding-box pass, one Morton sort, and a recursive
/// quartering that buckets items by which child's rect uniquely contains
/// them, leaving the rest as straddlers at the current level.
///
/// This is also what condensation calls to rebuild a shrunk subtree, with
/// `thread_level` forced to zero — not worth fanning out for a handful of
/// items.
pub(crate) fn bulk_build<T, S: ShapePolicy<T>>(
    arena: &mut NodeArena,
    handles: &HandleArena<T>,
    id: NodeId,
    items: Vec<HandleKey>,
    thread_level: u32,
) {
    if items.is_empty() {
        return;
    }
    if items.len() <= MAX_ITEMS_PER_NODE {
        for key in items {
            arena.place_leaf_item(id, key, handles);
        }
        return;
    }

    let extrema = bounding_extrema::<T, S>(handles, &items, thread_level);

    let mut keyed: Vec<(u32, HandleKey)> = if thread_level > 0 && items.len() >= MAX_ITEMS_PER_NODE
    {
        items
            .par_iter()
            .map(|&k| {
                let p = handles
                    .with_data(k, |item| S::morton_point(item))
                    .expect("handle key must be valid during bulk load");
                (morton_key(p, extrema), k)
            })
            .collect()
    } else {
        items
            .iter()
            .map(|&k| {
                let p = handles
                    .with_data(k, |item| S::morton_point(item))
                    .expect("handle key must be valid during bulk load");
                (morton_key(p, extrema), k)
            })
            .collect()
    };
    keyed.sort_by_key(|&(m, _)| m);

    let midpoint = Point {
        x: (extrema.min_x + extrema.max_x) / 2.0,
        y: (extrema.min_y + extrema.max_y) / 2.0,
    };
    let children = match arena.split_at(id, midpoint) {
        Some(c) => c,
        None => {
            log::trace!("bulk load: declining to split a degenerate region, flattening");
            for (_, key) in keyed {
                arena.place_leaf_item(id, key, handles);
            }
            return;
        }
    };

    let mut buckets: [Vec<HandleKey>; 4] = Default::default();
    for (_, key) in keyed {
        match arena.bucket_index::<T, S>(children, handles, key) {
            Some(idx) => buckets[idx].push(key),
            None => arena.place_leaf_item(id, key, handles),
        }
    }

    log::debug!(
        "bulk load: split region into {} / {} / {} / {} items across children, {} straddling",
        buckets[0].len(),
        buckets[1].len(),
        buckets[2].len(),
        buckets[3].len(),
        arena.node(id).items().len()
    );

    let next_level = thread_level.saturating_sub(1);
    for (child, bucket) in children.into_iter().zip(buckets) {
        bulk_build::<T, S>(arena, handles, child, bucket, next_level);
    }
}
