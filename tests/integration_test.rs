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

mod util;

use region_quadtree::{Index, Point, PointShape, QuadtreeError, Rectangle, RectShape};
use util::{unordered_elements_are, PointItem, RectItem};

fn rect_index() -> Index<RectItem, RectShape> {
    Index::new(Rectangle::new(0.0, 0.0, 64.0, 64.0))
}

#[test]
fn new_index_is_empty() {
    let idx = rect_index();
    debug_assert!(idx.is_empty());
    debug_assert_eq!(idx.len(), 0);
}

mod add {
    use super::*;

    #[test]
    fn add_increments_len() {
        let mut idx = rect_index();
        idx.add(RectItem::new(1, Rectangle::new(0.0, 0.0, 2.0, 2.0)))
            .unwrap();
        debug_assert_eq!(idx.len(), 1);
        idx.add(RectItem::new(2, Rectangle::new(10.0, 10.0, 2.0, 2.0)))
            .unwrap();
        debug_assert_eq!(idx.len(), 2);
    }

    #[test]
    fn add_duplicate_is_rejected() {
        let mut idx = rect_index();
        let item = RectItem::new(1, Rectangle::new(0.0, 0.0, 2.0, 2.0));
        idx.add(item.clone()).unwrap();
        debug_assert_eq!(idx.add(item), Err(QuadtreeError::DuplicateInsert));
        debug_assert_eq!(idx.len(), 1);
    }

    #[test]
    fn add_outside_region_is_kept_at_root() {
        // An out-of-bounds footprint isn't rejected -- it's kept at the root
        // rather than making the whole index unusable.
        let mut idx = rect_index();
        let outlier = RectItem::new(1, Rectangle::new(-100.0, -100.0, 2.0, 2.0));
        idx.add(outlier.clone()).unwrap();
        debug_assert!(idx.contains(&outlier));
        debug_assert_eq!(idx.len(), 1);
    }

    #[test]
    fn add_range_skips_duplicates() {
        let mut idx = rect_index();
        let items = vec![
            RectItem::new(1, Rectangle::new(0.0, 0.0, 1.0, 1.0)),
            RectItem::new(2, Rectangle::new(1.0, 1.0, 1.0, 1.0)),
            RectItem::new(1, Rectangle::new(0.0, 0.0, 1.0, 1.0)),
        ];
        let added = idx.add_range(items);
        debug_assert_eq!(added, 2);
        debug_assert_eq!(idx.len(), 2);
    }
}

mod remove {
    use super::*;

    #[test]
    fn remove_present_item() {
        let mut idx = rect_index();
        let item = RectItem::new(1, Rectangle::new(1.0, 1.0, 2.0, 2.0));
        idx.add(item.clone()).unwrap();
        debug_assert!(idx.remove(&item));
        debug_assert!(idx.is_empty());
        debug_assert!(!idx.contains(&item));
    }

    #[test]
    fn remove_absent_item_is_false() {
        let mut idx = rect_index();
        let item = RectItem::new(1, Rectangle::new(1.0, 1.0, 2.0, 2.0));
        debug_assert!(!idx.remove(&item));
    }

    #[test]
    fn remove_then_readd_is_allowed() {
        let mut idx = rect_index();
        let item = RectItem::new(1, Rectangle::new(1.0, 1.0, 2.0, 2.0));
        idx.add(item.clone()).unwrap();
        idx.remove(&item);
        idx.add(item).unwrap();
        debug_assert_eq!(idx.len(), 1);
    }
}

#[test]
fn move_item_relocates_across_subtree_boundary() {
    // Deep enough that the two positions land in different leaves.
    let mut idx = rect_index();
    let mut items = vec![];
    for i in 0..20 {
        let r = Rectangle::new(i as f32, i as f32, 1.0, 1.0);
        items.push(RectItem::new(i, r));
    }
    idx.add_range(items);

    let original = RectItem::new(0, Rectangle::new(0.0, 0.0, 1.0, 1.0));
    let moved = RectItem::new(0, Rectangle::new(60.0, 60.0, 1.0, 1.0));
    debug_assert!(idx.move_item(&original, moved.clone()));
    debug_assert!(!idx.contains(&original));
    debug_assert!(idx.contains(&moved));
    debug_assert_eq!(idx.count(Rectangle::new(59.0, 59.0, 2.0, 2.0)), 1);
    debug_assert_eq!(idx.count(Rectangle::new(0.0, 0.0, 1.0, 1.0)), 0);
}

#[test]
fn clear_empties_but_keeps_region() {
    let mut idx = rect_index();
    idx.add(RectItem::new(1, Rectangle::new(0.0, 0.0, 2.0, 2.0)))
        .unwrap();
    let rect = idx.rect();
    idx.clear();
    debug_assert!(idx.is_empty());
    debug_assert_eq!(idx.rect(), rect);
}

#[test]
fn remove_region_removes_and_returns_matches() {
    let mut idx = rect_index();
    let inside = RectItem::new(1, Rectangle::new(1.0, 1.0, 1.0, 1.0));
    let outside = RectItem::new(2, Rectangle::new(40.0, 40.0, 1.0, 1.0));
    idx.add(inside.clone()).unwrap();
    idx.add(outside.clone()).unwrap();

    let removed = idx.remove_region(Rectangle::new(0.0, 0.0, 10.0, 10.0));
    debug_assert!(unordered_elements_are(removed, vec![inside.clone()]));
    debug_assert_eq!(idx.len(), 1);
    debug_assert!(idx.contains(&outside));
}

// Repeated removal across the whole region must eventually condense the
// tree back to a single leaf -- covers both the "all children empty" and
// "promote solitary child" condensation cases.
#[test]
fn heavy_churn_condenses_back_to_a_single_leaf() {
    let mut idx = rect_index();
    let mut items = vec![];
    for i in 0..40u32 {
        let x = (i % 8) as f32 * 7.0;
        let y = (i / 8) as f32 * 7.0;
        items.push(RectItem::new(i, Rectangle::new(x, y, 1.0, 1.0)));
    }
    for item in &items {
        idx.add(item.clone()).unwrap();
    }
    debug_assert!(idx.tree_stats().node_count > 1);

    for item in &items {
        idx.remove(item);
    }
    debug_assert!(idx.is_empty());
    let stats = idx.tree_stats();
    debug_assert_eq!(stats.item_count, 0);
    debug_assert_eq!(stats.node_count, 1, "tree should condense to just the root");
}

#[test]
fn straddling_items_are_returned_by_overlapping_queries() {
    // A single item whose footprint spans across what would otherwise be a
    // subdivision boundary is still found by any query overlapping it.
    let mut idx = rect_index();
    let mut filler = vec![];
    for i in 0..12u32 {
        filler.push(RectItem::new(
            i,
            Rectangle::new((i % 4) as f32, (i / 4) as f32, 1.0, 1.0),
        ));
    }
    idx.add_range(filler);

    let straddler = RectItem::new(100, Rectangle::new(1.5, 1.5, 6.0, 6.0));
    idx.add(straddler.clone()).unwrap();

    debug_assert!(idx
        .query_to_vec(Rectangle::new(2.0, 2.0, 1.0, 1.0))
        .contains(&straddler));
    debug_assert!(idx
        .query_to_vec(Rectangle::new(6.0, 6.0, 1.0, 1.0))
        .contains(&straddler));
}

#[test]
fn point_shaped_items_round_trip() {
    let mut idx: Index<PointItem, PointShape> = Index::new(Rectangle::new(0.0, 0.0, 32.0, 32.0));
    let p = PointItem::new(1, (3.0, 4.0).into());
    idx.add(p.clone()).unwrap();

    debug_assert_eq!(idx.count(Rectangle::new(0.0, 0.0, 10.0, 10.0)), 1);
    debug_assert_eq!(idx.count(Point::from((3.0, 4.0))), 1);
    debug_assert_eq!(idx.count(Point::from((3.0, 4.0001))), 0);
    debug_assert!(idx.remove(&p));
    debug_assert!(idx.is_empty());
}

mod remove_all {
    use super::*;

    #[test]
    fn removes_only_items_matching_the_predicate() {
        let mut idx = rect_index();
        for i in 1..=100u32 {
            idx.add(RectItem::new(
                i,
                Rectangle::new((i % 60) as f32, (i / 2 % 60) as f32, 1.0, 1.0),
            ))
            .unwrap();
        }
        debug_assert!(idx.remove_all(|item| item.id % 2 == 1));
        debug_assert_eq!(idx.len(), 50);
        debug_assert!(idx.to_vec().iter().all(|item| item.id % 2 == 0));
    }

    #[test]
    fn returns_false_when_nothing_matches() {
        let mut idx = rect_index();
        idx.add(RectItem::new(1, Rectangle::new(0.0, 0.0, 1.0, 1.0)))
            .unwrap();
        debug_assert!(!idx.remove_all(|item| item.id == 999));
        debug_assert_eq!(idx.len(), 1);
    }
}

#[test]
fn debug_tree_mentions_every_live_node() {
    let mut idx = rect_index();
    for i in 0..40u32 {
        let x = (i % 8) as f32 * 7.0;
        let y = (i / 8) as f32 * 7.0;
        idx.add(RectItem::new(i, Rectangle::new(x, y, 1.0, 1.0)))
            .unwrap();
    }
    let dump = idx.debug_tree();
    debug_assert_eq!(dump.lines().count(), idx.tree_stats().node_count);
}
