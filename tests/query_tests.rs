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

use region_quadtree::{Index, Point, Rectangle, RectShape};
use std::cell::RefCell;
use util::{unordered_elements_are, RectItem};

//   0123456
// 0 ........
// 1 ..aaa...    (2,1)->3x2
// 2 ..aaa...
// 3 ........
// 4 .bbb....    (1,4)->3x1
// 5 ........
fn populated() -> Index<RectItem, RectShape> {
    let mut idx = Index::new(Rectangle::new(0.0, 0.0, 8.0, 8.0));
    idx.add(RectItem::new(1, Rectangle::new(2.0, 1.0, 3.0, 2.0)))
        .unwrap();
    idx.add(RectItem::new(2, Rectangle::new(1.0, 4.0, 3.0, 1.0)))
        .unwrap();
    idx
}

#[test]
fn count_over_a_single_cell_hits_one_item() {
    let idx = populated();
    //   0123456
    // 1 ..#a+...  <-- query over (2,1)->1x1
    debug_assert_eq!(idx.count(Rectangle::new(2.0, 1.0, 1.0, 1.0)), 1);
}

#[test]
fn count_over_the_gap_between_items_is_zero() {
    let idx = populated();
    debug_assert_eq!(idx.count(Rectangle::new(0.0, 0.0, 1.0, 1.0)), 0);
}

#[test]
fn count_over_the_whole_board_hits_both() {
    let idx = populated();
    debug_assert_eq!(idx.count(idx.rect()), 2);
}

#[test]
fn query_to_vec_returns_matching_items() {
    let idx = populated();
    let hits = idx.query_to_vec(Rectangle::new(1.0, 1.0, 4.0, 4.0));
    debug_assert!(unordered_elements_are(
        hits,
        vec![RectItem::new(1, Rectangle::new(2.0, 1.0, 3.0, 2.0))]
    ));
}

#[test]
fn query_visit_sees_every_match_exactly_once() {
    let idx = populated();
    let seen = RefCell::new(Vec::new());
    idx.query_visit(idx.rect(), |item| seen.borrow_mut().push(item.id));
    let mut ids = seen.into_inner();
    ids.sort_unstable();
    debug_assert_eq!(ids, vec![1, 2]);
}

#[test]
fn query_visit_with_threads_a_payload_through() {
    let idx = populated();
    let mut total_area = 0.0_f32;
    idx.query_visit_with(idx.rect(), &mut total_area, |item, acc| {
        *acc += item.rect.area();
    });
    debug_assert_eq!(total_area, 6.0 + 3.0);
}

#[test]
fn query_fill_writes_matches_into_the_buffer() {
    let idx = populated();
    let blank = RectItem::new(0, Rectangle::new(0.0, 0.0, 0.0, 0.0));
    let mut buf = vec![blank; 2];
    let written = idx.query_fill(idx.rect(), &mut buf);
    debug_assert_eq!(written, 2);
}

#[test]
#[should_panic]
fn query_fill_panics_on_an_undersized_buffer() {
    let idx = populated();
    let blank = RectItem::new(0, Rectangle::new(0.0, 0.0, 0.0, 0.0));
    let mut buf = vec![blank; 1];
    idx.query_fill(idx.rect(), &mut buf);
}

#[test]
fn query_iter_agrees_with_query_to_vec() {
    let idx = populated();
    let region = Rectangle::new(0.0, 0.0, 8.0, 8.0);
    let via_vec = idx.query_to_vec(region);
    let via_iter: Vec<RectItem> = idx.query_iter(region).collect();
    debug_assert!(unordered_elements_are(via_vec, via_iter));
}

#[test]
fn query_iter_can_stop_early_without_draining() {
    let idx = populated();
    let mut iter = idx.query_iter(idx.rect());
    debug_assert!(iter.next().is_some());
    // Dropping here without calling .next() again must not panic or leak.
}

mod point_queries {
    use super::*;

    #[test]
    fn a_point_query_only_matches_items_containing_it() {
        let idx = populated();
        debug_assert_eq!(idx.count(Point::from((3.0, 2.0))), 1);
        debug_assert_eq!(idx.count(Point::from((0.0, 0.0))), 0);
    }
}
