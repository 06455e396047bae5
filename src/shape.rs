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

//! The pluggable bundle of geometric predicates ("shape policy") that adapts
//! the tree to a concrete item shape.
//!
//! Two policies ship with the crate: [`RectShape`] (items with a rectangular
//! footprint) and [`PointShape`] (items that are themselves points). Both
//! accept either a [`QueryRegion::Rect`] or a [`QueryRegion::Point`] query.

use crate::geometry::{Point, Rectangle};

/// A query region: either a rectangle or a single point.
///
/// Sharing one enum across both shape policies means `Index::query_*` has a
/// single signature regardless of which policy the index was built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryRegion {
    Rect(Rectangle),
    Point(Point),
}

impl From<Rectangle> for QueryRegion {
    fn from(r: Rectangle) -> Self {
        QueryRegion::Rect(r)
    }
}

impl From<Point> for QueryRegion {
    fn from(p: Point) -> Self {
        QueryRegion::Point(p)
    }
}

/// Items stored by their rectangular footprint implement this to be usable
/// with [`RectShape`].
pub trait HasRect {
    fn rect(&self) -> Rectangle;
}

/// Items stored by a single representative point implement this to be usable
/// with [`PointShape`].
pub trait HasPoint {
    fn point(&self) -> Point;
}

/// The bundle of predicates a [`crate::node::Node`] consults at every
/// geometric test. See the module documentation for the two concrete
/// policies shipped with the crate.
pub trait ShapePolicy<T> {
    /// A representative point used only for bulk-load Morton sorting. Must
    /// be deterministic for a given item, but need not be unique.
    fn morton_point(item: &T) -> Point;

    /// True iff the item's footprint is fully inside `rect`.
    fn node_contains_item(rect: Rectangle, item: &T) -> bool;

    /// True iff `query` fully contains `rect`. Always `false` for a point
    /// query, since a node has positive area.
    fn query_contains_node(query: QueryRegion, rect: Rectangle) -> bool;

    /// True iff `query` geometrically overlaps `rect`.
    fn query_intersects_node(query: QueryRegion, rect: Rectangle) -> bool;

    /// The final per-item filter applied when a node only partially
    /// intersects `query`.
    fn query_intersects_item(query: QueryRegion, item: &T) -> bool;
}

/// Shape policy for items with a rectangular footprint (`T: HasRect`).
#[derive(Debug, Clone, Copy, Default)]
pub struct RectShape;

impl<T: HasRect> ShapePolicy<T> for RectShape {
    fn morton_point(item: &T) -> Point {
        item.rect().anchor()
    }

    fn node_contains_item(rect: Rectangle, item: &T) -> bool {
        rect.contains(item.rect())
    }

    fn query_contains_node(query: QueryRegion, rect: Rectangle) -> bool {
        match query {
            QueryRegion::Rect(q) => q.contains(rect),
            QueryRegion::Point(_) => false,
        }
    }

    fn query_intersects_node(query: QueryRegion, rect: Rectangle) -> bool {
        match query {
            QueryRegion::Rect(q) => q.intersects(rect),
            QueryRegion::Point(p) => rect.contains_pt(p),
        }
    }

    fn query_intersects_item(query: QueryRegion, item: &T) -> bool {
        match query {
            QueryRegion::Rect(q) => q.intersects(item.rect()),
            QueryRegion::Point(p) => item.rect().contains_pt(p),
        }
    }
}

/// Shape policy for items stored as a single point (`T: HasPoint`).
#[derive(Debug, Clone, Copy, Default)]
pub struct PointShape;

impl<T: HasPoint> ShapePolicy<T> for PointShape {
    fn morton_point(item: &T) -> Point {
        item.point()
    }

    fn node_contains_item(rect: Rectangle, item: &T) -> bool {
        rect.contains_pt(item.point())
    }

    fn query_contains_node(query: QueryRegion, rect: Rectangle) -> bool {
        match query {
            QueryRegion::Rect(q) => q.contains(rect),
            QueryRegion::Point(_) => false,
        }
    }

    fn query_intersects_node(query: QueryRegion, rect: Rectangle) -> bool {
        match query {
            QueryRegion::Rect(q) => q.intersects(rect),
            QueryRegion::Point(p) => rect.contains_pt(p),
        }
    }

    fn query_intersects_item(query: QueryRegion, item: &T) -> bool {
        match query {
            QueryRegion::Rect(q) => q.contains_pt(item.point()),
            // A point query against point-shaped items degenerates to exact
            // equality: the item "intersects" the query iff it sits at the
            // same point.
            QueryRegion::Point(p) => item.point() == p,
        }
    }
}
