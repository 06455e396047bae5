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

//! Single-precision geometric primitives: [`Point`] and [`Rectangle`].
//!
//! Containment and intersection both use the half-open convention described
//! in the crate's top-level documentation: a rectangle owns its top and left
//! edges but not its bottom and right ones.

use derive_builder::Builder;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::{Add, Sub};

/// A point in 2d space. Should be passed by value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Clone, Copy, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f32, f32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// An axis-aligned rectangular region in 2d space.
///
/// Lightweight, should be passed by value. Defined by its top-left anchor,
/// width, and height.
///
/// **NB:**
///   - The anchor can be any valid `(f32, f32)` coordinate, positive or
///     negative, in any quadrant.
///   - The width and height must both be non-negative and finite.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Clone, Copy, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Rectangle {
    #[builder(setter(into))]
    anchor: Point,
    #[builder(default = "(0.0, 0.0)")]
    dimensions: (f32, f32),
}

impl RectangleBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some((w, h)) = self.dimensions {
            if w < 0.0 {
                return Err("Rectangles may not have negative width.".to_string());
            }
            if h < 0.0 {
                return Err("Rectangles may not have negative height.".to_string());
            }
        }
        Ok(())
    }
}

impl Debug for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:?}->{:?}x{:?}",
            self.anchor(),
            self.width(),
            self.height()
        )
    }
}

impl Rectangle {
    /// Constructs a new rectangle anchored at `(x, y)` with the given width
    /// and height.
    ///
    /// # Panics
    /// Panics if `width` or `height` is negative.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        RectangleBuilder::default()
            .anchor((x, y))
            .dimensions((width, height))
            .build()
            .expect("Rectangle::new: invalid dimensions")
    }

    /// A degenerate, zero-area rectangle anchored at `pt` — the footprint of
    /// a bare point under the rectangle shape policy.
    pub fn at_point(pt: Point) -> Self {
        Self::new(pt.x, pt.y, 0.0, 0.0)
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn x(&self) -> f32 {
        self.anchor.x
    }

    pub fn y(&self) -> f32 {
        self.anchor.y
    }

    pub fn width(&self) -> f32 {
        self.dimensions.0
    }

    pub fn height(&self) -> f32 {
        self.dimensions.1
    }

    pub fn left(&self) -> f32 {
        self.x()
    }

    pub fn right(&self) -> f32 {
        self.x() + self.width()
    }

    pub fn top(&self) -> f32 {
        self.y()
    }

    pub fn bottom(&self) -> f32 {
        self.y() + self.height()
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Whether every coordinate describing this rectangle is finite.
    pub fn is_finite(&self) -> bool {
        self.x().is_finite()
            && self.y().is_finite()
            && self.width().is_finite()
            && self.height().is_finite()
    }

    /// Whether this rectangle wholly contains `other`, under the half-open
    /// convention (a rectangle's own right/bottom edges are exclusive, so an
    /// `other` sharing exactly this rectangle's right/bottom edge is still
    /// contained, but one extending past it is not).
    pub fn contains(&self, other: Rectangle) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Whether this rectangle contains `pt`, under the half-open convention:
    /// `x <= px < x+width` and `y <= py < y+height`.
    pub fn contains_pt(&self, pt: Point) -> bool {
        pt.x >= self.left() && pt.x < self.right() && pt.y >= self.top() && pt.y < self.bottom()
    }

    /// Whether this rectangle geometrically overlaps `other`.
    pub fn intersects(&self, other: Rectangle) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// The geometric center of the rectangle.
    pub fn center(&self) -> Point {
        Point {
            x: self.x() + self.width() / 2.0,
            y: self.y() + self.height() / 2.0,
        }
    }

    /// Splits this rectangle into four quadrants at `midpoint`, in
    /// `[northeast, northwest, southeast, southwest]` order, matching
    /// [`crate::node::Quadrant`]'s discriminant order.
    ///
    /// `midpoint` need not be the geometric center — the bulk loader passes
    /// an explicit Morton-median midpoint.
    pub(crate) fn quarter_at(&self, midpoint: Point) -> [Rectangle; 4] {
        let ne = Rectangle::new(
            midpoint.x,
            self.top(),
            self.right() - midpoint.x,
            midpoint.y - self.top(),
        );
        let nw = Rectangle::new(
            self.left(),
            self.top(),
            midpoint.x - self.left(),
            midpoint.y - self.top(),
        );
        let se = Rectangle::new(
            midpoint.x,
            midpoint.y,
            self.right() - midpoint.x,
            self.bottom() - midpoint.y,
        );
        let sw = Rectangle::new(
            self.left(),
            midpoint.y,
            midpoint.x - self.left(),
            self.bottom() - midpoint.y,
        );
        [ne, nw, se, sw]
    }
}

impl From<(f32, f32, f32, f32)> for Rectangle {
    fn from((x, y, w, h): (f32, f32, f32, f32)) -> Self {
        Rectangle::new(x, y, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod invalid_rectangle_creation {
        use super::*;

        #[test]
        #[should_panic]
        fn negative_width() {
            let _r = Rectangle::new(0.0, 0.0, -1.0, 4.0);
        }

        #[test]
        #[should_panic]
        fn negative_height() {
            let _r = Rectangle::new(0.0, 0.0, 1.0, -4.0);
        }
    }

    mod properties {
        use super::*;

        fn mk() -> Rectangle {
            Rectangle::new(3.0, 4.0, 5.0, 7.0)
        }

        #[test]
        fn edges() {
            let r = mk();
            debug_assert_eq!(r.anchor(), (3.0, 4.0).into());
            debug_assert_eq!(r.width(), 5.0);
            debug_assert_eq!(r.height(), 7.0);
            debug_assert_eq!(r.left(), 3.0);
            debug_assert_eq!(r.top(), 4.0);
            debug_assert_eq!(r.right(), 8.0);
            debug_assert_eq!(r.bottom(), 11.0);
        }
    }

    mod contains {
        use super::*;

        //   0  1  2  3  4
        // 0 +--+--+--+--+
        // 1 +--aaaaaaa--+
        // 2 +--aaaaaaa--+
        // 3 +--aaaaaaa--+
        // 4 +--+--+--+--+
        fn test_rect() -> Rectangle {
            Rectangle::new(1.0, 1.0, 2.0, 2.0)
        }

        #[test]
        fn contains_self() {
            debug_assert!(test_rect().contains(Rectangle::new(1.0, 1.0, 2.0, 2.0)));
        }

        #[test]
        fn shares_right_bottom_edge_is_contained() {
            // Half-open: a sub-rectangle touching the right/bottom edges
            // from the inside is still contained.
            debug_assert!(test_rect().contains(Rectangle::new(2.0, 2.0, 1.0, 1.0)));
        }

        #[test]
        fn overlapping_but_not_contained() {
            debug_assert!(!test_rect().contains(Rectangle::new(0.0, 0.0, 2.0, 2.0)));
            debug_assert!(!test_rect().contains(Rectangle::new(2.0, 2.0, 2.0, 2.0)));
        }

        #[test]
        fn contains_pt_half_open() {
            let r = test_rect();
            debug_assert!(r.contains_pt((1.0, 1.0).into()));
            debug_assert!(r.contains_pt((2.9, 2.9).into()));
            // Right/bottom edges are exclusive.
            debug_assert!(!r.contains_pt((3.0, 1.0).into()));
            debug_assert!(!r.contains_pt((1.0, 3.0).into()));
        }
    }

    mod intersects {
        use super::*;

        #[test]
        fn shared_edge_does_not_intersect() {
            let a = Rectangle::new(0.0, 0.0, 2.0, 2.0);
            let b = Rectangle::new(2.0, 0.0, 2.0, 2.0);
            debug_assert!(!a.intersects(b));
            debug_assert!(!b.intersects(a));
        }

        #[test]
        fn overlap_intersects() {
            let a = Rectangle::new(0.0, 0.0, 3.0, 3.0);
            let b = Rectangle::new(2.0, 2.0, 3.0, 3.0);
            debug_assert!(a.intersects(b));
            debug_assert!(b.intersects(a));
        }

        #[test]
        fn disjoint_does_not_intersect() {
            let a = Rectangle::new(0.0, 0.0, 1.0, 1.0);
            let b = Rectangle::new(5.0, 5.0, 1.0, 1.0);
            debug_assert!(!a.intersects(b));
        }
    }

    #[test]
    fn quarter_at_splits_evenly_at_center() {
        let r = Rectangle::new(0.0, 0.0, 4.0, 4.0);
        let [ne, nw, se, sw] = r.quarter_at(r.center());
        debug_assert_eq!(ne, Rectangle::new(2.0, 0.0, 2.0, 2.0));
        debug_assert_eq!(nw, Rectangle::new(0.0, 0.0, 2.0, 2.0));
        debug_assert_eq!(se, Rectangle::new(2.0, 2.0, 2.0, 2.0));
        debug_assert_eq!(sw, Rectangle::new(0.0, 2.0, 2.0, 2.0));
    }
}

impl Eq for Rectangle {}
impl std::hash::Hash for Rectangle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.x().to_bits().hash(state);
        self.y().to_bits().hash(state);
        self.width().to_bits().hash(state);
        self.height().to_bits().hash(state);
    }
}

impl Eq for Point {}
impl std::hash::Hash for Point {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}
