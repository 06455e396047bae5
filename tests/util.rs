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

use region_quadtree::{HasPoint, HasRect, Point, Rectangle};
use std::collections::HashSet;
use std::hash::Hash;
use std::iter::FromIterator;

// Inspired by google/googletest's UnorderedElementsAre().
// https://github.com/google/googletest/blob/master/googlemock/docs/CheatSheet.md#container-matchers
#[allow(dead_code)]
pub fn unordered_elements_are<T, X, Y>(x: X, y: Y) -> bool
where
    X: IntoIterator<Item = T>,
    X::Item: PartialEq + Eq + Hash,
    Y: IntoIterator<Item = T>,
    Y::Item: PartialEq + Eq + Hash,
{
    let hs1: HashSet<T> = HashSet::from_iter(x);
    let hs2: HashSet<T> = HashSet::from_iter(y);
    hs1 == hs2
}

/// A test item with a rectangular footprint, tagged with a unique `id` so
/// equal-looking rectangles can still be told apart.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct RectItem {
    pub id: u32,
    pub rect: Rectangle,
}

#[allow(dead_code)]
impl RectItem {
    pub fn new(id: u32, rect: Rectangle) -> Self {
        Self { id, rect }
    }
}

impl HasRect for RectItem {
    fn rect(&self) -> Rectangle {
        self.rect
    }
}

/// A test item stored as a single point.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PointItem {
    pub id: u32,
    pub point: Point,
}

#[allow(dead_code)]
impl PointItem {
    pub fn new(id: u32, point: Point) -> Self {
        Self { id, point }
    }
}

impl HasPoint for PointItem {
    fn point(&self) -> Point {
        self.point
    }
}
