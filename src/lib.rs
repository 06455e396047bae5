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

//! A dynamic, in-memory [region quadtree](https://en.wikipedia.org/wiki/Quadtree)
//! supporting incremental insert, remove, and move, plus a one-pass parallel
//! bulk loader for building a tree from a large batch up front.
//!
//! # Quick start
//! ```
//! use region_quadtree::{HasRect, Index, Rectangle, RectShape};
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! struct Sensor(Rectangle);
//! impl HasRect for Sensor {
//!     fn rect(&self) -> Rectangle {
//!         self.0
//!     }
//! }
//!
//! let mut idx = Index::<Sensor, RectShape>::new(Rectangle::new(0.0, 0.0, 16.0, 16.0));
//! idx.add(Sensor(Rectangle::new(0.0, 0.0, 2.0, 1.0))).unwrap();
//!
//! let hits = idx.query_to_vec(Rectangle::new(1.0, 0.0, 2.0, 2.0));
//! assert_eq!(hits.len(), 1);
//! ```
//!
//! # Shape policies
//!
//! An [`Index`] is generic over a [`ShapePolicy`] that tells it how to test
//! an item for containment and intersection. [`RectShape`] covers items with
//! a rectangular footprint (`T: HasRect`); [`PointShape`] covers items that
//! are themselves a single point (`T: HasPoint`). Both accept either a
//! rectangle or a point as a query region via [`QueryRegion`].
//!
//! # Containment convention
//!
//! Containment and intersection both use a half-open convention: a
//! rectangle owns its top and left edges but not its bottom and right ones,
//! so two rectangles that share only an edge do not intersect, and a
//! sub-rectangle flush against a parent's bottom-right corner is still fully
//! contained.
//!
//! # Structural identity
//!
//! Nodes are addressed by a generation-tagged id rather than owned via
//! `Rc`/`RefCell`, which is what lets a node hold a back-pointer to its
//! parent without a reference cycle. This is an implementation detail and
//! not part of the public API.

pub mod entry;
pub mod error;
pub mod geometry;
pub mod index;
pub mod iter;
pub mod shape;

mod bulk;
mod node;
mod types;

pub use error::{QuadtreeError, QuadtreeResult};
pub use geometry::{Point, Rectangle};
pub use index::{Index, TreeStats};
pub use shape::{HasPoint, HasRect, PointShape, QueryRegion, RectShape, ShapePolicy};
