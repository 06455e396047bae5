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

//! Error kinds for the fallible subset of [`crate::index::Index`]'s
//! operations.
//!
//! `remove` and `move_item` report absence as a `bool`, not an error — see
//! the crate's top-level error handling notes. Queries never fail.

use thiserror::Error;

/// Errors surfaced by [`crate::index::Index`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuadtreeError {
    /// `add` was called with an item already present in the index.
    #[error("item already present in index")]
    DuplicateInsert,

    /// `add_bulk` was called on an index whose root already has children.
    #[error("bulk load requires an empty or flat-leaf root")]
    BulkPreconditionViolated,
}

/// Result type for the fallible subset of [`crate::index::Index`]'s methods.
pub type QuadtreeResult<T> = Result<T, QuadtreeError>;
