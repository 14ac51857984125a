/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::ExpandError;

/// An element of a tree that can produce its direct children.
///
/// Every node of a traversal has the same type, so children are themselves
/// nodes that may be expanded in turn.
pub trait Node: Sized {
    /// Identity of a node, used to expand each node at most once.
    type Key: Eq + Hash;

    /// Error produced when fetching children fails.
    type Error: Debug;

    /// Lazy sequence of direct children.
    type Children: IntoIterator<Item = Self>;

    /// Whether nodes of this type have children at all.
    ///
    /// Types that set this to `false` are terminal: `children` is never
    /// called and every node is emitted as soon as it is reached.
    const EXPANDABLE: bool = true;

    /// Identity of this node.
    fn key(&self) -> Self::Key;

    /// Fetch the direct children of this node.
    ///
    /// May perform I/O.  The traversal calls this at most once per key,
    /// plus any retries allowed by its expansion policy.
    fn children(&self) -> Result<Self::Children, ExpandError<Self::Error>>;
}
