/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

#![deny(warnings, missing_docs, clippy::all, rustdoc::broken_intra_doc_links)]

//! Lazy flattening of trees.
//!
//! This crate turns a forest of self-similar [`Node`]s, each able to
//! produce its own children on demand, into one ordered iterator.  Only as
//! much of the tree is realized as the consumer pulls.
//!
//! Use [`flat_traversal`] with a [`TraversalOrder`] to build the iterator,
//! or one of the shorthands [`preorder`], [`postorder`] and
//! [`level_order`].  The returned [`FlatTraversal`] can be configured to
//! fetch children differently, retry failed expansions with an
//! [`ExpansionPolicy`], observe skipped subtrees and log to a
//! `slog::Logger`.
//!
//! Each node key is expanded at most once per traversal.  This keeps a
//! cyclic graph from being expanded forever, but cycles are not otherwise
//! detected: a node reachable twice is emitted twice.

mod error;
pub use error::ExpandError;
pub use error::FlattenError;

mod node;
pub use node::Node;

mod order;
pub use order::ParseTraversalOrderError;
pub use order::TraversalOrder;

pub mod policy;
pub use policy::ExpansionPolicy;
pub use policy::RetryPolicy;

mod engine;
pub use engine::FlatTraversal;


/// Flatten the trees below `roots` following `order`.
pub fn flat_traversal<N, I>(roots: I, order: TraversalOrder) -> FlatTraversal<N>
where
    N: Node,
    I: IntoIterator<Item = N>,
{
    FlatTraversal::new(roots, order)
}

/// Flatten depth-first, every node before its children.
pub fn preorder<N, I>(roots: I) -> FlatTraversal<N>
where
    N: Node,
    I: IntoIterator<Item = N>,
{
    flat_traversal(roots, TraversalOrder::PREORDER)
}

/// Flatten depth-first, every node after its whole subtree.
pub fn postorder<N, I>(roots: I) -> FlatTraversal<N>
where
    N: Node,
    I: IntoIterator<Item = N>,
{
    flat_traversal(roots, TraversalOrder::POSTORDER)
}

/// Flatten breadth-first, one level after the other.
pub fn level_order<N, I>(roots: I) -> FlatTraversal<N>
where
    N: Node,
    I: IntoIterator<Item = N>,
{
    flat_traversal(roots, TraversalOrder::LEVEL_ORDER)
}
