/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Order in which a tree is flattened.
///
/// Two independent flags drive the traversal: whether a node is emitted
/// before or after its children, and whether expansion uses a stack
/// (depth-first) or a queue (level by level).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraversalOrder {
    parent_first: bool,
    depth_first: bool,
}

impl TraversalOrder {
    /// Depth-first, parent before its children.
    pub const PREORDER: TraversalOrder = TraversalOrder::new(true, true);

    /// Depth-first, parent after its whole subtree.
    pub const POSTORDER: TraversalOrder = TraversalOrder::new(false, true);

    /// Breadth-first, level by level, left to right.
    pub const LEVEL_ORDER: TraversalOrder = TraversalOrder::new(true, false);

    /// Build a custom order from its two flags.
    pub const fn new(parent_first: bool, depth_first: bool) -> Self {
        TraversalOrder {
            parent_first,
            depth_first,
        }
    }

    /// Whether a node is emitted before its children are expanded.
    pub const fn parent_first(&self) -> bool {
        self.parent_first
    }

    /// Whether expansion follows stack discipline rather than queue.
    pub const fn depth_first(&self) -> bool {
        self.depth_first
    }
}

impl Default for TraversalOrder {
    fn default() -> Self {
        TraversalOrder::PREORDER
    }
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TraversalOrder::PREORDER => write!(f, "preorder"),
            TraversalOrder::POSTORDER => write!(f, "postorder"),
            TraversalOrder::LEVEL_ORDER => write!(f, "level_order"),
            TraversalOrder {
                parent_first,
                depth_first,
            } => write!(
                f,
                "custom(parent_first={}, depth_first={})",
                parent_first, depth_first
            ),
        }
    }
}

/// Returned when a string names no known traversal order.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown traversal order '{0}', expected one of: preorder, postorder, level_order")]
pub struct ParseTraversalOrderError(String);

impl FromStr for TraversalOrder {
    type Err = ParseTraversalOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "preorder" => Ok(TraversalOrder::PREORDER),
            "postorder" => Ok(TraversalOrder::POSTORDER),
            "level_order" | "levelorder" => Ok(TraversalOrder::LEVEL_ORDER),
            _ => Err(ParseTraversalOrderError(s.to_string())),
        }
    }
}
