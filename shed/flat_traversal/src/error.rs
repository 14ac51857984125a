/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

use thiserror::Error;

/// Outcome of a failed attempt to fetch the children of a node.
#[derive(Debug, Error)]
pub enum ExpandError<E> {
    /// The subtree below the node is intentionally omitted.
    ///
    /// This is never retried and never terminates the traversal: the node
    /// is treated as having no children and the skip observer is told how
    /// many elements were left out.
    #[error("subtree skipped ({skipped} element(s))")]
    Skipped {
        /// Number of elements considered skipped.
        skipped: u64,
    },
    /// Fetching the children failed.  Subject to the expansion policy.
    #[error("node expansion failed")]
    Failed(#[from] E),
}

impl<E> ExpandError<E> {
    /// Skip signal carrying `skipped` omitted elements.
    pub fn skip(skipped: u64) -> Self {
        ExpandError::Skipped { skipped }
    }

    /// Skip signal for a single omitted element.
    pub fn skip_one() -> Self {
        Self::skip(1)
    }

    /// Returns true if this is the skip signal.
    pub fn is_skip(&self) -> bool {
        matches!(self, ExpandError::Skipped { .. })
    }
}

/// Fatal error ending a flattened sequence.
#[derive(Debug, Error)]
#[error("failed to expand node after {attempts} attempt(s)")]
pub struct FlattenError<E> {
    /// How many times the children were fetched before giving up.
    pub attempts: usize,
    /// The error of the last attempt.
    #[source]
    pub source: E,
}

impl<E> FlattenError<E> {
    /// Unwrap the error of the last attempt.
    pub fn into_inner(self) -> E {
        self.source
    }
}
