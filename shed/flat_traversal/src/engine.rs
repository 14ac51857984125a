/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

use std::collections::HashSet;
use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::thread;

use slog::Logger;
use slog::debug;
use slog::info;
use slog::warn;

use crate::error::ExpandError;
use crate::error::FlattenError;
use crate::node::Node;
use crate::order::TraversalOrder;
use crate::policy::ExpansionPolicy;
use crate::policy::FetchChildren;
use crate::policy::OnSkip;

/// Lazy iterator flattening a forest of [`Node`]s.
///
/// Work happens only when the next element is pulled: each pull expands
/// at most as many nodes as needed to produce one element.  The sequence
/// ends either after the last node or with the first fatal
/// [`FlattenError`], after which it only yields `None`.
///
/// `F` fetches children (`()` calls [`Node::children`]), `P` is the
/// [`ExpansionPolicy`] (`()` never retries) and `S` observes skipped
/// subtrees (`()` ignores them).
pub struct FlatTraversal<N, F = (), P = (), S = ()>
where
    N: Node,
{
    order: TraversalOrder,
    frontier: VecDeque<N>,
    expanded: HashSet<N::Key>,
    fetch: F,
    policy: P,
    on_skip: S,
    logger: Option<Logger>,
    deferred_error: Option<FlattenError<N::Error>>,
}

impl<N: Node> FlatTraversal<N> {
    /// Flatten the trees below `roots` in the given order.
    pub fn new(roots: impl IntoIterator<Item = N>, order: TraversalOrder) -> Self {
        FlatTraversal {
            order,
            frontier: roots.into_iter().collect(),
            expanded: HashSet::new(),
            fetch: (),
            policy: (),
            on_skip: (),
            logger: None,
            deferred_error: None,
        }
    }
}

impl<N, F, P, S> FlatTraversal<N, F, P, S>
where
    N: Node,
    F: FetchChildren<N>,
    P: ExpansionPolicy<N::Error>,
    S: OnSkip,
{
    /// Fetch children with `fetch` instead of [`Node::children`].
    pub fn fetch_children_with<F2>(self, fetch: F2) -> FlatTraversal<N, F2, P, S>
    where
        F2: FetchChildren<N>,
    {
        FlatTraversal {
            order: self.order,
            frontier: self.frontier,
            expanded: self.expanded,
            fetch,
            policy: self.policy,
            on_skip: self.on_skip,
            logger: self.logger,
            deferred_error: self.deferred_error,
        }
    }

    /// Retry failed expansions according to `policy`.
    pub fn expansion_policy<P2>(self, policy: P2) -> FlatTraversal<N, F, P2, S>
    where
        P2: ExpansionPolicy<N::Error>,
    {
        FlatTraversal {
            order: self.order,
            frontier: self.frontier,
            expanded: self.expanded,
            fetch: self.fetch,
            policy,
            on_skip: self.on_skip,
            logger: self.logger,
            deferred_error: self.deferred_error,
        }
    }

    /// Call `on_skip` with the count of every skip signal.
    pub fn on_skip<S2>(self, on_skip: S2) -> FlatTraversal<N, F, P, S2>
    where
        S2: OnSkip,
    {
        FlatTraversal {
            order: self.order,
            frontier: self.frontier,
            expanded: self.expanded,
            fetch: self.fetch,
            policy: self.policy,
            on_skip,
            logger: self.logger,
            deferred_error: self.deferred_error,
        }
    }

    /// Log retries, skips and failures to `logger`.
    pub fn logger(mut self, logger: impl Into<Option<Logger>>) -> Self {
        self.logger = logger.into();
        self
    }

    /// The order this traversal follows.
    pub fn order(&self) -> TraversalOrder {
        self.order
    }

    fn push_children(&mut self, children: Vec<N>) {
        if self.order.depth_first() {
            for child in children.into_iter().rev() {
                self.frontier.push_front(child);
            }
        } else {
            self.frontier.extend(children);
        }
    }

    fn release(&mut self) {
        self.frontier = VecDeque::new();
        self.expanded = HashSet::new();
    }

    /// Fetch the children of `node`, applying the retry and skip rules.
    /// A skipped node has no children.
    fn expand(
        fetch: &mut F,
        policy: &P,
        on_skip: &mut S,
        logger: Option<&Logger>,
        node: &N,
    ) -> Result<Vec<N>, FlattenError<N::Error>> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match fetch.fetch_children(node) {
                Ok(children) => return Ok(children),
                Err(ExpandError::Skipped { skipped }) => {
                    if let Some(logger) = logger {
                        info!(logger, "Skipped subtree during expansion"; "skipped" => skipped);
                    }
                    on_skip.on_skip(skipped);
                    return Ok(Vec::new());
                }
                Err(ExpandError::Failed(err)) => {
                    if attempts <= policy.max_retry_attempts() && policy.should_retry(&err) {
                        if let Some(logger) = logger {
                            debug!(
                                logger,
                                "Retrying node expansion";
                                "retry" => attempts,
                                "error" => ?err
                            );
                        }
                        let delay = policy.retry_delay(attempts);
                        if !delay.is_zero() {
                            thread::sleep(delay);
                        }
                    } else {
                        if let Some(logger) = logger {
                            warn!(
                                logger,
                                "Node expansion failed";
                                "attempts" => attempts,
                                "error" => ?err
                            );
                        }
                        return Err(FlattenError {
                            attempts,
                            source: err,
                        });
                    }
                }
            }
        }
    }

    fn fail(&mut self, err: FlattenError<N::Error>) -> FlattenError<N::Error> {
        self.release();
        err
    }
}

impl<N, F, P, S> Iterator for FlatTraversal<N, F, P, S>
where
    N: Node,
    F: FetchChildren<N>,
    P: ExpansionPolicy<N::Error>,
    S: OnSkip,
{
    type Item = Result<N, FlattenError<N::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.deferred_error.take() {
            return Some(Err(err));
        }
        loop {
            let Some(front) = self.frontier.front() else {
                self.release();
                return None;
            };
            let pending_key = if N::EXPANDABLE {
                let key = front.key();
                (!self.expanded.contains(&key)).then_some(key)
            } else {
                None
            };

            let Some(key) = pending_key else {
                return self.frontier.pop_front().map(Ok);
            };

            if self.order.parent_first() {
                let node = self.frontier.pop_front()?;
                match Self::expand(
                    &mut self.fetch,
                    &self.policy,
                    &mut self.on_skip,
                    self.logger.as_ref(),
                    &node,
                ) {
                    Ok(children) => {
                        self.push_children(children);
                        self.expanded.insert(key);
                    }
                    Err(err) => {
                        // The node is still delivered, the failure comes next.
                        self.deferred_error = Some(self.fail(err));
                    }
                }
                return Some(Ok(node));
            }

            // Children go in ahead of the node, which stays in the frontier
            // and is emitted once it surfaces again as already expanded.
            match Self::expand(
                &mut self.fetch,
                &self.policy,
                &mut self.on_skip,
                self.logger.as_ref(),
                front,
            ) {
                Ok(children) => {
                    self.push_children(children);
                    self.expanded.insert(key);
                }
                Err(err) => return Some(Err(self.fail(err))),
            }
        }
    }
}

impl<N, F, P, S> FusedIterator for FlatTraversal<N, F, P, S>
where
    N: Node,
    F: FetchChildren<N>,
    P: ExpansionPolicy<N::Error>,
    S: OnSkip,
{
}
