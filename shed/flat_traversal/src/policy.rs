/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

//! Collaborators of the flattening engine: how children are fetched, what
//! happens when fetching fails, and who hears about skipped subtrees.

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ExpandError;
use crate::node::Node;

/// Retry limit used when a policy does not choose its own.
pub const DEFAULT_MAX_RETRY_ATTEMPTS: usize = 1;

/// Decides whether a failed child fetch is tried again.
pub trait ExpansionPolicy<E> {
    /// Whether to retry after `err`.
    fn should_retry(&self, err: &E) -> bool;

    /// Maximum number of retries after the first attempt.
    fn max_retry_attempts(&self) -> usize {
        DEFAULT_MAX_RETRY_ATTEMPTS
    }

    /// Delay before the given retry (1 for the first retry).  The pulling
    /// thread blocks for this long.
    fn retry_delay(&self, _retry: usize) -> Duration {
        Duration::ZERO
    }
}

/// No policy: every failure is fatal.
impl<E> ExpansionPolicy<E> for () {
    fn should_retry(&self, _err: &E) -> bool {
        false
    }

    fn max_retry_attempts(&self) -> usize {
        0
    }
}

/// Condition attached to a [`RetryPolicy`].
pub trait RetryIf<E> {
    /// Whether `err` deserves another attempt.
    fn retry_if(&self, err: &E) -> bool;
}

impl<E> RetryIf<E> for () {
    fn retry_if(&self, _err: &E) -> bool {
        true
    }
}

impl<E, F> RetryIf<E> for F
where
    F: for<'err> Fn(&'err E) -> bool,
{
    fn retry_if(&self, err: &E) -> bool {
        self(err)
    }
}

/// Delay schedule between retries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Retry immediately.
    #[default]
    None,
    /// Wait the same interval before every retry.
    Fixed {
        /// Interval in milliseconds.
        interval_ms: u64,
    },
    /// Multiply the interval by `base` after every retry.  A negative or
    /// NaN `base` means no delay.
    Exponential {
        /// Interval before the first retry, in milliseconds.
        initial_ms: u64,
        /// Growth factor.
        base: f64,
    },
}

impl Backoff {
    /// Delay before the given retry, counting from 1.
    pub fn delay(&self, retry: usize) -> Duration {
        match *self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed { interval_ms } => Duration::from_millis(interval_ms),
            Backoff::Exponential { initial_ms, base } => {
                if base.is_nan() || base < 0.0 {
                    return Duration::ZERO;
                }
                let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
                let secs = Duration::from_millis(initial_ms).as_secs_f64() * base.powi(exponent);
                if secs.is_nan() || secs <= 0.0 {
                    return Duration::ZERO;
                }
                // Only a positive overflow gets here.
                Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
            }
        }
    }
}

/// Deserializable description of a [`RetryPolicy`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retry_attempts: usize,
    /// Delay schedule between retries.
    pub backoff: Backoff,
    /// Upper bound on any single delay, in milliseconds.
    pub max_interval_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
            backoff: Backoff::None,
            max_interval_ms: None,
        }
    }
}

/// Configurable [`ExpansionPolicy`].
///
/// By default every error is retried once, immediately.  Customize with
/// the builder methods.
#[derive(Clone, Debug)]
pub struct RetryPolicy<R = ()> {
    retry_if: R,
    max_retry_attempts: usize,
    backoff: Backoff,
    max_interval: Option<Duration>,
}

impl RetryPolicy<()> {
    /// Retry every error, [`DEFAULT_MAX_RETRY_ATTEMPTS`] times.
    pub fn new() -> Self {
        Self::from_config(&RetryConfig::default())
    }

    /// Build the policy described by `config`.
    pub fn from_config(config: &RetryConfig) -> Self {
        RetryPolicy {
            retry_if: (),
            max_retry_attempts: config.max_retry_attempts,
            backoff: config.backoff,
            max_interval: config.max_interval_ms.map(Duration::from_millis),
        }
    }
}

impl Default for RetryPolicy<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> RetryPolicy<R> {
    /// Limit the number of retries.  Zero disables retrying.
    pub fn max_retry_attempts(mut self, max_retry_attempts: usize) -> Self {
        self.max_retry_attempts = max_retry_attempts;
        self
    }

    /// Wait between retries according to `backoff`.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Limit every delay to a maximum value.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }

    /// Only retry errors for which the closure returns true.
    pub fn retry_if<R2>(self, retry_if: R2) -> RetryPolicy<R2> {
        RetryPolicy {
            retry_if,
            max_retry_attempts: self.max_retry_attempts,
            backoff: self.backoff,
            max_interval: self.max_interval,
        }
    }
}

impl<E, R> ExpansionPolicy<E> for RetryPolicy<R>
where
    R: RetryIf<E>,
{
    fn should_retry(&self, err: &E) -> bool {
        self.retry_if.retry_if(err)
    }

    fn max_retry_attempts(&self) -> usize {
        self.max_retry_attempts
    }

    fn retry_delay(&self, retry: usize) -> Duration {
        let delay = self.backoff.delay(retry);
        match self.max_interval {
            Some(max_interval) => delay.min(max_interval),
            None => delay,
        }
    }
}

/// Strategy producing the children of a node.
pub trait FetchChildren<N: Node> {
    /// Fetch the direct children of `node`, in order.
    fn fetch_children(&mut self, node: &N) -> Result<Vec<N>, ExpandError<N::Error>>;
}

/// Use the node's own [`Node::children`].
impl<N: Node> FetchChildren<N> for () {
    fn fetch_children(&mut self, node: &N) -> Result<Vec<N>, ExpandError<N::Error>> {
        Ok(node.children()?.into_iter().collect())
    }
}

impl<N, F, I> FetchChildren<N> for F
where
    N: Node,
    F: for<'node> FnMut(&'node N) -> Result<I, ExpandError<N::Error>>,
    I: IntoIterator<Item = N>,
{
    fn fetch_children(&mut self, node: &N) -> Result<Vec<N>, ExpandError<N::Error>> {
        Ok(self(node)?.into_iter().collect())
    }
}

/// Observer of skipped subtrees.
pub trait OnSkip {
    /// Called with the count carried by a skip signal.
    fn on_skip(&mut self, skipped: u64);
}

impl OnSkip for () {
    fn on_skip(&mut self, _skipped: u64) {}
}

impl<F> OnSkip for F
where
    F: FnMut(u64),
{
    fn on_skip(&mut self, skipped: u64) {
        self(skipped)
    }
}
