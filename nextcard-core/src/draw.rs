//! Drawing cards from a pool.
//!
//! Randomness is supplied through [`IndexSource`] so draws can be replayed
//! exactly in tests, either from a seeded generator or a scripted sequence.

use crate::pool::Card;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Backdrop style shown before any card has been drawn.
pub const DEFAULT_BACKDROP: &str = "from-blue-50 via-sky-50 to-blue-100";

/// Number of distinct backdrop phases the presentation layer cycles through.
pub const BACKDROP_PERIOD: u64 = 2;

/// Error type for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("No cards available for the current selection")]
    EmptyPool,
}

/// A source of indices for draws.
pub trait IndexSource: Send {
    /// Return an index in `0..len`. Never called with `len == 0`.
    ///
    /// Out-of-range indices are a bug in the source: debug builds panic,
    /// release builds clamp to the last index.
    fn next_index(&mut self, len: usize) -> usize;
}

/// An [`IndexSource`] backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng + Send> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Seed from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic source for reproducible draws.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> IndexSource for RngSource<R> {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

fn pick(source: &mut dyn IndexSource, len: usize) -> usize {
    let index = source.next_index(len);
    debug_assert!(index < len, "index source returned {index} for a pool of {len}");
    index.min(len - 1)
}

/// Pick one card uniformly at random.
pub fn draw<'a>(pool: &'a [Card], source: &mut dyn IndexSource) -> Result<&'a Card, DrawError> {
    if pool.is_empty() {
        return Err(DrawError::EmptyPool);
    }
    Ok(&pool[pick(source, pool.len())])
}

/// Pick one card uniformly among those not equal to `previous`.
///
/// Every copy of `previous` is excluded, so duplicate prompts can't repeat.
/// Falls back to [`draw`] when nothing else is left.
pub fn draw_avoiding<'a>(
    pool: &'a [Card],
    previous: Option<&Card>,
    source: &mut dyn IndexSource,
) -> Result<&'a Card, DrawError> {
    let Some(prev) = previous else {
        return draw(pool, source);
    };
    let others: Vec<&Card> = pool.iter().filter(|c| *c != prev).collect();
    if others.is_empty() {
        return draw(pool, source);
    }
    Ok(others[pick(source, others.len())])
}

/// Monotonic draw counter driving the backdrop rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackdropCycle {
    count: u64,
}

impl BackdropCycle {
    pub fn advance(&mut self) {
        self.count = self.count.wrapping_add(1);
    }

    /// Draws so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn phase(&self) -> u64 {
        self.count % BACKDROP_PERIOD
    }
}
