use crate::{Error, Pixel, Result};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::sync::Arc;

/// Shuffled, depleting queue over the master pixel list
///
/// The deck holds indices into the master list. It is dealt from the back of `order`,
/// and refilled with a fresh permutation of the whole master list once it runs dry,
/// so every pixel is dealt exactly once per pass.
pub struct Deck<R = StdRng> {
    master: Arc<[Pixel]>,
    order: Vec<usize>,
    passes: u64,
    rng: R,
}

impl Deck {
    pub fn new(master: impl Into<Arc<[Pixel]>>) -> Self {
        Self::with_rng(master, StdRng::from_entropy())
    }
}

impl<R> Deck<R>
where
    R: rand::Rng,
{
    pub fn with_rng(master: impl Into<Arc<[Pixel]>>, rng: R) -> Self {
        let master = master.into();

        Self {
            order: Vec::with_capacity(master.len()),
            master,
            passes: 0,
            rng,
        }
    }

    /// Refill with a uniformly shuffled copy of the master list, if empty
    pub fn ensure_filled(&mut self) {
        if !self.order.is_empty() || self.master.is_empty() {
            return;
        }

        self.order.extend(0..self.master.len());
        self.order.shuffle(&mut self.rng);
        self.passes += 1;

        debug!(pass = self.passes, len = self.order.len(), "refilled deck");
    }

    /// Take the next pixel, starting a new pass first if the deck ran dry
    pub fn deal(&mut self) -> Result<&Pixel> {
        self.ensure_filled();

        let idx = self.order.pop().ok_or(Error::EmptyDeck)?;
        Ok(&self.master[idx])
    }

    /// Pixels left in the current pass
    pub fn remaining(&self) -> usize {
        self.order.len()
    }

    /// Number of times the deck has been (re)filled
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn master(&self) -> &[Pixel] {
        &self.master
    }
}
