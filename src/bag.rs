use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::shape::PieceKind;

/// How many upcoming kinds the engine keeps visible.
pub const PREVIEW_DEPTH: usize = 5;

/// Source of bags. Every call must return each kind exactly once.
pub trait Randomizer {
    fn next_bag(&mut self) -> [PieceKind; 7];
}

pub struct SevenBag<R: Rng = StdRng> {
    rng: R,
}

impl SevenBag<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> SevenBag<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Randomizer for SevenBag<R> {
    fn next_bag(&mut self) -> [PieceKind; 7] {
        let mut bag = PieceKind::ALL;
        // SliceRandom::shuffle is a Fisher-Yates pass
        bag.shuffle(&mut self.rng);
        bag
    }
}

/// Upcoming kinds, concatenated bag after bag. Only whole bags are appended,
/// so bag boundaries survive in the queue.
pub struct PieceQueue {
    pending: VecDeque<PieceKind>,
    randomizer: Box<dyn Randomizer>,
}

impl PieceQueue {
    pub fn new(randomizer: Box<dyn Randomizer>) -> Self {
        let mut queue = Self {
            pending: VecDeque::with_capacity(2 * PieceKind::ALL.len()),
            randomizer,
        };
        queue.refill();
        queue
    }

    fn refill(&mut self) {
        while self.pending.len() <= PREVIEW_DEPTH {
            let bag = self.randomizer.next_bag();
            debug_assert!(
                PieceKind::ALL.iter().all(|k| bag.contains(k)),
                "randomizer produced a bag that is not a permutation: {bag:?}"
            );
            self.pending.extend(bag);
        }
    }

    /// Takes the head. Every refill leaves more than `PREVIEW_DEPTH` kinds
    /// queued and bags are fixed-size, so the head is always there.
    pub fn pop(&mut self) -> PieceKind {
        let kind = self
            .pending
            .pop_front()
            .expect("queue holds more than PREVIEW_DEPTH kinds between pops");
        self.refill();
        kind
    }

    /// Drops whatever was dealt and starts over on a fresh bag.
    pub fn discard(&mut self) {
        self.pending.clear();
        self.refill();
    }

    pub fn peek(&self) -> Option<PieceKind> {
        self.pending.front().copied()
    }

    /// The next `depth` kinds, capped at `PREVIEW_DEPTH`.
    pub fn upcoming(&self, depth: usize) -> Vec<PieceKind> {
        self.pending
            .iter()
            .take(depth.min(PREVIEW_DEPTH))
            .copied()
            .collect()
    }
}
