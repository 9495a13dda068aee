//! Sampling without replacement over a finite pool.

use rand::seq::SliceRandom;
use rand::Rng;

/// Hands out a shuffled permutation of a pool one item at a time, refilling
/// with a fresh permutation only once every item has been drawn.
///
/// The bag remembers which pool it was filled from. Drawing with a different
/// pool throws the remaining items away and starts over from the new pool,
/// so nothing from an old pool can leak into the new sequence.
#[derive(Debug, Clone)]
pub struct ShuffleBag<T> {
    /// Remaining items; the next draw pops from the end.
    items: Vec<T>,
    /// Pool the current permutation was built from.
    pool: Vec<T>,
}

impl<T: Copy + PartialEq> ShuffleBag<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            pool: Vec::new(),
        }
    }

    /// Draw the next item. Returns None only for an empty pool.
    pub fn draw<R: Rng + ?Sized>(&mut self, pool: &[T], rng: &mut R) -> Option<T> {
        self.draw_avoiding(pool, None, rng)
    }

    /// Like [`draw`](Self::draw), but if this draw starts a fresh permutation
    /// and its first item equals `avoid`, that item is swapped to the back of
    /// the new permutation. Two independently shuffled permutations can
    /// otherwise put the same item on both sides of the seam.
    pub fn draw_avoiding<R: Rng + ?Sized>(
        &mut self,
        pool: &[T],
        avoid: Option<T>,
        rng: &mut R,
    ) -> Option<T> {
        if self.pool.as_slice() != pool {
            self.pool = pool.to_vec();
            self.items.clear();
        }
        if self.items.is_empty() {
            self.refill(rng);
            let last = self.items.len().checked_sub(1)?;
            if last > 0 && avoid.is_some() && self.items.last().copied() == avoid {
                self.items.swap(0, last);
            }
        }
        self.items.pop()
    }

    /// Put an item back so it comes out after everything still in the bag.
    pub fn requeue(&mut self, item: T) {
        self.items.insert(0, item);
    }

    /// Forget the current permutation; the next draw reshuffles.
    pub fn clear(&mut self) {
        self.items.clear();
        self.pool.clear();
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    fn refill<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.items = self.pool.clone();
        // Fisher–Yates
        self.items.shuffle(rng);
    }
}

impl<T: Copy + PartialEq> Default for ShuffleBag<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    const POOL: [u8; 7] = [1, 2, 3, 4, 5, 6, 7];

    #[test]
    fn test_each_cycle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut bag = ShuffleBag::new();
        for _ in 0..20 {
            let cycle: HashSet<u8> = (0..POOL.len())
                .map(|_| bag.draw(&POOL, &mut rng).unwrap())
                .collect();
            assert_eq!(cycle.len(), POOL.len(), "item repeated within a cycle");
        }
    }

    #[test]
    fn test_empty_pool_draws_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bag: ShuffleBag<u8> = ShuffleBag::new();
        assert_eq!(bag.draw(&[], &mut rng), None);
    }

    #[test]
    fn test_pool_change_discards_old_items() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut bag = ShuffleBag::new();
        bag.draw(&POOL, &mut rng);
        assert_eq!(bag.remaining(), POOL.len() - 1);

        let other = [10u8, 20, 30];
        let drawn: HashSet<u8> = (0..3).map(|_| bag.draw(&other, &mut rng).unwrap()).collect();
        assert_eq!(drawn, other.iter().copied().collect());
        assert_eq!(bag.remaining(), 0);
    }

    #[test]
    fn test_requeue_comes_out_last() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut bag = ShuffleBag::new();
        let first = bag.draw(&POOL, &mut rng).unwrap();
        bag.requeue(first);
        let rest: Vec<u8> = (0..POOL.len()).map(|_| bag.draw(&POOL, &mut rng).unwrap()).collect();
        assert_eq!(*rest.last().unwrap(), first);
    }

    #[test]
    fn test_seam_never_repeats_when_avoiding() {
        let pool = [1u8, 2, 3];
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut bag = ShuffleBag::new();
            let mut last = None;
            for _ in 0..12 {
                let item = bag.draw_avoiding(&pool, last, &mut rng).unwrap();
                assert_ne!(Some(item), last, "seed {seed} repeated across the seam");
                last = Some(item);
            }
        }
    }

    #[test]
    fn test_single_item_pool_still_draws() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut bag = ShuffleBag::new();
        assert_eq!(bag.draw_avoiding(&[9u8], Some(9), &mut rng), Some(9));
        assert_eq!(bag.draw_avoiding(&[9u8], Some(9), &mut rng), Some(9));
    }

    #[test]
    fn test_clear_forces_reshuffle() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut bag = ShuffleBag::new();
        bag.draw(&POOL, &mut rng);
        bag.clear();
        assert_eq!(bag.remaining(), 0);
        bag.draw(&POOL, &mut rng);
        assert_eq!(bag.remaining(), POOL.len() - 1);
    }
}
