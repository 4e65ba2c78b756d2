use crate::models::Pair;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PairError {
    #[error("Insufficient candidates: need at least 2 items, have {0}")]
    InsufficientCandidates(usize),
}

/// Draws the next two items to compare
///
/// Stateless apart from the optional previous pair supplied by the caller.
/// Pairs may repeat across non-consecutive rounds.
///
/// `Default` turns previous-pair avoidance on, so consecutive rounds never
/// show the same two items once there are at least 3. That departs from a
/// plain uniform draw; use `PairSelector::new(false)` for the unconditioned
/// distribution.
#[derive(Debug, Clone, Copy)]
pub struct PairSelector {
    avoid_previous: bool,
}

impl PairSelector {
    pub fn new(avoid_previous: bool) -> Self {
        Self { avoid_previous }
    }

    /// Draw two distinct indices uniformly from `[0, item_count)`
    ///
    /// The second index is redrawn until it differs from the first. Each
    /// redraw collides with probability `1 / item_count`, so the expected
    /// number of redraws is `1 / (item_count - 1)`, at most 1.
    ///
    /// With `avoid_previous` set and at least 3 items, a draw matching
    /// `previous` in either orientation is rejected as a whole. That happens
    /// with probability `2 / (item_count * (item_count - 1))`, at most 1/3.
    /// With exactly 2 items the only possible pair is returned.
    pub fn next_pair<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        item_count: usize,
        previous: Option<Pair>,
    ) -> Result<Pair, PairError> {
        if item_count < 2 {
            return Err(PairError::InsufficientCandidates(item_count));
        }

        let avoid = previous
            .filter(|_| self.avoid_previous && item_count >= 3)
            .filter(|prev| prev.fits(item_count) && prev.first != prev.second);

        loop {
            let pair = draw_distinct(rng, item_count);
            match avoid {
                Some(prev) if pair.same_items(&prev) => continue,
                _ => return Ok(pair),
            }
        }
    }
}

impl Default for PairSelector {
    fn default() -> Self {
        Self::new(true)
    }
}

fn draw_distinct<R: Rng + ?Sized>(rng: &mut R, item_count: usize) -> Pair {
    let first = rng.random_range(0..item_count);
    let mut second = rng.random_range(0..item_count);
    while second == first {
        second = rng.random_range(0..item_count);
    }
    Pair::new(first, second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_requires_two_items() {
        let selector = PairSelector::default();
        let mut rng = StdRng::seed_from_u64(1);

        for count in [0, 1] {
            let err = selector.next_pair(&mut rng, count, None).unwrap_err();
            assert!(matches!(err, PairError::InsufficientCandidates(n) if n == count));
        }
    }

    #[test]
    fn test_two_items_always_yield_both() {
        let selector = PairSelector::default();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pair = selector
                .next_pair(&mut rng, 2, Some(Pair::new(0, 1)))
                .unwrap();
            assert!(pair.same_items(&Pair::new(0, 1)));
        }
    }

    #[test]
    fn test_indices_distinct_and_in_range() {
        let selector = PairSelector::new(false);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1_000 {
            let pair = selector.next_pair(&mut rng, 5, None).unwrap();
            assert_ne!(pair.first, pair.second);
            assert!(pair.fits(5));
        }
    }

    #[test]
    fn test_avoids_previous_pair() {
        let selector = PairSelector::new(true);
        let mut rng = StdRng::seed_from_u64(7);
        let previous = Pair::new(0, 2);

        for _ in 0..500 {
            let pair = selector.next_pair(&mut rng, 3, Some(previous)).unwrap();
            assert!(!pair.same_items(&previous));
        }
    }

    #[test]
    fn test_default_differs_from_plain_draw() {
        let previous = Pair::new(0, 1);
        let avoiding = PairSelector::default();
        let plain = PairSelector::new(false);
        let mut rng = StdRng::seed_from_u64(13);

        let repeats = |selector: PairSelector, rng: &mut StdRng| {
            (0..600)
                .filter(|_| {
                    selector
                        .next_pair(&mut *rng, 3, Some(previous))
                        .unwrap()
                        .same_items(&previous)
                })
                .count()
        };

        assert_eq!(repeats(avoiding, &mut rng), 0);
        // 1 in 3 of plain draws over 3 items land on {0, 1}
        assert!(repeats(plain, &mut rng) > 100);
    }

    #[test]
    fn test_stale_previous_pair_is_ignored() {
        let selector = PairSelector::new(true);
        let mut rng = StdRng::seed_from_u64(9);

        let pair = selector
            .next_pair(&mut rng, 3, Some(Pair::new(10, 11)))
            .unwrap();
        assert!(pair.fits(3));
    }

    #[test]
    fn test_seeded_draws_are_reproducible() {
        let selector = PairSelector::default();
        let mut a = StdRng::seed_from_u64(2024);
        let mut b = StdRng::seed_from_u64(2024);

        for _ in 0..20 {
            assert_eq!(
                selector.next_pair(&mut a, 50, None).unwrap(),
                selector.next_pair(&mut b, 50, None).unwrap()
            );
        }
    }

    #[test]
    fn test_every_index_gets_drawn() {
        let selector = PairSelector::new(false);
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [false; 6];

        for _ in 0..500 {
            let pair = selector.next_pair(&mut rng, 6, None).unwrap();
            seen[pair.first] = true;
            seen[pair.second] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
