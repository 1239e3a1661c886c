use rand::{seq::SliceRandom, Rng};

/// Greedy selection that breaks ties uniformly at random
///
/// The random source is owned, so a seeded generator makes every choice reproducible.
pub struct Greedy<R: Rng> {
    rng: R,
}

impl<R: Rng> Greedy<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Pick one of the candidates whose value equals the maximum
    ///
    /// Values are compared with exact equality. NaN values are never selected.
    ///
    /// **Returns** `None` if there is nothing to choose from
    pub fn choose<A: Copy>(&mut self, candidates: &[(A, f64)]) -> Option<A> {
        let max = candidates
            .iter()
            .map(|&(_, v)| v)
            .fold(f64::NEG_INFINITY, f64::max);
        let ties: Vec<A> = candidates
            .iter()
            .filter(|&&(_, v)| v == max)
            .map(|&(a, _)| a)
            .collect();
        ties.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn dominant_value_always_wins() {
        let mut greedy = Greedy::new(StdRng::seed_from_u64(7));
        let candidates = [('a', 0.0), ('b', 1.5), ('c', 1.0), ('d', -3.0)];
        for _ in 0..100 {
            assert_eq!(greedy.choose(&candidates), Some('b'));
        }
    }

    #[test]
    fn ties_are_reproducible_with_a_seed() {
        let candidates = [(0, 2.0), (1, 2.0), (2, 2.0), (3, 1.0)];
        let mut first = Greedy::new(StdRng::seed_from_u64(9527));
        let mut second = Greedy::new(StdRng::seed_from_u64(9527));
        let a: Vec<_> = (0..50).map(|_| first.choose(&candidates)).collect();
        let b: Vec<_> = (0..50).map(|_| second.choose(&candidates)).collect();
        assert_eq!(a, b, "Same seed, same choices");
    }

    #[test]
    fn ties_cover_every_maximum() {
        let mut greedy = Greedy::new(StdRng::seed_from_u64(1));
        let candidates = [(0, 2.0), (1, 2.0), (2, 2.0), (3, 1.0)];
        let mut seen = [false; 4];
        for _ in 0..500 {
            let choice = greedy.choose(&candidates).unwrap();
            seen[choice] = true;
        }
        assert_eq!(seen, [true, true, true, false], "Only tied maxima are chosen");
    }

    #[test]
    fn nothing_to_choose() {
        let mut greedy = Greedy::new(StdRng::seed_from_u64(1));
        assert_eq!(greedy.choose::<u8>(&[]), None);
        assert_eq!(greedy.choose(&[(1u8, f64::NAN)]), None, "NaN is never a maximum");
    }
}
