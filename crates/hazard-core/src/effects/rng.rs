//! RNG trait abstraction for probability triggers
//!
//! Lets the engine run with a host-provided generator (server-side
//! deterministic) or any seeded `rand` generator in tests.

/// Random number source for effect triggers
pub trait TriggerRng {
    /// Generate random f64 in [0.0, 1.0)
    fn gen_unit(&mut self) -> f64;

    /// Check if a random sample falls below the probability
    fn check_probability(&mut self, probability: f64) -> bool {
        self.gen_unit() < probability
    }
}

// Blanket implementation for any type implementing rand::Rng
impl<T: ?Sized + rand::Rng> TriggerRng for T {
    fn gen_unit(&mut self) -> f64 {
        rand::Rng::r#gen(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn test_trigger_rng_gen_unit() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(12345);

        for _ in 0..100 {
            let val = rng.gen_unit();
            assert!(val >= 0.0);
            assert!(val < 1.0);
        }
    }

    #[test]
    fn test_check_probability_bounds() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(12345);

        for _ in 0..100 {
            assert!(rng.check_probability(1.0));
            assert!(!rng.check_probability(0.0));
        }
    }

    #[test]
    fn test_check_probability_distribution() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(54321);

        let hits = (0..10_000).filter(|_| rng.check_probability(0.3)).count();
        assert!((2_700..3_300).contains(&hits), "{hits} hits out of 10000");
    }
}
