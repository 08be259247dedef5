//! Seeded synthetic series shared by the unit tests.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};

/// Standard normal draws.
pub fn white_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| StandardNormal.sample(&mut rng)).collect()
}

/// Cumulative sum of white noise, shifted to start at `start`.
pub fn random_walk(n: usize, seed: u64, start: f64) -> Vec<f64> {
    let mut level = start;
    white_noise(n, seed)
        .into_iter()
        .map(|e| {
            level += e;
            level
        })
        .collect()
}

/// Geometric random walk: log returns are `N(0, sigma^2)`.
pub fn price_path(n: usize, seed: u64, start: f64, sigma: f64) -> Vec<f64> {
    let mut log_price = start.ln();
    white_noise(n, seed)
        .into_iter()
        .map(|e| {
            log_price += sigma * e;
            log_price.exp()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{mean, std_dev};

    #[test]
    fn white_noise_is_standard_normal_and_reproducible() {
        let xs = white_noise(5000, 1);
        assert!(mean(&xs).abs() < 0.1);
        assert!((std_dev(&xs) - 1.0).abs() < 0.1);
        assert_eq!(xs, white_noise(5000, 1));
        assert_ne!(xs, white_noise(5000, 2));
    }
}
