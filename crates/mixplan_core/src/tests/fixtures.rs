//! Synthetic observation generators

use jiff::civil::Date;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::calendar::add_days;
use crate::model::Observation;

pub const START: Date = jiff::civil::date(2024, 1, 1);

/// `days` of two-channel history with `revenue = 3 * a + 5 * b + noise`
///
/// Revenue is booked on channel `a`'s row; channel `b` rows carry zero revenue,
/// so the per-date sum equals the generating formula.
pub fn linear_two_channel(days: usize, noise_std: f64, seed: u64) -> Vec<Observation> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, noise_std).unwrap();

    (0..days)
        .flat_map(|d| {
            let date = add_days(START, d as i64);
            let a: f64 = rng.random_range(100.0..1000.0);
            let b: f64 = rng.random_range(50.0..500.0);
            let revenue = 3.0 * a + 5.0 * b + noise.sample(&mut rng);
            [
                Observation::new(date, "a", a, revenue),
                Observation::new(date, "b", b, 0.0),
            ]
        })
        .collect()
}
