//! Selection operators for genetic algorithms
//!
//! Implements fitness-proportional (roulette wheel) selection with
//! replacement: each individual is picked with probability proportional
//! to its fitness.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Roulette wheel over a fitness vector.
///
/// Negative and non-finite fitness values count as zero. When nothing has
/// positive weight the wheel degrades to a uniform choice.
#[derive(Clone, Debug)]
pub struct Roulette {
    weights: Option<WeightedIndex<f64>>,
    len: usize,
}

impl Roulette {
    /// # Panics
    /// Panics if `fitness` is empty
    pub fn new(fitness: &[f64]) -> Self {
        assert!(!fitness.is_empty(), "Population cannot be empty");

        let clean = fitness
            .iter()
            .map(|&f| if f.is_finite() && f > 0.0 { f } else { 0.0 });
        let weights = WeightedIndex::new(clean).ok();
        if weights.is_none() {
            tracing::warn!(
                "All {} fitness values are zero, selecting parents uniformly",
                fitness.len()
            );
        }

        Self {
            weights,
            len: fitness.len(),
        }
    }

    /// Number of individuals on the wheel
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether selection fell back to a uniform choice
    pub fn is_uniform(&self) -> bool {
        self.weights.is_none()
    }

    /// Draw one index
    pub fn spin<R: Rng>(&self, rng: &mut R) -> usize {
        match &self.weights {
            Some(dist) => dist.sample(rng),
            None => rng.gen_range(0..self.len),
        }
    }
}

/// Select one parent by fitness-proportional selection.
///
/// # Arguments
/// * `population` - Individuals to select from
/// * `wheel` - Roulette built over the population's fitness
/// * `rng` - Random number generator
///
/// # Panics
/// Panics if the wheel was built for a different population size
pub fn select_parent<'a, T, R: Rng>(population: &'a [T], wheel: &Roulette, rng: &mut R) -> &'a T {
    assert_eq!(population.len(), wheel.len(), "Population and fitness must have same length");
    &population[wheel.spin(rng)]
}
