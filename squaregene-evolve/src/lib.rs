//! SQUAREGENE Evolution - Genetic algorithm for piece-square genomes
//!
//! This crate provides the evolutionary side of training:
//! - Mutation (per-gene bounded nudges)
//! - Quadrant crossover
//! - Fitness-proportional parent selection
//! - The generation loop, parametrized by a fitness function
//!
//! Fitness evaluation itself lives in `squaregene-tournament`; the loop only
//! sees it as a closure over the current population.

pub mod crossover;
pub mod mutation;
pub mod selection;

use rand::Rng;
use squaregene_core::Genome;

pub use crossover::{cross, cross_with, Quadrant};
pub use mutation::{mutate, MUTATION_DELTA};
pub use selection::{select_parent, Roulette};

/// Evolution configuration
#[derive(Clone, Debug)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    /// Per-gene mutation probability
    pub mutation_frequency: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 10_000,
            mutation_frequency: 0.2,
        }
    }
}

/// Outcome of a full evolution run
#[derive(Clone, Debug)]
pub struct EvolutionResult {
    /// Final population, in breeding order
    pub population: Vec<Genome>,
    /// Fitness of the final population
    pub fitness: Vec<f64>,
    /// Best fitness per evaluated generation, final evaluation included
    pub best_fitness_history: Vec<f64>,
    /// Average fitness per evaluated generation, final evaluation included
    pub avg_fitness_history: Vec<f64>,
}

impl EvolutionResult {
    /// Index and fitness of the strongest individual (first on ties)
    pub fn champion(&self) -> Option<(usize, f64)> {
        self.fitness
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (i, f)| match best {
                Some((_, bf)) if bf >= f => best,
                _ => Some((i, f)),
            })
    }
}

/// Best and average of a fitness vector; (0, 0) when empty
pub fn fitness_stats(fitness: &[f64]) -> (f64, f64) {
    if fitness.is_empty() {
        return (0.0, 0.0);
    }
    let best = fitness.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let avg = fitness.iter().sum::<f64>() / fitness.len() as f64;
    (best, avg)
}

/// `size` genomes with uniform random weights
pub fn random_population<R: Rng>(size: usize, rng: &mut R) -> Vec<Genome> {
    (0..size).map(|_| Genome::random(rng)).collect()
}

/// Breed a replacement generation of the same size.
///
/// Each child is `mutate(cross(a, b))` with both parents drawn
/// independently by fitness-proportional selection.
///
/// # Panics
/// Panics if population is empty or the slices differ in length
pub fn breed_generation<R: Rng>(
    population: &[Genome],
    fitness: &[f64],
    mutation_frequency: f64,
    rng: &mut R,
) -> Vec<Genome> {
    assert_eq!(population.len(), fitness.len(), "Population and fitness must have same length");
    let wheel = Roulette::new(fitness);

    (0..population.len())
        .map(|_| {
            let a = select_parent(population, &wheel, rng);
            let b = select_parent(population, &wheel, rng);
            mutate(&cross(a, b, rng), mutation_frequency, rng)
        })
        .collect()
}

/// Run the generation loop.
///
/// For each generation: evaluate, record history, report through
/// `callback(generation, population, fitness)`, then replace the whole
/// population with bred children (no elitism). The population left after
/// the last generation is evaluated once more; that evaluation is reported
/// with `generation == config.generations` and becomes the result fitness.
///
/// An error from `fitness_fn` aborts the run.
pub fn evolve_with_callback<F, C, E, R>(
    initial_population: Vec<Genome>,
    config: &EvolutionConfig,
    mut fitness_fn: F,
    mut callback: C,
    rng: &mut R,
) -> Result<EvolutionResult, E>
where
    F: FnMut(&[Genome]) -> Result<Vec<f64>, E>,
    C: FnMut(usize, &[Genome], &[f64]),
    R: Rng,
{
    let mut population = initial_population;
    let mut best_fitness_history = Vec::with_capacity(config.generations + 1);
    let mut avg_fitness_history = Vec::with_capacity(config.generations + 1);

    for generation in 0..config.generations {
        let fitness = fitness_fn(&population)?;

        let (best, avg) = fitness_stats(&fitness);
        best_fitness_history.push(best);
        avg_fitness_history.push(avg);
        callback(generation, &population, &fitness);

        population = breed_generation(&population, &fitness, config.mutation_frequency, rng);
    }

    let fitness = fitness_fn(&population)?;
    let (best, avg) = fitness_stats(&fitness);
    best_fitness_history.push(best);
    avg_fitness_history.push(avg);
    callback(config.generations, &population, &fitness);

    Ok(EvolutionResult {
        population,
        fitness,
        best_fitness_history,
        avg_fitness_history,
    })
}
