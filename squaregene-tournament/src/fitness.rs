//! Fitness accounting for a round robin
//!
//! Level 3 - Step-level implementation
//!
//! Every pairing reports an owned `PairingOutcome`; outcomes are merged on
//! one thread once all pairings have finished.

use crate::match_play::{MatchError, MatchResult};

/// Result of one pairing of the round robin
#[derive(Clone, Debug)]
pub enum PairingOutcome {
    /// Both games finished
    Completed { i: usize, j: usize, result: MatchResult },
    /// A game faulted or the pairing panicked
    Faulted { i: usize, j: usize, error: MatchError },
    /// The pairing never ran
    Dropped { i: usize, j: usize, reason: String },
}

impl PairingOutcome {
    /// Population indices of the two genomes
    pub fn pair(&self) -> (usize, usize) {
        match *self {
            PairingOutcome::Completed { i, j, .. }
            | PairingOutcome::Faulted { i, j, .. }
            | PairingOutcome::Dropped { i, j, .. } => (i, j),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, PairingOutcome::Completed { .. })
    }
}

/// Fitness of a whole population
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// `wins[k] / (2 * (N - 1))`, by population index
    pub fitness: Vec<f64>,
    /// Games won, by population index
    pub wins: Vec<u32>,
    /// Pairings that faulted
    pub failed_pairings: usize,
    /// Pairings that never ran
    pub dropped_pairings: usize,
}

impl Evaluation {
    /// Highest fitness (0 for an empty evaluation)
    pub fn max_fitness(&self) -> f64 {
        self.fitness.iter().cloned().fold(0.0, f64::max)
    }

    /// Average fitness (0 for an empty evaluation)
    pub fn mean_fitness(&self) -> f64 {
        if self.fitness.is_empty() {
            0.0
        } else {
            self.fitness.iter().sum::<f64>() / self.fitness.len() as f64
        }
    }

    /// Games won across the population
    pub fn total_wins(&self) -> u32 {
        self.wins.iter().sum()
    }
}

/// Merge pairing outcomes into per-genome fitness.
///
/// Only completed pairings contribute wins; the merge does not depend on
/// the order of `outcomes`.
pub fn merge_outcomes(population_size: usize, outcomes: &[PairingOutcome]) -> Evaluation {
    let mut wins = vec![0u32; population_size];
    let mut failed_pairings = 0;
    let mut dropped_pairings = 0;

    for outcome in outcomes {
        match outcome {
            PairingOutcome::Completed { i, j, result } => {
                wins[*i] += result.wins_a;
                wins[*j] += result.wins_b;
            }
            PairingOutcome::Faulted { .. } => failed_pairings += 1,
            PairingOutcome::Dropped { .. } => dropped_pairings += 1,
        }
    }

    let games_each = 2 * population_size.saturating_sub(1);
    let fitness = wins
        .iter()
        .map(|&w| {
            if games_each == 0 {
                0.0
            } else {
                w as f64 / games_each as f64
            }
        })
        .collect();

    Evaluation {
        fitness,
        wins,
        failed_pairings,
        dropped_pairings,
    }
}
