//! Round-robin population evaluation
//!
//! Level 1 - Orchestration and Level 2 - Phases
//!
//! Every unordered pair of genomes plays one match. Pairings run on a
//! bounded rayon pool, each returning an owned outcome; a fault or panic in
//! one pairing only costs that pairing.

use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use squaregene_core::{ChessGame, Genome};

use crate::config::EvalConfig;
use crate::fitness::{merge_outcomes, Evaluation, PairingOutcome};
use crate::match_play::{GreedyPlayer, MatchError, MatchPlayer};

/// Errors that prevent a population from being evaluated at all
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("population of {0} cannot play a round robin, need at least 2")]
    PopulationTooSmall(usize),
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Evaluate a population with greedy chess play (Level 1 orchestration)
///
/// Builds a throwaway [`Evaluator`]; loops over many generations should
/// keep one evaluator so the worker pool is reused.
///
/// # Arguments
/// * `population` - Genomes to evaluate
/// * `config` - Evaluation configuration
///
/// # Returns
/// Per-genome fitness, `wins / (2 * (N - 1))`
pub fn evaluate_population(population: &[Genome], config: &EvalConfig) -> Result<Evaluation, TournamentError> {
    Evaluator::new(config.clone()).evaluate(population)
}

/// Evaluate a population with any pairing player
pub fn evaluate_with<P: MatchPlayer>(
    population: &[Genome],
    config: &EvalConfig,
    player: &P,
) -> Result<Evaluation, TournamentError> {
    Evaluator::new(config.clone()).evaluate_with(population, player)
}

/// Round-robin evaluator owning the worker pool.
///
/// The pool is built on the first parallel evaluation and reused by every
/// later one. A failed build is retried on the next evaluation.
pub struct Evaluator {
    config: EvalConfig,
    pool: OnceLock<ThreadPool>,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            config,
            pool: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluate with greedy chess play
    pub fn evaluate(&self, population: &[Genome]) -> Result<Evaluation, TournamentError> {
        let player = GreedyPlayer::<ChessGame>::new(self.config.match_config.clone());
        self.evaluate_with(population, &player)
    }

    /// Evaluate with any pairing player
    pub fn evaluate_with<P: MatchPlayer>(
        &self,
        population: &[Genome],
        player: &P,
    ) -> Result<Evaluation, TournamentError> {
        let n = population.len();
        if n < 2 {
            return Err(TournamentError::PopulationTooSmall(n));
        }

        let pairings = generate_round_robin_pairings(n);
        let progress = create_progress_bar(pairings.len(), self.config.show_progress);

        let outcomes = if self.config.parallel {
            dispatch(population, &pairings, player, self.pool(), &progress)
        } else {
            pairings
                .iter()
                .map(|&(i, j)| run_pairing(population, i, j, player, &progress))
                .collect()
        };
        progress.finish_and_clear();

        let evaluation = merge_outcomes(n, &outcomes);
        tracing::debug!(
            "Evaluated {} pairings: {} failed, {} dropped",
            pairings.len(),
            evaluation.failed_pairings,
            evaluation.dropped_pairings
        );

        Ok(evaluation)
    }

    /// The shared pool, built on first use
    fn pool(&self) -> Result<&ThreadPool, String> {
        if let Some(pool) = self.pool.get() {
            return Ok(pool);
        }

        let threads = self.config.resolved_threads();
        let pool = build_pool(self.config.dispatch_retries, || {
            ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("squaregene-eval-{}", i))
                .build()
        })
        .map_err(|e| e.to_string())?;
        tracing::debug!("Built worker pool with {} threads", threads);

        Ok(self.pool.get_or_init(|| pool))
    }
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Run every pairing on `pool`, or drop them all when no pool exists
fn dispatch<P: MatchPlayer>(
    population: &[Genome],
    pairings: &[(usize, usize)],
    player: &P,
    pool: Result<&ThreadPool, String>,
    progress: &ProgressBar,
) -> Vec<PairingOutcome> {
    match pool {
        Ok(pool) => pool.install(|| {
            pairings
                .par_iter()
                .map(|&(i, j)| run_pairing(population, i, j, player, progress))
                .collect()
        }),
        Err(reason) => {
            tracing::error!("No worker pool, dropping {} pairings: {}", pairings.len(), reason);
            pairings
                .iter()
                .map(|&(i, j)| PairingOutcome::Dropped {
                    i,
                    j,
                    reason: reason.clone(),
                })
                .collect()
        }
    }
}

/// Build a pool, retrying up to `retries` times after the first attempt
fn build_pool<F>(retries: u32, mut build: F) -> Result<ThreadPool, ThreadPoolBuildError>
where
    F: FnMut() -> Result<ThreadPool, ThreadPoolBuildError>,
{
    let attempts = retries.saturating_add(1);
    let mut attempt = 1;

    loop {
        match build() {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < attempts => {
                tracing::warn!("Worker pool attempt {}/{} failed: {}", attempt, attempts, e);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Generate all pairings for round-robin
pub fn generate_round_robin_pairings(n: usize) -> Vec<(usize, usize)> {
    let mut pairings = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            pairings.push((i, j));
        }
    }
    pairings
}

/// Play one pairing, turning faults and panics into an outcome
fn run_pairing<P: MatchPlayer>(
    population: &[Genome],
    i: usize,
    j: usize,
    player: &P,
    progress: &ProgressBar,
) -> PairingOutcome {
    let played = panic::catch_unwind(AssertUnwindSafe(|| player.play(&population[i], &population[j])))
        .unwrap_or_else(|payload| Err(MatchError::Panicked(panic_message(payload.as_ref()))));
    progress.inc(1);

    match played {
        Ok(result) => PairingOutcome::Completed { i, j, result },
        Err(error) => {
            tracing::warn!("Pairing ({}, {}) failed: {}", i, j, error);
            PairingOutcome::Faulted { i, j, error }
        }
    }
}

// ============================================================================
// Level 4 - Utilities
// ============================================================================

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}

fn create_progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} pairings [{bar:40}] {pos}/{len} ({eta})") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}
