//! SQUAREGENE Tournament - Fitness evaluation through self-play
//!
//! This crate provides tournament infrastructure:
//! - Greedy single-ply game play between genomes
//! - Two-game matches with colours swapped
//! - Round-robin population evaluation on a bounded worker pool
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: Evaluator, evaluate_population (orchestration)
//! - Level 2: play_match, dispatch (phases)
//! - Level 3: GameRunner, merge_outcomes (steps)
//! - Level 4: move selection, configuration

mod config;
mod fitness;
mod game_runner;
mod match_play;
mod tournament;

pub use config::{EvalConfig, MatchConfig, StalemateRule};
pub use fitness::{merge_outcomes, Evaluation, PairingOutcome};
pub use game_runner::{select_move, select_promotion, GameOutcome, GameRunner, GameStatus};
pub use match_play::{play_match, GreedyPlayer, MatchError, MatchPlayer, MatchResult};
pub use tournament::{
    evaluate_population, evaluate_with, generate_round_robin_pairings, Evaluator, TournamentError,
};
