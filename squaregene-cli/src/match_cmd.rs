//! Match command - replay one pairing between two genomes of a report
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_pair(), report_results()
//! - Level 3: summarize()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use squaregene_core::{ChessGame, Genome, Report, Side};
use squaregene_tournament::{play_match, GameOutcome, GameStatus, MatchResult};

use crate::evolve::{build_match_config, SideArg, StalemateArg};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Report JSON file produced by `evolve`
    #[arg(long, value_name = "FILE")]
    pub report: PathBuf,

    /// Index of the first genome (white in game 1)
    #[arg(long)]
    pub a: usize,

    /// Index of the second genome (white in game 2)
    #[arg(long)]
    pub b: usize,

    /// Half-move cap per game
    #[arg(long, default_value = "200")]
    pub max_half_moves: u32,

    /// Scoring when a side has no legal moves
    #[arg(long, value_enum, default_value = "mover-loses")]
    pub stalemate: StalemateArg,

    /// Winner on equal material at the half-move cap
    #[arg(long, value_enum, default_value = "black")]
    pub material_tie: SideArg,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Printable match outcome
#[derive(Debug, Serialize)]
struct MatchSummary {
    a: usize,
    b: usize,
    wins_a: u32,
    wins_b: u32,
    games: Vec<GameSummary>,
}

#[derive(Debug, Serialize)]
struct GameSummary {
    /// Report index of the genome playing white
    white: usize,
    winner: Option<Side>,
    termination: &'static str,
    half_moves: u32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Load both genomes from the report
/// 2. Play the two-game match
/// 3. Report results
pub fn run(args: MatchArgs) -> Result<()> {
    let (a, b) = load_pair(&args)?;
    let config = build_match_config(args.max_half_moves, args.stalemate, args.material_tie);

    tracing::info!(
        "Starting match: #{} vs #{} (max_half_moves={})",
        args.a,
        args.b,
        args.max_half_moves
    );

    let result = play_match::<ChessGame>(&a, &b, &config).context("Match aborted")?;

    report_results(&summarize(&result, args.a, args.b), args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Load the two requested genomes
fn load_pair(args: &MatchArgs) -> Result<(Genome, Genome)> {
    let report = Report::load(&args.report)?;
    let pick = |index: usize| -> Result<Genome> {
        report
            .entries
            .get(index)
            .map(|e| e.genome.clone())
            .with_context(|| format!("Report has {} individuals, no index {}", report.len(), index))
    };

    Ok((pick(args.a)?, pick(args.b)?))
}

/// Print results as text or JSON
fn report_results(summary: &MatchSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("\n=== Match #{} vs #{} ===", summary.a, summary.b);
    for (n, game) in summary.games.iter().enumerate() {
        println!(
            "Game {}: #{} as white, {} by {} after {} half-moves",
            n + 1,
            game.white,
            format_winner(game.winner),
            game.termination,
            game.half_moves
        );
    }
    println!("Score: #{} {} - {} #{}", summary.a, summary.wins_a, summary.wins_b, summary.b);

    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn summarize(result: &MatchResult, a: usize, b: usize) -> MatchSummary {
    let game = |outcome: &GameOutcome, white: usize| GameSummary {
        white,
        winner: outcome.winner,
        termination: termination_name(outcome.termination),
        half_moves: outcome.half_moves,
    };

    MatchSummary {
        a,
        b,
        wins_a: result.wins_a,
        wins_b: result.wins_b,
        games: vec![game(&result.games[0], a), game(&result.games[1], b)],
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn termination_name(status: GameStatus) -> &'static str {
    match status {
        GameStatus::InProgress => "in-progress",
        GameStatus::TerminatedByNoMoves => "no-moves",
        GameStatus::TerminatedByMoveCap => "move-cap",
    }
}

fn format_winner(winner: Option<Side>) -> String {
    match winner {
        Some(side) => format!("{} wins", side),
        None => "draw".to_string(),
    }
}
