//! Integration tests for the SQUAREGENE trainer
//!
//! Tests the full stack: chess adapter, greedy match play, round-robin
//! evaluation, the evolution loop and the `squaregene` binary.

use std::path::PathBuf;
use std::process::Command;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use squaregene_core::{ChessGame, Genome, Report};
use squaregene_evolve::{evolve_with_callback, random_population, EvolutionConfig};
use squaregene_tournament::{
    evaluate_population, play_match, EvalConfig, GameStatus, MatchConfig, StalemateRule,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn quick_eval(max_half_moves: u32) -> EvalConfig {
    EvalConfig::new(MatchConfig::new(max_half_moves)).with_threads(2)
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("squaregene-it-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

// ============================================================================
// EVALUATION TESTS
// ============================================================================

#[test]
fn test_zero_population_scores_half() {
    let population = vec![Genome::zeroed(); 4];
    let eval = evaluate_population(&population, &EvalConfig::default()).unwrap();

    // Every game is the same decisive game, so every match splits 1-1
    assert_eq!(eval.fitness, vec![0.5; 4]);
    assert_eq!(eval.total_wins(), 4 * 3);

    let config = MatchConfig::default();
    let result = play_match::<ChessGame>(&population[0], &population[3], &config).unwrap();
    let [first, second] = &result.games;
    assert_eq!(first, second);
    assert_eq!((result.wins_a, result.wins_b), (1, 1));
    match first.termination {
        GameStatus::TerminatedByMoveCap => assert_eq!(first.half_moves, config.max_half_moves),
        GameStatus::TerminatedByNoMoves => assert!(first.half_moves <= config.max_half_moves),
        GameStatus::InProgress => panic!("game left unfinished"),
    }
}

#[test]
fn test_fitness_normalization() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let population = random_population(6, &mut rng);

    let eval = evaluate_population(&population, &quick_eval(60)).unwrap();

    assert_eq!(eval.failed_pairings, 0);
    assert_eq!(eval.total_wins(), 6 * 5);
    assert!(eval.fitness.iter().all(|f| (0.0..=1.0).contains(f)));
    let total: f64 = eval.fitness.iter().sum();
    assert!((total - 3.0).abs() < 1e-9, "fitness sums to {}", total);
}

#[test]
fn test_draw_rule_never_inflates_wins() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let population = random_population(4, &mut rng);
    let config = EvalConfig::new(MatchConfig::new(60).with_stalemate_rule(StalemateRule::Draw));

    let eval = evaluate_population(&population, &config).unwrap();
    assert!(eval.total_wins() <= 4 * 3);
}

// ============================================================================
// EVOLUTION TESTS
// ============================================================================

#[test]
fn test_short_evolution_run() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let config = EvolutionConfig {
        population_size: 4,
        generations: 2,
        mutation_frequency: 0.2,
    };
    let eval_config = quick_eval(30);
    let population = random_population(config.population_size, &mut rng);

    let result = evolve_with_callback(
        population,
        &config,
        |pop: &[Genome]| evaluate_population(pop, &eval_config).map(|e| e.fitness),
        |_, _, _| {},
        &mut rng,
    )
    .unwrap();

    assert_eq!(result.population.len(), 4);
    assert_eq!(result.best_fitness_history.len(), 3);
    assert!(result.fitness.iter().all(|f| (0.0..=1.0).contains(f)));

    let report = Report::new(&result.population, &result.fitness);
    let dir = scratch_dir("report");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("report.json");
    report.save(&path).unwrap();

    let loaded = Report::load(&path).unwrap();
    std::fs::remove_dir_all(&dir).ok();
    assert_eq!(loaded, report);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = |seed: u64| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let config = EvolutionConfig {
            population_size: 3,
            generations: 1,
            mutation_frequency: 0.3,
        };
        let eval_config = quick_eval(20);
        let population = random_population(3, &mut rng);
        evolve_with_callback(
            population,
            &config,
            |pop: &[Genome]| evaluate_population(pop, &eval_config).map(|e| e.fitness),
            |_, _, _| {},
            &mut rng,
        )
        .unwrap()
    };

    let first = run(9);
    let second = run(9);
    assert_eq!(first.population, second.population);
    assert_eq!(first.fitness, second.fitness);
}

// ============================================================================
// BINARY TESTS
// ============================================================================

#[test]
fn test_evolve_command_writes_outputs() {
    let dir = scratch_dir("evolve");
    let status = Command::new(env!("CARGO_BIN_EXE_squaregene"))
        .args(["--seed", "1", "evolve", "--population", "3", "--generations", "1"])
        .args(["--max-half-moves", "20", "--no-progress", "--output"])
        .arg(&dir)
        .status()
        .unwrap();
    assert!(status.success());

    let report = Report::load(&dir.join("report.json")).unwrap();
    assert_eq!(report.len(), 3);

    let history = std::fs::read_to_string(dir.join("fitness_history.csv")).unwrap();
    let lines: Vec<&str> = history.lines().collect();
    assert_eq!(lines[0], "generation,best_fitness,avg_fitness");
    assert_eq!(lines.len(), 3);

    let output = Command::new(env!("CARGO_BIN_EXE_squaregene"))
        .args(["match", "--a", "0", "--b", "2", "--max-half-moves", "20", "--json", "--report"])
        .arg(dir.join("report.json"))
        .output()
        .unwrap();
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["games"].as_array().map(|g| g.len()), Some(2));
}

#[test]
fn test_evolve_command_rejects_tiny_population() {
    let dir = scratch_dir("tiny");
    let status = Command::new(env!("CARGO_BIN_EXE_squaregene"))
        .args(["evolve", "--population", "1", "--generations", "1", "--output"])
        .arg(&dir)
        .status()
        .unwrap();

    assert!(!status.success());
    assert!(!dir.join("report.json").exists());
}
