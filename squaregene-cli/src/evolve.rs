//! Evolution command - evolve piece-square genomes through self-play
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_initial_population(), run_evolution(), save_results()
//! - Level 3: validate_args(), fill_population(), create_fitness_fn()
//! - Level 4: file I/O, formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use squaregene_core::{Genome, Report, Side};
use squaregene_evolve::{evolve_with_callback, fitness_stats, EvolutionConfig, EvolutionResult};
use squaregene_tournament::{EvalConfig, Evaluator, MatchConfig, StalemateRule, TournamentError};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Scoring when the side to move has no legal moves
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StalemateArg {
    /// The side to move always loses
    MoverLoses,
    /// Stalemate is a draw, checkmate still loses
    Draw,
}

/// Player side
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SideArg {
    White,
    Black,
}

/// How fresh genomes are initialised
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InitArg {
    /// Weights uniform in [0, 1)
    Random,
    /// All weights zero
    Zero,
}

#[derive(Args)]
pub struct EvolveArgs {
    /// Population size
    #[arg(long, default_value = "50")]
    pub population: usize,

    /// Number of generations to run
    #[arg(long, default_value = "10000")]
    pub generations: usize,

    /// Per-gene mutation probability (0.0-1.0)
    #[arg(long, default_value = "0.2")]
    pub mutation_frequency: f64,

    /// Half-move cap per game
    #[arg(long, default_value = "200")]
    pub max_half_moves: u32,

    /// Worker threads for evaluation (0 = all cores)
    #[arg(long, default_value = "0")]
    pub threads: usize,

    /// Scoring when a side has no legal moves
    #[arg(long, value_enum, default_value = "mover-loses")]
    pub stalemate: StalemateArg,

    /// Winner on equal material at the half-move cap
    #[arg(long, value_enum, default_value = "black")]
    pub material_tie: SideArg,

    /// Initialisation of genomes not loaded from a report
    #[arg(long, value_enum, default_value = "random")]
    pub init: InitArg,

    /// Seed the population from an existing report
    #[arg(long, value_name = "FILE")]
    pub init_from: Option<PathBuf>,

    /// Output directory for results
    #[arg(long, default_value = "evolution_output")]
    pub output: PathBuf,

    /// Hide the pairing progress bar
    #[arg(long)]
    pub no_progress: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run evolution command
///
/// This function reads like a table of contents:
/// 1. Validate arguments and build configuration
/// 2. Load initial population
/// 3. Run evolution loop
/// 4. Save results
pub fn run(args: EvolveArgs, seed: Option<u64>) -> Result<()> {
    validate_args(&args)?;

    let config = build_evolution_config(&args);
    let eval_config = build_eval_config(&args);
    let mut rng = create_rng(seed);

    tracing::info!(
        "Starting evolution: pop={}, gen={}, mutation={}, max_half_moves={}",
        args.population,
        args.generations,
        args.mutation_frequency,
        args.max_half_moves
    );

    let population = load_initial_population(&args, &mut rng)?;
    let result = run_evolution(population, &config, &eval_config, &mut rng)?;

    save_results(&result, &args.output)?;

    print_summary(&result, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Build evolution configuration from command arguments
fn build_evolution_config(args: &EvolveArgs) -> EvolutionConfig {
    EvolutionConfig {
        population_size: args.population,
        generations: args.generations,
        mutation_frequency: args.mutation_frequency,
    }
}

/// Build evaluation configuration from command arguments
fn build_eval_config(args: &EvolveArgs) -> EvalConfig {
    EvalConfig::new(build_match_config(args.max_half_moves, args.stalemate, args.material_tie))
        .with_threads(args.threads)
        .with_progress(!args.no_progress)
}

/// Load initial population from a report or generate it
fn load_initial_population(args: &EvolveArgs, rng: &mut ChaCha8Rng) -> Result<Vec<Genome>> {
    let mut population = match &args.init_from {
        Some(path) => {
            let report = Report::load(path)?;
            tracing::info!("Loaded {} genomes from {}", report.len(), path.display());
            report.entries.into_iter().map(|e| e.genome).collect()
        }
        None => Vec::new(),
    };

    fill_population(&mut population, args.population, args.init, rng);

    tracing::info!("Initial population: {} genomes", population.len());

    Ok(population)
}

/// Run the evolution loop with progress callback
fn run_evolution(
    population: Vec<Genome>,
    config: &EvolutionConfig,
    eval_config: &EvalConfig,
    rng: &mut ChaCha8Rng,
) -> Result<EvolutionResult> {
    let evaluator = Evaluator::new(eval_config.clone());
    let fitness_fn = create_fitness_fn(&evaluator);
    let generations = config.generations;

    // Progress callback
    let callback = |gen: usize, _pop: &[Genome], fitness: &[f64]| {
        let (best, avg) = fitness_stats(fitness);
        if gen < generations {
            tracing::info!("Generation {}: best={:.3}, avg={:.3}", gen + 1, best, avg);
        } else {
            tracing::info!("Final evaluation: best={:.3}, avg={:.3}", best, avg);
        }
    };

    let result = evolve_with_callback(population, config, fitness_fn, callback, rng)
        .context("Fitness evaluation failed")?;

    Ok(result)
}

/// Save evolution results to output directory
fn save_results(result: &EvolutionResult, output: &Path) -> Result<()> {
    std::fs::create_dir_all(output).context("Failed to create output directory")?;

    save_report(result, output)?;
    save_fitness_history(result, output)?;

    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Reject configurations the trainer cannot run
fn validate_args(args: &EvolveArgs) -> Result<()> {
    if args.population < 2 {
        anyhow::bail!("Population must be at least 2, got {}", args.population);
    }
    if !(0.0..=1.0).contains(&args.mutation_frequency) {
        anyhow::bail!("Mutation frequency must be within [0, 1], got {}", args.mutation_frequency);
    }
    if args.max_half_moves == 0 {
        anyhow::bail!("Max half-moves must be at least 1");
    }
    Ok(())
}

/// Truncate or pad the population to `target_size`
fn fill_population(population: &mut Vec<Genome>, target_size: usize, init: InitArg, rng: &mut ChaCha8Rng) {
    population.truncate(target_size);

    while population.len() < target_size {
        let genome = match init {
            InitArg::Random => Genome::random(rng),
            InitArg::Zero => Genome::zeroed(),
        };
        population.push(genome);
    }
}

/// Create fitness evaluation function
///
/// Plays the full round robin and returns each genome's share of games won.
fn create_fitness_fn(evaluator: &Evaluator) -> impl FnMut(&[Genome]) -> Result<Vec<f64>, TournamentError> + '_ {
    move |population: &[Genome]| {
        let evaluation = evaluator.evaluate(population)?;

        if evaluation.failed_pairings > 0 || evaluation.dropped_pairings > 0 {
            tracing::warn!(
                "{} pairings failed and {} were dropped this generation",
                evaluation.failed_pairings,
                evaluation.dropped_pairings
            );
        }

        Ok(evaluation.fitness)
    }
}

/// Save the final population with its fitness
fn save_report(result: &EvolutionResult, output: &Path) -> Result<()> {
    let path = output.join("report.json");
    Report::new(&result.population, &result.fitness)
        .save(&path)
        .context("Failed to save report")?;
    tracing::info!("Saved report to {}", path.display());

    Ok(())
}

/// Save fitness history to CSV
fn save_fitness_history(result: &EvolutionResult, output: &Path) -> Result<()> {
    let path = output.join("fitness_history.csv");
    let mut content = String::from("generation,best_fitness,avg_fitness\n");

    for (i, (best, avg)) in result
        .best_fitness_history
        .iter()
        .zip(&result.avg_fitness_history)
        .enumerate()
    {
        content.push_str(&format!("{},{:.4},{:.4}\n", i + 1, best, avg));
    }

    std::fs::write(&path, content).context("Failed to write fitness history")?;
    tracing::info!("Saved fitness history to {}", path.display());

    Ok(())
}

/// Print summary to console
fn print_summary(result: &EvolutionResult, args: &EvolveArgs) {
    let (best, avg) = fitness_stats(&result.fitness);

    println!("\n=== Evolution Complete ===");
    println!("Generations: {}", args.generations);
    println!("Best fitness: {:.4}", best);
    println!("Final avg fitness: {:.4}", avg);
    println!("Output directory: {}", args.output.display());

    if let Some((index, _)) = result.champion() {
        println!("Best individual: #{}", index);
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Match configuration shared by the evolve and match commands
pub fn build_match_config(max_half_moves: u32, stalemate: StalemateArg, material_tie: SideArg) -> MatchConfig {
    let rule = match stalemate {
        StalemateArg::MoverLoses => StalemateRule::MoverLoses,
        StalemateArg::Draw => StalemateRule::Draw,
    };
    let side = match material_tie {
        SideArg::White => Side::White,
        SideArg::Black => Side::Black,
    };

    MatchConfig::new(max_half_moves)
        .with_stalemate_rule(rule)
        .with_material_tie_winner(side)
}

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
