//! Configuration types for tournament play
//!
//! Level 4 - Utilities and configuration

use squaregene_core::Side;

/// Scoring for a side that is left without legal moves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StalemateRule {
    /// The side to move loses, checkmated or not
    #[default]
    MoverLoses,
    /// Stalemate (no moves, not in check) is a draw; checkmate still loses
    Draw,
}

/// Configuration for a single match between two genomes
#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Half-move cap per game
    pub max_half_moves: u32,
    /// How positions without legal moves are scored
    pub stalemate_rule: StalemateRule,
    /// Winner when material is level at the half-move cap
    pub material_tie_winner: Side,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_half_moves: 200,
            stalemate_rule: StalemateRule::MoverLoses,
            material_tie_winner: Side::Black,
        }
    }
}

impl MatchConfig {
    /// Create config with the given half-move cap
    pub fn new(max_half_moves: u32) -> Self {
        Self {
            max_half_moves,
            ..Default::default()
        }
    }

    /// Set stalemate scoring
    pub fn with_stalemate_rule(mut self, rule: StalemateRule) -> Self {
        self.stalemate_rule = rule;
        self
    }

    /// Set the side credited on a material tie
    pub fn with_material_tie_winner(mut self, side: Side) -> Self {
        self.material_tie_winner = side;
        self
    }
}

/// Configuration for population fitness evaluation
#[derive(Clone, Debug)]
pub struct EvalConfig {
    /// Per-match settings
    pub match_config: MatchConfig,
    /// Worker threads (0 = available parallelism)
    pub threads: usize,
    /// Whether to run pairings in parallel
    pub parallel: bool,
    /// Retries after a failed worker pool build before pairings are dropped
    pub dispatch_retries: u32,
    /// Draw a progress bar over pairings
    pub show_progress: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            match_config: MatchConfig::default(),
            threads: 0,
            parallel: true,
            dispatch_retries: 3,
            show_progress: false,
        }
    }
}

impl EvalConfig {
    /// Create config with the given match settings
    pub fn new(match_config: MatchConfig) -> Self {
        Self {
            match_config,
            ..Default::default()
        }
    }

    /// Set worker thread count
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Evaluate on the calling thread
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Thread count after resolving 0 to the machine's parallelism
    pub fn resolved_threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}
