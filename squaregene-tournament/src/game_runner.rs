//! Game runner - plays a single greedy game between two genomes
//!
//! Level 3 - Step-level implementation
//!
//! Each side looks one ply ahead: every legal move is branched, the
//! resulting position is scored with the mover's genome from the mover's
//! point of view, and the strictly best move is played (ties go to the
//! first move enumerated).

use squaregene_core::{Game, GameError, Genome, PieceKind, Side};

use crate::config::{MatchConfig, StalemateRule};

/// Lifecycle of a single game
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    /// The side to move had no legal moves
    TerminatedByNoMoves,
    /// The half-move cap was reached and material decided
    TerminatedByMoveCap,
}

/// Outcome of a single game
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameOutcome {
    /// Winning side, `None` for a draw
    pub winner: Option<Side>,
    /// How the game ended
    pub termination: GameStatus,
    /// Half-moves played
    pub half_moves: u32,
}

impl GameOutcome {
    /// Check if white won
    pub fn white_wins(&self) -> bool {
        self.winner == Some(Side::White)
    }

    /// Check if black won
    pub fn black_wins(&self) -> bool {
        self.winner == Some(Side::Black)
    }

    /// Check if game is a draw
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Runs one game to completion, one half-move at a time
pub struct GameRunner<'a, G: Game> {
    state: G,
    white: &'a Genome,
    black: &'a Genome,
    config: &'a MatchConfig,
    half_moves: u32,
    status: GameStatus,
    winner: Option<Side>,
}

impl<'a, G: Game> GameRunner<'a, G> {
    /// Create a runner from the standard starting position
    pub fn new(white: &'a Genome, black: &'a Genome, config: &'a MatchConfig) -> Self {
        Self::from_state(G::start(), white, black, config)
    }

    /// Create a runner from an arbitrary position
    pub fn from_state(state: G, white: &'a Genome, black: &'a Genome, config: &'a MatchConfig) -> Self {
        Self {
            state,
            white,
            black,
            config,
            half_moves: 0,
            status: GameStatus::InProgress,
            winner: None,
        }
    }

    /// Current position
    pub fn state(&self) -> &G {
        &self.state
    }

    pub fn half_moves(&self) -> u32 {
        self.half_moves
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Advance by one half-move, or detect termination.
    ///
    /// On error the runner keeps the position at which the fault occurred.
    pub fn step(&mut self) -> Result<GameStatus, GameError> {
        if self.status != GameStatus::InProgress {
            return Ok(self.status);
        }

        let moves = self.state.legal_moves()?;
        let mover = self.state.turn();
        let genome = self.genome_for(mover);

        if moves.is_empty() {
            self.finish_no_moves(mover);
            return Ok(self.status);
        }
        if self.half_moves >= self.config.max_half_moves {
            self.finish_move_cap();
            return Ok(self.status);
        }

        let chosen = match select_move(&self.state, &moves, genome, mover)? {
            Some(mv) => mv.clone(),
            None => return Ok(self.status),
        };

        if self.state.apply(&chosen)? {
            let kind = select_promotion(&self.state, genome, mover)?;
            self.state.promote(kind)?;
        }
        self.half_moves += 1;

        Ok(self.status)
    }

    /// Play until the game terminates
    pub fn play(&mut self) -> Result<GameOutcome, GameError> {
        while self.step()? == GameStatus::InProgress {}

        Ok(GameOutcome {
            winner: self.winner,
            termination: self.status,
            half_moves: self.half_moves,
        })
    }

    fn genome_for(&self, side: Side) -> &'a Genome {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }

    fn finish_no_moves(&mut self, mover: Side) {
        self.status = GameStatus::TerminatedByNoMoves;
        self.winner = match self.config.stalemate_rule {
            StalemateRule::Draw if !self.state.in_check() => None,
            _ => Some(mover.opponent()),
        };
    }

    fn finish_move_cap(&mut self) {
        let white = self.state.material(Side::White);
        let black = self.state.material(Side::Black);

        self.status = GameStatus::TerminatedByMoveCap;
        self.winner = Some(match white.cmp(&black) {
            std::cmp::Ordering::Greater => Side::White,
            std::cmp::Ordering::Less => Side::Black,
            std::cmp::Ordering::Equal => self.config.material_tie_winner,
        });
    }
}

// ============================================================================
// Level 4 - Move choice
// ============================================================================

/// Greedy one-ply choice: the move whose resulting position scores
/// strictly highest for `perspective`. `None` when `moves` is empty.
pub fn select_move<'m, G: Game>(
    state: &G,
    moves: &'m [G::Move],
    genome: &Genome,
    perspective: Side,
) -> Result<Option<&'m G::Move>, GameError> {
    let mut best: Option<(&G::Move, f64)> = None;

    for mv in moves {
        let score = genome.evaluate_position(&state.branch(mv)?, perspective);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((mv, score));
        }
    }

    Ok(best.map(|(mv, _)| mv))
}

/// Promotion piece with the strictly highest score for `perspective`,
/// trying knight, bishop, rook, queen in that order. Knight on ties.
pub fn select_promotion<G: Game>(state: &G, genome: &Genome, perspective: Side) -> Result<PieceKind, GameError> {
    let mut best = PieceKind::Knight;
    let mut best_score = f64::NEG_INFINITY;

    for kind in PieceKind::PROMOTIONS {
        let score = genome.evaluate_position(&state.branch_promote(kind)?, perspective);
        if score > best_score {
            best = kind;
            best_score = score;
        }
    }

    Ok(best)
}
