//! Match play - two games between two genomes, colours swapped
//!
//! Level 2 - Phase-level implementation

use std::marker::PhantomData;

use squaregene_core::{Game, GameError, Genome, Side};

use crate::config::MatchConfig;
use crate::game_runner::{GameOutcome, GameRunner};

/// Result of a completed match
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    /// Games won by the first genome
    pub wins_a: u32,
    /// Games won by the second genome
    pub wins_b: u32,
    /// Game 0 has A as white, game 1 has B as white
    pub games: [GameOutcome; 2],
}

impl MatchResult {
    /// Games that produced no winner
    pub fn draws(&self) -> u32 {
        self.games.iter().filter(|g| g.is_draw()).count() as u32
    }

    /// Half-moves played across both games
    pub fn total_half_moves(&self) -> u32 {
        self.games.iter().map(|g| g.half_moves).sum()
    }
}

/// A pairing that produced no usable result
#[derive(Clone, Debug, thiserror::Error)]
pub enum MatchError {
    #[error("game {game} faulted after {half_moves} half-moves at [{fen}]: {source}")]
    Game {
        /// 0 = A as white, 1 = B as white
        game: usize,
        half_moves: u32,
        /// Position at the time of the fault
        fen: String,
        source: GameError,
    },

    #[error("pairing panicked: {0}")]
    Panicked(String),
}

impl MatchError {
    /// Position snapshot, when the fault came from the game engine
    pub fn fen(&self) -> Option<&str> {
        match self {
            MatchError::Game { fen, .. } => Some(fen),
            MatchError::Panicked(_) => None,
        }
    }
}

/// Play a match between two genomes (Level 2 phase)
///
/// Both games must complete for the match to count; the first fault
/// aborts the match.
pub fn play_match<G: Game>(a: &Genome, b: &Genome, config: &MatchConfig) -> Result<MatchResult, MatchError> {
    let first = play_game::<G>(0, a, b, config)?;
    let second = play_game::<G>(1, b, a, config)?;

    let mut wins_a = 0;
    let mut wins_b = 0;
    // A is white in game 0 and black in game 1
    for (outcome, a_side) in [(&first, Side::White), (&second, Side::Black)] {
        match outcome.winner {
            Some(side) if side == a_side => wins_a += 1,
            Some(_) => wins_b += 1,
            None => {}
        }
    }

    Ok(MatchResult {
        wins_a,
        wins_b,
        games: [first, second],
    })
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Play one game, attaching the position to any engine fault
fn play_game<G: Game>(
    game: usize,
    white: &Genome,
    black: &Genome,
    config: &MatchConfig,
) -> Result<GameOutcome, MatchError> {
    let mut runner = GameRunner::<G>::new(white, black, config);
    runner.play().map_err(|source| MatchError::Game {
        game,
        half_moves: runner.half_moves(),
        fen: runner.state().fen(),
        source,
    })
}

// ============================================================================
// Pairing seam
// ============================================================================

/// Plays one pairing of the round robin
pub trait MatchPlayer: Sync {
    fn play(&self, a: &Genome, b: &Genome) -> Result<MatchResult, MatchError>;
}

/// Greedy one-ply play from the standard start of `G`
pub struct GreedyPlayer<G> {
    config: MatchConfig,
    _game: PhantomData<fn() -> G>,
}

impl<G: Game> GreedyPlayer<G> {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            _game: PhantomData,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }
}

impl<G: Game> MatchPlayer for GreedyPlayer<G> {
    fn play(&self, a: &Genome, b: &Genome) -> Result<MatchResult, MatchError> {
        play_match::<G>(a, b, &self.config)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::game_runner::GameStatus;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use squaregene_core::{ChessGame, PieceKind, Position, Square};

    /// Chess that reports an engine fault once `fault_after` half-moves
    /// have been played
    #[derive(Clone, Debug)]
    pub(crate) struct FaultyChess<const N: u32> {
        inner: ChessGame,
        played: u32,
    }

    impl<const N: u32> Position for FaultyChess<N> {
        fn piece_at(&self, square: Square) -> Option<(PieceKind, Side)> {
            self.inner.piece_at(square)
        }
    }

    impl<const N: u32> Game for FaultyChess<N> {
        type Move = <ChessGame as Game>::Move;

        fn start() -> Self {
            Self {
                inner: ChessGame::start(),
                played: 0,
            }
        }

        fn turn(&self) -> Side {
            self.inner.turn()
        }

        fn legal_moves(&self) -> Result<Vec<Self::Move>, GameError> {
            if self.played >= N {
                return Err(GameError::InvalidPosition("engine gave up".to_string()));
            }
            self.inner.legal_moves()
        }

        fn apply(&mut self, mv: &Self::Move) -> Result<bool, GameError> {
            let pending = self.inner.apply(mv)?;
            if !pending {
                self.played += 1;
            }
            Ok(pending)
        }

        fn promote(&mut self, kind: PieceKind) -> Result<(), GameError> {
            self.inner.promote(kind)?;
            self.played += 1;
            Ok(())
        }

        fn in_check(&self) -> bool {
            self.inner.in_check()
        }

        fn fen(&self) -> String {
            self.inner.fen()
        }
    }

    #[test]
    fn test_identical_genomes_split_match() {
        let genome = Genome::zeroed();
        let result = play_match::<ChessGame>(&genome, &genome, &MatchConfig::default()).unwrap();

        // Both games are the same game, so each side wins once
        assert_eq!(result.games[0], result.games[1]);
        assert_eq!(result.wins_a, 1);
        assert_eq!(result.wins_b, 1);
        assert_eq!(result.draws(), 0);
    }

    #[test]
    fn test_wins_follow_colours() {
        // Every game hits the cap immediately with level material
        let config = MatchConfig::new(0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let a = Genome::random(&mut rng);
        let b = Genome::random(&mut rng);

        let result = play_match::<ChessGame>(&a, &b, &config).unwrap();
        assert!(result.games.iter().all(|g| g.termination == GameStatus::TerminatedByMoveCap));
        assert!(result.games.iter().all(|g| g.black_wins()));
        // Black is B in game 0 and A in game 1
        assert_eq!((result.wins_a, result.wins_b), (1, 1));

        let white_ties = config.with_material_tie_winner(Side::White);
        let result = play_match::<ChessGame>(&a, &b, &white_ties).unwrap();
        assert_eq!((result.wins_a, result.wins_b), (1, 1));
    }

    #[test]
    fn test_wins_bounded_by_two() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let config = MatchConfig::new(60);

        for _ in 0..3 {
            let a = Genome::random(&mut rng);
            let b = Genome::random(&mut rng);
            let result = play_match::<ChessGame>(&a, &b, &config).unwrap();
            assert!(result.wins_a + result.wins_b + result.draws() == 2);
            assert!(result.total_half_moves() <= 120);
        }
    }

    #[test]
    fn test_engine_fault_carries_position() {
        let genome = Genome::zeroed();
        let err = play_match::<FaultyChess<3>>(&genome, &genome, &MatchConfig::default()).unwrap_err();

        match &err {
            MatchError::Game { game, half_moves, fen, source } => {
                assert_eq!(*game, 0);
                assert_eq!(*half_moves, 3);
                assert!(!fen.is_empty());
                assert!(matches!(source, GameError::InvalidPosition(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.fen().is_some());
        assert!(err.to_string().contains("engine gave up"));
    }

    #[test]
    fn test_greedy_player_uses_its_config() {
        let player = GreedyPlayer::<ChessGame>::new(MatchConfig::new(0));
        let genome = Genome::zeroed();

        let result = player.play(&genome, &genome).unwrap();
        assert_eq!(player.config().max_half_moves, 0);
        assert_eq!(result.total_half_moves(), 0);
    }
}
