//! Game engine contract consumed by the trainer

use std::fmt::Debug;

use crate::board::{Side, Square};
use crate::pieces::PieceKind;

/// Faults raised by a game engine while a game is simulated
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("a promotion choice is pending")]
    PromotionPending,

    #[error("no promotion is pending")]
    NoPromotionPending,

    #[error("illegal move {mv}")]
    IllegalMove { mv: String },

    #[error("cannot promote to {0}")]
    InvalidPromotion(PieceKind),

    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

/// Read-only view of piece placement, all a genome needs to score
pub trait Position {
    /// Occupant of `square` as (type, owner)
    fn piece_at(&self, square: Square) -> Option<(PieceKind, Side)>;
}

/// Two-player game state driven by the match simulator.
///
/// `legal_moves` must enumerate in a stable order: the greedy player breaks
/// ties on the first move it sees.
pub trait Game: Position + Clone + Send + Sized {
    type Move: Clone + Debug + Send;

    /// Standard starting position
    fn start() -> Self;

    /// Side to move
    fn turn(&self) -> Side;

    fn legal_moves(&self) -> Result<Vec<Self::Move>, GameError>;

    /// Resulting state after `mv`, leaving `self` untouched
    fn branch(&self, mv: &Self::Move) -> Result<Self, GameError> {
        let mut next = self.clone();
        next.apply(mv)?;
        Ok(next)
    }

    /// Resulting state after choosing `kind` for the pending promotion
    fn branch_promote(&self, kind: PieceKind) -> Result<Self, GameError> {
        let mut next = self.clone();
        next.promote(kind)?;
        Ok(next)
    }

    /// Apply `mv` in place. Returns true when a promotion choice is now pending.
    fn apply(&mut self, mv: &Self::Move) -> Result<bool, GameError>;

    /// Resolve the pending promotion
    fn promote(&mut self, kind: PieceKind) -> Result<(), GameError>;

    /// Total material of `side`
    fn material(&self, side: Side) -> u32 {
        Square::all()
            .filter_map(|sq| self.piece_at(sq))
            .filter(|&(_, owner)| owner == side)
            .map(|(kind, _)| kind.material_value())
            .sum()
    }

    /// Whether the side to move is in check
    fn in_check(&self) -> bool;

    /// Compact textual snapshot of the position, for diagnostics
    fn fen(&self) -> String;
}
