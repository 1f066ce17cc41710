//! Standard chess adapter over the `chess` crate
//!
//! Promotions are exposed as a two-step action: the pawn move is applied
//! first and leaves the game waiting for a promotion choice, with the pawn
//! standing on the last rank and the same side to move.

use std::str::FromStr;

use chess::{Board, ChessMove, Color, File, MoveGen, Piece, Rank};

use crate::board::{Side, Square};
use crate::game::{Game, GameError, Position};
use crate::pieces::PieceKind;

/// Pawn move waiting for its promotion choice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingPromotion {
    from: chess::Square,
    to: chess::Square,
}

/// Chess game state
#[derive(Clone, Debug)]
pub struct ChessGame {
    board: Board,
    pending: Option<PendingPromotion>,
}

impl ChessGame {
    /// Load a position from FEN
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let board = Board::from_str(fen)
            .map_err(|e| GameError::InvalidPosition(format!("{fen}: {e:?}")))?;
        Ok(Self {
            board,
            pending: None,
        })
    }

    /// Underlying board (the pawn is still on its origin square while a
    /// promotion is pending)
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_promotion_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn is_unchosen_promotion(&self, mv: &ChessMove) -> bool {
        if mv.get_promotion().is_some() {
            return false;
        }
        let last_rank = match self.board.side_to_move() {
            Color::White => Rank::Eighth,
            Color::Black => Rank::First,
        };
        self.board.piece_on(mv.get_source()) == Some(Piece::Pawn)
            && mv.get_dest().get_rank() == last_rank
    }
}

impl Default for ChessGame {
    fn default() -> Self {
        Self::start()
    }
}

impl Position for ChessGame {
    fn piece_at(&self, square: Square) -> Option<(PieceKind, Side)> {
        let sq = to_board_square(square);

        if let Some(pending) = self.pending {
            if sq == pending.from {
                return None;
            }
            if sq == pending.to {
                return Some((PieceKind::Pawn, to_side(self.board.side_to_move())));
            }
        }

        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some((to_kind(piece), to_side(color)))
    }
}

impl Game for ChessGame {
    type Move = ChessMove;

    fn start() -> Self {
        Self {
            board: Board::default(),
            pending: None,
        }
    }

    fn turn(&self) -> Side {
        to_side(self.board.side_to_move())
    }

    fn legal_moves(&self) -> Result<Vec<ChessMove>, GameError> {
        if self.pending.is_some() {
            return Err(GameError::PromotionPending);
        }

        // The generator emits one move per promotion piece; keep a single
        // unchosen entry per pawn move, at the position of its queen variant.
        let moves = MoveGen::new_legal(&self.board)
            .filter_map(|mv| match mv.get_promotion() {
                None => Some(mv),
                Some(Piece::Queen) => Some(ChessMove::new(mv.get_source(), mv.get_dest(), None)),
                Some(_) => None,
            })
            .collect();

        Ok(moves)
    }

    fn apply(&mut self, mv: &ChessMove) -> Result<bool, GameError> {
        if self.pending.is_some() {
            return Err(GameError::PromotionPending);
        }

        if self.is_unchosen_promotion(mv) {
            let queening = ChessMove::new(mv.get_source(), mv.get_dest(), Some(Piece::Queen));
            if !self.board.legal(queening) {
                return Err(GameError::IllegalMove { mv: mv.to_string() });
            }
            self.pending = Some(PendingPromotion {
                from: mv.get_source(),
                to: mv.get_dest(),
            });
            return Ok(true);
        }

        if !self.board.legal(*mv) {
            return Err(GameError::IllegalMove { mv: mv.to_string() });
        }
        self.board = self.board.make_move_new(*mv);
        Ok(false)
    }

    fn promote(&mut self, kind: PieceKind) -> Result<(), GameError> {
        if !PieceKind::PROMOTIONS.contains(&kind) {
            return Err(GameError::InvalidPromotion(kind));
        }
        let pending = self.pending.take().ok_or(GameError::NoPromotionPending)?;

        let mv = ChessMove::new(pending.from, pending.to, Some(to_piece(kind)));
        self.board = self.board.make_move_new(mv);
        Ok(())
    }

    fn in_check(&self) -> bool {
        self.board.checkers().popcnt() > 0
    }

    fn fen(&self) -> String {
        match self.pending {
            Some(p) => format!("{} (promotion pending {}{})", self.board, p.from, p.to),
            None => self.board.to_string(),
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

fn to_board_square(square: Square) -> chess::Square {
    chess::Square::make_square(
        Rank::from_index(square.rank() as usize - 1),
        File::from_index(square.file() as usize),
    )
}

fn to_side(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

fn to_kind(piece: Piece) -> PieceKind {
    match piece {
        Piece::Pawn => PieceKind::Pawn,
        Piece::Knight => PieceKind::Knight,
        Piece::Bishop => PieceKind::Bishop,
        Piece::Rook => PieceKind::Rook,
        Piece::Queen => PieceKind::Queen,
        Piece::King => PieceKind::King,
    }
}

fn to_piece(kind: PieceKind) -> Piece {
    match kind {
        PieceKind::Pawn => Piece::Pawn,
        PieceKind::Knight => Piece::Knight,
        PieceKind::Bishop => Piece::Bishop,
        PieceKind::Rook => Piece::Rook,
        PieceKind::Queen => Piece::Queen,
        PieceKind::King => Piece::King,
    }
}
