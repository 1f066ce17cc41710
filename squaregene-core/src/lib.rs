//! squaregene core - board vocabulary, engine contract and genome
//!
//! This crate provides:
//! - Board geometry (sides and squares)
//! - Piece types
//! - The `Game` trait the trainer drives, plus a chess adapter
//! - The piece-square table genome and its position evaluation
//! - Population reports (genomes with fitness) on disk

pub mod board;
pub mod pieces;
pub mod game;
pub mod chess_game;
pub mod genome;
pub mod report;

// Re-exports for convenient access
pub use board::{Side, Square, BOARD_SIZE, NUM_SQUARES};
pub use pieces::{PieceKind, NUM_PIECE_KINDS};
pub use game::{Game, GameError, Position};
pub use chess_game::ChessGame;
pub use genome::{Genome, GenomeError, Table};
pub use report::{Report, ReportEntry};
