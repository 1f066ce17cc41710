//! Piece-square table genome

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Side, Square, NUM_SQUARES};
use crate::game::Position;
use crate::pieces::{PieceKind, NUM_PIECE_KINDS};

/// One weight per square
pub type Table = [f64; NUM_SQUARES];

/// Errors raised when reading a genome document
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GenomeError {
    #[error("table `{table}` has {len} entries, expected 64")]
    TableLength { table: &'static str, len: usize },
}

/// Evolvable evaluation parameters: one 64-entry table per piece type.
///
/// Tables are mover-relative: `evaluate_position` adds the weight for pieces
/// owned by the perspective side and subtracts it for the opponent, whatever
/// colour the genome is playing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GenomeDocument", into = "GenomeDocument")]
pub struct Genome {
    tables: [Table; NUM_PIECE_KINDS],
}

impl Genome {
    /// Every weight set to zero
    pub fn zeroed() -> Self {
        Self {
            tables: [[0.0; NUM_SQUARES]; NUM_PIECE_KINDS],
        }
    }

    /// Every weight drawn uniformly from [0, 1)
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut genome = Self::zeroed();
        for table in genome.tables.iter_mut() {
            for weight in table.iter_mut() {
                *weight = rng.gen::<f64>();
            }
        }
        genome
    }

    pub fn table(&self, kind: PieceKind) -> &Table {
        &self.tables[kind.index()]
    }

    pub fn table_mut(&mut self, kind: PieceKind) -> &mut Table {
        &mut self.tables[kind.index()]
    }

    pub fn weight(&self, kind: PieceKind, square: Square) -> f64 {
        self.tables[kind.index()][square.index()]
    }

    pub fn set_weight(&mut self, kind: PieceKind, square: Square, value: f64) {
        self.tables[kind.index()][square.index()] = value;
    }

    /// Net positional advantage of `perspective` in `position`
    pub fn evaluate_position<P: Position + ?Sized>(&self, position: &P, perspective: Side) -> f64 {
        let mut advantage = 0.0;

        for square in Square::all() {
            if let Some((kind, owner)) = position.piece_at(square) {
                let weight = self.weight(kind, square);
                if owner == perspective {
                    advantage += weight;
                } else {
                    advantage -= weight;
                }
            }
        }

        advantage
    }
}

impl Default for Genome {
    fn default() -> Self {
        Self::zeroed()
    }
}

// ============================================================================
// DOCUMENT FORM
// ============================================================================

/// Serialized layout: one named array of 64 numbers per piece type
#[derive(Serialize, Deserialize)]
struct GenomeDocument {
    pawn: Vec<f64>,
    knight: Vec<f64>,
    bishop: Vec<f64>,
    rook: Vec<f64>,
    queen: Vec<f64>,
    king: Vec<f64>,
}

impl From<Genome> for GenomeDocument {
    fn from(genome: Genome) -> Self {
        let table = |kind: PieceKind| genome.table(kind).to_vec();
        Self {
            pawn: table(PieceKind::Pawn),
            knight: table(PieceKind::Knight),
            bishop: table(PieceKind::Bishop),
            rook: table(PieceKind::Rook),
            queen: table(PieceKind::Queen),
            king: table(PieceKind::King),
        }
    }
}

impl TryFrom<GenomeDocument> for Genome {
    type Error = GenomeError;

    fn try_from(doc: GenomeDocument) -> Result<Self, Self::Error> {
        let mut genome = Genome::zeroed();
        let columns = [
            (PieceKind::Pawn, doc.pawn),
            (PieceKind::Knight, doc.knight),
            (PieceKind::Bishop, doc.bishop),
            (PieceKind::Rook, doc.rook),
            (PieceKind::Queen, doc.queen),
            (PieceKind::King, doc.king),
        ];

        for (kind, values) in columns {
            let table: Table = values
                .try_into()
                .map_err(|v: Vec<f64>| GenomeError::TableLength {
                    table: kind.name(),
                    len: v.len(),
                })?;
            *genome.table_mut(kind) = table;
        }

        Ok(genome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Sparse test position
    struct Pieces(Vec<(Square, PieceKind, Side)>);

    impl Position for Pieces {
        fn piece_at(&self, square: Square) -> Option<(PieceKind, Side)> {
            self.0
                .iter()
                .find(|(sq, _, _)| *sq == square)
                .map(|&(_, kind, side)| (kind, side))
        }
    }

    fn sq(file: u8, rank: u8) -> Square {
        Square::new(file, rank).unwrap()
    }

    #[test]
    fn test_random_weights_in_unit_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let genome = Genome::random(&mut rng);
        for kind in PieceKind::ALL {
            assert!(genome.table(kind).iter().all(|w| (0.0..1.0).contains(w)));
        }
    }

    #[test]
    fn test_copy_is_independent() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let original = Genome::random(&mut rng);
        let mut copy = original.clone();
        copy.set_weight(PieceKind::Queen, sq(3, 1), 42.0);

        assert_ne!(original.weight(PieceKind::Queen, sq(3, 1)), 42.0);
        assert_ne!(original, copy);
    }

    #[test]
    fn test_evaluate_mover_relative() {
        let mut genome = Genome::zeroed();
        genome.set_weight(PieceKind::Knight, sq(2, 3), 1.5);
        genome.set_weight(PieceKind::Pawn, sq(4, 5), 0.25);

        let position = Pieces(vec![
            (sq(2, 3), PieceKind::Knight, Side::White),
            (sq(4, 5), PieceKind::Pawn, Side::Black),
        ]);

        assert_eq!(genome.evaluate_position(&position, Side::White), 1.25);
        assert_eq!(genome.evaluate_position(&position, Side::Black), -1.25);
    }

    #[test]
    fn test_evaluate_empty_board() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let genome = Genome::random(&mut rng);
        let empty = Pieces(vec![]);
        assert_eq!(genome.evaluate_position(&empty, Side::White), 0.0);
    }

    #[test]
    fn test_serde_round_trip_is_exact() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        for _ in 0..500 {
            let genome = Genome::random(&mut rng);
            let json = serde_json::to_string(&genome).unwrap();
            let restored: Genome = serde_json::from_str(&json).unwrap();

            for kind in PieceKind::ALL {
                let bits = |g: &Genome| g.table(kind).map(f64::to_bits);
                assert_eq!(bits(&genome), bits(&restored), "{} table drifted", kind.name());
            }
        }
    }

    #[test]
    fn test_serde_round_trip_keeps_extreme_weights() {
        let mut genome = Genome::zeroed();
        let weights = [-0.0, 1e-300, -7.5e-17, 0.1 + 0.2, 123456.789, f64::MAX];
        for (i, w) in weights.into_iter().enumerate() {
            genome.set_weight(PieceKind::Queen, Square::from_index(i).unwrap(), w);
        }

        let pretty = serde_json::to_string_pretty(&genome).unwrap();
        let restored: Genome = serde_json::from_str(&pretty).unwrap();
        let bits = |g: &Genome| g.table(PieceKind::Queen).map(f64::to_bits);
        assert_eq!(bits(&genome), bits(&restored));
    }

    #[test]
    fn test_document_keys() {
        let value = serde_json::to_value(Genome::zeroed()).unwrap();
        for kind in PieceKind::ALL {
            let table = value.get(kind.name()).and_then(|t| t.as_array()).unwrap();
            assert_eq!(table.len(), 64);
        }
    }

    #[test]
    fn test_rejects_short_table() {
        let mut value = serde_json::to_value(Genome::zeroed()).unwrap();
        value["rook"] = serde_json::json!([0.0, 1.0]);

        let err = serde_json::from_value::<Genome>(value).unwrap_err();
        assert!(err.to_string().contains("rook"), "unexpected error: {err}");
    }

    #[test]
    fn test_rejects_missing_table() {
        let mut value = serde_json::to_value(Genome::zeroed()).unwrap();
        value.as_object_mut().unwrap().remove("king");
        assert!(serde_json::from_value::<Genome>(value).is_err());
    }
}
