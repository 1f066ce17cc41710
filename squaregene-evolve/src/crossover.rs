//! Quadrant crossover for piece-square genomes
//!
//! For each piece type a random pivot square and quadrant orientation carve
//! the board into two axis-aligned regions. The child takes parent A's
//! genes inside the quadrant and parent B's outside it, so spatially
//! coherent patterns survive recombination.

use rand::Rng;
use squaregene_core::{Genome, PieceKind, Square, BOARD_SIZE, NUM_PIECE_KINDS};

/// Quadrant of the board anchored at a pivot square (boundary inclusive)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quadrant {
    /// Ranks at or above the pivot (otherwise at or below)
    pub top: bool,
    /// Files at or right of the pivot (otherwise at or left)
    pub right: bool,
    /// Pivot file, 1-8
    pub pivot_file: u8,
    /// Pivot rank, 1-8
    pub pivot_rank: u8,
}

impl Quadrant {
    /// Uniform orientation and pivot
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let orientation = rng.gen_range(0..4u8);
        Self {
            top: orientation < 2,
            right: orientation % 2 == 0,
            pivot_file: rng.gen_range(1..=BOARD_SIZE),
            pivot_rank: rng.gen_range(1..=BOARD_SIZE),
        }
    }

    pub fn contains(&self, square: Square) -> bool {
        let file = square.file() + 1;
        let rank = square.rank();

        let in_ranks = if self.top {
            rank >= self.pivot_rank
        } else {
            rank <= self.pivot_rank
        };
        let in_files = if self.right {
            file >= self.pivot_file
        } else {
            file <= self.pivot_file
        };

        in_ranks && in_files
    }
}

/// Cross two genomes with a fresh random quadrant per piece type.
pub fn cross<R: Rng>(a: &Genome, b: &Genome, rng: &mut R) -> Genome {
    let quadrants: [Quadrant; NUM_PIECE_KINDS] = std::array::from_fn(|_| Quadrant::random(rng));
    cross_with(a, b, &quadrants)
}

/// Cross two genomes with explicit quadrants, indexed by piece type.
pub fn cross_with(a: &Genome, b: &Genome, quadrants: &[Quadrant; NUM_PIECE_KINDS]) -> Genome {
    let mut out = Genome::zeroed();

    for kind in PieceKind::ALL {
        let quadrant = &quadrants[kind.index()];
        for square in Square::all() {
            let parent = if quadrant.contains(square) { a } else { b };
            out.set_weight(kind, square, parent.weight(kind, square));
        }
    }

    out
}
