//! Mutation operator for piece-square genomes
//!
//! Every gene is considered independently: with probability `frequency`
//! it receives a uniform nudge in [-MUTATION_DELTA, MUTATION_DELTA).

use rand::Rng;
use squaregene_core::{Genome, PieceKind};

/// Largest absolute change a single mutation applies to a gene
pub const MUTATION_DELTA: f64 = 0.1;

/// Return a mutated copy of `source`.
///
/// # Arguments
/// * `source` - Genome to copy
/// * `frequency` - Per-gene mutation probability, clamped to [0, 1]
/// * `rng` - Random number generator
pub fn mutate<R: Rng>(source: &Genome, frequency: f64, rng: &mut R) -> Genome {
    let frequency = if frequency.is_nan() { 0.0 } else { frequency.clamp(0.0, 1.0) };
    let mut out = source.clone();

    for kind in PieceKind::ALL {
        for weight in out.table_mut(kind).iter_mut() {
            if rng.gen_bool(frequency) {
                *weight += rng.gen_range(-MUTATION_DELTA..MUTATION_DELTA);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn changed_genes(a: &Genome, b: &Genome) -> Vec<f64> {
        PieceKind::ALL
            .iter()
            .flat_map(|&kind| {
                a.table(kind)
                    .iter()
                    .zip(b.table(kind).iter())
                    .filter(|(x, y)| x != y)
                    .map(|(x, y)| (y - x).abs())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_zero_frequency_is_identity() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let source = Genome::random(&mut rng);
        let mutated = mutate(&source, 0.0, &mut rng);
        assert_eq!(source, mutated);
    }

    #[test]
    fn test_full_frequency_touches_every_gene() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let source = Genome::random(&mut rng);
        let mutated = mutate(&source, 1.0, &mut rng);
        assert_eq!(changed_genes(&source, &mutated).len(), 6 * 64);
    }

    #[test]
    fn test_changes_are_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let source = Genome::random(&mut rng);

        for _ in 0..20 {
            let mutated = mutate(&source, 0.5, &mut rng);
            for delta in changed_genes(&source, &mutated) {
                assert!(delta < MUTATION_DELTA, "delta {} out of bounds", delta);
            }
        }
    }

    #[test]
    fn test_full_mutation_stays_strictly_inside_delta() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let source = Genome::zeroed();

        let mut worst = 0.0f64;
        for _ in 0..500 {
            let mutated = mutate(&source, 1.0, &mut rng);
            for delta in changed_genes(&source, &mutated) {
                worst = worst.max(delta);
            }
        }
        assert!(worst < MUTATION_DELTA, "worst delta {}", worst);
        assert!(worst > 0.09, "deltas should span the range, worst {}", worst);
    }

    #[test]
    fn test_frequency_controls_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let source = Genome::zeroed();
        let mut changed = 0;
        for _ in 0..50 {
            changed += changed_genes(&source, &mutate(&source, 0.2, &mut rng)).len();
        }
        // 50 * 384 genes at 20% ~ 3840
        assert!((3000..4700).contains(&changed), "changed {} genes", changed);
    }

    #[test]
    fn test_out_of_range_frequency_is_clamped() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let source = Genome::zeroed();
        assert_eq!(mutate(&source, -1.0, &mut rng), source);
        assert_eq!(changed_genes(&source, &mutate(&source, 2.0, &mut rng)).len(), 384);
    }
}
