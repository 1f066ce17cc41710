//! Population report: every genome of a generation with its fitness
//!
//! Stored as a JSON array ordered by population index, each element the
//! genome's six tables plus a `fitness` field.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::genome::Genome;

/// One individual of a report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    #[serde(flatten)]
    pub genome: Genome,
    pub fitness: f64,
}

/// A whole population with its fitness
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    pub entries: Vec<ReportEntry>,
}

impl Report {
    /// Pair each genome with its fitness
    ///
    /// # Panics
    /// Panics if the slices differ in length
    pub fn new(population: &[Genome], fitness: &[f64]) -> Self {
        assert_eq!(population.len(), fitness.len(), "Population and fitness must have same length");
        let entries = population
            .iter()
            .zip(fitness)
            .map(|(genome, &fitness)| ReportEntry {
                genome: genome.clone(),
                fitness,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn genomes(&self) -> impl Iterator<Item = &Genome> {
        self.entries.iter().map(|e| &e.genome)
    }

    /// Entry with the highest fitness (first on ties)
    pub fn best(&self) -> Option<(usize, &ReportEntry)> {
        self.entries
            .iter()
            .enumerate()
            .fold(None, |best, (i, entry)| match best {
                Some((_, b)) if b.fitness >= entry.fitness => best,
                _ => Some((i, entry)),
            })
    }

    /// Load a report from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report {}", path.display()))?;
        let report = serde_json::from_str(&content)
            .with_context(|| format!("Malformed report {}", path.display()))?;
        Ok(report)
    }

    /// Save report to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        Ok(())
    }
}
