//! Search results, per-generation statistics and run definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Assignment, ParamValue, SearchConfig, SearchSpace};

/// Fitness summary of one generation, taken after it was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number; 0 is the initial population.
    pub generation: usize,
    /// Genomes that needed evaluation in this generation.
    pub evaluations: usize,
    /// Highest fitness in the population.
    pub max: f64,
    /// Mean fitness of the population.
    pub mean: f64,
    /// Lowest fitness in the population.
    pub min: f64,
}

impl GenerationStats {
    /// Summarize a set of fitness values.
    ///
    /// A single NaN score makes `max`, `mean` and `min` all NaN, as does an
    /// empty set.
    pub fn from_fitness(generation: usize, evaluations: usize, fitness: &[f64]) -> Self {
        let (max, mean, min) = if fitness.is_empty() || fitness.iter().any(|f| f.is_nan()) {
            (f64::NAN, f64::NAN, f64::NAN)
        } else {
            let (max, min) = fitness
                .iter()
                .fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), &f| {
                    (hi.max(f), lo.min(f))
                });
            (max, fitness.iter().sum::<f64>() / fitness.len() as f64, min)
        };

        Self {
            generation,
            evaluations,
            max,
            mean,
            min,
        }
    }
}

/// Final result of a search run.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Best parameter assignment seen in any generation.
    pub best: Assignment,
    /// Fitness of `best`.
    pub best_fitness: f64,
    /// Submission index at which `best` was evaluated.
    pub best_submission: usize,
    /// Generation in which `best` was evaluated.
    pub best_generation: usize,
    /// One entry per generation, starting with the initial population.
    pub history: Vec<GenerationStats>,
    /// Oracle calls made during the run.
    pub total_evaluations: usize,
    /// Wall-clock duration of the run.
    pub elapsed_seconds: f64,
}

/// A complete run description, as loaded by the command line tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDefinition {
    /// Parameter grid to search.
    pub space: SearchSpace,
    /// Genetic search settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Synthetic objective used in place of a real model.
    #[serde(default)]
    pub objective: ObjectiveConfig,
}

/// Synthetic cross-validated objective.
///
/// Each fold scores the fraction of parameters matching `preferred`, plus
/// Gaussian noise that is deterministic for a given assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveConfig {
    /// Values the objective rewards.
    #[serde(default)]
    pub preferred: BTreeMap<String, ParamValue>,
    /// Number of simulated folds.
    #[serde(default = "default_folds")]
    pub folds: usize,
    /// Standard deviation of per-fold noise.
    #[serde(default = "default_noise")]
    pub noise: f64,
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        Self {
            preferred: BTreeMap::new(),
            folds: default_folds(),
            noise: default_noise(),
        }
    }
}

fn default_folds() -> usize {
    5
}
fn default_noise() -> f64 {
    0.02
}
