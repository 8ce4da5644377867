//! Configuration for the genetic search loop.

use serde::{Deserialize, Serialize};

/// Genetic search settings.
///
/// Crossover and mutation are both gated twice. `crossover_prob` decides
/// whether a consecutive pair is recombined at all, and only then does each
/// gene swap with `gen_crossover_prob`. Likewise `mutation_prob` decides
/// whether a genome is mutated, and only then does `gen_mutation_prob` apply.
/// The per-gene rates seen over a whole run are therefore the products
/// returned by [`SearchConfig::effective_gene_swap_prob`] and
/// [`SearchConfig::effective_gene_reset_prob`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of genomes per generation.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Generations evolved after the initial population is evaluated.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Tournament size. `None` means 20% of the population, at least 1.
    #[serde(default)]
    pub tournament_size: Option<usize>,
    /// Probability that a consecutive pair undergoes crossover.
    #[serde(default = "default_crossover_prob")]
    pub crossover_prob: f64,
    /// Probability that a genome undergoes mutation.
    #[serde(default = "default_mutation_prob")]
    pub mutation_prob: f64,
    /// Probability that a gene is swapped during crossover.
    #[serde(default = "default_gen_crossover_prob")]
    pub gen_crossover_prob: f64,
    /// Inner mutation probability, interpreted by `mutation_mode`.
    #[serde(default = "default_gen_mutation_prob")]
    pub gen_mutation_prob: f64,
    /// How `gen_mutation_prob` is applied.
    #[serde(default)]
    pub mutation_mode: MutationMode,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            max_generations: default_max_generations(),
            tournament_size: None,
            crossover_prob: default_crossover_prob(),
            mutation_prob: default_mutation_prob(),
            gen_crossover_prob: default_gen_crossover_prob(),
            gen_mutation_prob: default_gen_mutation_prob(),
            mutation_mode: MutationMode::default(),
            random_seed: None,
        }
    }
}

fn default_population_size() -> usize {
    10
}
fn default_max_generations() -> usize {
    10
}
fn default_crossover_prob() -> f64 {
    0.9
}
fn default_mutation_prob() -> f64 {
    0.1
}
fn default_gen_crossover_prob() -> f64 {
    0.3
}
fn default_gen_mutation_prob() -> f64 {
    1.0 / 8.0
}

/// Reset mutation granularity.
///
/// The parameter is named as a per-gene rate, but the classic behavior flips
/// one coin with `gen_mutation_prob` and, on success, redraws every gene.
/// `PerGene` redraws each gene independently with that probability instead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MutationMode {
    /// One coin flip; on success the whole genome is redrawn.
    #[default]
    WholeGenome,
    /// Each gene is redrawn independently.
    PerGene,
}

impl SearchConfig {
    /// Tournament size actually used by selection.
    pub fn effective_tournament_size(&self) -> usize {
        self.tournament_size.unwrap_or_else(|| {
            ((self.population_size as f64 * 0.2).round() as usize).max(1)
        })
    }

    /// Chance that a given gene is swapped in one generation.
    pub fn effective_gene_swap_prob(&self) -> f64 {
        self.crossover_prob * self.gen_crossover_prob
    }

    /// Chance that a given gene is redrawn in one generation.
    ///
    /// Under both modes this is `mutation_prob * gen_mutation_prob`; the modes
    /// differ in whether genes of one genome are redrawn together.
    pub fn effective_gene_reset_prob(&self) -> f64 {
        self.mutation_prob * self.gen_mutation_prob
    }

    /// Total evaluations an unlucky run can need: every genome stale every generation.
    pub fn max_evaluations(&self) -> usize {
        self.population_size
            .saturating_mul(self.max_generations.saturating_add(1))
    }

    /// Validate search configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.tournament_size == Some(0) {
            return Err(ConfigError::EmptyTournament);
        }

        let check_prob = |value: f64, name: &'static str| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::InvalidProbability { name, value })
            }
        };

        check_prob(self.crossover_prob, "crossover_prob")?;
        check_prob(self.mutation_prob, "mutation_prob")?;
        check_prob(self.gen_crossover_prob, "gen_crossover_prob")?;
        check_prob(self.gen_mutation_prob, "gen_mutation_prob")?;

        Ok(())
    }
}

/// Search configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Population size must be positive")]
    EmptyPopulation,
    #[error("Tournament size must be positive")]
    EmptyTournament,
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("Invalid search space: {0}")]
    Space(#[from] super::SpaceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.population_size, 10);
        assert_eq!(config.max_generations, 10);
        assert_eq!(config.gen_mutation_prob, 0.125);
        assert_eq!(config.mutation_mode, MutationMode::WholeGenome);
    }

    #[test]
    fn test_tournament_size_default() {
        let mut config = SearchConfig::default();
        assert_eq!(config.effective_tournament_size(), 2);

        config.population_size = 3;
        assert_eq!(config.effective_tournament_size(), 1);

        config.population_size = 1;
        assert_eq!(config.effective_tournament_size(), 1);

        config.population_size = 50;
        assert_eq!(config.effective_tournament_size(), 10);

        config.tournament_size = Some(7);
        assert_eq!(config.effective_tournament_size(), 7);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = SearchConfig {
            population_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyPopulation));

        let config = SearchConfig {
            tournament_size: Some(0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyTournament));

        let config = SearchConfig {
            mutation_prob: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProbability {
                name: "mutation_prob",
                ..
            })
        ));

        let config = SearchConfig {
            gen_crossover_prob: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_compound_probabilities() {
        let config = SearchConfig::default();
        assert!((config.effective_gene_swap_prob() - 0.27).abs() < 1e-12);
        assert!((config.effective_gene_reset_prob() - 0.0125).abs() < 1e-12);
        assert_eq!(config.max_evaluations(), 110);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"population_size": 20, "mutation_mode": "per_gene"}"#)
                .unwrap();
        assert_eq!(config.population_size, 20);
        assert_eq!(config.max_generations, 10);
        assert_eq!(config.crossover_prob, 0.9);
        assert_eq!(config.mutation_mode, MutationMode::PerGene);
        assert_eq!(config.effective_tournament_size(), 4);
    }
}
