//! Genetic Search CLI - Run a search from a JSON definition.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;

use genetic_search::{
    engine::{BatchOracle, CumulativeOracle, GeneticSearch, MEAN_TEST_SCORE, ResultsTable},
    report::ConvergenceReport,
    schema::{
        Assignment, ObjectiveConfig, ParamValue, SearchConfig, SearchDefinition, SearchSpace,
    },
};

/// Synthetic objective failures.
#[derive(Debug, thiserror::Error)]
enum ObjectiveError {
    #[error("Objective needs at least one fold")]
    NoFolds,
    #[error("Invalid noise level {0}")]
    InvalidNoise(f64),
}

/// Cross-validation stand-in: scores each fold in parallel and keeps a
/// cumulative results table, one row per submitted candidate.
struct SyntheticObjective {
    config: ObjectiveConfig,
    table: ResultsTable,
}

impl SyntheticObjective {
    fn new(config: ObjectiveConfig) -> Result<Self, ObjectiveError> {
        if config.folds == 0 {
            return Err(ObjectiveError::NoFolds);
        }
        if !(config.noise.is_finite() && config.noise >= 0.0) {
            return Err(ObjectiveError::InvalidNoise(config.noise));
        }
        Ok(Self {
            config,
            table: ResultsTable::new(),
        })
    }

    /// Fraction of preferred values the candidate matches.
    fn base_score(&self, candidate: &Assignment) -> f64 {
        if self.config.preferred.is_empty() {
            return 0.0;
        }
        let matched = self
            .config
            .preferred
            .iter()
            .filter(|(name, wanted)| candidate.get(name).is_some_and(|v| same_value(v, wanted)))
            .count();
        matched as f64 / self.config.preferred.len() as f64
    }

    fn fold_scores(&self, candidate: &Assignment) -> Result<Vec<f64>, ObjectiveError> {
        let base = self.base_score(candidate);
        let noise = Normal::new(0.0, self.config.noise)
            .map_err(|_| ObjectiveError::InvalidNoise(self.config.noise))?;

        let mut hasher = DefaultHasher::new();
        candidate.to_string().hash(&mut hasher);
        let candidate_seed = hasher.finish();

        Ok((0..self.config.folds)
            .into_par_iter()
            .map(|fold| {
                let mut rng = StdRng::seed_from_u64(candidate_seed ^ fold as u64);
                base + noise.sample(&mut rng)
            })
            .collect())
    }
}

impl BatchOracle for SyntheticObjective {
    type Error = ObjectiveError;

    fn results(&self) -> &ResultsTable {
        &self.table
    }

    fn evaluate_candidates(
        &mut self,
        candidates: &[Assignment],
    ) -> Result<&ResultsTable, ObjectiveError> {
        for candidate in candidates {
            let scores = self.fold_scores(candidate)?;
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            let std = (scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>()
                / scores.len() as f64)
                .sqrt();

            let split_names: Vec<String> = (0..scores.len())
                .map(|i| format!("split{}_test_score", i))
                .collect();
            let row = split_names
                .iter()
                .map(String::as_str)
                .zip(scores.iter().copied())
                .chain([(MEAN_TEST_SCORE, mean), ("std_test_score", std)]);
            self.table.push_row(candidate.clone(), row);
        }
        Ok(&self.table)
    }
}

fn same_value(a: &ParamValue, b: &ParamValue) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <search.json> [history.csv]", args[0]);
        eprintln!();
        eprintln!("Run a genetic hyperparameter search from a JSON definition.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  search.json  Search space, search settings and synthetic objective");
        eprintln!("  history.csv  Optional path for per-generation statistics");
        eprintln!();
        eprintln!("Example definition is printed with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_definition();
        return;
    }

    let definition_path = PathBuf::from(&args[1]);
    let csv_path = args.get(2).map(PathBuf::from);

    let definition_str = fs::read_to_string(&definition_path).unwrap_or_else(|e| {
        eprintln!("Error reading definition file: {}", e);
        std::process::exit(1);
    });

    let definition: SearchDefinition = serde_json::from_str(&definition_str).unwrap_or_else(|e| {
        eprintln!("Error parsing definition: {}", e);
        std::process::exit(1);
    });

    for name in definition.objective.preferred.keys() {
        if definition.space.get(name).is_none() {
            log::warn!("Preferred parameter '{}' is not in the search space", name);
        }
    }

    let objective = SyntheticObjective::new(definition.objective.clone()).unwrap_or_else(|e| {
        eprintln!("Invalid objective: {}", e);
        std::process::exit(1);
    });

    println!("Genetic Search");
    println!("==============");
    println!(
        "Parameters: {} ({} grid points)",
        definition.space.len(),
        definition.space.combinations()
    );
    println!(
        "Population: {}, generations: {}, tournament: {}, at most {} evaluations",
        definition.search.population_size,
        definition.search.max_generations,
        definition.search.effective_tournament_size(),
        definition.search.max_evaluations()
    );
    println!(
        "Per-gene swap rate: {:.4}, per-gene reset rate: {:.4} ({:?})",
        definition.search.effective_gene_swap_prob(),
        definition.search.effective_gene_reset_prob(),
        definition.search.mutation_mode
    );
    println!();

    let mut search = GeneticSearch::new(definition.space, definition.search).unwrap_or_else(|e| {
        eprintln!("Invalid search definition: {}", e);
        std::process::exit(1);
    });

    let mut oracle = CumulativeOracle::new(objective);
    let outcome = search
        .run_with_callback(&mut oracle, |stats| {
            println!(
                "  Generation {:>3}: evaluated {:>3}, max={:.4}, mean={:.4}, min={:.4}",
                stats.generation, stats.evaluations, stats.max, stats.mean, stats.min
            );
        })
        .unwrap_or_else(|e| {
            eprintln!("Search failed: {}", e);
            std::process::exit(1);
        });

    let report = ConvergenceReport::new(&outcome.history);

    println!();
    println!("{}", report.render_chart(60, 12));
    println!("Best parameters: {}", outcome.best);
    println!("Best score:      {:.6}", outcome.best_fitness);
    println!(
        "Found at:        generation {}, submission {}",
        outcome.best_generation, outcome.best_submission
    );
    println!(
        "Evaluations:     {} in {:.2}s",
        outcome.total_evaluations, outcome.elapsed_seconds
    );

    let objective = oracle.into_inner();
    let table = &objective.table;
    if let Some(row) = table.best_row(MEAN_TEST_SCORE) {
        println!(
            "Results table:   {} rows, best row {} ({})",
            table.len(),
            row,
            table.params()[row]
        );
    }

    if let Some(path) = csv_path {
        if let Err(e) = fs::write(&path, report.to_csv()) {
            eprintln!("Error writing {}: {}", path.display(), e);
            std::process::exit(1);
        }
        println!("History written to {}", path.display());
    }
}

fn print_example_definition() {
    let space = SearchSpace::new()
        .with_param("kernel", ["linear", "rbf", "poly"])
        .with_param("C", [0.1, 1.0, 10.0, 100.0])
        .with_param("gamma", [0.001, 0.01, 0.1])
        .with_param("shrinking", [true, false]);

    let mut objective = ObjectiveConfig::default();
    objective
        .preferred
        .insert("kernel".to_string(), ParamValue::from("rbf"));
    objective.preferred.insert("C".to_string(), ParamValue::Int(10));
    objective
        .preferred
        .insert("gamma".to_string(), ParamValue::Float(0.01));

    let definition = SearchDefinition {
        space,
        search: SearchConfig {
            random_seed: Some(42),
            ..Default::default()
        },
        objective,
    };

    println!("Example definition (search.json):");
    match serde_json::to_string_pretty(&definition) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example: {}", e),
    }
}
