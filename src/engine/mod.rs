//! Evolutionary search engine for discrete hyperparameter grids.
//!
//! # Overview
//!
//! The engine consists of:
//!
//! - **Codec** (`codec`): Genome to parameter assignment decoding
//! - **Genome Operations** (`genome`): Random generation, uniform crossover, reset mutation
//! - **Selection** (`selection`): Tournament selection
//! - **Fitness** (`fitness`): Oracle contract, cumulative result tables, submission counting
//! - **Search** (`search`): The generational loop
//!
//! # Example
//!
//! ```rust
//! use genetic_search::engine::{GeneticSearch, oracle_fn};
//! use genetic_search::schema::{Assignment, ParamValue, SearchConfig, SearchSpace};
//!
//! let space = SearchSpace::new()
//!     .with_param("kernel", ["linear", "rbf"])
//!     .with_param("C", [1, 10]);
//!
//! let config = SearchConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut search = GeneticSearch::new(space, config).unwrap();
//! let outcome = search
//!     .run(oracle_fn(|params: &Assignment| -> Result<f64, String> {
//!         let c = params.get("C").and_then(ParamValue::as_f64).unwrap_or(0.0);
//!         Ok(c / 10.0)
//!     }))
//!     .unwrap();
//!
//! println!("Best: {} ({:.3})", outcome.best, outcome.best_fitness);
//! ```
//!
//! # Ordering
//!
//! Genomes are evaluated one at a time, in population order, and each call
//! carries its submission index. Oracles that correlate results by position
//! rely on this; any parallelism belongs inside the oracle.

pub mod codec;
mod fitness;
mod genome;
mod search;
mod selection;

pub use fitness::{
    BatchOracle, CumulativeError, CumulativeOracle, FitnessAdapter, FnOracle, MEAN_TEST_SCORE,
    Oracle, ResultsTable, SubmissionCounter, oracle_fn,
};
pub use genome::{Fitness, Genome, GenomeRng};
pub use search::GeneticSearch;
