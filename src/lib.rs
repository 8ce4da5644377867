//! Genetic Search - Evolutionary hyperparameter search over discrete grids.
//!
//! This crate searches a grid of candidate hyperparameter values with a
//! genetic algorithm instead of trying every combination. Scoring a
//! candidate is delegated to an external oracle, typically a
//! cross-validation routine.
//!
//! # Architecture
//!
//! The crate is split into three modules:
//!
//! - `schema`: Search spaces, configuration, statistics and result types
//! - `engine`: Genome codec, genetic operators, selection and the search loop
//! - `report`: Rendering of per-generation convergence statistics
//!
//! # Example
//!
//! ```rust
//! use genetic_search::{
//!     engine::{GeneticSearch, oracle_fn},
//!     report::ConvergenceReport,
//!     schema::{Assignment, ParamValue, SearchConfig, SearchSpace},
//! };
//!
//! let space = SearchSpace::new()
//!     .with_param("max_depth", [2, 4, 8, 16])
//!     .with_param("criterion", ["gini", "entropy"]);
//!
//! let config = SearchConfig {
//!     population_size: 8,
//!     max_generations: 5,
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//!
//! let mut search = GeneticSearch::new(space, config).unwrap();
//! let outcome = search
//!     .run(oracle_fn(|params: &Assignment| -> Result<f64, String> {
//!         let depth = params.get("max_depth").and_then(ParamValue::as_f64).unwrap_or(0.0);
//!         Ok(1.0 - (depth - 8.0).abs() / 16.0)
//!     }))
//!     .unwrap();
//!
//! assert_eq!(outcome.history.len(), 6);
//! println!("{}", ConvergenceReport::new(&outcome.history).to_table());
//! ```

pub mod engine;
pub mod report;
pub mod schema;

// Re-export commonly used types
pub use engine::{GeneticSearch, Oracle, oracle_fn};
pub use schema::{Assignment, ParamValue, SearchConfig, SearchOutcome, SearchSpace};
