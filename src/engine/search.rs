//! Generational driver for the genetic search.

use std::time::Instant;

use crate::schema::{
    Assignment, ConfigError, GenerationStats, ParamValue, SearchConfig, SearchOutcome,
    SearchSpace,
};

use super::codec;
use super::fitness::{FitnessAdapter, Oracle};
use super::genome::{Genome, GenomeRng};

/// Best genome observed so far in a run.
#[derive(Debug, Clone)]
struct BestSoFar {
    genes: Vec<ParamValue>,
    fitness: f64,
    submission: usize,
    generation: usize,
}

impl BestSoFar {
    /// Replace when strictly better. A NaN score only fills an empty slot or
    /// replaces another NaN, so any real number displaces it.
    fn offer(
        slot: &mut Option<BestSoFar>,
        genome: &Genome,
        fitness: f64,
        submission: usize,
        generation: usize,
    ) {
        let better = match slot {
            None => true,
            Some(best) => {
                fitness > best.fitness || (best.fitness.is_nan() && !fitness.is_nan())
            }
        };
        if better {
            *slot = Some(BestSoFar {
                genes: genome.genes.clone(),
                fitness,
                submission,
                generation,
            });
        }
    }
}

/// Genetic search engine over a discrete search space.
///
/// Each run owns its population, submission counter and statistics; nothing
/// carries over between runs except the random stream.
pub struct GeneticSearch {
    space: SearchSpace,
    config: SearchConfig,
    rng: GenomeRng,
}

impl GeneticSearch {
    /// Create a search engine after validating the space and configuration.
    pub fn new(space: SearchSpace, config: SearchConfig) -> Result<Self, ConfigError> {
        space.validate()?;
        config.validate()?;

        let rng = match config.random_seed {
            Some(seed) => GenomeRng::new(seed),
            None => GenomeRng::random(),
        };

        Ok(Self { space, config, rng })
    }

    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Decode genes into a parameter assignment.
    pub fn decode(&self, genome: &Genome) -> Assignment {
        codec::decode(&self.space, &genome.genes)
    }

    /// Run the search (blocking).
    pub fn run<O: Oracle>(&mut self, oracle: O) -> Result<SearchOutcome, O::Error> {
        self.run_with_callback(oracle, |_| {})
    }

    /// Run the search, reporting each generation's statistics as it completes.
    ///
    /// The initial population is generation 0, so a finished run reports
    /// `max_generations + 1` entries. The first oracle error aborts the run
    /// and is returned as is.
    pub fn run_with_callback<O, F>(
        &mut self,
        oracle: O,
        mut callback: F,
    ) -> Result<SearchOutcome, O::Error>
    where
        O: Oracle,
        F: FnMut(&GenerationStats),
    {
        let start_time = Instant::now();
        let config = &self.config;
        let space = &self.space;
        let rng = &mut self.rng;

        let pop_size = config.population_size;
        let tournament_size = config.effective_tournament_size();

        log::info!(
            "Starting genetic search: {} parameters, {} grid points, population {}, {} generations, tournament {}",
            space.len(),
            space.combinations(),
            pop_size,
            config.max_generations,
            tournament_size
        );

        let mut adapter = FitnessAdapter::new(space, oracle);
        let mut best: Option<BestSoFar> = None;
        let mut history = Vec::with_capacity(config.max_generations + 1);

        // Initialize
        let mut population = rng.random_population(space, pop_size);

        let stats = evaluate_population(&mut adapter, &mut population, &mut best, 0)?;
        callback(&stats);
        history.push(stats);

        for generation in 1..=config.max_generations {
            // Selection: winners are independent clones.
            let mut offspring = rng.select_tournament(&population, pop_size, tournament_size);

            // Recombination of consecutive pairs
            for pair in offspring.chunks_exact_mut(2) {
                if rng.gate(config.crossover_prob) {
                    let (a, b) = pair.split_at_mut(1);
                    rng.crossover(&mut a[0], &mut b[0], config.gen_crossover_prob);
                }
            }

            // Mutation
            for genome in &mut offspring {
                if rng.gate(config.mutation_prob) {
                    rng.mutate(genome, space, config.gen_mutation_prob, config.mutation_mode);
                }
            }

            population = offspring;

            let stats = evaluate_population(&mut adapter, &mut population, &mut best, generation)?;
            callback(&stats);
            history.push(stats);
        }

        let best = best.expect("population is never empty after validation");
        let elapsed_seconds = start_time.elapsed().as_secs_f64();
        let total_evaluations = adapter.evaluations();

        let best_assignment = codec::decode(space, &best.genes);
        log::info!(
            "Genetic search finished: best {} = {:.6} (generation {}, submission {}), {} evaluations in {:.2}s",
            best_assignment,
            best.fitness,
            best.generation,
            best.submission,
            total_evaluations,
            elapsed_seconds
        );

        Ok(SearchOutcome {
            best: best_assignment,
            best_fitness: best.fitness,
            best_submission: best.submission,
            best_generation: best.generation,
            history,
            total_evaluations,
            elapsed_seconds,
        })
    }
}

/// Evaluate every genome without a valid fitness, in population order, and
/// summarize the generation.
fn evaluate_population<O: Oracle>(
    adapter: &mut FitnessAdapter<'_, O>,
    population: &mut [Genome],
    best: &mut Option<BestSoFar>,
    generation: usize,
) -> Result<GenerationStats, O::Error> {
    let mut evaluations = 0;

    for genome in population.iter_mut() {
        if genome.is_valid() {
            continue;
        }
        let (submission, fitness) = adapter.evaluate(genome)?;
        BestSoFar::offer(best, genome, fitness, submission, generation);
        evaluations += 1;
    }

    let fitness: Vec<f64> = population
        .iter()
        .filter_map(Genome::fitness_value)
        .collect();
    let stats = GenerationStats::from_fitness(generation, evaluations, &fitness);

    log::debug!(
        "Generation {}: evaluated {}, max={:.4}, mean={:.4}, min={:.4}",
        generation,
        evaluations,
        stats.max,
        stats.mean,
        stats.min
    );

    Ok(stats)
}
