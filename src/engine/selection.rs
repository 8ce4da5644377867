//! Tournament selection.

use rand::Rng;

use super::genome::{Genome, GenomeRng};

impl GenomeRng {
    /// Run `k` independent tournaments and clone each winner.
    ///
    /// Entrants are drawn uniformly with replacement. The first entrant with
    /// the highest fitness wins, so ties go to the earliest draw. Entrants
    /// without a valid fitness rank below every evaluated one.
    pub fn select_tournament(
        &mut self,
        population: &[Genome],
        k: usize,
        size: usize,
    ) -> Vec<Genome> {
        if population.is_empty() {
            return Vec::new();
        }
        debug_assert!(
            population.iter().all(Genome::is_valid),
            "selection requires an evaluated population"
        );

        (0..k)
            .map(|_| population[self.tournament_index(population, size)].clone())
            .collect()
    }

    /// Index of a single tournament winner.
    fn tournament_index(&mut self, population: &[Genome], size: usize) -> usize {
        let mut best_idx = self.rng.gen_range(0..population.len());
        let mut best_fitness = rank_key(&population[best_idx]);

        for _ in 1..size.max(1) {
            let idx = self.rng.gen_range(0..population.len());
            let fitness = rank_key(&population[idx]);
            if fitness > best_fitness {
                best_fitness = fitness;
                best_idx = idx;
            }
        }
        best_idx
    }
}

/// Comparable fitness; unevaluated and NaN fitness rank lowest.
fn rank_key(genome: &Genome) -> f64 {
    match genome.fitness_value() {
        Some(f) if !f.is_nan() => f,
        _ => f64::NEG_INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParamValue;

    fn evaluated(value: i64, fitness: f64) -> Genome {
        let mut genome = Genome::new(vec![ParamValue::Int(value)]);
        genome.set_fitness(fitness);
        genome
    }

    #[test]
    fn test_selects_requested_count() {
        let mut rng = GenomeRng::new(42);
        let population: Vec<Genome> = (0..10).map(|i| evaluated(i, i as f64)).collect();

        let selected = rng.select_tournament(&population, 10, 3);
        assert_eq!(selected.len(), 10);
        for genome in &selected {
            assert!(population.contains(genome));
        }
    }

    #[test]
    fn test_full_pressure_picks_best() {
        let mut rng = GenomeRng::new(42);
        let population = vec![evaluated(1, 0.5), evaluated(10, 0.9)];

        // With many entrants per tournament both genomes are seen almost surely.
        let selected = rng.select_tournament(&population, 20, 64);
        assert!(selected.iter().all(|g| g.genes[0] == ParamValue::Int(10)));
    }

    #[test]
    fn test_size_one_is_uniform_sampling() {
        let mut rng = GenomeRng::new(9);
        let population = vec![evaluated(1, 0.0), evaluated(2, 1.0)];

        let selected = rng.select_tournament(&population, 200, 1);
        let weak = selected.iter().filter(|g| g.genes[0] == ParamValue::Int(1)).count();
        assert!(weak > 50 && weak < 150);
    }

    #[test]
    fn test_nan_never_beats_a_number() {
        let mut rng = GenomeRng::new(5);
        let population = vec![evaluated(1, f64::NAN), evaluated(2, -100.0)];

        let selected = rng.select_tournament(&population, 20, 64);
        assert!(selected.iter().all(|g| g.genes[0] == ParamValue::Int(2)));
    }

    #[test]
    fn test_empty_population() {
        let mut rng = GenomeRng::new(0);
        assert!(rng.select_tournament(&[], 5, 2).is_empty());
    }
}
