//! Genomes and the random operators that create and vary them.
//!
//! Provides random generation, uniform crossover, and reset mutation.

use rand::prelude::*;

use crate::schema::{MutationMode, ParamValue, SearchSpace};

/// Evaluation state of a genome.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Fitness {
    /// Never evaluated.
    #[default]
    Unevaluated,
    /// Evaluated, and the genes have not changed since.
    Valid(f64),
    /// Genes changed after evaluation; holds the outdated value.
    Stale(f64),
}

/// One candidate parameter setting in gene form.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    /// One value per parameter, in search-space order.
    pub genes: Vec<ParamValue>,
    /// Evaluation state.
    pub fitness: Fitness,
}

impl Genome {
    /// Wrap unevaluated genes.
    pub fn new(genes: Vec<ParamValue>) -> Self {
        Self {
            genes,
            fitness: Fitness::Unevaluated,
        }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Whether the fitness can be used for selection.
    pub fn is_valid(&self) -> bool {
        matches!(self.fitness, Fitness::Valid(_))
    }

    /// Current fitness, only when valid.
    pub fn fitness_value(&self) -> Option<f64> {
        match self.fitness {
            Fitness::Valid(f) => Some(f),
            _ => None,
        }
    }

    /// Record a freshly computed fitness.
    pub fn set_fitness(&mut self, value: f64) {
        self.fitness = Fitness::Valid(value);
    }

    /// Mark the fitness as needing recomputation.
    pub fn invalidate(&mut self) {
        if let Fitness::Valid(f) = self.fitness {
            self.fitness = Fitness::Stale(f);
        }
    }
}

/// Random number generator wrapper for genome operations.
pub struct GenomeRng {
    pub(super) rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Bernoulli trial with probability `p`.
    pub fn gate(&mut self, p: f64) -> bool {
        self.rng.r#gen::<f64>() < p
    }

    /// Draw one gene uniformly from a candidate list.
    fn draw(&mut self, values: &[ParamValue]) -> ParamValue {
        values
            .choose(&mut self.rng)
            .cloned()
            .expect("candidate lists are validated non-empty")
    }

    /// Generate a genome by drawing every gene independently.
    pub fn random_genome(&mut self, space: &SearchSpace) -> Genome {
        let genes = space
            .params()
            .iter()
            .map(|param| self.draw(&param.values))
            .collect();
        Genome::new(genes)
    }

    /// Generate `size` genomes. Duplicates are kept.
    pub fn random_population(&mut self, space: &SearchSpace, size: usize) -> Vec<Genome> {
        (0..size).map(|_| self.random_genome(space)).collect()
    }

    /// Uniform crossover in place: each position swaps with probability `p`.
    ///
    /// Both genomes are invalidated whether or not any swap happened.
    pub fn crossover(&mut self, a: &mut Genome, b: &mut Genome, p: f64) {
        debug_assert_eq!(a.len(), b.len(), "crossover between unequal genomes");

        for (ga, gb) in a.genes.iter_mut().zip(b.genes.iter_mut()) {
            if self.gate(p) {
                std::mem::swap(ga, gb);
            }
        }

        a.invalidate();
        b.invalidate();
    }

    /// Reset mutation: redraw genes from their candidate lists.
    ///
    /// With [`MutationMode::WholeGenome`] a single trial with probability `p`
    /// decides whether every gene is redrawn. With [`MutationMode::PerGene`]
    /// each gene is redrawn on its own trial. The genome is invalidated either
    /// way.
    pub fn mutate(
        &mut self,
        genome: &mut Genome,
        space: &SearchSpace,
        p: f64,
        mode: MutationMode,
    ) {
        match mode {
            MutationMode::WholeGenome => {
                if self.gate(p) {
                    for (gene, param) in genome.genes.iter_mut().zip(space.params()) {
                        *gene = self.draw(&param.values);
                    }
                }
            }
            MutationMode::PerGene => {
                for (gene, param) in genome.genes.iter_mut().zip(space.params()) {
                    if self.gate(p) {
                        *gene = self.draw(&param.values);
                    }
                }
            }
        }

        genome.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> SearchSpace {
        SearchSpace::new()
            .with_param("depth", [1, 2, 3, 4])
            .with_param("criterion", ["gini", "entropy"])
            .with_param("bootstrap", [true, false])
            .with_param("alpha", [0.01, 0.1, 1.0])
    }

    fn in_space(genome: &Genome, space: &SearchSpace) -> bool {
        genome.len() == space.len()
            && genome
                .genes
                .iter()
                .zip(space.params())
                .all(|(gene, param)| param.values.contains(gene))
    }

    #[test]
    fn test_random_genome() {
        let mut rng = GenomeRng::new(42);
        let space = space();

        let population = rng.random_population(&space, 25);
        assert_eq!(population.len(), 25);
        for genome in &population {
            assert!(in_space(genome, &space));
            assert_eq!(genome.fitness, Fitness::Unevaluated);
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let space = space();
        let a = GenomeRng::new(7).random_population(&space, 10);
        let b = GenomeRng::new(7).random_population(&space, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_crossover_swaps_values_only() {
        let mut rng = GenomeRng::new(42);
        let space = space();

        let mut a = rng.random_genome(&space);
        let mut b = rng.random_genome(&space);
        a.set_fitness(0.4);
        b.set_fitness(0.6);
        let (orig_a, orig_b) = (a.clone(), b.clone());

        rng.crossover(&mut a, &mut b, 0.5);

        for i in 0..space.len() {
            let mut before = [&orig_a.genes[i], &orig_b.genes[i]];
            let mut after = [&a.genes[i], &b.genes[i]];
            before.sort_by_key(|v| v.to_string());
            after.sort_by_key(|v| v.to_string());
            assert_eq!(before, after);
        }
        assert_eq!(a.fitness, Fitness::Stale(0.4));
        assert_eq!(b.fitness, Fitness::Stale(0.6));
    }

    #[test]
    fn test_crossover_full_probability_swaps_everything() {
        let mut rng = GenomeRng::new(1);
        let mut a = Genome::new(vec![ParamValue::Int(1), ParamValue::from("x")]);
        let mut b = Genome::new(vec![ParamValue::Int(2), ParamValue::from("y")]);

        rng.crossover(&mut a, &mut b, 1.0);
        assert_eq!(a.genes, vec![ParamValue::Int(2), ParamValue::from("y")]);
        assert_eq!(b.genes, vec![ParamValue::Int(1), ParamValue::from("x")]);

        rng.crossover(&mut a, &mut b, 0.0);
        assert_eq!(a.genes, vec![ParamValue::Int(2), ParamValue::from("y")]);
    }

    #[test]
    fn test_mutation() {
        let mut rng = GenomeRng::new(42);
        let space = space();

        for mode in [MutationMode::WholeGenome, MutationMode::PerGene] {
            let mut genome = rng.random_genome(&space);
            genome.set_fitness(1.0);

            rng.mutate(&mut genome, &space, 1.0, mode);

            assert!(in_space(&genome, &space));
            assert!(!genome.is_valid());
        }
    }

    #[test]
    fn test_zero_probability_mutation_keeps_genes() {
        let mut rng = GenomeRng::new(3);
        let space = space();
        let mut genome = rng.random_genome(&space);
        let original = genome.genes.clone();

        rng.mutate(&mut genome, &space, 0.0, MutationMode::PerGene);
        rng.mutate(&mut genome, &space, 0.0, MutationMode::WholeGenome);
        assert_eq!(genome.genes, original);
    }

    /// 100 parameters with 1000 distinct candidates each, so a redraw almost
    /// never lands on the old value.
    fn wide_space() -> SearchSpace {
        let mut space = SearchSpace::new();
        for i in 0..100 {
            space.push(format!("p{}", i), (0..1000).collect::<Vec<i64>>());
        }
        space
    }

    fn changed_genes(rng: &mut GenomeRng, space: &SearchSpace, mode: MutationMode) -> usize {
        let mut genome = rng.random_genome(space);
        let original = genome.genes.clone();
        rng.mutate(&mut genome, space, 0.5, mode);
        genome
            .genes
            .iter()
            .zip(&original)
            .filter(|(after, before)| after != before)
            .count()
    }

    #[test]
    fn test_whole_genome_mutation_is_all_or_nothing() {
        let mut rng = GenomeRng::new(11);
        let space = wide_space();

        let counts: Vec<usize> = (0..100)
            .map(|_| changed_genes(&mut rng, &space, MutationMode::WholeGenome))
            .collect();

        assert!(counts.iter().all(|&c| c == 0 || c >= 90), "{:?}", counts);
        assert!(counts.contains(&0));
        assert!(counts.iter().any(|&c| c >= 90));
    }

    #[test]
    fn test_per_gene_mutation_changes_about_half() {
        let mut rng = GenomeRng::new(11);
        let space = wide_space();

        for _ in 0..100 {
            let changed = changed_genes(&mut rng, &space, MutationMode::PerGene);
            assert!((25..=75).contains(&changed), "changed {} of 100", changed);
        }
    }

    #[test]
    fn test_invalidate_only_affects_valid() {
        let mut genome = Genome::new(vec![ParamValue::Int(1)]);
        genome.invalidate();
        assert_eq!(genome.fitness, Fitness::Unevaluated);

        genome.set_fitness(0.25);
        assert_eq!(genome.fitness_value(), Some(0.25));
        genome.invalidate();
        assert_eq!(genome.fitness_value(), None);
        assert_eq!(genome.fitness, Fitness::Stale(0.25));
    }
}
