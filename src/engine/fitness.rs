//! Fitness evaluation through an external scoring oracle.
//!
//! The engine never trains or scores models itself. It decodes a genome,
//! hands the assignment to an [`Oracle`] and uses the returned score as
//! fitness. Oracles that only expose a cumulative, batch-oriented results
//! table are adapted with [`CumulativeOracle`], which correlates rows with
//! genomes through the submission counter.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::schema::{Assignment, SearchSpace};

use super::codec;
use super::genome::Genome;

/// Scores one parameter assignment at a time.
pub trait Oracle {
    /// Failure that aborts the whole search.
    type Error;

    /// Called once before the first evaluation of every run.
    fn begin_search(&mut self) {}

    /// Score an assignment. Higher is better.
    ///
    /// `submission` is the zero-based position of this call within the run.
    fn evaluate(
        &mut self,
        submission: usize,
        assignment: &Assignment,
    ) -> Result<f64, Self::Error>;
}

impl<O: Oracle + ?Sized> Oracle for &mut O {
    type Error = O::Error;

    fn begin_search(&mut self) {
        (**self).begin_search()
    }

    fn evaluate(
        &mut self,
        submission: usize,
        assignment: &Assignment,
    ) -> Result<f64, Self::Error> {
        (**self).evaluate(submission, assignment)
    }
}

/// Oracle backed by a closure that returns the score directly.
pub struct FnOracle<F, E> {
    f: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> FnOracle<F, E>
where
    F: FnMut(&Assignment) -> Result<f64, E>,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _error: PhantomData,
        }
    }
}

impl<F, E> Oracle for FnOracle<F, E>
where
    F: FnMut(&Assignment) -> Result<f64, E>,
{
    type Error = E;

    fn evaluate(&mut self, _submission: usize, assignment: &Assignment) -> Result<f64, E> {
        (self.f)(assignment)
    }
}

/// Wrap a scoring closure as an [`Oracle`].
pub fn oracle_fn<F, E>(f: F) -> FnOracle<F, E>
where
    F: FnMut(&Assignment) -> Result<f64, E>,
{
    FnOracle::new(f)
}

/// Zero-based evaluation counter, reset at the start of every run.
#[derive(Debug, Clone, Default)]
pub struct SubmissionCounter {
    submitted: usize,
}

impl SubmissionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.submitted = 0;
    }

    /// Advance and return the index of the submission just made.
    pub fn advance(&mut self) -> usize {
        self.submitted += 1;
        self.submitted - 1
    }

    /// Submissions made so far.
    pub fn count(&self) -> usize {
        self.submitted
    }
}

/// Metric column holding mean cross-validated test scores.
pub const MEAN_TEST_SCORE: &str = "mean_test_score";

/// Append-only results table, one row per submitted assignment.
#[derive(Debug, Clone, Default)]
pub struct ResultsTable {
    params: Vec<Assignment>,
    metrics: HashMap<String, Vec<f64>>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row. Metrics absent from earlier rows are back-filled with NaN,
    /// and metrics missing from this row are recorded as NaN.
    pub fn push_row<'a>(
        &mut self,
        params: Assignment,
        scores: impl IntoIterator<Item = (&'a str, f64)>,
    ) {
        let row = self.params.len();
        self.params.push(params);

        for (name, score) in scores {
            let column = self
                .metrics
                .entry(name.to_string())
                .or_insert_with(|| vec![f64::NAN; row]);
            column.push(score);
        }
        for column in self.metrics.values_mut() {
            column.resize(row + 1, f64::NAN);
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn metric(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(Vec::as_slice)
    }

    pub fn params(&self) -> &[Assignment] {
        &self.params
    }

    /// Row with the highest value of `metric`; the first row wins ties.
    pub fn best_row(&self, metric: &str) -> Option<usize> {
        let column = self.metric(metric)?;
        column
            .iter()
            .enumerate()
            .filter(|(_, score)| !score.is_nan())
            .fold(None, |best: Option<(usize, f64)>, (i, &score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((i, score)),
            })
            .map(|(i, _)| i)
    }
}

/// Oracle that evaluates batches and exposes cumulative results.
pub trait BatchOracle {
    type Error;

    /// Every result recorded so far, without submitting anything.
    fn results(&self) -> &ResultsTable;

    /// Evaluate `candidates` and return the table of every result so far.
    fn evaluate_candidates(
        &mut self,
        candidates: &[Assignment],
    ) -> Result<&ResultsTable, Self::Error>;
}

/// Failures of a [`CumulativeOracle`].
#[derive(Debug, thiserror::Error)]
pub enum CumulativeError<E> {
    #[error("Batch evaluation failed: {0}")]
    Oracle(#[source] E),
    #[error("Results table has no '{0}' column")]
    MissingMetric(String),
    #[error("Submission {submission} expected {expected} result rows, found {found}")]
    OrderingViolation {
        submission: usize,
        expected: usize,
        found: usize,
    },
}

/// Adapts a [`BatchOracle`] by submitting single-candidate batches and
/// reading the row at the submission index.
///
/// Rows are correlated purely by order, so the table must grow by exactly
/// one row per submission. The row count before the first submission of a
/// run is the baseline; any other growth, including none, is reported as an
/// [`CumulativeError::OrderingViolation`] instead of yielding a wrong score.
pub struct CumulativeOracle<B> {
    inner: B,
    metric: String,
    counter: SubmissionCounter,
    base_rows: usize,
}

impl<B: BatchOracle> CumulativeOracle<B> {
    /// Read scores from the `mean_test_score` column.
    pub fn new(inner: B) -> Self {
        Self::with_metric(inner, MEAN_TEST_SCORE)
    }

    pub fn with_metric(inner: B, metric: impl Into<String>) -> Self {
        let base_rows = inner.results().len();
        Self {
            inner,
            metric: metric.into(),
            counter: SubmissionCounter::new(),
            base_rows,
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: BatchOracle> Oracle for CumulativeOracle<B> {
    type Error = CumulativeError<B::Error>;

    fn begin_search(&mut self) {
        self.counter.reset();
        self.base_rows = self.inner.results().len();
    }

    fn evaluate(
        &mut self,
        submission: usize,
        assignment: &Assignment,
    ) -> Result<f64, Self::Error> {
        let index = self.counter.advance();
        let row = self.base_rows + index;
        let table = self
            .inner
            .evaluate_candidates(std::slice::from_ref(assignment))
            .map_err(CumulativeError::Oracle)?;

        if index != submission || table.len() != row + 1 {
            return Err(CumulativeError::OrderingViolation {
                submission,
                expected: row + 1,
                found: table.len(),
            });
        }

        let column = table
            .metric(&self.metric)
            .ok_or_else(|| CumulativeError::MissingMetric(self.metric.clone()))?;
        Ok(column[row])
    }
}

/// Bridges genomes to oracle scores and owns the run's submission counter.
pub struct FitnessAdapter<'a, O> {
    space: &'a SearchSpace,
    oracle: O,
    counter: SubmissionCounter,
}

impl<'a, O: Oracle> FitnessAdapter<'a, O> {
    /// Create an adapter and reset the counter for a new run.
    pub fn new(space: &'a SearchSpace, mut oracle: O) -> Self {
        oracle.begin_search();
        Self {
            space,
            oracle,
            counter: SubmissionCounter::new(),
        }
    }

    /// Evaluate one genome, returning its submission index and score.
    ///
    /// The fitness is written back onto the genome. Oracle errors are
    /// returned unchanged.
    pub fn evaluate(&mut self, genome: &mut Genome) -> Result<(usize, f64), O::Error> {
        let assignment = codec::decode(self.space, &genome.genes);
        let submission = self.counter.count();
        let score = self.oracle.evaluate(submission, &assignment)?;
        self.counter.advance();

        log::trace!("submission {}: {} -> {}", submission, assignment, score);

        genome.set_fitness(score);
        Ok((submission, score))
    }

    /// Evaluations completed so far.
    pub fn evaluations(&self) -> usize {
        self.counter.count()
    }
}
