//!
//! Posterior decoding
//!
//! ```text
//! post[i][k] = P(in state k at i | x) = f[i][k] b[i][k] / P(x)
//! ```
//!
//! Unlike the other algorithms, the full forward and backward matrices are
//! kept.
//!
use super::scorer::ScoreProvider;
use super::table::ScoreMatrix;
use super::traceback::{MultiTraceback, TracebackPath};
use super::trellis::{Algorithm, Interrupt, Trellis};
use crate::common::StateIndex;
use crate::error::DecodeError;
use crate::graph::StateGraph;
use crate::prob::Prob;
use crate::seq::Observations;
use log::{info, warn};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

///
/// Posterior probability of each (position, state)
///
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorResult {
    total: Prob,
    table: ScoreMatrix,
}

impl PosteriorResult {
    /// `P(x)`
    pub fn total(&self) -> Prob {
        self.total
    }
    pub fn get(&self, pos: usize, state: StateIndex) -> Prob {
        self.table.get(pos, state)
    }
    /// posteriors in log space
    pub fn log_table(&self) -> &ScoreMatrix {
        &self.table
    }
    /// posteriors as probabilities, `[pos][state]`
    pub fn probabilities(&self) -> Vec<Vec<f64>> {
        self.table
            .rows()
            .map(|row| row.iter().map(|p| p.to_value()).collect())
            .collect()
    }
    fn no_valid_path(&self) -> bool {
        if self.total.is_zero() {
            warn!("posterior: no valid path");
            true
        } else {
            false
        }
    }
    ///
    /// Most probable state at each position.
    ///
    /// The score is the product of the chosen posteriors. The path is not
    /// guaranteed to use edges of the graph.
    ///
    pub fn path(&self) -> Option<TracebackPath> {
        if self.no_valid_path() {
            return None;
        }
        let mut states = Vec::with_capacity(self.table.n_positions());
        let mut score = Prob::one();
        for row in self.table.rows() {
            let mut best = 0;
            for (k, &v) in row.iter().enumerate() {
                if v > row[best] {
                    best = k;
                }
            }
            states.push(best);
            score *= row[best];
        }
        Some(TracebackPath::new(states, score))
    }
    ///
    /// Most probable label at each position, then the most probable state
    /// with that label.
    ///
    /// The score is the product of the chosen label posteriors.
    ///
    pub fn label_path<P>(&self, graph: &StateGraph<P>) -> Option<TracebackPath> {
        if self.no_valid_path() {
            return None;
        }
        // labels in the order of first appearance
        let mut labels: Vec<&str> = Vec::new();
        let label_of: Vec<usize> = graph
            .states()
            .iter()
            .map(|s| match labels.iter().position(|&l| l == s.label) {
                Some(i) => i,
                None => {
                    labels.push(&s.label);
                    labels.len() - 1
                }
            })
            .collect();

        let mut states = Vec::with_capacity(self.table.n_positions());
        let mut score = Prob::one();
        for row in self.table.rows() {
            let mut sums = vec![Prob::zero(); labels.len()];
            for (k, &v) in row.iter().enumerate() {
                sums[label_of[k]] += v;
            }
            let mut label = 0;
            for (i, &v) in sums.iter().enumerate() {
                if v > sums[label] {
                    label = i;
                }
            }
            let mut best: Option<StateIndex> = None;
            for (k, &v) in row.iter().enumerate() {
                if label_of[k] == label && best.map_or(true, |b| v > row[b]) {
                    best = Some(k);
                }
            }
            // every label is carried by at least one state
            states.push(best.unwrap_or(0));
            score *= sums[label];
        }
        Some(TracebackPath::new(states, score))
    }
    fn column_samplers(&self) -> Result<Vec<WeightedIndex<f64>>, DecodeError> {
        self.table
            .rows()
            .enumerate()
            .map(|(pos, row)| {
                WeightedIndex::new(row.iter().map(|p| p.to_value())).map_err(|_| {
                    DecodeError::EmptyBucket {
                        position: pos,
                        state: None,
                    }
                })
            })
            .collect()
    }
    ///
    /// Draw a state at each position independently from its posterior.
    ///
    pub fn sample_path<R: Rng>(&self, rng: &mut R) -> Result<TracebackPath, DecodeError> {
        let samplers = self.column_samplers()?;
        Ok(self.draw(&samplers, rng))
    }
    ///
    /// Draw `reps` paths with `sample_path` and tally them.
    ///
    /// `interrupt` is checked every `DRAWS_PER_CHECK` draws.
    ///
    pub fn sample_paths<R: Rng>(
        &self,
        rng: &mut R,
        reps: usize,
        interrupt: &Interrupt,
    ) -> Result<MultiTraceback, DecodeError> {
        let samplers = self.column_samplers()?;
        let mut m = MultiTraceback::new();
        for draws in 0..reps {
            interrupt.check_draws(draws)?;
            m.push(self.draw(&samplers, rng));
        }
        m.finalize();
        Ok(m)
    }
    fn draw<R: Rng>(&self, samplers: &[WeightedIndex<f64>], rng: &mut R) -> TracebackPath {
        let states: Vec<StateIndex> = samplers.iter().map(|w| w.sample(rng)).collect();
        let score: Prob = states
            .iter()
            .enumerate()
            .map(|(pos, &k)| self.table.get(pos, k))
            .product();
        TracebackPath::new(states, score)
    }
}

impl<'a, P: ScoreProvider> Trellis<'a, P> {
    ///
    /// Run Forward and Backward keeping every position, and combine them.
    ///
    /// Fails with `DecodeError::Inconsistent` if the two totals differ by
    /// more than `params.fb_tolerance` in log space.
    ///
    pub fn posterior(&mut self) -> Result<PosteriorResult, DecodeError> {
        self.begin(Algorithm::Posterior)?;
        let n = self.seq.len();
        let n_states = self.graph.n_states();

        let mut f = ScoreMatrix::new(n, n_states);
        let total_f = self.forward_sweep(|i, row| f.set_row(i, row))?;
        self.buffers.clear();
        let mut b = ScoreMatrix::new(n, n_states);
        let total_b = self.backward_sweep(|i, row| b.set_row(i, row))?;

        let diff = total_f.log_diff(total_b);
        if diff > self.params.fb_tolerance {
            warn!(
                "posterior: forward {} and backward {} differ by {}",
                total_f, total_b, diff
            );
            return Err(DecodeError::Inconsistent {
                forward: total_f.to_log_value(),
                backward: total_b.to_log_value(),
            });
        }

        let mut table = ScoreMatrix::new(n, n_states);
        if !total_f.is_zero() {
            for i in 0..n {
                for k in 0..n_states {
                    table.set(i, k, f.get(i, k) * b.get(i, k) / total_f);
                }
            }
        }
        info!("posterior: total={}", total_f);
        Ok(PosteriorResult {
            total: total_f,
            table,
        })
    }
}
