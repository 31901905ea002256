//!
//! Stochastic sweep and traceback
//!
//! The sweep is a Forward (or Viterbi) sweep that records every edge into a
//! `StochTable`. A path is then sampled from the end:
//!
//! ```text
//! k[n-1] ~ ending bucket
//! k[i-1] ~ bucket(i, k[i])   for i = n-1, ..., 1
//! ```
//!
//! With `SweepKind::Forward`, paths are drawn with probability
//! `P(path, x) / P(x)`.
//!
use super::scorer::ScoreProvider;
use super::stoch_table::{StochEdge, StochTable};
use super::traceback::{MultiTraceback, TracebackPath};
use super::trellis::{Algorithm, Interrupt, SweepKind, Trellis};
use crate::error::DecodeError;
use crate::graph::StateSet;
use crate::prob::Prob;
use crate::seq::Observations;
use log::{debug, info, warn};
use rand::Rng;

///
/// Finalized `StochTable` of a sweep, ready to be sampled
///
#[derive(Debug, Clone)]
pub struct StochasticResult {
    kind: SweepKind,
    total: Prob,
    table: StochTable,
}

impl StochasticResult {
    pub fn kind(&self) -> SweepKind {
        self.kind
    }
    ///
    /// Total of the sweep: `P(x)` for Forward, the best path score for
    /// Viterbi.
    ///
    pub fn total(&self) -> Prob {
        self.total
    }
    pub fn table(&self) -> &StochTable {
        &self.table
    }
    ///
    /// Draw one path.
    ///
    /// The score of the path is its joint probability with the sequence.
    ///
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<TracebackPath, DecodeError> {
        let n = self.table.n_positions();
        let mut states = Vec::with_capacity(n);
        let last = self.table.sample_ending(rng)?;
        let mut score = last.step;
        let mut k = last.source;
        states.push(k);
        for i in (1..n).rev() {
            let edge = self.table.sample_source(i, k, rng)?;
            score *= edge.step;
            k = edge.source;
            states.push(k);
        }
        score *= self.table.initial(k);
        Ok(TracebackPath::from_tail_first(states, score))
    }
    ///
    /// Draw `reps` paths and tally them.
    ///
    /// `interrupt` is checked every `DRAWS_PER_CHECK` draws.
    ///
    pub fn sample_many<R: Rng>(
        &self,
        rng: &mut R,
        reps: usize,
        interrupt: &Interrupt,
    ) -> Result<MultiTraceback, DecodeError> {
        let mut m = MultiTraceback::new();
        for draws in 0..reps {
            interrupt.check_draws(draws)?;
            m.push(self.sample(rng)?);
        }
        m.finalize();
        debug!("stochastic: {} distinct paths in {} draws", m.len(), reps);
        Ok(m)
    }
}

impl<'a, P: ScoreProvider> Trellis<'a, P> {
    ///
    /// Run a sweep recording every edge, and finalize the table.
    ///
    pub fn stochastic(&mut self, kind: SweepKind) -> Result<StochasticResult, DecodeError> {
        self.begin(Algorithm::Stochastic(kind))?;
        let graph = self.graph;
        let seq = self.seq;
        let n = seq.len();
        let n_states = graph.n_states();
        let mut table = StochTable::new(n, n_states);

        let mut active = StateSet::new(n_states);
        {
            let cur = self.buffers.current_mut();
            for k in graph.initial_to().iter() {
                let v = graph.initial_score(seq, k);
                if !v.is_zero() {
                    cur[k] = v;
                    table.set_initial(k, v);
                    active.insert(k);
                }
            }
        }

        for i in 1..n {
            self.check(i)?;
            self.buffers.advance();
            let candidates = graph.frontier(&active);
            let mut next = StateSet::new(n_states);
            let (prev, cur) = self.buffers.split();
            for k in candidates.iter() {
                let mut v = Prob::zero();
                for l in graph.from(k).intersection(&active) {
                    let step = graph.step_score(seq, l, k, i);
                    let weight = prev[l] * step;
                    if weight.is_zero() {
                        continue;
                    }
                    table.push(
                        i,
                        k,
                        StochEdge {
                            source: l,
                            weight,
                            step,
                        },
                    );
                    v = match kind {
                        SweepKind::Forward => v + weight,
                        SweepKind::Viterbi => v.max(weight),
                    };
                }
                if !v.is_zero() {
                    cur[k] = v;
                    next.insert(k);
                }
            }
            active = next;
        }

        let cur = self.buffers.current();
        let mut total = Prob::zero();
        for k in graph.ending_from().intersection(&active) {
            let step = graph.end_transition(k);
            let weight = cur[k] * step;
            if weight.is_zero() {
                continue;
            }
            table.push_ending(StochEdge {
                source: k,
                weight,
                step,
            });
            total = match kind {
                SweepKind::Forward => total + weight,
                SweepKind::Viterbi => total.max(weight),
            };
        }
        table.finalize();

        if total.is_zero() {
            warn!("stochastic: no valid path for the sequence");
        } else {
            info!("stochastic: kind={:?} total={}", kind, total);
        }
        Ok(StochasticResult { kind, total, table })
    }
}
