//!
//! Backward algorithm definitions
//!
use super::scorer::ScoreProvider;
use super::trellis::{Algorithm, Trellis};
use crate::error::DecodeError;
use crate::graph::StateSet;
use crate::prob::Prob;
use crate::seq::Observations;
use log::{debug, info};

///
/// Result of Backward
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackwardResult {
    total: Prob,
}

impl BackwardResult {
    /// `P(x)`, summed over all paths. Equals the forward total.
    pub fn total(&self) -> Prob {
        self.total
    }
}

impl<'a, P: ScoreProvider> Trellis<'a, P> {
    ///
    /// Run Backward algorithm and get the total probability of the sequence.
    ///
    pub fn backward(&mut self) -> Result<BackwardResult, DecodeError> {
        self.begin(Algorithm::Backward)?;
        let total = self.backward_sweep(|_, _| {})?;
        info!("backward: total={}", total);
        Ok(BackwardResult { total })
    }
    ///
    /// Fill the buffers from position n-1 to 0 and return the total.
    ///
    /// `b[i][k]` = P(emits `x[i+1:]` and ends | in state `k` at `i`)
    ///
    /// ```text
    /// b[n-1][k] = end(k)
    /// b[i][k]   = \sum_{l: children of k} t(k, l, i+1) e_l(x[i+1]) b[i+1][l]
    /// P(x)      = \sum_k init(k) e_k(x[0]) b[0][k]
    /// ```
    ///
    /// `on_row(i, b[i])` is called after each position is filled.
    ///
    pub(crate) fn backward_sweep<F>(&mut self, mut on_row: F) -> Result<Prob, DecodeError>
    where
        F: FnMut(usize, &[Prob]),
    {
        let graph = self.graph;
        let seq = self.seq;
        let n = seq.len();
        let n_states = graph.n_states();

        let mut active = StateSet::new(n_states);
        {
            let cur = self.buffers.current_mut();
            for k in graph.ending_from().iter() {
                cur[k] = graph.end_transition(k);
                active.insert(k);
            }
        }
        on_row(n - 1, self.buffers.current());

        for i in (0..n - 1).rev() {
            self.check(i)?;
            self.buffers.advance();
            let candidates = graph.back_frontier(&active);
            let mut next = StateSet::new(n_states);
            {
                let (prev, cur) = self.buffers.split();
                for k in candidates.iter() {
                    let v: Prob = graph
                        .to(k)
                        .intersection(&active)
                        .map(|l| graph.step_score(seq, k, l, i + 1) * prev[l])
                        .sum();
                    if !v.is_zero() {
                        cur[k] = v;
                        next.insert(k);
                    }
                }
            }
            debug!("backward: i={} n_active={}", i, next.count());
            active = next;
            on_row(i, self.buffers.current());
        }

        let cur = self.buffers.current();
        let total: Prob = graph
            .initial_to()
            .intersection(&active)
            .map(|k| graph.initial_score(seq, k) * cur[k])
            .sum();
        Ok(total)
    }
}
