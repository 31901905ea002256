//!
//! Forward algorithm definitions
//!
use super::scorer::ScoreProvider;
use super::trellis::{Algorithm, Trellis};
use crate::error::DecodeError;
use crate::graph::StateSet;
use crate::prob::Prob;
use crate::seq::Observations;
use log::{debug, info};

///
/// Result of Forward
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardResult {
    total: Prob,
}

impl ForwardResult {
    /// `P(x)`, summed over all paths
    pub fn total(&self) -> Prob {
        self.total
    }
}

impl<'a, P: ScoreProvider> Trellis<'a, P> {
    ///
    /// Run Forward algorithm and get the total probability of the sequence.
    ///
    pub fn forward(&mut self) -> Result<ForwardResult, DecodeError> {
        self.begin(Algorithm::Forward)?;
        let total = self.forward_sweep(|_, _| {})?;
        info!("forward: total={}", total);
        Ok(ForwardResult { total })
    }
    ///
    /// Fill the buffers from position 0 to n-1 and return the total.
    ///
    /// `f[i][k]` = P(emits `x[:i+1]` and in state `k` at `i`)
    ///
    /// ```text
    /// f[0][k] = init(k) e_k(x[0])
    /// f[i][k] = e_k(x[i]) \sum_{l: parents of k} f[i-1][l] t(l, k, i)
    /// P(x)    = \sum_k f[n-1][k] end(k)
    /// ```
    ///
    /// `on_row(i, f[i])` is called after each position is filled.
    ///
    pub(crate) fn forward_sweep<F>(&mut self, mut on_row: F) -> Result<Prob, DecodeError>
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
            for k in graph.initial_to().iter() {
                let v = graph.initial_score(seq, k);
                if !v.is_zero() {
                    cur[k] = v;
                    active.insert(k);
                }
            }
        }
        on_row(0, self.buffers.current());

        for i in 1..n {
            self.check(i)?;
            self.buffers.advance();
            let candidates = graph.frontier(&active);
            let mut next = StateSet::new(n_states);
            {
                let (prev, cur) = self.buffers.split();
                for k in candidates.iter() {
                    let from: Prob = graph
                        .from(k)
                        .intersection(&active)
                        .map(|l| prev[l] * graph.provider().transition(l, k, seq, i))
                        .sum();
                    let v = from * graph.emission(seq, k, i);
                    if !v.is_zero() {
                        cur[k] = v;
                        next.insert(k);
                    }
                }
            }
            debug!("forward: i={} n_active={}", i, next.count());
            active = next;
            on_row(i, self.buffers.current());
        }

        let cur = self.buffers.current();
        let total: Prob = graph
            .ending_from()
            .intersection(&active)
            .map(|k| cur[k] * graph.end_transition(k))
            .sum();
        Ok(total)
    }
}
