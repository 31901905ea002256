//!
//! Viterbi algorithm
//!
//! ```text
//! v[0][k] = init(k) e_k(x[0])
//! v[i][k] = e_k(x[i]) max_{l: parents of k} v[i-1][l] t(l, k, i)
//! best    = max_k v[n-1][k] end(k)
//! ```
//!
//! Only children of the states alive at `i-1` are computed at `i`, and only
//! parents alive at `i-1` are visited.
//!
use super::scorer::ScoreProvider;
use super::table::{TracebackTable, NONE};
use super::traceback::TracebackPath;
use super::trellis::{Algorithm, Trellis};
use crate::common::StateIndex;
use crate::error::DecodeError;
use crate::graph::StateSet;
use crate::prob::Prob;
use crate::seq::Observations;
use log::{debug, info, warn};

///
/// Result of Viterbi
///
#[derive(Debug, Clone, PartialEq)]
pub struct ViterbiResult {
    score: Prob,
    ending: Option<StateIndex>,
    traceback: TracebackTable,
    len: usize,
}

impl ViterbiResult {
    /// probability of the best path. `p=0` if there is no valid path.
    pub fn score(&self) -> Prob {
        self.score
    }
    /// the last state of the best path
    pub fn ending_state(&self) -> Option<StateIndex> {
        self.ending
    }
    pub fn traceback(&self) -> &TracebackTable {
        &self.traceback
    }
    ///
    /// The best path, or `None` if no path can explain the sequence.
    ///
    pub fn path(&self) -> Option<TracebackPath> {
        match self.ending {
            Some(s) if !self.score.is_zero() => {
                let states = self.traceback.trace(self.len - 1, s);
                Some(TracebackPath::from_tail_first(states, self.score))
            }
            _ => {
                warn!("viterbi: no valid path");
                None
            }
        }
    }
}

impl<'a, P: ScoreProvider> Trellis<'a, P> {
    ///
    /// Run Viterbi and keep the traceback table.
    ///
    pub fn viterbi(&mut self) -> Result<ViterbiResult, DecodeError> {
        self.begin(Algorithm::Viterbi)?;
        let graph = self.graph;
        let seq = self.seq;
        let n = seq.len();
        let n_states = graph.n_states();
        let mut traceback = TracebackTable::new(n, n_states);

        // position 0
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

        for i in 1..n {
            self.check(i)?;
            if active.is_empty() {
                debug!("viterbi: no active state at {}", i);
                break;
            }
            self.buffers.advance();
            let candidates = graph.frontier(&active);
            let mut next = StateSet::new(n_states);
            let (prev, cur) = self.buffers.split();
            for k in candidates.iter() {
                let mut best = Prob::zero();
                let mut best_from = NONE;
                for l in graph.from(k).intersection(&active) {
                    let v = prev[l] * graph.provider().transition(l, k, seq, i);
                    // strict: the smallest index wins a tie
                    if v > best {
                        best = v;
                        best_from = l;
                    }
                }
                if best_from == NONE {
                    continue;
                }
                let v = best * graph.emission(seq, k, i);
                if !v.is_zero() {
                    cur[k] = v;
                    traceback.set(i, k, best_from);
                    next.insert(k);
                }
            }
            active = next;
        }

        // ending
        let cur = self.buffers.current();
        let mut score = Prob::zero();
        let mut ending = None;
        for k in graph.ending_from().intersection(&active) {
            let v = cur[k] * graph.end_transition(k);
            if v > score {
                score = v;
                ending = Some(k);
            }
        }
        if score.is_zero() {
            warn!("viterbi: no valid path for the sequence");
        } else {
            info!("viterbi: score={}", score);
        }

        Ok(ViterbiResult {
            score,
            ending,
            traceback,
            len: n,
        })
    }
}
