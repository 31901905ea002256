//!
//! n-best Viterbi
//!
//! Each cell `(i, k)` keeps the `n` best partial paths ending in `k` at `i`,
//! each represented by the `(state, rank)` of its predecessor cell entry.
//!
//! ```text
//! cell[0][k] = [(-, 0, init(k) e_k(x[0]))]
//! cell[i][k] = top_n { (l, r, s t(l, k, i) e_k(x[i])) | l: parents of k, (_, _, s) = cell[i-1][l][r] }
//! ending     = top_n { (k, r, s end(k)) | (_, _, s) = cell[n-1][k][r] }
//! ```
//!
//! Ties are ordered by predecessor state, then predecessor rank (both
//! ascending). Scores are accumulated as `(s t) e` like Viterbi, so rank 0
//! has the same score and path as plain Viterbi bit for bit.
//!
use super::scorer::ScoreProvider;
use super::table::NONE;
use super::traceback::TracebackPath;
use super::trellis::{Algorithm, Trellis};
use crate::common::StateIndex;
use crate::error::DecodeError;
use crate::graph::StateSet;
use crate::prob::Prob;
use crate::seq::Observations;
use log::{debug, info, warn};

///
/// Entry of an n-best cell
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NthScore {
    /// predecessor state (`NONE` at position 0)
    pub state: StateIndex,
    /// rank of the entry in the predecessor cell
    pub rank: usize,
    pub score: Prob,
}

///
/// sort by score descending, then state and rank ascending, and keep `n`.
///
fn keep_best(entries: &mut Vec<NthScore>, n: usize) {
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.state.cmp(&b.state))
            .then(a.rank.cmp(&b.rank))
    });
    entries.truncate(n);
}

///
/// Result of n-best Viterbi
///
#[derive(Debug, Clone, PartialEq)]
pub struct NBestResult {
    n: usize,
    len: usize,
    n_states: usize,
    cells: Vec<Vec<NthScore>>,
    ending: Vec<NthScore>,
}

impl NBestResult {
    /// requested number of paths
    pub fn n(&self) -> usize {
        self.n
    }
    /// number of valid paths found (`<= n`)
    pub fn n_found(&self) -> usize {
        self.ending.len()
    }
    /// score of the rank-th best path
    pub fn score(&self, rank: usize) -> Option<Prob> {
        self.ending.get(rank).map(|e| e.score)
    }
    /// scores of found paths, descending
    pub fn scores(&self) -> Vec<Prob> {
        self.ending.iter().map(|e| e.score).collect()
    }
    pub fn cell(&self, pos: usize, state: StateIndex) -> &[NthScore] {
        &self.cells[pos * self.n_states + state]
    }
    ///
    /// Trace back the rank-th best path.
    ///
    /// `Ok(None)` if fewer than `rank + 1` valid paths exist.
    ///
    pub fn path(&self, rank: usize) -> Result<Option<TracebackPath>, DecodeError> {
        if rank >= self.n {
            return Err(DecodeError::RankOutOfRange {
                rank,
                n_kept: self.n,
            });
        }
        let e = match self.ending.get(rank) {
            Some(e) => e,
            None => {
                warn!("nbest: no valid path of rank {}", rank);
                return Ok(None);
            }
        };
        let mut states = Vec::with_capacity(self.len);
        let (mut k, mut r) = (e.state, e.rank);
        for i in (0..self.len).rev() {
            states.push(k);
            let entry = self.cell(i, k)[r];
            k = entry.state;
            r = entry.rank;
        }
        Ok(Some(TracebackPath::from_tail_first(states, e.score)))
    }
    /// all found paths, best first
    pub fn paths(&self) -> Vec<TracebackPath> {
        (0..self.n_found())
            .filter_map(|rank| self.path(rank).ok().flatten())
            .collect()
    }
}

impl<'a, P: ScoreProvider> Trellis<'a, P> {
    ///
    /// Run n-best Viterbi keeping `n` paths.
    ///
    pub fn nbest(&mut self, n: usize) -> Result<NBestResult, DecodeError> {
        self.begin(Algorithm::NBest)?;
        let graph = self.graph;
        let seq = self.seq;
        let len = seq.len();
        let n_states = graph.n_states();
        let mut cells: Vec<Vec<NthScore>> = vec![Vec::new(); len * n_states];

        let mut active = StateSet::new(n_states);
        if n > 0 {
            for k in graph.initial_to().iter() {
                let v = graph.initial_score(seq, k);
                if !v.is_zero() {
                    cells[k].push(NthScore {
                        state: NONE,
                        rank: 0,
                        score: v,
                    });
                    active.insert(k);
                }
            }
        }

        for i in 1..len {
            self.check(i)?;
            let candidates = graph.frontier(&active);
            let mut next = StateSet::new(n_states);
            let (done, rest) = cells.split_at_mut(i * n_states);
            let prev = &done[(i - 1) * n_states..];
            for k in candidates.iter() {
                let e = graph.emission(seq, k, i);
                let mut entries = Vec::new();
                for l in graph.from(k).intersection(&active) {
                    let t = graph.provider().transition(l, k, seq, i);
                    for (r, entry) in prev[l].iter().enumerate() {
                        let v = (entry.score * t) * e;
                        if !v.is_zero() {
                            entries.push(NthScore {
                                state: l,
                                rank: r,
                                score: v,
                            });
                        }
                    }
                }
                keep_best(&mut entries, n);
                if !entries.is_empty() {
                    rest[k] = entries;
                    next.insert(k);
                }
            }
            debug!("nbest: i={} n_active={}", i, next.count());
            active = next;
        }

        let mut ending = Vec::new();
        let last = &cells[(len - 1) * n_states..];
        for k in graph.ending_from().intersection(&active) {
            let end = graph.end_transition(k);
            for (r, entry) in last[k].iter().enumerate() {
                let v = entry.score * end;
                if !v.is_zero() {
                    ending.push(NthScore {
                        state: k,
                        rank: r,
                        score: v,
                    });
                }
            }
        }
        keep_best(&mut ending, n);
        if ending.is_empty() {
            warn!("nbest: no valid path for the sequence");
        } else {
            info!("nbest: found {} paths, best={}", ending.len(), ending[0].score);
        }

        Ok(NBestResult {
            n,
            len,
            n_states,
            cells,
            ending,
        })
    }
}
