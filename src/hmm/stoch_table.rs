//!
//! Weighted edge ledger for stochastic traceback
//!
//! While a sweep fills position `i`, every edge `l -> k` with a non-zero
//! weight `v[i-1][l] t(l, k, i) e_k(x[i])` is recorded in the bucket of
//! `(i, k)`. Edges into the end of the sequence go to a separate ending
//! bucket. `finalize` turns each bucket into a discrete distribution over its
//! sources, so a traceback only needs one draw per position.
//!
use crate::common::StateIndex;
use crate::error::DecodeError;
use crate::prob::Prob;
use log::debug;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

///
/// Edge into a bucket
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochEdge {
    pub source: StateIndex,
    /// total weight `v[i-1][source] * step`
    pub weight: Prob,
    /// `t(source, k, i) e_k(x[i])`, or the end transition in the ending bucket
    pub step: Prob,
}

#[derive(Debug, Clone)]
struct Bucket {
    state: StateIndex,
    edges: Vec<StochEdge>,
    sampler: Option<WeightedIndex<f64>>,
}

impl Bucket {
    fn new(state: StateIndex) -> Self {
        Bucket {
            state,
            edges: Vec::new(),
            sampler: None,
        }
    }
    fn mass(&self) -> Prob {
        self.edges.iter().map(|e| e.weight).sum()
    }
    fn finalize(&mut self) {
        let mass = self.mass();
        self.sampler = if mass.is_zero() {
            None
        } else {
            WeightedIndex::new(self.edges.iter().map(|e| (e.weight / mass).to_value())).ok()
        };
    }
    fn sample<R: Rng>(&self, rng: &mut R) -> Option<StochEdge> {
        self.sampler.as_ref().map(|w| self.edges[w.sample(rng)])
    }
}

///
/// Edges recorded for positions `1..n`, the initial scores at position 0,
/// and the ending bucket.
///
#[derive(Debug, Clone)]
pub struct StochTable {
    n_states: usize,
    /// `init(k) e_k(x[0])`
    initial: Vec<Prob>,
    /// buckets of each position, sorted by destination state
    rows: Vec<Vec<Bucket>>,
    ending: Bucket,
    finalized: bool,
}

impl StochTable {
    pub fn new(n_positions: usize, n_states: usize) -> Self {
        StochTable {
            n_states,
            initial: vec![Prob::zero(); n_states],
            rows: vec![Vec::new(); n_positions],
            ending: Bucket::new(StateIndex::MAX),
            finalized: false,
        }
    }
    pub fn n_positions(&self) -> usize {
        self.rows.len()
    }
    pub fn n_states(&self) -> usize {
        self.n_states
    }
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
    pub fn set_initial(&mut self, state: StateIndex, score: Prob) {
        self.initial[state] = score;
    }
    pub fn initial(&self, state: StateIndex) -> Prob {
        self.initial[state]
    }
    fn bucket_index(&self, pos: usize, state: StateIndex) -> Result<usize, usize> {
        self.rows[pos].binary_search_by_key(&state, |b| b.state)
    }
    ///
    /// Record an edge `source -> state` into position `pos` (`pos >= 1`).
    ///
    pub fn push(&mut self, pos: usize, state: StateIndex, edge: StochEdge) {
        self.finalized = false;
        let row = &mut self.rows[pos];
        // edges of one destination usually arrive together
        if let Some(last) = row.last_mut() {
            if last.state == state {
                last.edges.push(edge);
                return;
            }
        }
        let i = match row.binary_search_by_key(&state, |b| b.state) {
            Ok(i) => i,
            Err(i) => {
                row.insert(i, Bucket::new(state));
                i
            }
        };
        row[i].edges.push(edge);
    }
    /// Record an edge from `source` at the last position to the end.
    pub fn push_ending(&mut self, edge: StochEdge) {
        self.ending.edges.push(edge);
        self.finalized = false;
    }
    /// edges into `(pos, state)`
    pub fn edges(&self, pos: usize, state: StateIndex) -> &[StochEdge] {
        match self.bucket_index(pos, state) {
            Ok(i) => &self.rows[pos][i].edges,
            Err(_) => &[],
        }
    }
    pub fn ending_edges(&self) -> &[StochEdge] {
        &self.ending.edges
    }
    /// total weight into `(pos, state)`
    pub fn mass(&self, pos: usize, state: StateIndex) -> Prob {
        self.edges(pos, state).iter().map(|e| e.weight).sum()
    }
    /// total weight into the end
    pub fn ending_mass(&self) -> Prob {
        self.ending.mass()
    }
    /// number of recorded edges
    pub fn n_edges(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .map(|b| b.edges.len())
            .sum::<usize>()
            + self.ending.edges.len()
    }
    ///
    /// Build the distribution of every bucket.
    ///
    /// Buckets whose edges all have `p=0` get no distribution, and sampling
    /// from them fails.
    ///
    pub fn finalize(&mut self) {
        for row in self.rows.iter_mut() {
            for bucket in row.iter_mut() {
                bucket.finalize();
            }
        }
        self.ending.finalize();
        self.finalized = true;
        debug!("stoch_table: finalized n_edges={}", self.n_edges());
    }
    ///
    /// Draw the predecessor of `state` at `pos`, proportional to the edge
    /// weights.
    ///
    /// The table must be finalized.
    ///
    pub fn sample_source<R: Rng>(
        &self,
        pos: usize,
        state: StateIndex,
        rng: &mut R,
    ) -> Result<StochEdge, DecodeError> {
        let empty = DecodeError::EmptyBucket {
            position: pos,
            state: Some(state),
        };
        match self.bucket_index(pos, state) {
            Ok(i) => self.rows[pos][i].sample(rng).ok_or(empty),
            Err(_) => Err(empty),
        }
    }
    ///
    /// Draw the last state of a path.
    ///
    /// The table must be finalized.
    ///
    pub fn sample_ending<R: Rng>(&self, rng: &mut R) -> Result<StochEdge, DecodeError> {
        self.ending.sample(rng).ok_or(DecodeError::EmptyBucket {
            position: self.n_positions(),
            state: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prob::p;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn edge(source: StateIndex, weight: f64) -> StochEdge {
        StochEdge {
            source,
            weight: p(weight),
            step: p(1.0),
        }
    }

    #[test]
    fn stoch_table_buckets() {
        let mut t = StochTable::new(3, 4);
        t.push(1, 2, edge(0, 0.1));
        t.push(1, 2, edge(1, 0.3));
        t.push(1, 0, edge(3, 0.2));
        t.push(1, 2, edge(3, 0.1));
        t.push_ending(edge(2, 0.5));
        assert_eq!(t.edges(1, 2).len(), 3);
        assert_eq!(t.edges(1, 0).len(), 1);
        assert!(t.edges(1, 1).is_empty());
        assert_abs_diff_eq!(t.mass(1, 2), p(0.5), epsilon = 1e-12);
        assert!(t.mass(2, 0).is_zero());
        assert_eq!(t.n_edges(), 5);
        assert!(!t.is_finalized());
        t.finalize();
        assert!(t.is_finalized());

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let n = 10_000;
        let mut count = [0; 4];
        for _ in 0..n {
            count[t.sample_source(1, 2, &mut rng).unwrap().source] += 1;
        }
        // 0.2, 0.6, 0.2
        assert_abs_diff_eq!(count[0] as f64 / n as f64, 0.2, epsilon = 0.02);
        assert_abs_diff_eq!(count[1] as f64 / n as f64, 0.6, epsilon = 0.02);
        assert_abs_diff_eq!(count[3] as f64 / n as f64, 0.2, epsilon = 0.02);
        assert_eq!(t.sample_ending(&mut rng).unwrap().source, 2);
    }
    #[test]
    fn stoch_table_empty_bucket() {
        let mut t = StochTable::new(2, 2);
        t.push(1, 0, edge(1, 0.0));
        t.finalize();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert_eq!(
            t.sample_source(1, 0, &mut rng).unwrap_err(),
            DecodeError::EmptyBucket {
                position: 1,
                state: Some(0)
            }
        );
        assert_eq!(
            t.sample_source(1, 1, &mut rng).unwrap_err(),
            DecodeError::EmptyBucket {
                position: 1,
                state: Some(1)
            }
        );
        assert_eq!(
            t.sample_ending(&mut rng).unwrap_err(),
            DecodeError::EmptyBucket {
                position: 2,
                state: None
            }
        );
    }
}
