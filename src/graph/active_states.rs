//!
//! Set of states represented as a bitset
//!
//! Used both for the static adjacency of a `StateGraph` (`to`/`from` sets)
//! and for the frontier of states alive at a position during a sweep.
//!
use crate::common::StateIndex;
use fixedbitset::FixedBitSet;

///
/// Bitset of `n_states` bits.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSet(FixedBitSet);

impl StateSet {
    /// Empty set over `n_states` states
    pub fn new(n_states: usize) -> Self {
        StateSet(FixedBitSet::with_capacity(n_states))
    }
    /// Set containing all `n_states` states
    pub fn full(n_states: usize) -> Self {
        let mut b = FixedBitSet::with_capacity(n_states);
        b.insert_range(..);
        StateSet(b)
    }
    /// Set containing only the given states
    pub fn from_states(n_states: usize, states: &[StateIndex]) -> Self {
        let mut s = StateSet::new(n_states);
        for &state in states {
            s.insert(state);
        }
        s
    }
    /// number of bits (= number of states in the model)
    pub fn capacity(&self) -> usize {
        self.0.len()
    }
    pub fn insert(&mut self, state: StateIndex) {
        self.0.insert(state);
    }
    pub fn contains(&self, state: StateIndex) -> bool {
        self.0.contains(state)
    }
    pub fn clear(&mut self) {
        self.0.clear();
    }
    pub fn is_empty(&self) -> bool {
        self.0.count_ones(..) == 0
    }
    /// number of states in the set
    pub fn count(&self) -> usize {
        self.0.count_ones(..)
    }
    /// `self = self | other`
    pub fn union_with(&mut self, other: &StateSet) {
        self.0.union_with(&other.0);
    }
    ///
    /// Iterate over states in `self & other`, in ascending order.
    ///
    pub fn intersection<'a>(&'a self, other: &'a StateSet) -> impl Iterator<Item = StateIndex> + 'a {
        self.0.intersection(&other.0)
    }
    /// Iterate over states in ascending order
    pub fn iter(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.0.ones()
    }
    pub fn to_vec(&self) -> Vec<StateIndex> {
        self.iter().collect()
    }
}

impl std::fmt::Display for StateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, s) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, "}}")
    }
}
