//!
//! Emission and transition scoring
//!
//! The trellis never looks at symbols. It asks a `ScoreProvider` for
//! the log-probabilities of emissions and transitions at each position.
//!
use crate::common::StateIndex;
use crate::error::ModelError;
use crate::prob::Prob;
use crate::seq::{Observations, Sequence};
use fnv::FnvHashMap;

///
/// Capability to score a state path against a sequence.
///
/// * `emission(state, seq, pos)`
///     `P(x[pos] | state)`
///
/// * `initial_transition(state, seq)`
///     `P(state at pos 0 | INIT)`
///
/// * `transition(from, to, seq, pos)`
///     `P(to at pos | from at pos-1)`. It can depend on the sequence.
///
/// Only pairs wired in the `StateGraph` are queried.
///
pub trait ScoreProvider {
    type Seq: Observations + ?Sized;
    fn emission(&self, state: StateIndex, seq: &Self::Seq, pos: usize) -> Prob;
    fn initial_transition(&self, state: StateIndex, seq: &Self::Seq) -> Prob;
    fn transition(&self, from: StateIndex, to: StateIndex, seq: &Self::Seq, pos: usize) -> Prob;
}

///
/// Transition probability of an edge
///
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// constant
    Standard(Prob),
    /// depends on the symbol at the destination `pos`, indexed by alphabet order
    Lexical(Vec<Prob>),
}

///
/// `ScoreProvider` backed by probability tables over a byte alphabet.
///
#[derive(Debug, Clone, PartialEq)]
pub struct TableScorer {
    alphabet: Vec<u8>,
    symbol_index: FnvHashMap<u8, usize>,
    /// `emissions[state][symbol index]`
    emissions: Vec<Vec<Prob>>,
    initials: Vec<Prob>,
    /// `transitions[from][to]`
    transitions: Vec<FnvHashMap<StateIndex, Transition>>,
}

impl TableScorer {
    ///
    /// Create a scorer with `emissions.len()` states.
    ///
    /// Transitions are added by `set_transition`.
    ///
    pub fn new(alphabet: &[u8], emissions: Vec<Vec<Prob>>, initials: Vec<Prob>) -> Self {
        let n_states = emissions.len();
        TableScorer {
            alphabet: alphabet.to_vec(),
            symbol_index: alphabet.iter().enumerate().map(|(i, &c)| (c, i)).collect(),
            emissions,
            initials,
            transitions: vec![FnvHashMap::default(); n_states],
        }
    }
    pub fn set_transition(&mut self, from: StateIndex, to: StateIndex, transition: Transition) {
        self.transitions[from].insert(to, transition);
    }
    pub fn alphabet(&self) -> &[u8] {
        &self.alphabet
    }
    pub fn n_states(&self) -> usize {
        self.emissions.len()
    }
    fn symbol_at(&self, seq: &Sequence, pos: usize) -> Option<usize> {
        self.symbol_index.get(&seq.symbol(pos)).copied()
    }
    ///
    /// Check that every symbol of the sequence is in the alphabet.
    ///
    pub fn check_sequence(&self, seq: &Sequence) -> Result<(), ModelError> {
        match seq
            .symbols()
            .iter()
            .find(|&&c| !self.symbol_index.contains_key(&c))
        {
            Some(&c) => Err(ModelError::UnknownSymbol(c as char)),
            None => Ok(()),
        }
    }
}

impl ScoreProvider for TableScorer {
    type Seq = Sequence;
    fn emission(&self, state: StateIndex, seq: &Sequence, pos: usize) -> Prob {
        match self.symbol_at(seq, pos) {
            Some(i) => self.emissions[state][i],
            None => Prob::zero(),
        }
    }
    fn initial_transition(&self, state: StateIndex, _seq: &Sequence) -> Prob {
        self.initials[state]
    }
    fn transition(&self, from: StateIndex, to: StateIndex, seq: &Sequence, pos: usize) -> Prob {
        match self.transitions[from].get(&to) {
            Some(Transition::Standard(p)) => *p,
            Some(Transition::Lexical(table)) => match self.symbol_at(seq, pos) {
                Some(i) => table[i],
                None => Prob::zero(),
            },
            None => Prob::zero(),
        }
    }
}
