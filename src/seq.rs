//!
//! Observation sequences
//!
//! The trellis only needs the length of a sequence and the optional
//! externally defined weights; everything symbol-related is consumed by the
//! `ScoreProvider`.
//!
use crate::common::{symbols_to_string, StateIndex, Symbols};
use crate::prob::Prob;
use fnv::FnvHashMap;

///
/// What the trellis consumes from an observation sequence.
///
/// * `len(&self) -> usize`
///     The number of positions.
///
/// * `is_externally_defined(&self, pos) -> bool`
///     Whether an external weight vector exists at `pos`.
///
/// * `external_weight(&self, pos, state) -> Prob`
///     Multiplicative weight (additive in log space) applied to the emission
///     of `state` at `pos`. Only consulted when `is_externally_defined(pos)`.
///
pub trait Observations {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn is_externally_defined(&self, _pos: usize) -> bool {
        false
    }
    fn external_weight(&self, _pos: usize, _state: StateIndex) -> Prob {
        Prob::one()
    }
}

///
/// A named sequence of symbols with optional external weights.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    pub name: String,
    symbols: Symbols,
    /// pos -> weight of each state
    external: FnvHashMap<usize, Vec<Prob>>,
}

impl Sequence {
    pub fn new(name: &str, symbols: &[u8]) -> Self {
        Sequence {
            name: name.to_string(),
            symbols: symbols.to_vec(),
            external: FnvHashMap::default(),
        }
    }
    /// Sequence with empty name
    pub fn from_symbols(symbols: &[u8]) -> Self {
        Sequence::new("", symbols)
    }
    ///
    /// Attach external weights of all states at `pos`.
    /// States beyond `weights.len()` get weight 0 (log -inf), i.e. the
    /// position is restricted to the listed states.
    ///
    pub fn with_external(mut self, pos: usize, weights: Vec<Prob>) -> Self {
        self.external.insert(pos, weights);
        self
    }
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }
    pub fn symbol(&self, pos: usize) -> u8 {
        self.symbols[pos]
    }
}

impl Observations for Sequence {
    fn len(&self) -> usize {
        self.symbols.len()
    }
    fn is_externally_defined(&self, pos: usize) -> bool {
        self.external.contains_key(&pos)
    }
    fn external_weight(&self, pos: usize, state: StateIndex) -> Prob {
        match self.external.get(&pos) {
            Some(weights) => weights.get(state).copied().unwrap_or_else(Prob::zero),
            None => Prob::one(),
        }
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, ">{}\n{}", self.name, symbols_to_string(&self.symbols))
    }
}
