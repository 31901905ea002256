//!
//! Name-based construction of `StateGraph`
//!
//! States and transitions are declared by name in any order, then
//! `finalize` resolves the names into index bitsets once. Any
//! inconsistency is reported as a `ModelError` here, so a trellis is never
//! built on an invalid graph.
//!
use super::{StateGraph, StateInfo, StateSet};
use crate::common::{StateIndex, MAX_STATES};
use crate::error::ModelError;
use crate::prob::Prob;
use fnv::FnvHashMap;
use log::debug;

///
/// Builder of `StateGraph`.
///
/// ```text
/// let g = GraphBuilder::new()
///     .state("a", "A", "", p(1.0))
///     .state("b", "B", "gene", p(1.0))
///     .initial("a")
///     .transition("a", "b")
///     .finalize(provider)?;
/// ```
///
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    states: Vec<StateInfo>,
    transitions: Vec<(String, String)>,
    initials: Vec<String>,
    capacity: usize,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        GraphBuilder::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        GraphBuilder {
            states: Vec::new(),
            transitions: Vec::new(),
            initials: Vec::new(),
            capacity: MAX_STATES,
        }
    }
    /// Set the maximum number of states
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
    /// Declare a state
    pub fn state(mut self, name: &str, label: &str, gff: &str, end: Prob) -> Self {
        self.states.push(StateInfo::new(
            name.to_string(),
            label.to_string(),
            gff.to_string(),
            end,
        ));
        self
    }
    /// Declare an edge from the initial pseudo-state
    pub fn initial(mut self, to: &str) -> Self {
        self.initials.push(to.to_string());
        self
    }
    /// Declare an edge `from -> to`
    pub fn transition(mut self, from: &str, to: &str) -> Self {
        self.transitions.push((from.to_string(), to.to_string()));
        self
    }
    /// number of states declared so far
    pub fn n_states(&self) -> usize {
        self.states.len()
    }
    ///
    /// Resolve names and build the graph.
    ///
    /// The state index is the declaration order.
    ///
    pub fn finalize<P>(self, provider: P) -> Result<StateGraph<P>, ModelError> {
        let n = self.states.len();
        if n == 0 {
            return Err(ModelError::EmptyModel);
        }
        if n > self.capacity {
            return Err(ModelError::CapacityExceeded {
                n_states: n,
                capacity: self.capacity,
            });
        }

        let mut index: FnvHashMap<&str, StateIndex> = FnvHashMap::default();
        for (i, s) in self.states.iter().enumerate() {
            if index.insert(s.name.as_str(), i).is_some() {
                return Err(ModelError::DuplicateState(s.name.clone()));
            }
        }
        let resolve = |from: &str, to: &str| -> Result<(StateIndex, StateIndex), ModelError> {
            let dangling = |name: &str| ModelError::DanglingTransition {
                from: from.to_string(),
                to: name.to_string(),
            };
            let i = index.get(from).copied().ok_or_else(|| dangling(from))?;
            let j = index.get(to).copied().ok_or_else(|| dangling(to))?;
            Ok((i, j))
        };

        let mut to = vec![StateSet::new(n); n];
        let mut from = vec![StateSet::new(n); n];
        for (a, b) in self.transitions.iter() {
            let (i, j) = resolve(a, b)?;
            to[i].insert(j);
            from[j].insert(i);
        }

        let mut initial_to = StateSet::new(n);
        for name in self.initials.iter() {
            let j = index
                .get(name.as_str())
                .copied()
                .ok_or_else(|| ModelError::DanglingTransition {
                    from: "INIT".to_string(),
                    to: name.clone(),
                })?;
            initial_to.insert(j);
        }

        let mut ending_from = StateSet::new(n);
        for (i, s) in self.states.iter().enumerate() {
            if !s.end.is_zero() {
                ending_from.insert(i);
            }
        }

        debug!(
            "finalized graph n_states={} n_transitions={} n_initial={} n_ending={}",
            n,
            self.transitions.len(),
            initial_to.count(),
            ending_from.count(),
        );

        Ok(StateGraph {
            states: self.states,
            to,
            from,
            initial_to,
            ending_from,
            provider,
        })
    }
}
