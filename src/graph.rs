//!
//! `StateGraph`: finalized topology of hidden states
//!
//! ```text
//!  INIT --> s0 --> s1 --> END
//!            \      ^
//!             +-> s2
//! ```
//!
//! Each state knows its successors (`to`) and predecessors (`from`) as
//! bitsets, and the probability of ending the sequence in it. Transition and
//! emission scores are delegated to a `ScoreProvider`.
//!
//! The graph is immutable once built by `builder::GraphBuilder::finalize`,
//! so one graph can be shared by any number of trellises.
//!
pub mod active_states;
pub mod builder;

use crate::common::StateIndex;
use crate::hmm::scorer::ScoreProvider;
use crate::prob::Prob;
use crate::seq::Observations;
pub use active_states::StateSet;
use derive_new::new;
use petgraph::dot::{Config, Dot};
use petgraph::graph::DiGraph;

///
/// Static attributes of a state.
///
#[derive(Debug, Clone, PartialEq, new)]
pub struct StateInfo {
    /// unique name
    pub name: String,
    /// label used in label strings, often a single character
    pub label: String,
    /// feature name used in GFF output. empty string means "no feature"
    pub gff: String,
    /// probability of ending the sequence in this state
    pub end: Prob,
}

///
/// Finalized HMM topology with its score provider.
///
#[derive(Debug, Clone)]
pub struct StateGraph<P> {
    pub(crate) states: Vec<StateInfo>,
    pub(crate) to: Vec<StateSet>,
    pub(crate) from: Vec<StateSet>,
    pub(crate) initial_to: StateSet,
    pub(crate) ending_from: StateSet,
    pub(crate) provider: P,
}

impl<P> StateGraph<P> {
    pub fn n_states(&self) -> usize {
        self.states.len()
    }
    pub fn state(&self, state: StateIndex) -> &StateInfo {
        &self.states[state]
    }
    pub fn states(&self) -> &[StateInfo] {
        &self.states
    }
    /// index of the state with the name
    pub fn index_of(&self, name: &str) -> Option<StateIndex> {
        self.states.iter().position(|s| s.name == name)
    }
    /// probability of ending the sequence in the state
    pub fn end_transition(&self, state: StateIndex) -> Prob {
        self.states[state].end
    }
    /// successors of the state
    pub fn to(&self, state: StateIndex) -> &StateSet {
        &self.to[state]
    }
    /// predecessors of the state
    pub fn from(&self, state: StateIndex) -> &StateSet {
        &self.from[state]
    }
    /// states reachable from the initial pseudo-state
    pub fn initial_to(&self) -> &StateSet {
        &self.initial_to
    }
    /// states with a non-zero end transition
    pub fn ending_from(&self) -> &StateSet {
        &self.ending_from
    }
    pub fn provider(&self) -> &P {
        &self.provider
    }
    ///
    /// Union of the successors of every state in `active`.
    ///
    pub fn frontier(&self, active: &StateSet) -> StateSet {
        let mut next = StateSet::new(self.n_states());
        for s in active.iter() {
            next.union_with(&self.to[s]);
        }
        next
    }
    ///
    /// Union of the predecessors of every state in `active`.
    ///
    pub fn back_frontier(&self, active: &StateSet) -> StateSet {
        let mut prev = StateSet::new(self.n_states());
        for s in active.iter() {
            prev.union_with(&self.from[s]);
        }
        prev
    }
    ///
    /// Render the topology in graphviz dot format.
    ///
    /// `INIT` and `END` pseudo-states are drawn as extra nodes.
    ///
    pub fn to_dot(&self) -> String {
        let mut g: DiGraph<String, ()> = DiGraph::new();
        let nodes: Vec<_> = self
            .states
            .iter()
            .map(|s| g.add_node(s.name.clone()))
            .collect();
        let init = g.add_node("INIT".to_string());
        let end = g.add_node("END".to_string());
        for s in self.initial_to.iter() {
            g.add_edge(init, nodes[s], ());
        }
        for (s, to) in self.to.iter().enumerate() {
            for t in to.iter() {
                g.add_edge(nodes[s], nodes[t], ());
            }
        }
        for s in self.ending_from.iter() {
            g.add_edge(nodes[s], end, ());
        }
        format!("{:?}", Dot::with_config(&g, &[Config::EdgeNoLabel]))
    }
}

impl<P: ScoreProvider> StateGraph<P> {
    ///
    /// Emission score of `state` at `pos`, including the external weight of
    /// the sequence if it is defined at `pos`.
    ///
    pub fn emission(&self, seq: &P::Seq, state: StateIndex, pos: usize) -> Prob {
        let e = self.provider.emission(state, seq, pos);
        if seq.is_externally_defined(pos) {
            e * seq.external_weight(pos, state)
        } else {
            e
        }
    }
    /// `P(start in state) * P(emit x[0] | state)`
    pub fn initial_score(&self, seq: &P::Seq, state: StateIndex) -> Prob {
        self.provider.initial_transition(state, seq) * self.emission(seq, state, 0)
    }
    /// `P(from -> to at pos) * P(emit x[pos] | to)`
    pub fn step_score(&self, seq: &P::Seq, from: StateIndex, to: StateIndex, pos: usize) -> Prob {
        self.provider.transition(from, to, seq, pos) * self.emission(seq, to, pos)
    }
    ///
    /// Joint probability of the sequence and a complete state path,
    /// including the initial and end transitions.
    ///
    /// Returns `Prob::zero()` if the path uses an edge missing from the graph
    /// or if its length differs from the sequence.
    ///
    pub fn score_path(&self, seq: &P::Seq, path: &[StateIndex]) -> Prob {
        if path.is_empty() || path.len() != seq.len() {
            return Prob::zero();
        }
        if !self.initial_to.contains(path[0]) {
            return Prob::zero();
        }
        let mut score = self.initial_score(seq, path[0]);
        for pos in 1..path.len() {
            let (from, to) = (path[pos - 1], path[pos]);
            if !self.to[from].contains(to) {
                return Prob::zero();
            }
            score *= self.step_score(seq, from, to, pos);
        }
        score * self.end_transition(path[path.len() - 1])
    }
}
