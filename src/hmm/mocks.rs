//!
//! Mock models for testing
//!
use super::model::ModelConfig;
use super::scorer::{TableScorer, Transition};
use crate::graph::builder::GraphBuilder;
use crate::graph::StateGraph;
use crate::prob::p;

///
/// Occasionally dishonest casino
///
/// ```text
/// fair   (F): 1..6 uniform
/// loaded (L): 6 with 0.5, others 0.1
///
/// F -> F 0.95, F -> L 0.05
/// L -> L 0.90, L -> F 0.10
/// ```
///
/// Starts in either state with 0.5, and ends anywhere.
///
pub fn mock_casino() -> StateGraph<TableScorer> {
    casino(0.95, 0.90)
}

///
/// Casino with the same self-loop probability 0.9 in both states
///
pub fn mock_casino_symmetric() -> StateGraph<TableScorer> {
    casino(0.9, 0.9)
}

fn casino(p_ff: f64, p_ll: f64) -> StateGraph<TableScorer> {
    let fair = vec![p(1.0 / 6.0); 6];
    let loaded = vec![p(0.1), p(0.1), p(0.1), p(0.1), p(0.1), p(0.5)];
    let mut scorer = TableScorer::new(b"123456", vec![fair, loaded], vec![p(0.5), p(0.5)]);
    scorer.set_transition(0, 0, Transition::Standard(p(p_ff)));
    scorer.set_transition(0, 1, Transition::Standard(p(1.0 - p_ff)));
    scorer.set_transition(1, 1, Transition::Standard(p(p_ll)));
    scorer.set_transition(1, 0, Transition::Standard(p(1.0 - p_ll)));
    GraphBuilder::new()
        .state("fair", "F", "", p(1.0))
        .state("loaded", "L", "loaded", p(1.0))
        .initial("fair")
        .initial("loaded")
        .transition("fair", "fair")
        .transition("fair", "loaded")
        .transition("loaded", "loaded")
        .transition("loaded", "fair")
        .finalize(scorer)
        .unwrap()
}

///
/// Exactly one path explains `A^n` (n >= 3): `a b .. b c`
///
/// ```text
/// INIT -> a -> b -> c -> END
///             (b -> b)
/// ```
///
pub fn mock_single_path() -> StateGraph<TableScorer> {
    let one = vec![p(1.0)];
    let mut scorer = TableScorer::new(b"A", vec![one.clone(), one.clone(), one], vec![p(1.0), p(0.0), p(0.0)]);
    scorer.set_transition(0, 1, Transition::Standard(p(1.0)));
    scorer.set_transition(1, 1, Transition::Standard(p(0.5)));
    scorer.set_transition(1, 2, Transition::Standard(p(0.5)));
    GraphBuilder::new()
        .state("a", "a", "", p(0.0))
        .state("b", "b", "", p(0.0))
        .state("c", "c", "", p(1.0))
        .initial("a")
        .transition("a", "b")
        .transition("b", "b")
        .transition("b", "c")
        .finalize(scorer)
        .unwrap()
}

///
/// Exactly two paths of equal probability: `a b b ..` and `a c c ..`
///
/// ```text
///           +-> b (b -> b) -+
/// INIT -> a                 +-> END
///           +-> c (c -> c) -+
/// ```
///
pub fn mock_two_paths() -> StateGraph<TableScorer> {
    let one = vec![p(1.0)];
    let mut scorer = TableScorer::new(b"A", vec![one.clone(), one.clone(), one], vec![p(1.0), p(0.0), p(0.0)]);
    scorer.set_transition(0, 1, Transition::Standard(p(0.5)));
    scorer.set_transition(0, 2, Transition::Standard(p(0.5)));
    scorer.set_transition(1, 1, Transition::Standard(p(1.0)));
    scorer.set_transition(2, 2, Transition::Standard(p(1.0)));
    GraphBuilder::new()
        .state("a", "a", "", p(0.0))
        .state("b", "b", "gene", p(1.0))
        .state("c", "c", "", p(1.0))
        .initial("a")
        .transition("a", "b")
        .transition("a", "c")
        .transition("b", "b")
        .transition("c", "c")
        .finalize(scorer)
        .unwrap()
}

///
/// Every position has a finite score but no state can end the sequence
///
/// ```text
/// INIT -> a -> b (b -> b)
/// ```
///
pub fn mock_dead_end() -> StateGraph<TableScorer> {
    let one = vec![p(1.0)];
    let mut scorer = TableScorer::new(b"A", vec![one.clone(), one], vec![p(1.0), p(0.0)]);
    scorer.set_transition(0, 1, Transition::Standard(p(1.0)));
    scorer.set_transition(1, 1, Transition::Standard(p(1.0)));
    GraphBuilder::new()
        .state("a", "a", "", p(0.0))
        .state("b", "b", "", p(0.0))
        .initial("a")
        .transition("a", "b")
        .transition("b", "b")
        .finalize(scorer)
        .unwrap()
}

///
/// Casino as a JSON model description
///
pub fn mock_casino_json() -> String {
    r#"{
  "name": "casino",
  "alphabet": "123456",
  "states": [
    {
      "name": "fair", "label": "F", "initial": 0.5,
      "emission": [0.16666666666666666, 0.16666666666666666, 0.16666666666666666,
                   0.16666666666666666, 0.16666666666666666, 0.16666666666666666],
      "transitions": [{"to": "fair", "prob": 0.95}, {"to": "loaded", "prob": 0.05}]
    },
    {
      "name": "loaded", "label": "L", "gff": "loaded", "initial": 0.5,
      "emission": [0.1, 0.1, 0.1, 0.1, 0.1, 0.5],
      "transitions": [{"to": "loaded", "prob": 0.9}, {"to": "fair", "prob": 0.1}]
    }
  ]
}"#
    .to_string()
}

///
/// Casino built from `mock_casino_json`
///
pub fn mock_casino_from_json() -> StateGraph<TableScorer> {
    ModelConfig::from_json_str(&mock_casino_json())
        .unwrap()
        .build()
        .unwrap()
}
