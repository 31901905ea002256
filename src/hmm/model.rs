//!
//! JSON description of a table-driven HMM
//!
//! ```text
//! {
//!   "name": "casino",
//!   "alphabet": "123456",
//!   "states": [
//!     {
//!       "name": "fair", "label": "F", "gff": "", "initial": 0.5, "end": 1.0,
//!       "emission": [0.1667, 0.1667, 0.1667, 0.1667, 0.1667, 0.1667],
//!       "transitions": [{"to": "fair", "prob": 0.95}, {"to": "loaded", "prob": 0.05}]
//!     },
//!     ...
//!   ]
//! }
//! ```
//!
//! A transition with `"lexical": [..]` instead of `"prob"` depends on the
//! symbol emitted by the destination state.
//!
use super::scorer::{TableScorer, Transition};
use crate::common::StateIndex;
use crate::error::{LoadError, ModelError};
use crate::graph::builder::GraphBuilder;
use crate::graph::StateGraph;
use crate::prob::Prob;
use fnv::FnvHashMap;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// model name, used as the source column of GFF
    pub name: String,
    pub alphabet: String,
    pub states: Vec<StateConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateConfig {
    pub name: String,
    /// defaults to the name
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub gff: String,
    /// probability of starting in this state
    #[serde(default)]
    pub initial: f64,
    /// probability of ending in this state
    #[serde(default = "default_end")]
    pub end: f64,
    /// one probability per alphabet symbol
    pub emission: Vec<f64>,
    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
}

fn default_end() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransitionConfig {
    Standard { to: String, prob: f64 },
    Lexical { to: String, lexical: Vec<f64> },
}

impl TransitionConfig {
    pub fn to(&self) -> &str {
        match self {
            TransitionConfig::Standard { to, .. } => to,
            TransitionConfig::Lexical { to, .. } => to,
        }
    }
}

fn check_prob(state: &str, value: f64) -> Result<Prob, ModelError> {
    if (0.0..=1.0).contains(&value) {
        Ok(Prob::from_prob(value))
    } else {
        Err(ModelError::InvalidProbability {
            state: state.to_string(),
            value,
        })
    }
}

fn check_table(state: &str, values: &[f64], width: usize, what: &str) -> Result<Vec<Prob>, ModelError> {
    if values.len() != width {
        return Err(ModelError::MalformedDistribution {
            state: state.to_string(),
            message: format!(
                "{} has {} entries but the alphabet has {} symbols",
                what,
                values.len(),
                width
            ),
        });
    }
    values.iter().map(|&v| check_prob(state, v)).collect()
}

impl ModelConfig {
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
    pub fn to_json(&self) -> String {
        // a struct of strings and floats always serializes
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
    ///
    /// Validate the description and build the finalized graph.
    ///
    pub fn build(&self) -> Result<StateGraph<TableScorer>, ModelError> {
        let alphabet = self.alphabet.as_bytes();
        let width = alphabet.len();

        let mut emissions = Vec::with_capacity(self.states.len());
        let mut initials = Vec::with_capacity(self.states.len());
        let mut builder = GraphBuilder::new();
        for s in self.states.iter() {
            let emission = check_table(&s.name, &s.emission, width, "emission")?;
            let total: f64 = s.emission.iter().sum();
            if (total - 1.0).abs() > 1e-6 {
                warn!("emission of state `{}` sums to {}", s.name, total);
            }
            emissions.push(emission);

            let initial = check_prob(&s.name, s.initial)?;
            initials.push(initial);
            let end = check_prob(&s.name, s.end)?;
            let label = if s.label.is_empty() { &s.name } else { &s.label };
            builder = builder.state(&s.name, label, &s.gff, end);
            if !initial.is_zero() {
                builder = builder.initial(&s.name);
            }
        }

        // first occurrence wins; duplicates are rejected by finalize
        let mut index: FnvHashMap<&str, StateIndex> = FnvHashMap::default();
        for (i, s) in self.states.iter().enumerate() {
            index.entry(s.name.as_str()).or_insert(i);
        }

        let mut scorer = TableScorer::new(alphabet, emissions, initials);
        for (i, s) in self.states.iter().enumerate() {
            for t in s.transitions.iter() {
                let transition = match t {
                    TransitionConfig::Standard { prob, .. } => {
                        Transition::Standard(check_prob(&s.name, *prob)?)
                    }
                    TransitionConfig::Lexical { lexical, .. } => {
                        Transition::Lexical(check_table(&s.name, lexical, width, "lexical transition")?)
                    }
                };
                if let Some(&j) = index.get(t.to()) {
                    scorer.set_transition(i, j, transition);
                }
                builder = builder.transition(&s.name, t.to());
            }
        }

        builder.finalize(scorer)
    }
}
