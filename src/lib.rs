//!
//! Decoding of observation sequences on HMM trellises
//!
//! * `prob`: log-space probability
//! * `graph`: state topology with bitset reachability
//! * `hmm`: Viterbi, n-best, forward/backward, posterior and stochastic traceback
//!
#[macro_use]
extern crate approx;

pub mod cli;
pub mod common;
pub mod error;
pub mod graph;
pub mod hmm;
pub mod prob;
pub mod seq;
