//!
//! Error types
//!
//! * `ModelError` is raised while a model is finalized, before any decoding.
//! * `DecodeError` is raised by a trellis run.
//!
//! "No valid path" is not an error: it is reported through `Option::None`
//! of the traceback accessors and `Prob::is_zero()` of the totals.
//!
use thiserror::Error;

/// Errors detected when a model is wired into a `StateGraph`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A transition names a state that was never defined
    #[error("state `{from}` has a transition to undefined state `{to}`")]
    DanglingTransition { from: String, to: String },

    /// Two states share a name
    #[error("state `{0}` is defined more than once")]
    DuplicateState(String),

    /// No state was defined
    #[error("model has no states")]
    EmptyModel,

    /// More states than the state sets were configured for
    #[error("model has {n_states} states but the capacity is {capacity}")]
    CapacityExceeded { n_states: usize, capacity: usize },

    /// A probability table has a wrong shape or does not describe a distribution
    #[error("malformed distribution in state `{state}`: {message}")]
    MalformedDistribution { state: String, message: String },

    /// A probability outside of `[0, 1]` (or NaN)
    #[error("invalid probability {value} in state `{state}`")]
    InvalidProbability { state: String, value: f64 },

    /// A symbol that is not in the alphabet
    #[error("symbol `{0}` is not in the alphabet")]
    UnknownSymbol(char),
}

/// Errors of a decoding run on a `Trellis`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Length-0 sequences are rejected by every algorithm
    #[error("sequence is empty")]
    EmptySequence,

    /// The trellis already holds buffers of a previous run
    #[error("trellis was already used for {0}; call reset() before running again")]
    AlreadyUsed(&'static str),

    /// The run was cancelled or hit its deadline
    #[error("decoding was cancelled at position {position}")]
    Cancelled { position: usize },

    /// A sampling loop was cancelled or hit its deadline after `draws` draws
    #[error("sampling was cancelled after {draws} draws")]
    SamplingCancelled { draws: usize },

    /// A stochastic draw from a bucket without any possible edge
    #[error("no possible edge to sample into state {state:?} at position {position}")]
    EmptyBucket {
        position: usize,
        state: Option<usize>,
    },

    /// Forward and backward totals disagree
    #[error("forward ({forward}) and backward ({backward}) totals differ")]
    Inconsistent { forward: f64, backward: f64 },

    /// n-best traceback for a rank that was not kept
    #[error("rank {rank} is out of range (kept {n_kept} paths)")]
    RankOutOfRange { rank: usize, n_kept: usize },
}

/// Errors while reading a model or parameter file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Any error surfaced by the command line tool.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
