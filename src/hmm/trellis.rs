//!
//! `Trellis`: a (model, sequence) pair ready to be decoded
//!
//! ## Lifecycle
//!
//! ```text
//! Trellis::new ──> Bound ──(viterbi/nbest/forward/backward/posterior/stochastic)──> Done(alg)
//!                    ^                                                                 │
//!                    └──────────────────────────── reset() ────────────────────────────┘
//! ```
//!
//! Every run returns its own result value. A trellis in `Done` refuses to
//! run again until `reset()`, so no run ever sees the buffers of another.
//!
use super::backward::BackwardResult;
use super::forward::ForwardResult;
use super::nbest::NBestResult;
use super::params::TrellisParams;
use super::posterior::PosteriorResult;
use super::sample::StochasticResult;
use super::scorer::ScoreProvider;
use super::table::ScoreBuffers;
use super::viterbi::ViterbiResult;
use crate::error::DecodeError;
use crate::graph::StateGraph;
use crate::seq::Observations;
use log::debug;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

///
/// Which score a stochastic sweep propagates
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepKind {
    /// sum over predecessors; samples follow the posterior of paths
    Forward,
    /// max over predecessors
    Viterbi,
}

///
/// Decoding algorithms
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Viterbi,
    NBest,
    Forward,
    Backward,
    Posterior,
    Stochastic(SweepKind),
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Viterbi => "viterbi",
            Algorithm::NBest => "nbest",
            Algorithm::Forward => "forward",
            Algorithm::Backward => "backward",
            Algorithm::Posterior => "posterior",
            Algorithm::Stochastic(SweepKind::Forward) => "stoch-forward",
            Algorithm::Stochastic(SweepKind::Viterbi) => "stoch-viterbi",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viterbi" => Ok(Algorithm::Viterbi),
            "nbest" => Ok(Algorithm::NBest),
            "forward" => Ok(Algorithm::Forward),
            "backward" => Ok(Algorithm::Backward),
            "posterior" => Ok(Algorithm::Posterior),
            "stoch-forward" => Ok(Algorithm::Stochastic(SweepKind::Forward)),
            "stoch-viterbi" => Ok(Algorithm::Stochastic(SweepKind::Viterbi)),
            _ => Err(format!("unknown algorithm `{}`", s)),
        }
    }
}

///
/// Result of a run, tagged by the algorithm
///
#[derive(Debug, Clone)]
pub enum Decoding {
    Viterbi(ViterbiResult),
    NBest(NBestResult),
    Forward(ForwardResult),
    Backward(BackwardResult),
    Posterior(PosteriorResult),
    Stochastic(StochasticResult),
}

impl Decoding {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Decoding::Viterbi(_) => Algorithm::Viterbi,
            Decoding::NBest(_) => Algorithm::NBest,
            Decoding::Forward(_) => Algorithm::Forward,
            Decoding::Backward(_) => Algorithm::Backward,
            Decoding::Posterior(_) => Algorithm::Posterior,
            Decoding::Stochastic(r) => Algorithm::Stochastic(r.kind()),
        }
    }
}

///
/// Shared cancellation flag
///
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Draws of a sampling loop between two interrupt checks
pub const DRAWS_PER_CHECK: usize = 256;

///
/// Conditions to stop a run between two positions, or a sampling loop
/// between two draws
///
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    token: Option<CancelToken>,
    deadline: Option<Instant>,
}

impl Interrupt {
    pub fn new() -> Self {
        Interrupt::default()
    }
    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }
    pub fn is_interrupted(&self) -> bool {
        let cancelled = self.token.as_ref().map_or(false, |t| t.is_cancelled());
        let expired = self.deadline.map_or(false, |d| Instant::now() >= d);
        cancelled || expired
    }
    pub fn check(&self, position: usize) -> Result<(), DecodeError> {
        if self.is_interrupted() {
            Err(DecodeError::Cancelled { position })
        } else {
            Ok(())
        }
    }
    /// check before the `draws`-th draw, once every `DRAWS_PER_CHECK` draws
    pub fn check_draws(&self, draws: usize) -> Result<(), DecodeError> {
        if draws % DRAWS_PER_CHECK == 0 && self.is_interrupted() {
            Err(DecodeError::SamplingCancelled { draws })
        } else {
            Ok(())
        }
    }
}

///
/// Progress of a trellis
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// ready to run
    Bound,
    /// an algorithm was run (or started and failed)
    Done(Algorithm),
}

///
/// A model and a sequence bound together, owning the score buffers.
///
pub struct Trellis<'a, P: ScoreProvider> {
    pub(crate) graph: &'a StateGraph<P>,
    pub(crate) seq: &'a P::Seq,
    pub(crate) params: TrellisParams,
    pub(crate) buffers: ScoreBuffers,
    interrupt: Interrupt,
    /// deadline of the current run from `params.timeout_ms`
    run_interrupt: Interrupt,
    stage: Stage,
}

impl<'a, P: ScoreProvider> Trellis<'a, P> {
    pub fn new(graph: &'a StateGraph<P>, seq: &'a P::Seq) -> Self {
        Trellis {
            graph,
            seq,
            params: TrellisParams::default(),
            buffers: ScoreBuffers::new(graph.n_states()),
            interrupt: Interrupt::default(),
            run_interrupt: Interrupt::default(),
            stage: Stage::Bound,
        }
    }
    pub fn with_params(mut self, params: TrellisParams) -> Self {
        self.params = params;
        self
    }
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }
    pub fn graph(&self) -> &'a StateGraph<P> {
        self.graph
    }
    pub fn seq(&self) -> &'a P::Seq {
        self.seq
    }
    pub fn params(&self) -> &TrellisParams {
        &self.params
    }
    pub fn stage(&self) -> Stage {
        self.stage
    }
    /// length of the sequence
    pub fn len(&self) -> usize {
        self.seq.len()
    }
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
    ///
    /// Clear the buffers and get back to `Bound`.
    ///
    pub fn reset(&mut self) {
        self.buffers.clear();
        self.stage = Stage::Bound;
    }
    ///
    /// Enter `Done(algorithm)` if the trellis can run.
    ///
    pub(crate) fn begin(&mut self, algorithm: Algorithm) -> Result<(), DecodeError> {
        if let Stage::Done(prev) = self.stage {
            return Err(DecodeError::AlreadyUsed(prev.name()));
        }
        if self.seq.is_empty() {
            return Err(DecodeError::EmptySequence);
        }
        self.stage = Stage::Done(algorithm);
        self.run_interrupt = match self.params.timeout_ms {
            Some(ms) => Interrupt::new().with_timeout(Duration::from_millis(ms)),
            None => Interrupt::new(),
        };
        debug!(
            "start {} n_positions={} n_states={}",
            algorithm,
            self.seq.len(),
            self.graph.n_states()
        );
        Ok(())
    }
    /// check the interrupt conditions before computing `position`
    pub(crate) fn check(&self, position: usize) -> Result<(), DecodeError> {
        self.interrupt.check(position)?;
        self.run_interrupt.check(position)
    }
    ///
    /// Run the algorithm and wrap the result.
    ///
    /// `Algorithm::NBest` keeps `params.n_best` paths.
    ///
    pub fn decode(&mut self, algorithm: Algorithm) -> Result<Decoding, DecodeError> {
        match algorithm {
            Algorithm::Viterbi => self.viterbi().map(Decoding::Viterbi),
            Algorithm::NBest => {
                let n = self.params.n_best;
                self.nbest(n).map(Decoding::NBest)
            }
            Algorithm::Forward => self.forward().map(Decoding::Forward),
            Algorithm::Backward => self.backward().map(Decoding::Backward),
            Algorithm::Posterior => self.posterior().map(Decoding::Posterior),
            Algorithm::Stochastic(kind) => self.stochastic(kind).map(Decoding::Stochastic),
        }
    }
}
