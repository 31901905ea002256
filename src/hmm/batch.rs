//!
//! Decoding many sequences against one graph
//!
//! Each sequence gets its own `Trellis`; the graph is only read, so the
//! sequences are decoded in parallel with rayon.
//!
use super::params::TrellisParams;
use super::scorer::ScoreProvider;
use super::trellis::{Algorithm, Decoding, Interrupt, Trellis};
use crate::error::DecodeError;
use crate::graph::StateGraph;
use crate::prob::Prob;
use rayon::prelude::*;

fn decode_one<P: ScoreProvider>(
    graph: &StateGraph<P>,
    seq: &P::Seq,
    algorithm: Algorithm,
    params: &TrellisParams,
    interrupt: &Interrupt,
) -> Result<Decoding, DecodeError> {
    Trellis::new(graph, seq)
        .with_params(*params)
        .with_interrupt(interrupt.clone())
        .decode(algorithm)
}

///
/// Decode every sequence with rayon parallel calculation.
///
/// Results are in the order of `seqs`.
///
pub fn decode_parallel<P>(
    graph: &StateGraph<P>,
    seqs: &[P::Seq],
    algorithm: Algorithm,
    params: &TrellisParams,
    interrupt: &Interrupt,
) -> Vec<Result<Decoding, DecodeError>>
where
    P: ScoreProvider + Sync,
    P::Seq: Sized + Sync,
{
    seqs.par_iter()
        .map(|seq| decode_one(graph, seq, algorithm, params, interrupt))
        .collect()
}

///
/// Decode every sequence one by one.
///
pub fn decode_sequential<P>(
    graph: &StateGraph<P>,
    seqs: &[P::Seq],
    algorithm: Algorithm,
    params: &TrellisParams,
    interrupt: &Interrupt,
) -> Vec<Result<Decoding, DecodeError>>
where
    P: ScoreProvider,
    P::Seq: Sized,
{
    seqs.iter()
        .map(|seq| decode_one(graph, seq, algorithm, params, interrupt))
        .collect()
}

///
/// calculate the full probability `P(x_1, ..., x_m) = \prod_i P(x_i)` using
/// rayon parallel calculation.
///
pub fn full_prob_parallel<P>(graph: &StateGraph<P>, seqs: &[P::Seq]) -> Result<Prob, DecodeError>
where
    P: ScoreProvider + Sync,
    P::Seq: Sized + Sync,
{
    seqs.par_iter()
        .map(|seq| Trellis::new(graph, seq).forward().map(|r| r.total()))
        .collect::<Result<Vec<Prob>, DecodeError>>()
        .map(|totals| totals.into_iter().product())
}
