//!
//! HMM decoding on a trellis
//!
//! ## Modules
//!
//! * `scorer`: `ScoreProvider` trait and the table-driven `TableScorer`
//! * `model`: JSON model description
//! * `params`: `TrellisParams`
//! * `trellis`: `Trellis` lifecycle and dispatch
//! * `table`: score buffers and matrices
//! * algorithms
//!     * `viterbi`, `nbest`: best paths
//!     * `forward`, `backward`, `posterior`: sum-product
//!     * `stoch_table`, `sample`: stochastic traceback
//! * `traceback`: `TracebackPath` and `MultiTraceback`
//! * `batch`: parallel decoding of many sequences
//!
pub mod backward;
pub mod batch;
pub mod forward;
pub mod mocks;
pub mod model;
pub mod nbest;
pub mod params;
pub mod posterior;
pub mod sample;
pub mod scorer;
pub mod stoch_table;
pub mod table;
pub mod traceback;
pub mod trellis;
pub mod viterbi;

#[cfg(test)]
mod tests;

pub use params::TrellisParams;
pub use scorer::ScoreProvider;
pub use traceback::{MultiTraceback, TracebackPath};
pub use trellis::{Algorithm, CancelToken, Decoding, Interrupt, SweepKind, Trellis};
