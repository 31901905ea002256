//!
//! Common type definitions
//!

/// index of a hidden state, `0..n_states`
pub type StateIndex = usize;

/// Raw sequence of symbols
pub type Symbols = Vec<u8>;

/// Convert symbols into &str
/// useful in displaying
pub fn symbols_to_string(seq: &[u8]) -> String {
    String::from_utf8_lossy(seq).into_owned()
}

/// Default maximum number of states accepted by `GraphBuilder`
pub const MAX_STATES: usize = 1024;
