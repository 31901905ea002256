//!
//! Parameters of a trellis run
//!
use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::path::Path;

///
/// Parameters shared by all algorithms of a `Trellis`.
///
/// Missing fields of a JSON file take the default values.
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrellisParams {
    ///
    /// number of paths kept by n-best Viterbi
    pub n_best: usize,
    ///
    /// number of stochastic tracebacks drawn by the command line tool
    pub n_samples: usize,
    ///
    /// seed of the random generator used in sampling
    pub seed: u64,
    ///
    /// maximum allowed `|log P_forward - log P_backward|`
    pub fb_tolerance: f64,
    ///
    /// run deadline in milliseconds, counted from the start of each run
    pub timeout_ms: Option<u64>,
}

impl Default for TrellisParams {
    fn default() -> Self {
        TrellisParams {
            n_best: 3,
            n_samples: 1000,
            seed: 0,
            fb_tolerance: 1e-6,
            timeout_ms: None,
        }
    }
}

impl TrellisParams {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

impl std::fmt::Display for TrellisParams {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "n_best={} n_samples={} seed={} fb_tolerance={} timeout_ms={:?}",
            self.n_best, self.n_samples, self.seed, self.fb_tolerance, self.timeout_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_partial_json() {
        let params: TrellisParams = serde_json::from_str(r#"{"n_best": 5, "timeout_ms": 10}"#).unwrap();
        assert_eq!(params.n_best, 5);
        assert_eq!(params.timeout_ms, Some(10));
        assert_eq!(params.n_samples, TrellisParams::default().n_samples);
        assert_eq!(params.fb_tolerance, 1e-6);
    }
}
