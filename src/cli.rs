//!
//! Command line decoder
//!
//! Loads a JSON model, decodes each sequence given on the command line with
//! one algorithm, and prints the result to stdout.
//!
use crate::error::CliError;
use crate::graph::StateGraph;
use crate::hmm::batch::decode_parallel;
use crate::hmm::model::ModelConfig;
use crate::hmm::scorer::TableScorer;
use crate::hmm::{Algorithm, Decoding, Interrupt, TracebackPath, TrellisParams};
use crate::seq::Sequence;
use clap::Parser;
use log::{info, warn};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::Duration;

///
/// Decode sequences against an HMM
///
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Opts {
    /// JSON model file
    #[clap(short = 'm', long)]
    pub model: String,
    /// viterbi, nbest, forward, backward, posterior, stoch-forward or stoch-viterbi
    #[clap(short = 'a', long, default_value = "viterbi")]
    pub algorithm: Algorithm,
    /// JSON file of TrellisParams
    #[clap(long)]
    pub params: Option<String>,
    /// number of paths of nbest (overrides params)
    #[clap(short = 'n', long)]
    pub n_best: Option<usize>,
    /// number of stochastic tracebacks (overrides params)
    #[clap(short = 'r', long)]
    pub n_samples: Option<usize>,
    /// seed of the sampler (overrides params)
    #[clap(short = 's', long)]
    pub seed: Option<u64>,
    /// print the model as a dot graph
    #[clap(long)]
    pub dot: bool,
    /// print paths as GFF instead of labels
    #[clap(long)]
    pub gff: bool,
    /// sequences to decode
    pub seqs: Vec<String>,
}

impl Opts {
    ///
    /// `TrellisParams` from the params file (or defaults) with the command
    /// line overrides applied.
    ///
    pub fn to_params(&self) -> Result<TrellisParams, CliError> {
        let mut params = match &self.params {
            Some(path) => TrellisParams::from_json_file(path)?,
            None => TrellisParams::default(),
        };
        if let Some(n) = self.n_best {
            params.n_best = n;
        }
        if let Some(n) = self.n_samples {
            params.n_samples = n;
        }
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        Ok(params)
    }
}

fn print_path(graph: &StateGraph<TableScorer>, seq: &Sequence, source: &str, path: &TracebackPath, gff: bool) {
    if gff {
        for feature in path.gff(graph, &seq.name, source) {
            println!("{}", feature);
        }
    } else {
        println!("{}", path.label_string(graph));
    }
}

fn print_decoding(
    graph: &StateGraph<TableScorer>,
    seq: &Sequence,
    source: &str,
    decoding: &Decoding,
    params: &TrellisParams,
    interrupt: &Interrupt,
    gff: bool,
) -> Result<(), CliError> {
    match decoding {
        Decoding::Viterbi(r) => match r.path() {
            Some(path) => {
                println!("# score={}", path.score());
                print_path(graph, seq, source, &path, gff);
            }
            None => println!("# no valid path"),
        },
        Decoding::NBest(r) => {
            for (rank, path) in r.paths().iter().enumerate() {
                println!("# rank={} score={}", rank, path.score());
                print_path(graph, seq, source, path, gff);
            }
            if r.n_found() < r.n() {
                println!("# found {} of {} paths", r.n_found(), r.n());
            }
        }
        Decoding::Forward(r) => println!("# forward={}", r.total()),
        Decoding::Backward(r) => println!("# backward={}", r.total()),
        Decoding::Posterior(r) => {
            println!("# total={}", r.total());
            let names: Vec<&str> = graph.states().iter().map(|s| s.name.as_str()).collect();
            println!("pos\t{}", names.join("\t"));
            for (pos, row) in r.probabilities().iter().enumerate() {
                let cols: Vec<String> = row.iter().map(|v| format!("{:.4}", v)).collect();
                println!("{}\t{}", pos, cols.join("\t"));
            }
            if let Some(path) = r.label_path(graph) {
                print_path(graph, seq, source, &path, gff);
            }
        }
        Decoding::Stochastic(r) => {
            println!("# total={}", r.total());
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.seed);
            let m = r.sample_many(&mut rng, params.n_samples, interrupt)?;
            for (path, count) in m.iter() {
                println!("# count={} score={}", count, path.score());
                print_path(graph, seq, source, path, gff);
            }
        }
    }
    Ok(())
}

///
/// Run the decoder with parsed options.
///
pub fn run(opts: &Opts) -> Result<(), CliError> {
    let params = opts.to_params()?;
    let config = ModelConfig::from_json_file(&opts.model)?;
    let graph = config.build()?;
    info!(
        "loaded model {} n_states={} algorithm={} {}",
        config.name,
        graph.n_states(),
        opts.algorithm,
        params
    );
    if opts.dot {
        println!("{}", graph.to_dot());
    }

    let seqs: Vec<Sequence> = opts
        .seqs
        .iter()
        .enumerate()
        .map(|(i, s)| Sequence::new(&format!("seq{}", i), s.as_bytes()))
        .collect();
    for seq in seqs.iter() {
        graph.provider().check_sequence(seq)?;
    }
    if seqs.is_empty() {
        warn!("no sequence was given");
    }

    let results = decode_parallel(&graph, &seqs, opts.algorithm, &params, &Interrupt::new());
    for (seq, result) in seqs.iter().zip(results) {
        println!(">{}", seq.name);
        let decoding = result?;
        // sampling gets its own timeout_ms window
        let interrupt = match params.timeout_ms {
            Some(ms) => Interrupt::new().with_timeout(Duration::from_millis(ms)),
            None => Interrupt::new(),
        };
        print_decoding(&graph, seq, &config.name, &decoding, &params, &interrupt, opts.gff)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::mocks::mock_casino_json;
    use crate::error::DecodeError;
    use crate::hmm::SweepKind;
    use std::io::Write;

    fn model_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(mock_casino_json().as_bytes()).unwrap();
        file
    }

    #[test]
    fn cli_parse_and_run() {
        let file = model_file();
        let opts = Opts::parse_from(&[
            "stochtrellis",
            "-m",
            file.path().to_str().unwrap(),
            "-a",
            "stoch-forward",
            "-r",
            "10",
            "16266",
        ]);
        assert_eq!(opts.algorithm, Algorithm::Stochastic(SweepKind::Forward));
        let params = opts.to_params().unwrap();
        assert_eq!(params.n_samples, 10);
        assert_eq!(params.n_best, TrellisParams::default().n_best);
        assert!(run(&opts).is_ok());
    }
    #[test]
    fn cli_sampling_timeout() {
        let file = model_file();
        let params = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(params.path(), r#"{"timeout_ms": 0}"#).unwrap();
        let opts = Opts::parse_from(&[
            "stochtrellis",
            "-m",
            file.path().to_str().unwrap(),
            "--params",
            params.path().to_str().unwrap(),
            "-a",
            "stoch-viterbi",
            "-r",
            "1000000",
            "6",
        ]);
        // one position runs through the trellis, the sampling loop times out
        assert!(matches!(
            run(&opts),
            Err(CliError::Decode(DecodeError::SamplingCancelled { draws: 0 }))
        ));
    }
    #[test]
    fn cli_unknown_symbol() {
        let file = model_file();
        let opts = Opts::parse_from(&["stochtrellis", "-m", file.path().to_str().unwrap(), "1627"]);
        assert!(matches!(run(&opts), Err(CliError::Model(_))));
    }
    #[test]
    fn cli_empty_sequence() {
        let file = model_file();
        let opts = Opts::parse_from(&["stochtrellis", "-m", file.path().to_str().unwrap(), ""]);
        assert!(matches!(run(&opts), Err(CliError::Decode(_))));
    }
    #[test]
    fn cli_missing_model() {
        let opts = Opts::parse_from(&["stochtrellis", "-m", "/nonexistent/model.json", "1"]);
        assert!(matches!(run(&opts), Err(CliError::Load(_))));
    }
}
