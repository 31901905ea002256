//!
//! decoding with a model loaded from a JSON file
//!
#[macro_use]
extern crate approx;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::io::Write;
use stochtrellis::error::{DecodeError, LoadError, ModelError};
use stochtrellis::hmm::batch::{decode_parallel, decode_sequential};
use stochtrellis::hmm::model::ModelConfig;
use stochtrellis::hmm::{Algorithm, Decoding, Interrupt, SweepKind, Trellis, TrellisParams};
use stochtrellis::prob::p;
use stochtrellis::seq::{Observations, Sequence};

const GENE_MODEL: &str = r#"{
  "name": "genefinder",
  "alphabet": "ACGT",
  "states": [
    {
      "name": "intergenic", "label": "N", "initial": 1.0,
      "emission": [0.25, 0.25, 0.25, 0.25],
      "transitions": [{"to": "intergenic", "prob": 0.9}, {"to": "gene", "prob": 0.1}]
    },
    {
      "name": "gene", "label": "G", "gff": "gene",
      "emission": [0.05, 0.45, 0.45, 0.05],
      "transitions": [{"to": "gene", "prob": 0.9}, {"to": "intergenic", "prob": 0.1}]
    }
  ]
}"#;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn gene_model_from_file() {
    let file = write_temp(GENE_MODEL);
    let config = ModelConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.name, "genefinder");
    let g = config.build().unwrap();
    assert_eq!(g.n_states(), 2);

    let seq = Sequence::new("chr1", b"ATATATATATGCGCGCGCGCGCGCATATATATAT");
    let v = Trellis::new(&g, &seq).viterbi().unwrap();
    let path = v.path().unwrap();
    let features = path.gff(&g, &seq.name, &config.name);
    assert_eq!(features.len(), 1);
    assert_eq!(features[0].feature, "gene");
    assert_eq!((features[0].start, features[0].end), (11, 24));
    assert_eq!(
        features[0].to_string(),
        "chr1\tgenefinder\tgene\t11\t24\t.\t+\t.\t."
    );

    let f = Trellis::new(&g, &seq).forward().unwrap();
    let b = Trellis::new(&g, &seq).backward().unwrap();
    assert_abs_diff_eq!(f.total(), b.total(), epsilon = 1e-6);
    assert!(v.score() <= f.total());
}

#[test]
fn params_from_file() {
    let file = write_temp(r#"{"n_best": 2, "seed": 7}"#);
    let params = TrellisParams::from_json_file(file.path()).unwrap();
    assert_eq!(params.n_best, 2);
    assert_eq!(params.seed, 7);
    assert_eq!(params.n_samples, TrellisParams::default().n_samples);
}

#[test]
fn broken_files() {
    let file = write_temp("{ not json");
    assert!(matches!(
        ModelConfig::from_json_file(file.path()),
        Err(LoadError::Json(_))
    ));
    assert!(matches!(
        ModelConfig::from_json_file("/nonexistent/model.json"),
        Err(LoadError::Io(_))
    ));
    let dangling = GENE_MODEL.replace(r#""to": "gene", "prob": 0.1"#, r#""to": "exon", "prob": 0.1"#);
    let config = ModelConfig::from_json_str(&dangling).unwrap();
    assert_eq!(
        config.build().unwrap_err(),
        ModelError::DanglingTransition {
            from: "intergenic".to_string(),
            to: "exon".to_string()
        }
    );
}

#[test]
fn batch_of_reads() {
    let g = ModelConfig::from_json_str(GENE_MODEL).unwrap().build().unwrap();
    let seqs: Vec<Sequence> = (0..16)
        .map(|i| {
            let body = "GC".repeat(i);
            Sequence::new(&format!("r{}", i), format!("ATAT{}ATAT", body).as_bytes())
        })
        .collect();
    let params = TrellisParams::default();
    let interrupt = Interrupt::new();
    for algorithm in [Algorithm::Viterbi, Algorithm::Forward, Algorithm::NBest] {
        let par = decode_parallel(&g, &seqs, algorithm, &params, &interrupt);
        let seq = decode_sequential(&g, &seqs, algorithm, &params, &interrupt);
        for (a, b) in par.into_iter().zip(seq) {
            let (a, b) = (a.unwrap(), b.unwrap());
            assert_eq!(a.algorithm(), algorithm);
            match (a, b) {
                (Decoding::Viterbi(a), Decoding::Viterbi(b)) => assert_eq!(a, b),
                (Decoding::Forward(a), Decoding::Forward(b)) => assert_eq!(a, b),
                (Decoding::NBest(a), Decoding::NBest(b)) => assert_eq!(a, b),
                _ => panic!("algorithm mismatch"),
            }
        }
    }
}

#[test]
fn stochastic_traceback_of_file_model() {
    let g = ModelConfig::from_json_str(GENE_MODEL).unwrap().build().unwrap();
    let seq = Sequence::new("s", b"ATGCGCAT");
    let r = Trellis::new(&g, &seq)
        .stochastic(SweepKind::Viterbi)
        .unwrap();
    let v = Trellis::new(&g, &seq).viterbi().unwrap();
    assert_abs_diff_eq!(r.total(), v.score(), epsilon = 1e-12);

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
    let m = r.sample_many(&mut rng, 500, &Interrupt::new()).unwrap();
    assert_eq!(m.total(), 500);
    let hits = m.hit_table(seq.len(), g.n_states());
    for pos in 0..seq.len() {
        assert_eq!(hits.row(pos).iter().sum::<usize>(), 500);
    }
    // the most frequent path comes first
    let counts: Vec<usize> = m.iter().map(|(_, c)| c).collect();
    for w in counts.windows(2) {
        assert!(w[0] >= w[1]);
    }
}

#[test]
fn empty_and_single_symbol() {
    let g = ModelConfig::from_json_str(GENE_MODEL).unwrap().build().unwrap();
    let empty = Sequence::new("e", b"");
    assert_eq!(
        Trellis::new(&g, &empty).forward().unwrap_err(),
        DecodeError::EmptySequence
    );
    let one = Sequence::new("one", b"A");
    let f = Trellis::new(&g, &one).forward().unwrap();
    // starts in intergenic only
    assert_abs_diff_eq!(f.total(), p(0.25), epsilon = 1e-12);
}
