//!
//! Properties shared by the algorithms
//!
use super::mocks::{mock_casino, mock_casino_from_json, mock_two_paths};
use super::*;
use crate::common::StateIndex;
use crate::error::DecodeError;
use crate::prob::{p, Prob};
use crate::seq::{Observations, Sequence};
use itertools::Itertools;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use test_case::test_case;

/// every state path of length `n` over `n_states` states
fn all_paths(n: usize, n_states: usize) -> Vec<Vec<StateIndex>> {
    (0..n).map(|_| 0..n_states).multi_cartesian_product().collect()
}

#[test_case(b"1" ; "single")]
#[test_case(b"66" ; "two sixes")]
#[test_case(b"1626366466" ; "mixed")]
#[test_case(b"666666666666666666661234512345" ; "long")]
fn forward_backward_consistent(symbols: &[u8]) {
    let g = mock_casino();
    let seq = Sequence::from_symbols(symbols);
    let f = Trellis::new(&g, &seq).forward().unwrap().total();
    let b = Trellis::new(&g, &seq).backward().unwrap().total();
    let v = Trellis::new(&g, &seq).viterbi().unwrap().score();
    assert!(f.log_diff(b) < 1e-6);
    assert!(v <= f);
}

#[test]
fn forward_and_viterbi_match_enumeration() {
    let g = mock_casino();
    let seq = Sequence::from_symbols(b"616266");
    let scores: Vec<Prob> = all_paths(seq.len(), g.n_states())
        .iter()
        .map(|path| g.score_path(&seq, path))
        .collect();
    let sum: Prob = scores.iter().sum();
    let max = scores.iter().copied().max().unwrap();

    let f = Trellis::new(&g, &seq).forward().unwrap();
    assert_abs_diff_eq!(f.total(), sum, epsilon = 1e-9);
    let v = Trellis::new(&g, &seq).viterbi().unwrap();
    assert_abs_diff_eq!(v.score(), max, epsilon = 1e-9);
    let path = v.path().unwrap();
    assert_abs_diff_eq!(g.score_path(&seq, path.states()), max, epsilon = 1e-9);
}

#[test]
fn nbest_matches_enumeration() {
    let g = mock_casino();
    let seq = Sequence::from_symbols(b"1662616");
    let mut scores: Vec<Prob> = all_paths(seq.len(), g.n_states())
        .iter()
        .map(|path| g.score_path(&seq, path))
        .collect();
    scores.sort_by(|a, b| b.cmp(a));

    let n = 8;
    let r = Trellis::new(&g, &seq).nbest(n).unwrap();
    assert_eq!(r.n_found(), n);
    for (rank, expected) in scores.iter().take(n).enumerate() {
        assert_abs_diff_eq!(r.score(rank).unwrap(), *expected, epsilon = 1e-9);
        let path = r.path(rank).unwrap().unwrap();
        assert_abs_diff_eq!(g.score_path(&seq, path.states()), *expected, epsilon = 1e-9);
    }
}

#[test]
fn nbest_keeps_all_paths_when_n_is_large() {
    let g = mock_casino();
    let seq = Sequence::from_symbols(b"163");
    let r = Trellis::new(&g, &seq).nbest(100).unwrap();
    // 2^3 paths, all with non-zero probability
    assert_eq!(r.n_found(), 8);
    let total: Prob = r.scores().into_iter().sum();
    let f = Trellis::new(&g, &seq).forward().unwrap();
    assert_abs_diff_eq!(total, f.total(), epsilon = 1e-9);
}

#[test]
fn posterior_matches_enumeration() {
    let g = mock_casino();
    let seq = Sequence::from_symbols(b"61626");
    let paths = all_paths(seq.len(), g.n_states());
    let total: Prob = paths.iter().map(|path| g.score_path(&seq, path)).sum();

    let r = Trellis::new(&g, &seq).posterior().unwrap();
    for pos in 0..seq.len() {
        for k in 0..g.n_states() {
            let mass: Prob = paths
                .iter()
                .filter(|path| path[pos] == k)
                .map(|path| g.score_path(&seq, path))
                .sum();
            assert_abs_diff_eq!(r.get(pos, k), mass / total, epsilon = 1e-9);
        }
    }
}

#[test]
fn stochastic_hits_follow_posterior() {
    let g = mock_casino();
    let seq = Sequence::from_symbols(b"1666661");
    let post = Trellis::new(&g, &seq).posterior().unwrap();
    let stoch = Trellis::new(&g, &seq)
        .stochastic(SweepKind::Forward)
        .unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
    let reps = 20_000;
    let hits = stoch
        .sample_many(&mut rng, reps, &Interrupt::new())
        .unwrap()
        .hit_table(seq.len(), g.n_states());
    for pos in 0..seq.len() {
        for k in 0..g.n_states() {
            let freq = hits.get(pos, k) as f64 / reps as f64;
            assert_abs_diff_eq!(freq, post.get(pos, k).to_value(), epsilon = 0.02);
        }
    }
}

#[test]
fn reset_then_other_algorithm() {
    let g = mock_casino();
    let seq = Sequence::from_symbols(b"1626366466");
    let fresh_f = Trellis::new(&g, &seq).forward().unwrap();
    let fresh_v = Trellis::new(&g, &seq).viterbi().unwrap();

    // viterbi -> reset -> forward
    let mut t = Trellis::new(&g, &seq);
    assert_eq!(t.viterbi().unwrap(), fresh_v);
    t.reset();
    assert_eq!(t.forward().unwrap(), fresh_f);

    // forward -> reset -> viterbi
    let mut t = Trellis::new(&g, &seq);
    assert_eq!(t.forward().unwrap(), fresh_f);
    t.reset();
    assert_eq!(t.viterbi().unwrap(), fresh_v);
    t.reset();
    let post = t.posterior().unwrap();
    assert_abs_diff_eq!(post.total(), fresh_f.total(), epsilon = 1e-12);
}

#[test_case(Algorithm::Viterbi ; "viterbi")]
#[test_case(Algorithm::NBest ; "nbest")]
#[test_case(Algorithm::Forward ; "forward")]
#[test_case(Algorithm::Backward ; "backward")]
#[test_case(Algorithm::Posterior ; "posterior")]
#[test_case(Algorithm::Stochastic(SweepKind::Forward) ; "stoch forward")]
#[test_case(Algorithm::Stochastic(SweepKind::Viterbi) ; "stoch viterbi")]
fn cancelled_runs(algorithm: Algorithm) {
    let g = mock_casino();
    let seq = Sequence::from_symbols(b"12345");

    let token = CancelToken::new();
    token.cancel();
    let mut t = Trellis::new(&g, &seq).with_interrupt(Interrupt::new().with_token(token));
    assert!(matches!(
        t.decode(algorithm),
        Err(DecodeError::Cancelled { .. })
    ));
    // a failed run still needs a reset
    assert_eq!(
        t.decode(algorithm).unwrap_err(),
        DecodeError::AlreadyUsed(algorithm.name())
    );

    let params = TrellisParams {
        timeout_ms: Some(0),
        ..TrellisParams::default()
    };
    let mut t = Trellis::new(&g, &seq).with_params(params);
    assert!(matches!(
        t.decode(algorithm),
        Err(DecodeError::Cancelled { .. })
    ));

    // a single position is never interrupted
    let one = Sequence::from_symbols(b"1");
    let mut t = Trellis::new(&g, &one).with_params(params);
    assert!(t.decode(algorithm).is_ok());
}

#[test]
fn posterior_inconsistent_with_negative_tolerance() {
    let g = mock_casino();
    let seq = Sequence::from_symbols(b"1626");
    let params = TrellisParams {
        fb_tolerance: -1.0,
        ..TrellisParams::default()
    };
    let r = Trellis::new(&g, &seq).with_params(params).posterior();
    assert!(matches!(r, Err(DecodeError::Inconsistent { .. })));
}

#[test]
fn json_casino_equals_builder_casino() {
    let a = mock_casino();
    let b = mock_casino_from_json();
    assert_eq!(a.states(), b.states());
    let seq = Sequence::from_symbols(b"16263664661111");
    let va = Trellis::new(&a, &seq).viterbi().unwrap();
    let vb = Trellis::new(&b, &seq).viterbi().unwrap();
    assert_abs_diff_eq!(va.score(), vb.score(), epsilon = 1e-9);
    assert_eq!(va.path().unwrap().states(), vb.path().unwrap().states());
    let fa = Trellis::new(&a, &seq).forward().unwrap();
    let fb = Trellis::new(&b, &seq).forward().unwrap();
    assert_abs_diff_eq!(fa.total(), fb.total(), epsilon = 1e-9);
}

#[test]
fn external_weights_restrict_states() {
    let g = mock_casino();
    let plain = Sequence::from_symbols(b"111111");
    let neutral = Sequence::from_symbols(b"111111").with_external(3, vec![p(1.0), p(1.0)]);
    let forced = Sequence::from_symbols(b"111111").with_external(3, vec![p(0.0), p(1.0)]);

    let v = Trellis::new(&g, &plain).viterbi().unwrap();
    assert_eq!(v.path().unwrap().states(), &[0, 0, 0, 0, 0, 0]);
    let vn = Trellis::new(&g, &neutral).viterbi().unwrap();
    assert_eq!(vn, v);

    let vf = Trellis::new(&g, &forced).viterbi().unwrap();
    assert_eq!(vf.path().unwrap().states()[3], 1);
    assert!(vf.score() < v.score());

    let f = Trellis::new(&g, &plain).forward().unwrap().total();
    let ff = Trellis::new(&g, &forced).forward().unwrap().total();
    assert!(ff < f);
    let post = Trellis::new(&g, &forced).posterior().unwrap();
    assert!(post.get(3, 0).is_zero());
    assert_abs_diff_eq!(post.get(3, 1), p(1.0), epsilon = 1e-9);
}

#[test]
fn decode_dispatch_two_paths() {
    let g = mock_two_paths();
    let seq = Sequence::from_symbols(b"AAAA");
    let params = TrellisParams {
        n_best: 4,
        ..TrellisParams::default()
    };
    match Trellis::new(&g, &seq).with_params(params).decode(Algorithm::NBest) {
        Ok(Decoding::NBest(r)) => {
            assert_eq!(r.n(), 4);
            assert_eq!(r.n_found(), 2);
        }
        other => panic!("unexpected {:?}", other),
    }
    match Trellis::new(&g, &seq).decode(Algorithm::Posterior) {
        Ok(Decoding::Posterior(r)) => {
            assert_abs_diff_eq!(r.total(), p(1.0), epsilon = 1e-12);
            assert_abs_diff_eq!(r.get(2, 1), p(0.5), epsilon = 1e-12);
        }
        other => panic!("unexpected {:?}", other),
    }
}
