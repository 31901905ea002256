use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use stochtrellis::hmm::mocks::mock_casino;
use stochtrellis::hmm::{SweepKind, Trellis};
use stochtrellis::seq::Sequence;

fn random_rolls(length: usize, seed: u64) -> Sequence {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let rolls: Vec<u8> = (0..length)
        .map(|_| *b"123456".choose(&mut rng).unwrap())
        .collect();
    Sequence::new("rolls", &rolls)
}

fn criterion_benchmark(c: &mut Criterion) {
    let g = mock_casino();
    let mut group = c.benchmark_group("casino");
    for length in [100, 1000, 10000] {
        let seq = random_rolls(length, 0);
        group.bench_with_input(BenchmarkId::new("viterbi", length), &seq, |b, seq| {
            b.iter(|| Trellis::new(&g, black_box(seq)).viterbi().unwrap())
        });
        group.bench_with_input(BenchmarkId::new("forward", length), &seq, |b, seq| {
            b.iter(|| Trellis::new(&g, black_box(seq)).forward().unwrap())
        });
        group.bench_with_input(BenchmarkId::new("nbest3", length), &seq, |b, seq| {
            b.iter(|| Trellis::new(&g, black_box(seq)).nbest(3).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("posterior", length), &seq, |b, seq| {
            b.iter(|| Trellis::new(&g, black_box(seq)).posterior().unwrap())
        });
        group.bench_with_input(BenchmarkId::new("stoch_forward", length), &seq, |b, seq| {
            b.iter(|| {
                Trellis::new(&g, black_box(seq))
                    .stochastic(SweepKind::Forward)
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
