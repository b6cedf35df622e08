use cardtable_rs::session::{GameSession, SessionConfig};
use cardtable_rs::strategy::Difficulty;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn bench_shedding_session(c: &mut Criterion) {
    c.bench_function("shedding_4p_seeded", |b| {
        b.iter(|| {
            let mut s = GameSession::create(
                SessionConfig::shedding(4).with_seed(black_box(42)),
            )
            .unwrap();
            black_box(s.run_to_completion().unwrap())
        })
    });
}

fn bench_elimination_session(c: &mut Criterion) {
    c.bench_function("elimination_4p_seeded", |b| {
        b.iter(|| {
            let mut s = GameSession::create(
                SessionConfig::elimination(4)
                    .with_difficulty(Difficulty::High)
                    .with_seed(black_box(42)),
            )
            .unwrap();
            black_box(s.run_to_completion().unwrap())
        })
    });
}

criterion_group!(benches, bench_shedding_session, bench_elimination_session);
criterion_main!(benches);
