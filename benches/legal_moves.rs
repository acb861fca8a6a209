//! Criterion benchmarks for the legal-move and request/undo hot paths.
//!
//! Run with:
//!     cargo bench --bench legal_moves

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use jungle_game_engine::games::jungle::types::Position;
use jungle_game_engine::games::jungle::{GameSession, JungleFactory};

/// A session advanced `plies` random moves from the standard start.
fn midgame(plies: usize) -> GameSession {
    let mut session = GameSession::new(&JungleFactory::standard()).unwrap();
    let mut rng = StdRng::seed_from_u64(plies as u64);
    for _ in 0..plies {
        if session.is_over() {
            break;
        }
        let moves = session.legal_moves(session.current_seat());
        match moves.choose(&mut rng) {
            Some(mv) => {
                session.request_move(mv.from, mv.to).unwrap();
            }
            None => session.pass_turn(),
        }
    }
    session
}

fn bench_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("legal_moves");
    for plies in [0usize, 20, 60] {
        let session = midgame(plies);
        group.bench_with_input(BenchmarkId::from_parameter(plies), &session, |b, s| {
            b.iter(|| s.legal_moves(s.current_seat()))
        });
    }
    group.finish();
}

fn bench_request_and_undo(c: &mut Criterion) {
    let mut session = GameSession::new(&JungleFactory::standard()).unwrap();
    let from = Position::new(0, 2);
    let to = Position::new(0, 3);
    c.bench_function("request_move_then_undo", |b| {
        b.iter(|| {
            let outcome = session.request_move(from, to).unwrap();
            assert!(outcome.accepted);
            session.undo();
            session.take_events();
        })
    });
}

criterion_group!(benches, bench_legal_moves, bench_request_and_undo);
criterion_main!(benches);
