use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use phonodrill::content::bank::QuestionBank;
use phonodrill::content::select::{competition_sequence, practice_pool, select_unique_targets};
use phonodrill::content::sets::SetLetter;

fn bench_competition_sequence(c: &mut Criterion) {
    let bank = QuestionBank::load();

    c.bench_function("competition_sequence (60 entries)", |b| {
        b.iter(|| competition_sequence(black_box(SetLetter::A), black_box(&bank)))
    });
}

fn bench_practice_selection(c: &mut Criterion) {
    let bank = QuestionBank::load();
    let pool = practice_pool(&bank);

    c.bench_function("practice_pool (300 entries)", |b| {
        b.iter(|| practice_pool(black_box(&bank)))
    });

    c.bench_function("select_unique_targets (100 of 300)", |b| {
        b.iter(|| {
            let mut rng = SmallRng::seed_from_u64(42);
            select_unique_targets(black_box(&pool), black_box(100), &mut rng)
        })
    });
}

criterion_group!(benches, bench_competition_sequence, bench_practice_selection);
criterion_main!(benches);
