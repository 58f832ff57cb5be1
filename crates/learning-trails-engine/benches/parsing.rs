use criterion::{Criterion, criterion_group, criterion_main};
use learning_trails_engine::{LearningTrail, ParseOptions};
mod common;

fn bench_trail_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let options = ParseOptions::default();
    for steps in [10, 100] {
        let xml = common::generate_trail(steps);
        group.bench_function(format!("trail_{steps}_steps"), |b| {
            b.iter(|| {
                let trail = LearningTrail::parse(std::hint::black_box(&xml), &options, None);
                std::hint::black_box(trail)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_trail_parsing);
criterion_main!(benches);
