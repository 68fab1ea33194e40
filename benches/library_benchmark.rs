use criterion::{criterion_group, criterion_main, Criterion};

use xkcd_password::{entropy::EntropyPool, GenerationRequest, GeneratorConfig, PassphraseGenerator};

fn criterion_benchmark_next_int(c: &mut Criterion) {
    let mut pool = EntropyPool::new(&GeneratorConfig::default()).unwrap();

    c.bench_function("next_int over 5600 words", |b| {
        b.iter(|| pool.next_int(5599).unwrap())
    });
}

fn criterion_benchmark_generate(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let generator = PassphraseGenerator::new().unwrap();

    c.bench_function("generate 4 words between 5 and 8", |b| {
        b.to_async(&runtime)
            .iter(|| generator.generate(GenerationRequest::default()))
    });

    c.bench_function("generate 10 words of exactly 3", |b| {
        b.to_async(&runtime).iter(|| {
            generator.generate(
                GenerationRequest::new()
                    .num_words(10)
                    .min_length(3)
                    .max_length(3),
            )
        })
    });
}

criterion_group!(
    benches,
    criterion_benchmark_next_int,
    criterion_benchmark_generate
);
criterion_main!(benches);
