use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cz_engine::{synthesize, RenderConfig, Renderer};
use cz_ir::{HarmonyPattern, MusicParameters, ParameterChange, VoiceProfile};

fn bench_tone(c: &mut Criterion) {
    c.bench_function("synthesize_one_second", |b| {
        b.iter(|| synthesize(black_box(440.0), 1.0, 0.5, VoiceProfile::HARMONY, 44_100))
    });
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_ten_seconds");
    group.sample_size(10);
    for pattern in [HarmonyPattern::Block, HarmonyPattern::Tremolo, HarmonyPattern::Rhythmic] {
        let params = MusicParameters { duration: 10.0, harmony_pattern: pattern, ..Default::default() };
        group.bench_with_input(BenchmarkId::from_parameter(format!("{:?}", pattern)), &params, |b, params| {
            let mut renderer = Renderer::new(RenderConfig::seeded(1)).unwrap();
            b.iter(|| renderer.render(black_box(params)).unwrap())
        });
    }
    group.finish();
}

fn bench_changes(c: &mut Criterion) {
    let params = MusicParameters { duration: 10.0, ..Default::default() };
    let changes = [
        ParameterChange::new(3.0, MusicParameters { tempo: 90.0, ..Default::default() }, 1.0),
        ParameterChange::new(7.0, MusicParameters { tempo: 140.0, ..Default::default() }, 1.0),
    ];
    let mut group = c.benchmark_group("render_with_changes");
    group.sample_size(10);
    group.bench_function("two_changes", |b| {
        let mut renderer = Renderer::new(RenderConfig::seeded(2)).unwrap();
        b.iter(|| renderer.render_with_changes(black_box(&params), &changes).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_tone, bench_render, bench_changes);
criterion_main!(benches);
