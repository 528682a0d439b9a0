use criterion::{black_box, criterion_group, criterion_main, Criterion};
use matforge_animation_core::{AnimValue, Animation, AnimationBase, KeyframeTrack, TrackKind};

fn interleaved_frames(n: i32) -> Vec<i32> {
    (0..n).map(|i| if i % 2 == 0 { i } else { n * 2 - i }).collect()
}

fn bench_insert(c: &mut Criterion) {
    let frames = interleaved_frames(512);
    c.bench_function("set_value_at_512_unordered", |b| {
        b.iter(|| {
            let mut t = Animation::<[f32; 4]>::new();
            for f in &frames {
                t.set_value_at(black_box(*f), [*f as f32; 4]);
            }
            t
        })
    });
}

fn bench_sample(c: &mut Criterion) {
    let mut t = KeyframeTrack::new(TrackKind::Float3);
    for f in (0..1024).step_by(4) {
        t.set_value_at(f, &AnimValue::Float3([f as f32, 0.0, 1.0]))
            .unwrap();
    }
    let mut dst = [0u8; 12];
    c.bench_function("sample_into_float3_256_keys", |b| {
        b.iter(|| {
            for frame in 0..1024 {
                t.sample_into(black_box(frame), &mut dst);
            }
        })
    });
}

criterion_group!(benches, bench_insert, bench_sample);
criterion_main!(benches);
