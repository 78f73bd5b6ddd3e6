//! Association pass over a busy cycle (tens of detections per stream)

use association::{AssociationConfig, AssociationEngine};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use detection_types::{CameraDetection, RangingDetection};
use sector_geometry::GeometryMapper;

fn busy_cycle(n: usize) -> (Vec<CameraDetection>, Vec<RangingDetection>) {
    let cameras = (0..n)
        .map(|i| {
            let x = (i * 97 % 1900) as f64;
            CameraDetection::new([x, 100.0, x + 20.0, 160.0], "boat", 0.01 * i as f64)
                .with_camera_id((i % 4) as u32 + 1)
        })
        .collect();
    let ranging = (0..n)
        .map(|i| RangingDetection::new((i * 37 % 360) as f64, 20.0 + i as f64, 0.01 * i as f64))
        .collect();
    (cameras, ranging)
}

fn bench_associate(c: &mut Criterion) {
    let engine = AssociationEngine::new(AssociationConfig::default(), GeometryMapper::default())
        .expect("default config is valid");

    for n in [8, 32, 64] {
        let (cameras, ranging) = busy_cycle(n);
        c.bench_function(&format!("associate_{n}x{n}"), |b| {
            b.iter(|| engine.associate(black_box(&cameras), black_box(&ranging)))
        });
    }
}

criterion_group!(benches, bench_associate);
criterion_main!(benches);
