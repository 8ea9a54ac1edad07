use criterion::{black_box, criterion_group, criterion_main, Criterion};

use kalafont_backend::geometry::triangulate::triangulate_rings;
use kalafont_backend::geometry::Point;

/// Regular n-gon approximating a circle, the shape curve flattening feeds
/// the triangulator for round glyphs.
fn ngon(cx: f32, cy: f32, radius: f32, sides: usize) -> Vec<Point> {
    (0..sides)
        .map(|i| {
            let angle = i as f32 / sides as f32 * std::f32::consts::TAU;
            Point::new(cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

fn bench_triangulation(c: &mut Criterion) {
    let solid = vec![ngon(500.0, 500.0, 400.0, 64)];
    let annulus = vec![
        ngon(500.0, 500.0, 400.0, 64),
        ngon(500.0, 500.0, 200.0, 48),
    ];

    c.bench_function("triangulate_ngon_64", |b| {
        b.iter(|| triangulate_rings(black_box(&solid), 0).unwrap())
    });

    c.bench_function("triangulate_annulus", |b| {
        b.iter(|| triangulate_rings(black_box(&annulus), 0).unwrap())
    });
}

criterion_group!(benches, bench_triangulation);
criterion_main!(benches);
