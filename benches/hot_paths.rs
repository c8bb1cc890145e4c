use criterion::{black_box, criterion_group, criterion_main, Criterion};

use skatemap::braille::BrailleCanvas;
use skatemap::map::geometry::draw_line;
use skatemap::map::Viewport;

fn bench_projection(c: &mut Criterion) {
    let viewport = Viewport::city(240, 160);
    let points: Vec<(f64, f64)> = (0..10_000)
        .map(|i| {
            let t = i as f64 / 10_000.0;
            (-76.5 + t * 1.5, 45.0 + t * 0.5)
        })
        .collect();

    c.bench_function("project_10k_points", |b| {
        b.iter(|| {
            for &(lon, lat) in &points {
                black_box(viewport.project(lon, lat));
            }
        })
    });
}

fn bench_line_raster(c: &mut Criterion) {
    c.bench_function("raster_route_polyline", |b| {
        b.iter(|| {
            let mut canvas = BrailleCanvas::new(120, 40);
            let mut prev = (0, 0);
            for i in 1..500 {
                let next = ((i * 7) % 240, (i * 3) % 160);
                draw_line(&mut canvas, prev.0, prev.1, next.0, next.1);
                prev = next;
            }
            black_box(canvas.cells().count());
        })
    });
}

criterion_group!(benches, bench_projection, bench_line_raster);
criterion_main!(benches);
