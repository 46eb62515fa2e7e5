use criterion::{black_box, criterion_group, criterion_main, Criterion};
use egui::vec2;
use tiltsketch::brush::{BrushState, Thresholds};
use tiltsketch::canvas::Canvas;
use tiltsketch::telemetry::{parse_reading, LineDecoder};

fn bench_parse_reading(c: &mut Criterion) {
    let line = "X: 2.871, Y: 2.872, Z: 0.654";

    c.bench_function("parse_reading", |b| {
        b.iter(|| black_box(parse_reading(black_box(line))))
    });
}

fn bench_decode_stream(c: &mut Criterion) {
    // Roughly a minute of firmware output, delivered in small USB-sized chunks
    let stream = "X: 0.312, Y: 1.642, Z: 1.020\r\n".repeat(120);

    c.bench_function("decode_and_parse_stream", |b| {
        b.iter(|| {
            let mut decoder = LineDecoder::new();
            let mut count = 0;
            for chunk in stream.as_bytes().chunks(64) {
                for line in decoder.push(black_box(chunk)) {
                    if !parse_reading(&line).is_empty() {
                        count += 1;
                    }
                }
            }
            black_box(count)
        })
    });
}

fn bench_canvas_frames(c: &mut Criterion) {
    let size = vec2(800.0, 400.0);
    let reading = parse_reading("X: 0.700, Y: 1.600, Z: 2.000");

    c.bench_function("brush_frames_into_canvas", |b| {
        b.iter(|| {
            let mut brush = BrushState::new(Thresholds::default(), size);
            let mut canvas = Canvas::new(size.x, size.y);
            brush.ingest(&reading);
            for _ in 0..600 {
                canvas.push(brush.step(1.0 / 60.0, size));
            }
            black_box(canvas.marks().len())
        })
    });
}

criterion_group!(benches, bench_parse_reading, bench_decode_stream, bench_canvas_frames);
criterion_main!(benches);
