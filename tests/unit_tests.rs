//! Integration tests for the tiltsketch drawing pipeline
//!
//! These tests drive raw device bytes through line decoding, parsing, the brush and the canvas
//! the same way the application does, without a window or a serial port.

#[cfg(test)]
mod unit_tests {
    use egui::{pos2, vec2};
    use proptest::prelude::*;

    use tiltsketch::brush::{BrushState, Mark, Rgba8, Thresholds, THICK_BRUSH_WIDTH, THIN_BRUSH_WIDTH};
    use tiltsketch::canvas::{Canvas, BACKGROUND_GRAY};
    use tiltsketch::scrollback::ScrollbackLog;
    use tiltsketch::telemetry::{parse_reading, LineDecoder};

    /// Feed raw bytes through the decoder and brush, taking one frame per decoded line
    fn draw_from_bytes(bytes: &[u8], chunk: usize, frame_dt: f32) -> (BrushState, Canvas) {
        let size = vec2(200.0, 100.0);
        let mut canvas = Canvas::new(size.x, size.y);
        let mut brush = BrushState::new(Thresholds::default(), size);
        let mut decoder = LineDecoder::new();

        for piece in bytes.chunks(chunk.max(1)) {
            for line in decoder.push(piece) {
                brush.ingest(&parse_reading(&line));
                canvas.push(brush.step(frame_dt, size));
            }
        }
        (brush, canvas)
    }

    /// Firmware output in a straight rightward tilt draws one coalesced segment
    #[test]
    fn test_steady_tilt_draws_single_stroke() {
        let stream = "Calibrating...\r\n".to_string()
            + &"X: 0.700, Y: 1.300, Z: 1.000\r\n".repeat(10);
        let (brush, canvas) = draw_from_bytes(stream.as_bytes(), 7, 0.1);

        // The status line shows the idle marker, the first reading starts the stroke
        assert_eq!(brush.position(), pos2(200.0, 50.0));
        let segments: Vec<&Mark> = canvas
            .marks()
            .iter()
            .filter(|m| matches!(m, Mark::Segment { .. }))
            .collect();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].end(), pos2(200.0, 50.0));
        assert_eq!(segments[0].width(), 6.0);
    }

    /// Partial lines update only the channels they carry
    #[test]
    fn test_partial_lines_keep_other_channels() {
        let size = vec2(100.0, 100.0);
        let mut brush = BrushState::new(Thresholds::default(), size);
        brush.ingest(&parse_reading("X: 0.1, Y: 1.3, Z: 0.5"));
        brush.ingest(&parse_reading("Z: 2.5"));

        assert_eq!(brush.channels().x, Some(0.1));
        assert_eq!(brush.thresholds().brush_width(brush.channels().z), THICK_BRUSH_WIDTH);

        brush.ingest(&parse_reading("Z: 0.2"));
        assert_eq!(brush.thresholds().brush_width(brush.channels().z), THIN_BRUSH_WIDTH);
    }

    /// A still brush repaints a translucent white dot and does not grow the canvas
    #[test]
    fn test_still_brush_does_not_accumulate_marks() {
        let stream = "X: 0.5, Y: 1.3, Z: 1.0\n".repeat(50);
        let (_, canvas) = draw_from_bytes(stream.as_bytes(), 64, 0.016);

        assert!(canvas.marks().len() <= 2);
        assert_eq!(canvas.marks().last().map(Mark::color), Some(Rgba8::white(220)));
    }

    #[test]
    fn test_rasterized_stroke_is_visible() {
        let stream = "X: 0.1, Y: 1.3, Z: 2.0\n".repeat(5);
        let (_, canvas) = draw_from_bytes(stream.as_bytes(), 5, 0.05);

        let fb = canvas.rasterize().unwrap();
        assert_eq!((fb.width(), fb.height()), (200, 100));

        // Left of center along the middle row the thick brush has painted over the background
        let painted = fb.pixel(90, 50).unwrap();
        assert_ne!(
            painted,
            Rgba8::new(BACKGROUND_GRAY, BACKGROUND_GRAY, BACKGROUND_GRAY, 255)
        );
        let corner = fb.pixel(0, 0).unwrap();
        assert_eq!(corner, Rgba8::new(BACKGROUND_GRAY, BACKGROUND_GRAY, BACKGROUND_GRAY, 255));
    }

    proptest! {
        #[test]
        fn prop_parser_never_panics(line in ".{0,64}") {
            let _ = parse_reading(&line);
        }

        #[test]
        fn prop_parsed_values_are_finite(line in "[XYZ:0-9.eE+ -]{0,40}") {
            let reading = parse_reading(&line);
            for value in [reading.x, reading.y, reading.z].into_iter().flatten() {
                prop_assert!(value.is_finite());
            }
        }

        #[test]
        fn prop_decoder_is_chunking_independent(
            text in "[a-zA-Z0-9:,. \n]{0,120}",
            chunk in 1usize..16,
        ) {
            let mut whole = LineDecoder::new();
            let mut expected = whole.push(text.as_bytes());
            expected.extend(whole.finish());

            let mut split = LineDecoder::new();
            let mut actual = Vec::new();
            for piece in text.as_bytes().chunks(chunk) {
                actual.extend(split.push(piece));
            }
            actual.extend(split.finish());

            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn prop_brush_stays_on_canvas(
            readings in prop::collection::vec((0.0f64..2.0, 0.0f64..2.5, 0.0f64..2.5), 1..40),
            width in 10.0f32..500.0,
            height in 10.0f32..500.0,
            dt in 0.0f32..0.25,
        ) {
            let size = vec2(width, height);
            let mut brush = BrushState::new(Thresholds::default(), size);
            for (x, y, z) in readings {
                brush.ingest(&parse_reading(&format!("X: {x:.3}, Y: {y:.3}, Z: {z:.3}")));
                brush.step(dt, size);
                let p = brush.position();
                prop_assert!(p.x >= 0.0 && p.x <= width);
                prop_assert!(p.y >= 0.0 && p.y <= height);
            }
        }

        #[test]
        fn prop_scrollback_respects_capacity(
            capacity in 0usize..20,
            messages in prop::collection::vec("[a-z ]{0,10}", 0..60),
        ) {
            let mut log = ScrollbackLog::new(capacity);
            for message in &messages {
                log.push(message);
            }
            prop_assert!(log.len() <= capacity.max(1));
            prop_assert_eq!(log.len(), messages.len().min(capacity.max(1)));
        }
    }
}
