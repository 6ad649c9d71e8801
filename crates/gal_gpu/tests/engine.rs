//! Engine behaviour checked through the tessellated frame

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use gal_core::{Color, DrawContext, FillRule, GroupContext, LineCap, Point, Vec2};
use gal_gpu::tessellator::arc_sweep;
use gal_gpu::{DrawCall, EngineConfig, GalEngine, Mesh, UnitTables};

/// Engine whose world coordinates equal screen pixels
fn pixel_engine() -> GalEngine {
    let mut engine = GalEngine::default();
    engine.set_look_at_point(Point::new(400.0, 300.0));
    engine.begin_drawing();
    engine
}

fn frame_mesh(engine: &mut GalEngine) -> Mesh {
    engine.end_drawing();
    engine.resolved_frame()
}

#[test]
fn arc_points_match_sweep() {
    let tables = UnitTables::shared();
    for (start, end) in [(0.0, 1.0), (5.5, 0.5), (-FRAC_PI_2, PI), (1.0, 1.0 + 3.0 * TAU)] {
        let (from, sweep) = arc_sweep(start, end).unwrap();
        let points = tables.unit_arc(from, sweep);

        let expected_segments = (sweep / tables.angle_step() - 1e-9).ceil().max(1.0) as usize;
        assert_eq!(points.len(), expected_segments + 1, "arc {start}..{end}");

        let first = points[0];
        let last = points[points.len() - 1];
        assert!(first.distance(Vec2::from_angle(start)) < 1e-9);
        if sweep < TAU {
            assert!(last.distance(Vec2::from_angle(end)) < 1e-9);
        }
    }
}

#[test]
fn swapped_arc_is_complement() {
    for (start, end) in [(0.3, 2.0), (4.0, 1.0), (-1.0, 0.5)] {
        let (_, forward) = arc_sweep(start, end).unwrap();
        let (_, backward) = arc_sweep(end, start).unwrap();
        assert!((forward + backward - TAU).abs() < 1e-9);
    }

    let mut engine = pixel_engine();
    engine.set_line_width(2.0);
    engine.draw_arc(Point::new(400.0, 300.0), 50.0, 0.0, FRAC_PI_2);
    let quarter = frame_mesh(&mut engine);

    let mut engine = pixel_engine();
    engine.set_line_width(2.0);
    engine.draw_arc(Point::new(400.0, 300.0), 50.0, FRAC_PI_2, 0.0);
    let rest = frame_mesh(&mut engine);

    let at = |angle: f64| Point::new(400.0, 300.0) + Vec2::from_angle(angle) * 50.0;
    assert!(quarter.covers(at(FRAC_PI_4)));
    assert!(!quarter.covers(at(PI)));
    assert!(rest.covers(at(PI)));
    assert!(!rest.covers(at(FRAC_PI_4)));
}

#[test]
fn zero_sweep_arc_is_noop() {
    let mut engine = pixel_engine();
    engine.set_fill_enabled(true);
    engine.draw_arc(Point::new(400.0, 300.0), 50.0, 1.0, 1.0);
    engine.draw_arc(Point::new(400.0, 300.0), 50.0, 1.0, 1.0 + TAU);
    let mesh = frame_mesh(&mut engine);
    // only the full circle from the second call
    assert!(mesh.covers(Point::new(400.0, 300.0)));
}

#[test]
fn stroked_arc_gets_caps() {
    let mut engine = pixel_engine();
    engine.set_line_width(10.0);
    engine.set_line_cap(LineCap::Square);
    engine.draw_arc(Point::new(400.0, 300.0), 50.0, 0.0, FRAC_PI_2);
    let mesh = frame_mesh(&mut engine);
    // square cap at the start extends 5px backwards from (450, 300)
    assert!(mesh.covers(Point::new(450.0, 297.0)));
}

#[test]
fn invisible_paint_is_noop() {
    let mut engine = pixel_engine();
    engine.set_fill_enabled(false);
    engine.set_stroke_enabled(false);
    engine.draw_line(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
    engine.draw_circle(Point::new(5.0, 5.0), 3.0);
    engine.draw_polygon(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)]);
    let frame = engine.end_drawing();
    assert!(frame.is_empty());
    assert!(frame.mesh.is_empty());
}

#[test]
fn fill_and_stroke_are_independent() {
    let mut engine = pixel_engine();
    engine.set_stroke_enabled(false);
    engine.set_fill_enabled(true);
    engine.set_fill_color(Color::RED);
    engine.draw_rectangle(Point::new(10.0, 10.0), Point::new(20.0, 20.0));
    let mesh = frame_mesh(&mut engine);
    assert!(mesh.vertices.iter().all(|v| v.color == Color::RED.to_array()));
    assert!((mesh.area() - 100.0).abs() < 1e-6);

    let mut engine = pixel_engine();
    engine.set_stroke_enabled(true);
    engine.set_fill_enabled(false);
    engine.set_stroke_color(Color::GREEN);
    engine.draw_rectangle(Point::new(10.0, 10.0), Point::new(20.0, 20.0));
    let mesh = frame_mesh(&mut engine);
    assert!(mesh.vertices.iter().all(|v| v.color == Color::GREEN.to_array()));
    assert!(!mesh.covers(Point::new(15.0, 15.0)));
}

#[test]
fn polygon_with_hole() {
    let outer = vec![
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        Point::new(100.0, 100.0),
        Point::new(0.0, 100.0),
    ];
    // Opposite winding so the hole also works under nonzero
    let hole = vec![
        Point::new(25.0, 25.0),
        Point::new(25.0, 75.0),
        Point::new(75.0, 75.0),
        Point::new(75.0, 25.0),
    ];

    for rule in [FillRule::NonZero, FillRule::EvenOdd] {
        let mut engine = pixel_engine();
        engine.set_stroke_enabled(false);
        engine.set_fill_enabled(true);
        engine.set_fill_rule(rule);
        engine.draw_poly_contours(&[outer.clone(), hole.clone()]);
        let mesh = frame_mesh(&mut engine);
        assert!(mesh.covers(Point::new(10.0, 10.0)), "{rule:?}");
        assert!(!mesh.covers(Point::new(50.0, 50.0)), "{rule:?}");
        assert!((mesh.area() - 7500.0).abs() < 1e-2, "{rule:?}");
    }
}

#[test]
fn group_replay_is_idempotent() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut engine = pixel_engine();
    let group = engine.begin_group().unwrap();
    engine.draw_circle(Point::new(100.0, 100.0), 20.0);
    engine.draw_line(Point::new(0.0, 0.0), Point::new(50.0, 50.0));
    engine.end_group().unwrap();

    let recorded = engine.groups().get(group).unwrap().clone();
    assert!(!recorded.is_empty());
    // nothing reached the frame while recording
    assert!(engine.frame().mesh.is_empty());

    engine.draw_group(group);
    // replay ignores the current transform
    engine.translate(Vec2::new(500.0, 0.0));
    engine.draw_group(group);
    let mesh = frame_mesh(&mut engine);

    assert_eq!(mesh.vertices.len(), 2 * recorded.vertices.len());
    let (first, second) = mesh.vertices.split_at(recorded.vertices.len());
    assert_eq!(first, recorded.vertices.as_slice());
    assert_eq!(second, recorded.vertices.as_slice());

    // and again in the next frame
    engine.begin_drawing();
    engine.draw_group(group);
    let mesh = frame_mesh(&mut engine);
    assert_eq!(mesh.vertices, recorded.vertices);
}

#[test]
fn deleted_group_is_not_drawn() {
    let mut engine = pixel_engine();
    let group = engine.begin_group().unwrap();
    engine.draw_line(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
    engine.end_group().unwrap();

    engine.delete_group(group);
    assert!(!engine.is_group_valid(group));
    engine.draw_group(group);
    engine.delete_group(group);

    let frame = engine.end_drawing();
    assert!(!frame.calls.contains(&DrawCall::Group(group)));
    assert!(engine.resolved_frame().is_empty());
    assert_eq!(engine.groups_mut().take_released(), vec![group]);
}

#[test]
fn nested_group_is_rejected() {
    let mut engine = pixel_engine();
    let outer = engine.begin_group().unwrap();
    assert!(engine.begin_group().is_err());
    engine.end_group().unwrap();
    assert!(engine.end_group().is_err());
    assert!(engine.is_group_valid(outer));
}

#[test]
fn resize_scales_proportionally() {
    let draw = |engine: &mut GalEngine| {
        engine.begin_drawing();
        engine.set_line_width(1.5);
        engine.draw_line(Point::new(-30.0, 12.0), Point::new(45.0, -7.0));
        engine.draw_circle(Point::new(10.0, 10.0), 25.0);
        engine.end_drawing();
        engine.resolved_frame()
    };

    let mut engine = GalEngine::default();
    engine.resize_screen(800, 600).unwrap();
    let small = draw(&mut engine);

    engine.resize_screen(1600, 1200).unwrap();
    engine.set_zoom_factor(2.0);
    engine.compute_world_screen_matrix();
    let large = draw(&mut engine);

    assert_eq!(small.vertices.len(), large.vertices.len());
    for (a, b) in small.vertices.iter().zip(&large.vertices) {
        assert!((a.point() * 2.0).distance(b.point()) < 1e-3);
    }
}

#[test]
fn layers_map_to_depth() {
    let mut engine = pixel_engine();
    engine.set_layer_depth(10.0);
    engine.draw_line(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
    engine.set_layer_depth(-10.0);
    engine.draw_line(Point::new(0.0, 5.0), Point::new(10.0, 5.0));
    let mesh = frame_mesh(&mut engine);

    let back = mesh.vertices[0].depth();
    let front = mesh.vertices[mesh.vertices.len() - 1].depth();
    assert!(front < back);
}

#[test]
fn coarse_resolution_is_configurable() {
    let mut engine = GalEngine::new(EngineConfig::default().with_circle_points(16));
    engine.set_look_at_point(Point::new(400.0, 300.0));
    engine.begin_drawing();
    engine.set_stroke_enabled(false);
    engine.set_fill_enabled(true);
    engine.draw_circle(Point::new(0.0, 0.0), 10.0);
    let mesh = frame_mesh(&mut engine);
    assert_eq!(mesh.triangle_count(), 16);
}
