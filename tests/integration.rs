use std::cell::RefCell;
use std::rc::Rc;

use hill_viewer::interaction::HoverState;
use hill_viewer::mesh::MeshError;
use hill_viewer::options::ViewerOptions;
use hill_viewer::parse::{MeshPayload, ParseError, SoilMapPayload, model_from_json};
use hill_viewer::render::{Palette, SvgSurface};
use hill_viewer::spatial::{GridIndex, LinearScan, NodeLocator};
use hill_viewer::view::{PixelPoint, Transform, Viewport};
use hill_viewer::viewer::{LoadOutcome, Viewer, ViewerError};

macro_rules! fixture {
    ($name:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/", $name))
    };
}

fn payloads(mesh: &str, soil: &str) -> (MeshPayload, SoilMapPayload) {
    (
        serde_json::from_str(mesh).expect("mesh fixture"),
        serde_json::from_str(soil).expect("soil fixture"),
    )
}

fn unit_viewer() -> Viewer {
    let (mesh, soil) = payloads(fixture!("unit_mesh.json"), fixture!("unit_soil.json"));
    let mut viewer = Viewer::new(ViewerOptions::default()).expect("default options");
    viewer.set_viewport(400.0, 400.0);
    let outcome = viewer.load_payloads(1, &mesh, &soil).expect("valid payloads");
    assert_eq!(outcome, LoadOutcome::Applied);
    viewer
}

#[test]
fn unit_grid_end_to_end() {
    let mut viewer = unit_viewer();
    let palette = Palette::default();

    let frame = viewer.frame().expect("frame after load");
    assert_eq!(frame.quads.len(), 4);
    assert_eq!(frame.quad(0, 0).expect("quad").fill, palette.color_for(0));
    assert_eq!(frame.quad(1, 1).expect("quad").fill, palette.color_for(0));
    assert_eq!(frame.quad(0, 1).expect("quad").fill, palette.color_for(1));

    let transform = viewer.transform().expect("transform after load");
    let origin = transform.to_pixel(0.0, 0.0);
    assert_eq!(origin, PixelPoint::new(40.0, 360.0));

    let seen: Rc<RefCell<Vec<Option<HoverState>>>> = Rc::default();
    let sink = Rc::clone(&seen);
    viewer.on_hover_change(move |hover| sink.borrow_mut().push(hover.cloned()));

    assert!(viewer.pointer_move(origin));
    let hover = viewer.hover().expect("hover at node (0, 0)");
    assert_eq!((hover.row, hover.col), (0, 0));
    assert_eq!(hover.category, 0);
    assert_eq!(hover.distance, 0.0);

    assert!(viewer.pointer_leave());
    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].as_ref().map(|h| (h.row, h.col)), Some((0, 0)));
    assert!(seen[1].is_none());
}

#[test]
fn svg_output_matches_the_frame() {
    let viewer = unit_viewer();
    let mut svg = SvgSurface::new();
    let diagnostics = viewer.render(&mut svg).expect("svg render");
    assert_eq!(diagnostics.element_count, 4);
    assert_eq!(diagnostics.category_count, 2);
    assert_eq!((diagnostics.width, diagnostics.height), (400, 400));
    assert_eq!(svg.as_str().matches("<polygon").count(), 4);
    assert_eq!(svg.as_str().matches(r##"fill="#475569""##).count(), 2);
}

#[test]
fn every_node_lands_inside_the_padded_viewport() {
    let model = model_from_json(fixture!("column_major_mesh.json"), fixture!("column_major_soil.json"))
        .expect("column-major fixture");
    for (width, height) in [(400.0, 300.0), (1280.0, 720.0), (90.0, 1000.0)] {
        let viewport = Viewport::with_padding(width, height, 40.0);
        let transform = Transform::fit(model.mesh(), viewport);
        for node in model.mesh().nodes() {
            let p = transform.node_to_pixel(&node);
            assert!(p.x >= 40.0 - 1e-9 && p.x <= width - 40.0 + 1e-9, "{p:?}");
            assert!(p.y >= 40.0 - 1e-9 && p.y <= height - 40.0 + 1e-9, "{p:?}");
        }
    }
}

#[test]
fn column_major_payloads_are_transposed() {
    let model = model_from_json(fixture!("column_major_mesh.json"), fixture!("column_major_soil.json"))
        .expect("column-major fixture");
    assert_eq!((model.mesh().rows(), model.mesh().cols()), (3, 4));
    let node = model.node(2, 3).expect("corner node");
    assert_eq!((node.x, node.z), (30.0, 4.0));
    assert_eq!(model.categories().shape(), (2, 3));
    assert_eq!(model.categories().get(1, 0), Ok(4));
    assert_eq!(model.categories().unique_ids(), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn mismatched_category_map_is_rejected() {
    let err = model_from_json(fixture!("square_mesh.json"), fixture!("mismatched_soil.json"))
        .expect_err("3x4 map on a 5x5 mesh");
    match err {
        ParseError::Mesh(MeshError::ShapeMismatch {
            expected, actual, ..
        }) => {
            assert_eq!(expected, (4, 4));
            assert_eq!(actual, (3, 4));
        }
        other => panic!("expected ShapeMismatch, got {other:?}"),
    }
}

#[test]
fn single_row_mesh_is_degenerate() {
    let err = model_from_json(fixture!("flat_mesh.json"), fixture!("unit_soil.json"))
        .expect_err("1x5 mesh");
    assert!(matches!(
        err,
        ParseError::Mesh(MeshError::DegenerateMesh { rows: 1, cols: 5 })
    ));
}

#[test]
fn rejected_payload_keeps_the_previous_hill() {
    let mut viewer = unit_viewer();
    let (mesh, soil) = payloads(fixture!("square_mesh.json"), fixture!("mismatched_soil.json"));
    let err = viewer.load_payloads(1, &mesh, &soil).expect_err("shape mismatch");
    assert!(matches!(err, ViewerError::Parse(_)));
    assert_eq!(viewer.model().expect("previous model").mesh().rows(), 3);
}

#[test]
fn switching_hills_discards_the_slow_response() {
    let mut viewer = Viewer::new(ViewerOptions::default()).expect("default options");
    viewer.set_viewport(400.0, 400.0);
    viewer.select_hill(1);
    viewer.select_hill(2);

    let (mesh, soil) = payloads(fixture!("unit_mesh.json"), fixture!("unit_soil.json"));
    let late = viewer.load_payloads(1, &mesh, &soil).expect("stale loads are not errors");
    assert_eq!(
        late,
        LoadOutcome::Discarded {
            requested: 1,
            selected: 2
        }
    );
    assert!(viewer.model().is_none());

    let (mesh, soil) = payloads(fixture!("column_major_mesh.json"), fixture!("column_major_soil.json"));
    assert!(viewer.load_payloads(2, &mesh, &soil).expect("valid").is_applied());
    assert_eq!(viewer.loaded_hill(), Some(2));
}

#[test]
fn options_fixture_drives_the_viewer() {
    let options: ViewerOptions = serde_json::from_str(fixture!("options.json")).expect("options");
    let mut viewer = Viewer::new(options).expect("valid options");
    viewer.set_viewport(200.0, 200.0);
    let (mesh, soil) = payloads(fixture!("unit_mesh.json"), fixture!("unit_soil.json"));
    viewer.load_payloads(5, &mesh, &soil).expect("valid");

    // padding 20: node (2, 2) sits at (180, 20).
    assert!(!viewer.pointer_move(PixelPoint::new(188.0, 20.0)));
    assert!(viewer.pointer_move(PixelPoint::new(186.0, 20.0)));
    let text = viewer.inspector().expect("tooltip").to_string();
    assert_eq!(text, "Index: [2, 2]\nX-Coord: 2.00 m\nZ-Coord: 2.00 m\nSoil ID: 0");
}

#[test]
fn grid_and_linear_locators_agree_on_fixtures() {
    let model = model_from_json(fixture!("column_major_mesh.json"), fixture!("column_major_soil.json"))
        .expect("fixture");
    let transform = Transform::fit(model.mesh(), Viewport::new(640.0, 480.0));
    let scan = LinearScan::new(model.mesh(), transform);
    let grid = GridIndex::build(model.mesh(), transform, 12.0);

    for y in (0..480).step_by(7) {
        for x in (0..640).step_by(11) {
            let pixel = PixelPoint::new(f64::from(x), f64::from(y));
            let a = scan.nearest(pixel, 25.0);
            let b = grid.nearest(pixel, 25.0);
            assert_eq!(a, b, "at {pixel:?}");
        }
    }
}
