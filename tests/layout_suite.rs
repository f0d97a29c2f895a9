use std::path::Path;

use control_diagram::config::LayoutConfig;
use control_diagram::layout::{Layout, RouteStrategy};
use control_diagram::layout_dump::layout_dump_json;
use control_diagram::{LayoutOptions, ParseError, compute_layout, parse_diagram, parse_frontmatter};

fn layout_fixture(name: &str) -> Layout {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    let (frontmatter, body) = parse_frontmatter(&input);
    let spec = parse_diagram(&body, &frontmatter.colors).expect("parse failed");
    let options = LayoutOptions {
        legend: frontmatter.legend,
        flow: frontmatter.arrow_flow,
    };
    compute_layout(&spec, &LayoutConfig::default(), &options).0
}

#[test]
fn layout_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    for name in ["pipeline.txt", "container.txt", "unlabeled.txt"] {
        let layout = layout_fixture(name);
        assert!(!layout.boxes.is_empty(), "{name}: no boxes");
        for b in &layout.boxes {
            assert!(b.x >= 0 && b.x + b.width <= layout.width, "{name}: {} out of canvas", b.id);
            assert!(b.y >= 0 && b.y + b.height <= layout.height, "{name}: {} out of canvas", b.id);
        }
        let json = layout_dump_json(&layout).expect("dump failed");
        assert!(json.contains("\"diagram\""), "{name}: missing diagram");
    }
}

#[test]
fn pipeline_fixture() {
    let layout = layout_fixture("pipeline.txt");
    // 90 + 550 + 20 for the grid, plus 150 for the legend.
    assert_eq!((layout.width, layout.height), (810, 430));
    let ids: Vec<&str> = layout.boxes.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["plan", "build", "test", "deploy"]);

    let colors: Vec<&str> = layout.boxes.iter().map(|b| b.color.as_str()).collect();
    assert_eq!(colors, vec!["#D3D3D3", "#ecbae6", "#FFCE33", "#008080"]);

    let (test, deploy) = (&layout.boxes[2], &layout.boxes[3]);
    assert_eq!(test.x + test.width, deploy.x);
    assert_eq!(deploy.x, 365);

    let routed: Vec<(&str, &str, RouteStrategy)> = layout
        .arrows
        .iter()
        .map(|a| (a.from.as_str(), a.to.as_str(), a.strategy))
        .collect();
    assert_eq!(routed, vec![
        ("plan", "build", RouteStrategy::NonOverlappingHorizontal),
        ("plan", "test", RouteStrategy::StraightVertical),
        ("build", "deploy", RouteStrategy::StraightVertical),
    ]);

    assert_eq!(layout.groups.len(), 1);
    assert_eq!(layout.groups[0].label, "Release");
    assert_eq!(layout.groups[0].box_ids, vec!["test", "deploy"]);
    assert_eq!(layout.legend.len(), 2);
}

#[test]
fn container_fixture_routes_around_obstacle() {
    let layout = layout_fixture("container.txt");
    let grid: Vec<(i32, i32)> = layout.boxes.iter().map(|b| (b.grid_x, b.grid_y)).collect();
    assert_eq!(grid, vec![(2, 1), (2, 2), (4, 3)]);

    let arrow = &layout.arrows[0];
    let strategies: Vec<RouteStrategy> = arrow.candidates.iter().map(|c| c.strategy).collect();
    assert_eq!(strategies, vec![
        RouteStrategy::TwoSegmentVerticalFirst,
        RouteStrategy::ThreeSegmentHorizontalFirst,
        RouteStrategy::NonOverlappingHorizontal,
    ]);
    assert!(arrow.candidates[0].is_rejected());
    assert_eq!(arrow.selected, 2);
    assert_eq!(arrow.strategy, RouteStrategy::NonOverlappingHorizontal);
    assert_eq!((arrow.start_x, arrow.start_y), (490, 100));
    assert_eq!((arrow.end_x, arrow.end_y), (538, 400));
    // 90 base, minus 34 for 348px of travel.
    assert_eq!(arrow.candidates[2].score, Some(56));

    let value: serde_json::Value =
        serde_json::from_str(&layout_dump_json(&layout).unwrap()).unwrap();
    let dumped = &value["arrows"][0];
    assert_eq!(dumped["arrowType"], "two_bent");
    assert_eq!(dumped["arrowheadOrientation"], "right");
    assert_eq!(dumped["candidates"][0]["score"], serde_json::Value::Null);
    assert_eq!(dumped["candidates"][0]["rejectReason"], "collision_detected");
    assert_eq!(dumped["candidates"][2]["selected"], true);
}

#[test]
fn unlabeled_fixture() {
    let layout = layout_fixture("unlabeled.txt");
    let ids: Vec<&str> = layout.boxes.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["_box_0", "_box_1", "ops"]);
    assert_eq!(layout.boxes[0].label, "Intake: triage");
    assert_eq!(layout.boxes[1].height, 200);
    // 1.5 * 1.5 - 0.5 grid units.
    assert_eq!(layout.boxes[2].width, 175);
    assert_eq!(layout.arrows.len(), 1);
    assert_eq!(layout.arrows[0].from, "_box_0");
    assert_eq!(layout.arrows[0].to, "_box_1");
}

#[test]
fn malformed_sources_are_rejected() {
    let cases: [(&str, fn(&ParseError) -> bool); 6] = [
        ("a: 1,1: A\n---\nnot an arrow", |e: &ParseError| {
            matches!(e, ParseError::InvalidArrow { .. })
        }),
        ("a: 1,1: A\nb: 2,1: B\na -> ghost", |e: &ParseError| {
            matches!(e, ParseError::UnknownBox { .. })
        }),
        ("1,1: A\na: 2,1: B\n_box_0 -> a", |e: &ParseError| {
            matches!(e, ParseError::InternalIdInArrow { .. })
        }),
        ("g: 1,1 [\na: 0,0: A\n", |e: &ParseError| {
            matches!(e, ParseError::UnclosedContainer { .. })
        }),
        ("]", |e: &ParseError| matches!(e, ParseError::UnexpectedContainerClose)),
        ("a: 1,1: A\na: 2,1: B", |e: &ParseError| {
            matches!(e, ParseError::DuplicateId { .. })
        }),
    ];
    for (input, expected) in cases {
        let err = parse_diagram(input, &Default::default()).unwrap_err();
        assert!(expected(&err), "{input:?}: unexpected error {err}");
    }
}
