use control_diagram::config::LayoutConfig;
use control_diagram::ir::{ArrowSpec, BoxSpec, DiagramSpec};
use control_diagram::layout::{RouteStrategy, check_path_collision};
use control_diagram::parser::parse_number_or_fraction;
use control_diagram::{LayoutOptions, NumberError, compute_layout, parse_diagram};
use proptest::prelude::*;
use std::collections::HashMap;

// ===================
// Strategies
// ===================

fn grid_strategy() -> impl Strategy<Value = (i32, i32)> {
    (1i32..8, 1i32..8)
}

fn stretch_strategy() -> impl Strategy<Value = f64> {
    0.5f64..2.0
}

fn diagram_strategy() -> impl Strategy<Value = DiagramSpec> {
    (
        prop::collection::btree_set(grid_strategy(), 2..7),
        prop::collection::vec((0usize..7, 0usize..7), 1..6),
    )
        .prop_map(|(cells, pairs)| {
            let boxes: Vec<BoxSpec> = cells
                .into_iter()
                .enumerate()
                .map(|(i, (x, y))| BoxSpec::new(&format!("n{i}"), x, y, "Node"))
                .collect();
            let count = boxes.len();
            let arrows = pairs
                .into_iter()
                .map(|(a, b)| (a % count, b % count))
                .filter(|(a, b)| a != b)
                .map(|(a, b)| ArrowSpec::new(&boxes[a].id, &boxes[b].id))
                .collect();
            DiagramSpec {
                boxes,
                arrows,
                groups: Vec::new(),
            }
        })
}

fn layout_boxes(boxes: Vec<BoxSpec>, config: &LayoutConfig) -> Vec<(i32, i32)> {
    let spec = DiagramSpec {
        boxes,
        arrows: Vec::new(),
        groups: Vec::new(),
    };
    let (layout, _) = compute_layout(&spec, config, &LayoutOptions::default());
    layout.boxes.iter().map(|b| (b.x, b.y)).collect()
}

// ===================
// Property Test Functions
// ===================

/// Later columns and rows always land further right and further down.
fn check_pixels_are_monotonic(a: (i32, i32), b: (i32, i32), stretch: f64) -> Result<(), TestCaseError> {
    let config = LayoutConfig {
        stretch,
        ..LayoutConfig::default()
    };
    let placed = layout_boxes(
        vec![BoxSpec::new("a", a.0, a.1, "A"), BoxSpec::new("b", b.0, b.1, "B")],
        &config,
    );
    let (pa, pb) = (placed[0], placed[1]);
    prop_assert_eq!(a.0 < b.0, pa.0 < pb.0);
    prop_assert_eq!(a.0 == b.0, pa.0 == pb.0);
    prop_assert_eq!(a.1 < b.1, pa.1 < pb.1);
    prop_assert_eq!(a.1 == b.1, pa.1 == pb.1);
    Ok(())
}

/// A chain of relative boxes ends at the start plus every offset.
fn check_relative_chain_adds_up(
    start: (i32, i32),
    offsets: Vec<(i32, i32)>,
) -> Result<(), TestCaseError> {
    let mut source = format!("s: {},{}: Start\n", start.0, start.1);
    for (dx, dy) in &offsets {
        source.push_str(&format!("+{dx},+{dy}: Step\n"));
    }
    let spec = parse_diagram(&source, &HashMap::new()).map_err(|e| TestCaseError::fail(e.to_string()))?;
    let last = spec.boxes.last().ok_or_else(|| TestCaseError::fail("no boxes"))?;
    let sum = offsets
        .iter()
        .fold(start, |(x, y), (dx, dy)| (x + dx, y + dy));
    prop_assert_eq!((last.grid_x, last.grid_y), sum);
    prop_assert_eq!(spec.boxes.len(), offsets.len() + 1);
    Ok(())
}

fn check_fraction_matches_division(numerator: u32, denominator: u32) -> Result<(), TestCaseError> {
    let parsed = parse_number_or_fraction(&format!("{numerator}/{denominator}"))
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(parsed, numerator as f64 / denominator as f64);

    let by_zero = parse_number_or_fraction(&format!("{numerator}/0"));
    prop_assert!(matches!(by_zero, Err(NumberError::DivisionByZero(_))));
    Ok(())
}

/// With the offset equal to the width, a touching box starts exactly where
/// its grown predecessor ends.
fn check_touch_left_is_flush(start: (i32, i32), width: i32) -> Result<(), TestCaseError> {
    let source = format!(
        "a: {},{},{width}: A\nb: |+{width},0,{width}: B\n",
        start.0, start.1
    );
    let spec = parse_diagram(&source, &HashMap::new()).map_err(|e| TestCaseError::fail(e.to_string()))?;
    let (layout, geometry) = compute_layout(&spec, &LayoutConfig::default(), &LayoutOptions::default());
    let (a, b) = (&layout.boxes[0], &layout.boxes[1]);
    prop_assert_eq!(a.x + a.width, b.x);
    prop_assert_eq!(geometry["a"].x + geometry["a"].width, geometry["b"].x);
    prop_assert_eq!(a.width, b.width);
    Ok(())
}

/// The chosen route never crosses a box other than its two endpoints, and it
/// is the first of the best scoring survivors.
fn check_selected_route_is_clear(spec: DiagramSpec) -> Result<(), TestCaseError> {
    let (layout, geometry) = compute_layout(&spec, &LayoutConfig::default(), &LayoutOptions::default());
    let boxes: Vec<_> = geometry.values().cloned().collect();
    for arrow in &layout.arrows {
        let exclude = [arrow.from.as_str(), arrow.to.as_str()];
        prop_assert!(!check_path_collision(&arrow.points, &boxes, exclude));

        let winner = &arrow.candidates[arrow.selected];
        prop_assert!(!winner.is_rejected());
        let best = arrow.candidates.iter().filter_map(|c| c.score).max();
        prop_assert_eq!(winner.score, best);
        let first_best = arrow.candidates.iter().position(|c| c.score == best);
        prop_assert_eq!(first_best, Some(arrow.selected));

        for candidate in &arrow.candidates {
            prop_assert_eq!(candidate.is_rejected(), candidate.score.is_none());
        }
    }
    prop_assert!(layout.arrows.len() <= spec.arrows.len());
    Ok(())
}

/// Two lone boxes stacked in one column always connect with a single segment.
fn check_same_column_is_straight(column: i32, rows: (i32, i32)) -> Result<(), TestCaseError> {
    let spec = DiagramSpec {
        boxes: vec![
            BoxSpec::new("a", column, rows.0, "A"),
            BoxSpec::new("b", column, rows.1, "B"),
        ],
        arrows: vec![ArrowSpec::new("a", "b")],
        groups: Vec::new(),
    };
    let (layout, _) = compute_layout(&spec, &LayoutConfig::default(), &LayoutOptions::default());
    prop_assert_eq!(layout.arrows.len(), 1);
    let arrow = &layout.arrows[0];
    prop_assert_eq!(arrow.strategy, RouteStrategy::StraightVertical);
    prop_assert_eq!(arrow.segments, 1);
    prop_assert_eq!(arrow.start_x, arrow.end_x);
    Ok(())
}

// ===================
// Proptest Wrappers
// ===================

proptest! {
    #[test]
    fn pixels_are_monotonic(a in grid_strategy(), b in grid_strategy(), stretch in stretch_strategy()) {
        check_pixels_are_monotonic(a, b, stretch)?;
    }

    #[test]
    fn relative_chain_adds_up(
        start in grid_strategy(),
        offsets in prop::collection::vec((0i32..4, 0i32..4), 1..8),
    ) {
        check_relative_chain_adds_up(start, offsets)?;
    }

    #[test]
    fn fraction_matches_division(numerator in 0u32..1000, denominator in 1u32..1000) {
        check_fraction_matches_division(numerator, denominator)?;
    }

    #[test]
    fn touch_left_is_flush(start in grid_strategy(), width in 1i32..5) {
        check_touch_left_is_flush(start, width)?;
    }

    #[test]
    fn selected_route_is_clear(spec in diagram_strategy()) {
        check_selected_route_is_clear(spec)?;
    }

    #[test]
    fn same_column_is_straight(
        column in 1i32..8,
        rows in (1i32..8, 1i32..8).prop_filter("distinct rows", |(a, b)| a != b),
    ) {
        check_same_column_is_straight(column, rows)?;
    }
}
