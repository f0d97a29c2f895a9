use crate::ir::FLOW_DOWN;

use super::error::RouteError;
use super::types::{BoxData, Bounds, RejectReason, RouteCandidate, RouteStrategy, RoutingPlan};

// ── Endpoint geometry ───────────────────────────────────────────────
/// Inset applied where an arrow enters a box, so the head clears the stroke.
const STROKE_ADJUSTMENT: i32 = 2;

// ── Collision detection ─────────────────────────────────────────────
/// Padding added on every side of an obstacle box.
const BOX_COLLISION_BUFFER: i32 = 3;

// ── Scoring ─────────────────────────────────────────────────────────
const NARROW_TO_WIDE_PENALTY: i32 = 50;
/// Manhattan distance beyond which the distance penalty stops growing.
const DISTANCE_CAP: i32 = 500;
const DISTANCE_PENALTY_MAX: i32 = 50;
const DISTANCE_PENALTY_DIVISOR: i32 = 10;

/// Routes one arrow between two placed boxes.
///
/// Every applicable strategy yields a candidate; those whose polyline crosses
/// a box other than the two endpoints are rejected but kept for diagnostics.
/// The best scoring survivor wins, ties going to the earlier candidate.
pub fn route_arrow(
    from: &BoxData,
    to: &BoxData,
    boxes: &[BoxData],
    flow: Option<&str>,
) -> Result<RoutingPlan, RouteError> {
    let flow_down = flow == Some(FLOW_DOWN);
    let mut candidates = generate_candidates(from, to, flow_down);

    let exclude = [from.id.as_str(), to.id.as_str()];
    let (width1, width2) = (from.width, to.width);
    for candidate in &mut candidates {
        if check_path_collision(&candidate.points, boxes, exclude) {
            candidate.rejected = Some(RejectReason::CollisionDetected);
        } else {
            candidate.score = Some(score_route(candidate, width1, width2, flow_down));
        }
    }

    match select_best(&candidates) {
        Some(selected) => Ok(RoutingPlan {
            candidates,
            selected,
        }),
        None => Err(RouteError::NoValidRoute {
            from: from.id.clone(),
            to: to.id.clone(),
        }),
    }
}

/// Candidates in a fixed order, which also settles score ties.
pub(super) fn generate_candidates(
    from: &BoxData,
    to: &BoxData,
    flow_down: bool,
) -> Vec<RouteCandidate> {
    let b1 = from.bounds();
    let b2 = to.bounds();
    let same_column = from.grid_x == to.grid_x;
    let same_row = from.grid_y == to.grid_y;
    let going_down = to.grid_y > from.grid_y;
    let forward = to.grid_x > from.grid_x;
    let mut candidates = Vec::new();

    // Vertical exit/entry shared by the vertical strategies.
    let (exit_y, entry_y) = if going_down {
        (b1.y2, b2.y1 - STROKE_ADJUSTMENT)
    } else {
        (b1.y1, b2.y2 + STROKE_ADJUSTMENT)
    };
    // Horizontal exit/entry shared by the horizontal strategies.
    let (exit_x, entry_x) = if forward {
        (b1.x2, b2.x1 - STROKE_ADJUSTMENT)
    } else {
        (b1.x1, b2.x2 + STROKE_ADJUSTMENT)
    };

    if same_column && !same_row {
        candidates.push(candidate(
            RouteStrategy::StraightVertical,
            true,
            vec![(b1.center_x(), exit_y), (b2.center_x(), entry_y)],
        ));

        let sx = if to.grid_x >= from.grid_x { b1.x2 } else { b1.x1 };
        let sy = b1.center_y();
        let ex = b2.center_x();
        candidates.push(candidate(
            RouteStrategy::TwoSegmentHorizontalFirst,
            false,
            vec![(sx, sy), (ex, sy), (ex, entry_y)],
        ));
    }

    if !same_row {
        let sx = b1.center_x();
        let ey = b2.center_y();
        let ex = if forward {
            b2.x1 - STROKE_ADJUSTMENT
        } else {
            b2.x2 + STROKE_ADJUSTMENT
        };
        candidates.push(candidate(
            RouteStrategy::TwoSegmentVerticalFirst,
            true,
            vec![(sx, exit_y), (sx, ey), (ex, ey)],
        ));
    }

    if !same_column && !same_row {
        candidates.push(candidate(
            RouteStrategy::ThreeSegmentHorizontalFirst,
            false,
            horizontal_z(&b1, &b2, exit_x, entry_x),
        ));
    }

    if !same_column {
        let has_gap = (forward && exit_x < entry_x) || (!forward && exit_x > entry_x);
        if has_gap {
            candidates.push(candidate(
                RouteStrategy::NonOverlappingHorizontal,
                false,
                horizontal_z(&b1, &b2, exit_x, entry_x),
            ));
        }
    }

    if !same_column && !same_row && flow_down {
        let (sx, ex) = (b1.center_x(), b2.center_x());
        let mid_y = (exit_y + entry_y) / 2;
        candidates.push(candidate(
            RouteStrategy::ThreeSegmentVerticalFirst,
            true,
            vec![(sx, exit_y), (sx, mid_y), (ex, mid_y), (ex, entry_y)],
        ));
    }

    candidates
}

/// Horizontal, vertical, horizontal, turning at the midpoint between the
/// exit and entry columns.
fn horizontal_z(b1: &Bounds, b2: &Bounds, sx: i32, ex: i32) -> Vec<(i32, i32)> {
    let mid_x = (sx + ex) / 2;
    let (sy, ey) = (b1.center_y(), b2.center_y());
    vec![(sx, sy), (mid_x, sy), (mid_x, ey), (ex, ey)]
}

fn candidate(
    strategy: RouteStrategy,
    vertical_first: bool,
    points: Vec<(i32, i32)>,
) -> RouteCandidate {
    let (start_x, start_y) = points.first().copied().unwrap_or_default();
    let (end_x, end_y) = points.last().copied().unwrap_or_default();
    RouteCandidate {
        strategy,
        start_x,
        start_y,
        end_x,
        end_y,
        vertical_first,
        points,
        score: None,
        rejected: None,
    }
}

/// True when the axis-aligned segment `a`-`b` touches any box not in
/// `exclude`, each box inflated by the collision buffer.
pub fn check_segment_collision(
    a: (i32, i32),
    b: (i32, i32),
    boxes: &[BoxData],
    exclude: [&str; 2],
) -> bool {
    let (x1, x2) = (a.0.min(b.0), a.0.max(b.0));
    let (y1, y2) = (a.1.min(b.1), a.1.max(b.1));
    boxes
        .iter()
        .filter(|obstacle| !exclude.contains(&obstacle.id.as_str()))
        .any(|obstacle| {
            let left = obstacle.x - BOX_COLLISION_BUFFER;
            let right = obstacle.x + obstacle.width + BOX_COLLISION_BUFFER;
            let top = obstacle.y - BOX_COLLISION_BUFFER;
            let bottom = obstacle.y + obstacle.height + BOX_COLLISION_BUFFER;
            x1 <= right && x2 >= left && y1 <= bottom && y2 >= top
        })
}

pub fn check_path_collision(points: &[(i32, i32)], boxes: &[BoxData], exclude: [&str; 2]) -> bool {
    points
        .windows(2)
        .any(|segment| check_segment_collision(segment[0], segment[1], boxes, exclude))
}

/// The larger box is over three times as wide as the narrower one.
fn is_narrow_to_wide(width1: i32, width2: i32) -> bool {
    let narrower = width1.min(width2);
    narrower > 0 && (width1 - width2).abs() > narrower * 2
}

/// Higher is better.
pub fn score_route(candidate: &RouteCandidate, width1: i32, width2: i32, flow_down: bool) -> i32 {
    let narrow_to_wide = is_narrow_to_wide(width1, width2);
    let mut score = match candidate.strategy {
        RouteStrategy::StraightVertical if narrow_to_wide => 100 - NARROW_TO_WIDE_PENALTY,
        RouteStrategy::StraightVertical => 100,
        RouteStrategy::NonOverlappingHorizontal => 90,
        RouteStrategy::TwoSegmentVerticalFirst => 80,
        RouteStrategy::TwoSegmentHorizontalFirst if narrow_to_wide => 95,
        RouteStrategy::TwoSegmentHorizontalFirst => 75,
        RouteStrategy::ThreeSegmentHorizontalFirst | RouteStrategy::ThreeSegmentVerticalFirst => {
            70
        }
    };

    let distance =
        (candidate.end_x - candidate.start_x).abs() + (candidate.end_y - candidate.start_y).abs();
    score -= if distance > DISTANCE_CAP {
        DISTANCE_PENALTY_MAX
    } else {
        distance / DISTANCE_PENALTY_DIVISOR
    };

    if flow_down {
        score += match candidate.strategy {
            RouteStrategy::StraightVertical => 30,
            RouteStrategy::ThreeSegmentVerticalFirst => 40,
            RouteStrategy::TwoSegmentVerticalFirst => 15,
            _ => 0,
        };
    }
    score
}

/// Index of the highest scoring candidate; the first one wins a tie.
fn select_best(candidates: &[RouteCandidate]) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let Some(score) = candidate.score else {
            continue;
        };
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}
