use crate::ir::LegendEntry;

/// Canvas size plus the per-cell factors the grid conversion uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
    pub left_margin: i32,
    pub bottom_margin: i32,
    pub top_margin: i32,
    /// Horizontal grid units per cell (box plus gap, stretched).
    pub cell_units: f64,
    pub vertical_cell_units: f64,
}

/// Pixel rectangle given by its corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Bounds {
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn center_x(&self) -> i32 {
        self.x1 + self.width() / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y1 + self.height() / 2
    }
}

/// Resolved geometry of one box, keyed by id for routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxData {
    pub id: String,
    pub grid_x: i32,
    pub grid_y: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub center_x: i32,
    pub center_y: i32,
}

impl BoxData {
    pub fn new(id: &str, grid: (i32, i32), x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            id: id.to_string(),
            grid_x: grid.0,
            grid_y: grid.1,
            x,
            y,
            width,
            height,
            center_x: x + width / 2,
            center_y: y + height / 2,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            x1: self.x,
            y1: self.y,
            x2: self.x + self.width,
            y2: self.y + self.height,
        }
    }

    pub(crate) fn extend_right(&mut self, amount: i32) {
        self.width += amount;
        self.center_x = self.x + self.width / 2;
    }
}

/// A box ready for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBox {
    pub id: String,
    pub grid_x: i32,
    pub grid_y: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub label: String,
    /// Label after wrapping, at most three lines.
    pub lines: Vec<String>,
    /// Fill: the explicit background or the row gradient.
    pub color: String,
    pub border_color: Option<String>,
    pub border_width: Option<u32>,
    pub font_size: Option<u32>,
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteStrategy {
    StraightVertical,
    TwoSegmentHorizontalFirst,
    TwoSegmentVerticalFirst,
    ThreeSegmentHorizontalFirst,
    NonOverlappingHorizontal,
    ThreeSegmentVerticalFirst,
}

impl RouteStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteStrategy::StraightVertical => "straight_vertical",
            RouteStrategy::TwoSegmentHorizontalFirst => "two_segment_horizontal_first",
            RouteStrategy::TwoSegmentVerticalFirst => "two_segment_vertical_first",
            RouteStrategy::ThreeSegmentHorizontalFirst => "three_segment_horizontal_first",
            RouteStrategy::NonOverlappingHorizontal => "non_overlapping_horizontal",
            RouteStrategy::ThreeSegmentVerticalFirst => "three_segment_vertical_first",
        }
    }
}

impl std::fmt::Display for RouteStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    CollisionDetected,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::CollisionDetected => "collision_detected",
        }
    }
}

/// One proposed path for an arrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCandidate {
    pub strategy: RouteStrategy,
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub vertical_first: bool,
    pub points: Vec<(i32, i32)>,
    /// Unset for rejected candidates.
    pub score: Option<i32>,
    pub rejected: Option<RejectReason>,
}

impl RouteCandidate {
    pub fn segments(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn is_rejected(&self) -> bool {
        self.rejected.is_some()
    }
}

/// Every candidate considered for one arrow and the one that won.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPlan {
    pub candidates: Vec<RouteCandidate>,
    pub selected: usize,
}

impl RoutingPlan {
    pub fn best(&self) -> &RouteCandidate {
        &self.candidates[self.selected]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrowLayout {
    pub from: String,
    pub to: String,
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub vertical_first: bool,
    pub segments: usize,
    pub strategy: RouteStrategy,
    pub points: Vec<(i32, i32)>,
    pub candidates: Vec<RouteCandidate>,
    /// Index of the winner in `candidates`.
    pub selected: usize,
}

impl ArrowLayout {
    pub(crate) fn from_plan(from: &str, to: &str, plan: RoutingPlan) -> Self {
        let best = plan.best().clone();
        Self {
            from: from.to_string(),
            to: to.to_string(),
            start_x: best.start_x,
            start_y: best.start_y,
            end_x: best.end_x,
            end_y: best.end_y,
            vertical_first: best.vertical_first,
            segments: best.segments(),
            strategy: best.strategy,
            points: best.points,
            candidates: plan.candidates,
            selected: plan.selected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLayout {
    pub label: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub box_ids: Vec<String>,
}

/// The resolved diagram handed to a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    pub boxes: Vec<PlacedBox>,
    pub arrows: Vec<ArrowLayout>,
    pub groups: Vec<GroupLayout>,
    pub legend: Vec<LegendEntry>,
}
