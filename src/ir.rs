/// Prefix of the ids generated for boxes declared without an explicit id.
pub const INTERNAL_ID_PREFIX: &str = "_box_";

pub const DEFAULT_GRID_WIDTH: f64 = 2.0;
pub const DEFAULT_GRID_HEIGHT: i32 = 1;
pub const MIN_GRID_WIDTH: f64 = 0.2;
pub const MIN_GRID_HEIGHT: i32 = 1;
/// Upper bound for grid X/Y, width and height; keeps pixel math within `i32`.
pub const MAX_GRID_COORDINATE: i32 = 1000;
pub const MAX_GRID_WIDTH: f64 = MAX_GRID_COORDINATE as f64;
pub const MAX_GRID_HEIGHT: i32 = MAX_GRID_COORDINATE;

/// Flow hint value that biases routing towards vertical strategies.
pub const FLOW_DOWN: &str = "down";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxStyle {
    pub background: Option<String>,
    pub border_color: Option<String>,
    pub border_width: Option<u32>,
    pub font_size: Option<u32>,
    pub text_color: Option<String>,
}

/// A box as declared in the source, in grid units.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSpec {
    pub id: String,
    pub grid_x: i32,
    pub grid_y: i32,
    pub grid_width: f64,
    pub grid_height: i32,
    pub label: String,
    pub style: BoxStyle,
    /// Render flush against the previous box (`|` prefix).
    pub touch_left: bool,
    pub group: Option<String>,
}

impl BoxSpec {
    pub fn new(id: &str, grid_x: i32, grid_y: i32, label: &str) -> Self {
        Self {
            id: id.to_string(),
            grid_x,
            grid_y,
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            label: label.to_string(),
            style: BoxStyle::default(),
            touch_left: false,
            group: None,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.id.starts_with(INTERNAL_ID_PREFIX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrowSpec {
    pub from: String,
    pub to: String,
    /// Per-arrow flow hint; overrides the diagram-wide hint when set.
    pub flow: Option<String>,
}

impl ArrowSpec {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            flow: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDef {
    pub name: String,
    pub label: String,
    pub box_ids: Vec<String>,
}

/// The purely logical diagram: grid positions only, no pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramSpec {
    pub boxes: Vec<BoxSpec>,
    pub arrows: Vec<ArrowSpec>,
    pub groups: Vec<GroupDef>,
}

impl DiagramSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_grid(&self) -> (i32, i32) {
        self.boxes.iter().fold((0, 0), |(max_x, max_y), b| {
            (max_x.max(b.grid_x), max_y.max(b.grid_y))
        })
    }
}

/// A legend row mapping a style code to its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub style: String,
    pub label: String,
}
