use crate::error::{Axis, NumberError, ParseError};
use crate::ir::{
    ArrowSpec, BoxSpec, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DiagramSpec, GroupDef,
    INTERNAL_ID_PREFIX, MAX_GRID_COORDINATE, MAX_GRID_HEIGHT, MAX_GRID_WIDTH, MIN_GRID_HEIGHT,
    MIN_GRID_WIDTH,
};
use crate::theme::parse_box_styles;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static ARROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<from>[A-Za-z0-9_-]+)\s*->\s*(?P<to>[A-Za-z0-9_-]+)\s*(?:\|\s*(?P<flow>[^|]*?))?\s*$",
    )
    .unwrap()
});
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// One axis of a box position as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinate {
    /// Offset from the previous box (or the container base).
    Relative(i32),
    Absolute(i32),
}

impl Coordinate {
    pub fn is_relative(self) -> bool {
        matches!(self, Coordinate::Relative(_))
    }

    /// `anchor` is the previous box position on this axis, `base` the open
    /// container's origin.
    /// Widened to `i64` so any pair of `i32` inputs resolves without overflow.
    fn resolve(self, anchor: i32, base: Option<i32>) -> i64 {
        match (self, base) {
            (Coordinate::Relative(offset), _) => i64::from(anchor) + i64::from(offset),
            (Coordinate::Absolute(value), Some(base)) => i64::from(base) + i64::from(value),
            (Coordinate::Absolute(value), None) => i64::from(value),
        }
    }
}

/// `0` is shorthand for `+0`; a bare integer is absolute.
pub fn parse_coordinate(token: &str) -> Option<Coordinate> {
    let token = token.trim();
    if token == "0" {
        return Some(Coordinate::Relative(0));
    }
    if let Some(rest) = token.strip_prefix('+') {
        return rest.parse().ok().map(Coordinate::Relative);
    }
    if let Some(rest) = token.strip_prefix('-') {
        return rest.parse::<i32>().ok().map(|v| Coordinate::Relative(-v));
    }
    token.parse().ok().map(Coordinate::Absolute)
}

/// Accepts integers, decimals and `numerator/denominator` fractions.
pub fn parse_number_or_fraction(text: &str) -> Result<f64, NumberError> {
    let text = text.trim();
    if text.contains('/') {
        let parts: Vec<&str> = text.split('/').collect();
        if parts.len() != 2 {
            return Err(NumberError::InvalidFraction(text.to_string()));
        }
        let numerator = parse_finite(parts[0])
            .ok_or_else(|| NumberError::InvalidFraction(text.to_string()))?;
        let denominator = parse_finite(parts[1])
            .ok_or_else(|| NumberError::InvalidFraction(text.to_string()))?;
        if denominator == 0.0 {
            return Err(NumberError::DivisionByZero(text.to_string()));
        }
        return Ok(numerator / denominator);
    }
    parse_finite(text).ok_or_else(|| NumberError::InvalidNumber(text.to_string()))
}

fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug)]
struct Container {
    id: String,
    base_x: i32,
    base_y: i32,
}

/// Line-by-line parser state; one instance per document.
struct ParserState<'a> {
    custom_colors: &'a HashMap<String, String>,
    spec: DiagramSpec,
    in_arrow_section: bool,
    container: Option<Container>,
    previous_id: Option<String>,
    /// Grid position relative coordinates are measured from.
    anchor: (i32, i32),
    next_internal_id: usize,
    explicit_ids: HashSet<String>,
    group_labels: HashMap<String, String>,
}

/// Parses diagram source (front-matter already stripped) into the grid model.
///
/// Parsing is all-or-nothing: the first malformed line aborts with an error
/// naming the line, id or value at fault.
pub fn parse_diagram(
    input: &str,
    custom_colors: &HashMap<String, String>,
) -> Result<DiagramSpec, ParseError> {
    let mut state = ParserState::new(custom_colors);
    for raw_line in input.lines() {
        state.parse_line(raw_line.trim())?;
    }
    let spec = state.finish()?;
    debug!(
        "parsed diagram: {} boxes, {} arrows, {} groups",
        spec.boxes.len(),
        spec.arrows.len(),
        spec.groups.len()
    );
    Ok(spec)
}

impl<'a> ParserState<'a> {
    fn new(custom_colors: &'a HashMap<String, String>) -> Self {
        Self {
            custom_colors,
            spec: DiagramSpec::new(),
            in_arrow_section: false,
            container: None,
            previous_id: None,
            anchor: (0, 0),
            next_internal_id: 0,
            explicit_ids: HashSet::new(),
            group_labels: HashMap::new(),
        }
    }

    fn parse_line(&mut self, line: &str) -> Result<(), ParseError> {
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        if line == "]" {
            return match self.container.take() {
                Some(_) => Ok(()),
                None => Err(ParseError::UnexpectedContainerClose),
            };
        }
        if let Some(header) = line.strip_suffix('[') {
            return self.open_container(line, header);
        }
        if line == "---" {
            if self.container.is_some() {
                return Err(ParseError::SeparatorInContainer);
            }
            self.in_arrow_section = true;
            return Ok(());
        }
        if let Some(caps) = ARROW_RE.captures(line) {
            let from = &caps["from"];
            let to = &caps["to"];
            let flow = caps
                .name("flow")
                .map(|m| m.as_str().trim())
                .filter(|flow| !flow.is_empty());
            return self.push_arrow(from, to, flow);
        }
        if self.in_arrow_section {
            return Err(ParseError::InvalidArrow {
                line: line.to_string(),
            });
        }
        if let Some(group) = line.strip_prefix('@') {
            let (name, label) = match group.split_once(':') {
                Some((name, label)) => (name.trim(), label.trim()),
                None => (group.trim(), group.trim()),
            };
            self.group_labels
                .insert(name.to_string(), label.to_string());
            return Ok(());
        }
        self.parse_box(line)
    }

    fn open_container(&mut self, line: &str, header: &str) -> Result<(), ParseError> {
        if self.container.is_some() {
            return Err(ParseError::NestedContainer);
        }
        if self.in_arrow_section {
            return Err(ParseError::ContainerInArrowSection);
        }
        let mut parts = header.trim().splitn(3, ':');
        let (Some(id), Some(coords)) = (parts.next(), parts.next()) else {
            return Err(ParseError::InvalidContainer {
                line: line.to_string(),
            });
        };
        let coords: Vec<&str> = coords.split(',').collect();
        if coords.len() != 2 {
            return Err(ParseError::InvalidContainer {
                line: line.to_string(),
            });
        }
        let parse_axis = |token: &str, axis: Axis| {
            token
                .trim()
                .parse::<i32>()
                .map_err(|_| ParseError::InvalidContainerCoordinate {
                    axis,
                    line: line.to_string(),
                })
        };
        let base_x = parse_axis(coords[0], Axis::X)?;
        let base_y = parse_axis(coords[1], Axis::Y)?;

        self.anchor = (base_x, base_y);
        self.container = Some(Container {
            id: id.trim().to_string(),
            base_x,
            base_y,
        });
        Ok(())
    }

    fn push_arrow(&mut self, from: &str, to: &str, flow: Option<&str>) -> Result<(), ParseError> {
        for id in [from, to] {
            if id.starts_with(INTERNAL_ID_PREFIX) {
                return Err(ParseError::InternalIdInArrow {
                    from: from.to_string(),
                    to: to.to_string(),
                    id: id.to_string(),
                });
            }
        }
        let mut arrow = ArrowSpec::new(from, to);
        arrow.flow = flow.map(str::to_string);
        self.spec.arrows.push(arrow);
        Ok(())
    }

    fn parse_box(&mut self, line: &str) -> Result<(), ParseError> {
        let (explicit_id, coords, rest) = split_box_line(line)?;
        let id = match explicit_id {
            Some(id) => self.claim_id(line, id)?,
            None => {
                let id = format!("{INTERNAL_ID_PREFIX}{}", self.next_internal_id);
                self.next_internal_id += 1;
                id
            }
        };

        let auto_arrow = coords.starts_with('>');
        let touch_left = !auto_arrow && coords.starts_with('|');
        let coords = if auto_arrow || touch_left {
            &coords[1..]
        } else {
            coords
        };
        if self.previous_id.is_none() {
            if auto_arrow {
                return Err(ParseError::AutoArrowOnFirstBox { id });
            }
            if touch_left {
                return Err(ParseError::TouchLeftOnFirstBox { id });
            }
        }

        let parts: Vec<&str> = coords.split(',').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(ParseError::InvalidCoordinates {
                line: line.to_string(),
            });
        }
        let x = parse_coordinate(parts[0]).ok_or_else(|| ParseError::InvalidCoordinate {
            axis: Axis::X,
            line: line.to_string(),
        })?;
        let y = parse_coordinate(parts[1]).ok_or_else(|| ParseError::InvalidCoordinate {
            axis: Axis::Y,
            line: line.to_string(),
        })?;
        let (grid_width, grid_height) = parse_size(line, &id, &parts[2..])?;

        if self.previous_id.is_none()
            && self.container.is_none()
            && (x.is_relative() || y.is_relative())
        {
            return Err(ParseError::RelativeFirstBox { id });
        }
        if touch_left {
            if y != Coordinate::Relative(0) {
                return Err(ParseError::TouchLeftRow { id });
            }
            if !matches!(x, Coordinate::Relative(offset) if offset > 0) {
                return Err(ParseError::TouchLeftOffset { id });
            }
        }

        let base = self.container.as_ref().map(|c| (c.base_x, c.base_y));
        let grid_x = x.resolve(self.anchor.0, base.map(|b| b.0));
        let grid_y = y.resolve(self.anchor.1, base.map(|b| b.1));
        for (axis, value) in [(Axis::X, grid_x), (Axis::Y, grid_y)] {
            if !(1..=i64::from(MAX_GRID_COORDINATE)).contains(&value) {
                return Err(ParseError::CoordinateOutOfRange { id, axis, value });
            }
        }
        let (grid_x, grid_y) = (grid_x as i32, grid_y as i32);

        let mut label_and_style = rest.trim();
        let mut group = None;
        if let Some(at) = label_and_style.rfind(" @") {
            let name = label_and_style[at + 2..].trim();
            if !name.is_empty() {
                group = Some(name.to_string());
            }
            label_and_style = label_and_style[..at].trim();
        }
        let (label, styles) = label_and_style
            .split_once(',')
            .unwrap_or((label_and_style, ""));

        let mut spec = BoxSpec::new(&id, grid_x, grid_y, label.trim());
        spec.grid_width = grid_width;
        spec.grid_height = grid_height;
        spec.style = parse_box_styles(styles, self.custom_colors);
        spec.touch_left = touch_left;
        spec.group = group;
        self.spec.boxes.push(spec);

        if auto_arrow {
            if let Some(previous) = &self.previous_id {
                self.spec.arrows.push(ArrowSpec::new(previous, &id));
            }
        }
        self.previous_id = Some(id);
        self.anchor = (grid_x, grid_y);
        Ok(())
    }

    fn claim_id(&mut self, line: &str, id: &str) -> Result<String, ParseError> {
        if id.is_empty() {
            return Err(ParseError::EmptyId {
                line: line.to_string(),
            });
        }
        if !ID_RE.is_match(id) {
            return Err(ParseError::InvalidId { id: id.to_string() });
        }
        if id.starts_with(INTERNAL_ID_PREFIX) {
            return Err(ParseError::ReservedId { id: id.to_string() });
        }
        if !self.explicit_ids.insert(id.to_string()) {
            return Err(ParseError::DuplicateId { id: id.to_string() });
        }
        Ok(id.to_string())
    }

    fn finish(self) -> Result<DiagramSpec, ParseError> {
        if let Some(container) = self.container {
            return Err(ParseError::UnclosedContainer { id: container.id });
        }
        let mut spec = self.spec;
        let known: HashSet<&str> = spec.boxes.iter().map(|b| b.id.as_str()).collect();
        for arrow in &spec.arrows {
            for id in [&arrow.from, &arrow.to] {
                if !known.contains(id.as_str()) {
                    return Err(ParseError::UnknownBox {
                        from: arrow.from.clone(),
                        to: arrow.to.clone(),
                        id: id.clone(),
                    });
                }
            }
        }

        let mut groups: Vec<GroupDef> = Vec::new();
        for b in &spec.boxes {
            let Some(name) = &b.group else {
                continue;
            };
            match groups.iter_mut().find(|g| &g.name == name) {
                Some(group) => group.box_ids.push(b.id.clone()),
                None => groups.push(GroupDef {
                    name: name.clone(),
                    label: self
                        .group_labels
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| name.clone()),
                    box_ids: vec![b.id.clone()],
                }),
            }
        }
        spec.groups = groups;
        Ok(spec)
    }
}

/// Splits `[id:] coords: rest`. A head containing a comma is the coordinate
/// field, so labels of id-less boxes may contain colons.
fn split_box_line(line: &str) -> Result<(Option<&str>, &str, &str), ParseError> {
    let invalid = || ParseError::InvalidBox {
        line: line.to_string(),
    };
    let (head, tail) = line.split_once(':').ok_or_else(invalid)?;
    if head.contains(',') {
        return Ok((None, head.trim(), tail));
    }
    let (coords, rest) = tail.split_once(':').ok_or_else(invalid)?;
    Ok((Some(head.trim()), coords.trim(), rest))
}

fn parse_size(line: &str, id: &str, parts: &[&str]) -> Result<(f64, i32), ParseError> {
    let width = match parts.first() {
        Some(token) => {
            parse_number_or_fraction(token).map_err(|source| ParseError::InvalidWidth {
                line: line.to_string(),
                source,
            })?
        }
        None => DEFAULT_GRID_WIDTH,
    };
    let height = match parts.get(1) {
        Some(token) => token
            .trim()
            .parse::<i32>()
            .map_err(|_| ParseError::InvalidHeight {
                line: line.to_string(),
            })?,
        None => DEFAULT_GRID_HEIGHT,
    };
    if width < MIN_GRID_WIDTH {
        return Err(ParseError::WidthTooSmall {
            id: id.to_string(),
            width,
        });
    }
    if width > MAX_GRID_WIDTH {
        return Err(ParseError::WidthTooLarge {
            id: id.to_string(),
            width,
        });
    }
    if height < MIN_GRID_HEIGHT {
        return Err(ParseError::HeightTooSmall {
            id: id.to_string(),
            height,
        });
    }
    if height > MAX_GRID_HEIGHT {
        return Err(ParseError::HeightTooLarge {
            id: id.to_string(),
            height,
        });
    }
    Ok((width, height))
}
