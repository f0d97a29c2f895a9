use crate::ir::MAX_GRID_COORDINATE;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("X"),
            Axis::Y => f.write_str("Y"),
        }
    }
}

/// Failure to read a width value such as `2`, `1.5` or `3/4`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("invalid fraction '{0}': must be 'numerator/denominator'")]
    InvalidFraction(String),
    #[error("invalid fraction '{0}': division by zero")]
    DivisionByZero(String),
}

/// Parse-time errors. Any of these aborts the whole diagram.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected ']' outside container")]
    UnexpectedContainerClose,
    #[error("nested containers not supported")]
    NestedContainer,
    #[error("container not allowed in arrow section")]
    ContainerInArrowSection,
    #[error("invalid container definition: '{line}'")]
    InvalidContainer { line: String },
    #[error("invalid container {axis} coordinate in line: '{line}'")]
    InvalidContainerCoordinate { axis: Axis, line: String },
    #[error("unclosed container '{id}'")]
    UnclosedContainer { id: String },
    #[error("section separator not allowed inside container")]
    SeparatorInContainer,

    #[error(
        "arrow '{from} -> {to}' references box without explicit label (internal ID: {id})"
    )]
    InternalIdInArrow { from: String, to: String, id: String },
    #[error("arrow '{from} -> {to}' references non-existent box label '{id}'")]
    UnknownBox { from: String, to: String, id: String },
    #[error("invalid arrow definition: '{line}'")]
    InvalidArrow { line: String },

    #[error("invalid box definition: '{line}'")]
    InvalidBox { line: String },
    #[error("invalid box definition: empty ID in line '{line}'")]
    EmptyId { line: String },
    #[error(
        "invalid ID '{id}': must contain only alphanumeric characters, underscore, or hyphen"
    )]
    InvalidId { id: String },
    #[error("invalid ID '{id}': the '_box_' prefix is reserved for unlabeled boxes")]
    ReservedId { id: String },
    #[error("duplicate box ID '{id}'")]
    DuplicateId { id: String },

    #[error("first box (label '{id}') cannot have auto-arrow prefix '>'")]
    AutoArrowOnFirstBox { id: String },
    #[error("first box (label '{id}') cannot have touch-left prefix '|'")]
    TouchLeftOnFirstBox { id: String },
    #[error("first box (label '{id}') cannot use relative coordinates")]
    RelativeFirstBox { id: String },
    #[error(
        "box '{id}': touch-left prefix '|' requires Y coordinate to be 0 (same row as previous box)"
    )]
    TouchLeftRow { id: String },
    #[error(
        "box '{id}': touch-left prefix '|' requires X coordinate to be relative with '+' prefix (e.g. '+2')"
    )]
    TouchLeftOffset { id: String },

    #[error("invalid coordinate definition: '{line}'")]
    InvalidCoordinates { line: String },
    #[error("invalid {axis} coordinate in line: '{line}'")]
    InvalidCoordinate { axis: Axis, line: String },
    #[error(
        "box '{id}': Grid{axis} coordinate resolved to invalid value {value} (must be between 1 and {max})",
        max = MAX_GRID_COORDINATE
    )]
    CoordinateOutOfRange { id: String, axis: Axis, value: i64 },

    #[error("invalid width in line: '{line}'")]
    InvalidWidth {
        line: String,
        #[source]
        source: NumberError,
    },
    #[error("invalid height in line: '{line}'")]
    InvalidHeight { line: String },
    #[error("box '{id}': GridWidth must be >= 0.2, got {width:.1}")]
    WidthTooSmall { id: String, width: f64 },
    #[error("box '{id}': GridWidth must be <= {max}, got {width}", max = MAX_GRID_COORDINATE)]
    WidthTooLarge { id: String, width: f64 },
    #[error("box '{id}': GridHeight must be >= 1, got {height}")]
    HeightTooSmall { id: String, height: i32 },
    #[error("box '{id}': GridHeight must be <= {max}, got {height}", max = MAX_GRID_COORDINATE)]
    HeightTooLarge { id: String, height: i32 },
}
