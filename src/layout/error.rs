use thiserror::Error;

/// Failure to route a single arrow. Never fatal to the whole diagram.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error(
        "no valid arrow routing found from {from} to {to} (all strategies failed or produced illegal arrows)"
    )]
    NoValidRoute { from: String, to: String },
    #[error("arrow endpoint '{id}' has no resolved geometry")]
    UnknownBox { id: String },
}
