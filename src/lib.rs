#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use error::{NumberError, ParseError};
pub use frontmatter::{Frontmatter, parse_frontmatter};
pub use layout::{Layout, LayoutOptions, RouteError, compute_layout};
pub use parser::parse_diagram;
