use crate::config::load_config;
use crate::frontmatter::parse_frontmatter;
use crate::layout::{LayoutOptions, compute_layout};
use crate::layout_dump::{layout_dump_json, write_layout_dump};
use crate::parser::parse_diagram;
use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, warn};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(
    name = "control",
    version,
    about = "Lay out grid box-and-arrow diagrams and route their arrows"
)]
pub struct Args {
    /// Diagram file or '-' for stdin
    #[arg(short = 'i', long = "diagram")]
    pub diagram: Option<PathBuf>,

    /// Layout dump output (JSON). Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Horizontal stretch factor, 1.0 = normal
    #[arg(long = "stretch")]
    pub stretch: Option<f64>,

    /// Vertical gap between boxes in grid units
    #[arg(long = "vertical-gap")]
    pub vertical_gap: Option<f64>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level);
    execute(&args)
}

fn init_logger(level: &str) {
    let filter = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });
    if env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(filter)
        .try_init()
        .is_err()
    {
        debug!("logger already initialized");
    }
}

/// Front-matter, parse, layout, dump.
pub fn execute(args: &Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(stretch) = args.stretch {
        config.layout.stretch = stretch;
    }
    if let Some(gap) = args.vertical_gap {
        config.layout.vertical_gap_units = gap;
    }
    config
        .layout
        .validate()
        .context("invalid layout overrides")?;

    let input = read_input(args.diagram.as_deref())?;
    let (frontmatter, body) = parse_frontmatter(&input);
    if let Some(font) = &frontmatter.font {
        warn!("font '{font}' ignored: the layout dump does not embed fonts");
    }
    let spec = parse_diagram(&body, &frontmatter.colors).context("failed to parse diagram")?;

    let options = LayoutOptions {
        legend: frontmatter.legend,
        flow: frontmatter.arrow_flow,
    };
    let (layout, _) = compute_layout(&spec, &config.layout, &options);
    if layout.arrows.len() < spec.arrows.len() {
        debug!(
            "{} of {} arrows could not be routed",
            spec.arrows.len() - layout.arrows.len(),
            spec.arrows.len()
        );
    }

    match args.output.as_deref() {
        Some(path) => write_layout_dump(path, &layout)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", layout_dump_json(&layout)?),
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
