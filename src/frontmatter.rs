use std::collections::HashMap;

use crate::ir::LegendEntry;

/// Metadata read from the top of a diagram file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    /// Path to a custom font file.
    pub font: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub legend: Vec<LegendEntry>,
    /// Custom colour names usable as style codes.
    pub colors: HashMap<String, String>,
    /// Diagram-wide arrow flow hint.
    pub arrow_flow: Option<String>,
}

/// Splits front-matter off the diagram text.
///
/// Two forms are accepted. A delimited block opens with `---` as the first
/// non-blank, non-comment line and runs to the next `---`; an unclosed block
/// swallows the whole input. Otherwise recognised `key: value` lines are
/// consumed from the top until the first line that is not one.
pub fn parse_frontmatter(input: &str) -> (Frontmatter, String) {
    let mut fm = Frontmatter::default();
    let lines: Vec<&str> = input.split('\n').collect();

    let first = lines
        .iter()
        .position(|line| !is_skippable(line.trim()))
        .unwrap_or(lines.len());
    if lines.get(first).map(|line| line.trim()) == Some("---") {
        for (offset, line) in lines[first + 1..].iter().enumerate() {
            let trimmed = line.trim();
            if trimmed == "---" {
                let rest = first + offset + 2;
                return (fm, lines[rest..].join("\n"));
            }
            parse_key(&mut fm, trimmed);
        }
        return (fm, String::new());
    }

    let mut consumed = 0;
    while consumed < lines.len() {
        let trimmed = lines[consumed].trim();
        if !is_skippable(trimmed) && !parse_key(&mut fm, trimmed) {
            break;
        }
        consumed += 1;
    }
    (fm, lines[consumed..].join("\n"))
}

fn is_skippable(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}

/// Returns `false` for lines that are not front-matter keys.
fn parse_key(fm: &mut Frontmatter, line: &str) -> bool {
    if is_skippable(line) {
        return true;
    }
    let Some((key, value)) = line.split_once(':') else {
        return false;
    };
    let value = value.trim();
    match key {
        "font" => fm.font = Some(value.to_string()),
        "x-label" => fm.x_label = Some(value.to_string()),
        "y-label" => fm.y_label = Some(value.to_string()),
        "arrow-flow" => fm.arrow_flow = Some(value.to_string()).filter(|v| !v.is_empty()),
        "legend" => {
            if let Some((style, label)) = value.split_once('=') {
                fm.legend.push(LegendEntry {
                    style: style.trim().to_string(),
                    label: label.trim().to_string(),
                });
            }
        }
        "color" => {
            if let Some((name, hex)) = value.split_once('=') {
                fm.colors
                    .insert(name.trim().to_string(), hex.trim().to_string());
            }
        }
        _ => return false,
    }
    true
}
