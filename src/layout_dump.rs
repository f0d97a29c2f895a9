use crate::layout::{ArrowLayout, Layout, RouteStrategy};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub diagram: DiagramDump,
    pub boxes: Vec<BoxDump>,
    pub arrows: Vec<ArrowDump>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupDump>,
}

#[derive(Debug, Serialize)]
pub struct DiagramDump {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxDump {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub grid_x: i32,
    pub grid_y: i32,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowDump {
    pub from_box: String,
    pub to_box: String,
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub routing_strategy: &'static str,
    pub arrow_type: &'static str,
    pub arrowhead_orientation: &'static str,
    pub vertical_first: bool,
    pub candidates: Vec<CandidateDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDump {
    pub strategy: &'static str,
    /// Null for rejected candidates.
    pub score: Option<i32>,
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub vertical_first: bool,
    pub selected: bool,
    pub rejected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDump {
    pub label: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub box_ids: Vec<String>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let boxes = layout
            .boxes
            .iter()
            .map(|b| BoxDump {
                id: b.id.clone(),
                x: b.x,
                y: b.y,
                width: b.width,
                height: b.height,
                grid_x: b.grid_x,
                grid_y: b.grid_y,
                label: b.lines.join("\n"),
                color: b.color.clone(),
            })
            .collect();

        let arrows = layout.arrows.iter().map(ArrowDump::from_arrow).collect();

        let groups = layout
            .groups
            .iter()
            .map(|group| GroupDump {
                label: group.label.clone(),
                x: group.x,
                y: group.y,
                width: group.width,
                height: group.height,
                box_ids: group.box_ids.clone(),
            })
            .collect();

        LayoutDump {
            diagram: DiagramDump {
                width: layout.width,
                height: layout.height,
            },
            boxes,
            arrows,
            groups,
        }
    }
}

impl ArrowDump {
    fn from_arrow(arrow: &ArrowLayout) -> Self {
        let candidates = arrow
            .candidates
            .iter()
            .enumerate()
            .map(|(idx, candidate)| CandidateDump {
                strategy: candidate.strategy.as_str(),
                score: candidate.score,
                start_x: candidate.start_x,
                start_y: candidate.start_y,
                end_x: candidate.end_x,
                end_y: candidate.end_y,
                vertical_first: candidate.vertical_first,
                selected: idx == arrow.selected,
                rejected: candidate.is_rejected(),
                reject_reason: candidate.rejected.map(|reason| reason.as_str()),
            })
            .collect();

        ArrowDump {
            from_box: arrow.from.clone(),
            to_box: arrow.to.clone(),
            start_x: arrow.start_x,
            start_y: arrow.start_y,
            end_x: arrow.end_x,
            end_y: arrow.end_y,
            routing_strategy: arrow.strategy.as_str(),
            arrow_type: classify_arrow_type(arrow),
            arrowhead_orientation: arrowhead_orientation(arrow),
            vertical_first: arrow.vertical_first,
            candidates,
        }
    }
}

/// Shape of the drawn arrow: straight, or bent once or twice.
pub fn classify_arrow_type(arrow: &ArrowLayout) -> &'static str {
    if arrow.start_x == arrow.end_x {
        return "straight_vertical";
    }
    if arrow.start_y == arrow.end_y {
        return "straight_horizontal";
    }
    match arrow.strategy {
        RouteStrategy::TwoSegmentVerticalFirst | RouteStrategy::TwoSegmentHorizontalFirst => {
            "one_bent"
        }
        _ => "two_bent",
    }
}

/// Direction of the final segment, which is where the head is drawn.
pub fn arrowhead_orientation(arrow: &ArrowLayout) -> &'static str {
    let (from, to) = match arrow.points.as_slice() {
        [.., a, b] => (*a, *b),
        _ => ((arrow.start_x, arrow.start_y), (arrow.end_x, arrow.end_y)),
    };
    if from.0 == to.0 {
        if to.1 > from.1 { "down" } else { "up" }
    } else if to.0 > from.0 {
        "right"
    } else {
        "left"
    }
}

pub fn layout_dump_json(layout: &Layout) -> anyhow::Result<String> {
    let dump = LayoutDump::from_layout(layout);
    Ok(serde_json::to_string_pretty(&dump)?)
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::{LayoutOptions, compute_layout};
    use crate::parser::parse_diagram;
    use std::collections::HashMap;

    fn layout_for(input: &str) -> Layout {
        let spec = parse_diagram(input, &HashMap::new()).unwrap();
        compute_layout(&spec, &LayoutConfig::default(), &LayoutOptions::default()).0
    }

    #[test]
    fn dump_uses_camel_case_and_box_ids() {
        let layout = layout_for("a: 1,1: Alpha @G\nb: 1,2: Beta @G\n---\na -> b");
        let value: serde_json::Value =
            serde_json::from_str(&layout_dump_json(&layout).unwrap()).unwrap();
        assert_eq!(value["diagram"]["width"], layout.width);
        assert_eq!(value["boxes"][0]["id"], "a");
        assert_eq!(value["boxes"][1]["gridY"], 2);
        let arrow = &value["arrows"][0];
        assert_eq!(arrow["fromBox"], "a");
        assert_eq!(arrow["routingStrategy"], "straight_vertical");
        assert_eq!(arrow["arrowType"], "straight_vertical");
        assert_eq!(arrow["arrowheadOrientation"], "down");
        let selected: Vec<_> = arrow["candidates"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|c| c["selected"] == true)
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0]["strategy"], "straight_vertical");
        assert_eq!(value["groups"][0]["boxIds"][1], "b");
    }

    #[test]
    fn rejected_candidates_carry_reason() {
        // `c` sits right under `a` and blocks the vertical-first drop.
        let layout = layout_for("a: 1,1: A\nc: 1,3: C\nd: 3,3: D\n---\na -> d");
        let value: serde_json::Value =
            serde_json::from_str(&layout_dump_json(&layout).unwrap()).unwrap();
        let candidates = value["arrows"][0]["candidates"].as_array().unwrap();
        let rejected: Vec<_> = candidates.iter().filter(|c| c["rejected"] == true).collect();
        assert!(!rejected.is_empty());
        for candidate in &rejected {
            assert_eq!(candidate["rejectReason"], "collision_detected");
            assert!(candidate["score"].is_null());
        }
        let accepted = candidates.iter().find(|c| c["rejected"] == false).unwrap();
        assert!(accepted.get("rejectReason").is_none());
    }

    #[test]
    fn groups_omitted_when_empty() {
        let layout = layout_for("a: 1,1: A");
        let json = layout_dump_json(&layout).unwrap();
        assert!(!json.contains("\"groups\""));
    }

    #[test]
    fn classifies_bent_arrows() {
        let layout = layout_for("a: 1,1: A\nb: 4,2: B\n---\na -> b");
        let arrow = &layout.arrows[0];
        assert_eq!(arrow.strategy, RouteStrategy::NonOverlappingHorizontal);
        assert_eq!(classify_arrow_type(arrow), "two_bent");
        assert_eq!(arrowhead_orientation(arrow), "right");
    }

    #[test]
    fn writes_pretty_json_file() {
        let layout = layout_for("a: 1,1: A\nb: 3,1: B\n---\nb -> a");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        write_layout_dump(&path, &layout).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\n  \"diagram\""));
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["arrows"][0]["arrowheadOrientation"], "left");
        assert_eq!(value["arrows"][0]["arrowType"], "straight_horizontal");
    }
}
