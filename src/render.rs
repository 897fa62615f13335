//! Boundary to the presentation layer.
//!
//! `render_commands` turns (summaries, selection) into a deterministic list
//! of draw commands, and `timeline_commands` does the same for the bar chart.
//! Adapters decide how to draw them; horizontal jitter for strip points is
//! applied only inside an adapter.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Write;

use crate::aggregate::GroupSummary;
use crate::category::Category;
use crate::data::Record;
use crate::error::ChartError;
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::selection::{weight_for, SelectionState, VisualWeight};
use crate::timeseries::{Bar, TimelineView};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum RenderCommand {
    BoxShape {
        category: Category,
        color: String,
        weight: VisualWeight,
        opacity: f64,
        stroke_width: f64,
        count: usize,
        whisker_lower: f64,
        q1: f64,
        median: f64,
        q3: f64,
        whisker_upper: f64,
    },
    Outliers {
        category: Category,
        weight: VisualWeight,
        values: Vec<f64>,
    },
    Strip {
        category: Category,
        color: String,
        points: Vec<StripPoint>,
    },
    Bar(Bar),
    Tooltip(Tooltip),
}

pub fn render_commands(summaries: &[GroupSummary], selection: &SelectionState) -> Vec<RenderCommand> {
    let mut cmds = Vec::with_capacity(summaries.len() * 2 + 1);
    for g in summaries {
        let weight = weight_for(g.category, selection);
        cmds.push(RenderCommand::BoxShape {
            category: g.category,
            color: g.category.color().to_string(),
            weight,
            opacity: weight.opacity(),
            stroke_width: weight.stroke_width(),
            count: g.count(),
            whisker_lower: g.stats.whisker_lower,
            q1: g.stats.q1,
            median: g.stats.median,
            q3: g.stats.q3,
            whisker_upper: g.stats.whisker_upper,
        });
        if !g.stats.outliers.is_empty() {
            cmds.push(RenderCommand::Outliers {
                category: g.category,
                weight,
                values: g.stats.outliers.clone(),
            });
        }
    }

    let detail = selection
        .detail_category()
        .and_then(|c| summaries.iter().find(|g| g.category == c));
    if let Some(g) = detail {
        cmds.push(RenderCommand::Strip {
            category: g.category,
            color: g.category.color().to_string(),
            points: g
                .raw_data
                .iter()
                .map(|r| StripPoint {
                    timestamp: r.timestamp,
                    value: r.value,
                })
                .collect(),
        });
    }
    cmds
}

/// One `Bar` command per record, under the view's current zoom.
pub fn timeline_commands(view: &TimelineView) -> Vec<RenderCommand> {
    view.bars().into_iter().map(RenderCommand::Bar).collect()
}

/// Hover tooltip content for a single reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub date: String,
    pub value: String,
    pub classification: String,
}

pub fn tooltip(record: &Record) -> Tooltip {
    Tooltip {
        date: record.timestamp.format("%Y-%m-%d").to_string(),
        value: format!("{:.1}", record.value),
        classification: record.classification.clone(),
    }
}

pub trait RenderAdapter {
    fn render(&mut self, summaries: &[GroupSummary], selection: &SelectionState) -> Result<()>;

    fn render_timeline(&mut self, view: &TimelineView) -> Result<()>;

    fn render_tooltip(&mut self, tip: &Tooltip) -> Result<()>;

    /// Terminal error view with a manual reload offer.
    fn render_error(&mut self, err: &ChartError) -> Result<()>;
}

pub trait JitterSource {
    /// Horizontal offset in `[-width / 2, width / 2]`.
    fn offset(&mut self, width: f64) -> f64;
}

pub struct RandomJitter {
    rng: StdRng,
}

impl RandomJitter {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl JitterSource for RandomJitter {
    fn offset(&mut self, width: f64) -> f64 {
        if width <= 0.0 {
            return 0.0;
        }
        let half = width / 2.0;
        self.rng.gen_range(-half..=half)
    }
}

/// Writes each render pass as JSON lines, one object per command.
pub struct JsonLinesAdapter<W: Write, J: JitterSource> {
    out: W,
    jitter: J,
    jitter_width: f64,
    frame: u64,
}

impl<W: Write, J: JitterSource> JsonLinesAdapter<W, J> {
    pub fn new(out: W, jitter: J, jitter_width: f64) -> Self {
        Self {
            out,
            jitter,
            jitter_width,
            frame: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write one frame and log it under `event`.
    fn write_frame(&mut self, event: &str, cmds: &[RenderCommand], fields: &[(&str, Value)]) -> Result<()> {
        for cmd in cmds {
            let mut line = serde_json::to_value(cmd)?;
            if let RenderCommand::Strip { points, .. } = cmd {
                let offsets: Vec<f64> = points
                    .iter()
                    .map(|_| self.jitter.offset(self.jitter_width))
                    .collect();
                line["jitter"] = json!(offsets);
            }
            line["frame"] = json!(self.frame);
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()?;
        let mut data = obj(fields);
        data.insert("frame".to_string(), json!(self.frame));
        data.insert("commands".to_string(), json!(cmds.len()));
        log(Level::Debug, Domain::Render, event, data);
        self.frame += 1;
        Ok(())
    }
}

impl<W: Write, J: JitterSource> RenderAdapter for JsonLinesAdapter<W, J> {
    fn render(&mut self, summaries: &[GroupSummary], selection: &SelectionState) -> Result<()> {
        let cmds = render_commands(summaries, selection);
        self.write_frame("frame", &cmds, &[("selection", json!(selection))])
    }

    fn render_timeline(&mut self, view: &TimelineView) -> Result<()> {
        let cmds = timeline_commands(view);
        self.write_frame("timeline", &cmds, &[("zoom", json!(view.zoom()))])
    }

    fn render_tooltip(&mut self, tip: &Tooltip) -> Result<()> {
        let cmds = [RenderCommand::Tooltip(tip.clone())];
        self.write_frame("tooltip", &cmds, &[("date", v_str(&tip.date))])
    }

    fn render_error(&mut self, err: &ChartError) -> Result<()> {
        let line = json!({
            "cmd": "error_banner",
            "kind": err.kind(),
            "message": err.to_string(),
            "hint": err.hint(),
            "retry": true,
        });
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        log(
            Level::Error,
            Domain::Render,
            "error_banner",
            obj(&[("kind", v_str(err.kind()))]),
        );
        Ok(())
    }
}
