//! Layout for the index-over-time bar chart and the combined
//! price/sentiment chart: scales, bar geometry and the pan/zoom transform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::category::Category;
use crate::data::Record;
use crate::error::ChartError;

pub const DEFAULT_ZOOM_EXTENT: (f64, f64) = (0.5, 20.0);

const MIN_BAR_WIDTH: f64 = 1.0;
const MAX_BAR_WIDTH: f64 = 5.0;

pub fn sort_by_time(records: &[Record]) -> Vec<Record> {
    let mut out = records.to_vec();
    out.sort_by_key(|r| r.timestamp);
    out
}

/// Round `max` up to a tick boundary of a ~10-tick linear axis.
pub fn nice_ceil(max: f64) -> f64 {
    if !max.is_finite() || max <= 0.0 {
        return 1.0;
    }
    let raw_step = max / 10.0;
    let power = raw_step.log10().floor();
    let base = 10f64.powf(power);
    let err = raw_step / base;
    let factor = if err >= 50f64.sqrt() {
        10.0
    } else if err >= 10f64.sqrt() {
        5.0
    } else if err >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    let step = factor * base;
    (max / step).ceil() * step
}

/// Linear map of `v` from `domain` onto `range`; degenerate domains map to
/// the middle of the range.
fn linear(v: f64, domain: (f64, f64), range: (f64, f64)) -> f64 {
    let span = domain.1 - domain.0;
    let t = if span == 0.0 { 0.5 } else { (v - domain.0) / span };
    range.0 + t * (range.1 - range.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarLayout {
    pub width: f64,
    pub height: f64,
    /// Time extent in epoch seconds.
    pub time_domain: (i64, i64),
    pub value_domain: (f64, f64),
    pub bar_width: f64,
}

impl BarLayout {
    pub fn new(records: &[Record], width: f64, height: f64) -> Result<Self, ChartError> {
        let t_min = records.iter().map(|r| r.timestamp.timestamp()).min();
        let t_max = records.iter().map(|r| r.timestamp.timestamp()).max();
        let (Some(t0), Some(t1)) = (t_min, t_max) else {
            return Err(ChartError::NoData("no records to lay out".to_string()));
        };
        let v_max = records.iter().map(|r| r.value).fold(f64::NEG_INFINITY, f64::max);
        let avg = width / records.len() as f64;
        Ok(Self {
            width,
            height,
            time_domain: (t0, t1),
            value_domain: (0.0, nice_ceil(v_max)),
            bar_width: (avg * 0.8).clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH),
        })
    }

    pub fn x(&self, ts: DateTime<Utc>) -> f64 {
        linear(
            ts.timestamp() as f64,
            (self.time_domain.0 as f64, self.time_domain.1 as f64),
            (0.0, self.width),
        )
    }

    pub fn y(&self, value: f64) -> f64 {
        linear(value, self.value_domain, (self.height, 0.0))
    }

    /// Inverse of `x`: epoch seconds under an unzoomed x position.
    pub fn time_at(&self, x: f64) -> i64 {
        let t = linear(
            x,
            (0.0, self.width),
            (self.time_domain.0 as f64, self.time_domain.1 as f64),
        );
        t.round() as i64
    }
}

/// Pan/zoom state: screen = k * base + (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ZoomTransform {
    pub fn identity() -> Self {
        Self { k: 1.0, x: 0.0, y: 0.0 }
    }

    /// Zoom by `factor` around a fixed screen point; `k` stays inside `extent`.
    pub fn scale_by(&self, factor: f64, anchor: (f64, f64), extent: (f64, f64)) -> Self {
        let k = (self.k * factor).clamp(extent.0, extent.1);
        let ux = (anchor.0 - self.x) / self.k;
        let uy = (anchor.1 - self.y) / self.k;
        Self {
            k,
            x: anchor.0 - k * ux,
            y: anchor.1 - k * uy,
        }
    }

    pub fn translate_by(&self, dx: f64, dy: f64) -> Self {
        Self {
            k: self.k,
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn apply_x(&self, base: f64) -> f64 {
        base * self.k + self.x
    }

    pub fn apply_y(&self, base: f64) -> f64 {
        base * self.k + self.y
    }

    pub fn invert_x(&self, screen: f64) -> f64 {
        (screen - self.x) / self.k
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub category: Option<Category>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
}

const UNKNOWN_COLOR: &str = "#999999";

/// Bar geometry for every record under the current zoom.
pub fn bars(records: &[Record], layout: &BarLayout, zoom: &ZoomTransform) -> Vec<Bar> {
    records
        .iter()
        .map(|r| {
            let x = zoom.apply_x(layout.x(r.timestamp)) - layout.bar_width / 2.0;
            let y = zoom.apply_y(layout.y(r.value));
            let category = r.category();
            Bar {
                timestamp: r.timestamp,
                value: r.value,
                category,
                x,
                y,
                width: layout.bar_width,
                height: layout.height - y,
                color: category.map(|c| c.color()).unwrap_or(UNKNOWN_COLOR).to_string(),
            }
        })
        .collect()
}

/// Pointer input on the time-series chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    /// Wheel zoom by `factor` around screen point (x, y).
    Zoom { factor: f64, x: f64, y: f64 },
    /// Drag by a screen offset.
    Pan { dx: f64, dy: f64 },
    /// Pointer over screen x.
    Hover { x: f64 },
}

fn parse_coords<const N: usize>(verb: &str, rest: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() != N {
        return Err(format!("{} expects {} numbers, got {}", verb, N, parts.len()));
    }
    let mut out = [0.0; N];
    for (slot, raw) in out.iter_mut().zip(&parts) {
        let v: f64 = raw.parse().map_err(|_| format!("bad number {:?}", raw))?;
        if !v.is_finite() {
            return Err(format!("non-finite number {:?}", raw));
        }
        *slot = v;
    }
    Ok(out)
}

/// Text form used by the interactive driver: `zoom <factor> <x> <y>`,
/// `pan <dx> <dy>` or `hover <x>`.
impl FromStr for ViewEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (verb, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        match verb.to_lowercase().as_str() {
            "zoom" => {
                let [factor, x, y] = parse_coords::<3>("zoom", rest)?;
                if factor <= 0.0 {
                    return Err(format!("zoom factor must be positive, got {}", factor));
                }
                Ok(ViewEvent::Zoom { factor, x, y })
            }
            "pan" => {
                let [dx, dy] = parse_coords::<2>("pan", rest)?;
                Ok(ViewEvent::Pan { dx, dy })
            }
            "hover" => {
                let [x] = parse_coords::<1>("hover", rest)?;
                Ok(ViewEvent::Hover { x })
            }
            other => Err(format!("unknown view event: {:?}", other)),
        }
    }
}

/// Time-ordered records with their layout and the current zoom.
#[derive(Debug, Clone)]
pub struct TimelineView {
    records: Vec<Record>,
    layout: BarLayout,
    zoom: ZoomTransform,
    extent: (f64, f64),
}

impl TimelineView {
    pub fn new(records: &[Record], width: f64, height: f64, extent: (f64, f64)) -> Result<Self, ChartError> {
        let records = sort_by_time(records);
        let layout = BarLayout::new(&records, width, height)?;
        Ok(Self {
            records,
            layout,
            zoom: ZoomTransform::identity(),
            extent,
        })
    }

    pub fn layout(&self) -> &BarLayout {
        &self.layout
    }

    pub fn zoom(&self) -> ZoomTransform {
        self.zoom
    }

    pub fn bars(&self) -> Vec<Bar> {
        bars(&self.records, &self.layout, &self.zoom)
    }

    pub fn zoom_by(&mut self, factor: f64, anchor: (f64, f64)) {
        self.zoom = self.zoom.scale_by(factor, anchor, self.extent);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.zoom = self.zoom.translate_by(dx, dy);
    }

    /// Record whose timestamp is closest to the time under screen `x`.
    pub fn record_at(&self, x: f64) -> Option<&Record> {
        let ts = self.layout.time_at(self.zoom.invert_x(x));
        let idx = self.records.partition_point(|r| r.timestamp.timestamp() < ts);
        let after = self.records.get(idx);
        let before = idx.checked_sub(1).and_then(|i| self.records.get(i));
        match (before, after) {
            (Some(b), Some(a)) => {
                let db = ts - b.timestamp.timestamp();
                let da = a.timestamp.timestamp() - ts;
                Some(if db <= da { b } else { a })
            }
            (b, a) => b.or(a),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedPoint {
    pub timestamp: DateTime<Utc>,
    pub sentiment: f64,
    pub price: f64,
    pub category: Option<Category>,
}

/// Sentiment bars against a secondary price line on its own axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedSeries {
    pub points: Vec<CombinedPoint>,
    pub sentiment_domain: (f64, f64),
    pub price_domain: (f64, f64),
}

impl CombinedSeries {
    /// `None` when no record carries a secondary value.
    pub fn from_records(records: &[Record]) -> Option<Self> {
        let mut points: Vec<CombinedPoint> = records
            .iter()
            .filter_map(|r| {
                r.secondary.map(|price| CombinedPoint {
                    timestamp: r.timestamp,
                    sentiment: r.value,
                    price,
                    category: r.category(),
                })
            })
            .collect();
        if points.is_empty() {
            return None;
        }
        points.sort_by_key(|p| p.timestamp);
        let s_max = points.iter().map(|p| p.sentiment).fold(f64::NEG_INFINITY, f64::max);
        let p_min = points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
        let p_max = points.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            points,
            sentiment_domain: (0.0, nice_ceil(s_max)),
            price_domain: (p_min, p_max),
        })
    }

    pub fn price_y(&self, price: f64, height: f64) -> f64 {
        linear(price, self.price_domain, (height, 0.0))
    }

    pub fn sentiment_y(&self, sentiment: f64, height: f64) -> f64 {
        linear(sentiment, self.sentiment_domain, (height, 0.0))
    }
}
