//! Smoke tests: end-to-end runs over the bundled sample dataset.
//!
//! Load → aggregate → controller → JSON adapter, checking the invariants the
//! charts rely on.

use std::path::Path;

use feargreed::aggregate::aggregate_default;
use feargreed::category::Category;
use feargreed::controller::{ChartController, InputEvent};
use feargreed::data::{analyze_csv, file_sha256, parse_dataset, Dataset};
use feargreed::feed::{load_dataset, FileSource};
use feargreed::render::{tooltip, JsonLinesAdapter, RandomJitter};
use feargreed::selection::{SelectionEvent, SelectionState};
use feargreed::timeseries::{
    bars, sort_by_time, BarLayout, CombinedSeries, TimelineView, ZoomTransform, DEFAULT_ZOOM_EXTENT,
};

const SAMPLE_CSV: &str = "data/fear_greed_sample.csv";

fn load_sample() -> Option<Dataset> {
    if !Path::new(SAMPLE_CSV).exists() {
        eprintln!("SKIP: {} not found", SAMPLE_CSV);
        return None;
    }
    let text = std::fs::read_to_string(SAMPLE_CSV).unwrap();
    Some(parse_dataset(&text).unwrap())
}

// ---------------------------------------------------------------------------
// S01: Sample ingests with malformed rows dropped
// ---------------------------------------------------------------------------
#[test]
fn s01_sample_ingests() {
    let Some(ds) = load_sample() else { return };
    assert_eq!(ds.records.len(), 60);
    assert_eq!(ds.report.dropped_rows, 3);
    assert_eq!(ds.report.unknown_labels, 0);
    assert!(ds.records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

// ---------------------------------------------------------------------------
// S02: Every category present, in fixed order, with ordered box stats
// ---------------------------------------------------------------------------
#[test]
fn s02_summaries_ordered_and_consistent() {
    let Some(ds) = load_sample() else { return };
    let summaries = aggregate_default(&ds.records).unwrap();
    let cats: Vec<Category> = summaries.iter().map(|g| g.category).collect();
    assert_eq!(cats, Category::ORDER.to_vec());

    let total: usize = summaries.iter().map(|g| g.count()).sum();
    assert_eq!(total, ds.records.len());

    for g in &summaries {
        let s = &g.stats;
        assert!(s.min <= s.whisker_lower, "{:?}", g.category);
        assert!(s.whisker_lower <= s.q1);
        assert!(s.q1 <= s.median);
        assert!(s.median <= s.q3);
        assert!(s.q3 <= s.whisker_upper);
        assert!(s.whisker_upper <= s.max);
        assert!(g.raw_data.iter().all(|r| r.category() == Some(g.category)));
    }
}

// ---------------------------------------------------------------------------
// S03: Interactive session produces one frame per transition
// ---------------------------------------------------------------------------
#[test]
fn s03_session_frames() {
    let Some(ds) = load_sample() else { return };
    let summaries = aggregate_default(&ds.records).unwrap();
    let adapter = JsonLinesAdapter::new(Vec::new(), RandomJitter::new(Some(42)), 40.0);
    let mut controller = ChartController::new(summaries, adapter).unwrap();

    controller.dispatch(SelectionEvent::Click(Category::Fear)).unwrap();
    controller.dispatch(SelectionEvent::Click(Category::Greed)).unwrap();
    let last = controller.dispatch(SelectionEvent::Background).unwrap();
    assert_eq!(last, SelectionState::idle());

    let out = String::from_utf8(controller.into_adapter().into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let frames: std::collections::BTreeSet<u64> =
        lines.iter().map(|l| l["frame"].as_u64().unwrap()).collect();
    assert_eq!(frames.len(), 4);

    let strips: Vec<&serde_json::Value> = lines.iter().filter(|l| l["cmd"] == "strip").collect();
    assert_eq!(strips.len(), 2);
    assert_eq!(strips[0]["category"], "fear");
    assert_eq!(strips[1]["category"], "greed");
}

// ---------------------------------------------------------------------------
// S04: Time-series bars cover every record
// ---------------------------------------------------------------------------
#[test]
fn s04_time_series_layout() {
    let Some(ds) = load_sample() else { return };
    let records = sort_by_time(&ds.records);
    let layout = BarLayout::new(&records, 850.0, 380.0).unwrap();
    assert_eq!(layout.value_domain.0, 0.0);
    assert!(layout.value_domain.1 >= 92.0);
    let drawn = bars(&records, &layout, &ZoomTransform::identity());
    assert_eq!(drawn.len(), records.len());
    assert!(drawn.iter().all(|b| b.height >= 0.0 && b.height <= 380.0));

    let combined = CombinedSeries::from_records(&records).unwrap();
    assert_eq!(combined.points.len(), records.len());
    assert!(combined.price_domain.0 < combined.price_domain.1);
}

// ---------------------------------------------------------------------------
// S05: Async loader and manifest agree with the in-memory parse
// ---------------------------------------------------------------------------
#[tokio::test]
async fn s05_loader_and_manifest() {
    let Some(ds) = load_sample() else { return };
    let loaded = load_dataset(&FileSource::new(SAMPLE_CSV)).await.unwrap();
    assert_eq!(loaded.records, ds.records);

    let (manifest, report) = analyze_csv(Path::new(SAMPLE_CSV), 3600, 4_000_000_000).unwrap();
    assert_eq!(manifest.row_count, 60);
    assert_eq!(manifest.bad_rows, 3);
    assert!(manifest.stale);
    assert_eq!(manifest.hash_sha256, file_sha256(Path::new(SAMPLE_CSV)).unwrap());
    assert_eq!(manifest.category_counts.values().sum::<u64>(), 60);
    assert_eq!(report.rows, 60);
}

// ---------------------------------------------------------------------------
// S06: Zoom redraws the bar chart, hover emits the nearest reading
// ---------------------------------------------------------------------------
#[test]
fn s06_timeline_zoom_and_hover() {
    let Some(ds) = load_sample() else { return };
    let summaries = aggregate_default(&ds.records).unwrap();
    let view = TimelineView::new(&ds.records, 850.0, 380.0, DEFAULT_ZOOM_EXTENT).unwrap();
    let adapter = JsonLinesAdapter::new(Vec::new(), RandomJitter::new(Some(42)), 40.0);
    let mut controller = ChartController::new(summaries, adapter)
        .unwrap()
        .with_timeline(view.clone())
        .unwrap();

    for line in ["zoom 2 0 0", "hover 425"] {
        let event: InputEvent = line.parse().unwrap();
        controller.handle(event).unwrap();
    }

    let out = String::from_utf8(controller.into_adapter().into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    let bars_in = |frame: u64| -> Vec<&serde_json::Value> {
        lines
            .iter()
            .filter(|l| l["cmd"] == "bar" && l["frame"] == frame)
            .collect()
    };
    let initial = bars_in(1);
    let zoomed = bars_in(2);
    assert_eq!(initial.len(), ds.records.len());
    assert_eq!(zoomed.len(), ds.records.len());

    let half = view.layout().bar_width / 2.0;
    assert_eq!(initial.last().unwrap()["x"].as_f64().unwrap(), 850.0 - half);
    assert_eq!(zoomed.last().unwrap()["x"].as_f64().unwrap(), 1700.0 - half);
    assert_eq!(zoomed[0]["x"].as_f64().unwrap(), -half);

    let mut expected_view = view;
    expected_view.zoom_by(2.0, (0.0, 0.0));
    let expected = tooltip(expected_view.record_at(425.0).unwrap());
    let tips: Vec<&serde_json::Value> = lines.iter().filter(|l| l["cmd"] == "tooltip").collect();
    assert_eq!(tips.len(), 1);
    assert_eq!(tips[0]["date"], expected.date.as_str());
    assert_eq!(tips[0]["value"], expected.value.as_str());
    assert_eq!(tips[0]["frame"], 3);
}
