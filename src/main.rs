use anyhow::Result;
use feargreed::aggregate::aggregate_default;
use feargreed::config::Config;
use feargreed::controller::{ChartController, InputEvent};
use feargreed::feed::{load_dataset, source_for};
use feargreed::logging::{log, obj, v_num, v_str, Domain, Level};
use feargreed::render::{JsonLinesAdapter, RandomJitter, RenderAdapter};
use feargreed::timeseries::TimelineView;
use std::io::{self, BufRead};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let location = std::env::args().nth(1).unwrap_or_else(|| cfg.dataset.clone());
    let mut adapter = JsonLinesAdapter::new(
        io::stdout(),
        RandomJitter::new(cfg.jitter_seed),
        cfg.strip_jitter,
    );

    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("dataset", v_str(&location)),
            ("strip_jitter", v_num(cfg.strip_jitter)),
        ]),
    );

    let source = source_for(&location, cfg.fetch_timeout_secs);
    let loaded = load_dataset(source.as_ref()).await.and_then(|ds| {
        let summaries = aggregate_default(&ds.records)?;
        let view = TimelineView::new(&ds.records, cfg.chart_width, cfg.chart_height, cfg.zoom_extent())?;
        Ok((summaries, view))
    });
    let (summaries, view) = match loaded {
        Ok(parts) => parts,
        Err(err) => {
            adapter.render_error(&err)?;
            std::process::exit(1);
        }
    };

    let mut controller = ChartController::new(summaries, adapter)?.with_timeline(view)?;
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") {
            break;
        }
        match trimmed.parse::<InputEvent>() {
            Ok(event) => controller.handle(event)?,
            Err(err) => log(
                Level::Warn,
                Domain::Selection,
                "bad_event",
                obj(&[("input", v_str(trimmed)), ("msg", v_str(&err))]),
            ),
        }
    }

    log(
        Level::Info,
        Domain::System,
        "shutdown",
        obj(&[("idle", serde_json::json!(controller.selection().is_idle()))]),
    );
    Ok(())
}
