//! Print the per-classification box-plot summaries as JSON.

use anyhow::Result;
use feargreed::aggregate::aggregate_default;
use feargreed::config::Config;
use feargreed::feed::{load_dataset, source_for};
use feargreed::timeseries::CombinedSeries;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let location = std::env::args().nth(1).unwrap_or_else(|| cfg.dataset.clone());
    let source = source_for(&location, cfg.fetch_timeout_secs);
    let ds = load_dataset(source.as_ref()).await?;
    let summaries = aggregate_default(&ds.records)?;

    let groups: Vec<_> = summaries
        .iter()
        .map(|g| {
            json!({
                "classification": g.category.label(),
                "color": g.category.color(),
                "stats": g.stats,
            })
        })
        .collect();
    let combined = CombinedSeries::from_records(&ds.records).map(|c| {
        json!({
            "points": c.points.len(),
            "price_domain": c.price_domain,
            "sentiment_domain": c.sentiment_domain,
        })
    });

    let out = json!({
        "source": location,
        "report": ds.report,
        "groups": groups,
        "combined": combined,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
