//! Per-category grouping of index readings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::category::Category;
use crate::data::Record;
use crate::error::ChartError;
use crate::logging::{log_group_summary, v_num, ProfileScope};
use crate::stats::{compute_box_stats, BoxStats};

/// Box-plot summary for one category. Derived data: recompute, never patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub category: Category,
    /// Values in original record order (strip-plot point identity).
    pub values: Vec<f64>,
    pub stats: BoxStats,
    /// Records of this category with a finite value, for the detail view.
    pub raw_data: Vec<Record>,
}

impl GroupSummary {
    pub fn count(&self) -> usize {
        self.stats.count
    }
}

/// Partition `records` by category and summarize each present category in
/// `order`. Records with a non-finite value are left out, and categories
/// left without records are omitted.
pub fn aggregate(records: &[Record], order: &[Category]) -> Result<Vec<GroupSummary>, ChartError> {
    if records.is_empty() {
        return Err(ChartError::NoData("no records to aggregate".to_string()));
    }
    let _scope = ProfileScope::with_context("aggregate", &[("records", v_num(records.len() as f64))]);

    let mut groups: HashMap<Category, Vec<Record>> = HashMap::new();
    for rec in records {
        if !rec.value.is_finite() {
            continue;
        }
        if let Some(cat) = rec.category() {
            groups.entry(cat).or_default().push(rec.clone());
        }
    }

    let mut out = Vec::new();
    for &category in order {
        let Some(raw_data) = groups.remove(&category) else {
            continue;
        };
        let values: Vec<f64> = raw_data.iter().map(|r| r.value).collect();
        let stats = compute_box_stats(&values)?;
        log_group_summary(category, &stats);
        out.push(GroupSummary {
            category,
            values,
            stats,
            raw_data,
        });
    }

    if out.is_empty() {
        return Err(ChartError::NoData(
            "no record matches a recognized classification".to_string(),
        ));
    }
    Ok(out)
}

pub fn aggregate_default(records: &[Record]) -> Result<Vec<GroupSummary>, ChartError> {
    aggregate(records, &Category::ORDER)
}
