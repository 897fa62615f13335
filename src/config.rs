use crate::timeseries::DEFAULT_ZOOM_EXTENT;

#[derive(Debug, Clone)]
pub struct Config {
    /// File path or http(s) URL of the dataset CSV.
    pub dataset: String,
    pub fetch_timeout_secs: u64,
    pub chart_width: f64,
    pub chart_height: f64,
    /// Horizontal spread of strip-plot points, in pixels.
    pub strip_jitter: f64,
    pub jitter_seed: Option<u64>,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub data_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: "fear_greed_index.csv".to_string(),
            fetch_timeout_secs: 10,
            chart_width: 850.0,
            chart_height: 380.0,
            strip_jitter: 40.0,
            jitter_seed: None,
            zoom_min: DEFAULT_ZOOM_EXTENT.0,
            zoom_max: DEFAULT_ZOOM_EXTENT.1,
            data_ttl_secs: 172_800,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            dataset: std::env::var("DATASET").unwrap_or(d.dataset),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.fetch_timeout_secs),
            chart_width: std::env::var("CHART_WIDTH").ok().and_then(|v| v.parse().ok()).unwrap_or(d.chart_width),
            chart_height: std::env::var("CHART_HEIGHT").ok().and_then(|v| v.parse().ok()).unwrap_or(d.chart_height),
            strip_jitter: std::env::var("STRIP_JITTER").ok().and_then(|v| v.parse().ok()).unwrap_or(d.strip_jitter),
            jitter_seed: std::env::var("JITTER_SEED").ok().and_then(|v| v.parse().ok()),
            zoom_min: std::env::var("ZOOM_MIN").ok().and_then(|v| v.parse().ok()).unwrap_or(d.zoom_min),
            zoom_max: std::env::var("ZOOM_MAX").ok().and_then(|v| v.parse().ok()).unwrap_or(d.zoom_max),
            data_ttl_secs: std::env::var("DATA_TTL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.data_ttl_secs),
        }
    }

    pub fn zoom_extent(&self) -> (f64, f64) {
        if self.zoom_min > 0.0 && self.zoom_min <= self.zoom_max {
            (self.zoom_min, self.zoom_max)
        } else {
            DEFAULT_ZOOM_EXTENT
        }
    }
}
