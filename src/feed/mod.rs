//! Dataset fetch: the one latent operation of a session.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::data::{parse_dataset, Dataset};
use crate::error::ChartError;
use crate::logging::{log_ingest, log_load_error};

#[async_trait]
pub trait DatasetSource: Send + Sync {
    fn location(&self) -> String;

    /// Fetch the whole CSV body. No streaming, no retry.
    async fn fetch(&self) -> Result<String, ChartError>;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String, ChartError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            let reason = if e.kind() == std::io::ErrorKind::NotFound {
                format!("not found: {}", e)
            } else {
                e.to_string()
            };
            ChartError::data_load(self.location(), reason)
        })
    }
}

pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(url: Url, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_else(|_| Client::new()),
            url,
        }
    }
}

fn describe_http_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("network error, could not connect: {}", err)
    } else {
        err.to_string()
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    fn location(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<String, ChartError> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| ChartError::data_load(self.location(), describe_http_error(&e)))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ChartError::data_load(self.location(), format!("HTTP {}", status)));
        }
        resp.text()
            .await
            .map_err(|e| ChartError::data_load(self.location(), describe_http_error(&e)))
    }
}

/// Pick a source for `location`: http(s) URLs are fetched over the network,
/// `file://` URLs and bare paths are read from disk.
pub fn source_for(location: &str, timeout_secs: u64) -> Box<dyn DatasetSource> {
    match Url::parse(location) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Box::new(HttpSource::new(url, timeout_secs))
        }
        Ok(url) if url.scheme() == "file" => match url.to_file_path() {
            Ok(path) => Box::new(FileSource::new(path)),
            Err(()) => Box::new(FileSource::new(location)),
        },
        _ => Box::new(FileSource::new(location)),
    }
}

/// Fetch and parse a dataset, logging the ingestion report or the failure.
pub async fn load_dataset(source: &dyn DatasetSource) -> Result<Dataset, ChartError> {
    let location = source.location();
    let result = match source.fetch().await {
        Ok(text) => parse_dataset(&text),
        Err(err) => Err(err),
    };
    match &result {
        Ok(ds) => log_ingest(&location, &ds.report),
        Err(err) => log_load_error(&location, err),
    }
    result
}
