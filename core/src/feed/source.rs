use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::prelude::{CoreError, CoreResult};

/// Relative path of the published Kp series.
pub const DEFAULT_RESOURCE_PATH: &str = "/space_weather_data.csv";

/// Upper bound on one HTTP fetch, connect through body.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the raw Kp table comes from.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    async fn fetch(&self) -> CoreResult<String>;
    fn describe(&self) -> String;
}

/// GETs the table over HTTP. Any non-2xx status is a fetch failure.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> CoreResult<Self> {
        Self::with_timeout(url, FETCH_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> CoreResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Joins a server base URL and a resource path such as [`DEFAULT_RESOURCE_PATH`].
    pub fn from_base(base: &str, path: &str) -> CoreResult<Self> {
        Self::new(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SeriesSource for HttpSource {
    async fn fetch(&self) -> CoreResult<String> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Fetch(format!("{} returned {}", self.url, status)));
        }
        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the table from the local filesystem.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SeriesSource for FileSource {
    async fn fetch(&self) -> CoreResult<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| CoreError::Fetch(format!("{}: {}", self.path.display(), err)))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// `http://` and `https://` locations are fetched over HTTP, anything else is a file path.
pub fn source_for(location: &str) -> CoreResult<Arc<dyn SeriesSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Arc::new(HttpSource::new(location)?))
    } else {
        Ok(Arc::new(FileSource::new(location)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn base_and_path_are_joined_once() {
        let source = HttpSource::from_base("http://localhost:8080/", DEFAULT_RESOURCE_PATH).unwrap();
        assert_eq!(source.url(), "http://localhost:8080/space_weather_data.csv");
    }

    #[test]
    fn location_scheme_selects_source() {
        assert_eq!(
            source_for("https://example.invalid/kp.csv").unwrap().describe(),
            "https://example.invalid/kp.csv"
        );
        assert_eq!(source_for("data/kp.csv").unwrap().describe(), "data/kp.csv");
    }

    #[tokio::test]
    async fn file_source_reads_contents() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"time,kp_index\n00:00,1\n").unwrap();
        let source = FileSource::new(temp.path());
        assert_eq!(source.fetch().await.unwrap(), "time,kp_index\n00:00,1\n");
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_failure() {
        let source = FileSource::new("/nonexistent/space_weather_data.csv");
        assert!(matches!(source.fetch().await, Err(CoreError::Fetch(_))));
    }

    #[tokio::test]
    async fn unresponsive_server_times_out() {
        // accepted by the backlog, never answered
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/space_weather_data.csv", listener.local_addr().unwrap());
        let source = HttpSource::with_timeout(url, Duration::from_millis(200)).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), source.fetch())
            .await
            .expect("fetch should give up on its own");
        assert!(matches!(result, Err(CoreError::Fetch(_))));
        drop(listener);
    }
}
