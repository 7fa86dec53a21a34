//! Payload sources.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::cert::thumbprints_from_pem;
use crate::error::FetchError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that produces the run's payload, one entry per line.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, cancel: &CancellationToken) -> Result<Vec<String>, FetchError>;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
}

/// Downloads a PEM bundle and yields its certificate thumbprints.
#[derive(Debug, Clone)]
pub struct OriginCertFetcher {
    url: String,
    agent: ureq::Agent,
}

impl OriginCertFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        }
    }
}

fn download(agent: &ureq::Agent, url: &str) -> Result<String, FetchError> {
    let response = agent.get(url).call().map_err(|e| FetchError::Http {
        url: url.to_string(),
        source: Box::new(e),
    })?;
    response.into_string().map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })
}

#[async_trait]
impl SourceFetcher for OriginCertFetcher {
    async fn fetch(&self, cancel: &CancellationToken) -> Result<Vec<String>, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let agent = self.agent.clone();
        let url = self.url.clone();
        let task = tokio::task::spawn_blocking(move || download(&agent, &url));

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            joined = task => joined??,
        };

        let thumbprints = thumbprints_from_pem(&body)?;
        if thumbprints.is_empty() {
            return Err(FetchError::Empty(self.url.clone()));
        }
        tracing::info!(
            url = %self.url,
            count = thumbprints.len(),
            "fetched origin certificate thumbprints",
        );
        Ok(thumbprints)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads a prepared payload from disk; blank lines are dropped.
#[derive(Debug, Clone)]
pub struct LinesFileSource {
    path: PathBuf,
}

impl LinesFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SourceFetcher for LinesFileSource {
    async fn fetch(&self, cancel: &CancellationToken) -> Result<Vec<String>, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        let lines: Vec<String> = contents
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();
        if lines.is_empty() {
            return Err(FetchError::Empty(self.path.display().to_string()));
        }
        Ok(lines)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
