use color_eyre::Result;
use eyre::Context as _;
use metrics_tracker_series::{
    DocumentError,
    SourceRef,
};
use reqwest::{
    header,
    Client,
};
use std::{
    future::Future,
    pin::Pin,
    time::Duration,
};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to fetch {source_ref}: {reason}")]
    Transport { source_ref: SourceRef, reason: String },
    #[error("Failed to fetch {source_ref}: HTTP status {status}")]
    Status { source_ref: SourceRef, status: u16 },
    #[error("Malformed metrics data: {0}")]
    MalformedData(#[from] DocumentError),
}

impl LoadError {
    /// Transport failures may be retried against a backup source, malformed data may not.
    pub fn is_transport(&self) -> bool {
        matches!(self, LoadError::Transport { .. } | LoadError::Status { .. })
    }
}

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>, LoadError>> + Send + 'a>>;

/// Retrieves the raw bytes of a metrics document.
pub trait Fetch {
    /// `fresh` asks intermediaries not to serve a cached copy.
    fn fetch<'a>(&'a self, source: &'a SourceRef, fresh: bool) -> FetchFuture<'a>;
}

/// Reads URLs over HTTP(S) and everything else from the filesystem.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: Client,
}

impl SourceFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .wrap_err("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    async fn fetch_source(&self, source: &SourceRef, fresh: bool) -> Result<Vec<u8>, LoadError> {
        let transport = |reason: String| LoadError::Transport {
            source_ref: source.clone(),
            reason,
        };

        match source {
            SourceRef::Url(url) => {
                let mut request = self.client.get(url.clone());
                if fresh {
                    request = request.header(header::CACHE_CONTROL, "no-cache");
                }
                let response = request.send().await.map_err(|e| transport(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        source_ref: source.clone(),
                        status: status.as_u16(),
                    });
                }
                let bytes = response.bytes().await.map_err(|e| transport(e.to_string()))?;
                Ok(bytes.to_vec())
            }
            SourceRef::Path(path) => tokio::fs::read(path).await.map_err(|e| transport(e.to_string())),
        }
    }
}

impl Fetch for SourceFetcher {
    fn fetch<'a>(&'a self, source: &'a SourceRef, fresh: bool) -> FetchFuture<'a> {
        Box::pin(self.fetch_source(source, fresh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn reads_files_and_reports_missing_ones() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.child("x_metrics.json");
        std::fs::write(&path, br#"{"followers":[]}"#).unwrap();
        let fetcher = SourceFetcher::new(Duration::from_secs(5)).unwrap();

        let bytes = fetcher.fetch(&SourceRef::Path(path), false).await.unwrap();
        assert_eq!(bytes, br#"{"followers":[]}"#);

        let err = fetcher
            .fetch(&SourceRef::Path(dir.child("missing.json")), false)
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn malformed_data_is_not_a_transport_error() {
        let err = LoadError::from(DocumentError::Shape);
        assert!(!err.is_transport());
        assert!(err.to_string().starts_with("Malformed metrics data"));
    }
}
