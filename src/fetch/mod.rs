// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};
use url::Url;

pub mod http;

static MEDLINE_URL: &str = "https://ftp.ncbi.nih.gov/pubmed/J_Medline.txt";
static DOAJ_URL: &str = "https://doaj.org/csv";

/// The two journal lists the pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// NLM's MEDLINE journal list, fixed-format text.
    Medline,
    /// Directory of Open Access Journals, CSV export.
    Doaj,
}

impl Dataset {
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Medline => "medline",
            Dataset::Doaj => "doaj",
        }
    }

    pub fn default_url(&self) -> &'static str {
        match self {
            Dataset::Medline => MEDLINE_URL,
            Dataset::Doaj => DOAJ_URL,
        }
    }

    pub fn cache_file_name(&self) -> &'static str {
        match self {
            Dataset::Medline => "pubmed_journal_list.txt",
            Dataset::Doaj => "doaj_journal_list.csv",
        }
    }
}

/// Where a dataset comes from and where its last payload is kept.
#[derive(Debug, Clone)]
pub struct DatasetSource {
    pub dataset: Dataset,
    pub url: Url,
    pub cache_path: PathBuf,
}

impl DatasetSource {
    pub fn new(dataset: Dataset, url: &str, cache_dir: impl AsRef<Path>) -> Result<Self> {
        let url = Url::parse(url)
            .with_context(|| format!("parsing {} URL {}", dataset.name(), url))?;
        Ok(Self {
            dataset,
            url,
            cache_path: cache_dir.as_ref().join(dataset.cache_file_name()),
        })
    }
}

/// Return the dataset text, from the cache file unless it is missing or
/// `refresh` is set. A download always overwrites the cache file.
#[instrument(level = "info", skip(client, source), fields(dataset = source.dataset.name()))]
pub async fn load_or_fetch(client: &Client, source: &DatasetSource, refresh: bool) -> Result<String> {
    let cache = &source.cache_path;

    if !refresh && fs::try_exists(cache).await.unwrap_or(false) {
        let text = fs::read_to_string(cache)
            .await
            .with_context(|| format!("reading cache file {}", cache.display()))?;
        info!(path = %cache.display(), bytes = text.len(), "read from file");
        return Ok(text);
    }

    let text = http::get_text(client, &source.url).await?;

    if let Some(parent) = cache.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating cache directory {}", parent.display()))?;
    }
    fs::write(cache, text.as_bytes())
        .await
        .with_context(|| format!("writing cache file {}", cache.display()))?;
    debug!(path = %cache.display(), "cache file replaced");
    info!(url = %source.url, bytes = text.len(), "downloaded and saved to file");

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::init_test_logging;
    use anyhow::Result;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `status` + `body` to every connection until the task is dropped.
    async fn serve(status: &'static str, body: &'static str) -> Result<(String, tokio::task::JoinHandle<()>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = vec![0u8; 4096];
                let mut seen = Vec::new();
                while let Ok(n) = sock.read(&mut buf).await {
                    if n == 0 {
                        break;
                    }
                    seen.extend_from_slice(&buf[..n]);
                    if seen.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let resp = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        Ok((format!("http://{}/J_Medline.txt", addr), handle))
    }

    #[tokio::test]
    async fn downloads_when_cache_missing_and_writes_cache() -> Result<()> {
        init_test_logging();
        let (url, server) = serve("200 OK", "JrId: 1\n").await?;
        let dir = tempdir()?;
        let source = DatasetSource::new(Dataset::Medline, &url, dir.path().join("nested"))?;

        let text = load_or_fetch(&Client::new(), &source, false).await?;
        assert_eq!(text, "JrId: 1\n");
        assert_eq!(std::fs::read_to_string(&source.cache_path)?, "JrId: 1\n");

        server.abort();
        Ok(())
    }

    #[tokio::test]
    async fn prefers_cache_unless_refresh() -> Result<()> {
        init_test_logging();
        let (url, server) = serve("200 OK", "fresh").await?;
        let dir = tempdir()?;
        let source = DatasetSource::new(Dataset::Doaj, &url, dir.path())?;
        std::fs::write(&source.cache_path, "stale")?;

        let cached = load_or_fetch(&Client::new(), &source, false).await?;
        assert_eq!(cached, "stale");

        let refreshed = load_or_fetch(&Client::new(), &source, true).await?;
        assert_eq!(refreshed, "fresh");
        assert_eq!(std::fs::read_to_string(&source.cache_path)?, "fresh");

        server.abort();
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_an_error_and_leaves_cache_alone() -> Result<()> {
        init_test_logging();
        let (url, server) = serve("404 Not Found", "missing").await?;
        let dir = tempdir()?;
        let source = DatasetSource::new(Dataset::Doaj, &url, dir.path())?;

        let err = load_or_fetch(&Client::new(), &source, true).await;
        assert!(err.is_err());
        assert!(!source.cache_path.exists());

        server.abort();
        Ok(())
    }

    #[test]
    fn rejects_malformed_url() {
        assert!(DatasetSource::new(Dataset::Medline, "not a url", ".").is_err());
    }

    #[test]
    fn cache_path_uses_dataset_file_name() -> Result<()> {
        let source = DatasetSource::new(Dataset::Doaj, Dataset::Doaj.default_url(), "cache")?;
        assert_eq!(source.cache_path, Path::new("cache").join("doaj_journal_list.csv"));
        Ok(())
    }
}
