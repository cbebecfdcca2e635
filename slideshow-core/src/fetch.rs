use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::config::HttpSection;
use crate::error::{FetchError, FetchResult};

/// Retrieval seam used by the manifest and segment stages.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> FetchResult<String>;

    /// Writes the body of `url` to `path`. No file is left at `path` on error.
    async fn fetch_to_file(&self, url: &str, path: &Path) -> FetchResult<()>;
}

/// `reqwest`-backed fetcher. `file://` URLs are served from local disk.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(http: &HttpSection) -> FetchResult<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.as_str())
            .build()
            .map_err(|err| FetchError::Transport {
                url: String::new(),
                reason: err.to_string(),
            })?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> FetchResult<String> {
        if let Some(path) = local_path(url)? {
            return fs::read_to_string(&path)
                .await
                .map_err(|source| FetchError::Io { path, source });
        }
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn fetch_to_file(&self, url: &str, path: &Path) -> FetchResult<()> {
        let partial = partial_path(path);
        let result = self.stream_into(url, &partial).await;
        if let Err(err) = result {
            let _ = fs::remove_file(&partial).await;
            return Err(err);
        }
        fs::rename(&partial, path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl HttpFetcher {
    async fn stream_into(&self, url: &str, target: &Path) -> FetchResult<()> {
        if let Some(source_path) = local_path(url)? {
            fs::copy(&source_path, target)
                .await
                .map_err(|source| FetchError::Io {
                    path: source_path,
                    source,
                })?;
            return Ok(());
        }
        let response = self.client.get(url).send().await?.error_for_status()?;
        let mut stream = response.bytes_stream();
        let mut file = fs::File::create(target)
            .await
            .map_err(|source| FetchError::Io {
                path: target.to_path_buf(),
                source,
            })?;
        while let Some(chunk) = stream.next().await {
            let data = chunk?;
            file.write_all(&data)
                .await
                .map_err(|source| FetchError::Io {
                    path: target.to_path_buf(),
                    source,
                })?;
        }
        file.flush().await.map_err(|source| FetchError::Io {
            path: target.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

fn local_path(url: &str) -> FetchResult<Option<PathBuf>> {
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "file" => {
            parsed
                .to_file_path()
                .map(Some)
                .map_err(|_| FetchError::Transport {
                    url: url.to_string(),
                    reason: "invalid file url".to_string(),
                })
        }
        _ => Ok(None),
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("segment"));
    name.push(".part");
    path.with_file_name(name)
}
