use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io { source: io::Error, path: PathBuf },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        source: toml::de::Error,
        path: PathBuf,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Fatal conditions of a conversion run. The first one raised ends the run.
#[derive(Debug, Error)]
pub enum SlideshowError {
    #[error("failed to download playlist {url}: {reason}")]
    ManifestFetch { url: String, reason: String },
    #[error("no media segments found in playlist {url}")]
    EmptyManifest { url: String },
    #[error("failed to download segment {segment}: {reason}")]
    SegmentFetch { segment: String, reason: String },
    #[error("unsupported output format: {0:?} (expected mp4, webm or gif)")]
    UnsupportedFormat(String),
    #[error("ffmpeg {}:\n{stderr}", describe_exit(.status))]
    Transcode { status: Option<i32>, stderr: String },
    #[error("io error at {path}: {source}")]
    Io { source: io::Error, path: PathBuf },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SlideshowError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SlideshowError::Io {
            source,
            path: path.into(),
        }
    }
}

fn describe_exit(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

pub type SlideshowResult<T> = std::result::Result<T, SlideshowError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("io error at {path}: {source}")]
    Io { source: io::Error, path: PathBuf },
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        let url = error
            .url()
            .map(|url| url.to_string())
            .unwrap_or_default();
        match error.status() {
            Some(status) => FetchError::Status {
                url,
                status: status.as_u16(),
            },
            None => FetchError::Transport {
                url,
                reason: error.to_string(),
            },
        }
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcode_message_shows_plain_exit_code() {
        let err = SlideshowError::Transcode {
            status: Some(1),
            stderr: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "ffmpeg exited with status 1:\nboom");

        let err = SlideshowError::Transcode {
            status: None,
            stderr: String::new(),
        };
        assert!(err.to_string().starts_with("ffmpeg was terminated by a signal"));
    }
}
