#![allow(dead_code)]

use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::Mutex;

use slideshow_core::error::{FetchError, FetchResult};
use slideshow_core::{CommandExecutor, Fetcher};
use tokio::process::Command;

/// In-memory stand-in for HTTP that remembers every requested URL.
#[derive(Debug, Default)]
pub struct FakeFetcher {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: impl AsRef<[u8]>) -> Self {
        self.bodies.insert(url.to_string(), body.as_ref().to_vec());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn lookup(&self, url: &str) -> FetchResult<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[async_trait::async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> FetchResult<String> {
        let body = self.lookup(url)?;
        Ok(String::from_utf8_lossy(&body).to_string())
    }

    async fn fetch_to_file(&self, url: &str, path: &Path) -> FetchResult<()> {
        let body = self.lookup(url)?;
        tokio::fs::write(path, body)
            .await
            .map_err(|source| FetchError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// Captures ffmpeg invocations instead of running them. On success the last
/// argument (the output path) is created, the way ffmpeg would.
#[derive(Debug)]
pub struct RecordingExecutor {
    exit_code: i32,
    stderr: String,
    commands: Mutex<Vec<RecordedCommand>>,
}

impl RecordingExecutor {
    pub fn succeeding() -> Self {
        Self {
            exit_code: 0,
            stderr: String::new(),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(exit_code: i32, stderr: &str) -> Self {
        Self {
            exit_code,
            stderr: stderr.to_string(),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn run(&self, command: &mut Command) -> std::io::Result<Output> {
        let std_command = command.as_std();
        let recorded = RecordedCommand {
            program: PathBuf::from(std_command.get_program()),
            args: std_command
                .get_args()
                .map(|arg| arg.to_string_lossy().to_string())
                .collect(),
        };
        if self.exit_code == 0 {
            if let Some(output) = recorded.args.last() {
                std::fs::write(output, b"artifact")?;
            }
        }
        self.commands.lock().unwrap().push(recorded);
        Ok(Output {
            status: ExitStatus::from_raw(self.exit_code << 8),
            stdout: Vec::new(),
            stderr: self.stderr.clone().into_bytes(),
        })
    }
}
