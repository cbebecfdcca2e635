use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::{SlideshowSection, TranscoderSection};
use crate::error::{SlideshowError, SlideshowResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Mp4,
    Webm,
    Gif,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Mp4, OutputFormat::Webm, OutputFormat::Gif];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Webm => "webm",
            OutputFormat::Gif => "gif",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = SlideshowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(OutputFormat::Mp4),
            "webm" => Ok(OutputFormat::Webm),
            "gif" => Ok(OutputFormat::Gif),
            _ => Err(SlideshowError::UnsupportedFormat(value.to_string())),
        }
    }
}

#[async_trait::async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, command: &mut Command) -> std::io::Result<std::process::Output>;
}

#[derive(Debug, Default)]
pub struct SystemCommandExecutor;

#[async_trait::async_trait]
impl CommandExecutor for SystemCommandExecutor {
    async fn run(&self, command: &mut Command) -> std::io::Result<std::process::Output> {
        command.kill_on_drop(true).output().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodePlan {
    pub args: Vec<String>,
    pub artifact: PathBuf,
}

pub struct Transcoder {
    ffmpeg: PathBuf,
    overwrite: bool,
    gif: SlideshowSection,
    executor: Arc<dyn CommandExecutor>,
}

impl fmt::Debug for Transcoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcoder")
            .field("ffmpeg", &self.ffmpeg)
            .field("overwrite", &self.overwrite)
            .field("gif", &self.gif)
            .finish()
    }
}

impl Transcoder {
    pub fn new(
        transcoder: &TranscoderSection,
        slideshow: &SlideshowSection,
        executor: Option<Arc<dyn CommandExecutor>>,
    ) -> Self {
        let executor = executor.unwrap_or_else(|| Arc::new(SystemCommandExecutor));
        Self {
            ffmpeg: transcoder.ffmpeg_path.clone(),
            overwrite: transcoder.overwrite,
            gif: slideshow.clone(),
            executor,
        }
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn plan(&self, script: &Path, output_base: &Path, format: OutputFormat) -> TranscodePlan {
        let mut artifact = OsString::from(output_base.as_os_str());
        artifact.push(".");
        artifact.push(format.extension());
        let artifact = PathBuf::from(artifact);

        let mut args = Vec::new();
        if self.overwrite {
            args.push("-y".to_string());
        }
        args.extend(
            ["-f", "concat", "-safe", "0", "-i"]
                .iter()
                .map(|arg| arg.to_string()),
        );
        args.push(script.to_string_lossy().to_string());
        match format {
            OutputFormat::Mp4 => {
                args.extend(
                    ["-vsync", "vfr", "-pix_fmt", "yuv420p"]
                        .iter()
                        .map(|arg| arg.to_string()),
                );
            }
            OutputFormat::Webm => {
                args.extend(
                    ["-vsync", "vfr", "-pix_fmt", "yuv420p", "-c:v", "libvpx-vp9"]
                        .iter()
                        .map(|arg| arg.to_string()),
                );
            }
            OutputFormat::Gif => {
                args.push("-vf".to_string());
                args.push(format!(
                    "fps={},scale={}:-1:flags={}",
                    self.gif.gif_fps, self.gif.gif_width, self.gif.gif_scale_flags
                ));
                args.push("-loop".to_string());
                args.push("0".to_string());
            }
        }
        args.push(artifact.to_string_lossy().to_string());
        TranscodePlan { args, artifact }
    }

    /// Runs ffmpeg and returns the artifact path. A non-zero exit carries
    /// ffmpeg's stderr unchanged.
    pub async fn run(
        &self,
        script: &Path,
        output_base: &Path,
        format: OutputFormat,
    ) -> SlideshowResult<PathBuf> {
        let plan = self.plan(script, output_base, format);
        info!(
            command = %format!("{} {}", self.ffmpeg.display(), plan.args.join(" ")),
            "running ffmpeg"
        );
        let mut command = Command::new(&self.ffmpeg);
        command.args(&plan.args);
        let output = self
            .executor
            .run(&mut command)
            .await
            .map_err(|source| SlideshowError::io(&self.ffmpeg, source))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            warn!(status = ?output.status.code(), "ffmpeg failed");
            return Err(SlideshowError::Transcode {
                status: output.status.code(),
                stderr,
            });
        }
        Ok(plan.artifact)
    }
}
