use std::fmt;
use std::path::Path;
use std::process::Stdio;

use serde::Serialize;
use slideshow_core::SlideshowConfig;
use tokio::process::Command;

#[derive(Debug, Serialize)]
pub struct HealthEntry {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckStatus::Ok => "OK",
            CheckStatus::Warn => "WARN",
            CheckStatus::Error => "ERROR",
        };
        write!(f, "{}", label)
    }
}

impl HealthEntry {
    fn ok(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Ok,
            detail: detail.into(),
        }
    }

    fn warn(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warn,
            detail: detail.into(),
        }
    }

    fn error(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Error,
            detail: detail.into(),
        }
    }
}

pub async fn execute(config: &SlideshowConfig, config_path: Option<&Path>) -> Vec<HealthEntry> {
    let mut results = Vec::new();
    results.push(match config_path {
        Some(path) => HealthEntry::ok("config", format!("{}", path.display())),
        None => HealthEntry::ok("config", "built-in defaults"),
    });

    let ffmpeg = &config.transcoder.ffmpeg_path;
    let version = check_ffmpeg_version(ffmpeg).await;
    let ffmpeg_usable = version.status == CheckStatus::Ok;
    results.push(version);
    if ffmpeg_usable {
        results.push(check_vp9_encoder(ffmpeg).await);
    }
    results
}

async fn check_ffmpeg_version(ffmpeg: &Path) -> HealthEntry {
    let output = Command::new(ffmpeg)
        .arg("-version")
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await;
    match output {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let banner = stdout.lines().next().unwrap_or("ffmpeg").trim().to_string();
            HealthEntry::ok("ffmpeg", banner)
        }
        Ok(output) => HealthEntry::error(
            "ffmpeg",
            match output.status.code() {
                Some(code) => format!("{} -version exited with status {code}", ffmpeg.display()),
                None => format!("{} -version was terminated by a signal", ffmpeg.display()),
            },
        ),
        Err(err) => HealthEntry::error(
            "ffmpeg",
            format!("could not run {}: {err}", ffmpeg.display()),
        ),
    }
}

async fn check_vp9_encoder(ffmpeg: &Path) -> HealthEntry {
    let output = Command::new(ffmpeg)
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await;
    match output {
        Ok(output) if output.status.success() => {
            if String::from_utf8_lossy(&output.stdout).contains("libvpx-vp9") {
                HealthEntry::ok("libvpx-vp9", "available for webm output")
            } else {
                HealthEntry::warn("libvpx-vp9", "encoder missing; webm output will fail")
            }
        }
        Ok(_) | Err(_) => HealthEntry::warn("libvpx-vp9", "could not list ffmpeg encoders"),
    }
}
