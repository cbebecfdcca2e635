pub mod commands;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use slideshow_core::{load_slideshow_config, SlideshowConfig};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::check::{CheckStatus, HealthEntry};
use crate::commands::convert::ConvertArgs;

pub use progress::ProgressObserver;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] slideshow_core::ConfigError),
    #[error("{0}")]
    Conversion(#[from] slideshow_core::SlideshowError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    CheckFailed(String),
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Turn an m3u8 image playlist into a slideshow video", long_about = None)]
pub struct Cli {
    /// Path to slideshow.toml; built-in defaults are used when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a playlist and encode it into a single file
    Convert(ConvertArgs),
    /// Verify that ffmpeg and the configuration are usable
    Check,
}

pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Convert(args) => {
            let report = commands::convert::execute(config, args).await?;
            render(&report, cli.format)?;
        }
        Commands::Check => {
            let report = commands::check::execute(&config, cli.config.as_deref()).await;
            render(&report, cli.format)?;
            if report
                .iter()
                .any(|entry| matches!(entry.status, CheckStatus::Error))
            {
                return Err(AppError::CheckFailed(
                    "one or more checks failed".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<SlideshowConfig> {
    match &cli.config {
        Some(path) => {
            let config = load_slideshow_config(path)?;
            debug!(path = %path.display(), "loaded configuration");
            Ok(config)
        }
        None => Ok(SlideshowConfig::default()),
    }
}

fn render<T>(value: &T, format: ReportFormat) -> Result<()>
where
    T: Serialize + DisplayFallback,
{
    match format {
        ReportFormat::Text => {
            println!("{}", value.display());
            Ok(())
        }
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{}", json);
            Ok(())
        }
    }
}

pub(crate) trait DisplayFallback {
    fn display(&self) -> String;
}

impl DisplayFallback for slideshow_core::ConversionReport {
    fn display(&self) -> String {
        let mut lines = vec![
            format!("Created {}", self.artifact.display()),
            format!(
                "Segments: {} ({} downloaded, {} reused)",
                self.segments, self.downloaded, self.skipped
            ),
        ];
        for warning in &self.cleanup_warnings {
            lines.push(format!(
                "Warning: could not delete {}: {}",
                warning.path.display(),
                warning.reason
            ));
        }
        if !self.work_dir_removed {
            lines.push("Temporary folder was left in place".to_string());
        }
        lines.join("\n")
    }
}

impl DisplayFallback for Vec<HealthEntry> {
    fn display(&self) -> String {
        let mut lines = Vec::new();
        for entry in self {
            lines.push(format!(
                "[{status}] {name}: {detail}",
                status = entry.status,
                name = entry.name,
                detail = entry.detail
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use slideshow_core::{ConversionReport, FilesystemWarning, OutputFormat};

    fn sample_report(warnings: Vec<FilesystemWarning>, removed: bool) -> ConversionReport {
        ConversionReport {
            artifact: PathBuf::from("/out/output.mp4"),
            format: OutputFormat::Mp4,
            manifest_url: "http://h/x/list.m3u8".to_string(),
            segments: 3,
            downloaded: 2,
            skipped: 1,
            cleanup_warnings: warnings,
            work_dir_removed: removed,
            completed_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn parses_convert_command() {
        let cli = Cli::try_parse_from([
            "slideshowctl",
            "--format",
            "json",
            "convert",
            "--url",
            "http://h/x/list.m3u8",
            "--output-format",
            "webm",
            "--folder",
            "/tmp",
        ])
        .unwrap();
        assert_eq!(cli.format, ReportFormat::Json);
        match cli.command {
            Commands::Convert(args) => {
                assert_eq!(args.url, "http://h/x/list.m3u8");
                assert_eq!(args.output_format, "webm");
                assert_eq!(args.folder, PathBuf::from("/tmp"));
                assert!(!args.no_progress);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn output_format_defaults_to_mp4() {
        let cli = Cli::try_parse_from([
            "slideshowctl",
            "convert",
            "--url",
            "http://h/x/list.m3u8",
            "--folder",
            ".",
        ])
        .unwrap();
        match cli.command {
            Commands::Convert(args) => assert_eq!(args.output_format, "mp4"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_output_format() {
        let result = Cli::try_parse_from([
            "slideshowctl",
            "convert",
            "--url",
            "http://h/x/list.m3u8",
            "--output-format",
            "avi",
            "--folder",
            ".",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn loads_config_fixture_when_given() {
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("../configs/slideshow.toml");
        let cli = Cli::try_parse_from([
            "slideshowctl".to_string(),
            "--config".to_string(),
            fixture.to_string_lossy().to_string(),
            "check".to_string(),
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.paths.work_dir_name, "slideshow_temp");
    }

    #[test]
    fn report_text_mentions_artifact_and_warnings() {
        let report = sample_report(
            vec![FilesystemWarning {
                path: PathBuf::from("/out/slideshow_temp/a.jpg"),
                reason: "permission denied".to_string(),
            }],
            false,
        );
        let text = report.display();
        assert!(text.starts_with("Created /out/output.mp4"));
        assert!(text.contains("3 (2 downloaded, 1 reused)"));
        assert!(text.contains("could not delete /out/slideshow_temp/a.jpg: permission denied"));
        assert!(text.ends_with("Temporary folder was left in place"));
    }

    #[test]
    fn report_json_uses_lowercase_format() {
        let report = sample_report(Vec::new(), true);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["format"], "mp4");
        assert_eq!(json["segments"], 3);
        assert_eq!(json["work_dir_removed"], true);
    }
}
