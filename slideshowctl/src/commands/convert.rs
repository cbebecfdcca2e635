use std::path::PathBuf;

use clap::Args;
use slideshow_core::{
    ConversionReport, PipelineObserver, SlideshowConfig, SlideshowPipeline, TracingObserver,
};

use crate::progress::ProgressObserver;
use crate::{AppError, Result};

/// Downloads an m3u8 image playlist and encodes it into one file.
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Playlist URL; must end with .m3u8
    #[arg(short, long)]
    pub url: String,

    /// Output format
    #[arg(
        short,
        long,
        default_value = "mp4",
        value_parser = ["mp4", "webm", "gif"],
        value_name = "FORMAT"
    )]
    pub output_format: String,

    /// Existing folder that receives output.<ext>
    #[arg(short, long)]
    pub folder: PathBuf,

    /// Log progress lines instead of drawing a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

pub fn validate(args: &ConvertArgs) -> Result<()> {
    if !args.url.trim().ends_with(".m3u8") {
        return Err(AppError::InvalidInput(format!(
            "URL must end with .m3u8: {}",
            args.url
        )));
    }
    if !args.folder.is_dir() {
        return Err(AppError::InvalidInput(format!(
            "output folder {} does not exist or is not a directory",
            args.folder.display()
        )));
    }
    Ok(())
}

pub async fn execute(config: SlideshowConfig, args: &ConvertArgs) -> Result<ConversionReport> {
    validate(args)?;
    let pipeline = SlideshowPipeline::new(config)?;

    if args.no_progress {
        return run_with(&pipeline, args, &TracingObserver).await;
    }
    let progress = ProgressObserver::new();
    let result = run_with(&pipeline, args, &progress).await;
    progress.finish();
    result
}

async fn run_with(
    pipeline: &SlideshowPipeline,
    args: &ConvertArgs,
    observer: &dyn PipelineObserver,
) -> Result<ConversionReport> {
    let report = pipeline
        .run_conversion(
            args.url.trim(),
            &args.output_format,
            &args.folder,
            observer,
        )
        .await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(url: &str, folder: PathBuf) -> ConvertArgs {
        ConvertArgs {
            url: url.to_string(),
            output_format: "mp4".to_string(),
            folder,
            no_progress: true,
        }
    }

    #[test]
    fn accepts_m3u8_url_and_existing_folder() {
        let dir = TempDir::new().unwrap();
        validate(&args("http://h/x/list.m3u8", dir.path().to_path_buf())).unwrap();
    }

    #[test]
    fn rejects_non_playlist_url() {
        let dir = TempDir::new().unwrap();
        let err = validate(&args("http://h/x/list.mpd", dir.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref msg) if msg.contains(".m3u8")));
    }

    #[test]
    fn rejects_missing_folder() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = validate(&args("http://h/x/list.m3u8", missing)).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref msg) if msg.contains("nope")));
    }

    #[test]
    fn rejects_file_as_folder() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(validate(&args("http://h/x/list.m3u8", file)).is_err());
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_network() {
        let dir = TempDir::new().unwrap();
        let err = execute(
            SlideshowConfig::default(),
            &args("http://127.0.0.1:9/list.txt", dir.path().to_path_buf()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(!dir.path().join("slideshow_temp").exists());
    }

    #[tokio::test]
    async fn local_playlist_failure_reports_segment() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("list.m3u8"), "#EXTM3U\nmissing.jpg\n").unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let url = format!("file://{}/list.m3u8", source.display());

        let err = execute(SlideshowConfig::default(), &args(&url, out.clone()))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("missing.jpg"));
        assert!(out.join("slideshow_temp").is_dir());
    }
}
