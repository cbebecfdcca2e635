mod types;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cleanup::cleanup_work_dir;
use crate::concat::ConcatScript;
use crate::config::SlideshowConfig;
use crate::download::SegmentDownloader;
use crate::error::{SlideshowError, SlideshowResult};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::manifest::fetch_manifest;
use crate::observer::PipelineObserver;
use crate::transcode::{CommandExecutor, OutputFormat, Transcoder};

pub use types::{ConversionReport, PipelineStage};

/// Playlist-to-slideshow conversion: parse, download, script, transcode,
/// clean up. Stages run strictly in that order and the first error ends the
/// run without touching later stages.
pub struct SlideshowPipeline {
    config: Arc<SlideshowConfig>,
    fetcher: Arc<dyn Fetcher>,
    transcoder: Transcoder,
}

impl std::fmt::Debug for SlideshowPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideshowPipeline")
            .field("config", &self.config)
            .field("transcoder", &self.transcoder)
            .finish()
    }
}

impl SlideshowPipeline {
    pub fn new(config: SlideshowConfig) -> SlideshowResult<Self> {
        let fetcher = HttpFetcher::new(&config.http).map_err(|err| {
            SlideshowError::InvalidInput(format!("failed to build http client: {err}"))
        })?;
        let transcoder = Transcoder::new(&config.transcoder, &config.slideshow, None);
        Ok(Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            transcoder,
        })
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.transcoder = Transcoder::new(
            &self.config.transcoder,
            &self.config.slideshow,
            Some(executor),
        );
        self
    }

    pub fn config(&self) -> &SlideshowConfig {
        &self.config
    }

    /// Converts the playlist at `manifest_url` into
    /// `<output_folder>/<output_stem>.<ext>`.
    ///
    /// `output_format` is validated before any network or process activity.
    pub async fn run_conversion(
        &self,
        manifest_url: &str,
        output_format: &str,
        output_folder: &Path,
        observer: &dyn PipelineObserver,
    ) -> SlideshowResult<ConversionReport> {
        let format: OutputFormat = output_format.parse()?;
        let mut stages = StageTracker::new(observer);
        match self
            .execute(manifest_url, format, output_folder, observer, &mut stages)
            .await
        {
            Ok(report) => Ok(report),
            Err(err) => {
                warn!(stage = %stages.current(), error = %err, "conversion failed");
                stages.fail();
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        manifest_url: &str,
        format: OutputFormat,
        output_folder: &Path,
        observer: &dyn PipelineObserver,
        stages: &mut StageTracker<'_>,
    ) -> SlideshowResult<ConversionReport> {
        let work_dir = self.config.work_dir(output_folder);

        stages.advance(PipelineStage::ParsingManifest);
        observer.on_log(&format!("Fetching playlist {manifest_url}"));
        let manifest = fetch_manifest(self.fetcher.as_ref(), manifest_url).await?;
        observer.on_log(&format!(
            "Found {} segments in playlist",
            manifest.segments().len()
        ));

        stages.advance(PipelineStage::Downloading);
        let downloader = SegmentDownloader::new(self.fetcher.as_ref());
        let summary = downloader
            .download_all(
                manifest.segments(),
                manifest.base_url(),
                &work_dir,
                observer,
            )
            .await?;

        stages.advance(PipelineStage::BuildingScript);
        let script = ConcatScript::new(
            manifest.segments(),
            self.config.slideshow.segment_duration_seconds,
        )?;
        let script_path = script
            .write_to(&work_dir, &self.config.paths.script_name)
            .await?;

        stages.advance(PipelineStage::Transcoding);
        observer.on_log(&format!(
            "Running {} for {format} output",
            self.transcoder.ffmpeg_path().display()
        ));
        let artifact = self
            .transcoder
            .run(
                &script_path,
                &self.config.output_base(output_folder),
                format,
            )
            .await?;

        stages.advance(PipelineStage::CleaningUp);
        let cleanup = cleanup_work_dir(
            manifest.segments(),
            std::slice::from_ref(&script_path),
            &work_dir,
            observer,
        )
        .await;

        stages.advance(PipelineStage::Done);
        info!(artifact = %artifact.display(), "conversion finished");
        observer.on_log(&format!("Created {}", artifact.display()));

        Ok(ConversionReport {
            artifact,
            format,
            manifest_url: manifest.url().to_string(),
            segments: manifest.segments().len(),
            downloaded: summary.downloaded,
            skipped: summary.skipped,
            cleanup_warnings: cleanup.warnings,
            work_dir_removed: cleanup.work_dir_removed,
            completed_at: Utc::now(),
        })
    }
}

/// Reports stage transitions; stages only move forward.
struct StageTracker<'a> {
    observer: &'a dyn PipelineObserver,
    current: PipelineStage,
}

impl<'a> StageTracker<'a> {
    fn new(observer: &'a dyn PipelineObserver) -> Self {
        Self {
            observer,
            current: PipelineStage::Idle,
        }
    }

    fn current(&self) -> PipelineStage {
        self.current
    }

    fn advance(&mut self, stage: PipelineStage) {
        debug_assert_eq!(self.current.next(), Some(stage));
        self.enter(stage);
    }

    fn fail(&mut self) {
        self.enter(PipelineStage::Failed);
    }

    fn enter(&mut self, stage: PipelineStage) {
        debug!(stage = %stage, "entering stage");
        self.current = stage;
        self.observer.on_stage(stage);
    }
}
