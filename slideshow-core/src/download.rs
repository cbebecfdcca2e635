use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{SlideshowError, SlideshowResult};
use crate::fetch::Fetcher;
use crate::observer::PipelineObserver;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub files: Vec<PathBuf>,
}

/// Fetches playlist segments into the working directory, one at a time.
pub struct SegmentDownloader<'a, F: ?Sized> {
    fetcher: &'a F,
}

impl<'a, F> SegmentDownloader<'a, F>
where
    F: Fetcher + ?Sized,
{
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// Segments already present under `work_dir` are not fetched again. The
    /// first failure aborts the loop and leaves earlier files in place.
    ///
    /// Every segment name must stay inside `work_dir`; the playlist is rejected
    /// before anything is fetched otherwise.
    pub async fn download_all(
        &self,
        segments: &[String],
        base_url: &str,
        work_dir: &Path,
        observer: &dyn PipelineObserver,
    ) -> SlideshowResult<DownloadSummary> {
        for segment in segments {
            ensure_contained(segment)?;
        }
        fs::create_dir_all(work_dir)
            .await
            .map_err(|source| SlideshowError::io(work_dir, source))?;

        let total = segments.len();
        let mut summary = DownloadSummary::default();
        for (index, segment) in segments.iter().enumerate() {
            let local_path = work_dir.join(segment);
            let present = fs::try_exists(&local_path)
                .await
                .map_err(|source| SlideshowError::io(&local_path, source))?;
            if present {
                debug!(segment = %segment, "segment already present");
                observer.on_log(&format!("Skipping {segment} (already present)"));
                summary.skipped += 1;
            } else {
                self.fetch_segment(segment, base_url, &local_path).await?;
                info!(segment = %segment, path = %local_path.display(), "downloaded segment");
                observer.on_log(&format!("Downloaded {segment}"));
                summary.downloaded += 1;
            }
            summary.files.push(local_path);
            observer.on_progress(index + 1, total);
        }
        Ok(summary)
    }

    async fn fetch_segment(
        &self,
        segment: &str,
        base_url: &str,
        local_path: &Path,
    ) -> SlideshowResult<()> {
        if let Some(parent) = local_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| SlideshowError::io(parent, source))?;
        }
        let url = format!("{base_url}{segment}");
        self.fetcher
            .fetch_to_file(&url, local_path)
            .await
            .map_err(|err| SlideshowError::SegmentFetch {
                segment: segment.to_string(),
                reason: err.to_string(),
            })
    }
}

/// Segment names are relative paths made only of normal components.
pub(crate) fn is_contained(segment: &str) -> bool {
    let path = Path::new(segment);
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

fn ensure_contained(segment: &str) -> SlideshowResult<()> {
    if is_contained(segment) {
        Ok(())
    } else {
        Err(SlideshowError::SegmentFetch {
            segment: segment.to_string(),
            reason: "segment path escapes working directory".to_string(),
        })
    }
}
