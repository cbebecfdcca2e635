use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tracing::{debug, warn};

use crate::download::is_contained;
use crate::observer::PipelineObserver;

/// A deletion that failed during cleanup. Never fatal.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FilesystemWarning {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: usize,
    pub warnings: Vec<FilesystemWarning>,
    pub work_dir_removed: bool,
}

/// Deletes downloaded segments plus any extra run files (the concat script),
/// then tries to remove the working directory if it ended up empty.
pub async fn cleanup_work_dir(
    segments: &[String],
    extra_files: &[PathBuf],
    work_dir: &Path,
    observer: &dyn PipelineObserver,
) -> CleanupReport {
    let mut report = CleanupReport::default();
    let targets = segments
        .iter()
        .filter(|segment| is_contained(segment))
        .map(|segment| work_dir.join(segment))
        .chain(extra_files.iter().cloned());
    for path in targets {
        match fs::remove_file(&path).await {
            Ok(()) => report.removed += 1,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not delete file");
                observer.on_log(&format!(
                    "Warning: could not delete {}: {err}",
                    path.display()
                ));
                report.warnings.push(FilesystemWarning {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    for dir in nested_dirs(segments, work_dir) {
        if let Err(err) = fs::remove_dir(&dir).await {
            debug!(path = %dir.display(), error = %err, "segment directory kept");
        }
    }

    match fs::remove_dir(work_dir).await {
        Ok(()) => report.work_dir_removed = true,
        Err(err) => {
            debug!(path = %work_dir.display(), error = %err, "working directory kept");
        }
    }
    report
}

/// Directories created for nested segment names, deepest first.
fn nested_dirs(segments: &[String], work_dir: &Path) -> Vec<PathBuf> {
    let mut dirs = BTreeSet::new();
    for segment in segments.iter().filter(|segment| is_contained(segment)) {
        let mut parent = Path::new(segment.as_str()).parent();
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() || dir == Path::new(".") {
                break;
            }
            dirs.insert(dir.to_path_buf());
            parent = dir.parent();
        }
    }
    let mut dirs: Vec<PathBuf> = dirs.into_iter().collect();
    dirs.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));
    dirs.into_iter().map(|dir| work_dir.join(dir)).collect()
}
