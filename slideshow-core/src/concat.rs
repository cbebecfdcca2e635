use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{SlideshowError, SlideshowResult};

/// Input file for ffmpeg's `concat` demuxer.
///
/// Each segment gets a `file` line followed by a `duration` line. The last
/// segment is listed once more without a duration: the demuxer derives an
/// entry's duration from the next entry, so without the repeat the final
/// image would be shown for zero seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatScript<'a> {
    segments: &'a [String],
    segment_duration: u32,
}

impl<'a> ConcatScript<'a> {
    pub fn new(segments: &'a [String], segment_duration: u32) -> SlideshowResult<Self> {
        if segments.is_empty() {
            return Err(SlideshowError::InvalidInput(
                "concat script needs at least one segment".to_string(),
            ));
        }
        Ok(Self {
            segments,
            segment_duration,
        })
    }

    pub fn render(&self) -> String {
        let mut script = String::new();
        for segment in self.segments {
            let _ = writeln!(script, "file '{}'", quote(segment));
            let _ = writeln!(script, "duration {}", self.segment_duration);
        }
        if let Some(last) = self.segments.last() {
            let _ = writeln!(script, "file '{}'", quote(last));
        }
        script
    }

    pub async fn write_to(&self, work_dir: &Path, script_name: &str) -> SlideshowResult<PathBuf> {
        let path = work_dir.join(script_name);
        fs::write(&path, self.render())
            .await
            .map_err(|source| SlideshowError::io(&path, source))?;
        Ok(path)
    }
}

// Single quotes close the quoted run, emit an escaped quote, and reopen it.
fn quote(name: &str) -> String {
    name.replace('\'', r"'\''")
}
