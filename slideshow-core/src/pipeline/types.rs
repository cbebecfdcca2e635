use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cleanup::FilesystemWarning;
use crate::transcode::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    ParsingManifest,
    Downloading,
    BuildingScript,
    Transcoding,
    CleaningUp,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::ParsingManifest => "parsing_manifest",
            PipelineStage::Downloading => "downloading",
            PipelineStage::BuildingScript => "building_script",
            PipelineStage::Transcoding => "transcoding",
            PipelineStage::CleaningUp => "cleaning_up",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    /// Next stage on the success path; terminal stages have none.
    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Idle => Some(PipelineStage::ParsingManifest),
            PipelineStage::ParsingManifest => Some(PipelineStage::Downloading),
            PipelineStage::Downloading => Some(PipelineStage::BuildingScript),
            PipelineStage::BuildingScript => Some(PipelineStage::Transcoding),
            PipelineStage::Transcoding => Some(PipelineStage::CleaningUp),
            PipelineStage::CleaningUp => Some(PipelineStage::Done),
            PipelineStage::Done | PipelineStage::Failed => None,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub artifact: PathBuf,
    pub format: OutputFormat,
    pub manifest_url: String,
    pub segments: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub cleanup_warnings: Vec<FilesystemWarning>,
    pub work_dir_removed: bool,
    pub completed_at: DateTime<Utc>,
}
