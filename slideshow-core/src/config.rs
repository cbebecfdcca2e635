use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SlideshowConfig {
    pub paths: PathsSection,
    pub http: HttpSection,
    pub transcoder: TranscoderSection,
    pub slideshow: SlideshowSection,
}

impl SlideshowConfig {
    /// Transient directory that receives segments and the concat script.
    pub fn work_dir<P: AsRef<Path>>(&self, output_folder: P) -> PathBuf {
        output_folder.as_ref().join(&self.paths.work_dir_name)
    }

    /// Output path without extension; the transcoder appends the format's.
    pub fn output_base<P: AsRef<Path>>(&self, output_folder: P) -> PathBuf {
        output_folder.as_ref().join(&self.paths.output_stem)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub work_dir_name: String,
    pub script_name: String,
    pub output_stem: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            work_dir_name: "slideshow_temp".to_string(),
            script_name: "input.txt".to_string(),
            output_stem: "output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub user_agent: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            user_agent: concat!("slideshow/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscoderSection {
    pub ffmpeg_path: PathBuf,
    pub overwrite: bool,
}

impl Default for TranscoderSection {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            overwrite: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SlideshowSection {
    pub segment_duration_seconds: u32,
    pub gif_fps: u32,
    pub gif_width: u32,
    pub gif_scale_flags: String,
}

impl Default for SlideshowSection {
    fn default() -> Self {
        Self {
            segment_duration_seconds: 10,
            gif_fps: 10,
            gif_width: 320,
            gif_scale_flags: "lanczos".to_string(),
        }
    }
}

pub fn load_slideshow_config<P: AsRef<Path>>(path: P) -> Result<SlideshowConfig> {
    load_toml(path)
}

fn load_toml<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        source,
        path: path.to_path_buf(),
    })
}
