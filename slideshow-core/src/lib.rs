pub mod cleanup;
pub mod concat;
pub mod config;
pub mod download;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod observer;
pub mod pipeline;
pub mod transcode;

pub use cleanup::{CleanupReport, FilesystemWarning};
pub use concat::ConcatScript;
pub use config::{load_slideshow_config, SlideshowConfig};
pub use error::{ConfigError, FetchError, Result, SlideshowError, SlideshowResult};
pub use fetch::{Fetcher, HttpFetcher};
pub use manifest::Manifest;
pub use observer::{NoopObserver, PipelineObserver, RecordingObserver, TracingObserver};
pub use pipeline::{ConversionReport, PipelineStage, SlideshowPipeline};
pub use transcode::{CommandExecutor, OutputFormat, SystemCommandExecutor, Transcoder};
