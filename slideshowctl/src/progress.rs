use indicatif::{ProgressBar, ProgressStyle};
use slideshow_core::{PipelineObserver, PipelineStage};

const TEMPLATE: &str = "{spinner} {msg:<16} {bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}]";

/// Terminal progress bar fed by the pipeline's observer hooks.
#[derive(Debug)]
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        Self { bar }
    }

    #[cfg(test)]
    fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.position()
    }

    #[cfg(test)]
    fn length(&self) -> Option<u64> {
        self.bar.length()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineObserver for ProgressObserver {
    fn on_progress(&self, completed: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(completed as u64);
    }

    fn on_log(&self, message: &str) {
        self.bar.println(message);
    }

    fn on_stage(&self, stage: PipelineStage) {
        self.bar.set_message(stage.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_segment_counts() {
        let observer = ProgressObserver::hidden();
        observer.on_stage(PipelineStage::Downloading);
        observer.on_progress(3, 7);
        assert_eq!(observer.position(), 3);
        assert_eq!(observer.length(), Some(7));
        observer.finish();
    }
}
