use std::sync::Mutex;

use tracing::info;

use crate::pipeline::PipelineStage;

/// Receives progress and log lines from a conversion run.
///
/// Implementations must not assume a terminal or window; the pipeline calls
/// these hooks inline from its single flow of control.
pub trait PipelineObserver: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize);

    fn on_log(&self, message: &str);

    fn on_stage(&self, _stage: PipelineStage) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_progress(&self, _completed: usize, _total: usize) {}

    fn on_log(&self, _message: &str) {}
}

/// Forwards every hook to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_progress(&self, completed: usize, total: usize) {
        info!(completed, total, "segment progress");
    }

    fn on_log(&self, message: &str) {
        info!("{message}");
    }

    fn on_stage(&self, stage: PipelineStage) {
        info!(stage = %stage, "pipeline stage");
    }
}

/// One recorded observer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    Progress { completed: usize, total: usize },
    Log(String),
    Stage(PipelineStage),
}

/// Keeps every call in order; handy for headless callers and tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObserverEvent> {
        self.lock().clone()
    }

    pub fn progress(&self) -> Vec<(usize, usize)> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ObserverEvent::Progress { completed, total } => Some((*completed, *total)),
                _ => None,
            })
            .collect()
    }

    pub fn stages(&self) -> Vec<PipelineStage> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ObserverEvent::Stage(stage) => Some(*stage),
                _ => None,
            })
            .collect()
    }

    pub fn logs(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ObserverEvent::Log(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ObserverEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, event: ObserverEvent) {
        self.lock().push(event);
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_progress(&self, completed: usize, total: usize) {
        self.push(ObserverEvent::Progress { completed, total });
    }

    fn on_log(&self, message: &str) {
        self.push(ObserverEvent::Log(message.to_string()));
    }

    fn on_stage(&self, stage: PipelineStage) {
        self.push(ObserverEvent::Stage(stage));
    }
}
