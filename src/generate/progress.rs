//! Step-level progress reporting for generation runs.
//!
//! Purely observational: nothing a sink does can change the outcome of a run.

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use tracing::info;

/// Sub-step of generating one word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStep {
    Details,
    Image,
    Audio,
}

impl GenerationStep {
    pub const COUNT: usize = 3;

    fn index(self) -> usize {
        match self {
            GenerationStep::Details => 0,
            GenerationStep::Image => 1,
            GenerationStep::Audio => 2,
        }
    }
}

impl fmt::Display for GenerationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStep::Details => write!(f, "details"),
            GenerationStep::Image => write!(f, "illustration"),
            GenerationStep::Audio => write!(f, "narration"),
        }
    }
}

/// Emitted before each sub-step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub word: String,
    pub step: GenerationStep,
    /// 1-based position of the word in the batch
    pub position: usize,
    pub total: usize,
}

impl ProgressUpdate {
    /// Number of sub-steps finished before this one started
    pub fn completed_steps(&self) -> usize {
        (self.position.saturating_sub(1)) * GenerationStep::COUNT + self.step.index()
    }
}

impl fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {}: generating {}...",
            self.position, self.total, self.word, self.step
        )
    }
}

pub trait ProgressSink: Send + Sync {
    fn report(&self, update: &ProgressUpdate);
}

/// Logs each status line
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, update: &ProgressUpdate) {
        info!("{}", update);
    }
}

/// Terminal progress bar over all sub-steps of a run
pub struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    pub fn new(word_count: usize) -> Self {
        let bar = ProgressBar::new((word_count * GenerationStep::COUNT) as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        ) {
            bar.set_style(style.progress_chars("#>-"));
        }

        Self { bar }
    }

    pub fn finish(&self, message: &'static str) {
        self.bar.finish_with_message(message);
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl ProgressSink for ProgressBarSink {
    fn report(&self, update: &ProgressUpdate) {
        self.bar.set_position(update.completed_steps() as u64);
        self.bar.set_message(update.to_string());
    }
}
