pub mod gemini;
pub mod pipeline;
pub mod progress;
pub mod prompt;
pub mod service;

pub use gemini::GeminiClient;
pub use pipeline::{LessonGenerator, PipelineError, parse_word_list};
pub use progress::{ProgressBarSink, ProgressSink, TracingProgress};
