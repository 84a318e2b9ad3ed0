pub mod decode;
pub mod playback;

pub use playback::{AudioSink, WavFileSink, play_in_background};
