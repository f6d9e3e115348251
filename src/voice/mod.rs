//! Voice processing module
//!
//! Handles microphone capture, audio playback, and the speech service
//! clients (transcription and synthesis).

mod capture;
mod playback;
mod stt;
mod tts;

pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use playback::{AudioPlayback, PlaybackHandle};
pub use stt::SpeechToText;
pub use tts::SpeechSynthesis;
