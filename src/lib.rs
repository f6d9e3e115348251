//! Parley Gateway - Voice-driven persona chat
//!
//! This library provides the core functionality for the Parley gateway:
//! - Voice capture and playback on the local devices
//! - The voice-turn pipeline (STT, persona reply, TTS)
//! - Persona management and prompt assembly
//! - An HTTP API exposing the pipeline to browser clients
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Interfaces                        │
//! │      Push-to-talk loop  │  HTTP API (browser)       │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Parley Gateway                       │
//! │   Session  │  Personas  │  Capture/Playback        │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │               External services                      │
//! │   Whisper STT  │  Gemini replies  │  OpenAI TTS    │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod conversation;
pub mod daemon;
pub mod error;
pub mod persona;
pub mod prompt;
pub mod reply;
pub mod session;
pub mod transport;
pub mod voice;

pub use config::Config;
pub use conversation::{Conversation, Role, Turn};
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use persona::{ALL_PERSONAS, Persona};
pub use reply::ReplyClient;
pub use session::{
    DeviceSpeaker, ReplyGenerator, Session, Speaker, Synthesizer, Transcriber, TurnOutcome,
    TurnState,
};
