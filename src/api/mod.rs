//! HTTP API server for the Parley gateway
//!
//! Exposes the server-side half of the voice-turn pipeline to browser
//! clients: transcription, reply generation, and synthesis (as base64,
//! the text-safe transport for audio), plus the persona enumeration.

mod auth;
mod health;
mod personas;
mod voice;

pub use auth::SessionUser;

use std::sync::Arc;

use axum::{Router, middleware};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::reply::ReplyClient;
use crate::voice::{SpeechSynthesis, SpeechToText};
use crate::{Error, Result};

/// Shared state for API handlers
pub struct ApiState {
    /// Shared session key; `None` allows unauthenticated access (dev mode)
    pub session_key: Option<String>,

    /// Display name used when the session carries none
    pub default_user_name: String,

    /// Transcription client (absent without an OpenAI key)
    pub stt: Option<SpeechToText>,

    /// Reply-generation client (absent without a Gemini key)
    pub reply: Option<ReplyClient>,

    /// Synthesis client (absent without an OpenAI key)
    pub tts: Option<SpeechSynthesis>,
}

impl ApiState {
    /// Build API state from configuration, constructing one client per
    /// process for each service with a configured key
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let stt = config.api_keys.openai.clone().and_then(|key| {
            SpeechToText::new(key, config.voice.stt_model.clone()).ok()
        });
        let reply = config.api_keys.gemini.clone().and_then(|key| {
            ReplyClient::new(key, config.voice.reply_model.clone()).ok()
        });
        let tts = config.api_keys.openai.clone().and_then(|key| {
            SpeechSynthesis::new(
                key,
                config.voice.tts_voice.clone(),
                config.voice.tts_model.clone(),
            )
            .ok()
        });

        Self {
            session_key: config.api_server.session_key.clone(),
            default_user_name: config.user_name.clone(),
            stt,
            reply,
            tts,
        }
    }
}

/// Build the full API router
#[must_use]
pub fn build_router(state: Arc<ApiState>) -> Router {
    let api = Router::new()
        .nest("/voice", voice::router(Arc::clone(&state)))
        .merge(personas::router())
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_session,
        ));

    Router::new()
        .merge(health::router())
        .nest("/api", api)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// Serve the API on the given port
///
/// # Errors
///
/// Returns error if the listener cannot bind
pub async fn serve(state: Arc<ApiState>, port: u16) -> Result<()> {
    let router = build_router(state);
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "API server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| Error::Config(format!("API server error: {e}")))
}
