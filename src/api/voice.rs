//! Voice pipeline endpoints
//!
//! The browser client drives one voice turn through three calls:
//! transcribe the recorded clip, generate a persona reply over the turn
//! history, then synthesize the reply. Synthesized audio is returned as
//! base64 so the binary payload survives the JSON boundary; the player
//! decodes it back to bytes before playback.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::{ApiState, SessionUser};
use crate::conversation::{Conversation, Role};
use crate::persona::Persona;
use crate::{prompt, transport};

/// Build voice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/transcribe", post(transcribe))
        .route("/reply", post(reply))
        .route("/synthesize", post(synthesize))
        .with_state(state)
}

/// Transcription response
#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

/// Transcribe a recorded WAV clip to text
async fn transcribe(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<TranscribeResponse>, VoiceApiError> {
    let stt = state
        .stt
        .as_ref()
        .ok_or(VoiceApiError::NotConfigured("STT not configured (no OpenAI key)"))?;

    if body.is_empty() {
        return Err(VoiceApiError::BadRequest("Empty audio data"));
    }

    let text = stt
        .transcribe(&body)
        .await
        .map_err(|e| VoiceApiError::TranscriptionFailed(e.to_string()))?;

    Ok(Json(TranscribeResponse { text }))
}

/// One prior turn as sent by the client
#[derive(Debug, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

/// Reply request
#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub persona: Persona,
    pub text: String,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
}

/// Reply response
#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub reply: String,
}

/// Generate a persona-steered reply for a transcribed utterance
async fn reply(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<SessionUser>,
    Json(request): Json<ReplyRequest>,
) -> Result<Json<ReplyResponse>, VoiceApiError> {
    let client = state
        .reply
        .as_ref()
        .ok_or(VoiceApiError::NotConfigured("reply generation not configured (no Gemini key)"))?;

    if request.text.is_empty() {
        return Err(VoiceApiError::BadRequest("Empty text"));
    }

    let mut history = Conversation::new();
    for message in request.history {
        history.push(message.role, message.content);
    }

    let instruction = request.persona.system_instruction(&user.0);
    let payload = prompt::render(&instruction, &history, &request.text);

    let reply = client
        .generate(&payload)
        .await
        .map_err(|e| VoiceApiError::ReplyFailed(e.to_string()))?;

    Ok(Json(ReplyResponse { reply }))
}

/// Synthesis request
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
}

/// Synthesis response; `audio` is base64-encoded MP3
#[derive(Debug, Serialize)]
pub struct SynthesizeResponse {
    pub audio: String,
}

/// Synthesize reply text to speech
async fn synthesize(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SynthesizeRequest>,
) -> Result<Json<SynthesizeResponse>, VoiceApiError> {
    let tts = state
        .tts
        .as_ref()
        .ok_or(VoiceApiError::NotConfigured("TTS not configured (no OpenAI key)"))?;

    if request.text.is_empty() {
        return Err(VoiceApiError::BadRequest("Empty text"));
    }

    let audio = tts
        .synthesize(&request.text)
        .await
        .map_err(|e| VoiceApiError::SynthesisFailed(e.to_string()))?;

    Ok(Json(SynthesizeResponse {
        audio: transport::to_base64(&audio),
    }))
}

/// Voice API errors
#[derive(Debug)]
pub enum VoiceApiError {
    NotConfigured(&'static str),
    BadRequest(&'static str),
    TranscriptionFailed(String),
    ReplyFailed(String),
    SynthesisFailed(String),
}

impl IntoResponse for VoiceApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::NotConfigured(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "not_configured", msg.to_string())
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.to_string()),
            Self::TranscriptionFailed(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "transcription_failed", msg)
            }
            Self::ReplyFailed(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "reply_failed", msg)
            }
            Self::SynthesisFailed(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "synthesis_failed", msg)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}
