//! Configuration management for the Parley gateway
//!
//! Values resolve in order: environment variable, then the optional config
//! file (`~/.config/parley/config.toml`), then built-in defaults matching
//! the hosted service.

use std::path::PathBuf;

use serde::Deserialize;

use crate::persona::Persona;
use crate::{Error, Result};

/// Parley gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Display name of the signed-in user (parameterizes persona templates)
    pub user_name: String,

    /// Persona active at startup
    pub persona: Persona,

    /// Voice pipeline configuration
    pub voice: VoiceConfig,

    /// API keys for external services
    pub api_keys: ApiKeys,

    /// HTTP API server configuration
    pub api_server: ApiServerConfig,
}

/// Voice pipeline configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Transcription model (e.g. "whisper-1")
    pub stt_model: String,

    /// Reply-generation model (e.g. "gemini-2.0-flash")
    pub reply_model: String,

    /// Synthesis model (e.g. "tts-1")
    pub tts_model: String,

    /// Synthesis voice identifier
    pub tts_voice: String,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper transcription and TTS)
    pub openai: Option<String>,

    /// Gemini API key (reply generation)
    pub gemini: Option<String>,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Shared session key; requests must present it as a bearer token.
    /// When unset the gateway allows unauthenticated access (development
    /// mode) with a warning.
    pub session_key: Option<String>,
}

/// Optional config file contents
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub user_name: Option<String>,
    pub persona: Option<String>,
    #[serde(default)]
    pub voice: FileVoiceConfig,
    #[serde(default)]
    pub server: FileServerConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct FileVoiceConfig {
    pub stt_model: Option<String>,
    pub reply_model: Option<String>,
    pub tts_model: Option<String>,
    pub tts_voice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FileServerConfig {
    pub port: Option<u16>,
    pub session_key: Option<String>,
}

impl FileConfig {
    /// Parse a config file body
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Return the path of the config file, if a config directory exists
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "parley", "parley")
        .map(|d| d.config_dir().join("config.toml"))
}

/// Read the config file, tolerating absence and logging parse failures
fn load_file_config() -> FileConfig {
    let Some(path) = config_path() else {
        return FileConfig::default();
    };

    if !path.exists() {
        return FileConfig::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match FileConfig::from_toml(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                FileConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            FileConfig::default()
        }
    }
}

impl Config {
    /// Load configuration from environment and the optional config file
    ///
    /// # Errors
    ///
    /// Returns error if a configured persona name is unknown
    pub fn load() -> Result<Self> {
        Self::from_file_config(load_file_config())
    }

    /// Resolve configuration from a parsed file config plus the environment
    ///
    /// # Errors
    ///
    /// Returns error if a configured persona name is unknown
    pub fn from_file_config(file: FileConfig) -> Result<Self> {
        let user_name = std::env::var("PARLEY_USER_NAME")
            .ok()
            .or(file.user_name)
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "friend".to_string());

        let persona = std::env::var("PARLEY_PERSONA")
            .ok()
            .or(file.persona)
            .map_or(Ok(Persona::PersonalAssistant), |name| {
                name.parse::<Persona>()
                    .map_err(|_| Error::Config(format!("unknown persona: {name}")))
            })?;

        let api_keys = ApiKeys {
            openai: std::env::var("OPENAI_API_KEY").ok(),
            gemini: std::env::var("GEMINI_API_KEY").ok(),
        };

        let voice = VoiceConfig {
            stt_model: std::env::var("PARLEY_STT_MODEL")
                .ok()
                .or(file.voice.stt_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
            reply_model: std::env::var("PARLEY_REPLY_MODEL")
                .ok()
                .or(file.voice.reply_model)
                .unwrap_or_else(|| "gemini-2.0-flash".to_string()),
            tts_model: std::env::var("PARLEY_TTS_MODEL")
                .ok()
                .or(file.voice.tts_model)
                .unwrap_or_else(|| "tts-1".to_string()),
            tts_voice: std::env::var("PARLEY_TTS_VOICE")
                .ok()
                .or(file.voice.tts_voice)
                .unwrap_or_else(|| "nova".to_string()),
        };

        let api_server = ApiServerConfig {
            port: std::env::var("PARLEY_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .or(file.server.port)
                .unwrap_or(18890),
            session_key: std::env::var("PARLEY_SESSION_KEY")
                .ok()
                .or(file.server.session_key),
        };

        Ok(Self {
            user_name,
            persona,
            voice,
            api_keys,
            api_server,
        })
    }
}
