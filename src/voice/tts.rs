//! Text-to-speech client

use crate::{Error, Result};

const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";

/// Synthesizes speech from text
pub struct SpeechSynthesis {
    client: reqwest::Client,
    api_key: String,
    voice: String,
    model: String,
}

impl SpeechSynthesis {
    /// Create a new synthesis client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, voice: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for speech synthesis".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            voice,
            model,
        })
    }

    /// Synthesize reply text to MP3 bytes
    ///
    /// # Errors
    ///
    /// Returns `Synthesis` on empty input or non-success HTTP status
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            voice: &'a str,
            input: &'a str,
            response_format: &'a str,
        }

        if text.is_empty() {
            return Err(Error::Synthesis("empty input text".to_string()));
        }

        tracing::debug!(chars = text.len(), "starting speech synthesis");

        let request = SpeechRequest {
            model: &self.model,
            voice: &self.voice,
            input: text,
            response_format: "mp3",
        };

        let response = self
            .client
            .post(SPEECH_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "synthesis request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "synthesis API error");
            return Err(Error::Synthesis(format!(
                "synthesis API error {status}: {body}"
            )));
        }

        let audio = response.bytes().await?;
        tracing::info!(audio_bytes = audio.len(), "synthesis complete");
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(
            SpeechSynthesis::new(String::new(), "nova".to_string(), "tts-1".to_string()).is_err()
        );
    }

    #[tokio::test]
    async fn empty_input_is_rejected_without_a_request() {
        let tts = SpeechSynthesis::new(
            "test-key".to_string(),
            "nova".to_string(),
            "tts-1".to_string(),
        )
        .unwrap();

        assert!(matches!(
            tts.synthesize("").await,
            Err(Error::Synthesis(_))
        ));
    }
}
