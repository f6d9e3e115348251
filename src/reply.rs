//! Reply-generation client
//!
//! Sends a rendered prompt payload to the generative-language API and
//! extracts the first candidate's first text part. Missing candidates or a
//! malformed response shape are hard errors, never a silent empty string.

use serde::Deserialize;

use crate::prompt::GenerateContentRequest;
use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Response from the `generateContent` endpoint
///
/// Every level is optional: the shape is validated explicitly rather than
/// trusted, and each absence maps to a `ReplyGeneration` error.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Pull the reply text out of a response, checking presence at every level
fn extract_reply(response: GenerateContentResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::ReplyGeneration("response has no candidates".to_string()))?;

    let content = candidate
        .content
        .ok_or_else(|| Error::ReplyGeneration("candidate has no content".to_string()))?;

    let part = content
        .parts
        .into_iter()
        .next()
        .ok_or_else(|| Error::ReplyGeneration("candidate content has no parts".to_string()))?;

    part.text
        .ok_or_else(|| Error::ReplyGeneration("candidate part has no text".to_string()))
}

/// Generates persona-steered replies
pub struct ReplyClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ReplyClient {
    /// Create a new reply client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    /// Create a reply client against a custom base URL
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Gemini API key required for reply generation".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        })
    }

    /// Generate a reply for a rendered prompt payload
    ///
    /// # Errors
    ///
    /// Returns `ReplyGeneration` on non-success status, zero candidates, or
    /// a malformed response structure
    pub async fn generate(&self, request: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "reply request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received reply response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "reply API error");
            return Err(Error::ReplyGeneration(format!(
                "reply API error {status}: {body}"
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse reply response");
            e
        })?;

        let reply = extract_reply(parsed)?;
        tracing::info!(reply = %reply, "reply generated");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn extracts_first_candidate_first_part() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"hi there"},{"text":"ignored"}]}},{"content":{"parts":[{"text":"also ignored"}]}}]}"#,
        );
        assert_eq!(extract_reply(response).unwrap(), "hi there");
    }

    #[test]
    fn zero_candidates_is_hard_error() {
        let response = parse(r#"{"candidates":[]}"#);
        assert!(matches!(
            extract_reply(response),
            Err(Error::ReplyGeneration(_))
        ));
    }

    #[test]
    fn missing_candidates_field_is_hard_error() {
        let response = parse("{}");
        assert!(matches!(
            extract_reply(response),
            Err(Error::ReplyGeneration(_))
        ));
    }

    #[test]
    fn candidate_without_content_is_hard_error() {
        let response = parse(r#"{"candidates":[{}]}"#);
        assert!(matches!(
            extract_reply(response),
            Err(Error::ReplyGeneration(_))
        ));
    }

    #[test]
    fn content_without_parts_is_hard_error() {
        let response = parse(r#"{"candidates":[{"content":{"parts":[]}}]}"#);
        assert!(matches!(
            extract_reply(response),
            Err(Error::ReplyGeneration(_))
        ));
    }

    #[test]
    fn part_without_text_is_hard_error() {
        let response = parse(r#"{"candidates":[{"content":{"parts":[{}]}}]}"#);
        assert!(matches!(
            extract_reply(response),
            Err(Error::ReplyGeneration(_))
        ));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(ReplyClient::new(String::new(), "gemini-2.0-flash".to_string()).is_err());
    }
}
