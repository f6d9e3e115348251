//! Text-safe transport encoding for synthesized audio
//!
//! Synthesized MP3 bytes cross the boundary between the server-side
//! synthesis call and the client-side player as base64; the player decodes
//! back to bytes before handing them to the audio element.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::{Error, Result};

/// Encode audio bytes for transport
#[must_use]
pub fn to_base64(audio: &[u8]) -> String {
    STANDARD.encode(audio)
}

/// Decode transported audio back to bytes
///
/// # Errors
///
/// Returns `Error::Playback` if the payload is not valid base64; the player
/// cannot decode what it cannot deserialize.
pub fn from_base64(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| Error::Playback(format!("invalid base64 audio payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_is_byte_identical() {
        let audio: Vec<u8> = (0..=255).collect();
        let encoded = to_base64(&audio);
        assert_eq!(from_base64(&encoded).unwrap(), audio);
    }

    #[test]
    fn empty_payload_roundtrips() {
        assert_eq!(from_base64(&to_base64(&[])).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn garbage_is_a_playback_error() {
        assert!(matches!(
            from_base64("not base64!!!"),
            Err(Error::Playback(_))
        ));
    }
}
