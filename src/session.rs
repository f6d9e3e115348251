//! Persona session and the voice-turn pipeline
//!
//! A [`Session`] owns the active persona, the conversation history, and the
//! clients for one user. Each utterance runs the strictly sequential
//! pipeline: transcribe, generate reply, synthesize, play. The clients sit
//! behind trait seams so the pipeline can be driven against in-memory fakes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::conversation::Conversation;
use crate::persona::Persona;
use crate::prompt::{self, GenerateContentRequest};
use crate::reply::ReplyClient;
use crate::voice::{AudioPlayback, PlaybackHandle, SpeechSynthesis, SpeechToText};
use crate::{Error, Result};

/// Converts a finalized audio clip to text
#[async_trait]
pub trait Transcriber {
    /// # Errors
    ///
    /// Returns `Transcription` if the clip cannot be transcribed
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// Produces a reply for a rendered prompt payload
#[async_trait]
pub trait ReplyGenerator {
    /// # Errors
    ///
    /// Returns `ReplyGeneration` if no reply can be produced
    async fn generate(&self, request: &GenerateContentRequest) -> Result<String>;
}

/// Converts reply text to encoded audio bytes
#[async_trait]
pub trait Synthesizer {
    /// # Errors
    ///
    /// Returns `Synthesis` if the text cannot be converted
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Plays encoded audio and signals completion
///
/// `?Send` because the production implementation holds a cpal stream, which
/// must stay on the thread that created it.
#[async_trait(?Send)]
pub trait Speaker {
    /// Decode and begin playback, preempting any active playback
    ///
    /// # Errors
    ///
    /// Returns `Playback` on decode failure or an unusable output device
    async fn play(&mut self, audio: &[u8]) -> Result<()>;

    /// Wait for the active playback to end naturally
    ///
    /// # Errors
    ///
    /// Returns `Playback` if the output stream fails while draining
    async fn wait_idle(&mut self) -> Result<()>;

    /// Stop playback; safe to call when nothing is playing
    fn stop(&mut self);
}

#[async_trait]
impl Transcriber for SpeechToText {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        Self::transcribe(self, audio).await
    }
}

#[async_trait]
impl ReplyGenerator for ReplyClient {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<String> {
        Self::generate(self, request).await
    }
}

#[async_trait]
impl Synthesizer for SpeechSynthesis {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        Self::synthesize(self, text).await
    }
}

/// Speaker over the local audio output device
pub struct DeviceSpeaker {
    playback: AudioPlayback,
    pending: Option<PlaybackHandle>,
}

impl DeviceSpeaker {
    /// Open the default output device
    ///
    /// # Errors
    ///
    /// Returns `DeviceUnavailable` if no output device exists
    pub fn new() -> Result<Self> {
        Ok(Self {
            playback: AudioPlayback::new()?,
            pending: None,
        })
    }
}

#[async_trait(?Send)]
impl Speaker for DeviceSpeaker {
    async fn play(&mut self, audio: &[u8]) -> Result<()> {
        let handle = self.playback.start_mp3(audio)?;
        self.pending = Some(handle);
        Ok(())
    }

    async fn wait_idle(&mut self) -> Result<()> {
        if let Some(handle) = self.pending.take() {
            handle.wait().await;
        }
        self.playback.stop();
        Ok(())
    }

    fn stop(&mut self) {
        self.pending = None;
        self.playback.stop();
    }
}

/// Per-utterance pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Transcribing,
    GeneratingReply,
    SynthesizingAudio,
    Playing,
}

/// Result of one successful voice turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub transcript: String,
    pub reply: String,
}

/// One user's persona session
///
/// Single logical thread of control: one outstanding utterance at a time,
/// enforced by the turn state. Nothing here survives a process restart.
pub struct Session<T, R, S, P> {
    user_name: String,
    persona: Persona,
    conversation: Conversation,
    state: TurnState,
    transcriber: T,
    reply: R,
    synthesizer: S,
    speaker: P,
}

impl<T, R, S, P> Session<T, R, S, P>
where
    T: Transcriber,
    R: ReplyGenerator,
    S: Synthesizer,
    P: Speaker,
{
    /// Create a session with injected clients
    pub fn new(
        user_name: impl Into<String>,
        persona: Persona,
        transcriber: T,
        reply: R,
        synthesizer: S,
        speaker: P,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            persona,
            conversation: Conversation::new(),
            state: TurnState::Idle,
            transcriber,
            reply,
            synthesizer,
            speaker,
        }
    }

    /// The active persona
    #[must_use]
    pub const fn persona(&self) -> Persona {
        self.persona
    }

    /// The user's display name
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// The conversation history
    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Current pipeline state
    #[must_use]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// Whether a new turn may start
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == TurnState::Idle
    }

    /// Switch the active persona
    ///
    /// Stops any active playback first, then clears the conversation, in
    /// that order. Results of a turn still in flight are discarded.
    pub fn switch_persona(&mut self, persona: Persona) {
        self.speaker.stop();
        self.conversation.clear();
        self.persona = persona;
        self.state = TurnState::Idle;
        tracing::info!(persona = persona.id(), "persona switched, conversation cleared");
    }

    /// Run one voice turn over a finalized WAV clip
    ///
    /// Transcribes, appends the User turn, generates and appends the
    /// Assistant reply, synthesizes it, and begins playback; returns with
    /// the session in `Playing`. Call [`Self::finish_turn`] to await the
    /// completion signal.
    ///
    /// The User turn is appended as soon as transcription succeeds and is
    /// never rolled back: a turn that fails later leaves partial history
    /// behind on purpose.
    ///
    /// # Errors
    ///
    /// Returns `Busy` if a turn is already in flight; otherwise the failing
    /// step's taxonomy error, with the session back at `Idle`
    pub async fn run_turn(&mut self, wav: &[u8]) -> Result<TurnOutcome> {
        if self.state != TurnState::Idle {
            return Err(Error::Busy);
        }

        let run_id = Uuid::new_v4();
        tracing::debug!(%run_id, persona = self.persona.id(), "voice turn started");

        self.state = TurnState::Transcribing;
        let transcript = match self.transcriber.transcribe(wav).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(%run_id, error = %e, "transcription step failed");
                self.state = TurnState::Idle;
                return Err(e);
            }
        };

        // Render before appending: history parts precede the new utterance,
        // which rides as the trailing part.
        let instruction = self.persona.system_instruction(&self.user_name);
        let request = prompt::render(&instruction, &self.conversation, &transcript);
        self.conversation.push_user(&transcript);

        self.state = TurnState::GeneratingReply;
        let reply = match self.reply.generate(&request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(%run_id, error = %e, "reply step failed");
                self.state = TurnState::Idle;
                return Err(e);
            }
        };
        self.conversation.push_assistant(&reply);

        self.state = TurnState::SynthesizingAudio;
        let audio = match self.synthesizer.synthesize(&reply).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(%run_id, error = %e, "synthesis step failed");
                self.state = TurnState::Idle;
                return Err(e);
            }
        };

        self.state = TurnState::Playing;
        if let Err(e) = self.speaker.play(&audio).await {
            tracing::error!(%run_id, error = %e, "playback step failed");
            self.state = TurnState::Idle;
            return Err(e);
        }

        tracing::info!(%run_id, transcript = %transcript, reply = %reply, "voice turn playing");
        Ok(TurnOutcome { transcript, reply })
    }

    /// Await the completion signal of the playing turn
    ///
    /// No-op when nothing is playing.
    ///
    /// # Errors
    ///
    /// Returns `Playback` if waiting on the output stream fails
    pub async fn finish_turn(&mut self) -> Result<()> {
        if self.state == TurnState::Playing {
            self.speaker.wait_idle().await?;
            self.state = TurnState::Idle;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::conversation::Role;

    struct FixedTranscriber(&'static str);

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FixedReply(&'static str);

    #[async_trait]
    impl ReplyGenerator for FixedReply {
        async fn generate(&self, _request: &GenerateContentRequest) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingReply;

    #[async_trait]
    impl ReplyGenerator for FailingReply {
        async fn generate(&self, _request: &GenerateContentRequest) -> Result<String> {
            Err(Error::ReplyGeneration("response has no candidates".to_string()))
        }
    }

    struct CountingSynth {
        calls: Arc<AtomicUsize>,
        audio: Vec<u8>,
    }

    #[async_trait]
    impl Synthesizer for CountingSynth {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.audio.clone())
        }
    }

    #[derive(Default)]
    struct RecordingSpeaker {
        played: Arc<Mutex<Vec<Vec<u8>>>>,
        stops: Arc<AtomicUsize>,
    }

    #[async_trait(?Send)]
    impl Speaker for RecordingSpeaker {
        async fn play(&mut self, audio: &[u8]) -> Result<()> {
            self.played.lock().unwrap().push(audio.to_vec());
            Ok(())
        }

        async fn wait_idle(&mut self) -> Result<()> {
            Ok(())
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn test_session(
        reply: &'static str,
        synth_calls: Arc<AtomicUsize>,
        played: Arc<Mutex<Vec<Vec<u8>>>>,
        stops: Arc<AtomicUsize>,
    ) -> Session<FixedTranscriber, FixedReply, CountingSynth, RecordingSpeaker> {
        Session::new(
            "Robin",
            Persona::PersonalAssistant,
            FixedTranscriber("hello"),
            FixedReply(reply),
            CountingSynth {
                calls: synth_calls,
                audio: vec![1, 2, 3],
            },
            RecordingSpeaker { played, stops },
        )
    }

    #[tokio::test]
    async fn successful_turn_appends_user_then_assistant() {
        let played = Arc::new(Mutex::new(Vec::new()));
        let mut session = test_session(
            "hi there",
            Arc::new(AtomicUsize::new(0)),
            Arc::clone(&played),
            Arc::new(AtomicUsize::new(0)),
        );

        let outcome = session.run_turn(b"wav").await.unwrap();
        assert_eq!(outcome.transcript, "hello");
        assert_eq!(outcome.reply, "hi there");

        let turns = session.conversation().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "hello");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "hi there");

        // Speaker received exactly the synthesized bytes
        assert_eq!(*played.lock().unwrap(), vec![vec![1, 2, 3]]);
        assert_eq!(session.state(), TurnState::Playing);

        session.finish_turn().await.unwrap();
        assert!(session.is_idle());
    }

    #[tokio::test]
    async fn reply_failure_skips_synthesis_and_keeps_user_turn() {
        let synth_calls = Arc::new(AtomicUsize::new(0));
        let mut session = Session::new(
            "Robin",
            Persona::PersonalAssistant,
            FixedTranscriber("hello"),
            FailingReply,
            CountingSynth {
                calls: Arc::clone(&synth_calls),
                audio: vec![],
            },
            RecordingSpeaker::default(),
        );

        let err = session.run_turn(b"wav").await.unwrap_err();
        assert!(matches!(err, Error::ReplyGeneration(_)));

        // Synthesis must not run after a reply failure
        assert_eq!(synth_calls.load(Ordering::SeqCst), 0);

        // The orphaned User turn is kept, not rolled back
        let turns = session.conversation().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::User);
        assert!(session.is_idle());
    }

    #[tokio::test]
    async fn turn_in_flight_rejects_reentry() {
        let mut session = test_session(
            "hi",
            Arc::new(AtomicUsize::new(0)),
            Arc::new(Mutex::new(Vec::new())),
            Arc::new(AtomicUsize::new(0)),
        );

        session.run_turn(b"wav").await.unwrap();
        assert_eq!(session.state(), TurnState::Playing);

        assert!(matches!(session.run_turn(b"wav").await, Err(Error::Busy)));
    }

    #[tokio::test]
    async fn switch_persona_stops_playback_and_clears_history() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut session = test_session(
            "hi",
            Arc::new(AtomicUsize::new(0)),
            Arc::new(Mutex::new(Vec::new())),
            Arc::clone(&stops),
        );

        session.run_turn(b"wav").await.unwrap();
        assert!(!session.conversation().is_empty());

        session.switch_persona(Persona::TravelPlanner);

        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(session.conversation().is_empty());
        assert_eq!(session.persona(), Persona::TravelPlanner);
        assert!(session.is_idle());
    }

    #[tokio::test]
    async fn every_persona_switch_yields_empty_conversation() {
        let mut session = test_session(
            "hi",
            Arc::new(AtomicUsize::new(0)),
            Arc::new(Mutex::new(Vec::new())),
            Arc::new(AtomicUsize::new(0)),
        );

        for persona in crate::persona::ALL_PERSONAS {
            session.run_turn(b"wav").await.unwrap();
            session.finish_turn().await.unwrap();
            session.switch_persona(persona);
            assert!(session.conversation().is_empty());
        }
    }
}
