//! Daemon - the main gateway service
//!
//! Runs the HTTP API in the background and drives the local push-to-talk
//! voice loop on the main thread (cpal streams aren't Send).

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::{self, ApiState};
use crate::persona::{ALL_PERSONAS, Persona};
use crate::reply::ReplyClient;
use crate::session::{DeviceSpeaker, Session};
use crate::voice::{AudioCapture, SpeechSynthesis, SpeechToText, samples_to_wav};
use crate::{Config, Error, Result};

/// The Parley daemon - serves the API and the local voice session
pub struct Daemon {
    config: Config,
}

impl Daemon {
    /// Create a new daemon instance
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the daemon until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if the API server cannot start or the voice loop hits
    /// a fatal device failure
    #[allow(clippy::future_not_send)]
    pub async fn run(self) -> Result<()> {
        tracing::info!(
            port = self.config.api_server.port,
            persona = self.config.persona.id(),
            user = %self.config.user_name,
            "daemon running"
        );

        let state = Arc::new(ApiState::from_config(&self.config));
        let port = self.config.api_server.port;
        tokio::spawn(async move {
            if let Err(e) = api::serve(state, port).await {
                tracing::error!(error = %e, "API server exited");
            }
        });

        if self.config.api_keys.openai.is_some() && self.config.api_keys.gemini.is_some() {
            self.run_voice_loop().await?;
        } else {
            tracing::info!("voice loop disabled - OPENAI_API_KEY and GEMINI_API_KEY required");
            // Keep serving the API
            tokio::signal::ctrl_c().await?;
        }

        Ok(())
    }

    /// Run the interactive push-to-talk loop
    ///
    /// An empty line toggles recording: the first press starts capture, the
    /// second finalizes the clip and runs it through the turn pipeline.
    #[allow(clippy::future_not_send)]
    async fn run_voice_loop(self) -> Result<()> {
        let openai_key = self
            .config
            .api_keys
            .openai
            .clone()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY required for voice mode".to_string()))?;
        let gemini_key = self
            .config
            .api_keys
            .gemini
            .clone()
            .ok_or_else(|| Error::Config("GEMINI_API_KEY required for voice mode".to_string()))?;

        let stt = SpeechToText::new(openai_key.clone(), self.config.voice.stt_model.clone())?;
        let reply = ReplyClient::new(gemini_key, self.config.voice.reply_model.clone())?;
        let tts = SpeechSynthesis::new(
            openai_key,
            self.config.voice.tts_voice.clone(),
            self.config.voice.tts_model.clone(),
        )?;
        let speaker = DeviceSpeaker::new()?;

        let mut session = Session::new(
            self.config.user_name.clone(),
            self.config.persona,
            stt,
            reply,
            tts,
            speaker,
        );
        let mut capture = AudioCapture::new()?;

        println!(
            "Talking to {} as {}.",
            session.persona().label(),
            session.user_name()
        );
        println!("Press Enter to start/stop recording. Type `personas` to list, `persona <name>` to switch, `quit` to exit.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush().ok();

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();

            match line {
                "" => {
                    if capture.is_capturing() {
                        let samples = capture.stop();
                        if let Err(e) = Self::process_clip(&mut session, &samples, &capture).await {
                            tracing::error!(error = %e, "voice turn failed");
                            println!("(processing failed, try again)");
                        }
                    } else {
                        capture.start()?;
                        println!("Recording... press Enter to stop.");
                    }
                }
                "quit" | "exit" => break,
                "personas" => {
                    for persona in ALL_PERSONAS {
                        let marker = if persona == session.persona() { "*" } else { " " };
                        println!("{marker} {} {} ({})", persona.icon(), persona.label(), persona.id());
                    }
                }
                other => {
                    if let Some(name) = other.strip_prefix("persona ") {
                        match name.trim().parse::<Persona>() {
                            Ok(persona) => {
                                session.switch_persona(persona);
                                println!(
                                    "Now talking to {} {}. Conversation cleared.",
                                    persona.icon(),
                                    persona.label()
                                );
                            }
                            Err(e) => println!("{e}"),
                        }
                    } else {
                        println!("Unknown command: {other}");
                    }
                }
            }
        }

        capture.stop();
        tracing::info!("voice loop stopped");
        Ok(())
    }

    /// Run one finalized clip through the turn pipeline
    #[allow(clippy::future_not_send)]
    async fn process_clip<T, R, S, P>(
        session: &mut Session<T, R, S, P>,
        samples: &[f32],
        capture: &AudioCapture,
    ) -> Result<()>
    where
        T: crate::session::Transcriber,
        R: crate::session::ReplyGenerator,
        S: crate::session::Synthesizer,
        P: crate::session::Speaker,
    {
        if samples.is_empty() {
            println!("(no audio captured)");
            return Ok(());
        }

        let wav = samples_to_wav(samples, capture.sample_rate())?;
        let outcome = session.run_turn(&wav).await?;

        println!("You: {}", outcome.transcript);
        println!("{}: {}", session.persona().label(), outcome.reply);

        session.finish_turn().await
    }
}
