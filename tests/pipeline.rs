//! Full voice-turn pipeline tests over in-memory clients

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use parley_gateway::prompt::GenerateContentRequest;
use parley_gateway::{
    Error, Persona, ReplyGenerator, Result, Session, Speaker, Synthesizer, Transcriber,
};

struct QueueTranscriber {
    transcripts: Mutex<Vec<String>>,
}

impl QueueTranscriber {
    fn new(transcripts: &[&str]) -> Self {
        let mut queue: Vec<String> = transcripts.iter().map(ToString::to_string).collect();
        queue.reverse();
        Self {
            transcripts: Mutex::new(queue),
        }
    }
}

#[async_trait]
impl Transcriber for QueueTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        self.transcripts
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| Error::Transcription("queue exhausted".to_string()))
    }
}

/// Records every rendered prompt it receives
struct RecordingReply {
    requests: Arc<Mutex<Vec<GenerateContentRequest>>>,
    reply: String,
}

#[async_trait]
impl ReplyGenerator for RecordingReply {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.reply.clone())
    }
}

struct NullSynth;

#[async_trait]
impl Synthesizer for NullSynth {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        Ok(vec![0xff, 0xfb])
    }
}

struct FailingSynth;

#[async_trait]
impl Synthesizer for FailingSynth {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        Err(Error::Synthesis("upstream returned 500".to_string()))
    }
}

#[derive(Default)]
struct NullSpeaker;

#[async_trait(?Send)]
impl Speaker for NullSpeaker {
    async fn play(&mut self, _audio: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn wait_idle(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) {}
}

fn part_texts(request: &GenerateContentRequest) -> Vec<&str> {
    request.contents[0]
        .parts
        .iter()
        .map(|p| p.text.as_str())
        .collect()
}

#[tokio::test]
async fn multi_turn_prompts_accumulate_history_in_order() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let mut session = Session::new(
        "Robin",
        Persona::PersonalAssistant,
        QueueTranscriber::new(&["what's for dinner?", "sounds good"]),
        RecordingReply {
            requests: Arc::clone(&requests),
            reply: "Pasta tonight.".to_string(),
        },
        NullSynth,
        NullSpeaker,
    );

    session.run_turn(b"clip-1").await.unwrap();
    session.finish_turn().await.unwrap();
    session.run_turn(b"clip-2").await.unwrap();
    session.finish_turn().await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 2);

    // First turn: no history, just the new utterance
    assert_eq!(part_texts(&requests[0]), vec!["Human: what's for dinner?"]);

    // Second turn: full first exchange precedes the new utterance
    assert_eq!(
        part_texts(&requests[1]),
        vec![
            "Human: what's for dinner?",
            "Assistant: Pasta tonight.",
            "Human: sounds good",
        ]
    );
}

#[tokio::test]
async fn prompts_carry_the_persona_instruction() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let mut session = Session::new(
        "Robin",
        Persona::TechnologySpecialist,
        QueueTranscriber::new(&["hi"]),
        RecordingReply {
            requests: Arc::clone(&requests),
            reply: "Hello!".to_string(),
        },
        NullSynth,
        NullSpeaker,
    );

    session.run_turn(b"clip").await.unwrap();

    let requests = requests.lock().unwrap();
    let instruction = &requests[0].system_instruction.parts[0].text;
    assert_eq!(
        instruction,
        &Persona::TechnologySpecialist.system_instruction("Robin")
    );
    assert!(instruction.contains("Robin"));
}

#[tokio::test]
async fn persona_switch_resets_prompt_history() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let mut session = Session::new(
        "Robin",
        Persona::PersonalAssistant,
        QueueTranscriber::new(&["first", "second"]),
        RecordingReply {
            requests: Arc::clone(&requests),
            reply: "ok".to_string(),
        },
        NullSynth,
        NullSpeaker,
    );

    session.run_turn(b"clip-1").await.unwrap();
    session.finish_turn().await.unwrap();

    session.switch_persona(Persona::TravelPlanner);
    session.run_turn(b"clip-2").await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(part_texts(&requests[1]), vec!["Human: second"]);
    assert_eq!(
        requests[1].system_instruction.parts[0].text,
        Persona::TravelPlanner.system_instruction("Robin")
    );
}

#[tokio::test]
async fn synthesis_failure_keeps_text_history_for_next_turn() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let mut session = Session::new(
        "Robin",
        Persona::PersonalAssistant,
        QueueTranscriber::new(&["hello"]),
        RecordingReply {
            requests: Arc::clone(&requests),
            reply: "hi".to_string(),
        },
        FailingSynth,
        NullSpeaker,
    );

    let err = session.run_turn(b"clip").await.unwrap_err();
    assert!(matches!(err, Error::Synthesis(_)));

    // Both text turns survived the audio failure; the session is reusable
    assert_eq!(session.conversation().len(), 2);
    assert!(session.is_idle());
}
