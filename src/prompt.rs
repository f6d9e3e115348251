//! Prompt payload rendering for the reply-generation service
//!
//! The wire format is the `generateContent` request shape: one
//! `system_instruction` part carrying the persona template, and one
//! `contents` entry whose parts are the conversation history (in order,
//! role-prefixed) followed by the new user utterance.

use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;

/// A single text part
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Part {
    pub text: String,
}

/// System-instruction block steering the model
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

/// One content entry (the whole rendered conversation)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateContentRequest {
    pub system_instruction: SystemInstruction,
    pub contents: Vec<Content>,
}

/// Render a prompt payload from the persona instruction, the conversation
/// history, and the new user text
///
/// History parts always precede the new part, in original order, with none
/// omitted or reordered.
#[must_use]
pub fn render(
    system_instruction: &str,
    history: &Conversation,
    new_user_text: &str,
) -> GenerateContentRequest {
    let mut parts: Vec<Part> = history
        .turns()
        .iter()
        .map(|turn| Part {
            text: format!("{}: {}", turn.role.prompt_prefix(), turn.content),
        })
        .collect();

    parts.push(Part {
        text: format!("Human: {new_user_text}"),
    });

    GenerateContentRequest {
        system_instruction: SystemInstruction {
            parts: vec![Part {
                text: system_instruction.to_string(),
            }],
        },
        contents: vec![Content { parts }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_history() -> Conversation {
        let mut conv = Conversation::new();
        conv.push_user("what's the weather?");
        conv.push_assistant("Sunny all day.");
        conv.push_user("and tomorrow?");
        conv.push_assistant("Light rain in the morning.");
        conv
    }

    #[test]
    fn history_precedes_new_text_in_order() {
        let request = render("You are a test assistant.", &sample_history(), "thanks!");

        let texts: Vec<&str> = request.contents[0]
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();

        assert_eq!(
            texts,
            vec![
                "Human: what's the weather?",
                "Assistant: Sunny all day.",
                "Human: and tomorrow?",
                "Assistant: Light rain in the morning.",
                "Human: thanks!",
            ]
        );
    }

    #[test]
    fn empty_history_yields_single_part() {
        let request = render("sys", &Conversation::new(), "hello");
        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].parts.len(), 1);
        assert_eq!(request.contents[0].parts[0].text, "Human: hello");
    }

    #[test]
    fn system_instruction_is_carried_verbatim() {
        let request = render("You are Niko.", &Conversation::new(), "hi");
        assert_eq!(request.system_instruction.parts.len(), 1);
        assert_eq!(request.system_instruction.parts[0].text, "You are Niko.");
    }

    #[test]
    fn serializes_to_provider_shape() {
        let request = render("sys", &Conversation::new(), "hi");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["system_instruction"]["parts"][0]["text"], "sys");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Human: hi");
    }
}
