//! Property-based tests for the chat completions translation layer
//!
//! - Translation keeps message count, order, roles and content
//! - A system message always comes first
//! - Any non-blank first choice normalizes to exactly that text

use super::openai::{translate_message, OpenAIChoice, OpenAIMessage, OpenAIResponse, OpenAIService};
use super::types::{LlmRequest, Message, MessageRole, FINAL_SAMPLING, GATHER_SAMPLING};
use proptest::prelude::*;

fn arb_transcript_message() -> impl Strategy<Value = Message> {
    (
        prop_oneof![Just(MessageRole::User), Just(MessageRole::Assistant)],
        "[a-zA-Z0-9 _.!?,()]{0,80}",
    )
        .prop_map(|(role, content)| Message { role, content })
}

proptest! {
    #[test]
    fn translation_preserves_messages(
        system in "[a-zA-Z ]{1,60}",
        transcript in proptest::collection::vec(arb_transcript_message(), 0..12),
        final_pass in any::<bool>(),
    ) {
        let sampling = if final_pass { FINAL_SAMPLING } else { GATHER_SAMPLING };
        let request = LlmRequest::new(system.clone(), &transcript, sampling);
        let wire: Vec<OpenAIMessage> = request.messages.iter().map(translate_message).collect();

        prop_assert_eq!(wire.len(), transcript.len() + 1);
        prop_assert_eq!(wire[0].role.as_str(), "system");
        prop_assert_eq!(wire[0].content.as_deref(), Some(system.as_str()));

        for (sent, original) in wire.iter().skip(1).zip(&transcript) {
            prop_assert_eq!(sent.role.as_str(), original.role.as_str());
            prop_assert_eq!(sent.content.as_deref(), Some(original.content.as_str()));
        }
    }

    #[test]
    fn normalize_returns_first_non_blank_choice(reply in "[a-zA-Z0-9.!?]{1,20}[a-zA-Z0-9 .!?]{0,80}") {
        let resp = OpenAIResponse {
            choices: vec![OpenAIChoice {
                message: OpenAIMessage { role: "assistant".to_string(), content: Some(reply.clone()) },
                finish_reason: Some("stop".to_string()),
            }],
            usage: None,
        };
        let normalized = OpenAIService::normalize_response(resp).unwrap();
        prop_assert_eq!(normalized.content, reply);
    }

    #[test]
    fn normalize_rejects_blank_replies(reply in "[ \t\n]{0,10}") {
        let resp = OpenAIResponse {
            choices: vec![OpenAIChoice {
                message: OpenAIMessage { role: "assistant".to_string(), content: Some(reply) },
                finish_reason: None,
            }],
            usage: None,
        };
        prop_assert!(OpenAIService::normalize_response(resp).is_err());
    }
}
