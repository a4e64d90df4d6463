//! services/api/src/adapters/tutor_llm.rs
//!
//! This module contains the adapter for the conversational tutor LLM.
//! It implements the `TutorService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use math_mentor_core::{
    domain::{ChatMessage, Sender},
    ports::{PortError, PortResult, TutorService},
};

const TUTOR_INSTRUCTIONS_TEMPLATE: &str = r#"You are a helpful math tutor. Your job is to help the student understand how to solve this problem: "{problem}".
You know the solution is: "{solution}".
Break down concepts simply. Be encouraging but concise. When appropriate, use the Socratic method to guide the student to discover the answer themselves.
If they ask for a hint, don't give away the whole solution. If they seem stuck, guide them to the next step."#;

/// A hard cap on reply length, matching the tutor's "concise" instruction.
const MAX_REPLY_TOKENS: u32 = 500;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TutorService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiTutorAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTutorAdapter {
    /// Creates a new `OpenAiTutorAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Builds the outgoing message list for one tutoring turn: the system
/// instruction embedding the problem and its known solution, then the
/// caller-supplied transcript in its original order, then the student's new
/// message as the final user turn.
fn build_transcript(
    user_message: &str,
    problem: &str,
    solution: &str,
    history: &[ChatMessage],
) -> PortResult<Vec<ChatCompletionRequestMessage>> {
    let instructions = TUTOR_INSTRUCTIONS_TEMPLATE
        .replace("{problem}", problem)
        .replace("{solution}", solution);

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatCompletionRequestMessage::System(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(instructions)
            .build()
            .map_err(|e| PortError::Completion(e.to_string()))?,
    ));

    for turn in history {
        let message = match turn.sender {
            Sender::User => ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.text.clone())
                    .build()
                    .map_err(|e| PortError::Completion(e.to_string()))?,
            ),
            Sender::Bot => ChatCompletionRequestMessage::Assistant(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.text.clone())
                    .build()
                    .map_err(|e| PortError::Completion(e.to_string()))?,
            ),
        };
        messages.push(message);
    }

    messages.push(ChatCompletionRequestMessage::User(
        ChatCompletionRequestUserMessageArgs::default()
            .content(user_message.to_string())
            .build()
            .map_err(|e| PortError::Completion(e.to_string()))?,
    ));

    Ok(messages)
}

//=========================================================================================
// `TutorService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TutorService for OpenAiTutorAdapter {
    /// Sends one tutoring turn and returns the model's reply text, or `None`
    /// when the response carried no content.
    async fn reply(
        &self,
        user_message: &str,
        problem: &str,
        solution: &str,
        history: &[ChatMessage],
    ) -> PortResult<Option<String>> {
        let messages = build_transcript(user_message, problem, solution, history)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .max_tokens(MAX_REPLY_TOKENS)
            .build()
            .map_err(|e| PortError::Completion(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Completion(e.to_string()))?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}
