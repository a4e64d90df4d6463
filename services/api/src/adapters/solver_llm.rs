//! services/api/src/adapters/solver_llm.rs
//!
//! This module contains the adapter for the vision-capable solver LLM.
//! It implements the `ProblemSolvingService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use math_mentor_core::ports::{PortError, PortResult, ProblemSolvingService};

/// The fixed transcription-and-solve instruction. The strict-JSON shape and
/// the N/A sentinel pair are the contract `parse::decode_solved` relies on.
const SOLVER_INSTRUCTIONS: &str = r#"This image contains a handwritten math problem.
Please respond in **strict JSON format** like this:

{
  "problem": "extracted equation in plain text",
  "solution": "step-by-step explanation with each step starting on a new line"
}

If you can't recognize the problem, say:
{
  "problem": "N/A",
  "solution": "N/A"
}"#;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ProblemSolvingService` using an OpenAI-compatible
/// vision LLM.
#[derive(Clone)]
pub struct OpenAiSolverAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSolverAdapter {
    /// Creates a new `OpenAiSolverAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `ProblemSolvingService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProblemSolvingService for OpenAiSolverAdapter {
    /// Sends one completion request carrying the fixed instruction plus the
    /// image URL, and returns the model's raw text answer.
    async fn extract_and_solve(&self, image_url: &str) -> PortResult<String> {
        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(vec![
                ChatCompletionRequestMessageContentPartTextArgs::default()
                    .text(SOLVER_INSTRUCTIONS)
                    .build()
                    .map_err(|e| PortError::Completion(e.to_string()))?
                    .into(),
                ChatCompletionRequestMessageContentPartImageArgs::default()
                    .image_url(
                        ImageUrlArgs::default()
                            .url(image_url)
                            .build()
                            .map_err(|e| PortError::Completion(e.to_string()))?,
                    )
                    .build()
                    .map_err(|e| PortError::Completion(e.to_string()))?
                    .into(),
            ])
            .build()
            .map_err(|e| PortError::Completion(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![user_message.into()])
            .build()
            .map_err(|e| PortError::Completion(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Completion(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::Completion(
                    "Solver LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Completion(
                "Solver LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}
