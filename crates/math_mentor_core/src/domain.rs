//! crates/math_mentor_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A transcribed problem together with the model's worked solution.
///
/// When the model cannot recognize the image, both fields hold the literal
/// sentinel "N/A". A mixed pair is tolerated and passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolvedProblem {
    pub problem: String,
    pub solution: String,
}

/// One append-only row recording a solved submission. Never mutated or
/// deleted after insertion.
#[derive(Debug, Clone)]
pub struct SolutionRecord {
    pub id: Uuid,
    pub image_key: String,
    pub problem_text: String,
    pub solution_text: String,
    pub created_at: DateTime<Utc>,
}

/// Who authored a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// A single turn of the tutor conversation. The full transcript lives in the
/// browser session and is resent with every tutor call; the server keeps
/// nothing between calls.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}
