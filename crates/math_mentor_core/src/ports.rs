//! crates/math_mentor_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like object storage,
//! databases, or hosted model APIs.

use async_trait::async_trait;

use crate::domain::{ChatMessage, SolutionRecord};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// The variants are the system's whole failure taxonomy: storage (blob or
/// record store), completion (the model call itself), and parse (the model
/// answered but not in the agreed shape).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Completion error: {0}")]
    Completion(String),
    #[error("Malformed model output: {0}")]
    Parse(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait BlobStorageService: Send + Sync {
    /// Stores raw image bytes under the given key.
    async fn upload(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> PortResult<()>;

    /// Resolves a previously uploaded key to a publicly fetchable URL.
    /// Fails if the key is unknown or the store is unreachable.
    async fn resolve_public_url(&self, key: &str) -> PortResult<String>;
}

#[async_trait]
pub trait ProblemSolvingService: Send + Sync {
    /// Asks the model to transcribe and solve the handwritten problem behind
    /// `image_url`. One round trip, no retries. Returns the raw model text,
    /// which may still be wrapped in markdown code fences.
    async fn extract_and_solve(&self, image_url: &str) -> PortResult<String>;
}

#[async_trait]
pub trait TutorService: Send + Sync {
    /// Sends one tutoring turn: the fixed system instruction (built from the
    /// problem and its known solution), the caller-supplied transcript in
    /// order, then `user_message` as the final user turn. Returns `None` when
    /// the model produced no text content.
    async fn reply(
        &self,
        user_message: &str,
        problem: &str,
        solution: &str,
        history: &[ChatMessage],
    ) -> PortResult<Option<String>>;
}

#[async_trait]
pub trait SolutionStore: Send + Sync {
    /// Appends one solution record. Rows are never updated or deleted.
    async fn insert_solution(&self, record: SolutionRecord) -> PortResult<()>;
}
