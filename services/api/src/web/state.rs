//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::pipeline::{SubmissionPipeline, TutorRelay};
use math_mentor_core::ports::BlobStorageService;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// Everything here is request-independent wiring; no per-request or
/// per-conversation state survives between calls.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Arc<dyn BlobStorageService>,
    pub submission: SubmissionPipeline,
    pub tutor: TutorRelay,
}
