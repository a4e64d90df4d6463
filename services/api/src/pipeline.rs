//! services/api/src/pipeline.rs
//!
//! The two request pipelines behind the REST handlers: submitting an uploaded
//! image for transcription and solving, and relaying one tutor chat turn.
//!
//! Both are built from explicitly injected port implementations so the
//! handlers stay thin and the flows are testable against fakes. Every call is
//! one sequential chain of awaits with no retries; the first failure aborts
//! the whole call.

use std::sync::Arc;

use chrono::Utc;
use math_mentor_core::{
    domain::{ChatMessage, SolutionRecord, SolvedProblem},
    ports::{BlobStorageService, PortResult, ProblemSolvingService, SolutionStore, TutorService},
};
use tracing::info;
use uuid::Uuid;

use crate::parse;

/// What the tutor says when the model comes back with nothing.
pub const FALLBACK_REPLY: &str = "I'm not sure how to help with that.";

//=========================================================================================
// Submission Pipeline
//=========================================================================================

/// Turns an already-uploaded image into a recorded `SolvedProblem`:
/// resolve the key, one solve round trip, decode, persist, return.
#[derive(Clone)]
pub struct SubmissionPipeline {
    storage: Arc<dyn BlobStorageService>,
    solver: Arc<dyn ProblemSolvingService>,
    store: Arc<dyn SolutionStore>,
}

impl SubmissionPipeline {
    /// Creates a new `SubmissionPipeline` from its three collaborators.
    pub fn new(
        storage: Arc<dyn BlobStorageService>,
        solver: Arc<dyn ProblemSolvingService>,
        store: Arc<dyn SolutionStore>,
    ) -> Self {
        Self {
            storage,
            solver,
            store,
        }
    }

    /// Runs the whole submission flow for one image key.
    ///
    /// Any failure aborts immediately: a storage failure before the model is
    /// called means no completion request is made, and a failure at the
    /// insert step discards the already-computed result rather than
    /// returning a pair that was never recorded.
    pub async fn submit(&self, image_key: &str) -> PortResult<SolvedProblem> {
        let image_url = self.storage.resolve_public_url(image_key).await?;

        let raw_answer = self.solver.extract_and_solve(&image_url).await?;
        let solved = parse::decode_solved(&parse::strip_fences(&raw_answer))?;
        info!("Solved problem for image '{}': {}", image_key, solved.problem);

        let record = SolutionRecord {
            id: Uuid::new_v4(),
            image_key: image_key.to_string(),
            problem_text: solved.problem.clone(),
            solution_text: solved.solution.clone(),
            created_at: Utc::now(),
        };
        self.store.insert_solution(record).await?;

        Ok(solved)
    }
}

//=========================================================================================
// Tutor Relay
//=========================================================================================

/// Forwards one chat turn to the tutor model. Stateless between calls; the
/// caller owns the transcript and resends it every time.
#[derive(Clone)]
pub struct TutorRelay {
    tutor: Arc<dyn TutorService>,
}

impl TutorRelay {
    /// Creates a new `TutorRelay`.
    pub fn new(tutor: Arc<dyn TutorService>) -> Self {
        Self { tutor }
    }

    /// Returns the tutor's reply to `user_message`, or the fixed fallback
    /// string when the model produced no usable text. Never an empty string.
    pub async fn reply(
        &self,
        user_message: &str,
        problem: &str,
        solution: &str,
        history: &[ChatMessage],
    ) -> PortResult<String> {
        let content = self
            .tutor
            .reply(user_message, problem, solution, history)
            .await?;

        Ok(match content {
            Some(text) if !text.trim().is_empty() => text,
            _ => FALLBACK_REPLY.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use math_mentor_core::ports::PortError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    //=====================================================================================
    // Fake port implementations
    //=====================================================================================

    struct FakeStorage {
        resolve_result: Result<String, String>,
    }

    #[async_trait]
    impl BlobStorageService for FakeStorage {
        async fn upload(&self, _key: &str, _content_type: &str, _bytes: Vec<u8>) -> PortResult<()> {
            Ok(())
        }

        async fn resolve_public_url(&self, _key: &str) -> PortResult<String> {
            self.resolve_result
                .clone()
                .map_err(PortError::Storage)
        }
    }

    struct FakeSolver {
        answer: Result<String, String>,
        called: AtomicBool,
    }

    impl FakeSolver {
        fn answering(answer: &str) -> Self {
            Self {
                answer: Ok(answer.to_string()),
                called: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl ProblemSolvingService for FakeSolver {
        async fn extract_and_solve(&self, _image_url: &str) -> PortResult<String> {
            self.called.store(true, Ordering::SeqCst);
            self.answer.clone().map_err(PortError::Completion)
        }
    }

    #[derive(Default)]
    struct FakeStore {
        inserted: Mutex<Vec<SolutionRecord>>,
        fail_insert: bool,
    }

    #[async_trait]
    impl SolutionStore for FakeStore {
        async fn insert_solution(&self, record: SolutionRecord) -> PortResult<()> {
            if self.fail_insert {
                return Err(PortError::Storage("insert refused".to_string()));
            }
            self.inserted.lock().unwrap().push(record);
            Ok(())
        }
    }

    struct FakeTutor {
        reply: PortResult<Option<String>>,
    }

    #[async_trait]
    impl TutorService for FakeTutor {
        async fn reply(
            &self,
            _user_message: &str,
            _problem: &str,
            _solution: &str,
            _history: &[ChatMessage],
        ) -> PortResult<Option<String>> {
            match &self.reply {
                Ok(content) => Ok(content.clone()),
                Err(PortError::Completion(msg)) => Err(PortError::Completion(msg.clone())),
                Err(PortError::Storage(msg)) => Err(PortError::Storage(msg.clone())),
                Err(PortError::Parse(msg)) => Err(PortError::Parse(msg.clone())),
            }
        }
    }

    fn pipeline_with(
        storage: FakeStorage,
        solver: FakeSolver,
        store: FakeStore,
    ) -> (SubmissionPipeline, Arc<FakeSolver>, Arc<FakeStore>) {
        let solver = Arc::new(solver);
        let store = Arc::new(store);
        let pipeline =
            SubmissionPipeline::new(Arc::new(storage), solver.clone(), store.clone());
        (pipeline, solver, store)
    }

    fn resolving_to(url: &str) -> FakeStorage {
        FakeStorage {
            resolve_result: Ok(url.to_string()),
        }
    }

    //=====================================================================================
    // Submission pipeline
    //=====================================================================================

    #[tokio::test]
    async fn fenced_answer_is_decoded_and_recorded() {
        let (pipeline, _, store) = pipeline_with(
            resolving_to("https://x/abc.png"),
            FakeSolver::answering(
                "```json\n{\"problem\":\"2+2\",\"solution\":\"Add 2 and 2 to get 4\"}\n```",
            ),
            FakeStore::default(),
        );

        let solved = pipeline.submit("abc.png").await.expect("should solve");
        assert_eq!(solved.problem, "2+2");
        assert_eq!(solved.solution, "Add 2 and 2 to get 4");

        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].image_key, "abc.png");
        assert_eq!(inserted[0].problem_text, "2+2");
        assert_eq!(inserted[0].solution_text, "Add 2 and 2 to get 4");
    }

    #[tokio::test]
    async fn unrecognizable_image_records_the_na_pair_verbatim() {
        let (pipeline, _, store) = pipeline_with(
            resolving_to("https://x/blurry.png"),
            FakeSolver::answering("{\"problem\":\"N/A\",\"solution\":\"N/A\"}"),
            FakeStore::default(),
        );

        let solved = pipeline.submit("blurry.png").await.expect("should solve");
        assert_eq!(solved.problem, "N/A");
        assert_eq!(solved.solution, "N/A");
        assert_eq!(store.inserted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn resolve_failure_short_circuits_before_the_model() {
        let (pipeline, solver, store) = pipeline_with(
            FakeStorage {
                resolve_result: Err("unknown key".to_string()),
            },
            FakeSolver::answering("{\"problem\":\"2+2\",\"solution\":\"4\"}"),
            FakeStore::default(),
        );

        let err = pipeline.submit("missing.png").await.unwrap_err();
        assert!(matches!(err, PortError::Storage(_)));
        assert!(!solver.called.load(Ordering::SeqCst));
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unparseable_answer_writes_zero_records() {
        let (pipeline, _, store) = pipeline_with(
            resolving_to("https://x/abc.png"),
            FakeSolver::answering("Sure! The problem is 2+2 and the answer is 4."),
            FakeStore::default(),
        );

        let err = pipeline.submit("abc.png").await.unwrap_err();
        assert!(matches!(err, PortError::Parse(_)));
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_failure_discards_the_computed_result() {
        let (pipeline, _, _) = pipeline_with(
            resolving_to("https://x/abc.png"),
            FakeSolver::answering("{\"problem\":\"2+2\",\"solution\":\"4\"}"),
            FakeStore {
                fail_insert: true,
                ..FakeStore::default()
            },
        );

        let err = pipeline.submit("abc.png").await.unwrap_err();
        assert!(matches!(err, PortError::Storage(_)));
    }

    //=====================================================================================
    // Tutor relay
    //=====================================================================================

    #[tokio::test]
    async fn relay_passes_the_model_reply_through() {
        let relay = TutorRelay::new(Arc::new(FakeTutor {
            reply: Ok(Some("Try isolating x first.".to_string())),
        }));

        let reply = relay.reply("how do I start?", "3x = 9", "x = 3", &[]).await;
        assert_eq!(reply.unwrap(), "Try isolating x first.");
    }

    #[tokio::test]
    async fn missing_content_yields_the_fallback_reply() {
        let relay = TutorRelay::new(Arc::new(FakeTutor { reply: Ok(None) }));

        let reply = relay.reply("hm?", "2+2", "4", &[]).await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
        assert!(!reply.is_empty());
    }

    #[tokio::test]
    async fn whitespace_only_content_yields_the_fallback_reply() {
        let relay = TutorRelay::new(Arc::new(FakeTutor {
            reply: Ok(Some("   \n".to_string())),
        }));

        let reply = relay.reply("hm?", "2+2", "4", &[]).await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn completion_failure_propagates_to_the_caller() {
        let relay = TutorRelay::new(Arc::new(FakeTutor {
            reply: Err(PortError::Completion("quota exceeded".to_string())),
        }));

        let err = relay.reply("hi", "2+2", "4", &[]).await.unwrap_err();
        assert!(matches!(err, PortError::Completion(_)));
    }
}
