pub mod db;
pub mod solver_llm;
pub mod storage;
pub mod tutor_llm;

pub use db::DbAdapter;
pub use solver_llm::OpenAiSolverAdapter;
pub use storage::SupabaseStorageAdapter;
pub use tutor_llm::OpenAiTutorAdapter;
