pub mod domain;
pub mod ports;

pub use domain::{ChatMessage, Sender, SolutionRecord, SolvedProblem};
pub use ports::{
    BlobStorageService, PortError, PortResult, ProblemSolvingService, SolutionStore, TutorService,
};
