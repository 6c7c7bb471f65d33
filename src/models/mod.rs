//! Domain models and DTOs

pub mod execution;
pub mod problem;
pub mod submission;
pub mod test_case;
pub mod user;

pub use execution::{ExecutionResult, RunOutcome, TestStatus, Verdict};
pub use problem::{Problem, ProblemDetail, ProblemSummary, ProblemView};
pub use submission::{Submission, SubmissionDetail, SubmissionSummary, SubmissionTestCase};
pub use test_case::{TestCase, TestCaseView};
pub use user::{User, UserInfo};
