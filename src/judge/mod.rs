//! Judge core: profiles, sandbox driver, execution engine, grader
//!
//! The layering mirrors a single grading call: the grader drives the
//! engine, the engine drives one sandbox per invocation, and the profile
//! registry tells both how each language is built and run.

pub mod container;
pub mod deployment;
pub mod engine;
pub mod grader;
pub mod profiles;

pub use container::{Sandbox, SandboxDriver, SandboxError};
pub use deployment::DeploymentValidator;
pub use engine::ExecutionEngine;
pub use grader::{GradedSubmission, GradedTest, SubmissionGrader, HIDDEN_PLACEHOLDER};
pub use profiles::LanguageProfile;
