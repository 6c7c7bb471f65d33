//! Execution and grading value types
//!
//! A sandbox invocation yields an [`ExecutionResult`]; compile failures,
//! runtime faults, and limit breaches are outcomes, not errors, so the
//! grader can map them to verdicts without string matching. The well-known
//! marker strings ("Time Limit Exceeded", "Memory Limit Exceeded") exist
//! only at the serialization boundary for API compatibility.

use serde::{Deserialize, Serialize};

/// Terminal classification of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "AC")]
    Accepted,
    #[serde(rename = "WA")]
    WrongAnswer,
    #[serde(rename = "CE")]
    CompileError,
    #[serde(rename = "RE")]
    RuntimeError,
    #[serde(rename = "TLE")]
    TimeLimitExceeded,
    #[serde(rename = "MLE")]
    MemoryLimitExceeded,
    #[serde(rename = "DEP")]
    DeploymentRejected,
    #[serde(rename = "IE")]
    InternalError,
}

impl Verdict {
    /// Get verdict as its wire token
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "AC",
            Self::WrongAnswer => "WA",
            Self::CompileError => "CE",
            Self::RuntimeError => "RE",
            Self::TimeLimitExceeded => "TLE",
            Self::MemoryLimitExceeded => "MLE",
            Self::DeploymentRejected => "DEP",
            Self::InternalError => "IE",
        }
    }

    /// Parse verdict from its wire token
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AC" => Some(Self::Accepted),
            "WA" => Some(Self::WrongAnswer),
            "CE" => Some(Self::CompileError),
            "RE" => Some(Self::RuntimeError),
            "TLE" => Some(Self::TimeLimitExceeded),
            "MLE" => Some(Self::MemoryLimitExceeded),
            "DEP" => Some(Self::DeploymentRejected),
            "IE" => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Check if this verdict means the solution was accepted
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-test status within one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "RE")]
    RuntimeError,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::RuntimeError => "RE",
        }
    }
}

/// What a single sandbox invocation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Program exited 0; stdout captured
    Success { stdout: String },
    /// Compile phase exited non-zero
    CompileError { message: String },
    /// Run phase exited non-zero (not a limit breach)
    RuntimeError { message: String },
    /// In-container `timeout` fired (exit code 124)
    Timeout,
    /// Killed by the memory cgroup (exit code 137)
    MemoryExceeded,
    /// Driver or daemon fault; never caused by the submitted program alone
    Internal { message: String },
}

/// Normalized result of one `ExecutionEngine::run` call
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub outcome: RunOutcome,
    /// False only when the compile phase itself failed
    pub compiled: bool,
    /// Wall-clock seconds for the run phase
    pub execution_time: f64,
    /// Peak memory; accounting currently reports 0 (see DESIGN.md)
    pub memory_used: i64,
}

impl ExecutionResult {
    pub fn success(stdout: String, execution_time: f64) -> Self {
        Self {
            outcome: RunOutcome::Success { stdout },
            compiled: true,
            execution_time,
            memory_used: 0,
        }
    }

    pub fn compile_error(message: String) -> Self {
        Self {
            outcome: RunOutcome::CompileError { message },
            compiled: false,
            execution_time: 0.0,
            memory_used: 0,
        }
    }

    pub fn runtime_error(message: String, execution_time: f64) -> Self {
        Self {
            outcome: RunOutcome::RuntimeError { message },
            compiled: true,
            execution_time,
            memory_used: 0,
        }
    }

    pub fn timeout(wall_clock: u64) -> Self {
        Self {
            outcome: RunOutcome::Timeout,
            compiled: true,
            execution_time: wall_clock as f64,
            memory_used: 0,
        }
    }

    pub fn memory_exceeded(execution_time: f64) -> Self {
        Self {
            outcome: RunOutcome::MemoryExceeded,
            compiled: true,
            execution_time,
            memory_used: 0,
        }
    }

    pub fn internal(message: String) -> Self {
        Self {
            outcome: RunOutcome::Internal { message },
            compiled: true,
            execution_time: 0.0,
            memory_used: 0,
        }
    }

    /// True when the program ran to completion with exit code 0
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RunOutcome::Success { .. })
    }

    /// Captured stdout ("" unless the run succeeded)
    pub fn output(&self) -> &str {
        match &self.outcome {
            RunOutcome::Success { stdout } => stdout,
            _ => "",
        }
    }

    /// Boundary error string, or `None` for a successful run.
    ///
    /// These exact markers are load-bearing for API clients; everything
    /// internal matches on [`RunOutcome`] instead.
    pub fn error_message(&self) -> Option<String> {
        match &self.outcome {
            RunOutcome::Success { .. } => None,
            RunOutcome::CompileError { message } => Some(message.clone()),
            RunOutcome::RuntimeError { message } => Some(message.clone()),
            RunOutcome::Timeout => Some("Time Limit Exceeded".to_string()),
            RunOutcome::MemoryExceeded => Some("Memory Limit Exceeded".to_string()),
            RunOutcome::Internal { message } => Some(format!("Internal Error (IE): {message}")),
        }
    }

    /// True when the failure originated in the judge, not the submission
    pub fn is_internal(&self) -> bool {
        matches!(self.outcome, RunOutcome::Internal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_tokens() {
        assert_eq!(Verdict::Accepted.as_str(), "AC");
        assert_eq!(Verdict::WrongAnswer.as_str(), "WA");
        assert_eq!(Verdict::CompileError.as_str(), "CE");
        assert_eq!(Verdict::RuntimeError.as_str(), "RE");
        assert_eq!(Verdict::TimeLimitExceeded.as_str(), "TLE");
        assert_eq!(Verdict::MemoryLimitExceeded.as_str(), "MLE");
        assert_eq!(Verdict::DeploymentRejected.as_str(), "DEP");
        assert_eq!(Verdict::InternalError.as_str(), "IE");
    }

    #[test]
    fn test_verdict_round_trip() {
        for token in ["AC", "WA", "CE", "RE", "TLE", "MLE", "DEP", "IE"] {
            assert_eq!(Verdict::parse(token).unwrap().as_str(), token);
        }
        assert!(Verdict::parse("pending").is_none());
    }

    #[test]
    fn test_verdict_serializes_as_token() {
        assert_eq!(
            serde_json::to_string(&Verdict::TimeLimitExceeded).unwrap(),
            "\"TLE\""
        );
    }

    #[test]
    fn test_boundary_error_strings() {
        assert_eq!(
            ExecutionResult::timeout(2).error_message().as_deref(),
            Some("Time Limit Exceeded")
        );
        assert_eq!(
            ExecutionResult::memory_exceeded(0.5).error_message().as_deref(),
            Some("Memory Limit Exceeded")
        );
        let internal = ExecutionResult::internal("daemon gone".to_string());
        assert_eq!(
            internal.error_message().as_deref(),
            Some("Internal Error (IE): daemon gone")
        );
        assert!(ExecutionResult::success("hi".into(), 0.1).error_message().is_none());
    }

    #[test]
    fn test_output_only_on_success() {
        let ok = ExecutionResult::success("42\n".into(), 0.01);
        assert_eq!(ok.output(), "42\n");
        let re = ExecutionResult::runtime_error("segfault".into(), 0.01);
        assert_eq!(re.output(), "");
    }
}
