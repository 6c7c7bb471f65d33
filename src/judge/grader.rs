//! Submission grader
//!
//! Drives the compile-once / run-N-tests pipeline against the execution
//! engine, folds per-test outcomes into a final verdict, runs the
//! deployment gate on would-be-accepted submissions, and persists the
//! graded submission atomically.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;

use crate::{
    config::Config,
    db::repositories::SubmissionRepository,
    error::{AppError, AppResult},
    models::{ExecutionResult, ProblemDetail, RunOutcome, TestCase, TestStatus, Verdict},
};

use super::{deployment::DeploymentValidator, engine::ExecutionEngine};

/// Placeholder substituted for hidden test data in responses
pub const HIDDEN_PLACEHOLDER: &str = "[Hidden]";

/// One graded test case as returned to the caller
#[derive(Debug, Clone, Serialize)]
pub struct GradedTest {
    pub id: i64,
    pub input: String,
    pub expected: String,
    pub output: String,
    pub status: TestStatus,
    pub error: Option<String>,
    pub is_hidden: bool,
    pub execution_time: f64,
}

/// Result of grading one submission (or of an ephemeral test run)
#[derive(Debug, Serialize)]
pub struct GradedSubmission {
    pub compiled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile_error: Option<String>,
    pub tests: Vec<GradedTest>,
    pub passed: i32,
    pub total: i32,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<i64>,
    pub execution_time: f64,
}

/// Outcome of the test phase, before persistence and redaction
struct TestPhase {
    tests: Vec<GradedTest>,
    passed: i32,
    verdict: Verdict,
    error: Option<String>,
    total_time: f64,
}

/// Grades submissions end to end. One instance per request is cheap; the
/// engine and pool are shared handles.
pub struct SubmissionGrader<'a> {
    engine: &'a ExecutionEngine,
    validator: DeploymentValidator,
    pool: &'a PgPool,
    config: &'a Config,
}

impl<'a> SubmissionGrader<'a> {
    pub fn new(engine: &'a ExecutionEngine, pool: &'a PgPool, config: &'a Config) -> Self {
        Self {
            engine,
            validator: DeploymentValidator::new(config),
            pool,
            config,
        }
    }

    /// Grade and persist a submission.
    ///
    /// Repository failures abort the call; no partial submission is ever
    /// written (the summary row and per-test rows share one transaction).
    pub async fn grade(
        &self,
        user_id: i64,
        problem: &ProblemDetail,
        files: &BTreeMap<String, String>,
        language: &str,
    ) -> AppResult<GradedSubmission> {
        let code_blob = serde_json::to_string(files)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("serializing submission: {e}")))?;
        let total = problem.testcases.len() as i32;
        let wall_clock = problem.time_limit(self.config.execution.run_timeout_seconds);
        let memory_limit = problem.memory_limit(&self.config.execution.memory_limit);

        if total == 0 {
            tracing::info!(problem_id = problem.problem.id, "submission with no test cases");
            let submission_id = SubmissionRepository::store_submission(
                self.pool,
                user_id,
                problem.problem.id,
                &code_blob,
                language,
                Verdict::Accepted.as_str(),
                0,
                0,
                0.0,
                0,
                None,
            )
            .await?;
            return Ok(empty_accepted(submission_id));
        }

        // Phase 1: compile once (for interpreted languages this is a smoke
        // run with empty stdin; only the compiled flag matters here).
        let compile_result = self
            .engine
            .run(files, language, "", wall_clock, memory_limit)
            .await;

        if !compile_result.compiled {
            let compile_error = compile_result.error_message();
            tracing::info!(
                problem_id = problem.problem.id,
                "submission failed compilation"
            );
            let submission_id = SubmissionRepository::store_submission(
                self.pool,
                user_id,
                problem.problem.id,
                &code_blob,
                language,
                Verdict::CompileError.as_str(),
                0,
                total,
                0.0,
                0,
                compile_error.as_deref(),
            )
            .await?;
            return Ok(GradedSubmission {
                compiled: false,
                compile_error,
                tests: Vec::new(),
                passed: 0,
                total,
                verdict: Verdict::CompileError,
                error: None,
                submission_id: Some(submission_id),
                execution_time: 0.0,
            });
        }

        // Phase 2: run every test case in declared order.
        let mut phase = self
            .run_test_phase(problem, files, language, wall_clock, memory_limit)
            .await;

        // Phase 3: deployment gate, only for a would-be-accepted run.
        if phase.verdict == Verdict::Accepted {
            let (ok, message) = self.validator.validate(language);
            if !ok {
                phase.verdict = Verdict::DeploymentRejected;
                phase.error = Some(message);
            }
        }

        // Persist the summary row and the per-test rows atomically, with
        // real (unredacted) captured output.
        let mut tx = self.pool.begin().await?;
        let submission_id = SubmissionRepository::store_submission(
            &mut *tx,
            user_id,
            problem.problem.id,
            &code_blob,
            language,
            phase.verdict.as_str(),
            phase.passed,
            total,
            round_seconds(phase.total_time),
            0,
            phase.error.as_deref(),
        )
        .await?;
        for test in &phase.tests {
            SubmissionRepository::store_submission_testcase(
                &mut *tx,
                submission_id,
                test.id,
                test.status.as_str(),
                test.execution_time,
                0,
                &test.output,
                test.error.as_deref(),
            )
            .await?;
        }
        tx.commit().await?;

        tracing::info!(
            submission_id,
            verdict = %phase.verdict,
            passed = phase.passed,
            total,
            "submission graded"
        );

        redact_hidden(&mut phase.tests);

        Ok(GradedSubmission {
            compiled: true,
            compile_error: None,
            tests: phase.tests,
            passed: phase.passed,
            total,
            verdict: phase.verdict,
            error: phase.error,
            submission_id: Some(submission_id),
            execution_time: round_seconds(phase.total_time),
        })
    }

    /// Run a problem's tests without persisting anything (the `/api/run`
    /// path). Comparison and verdict logic are identical to `grade`.
    pub async fn run_tests(
        &self,
        problem: &ProblemDetail,
        files: &BTreeMap<String, String>,
        language: &str,
    ) -> GradedSubmission {
        let total = problem.testcases.len() as i32;
        let wall_clock = problem.time_limit(self.config.execution.run_timeout_seconds);
        let memory_limit = problem.memory_limit(&self.config.execution.memory_limit);

        if total == 0 {
            return empty_accepted_unpersisted();
        }

        let compile_result = self
            .engine
            .run(files, language, "", wall_clock, memory_limit)
            .await;
        if !compile_result.compiled {
            return GradedSubmission {
                compiled: false,
                compile_error: compile_result.error_message(),
                tests: Vec::new(),
                passed: 0,
                total,
                verdict: Verdict::CompileError,
                error: None,
                submission_id: None,
                execution_time: 0.0,
            };
        }

        let mut phase = self
            .run_test_phase(problem, files, language, wall_clock, memory_limit)
            .await;
        redact_hidden(&mut phase.tests);

        GradedSubmission {
            compiled: true,
            compile_error: None,
            tests: phase.tests,
            passed: phase.passed,
            total,
            verdict: phase.verdict,
            error: phase.error,
            submission_id: None,
            execution_time: round_seconds(phase.total_time),
        }
    }

    /// Phase 2 proper: one engine invocation per test case, sequential,
    /// in `(execution_order, id)` order as fetched.
    async fn run_test_phase(
        &self,
        problem: &ProblemDetail,
        files: &BTreeMap<String, String>,
        language: &str,
        wall_clock: u64,
        memory_limit: &str,
    ) -> TestPhase {
        let mut phase = TestPhase {
            tests: Vec::with_capacity(problem.testcases.len()),
            passed: 0,
            verdict: Verdict::Accepted,
            error: None,
            total_time: 0.0,
        };

        for tc in &problem.testcases {
            let result = self
                .engine
                .run(files, language, &tc.input_text, wall_clock, memory_limit)
                .await;

            let graded = grade_test(tc, &result);
            phase.total_time += graded.execution_time;

            if graded.status == TestStatus::Pass {
                phase.passed += 1;
            } else {
                phase.verdict = fold_verdict(phase.verdict, &result.outcome);
            }
            if phase.error.is_none() {
                phase.error = graded.error.clone();
            }

            phase.tests.push(graded);
        }

        // Guard: a partial pass can never leave the verdict at AC.
        if phase.passed != phase.tests.len() as i32 && phase.verdict == Verdict::Accepted {
            phase.verdict = Verdict::WrongAnswer;
        }

        phase
    }
}

/// Compare one engine result against a test case's expectation
fn grade_test(tc: &TestCase, result: &ExecutionResult) -> GradedTest {
    let (status, error) = match result.error_message() {
        Some(message) => (TestStatus::RuntimeError, Some(message)),
        None => {
            let status = if outputs_match(result.output(), &tc.expected_output) {
                TestStatus::Pass
            } else {
                TestStatus::Fail
            };
            (status, None)
        }
    };

    GradedTest {
        id: tc.id,
        input: tc.input_text.clone(),
        expected: tc.expected_output.clone(),
        output: result.output().to_string(),
        status,
        error,
        is_hidden: tc.is_hidden,
        execution_time: result.execution_time,
    }
}

/// Trim surrounding whitespace and canonicalize line endings
fn normalize_output(text: &str) -> String {
    text.trim().replace("\r\n", "\n")
}

/// Deterministic output comparison used by grading and ephemeral runs
fn outputs_match(actual: &str, expected: &str) -> bool {
    normalize_output(actual) == normalize_output(expected)
}

/// First failing outcome fixes the submission verdict; later failures
/// don't overwrite it.
fn fold_verdict(current: Verdict, outcome: &RunOutcome) -> Verdict {
    if current != Verdict::Accepted {
        return current;
    }
    match outcome {
        RunOutcome::Timeout => Verdict::TimeLimitExceeded,
        RunOutcome::MemoryExceeded => Verdict::MemoryLimitExceeded,
        RunOutcome::Internal { .. } => Verdict::InternalError,
        RunOutcome::RuntimeError { .. } | RunOutcome::CompileError { .. } => Verdict::RuntimeError,
        RunOutcome::Success { .. } => Verdict::WrongAnswer,
    }
}

/// Replace hidden test data with the placeholder in an outgoing payload.
/// Persisted rows keep the real captured output.
fn redact_hidden(tests: &mut [GradedTest]) {
    for test in tests.iter_mut().filter(|t| t.is_hidden) {
        test.input = HIDDEN_PLACEHOLDER.to_string();
        test.expected = HIDDEN_PLACEHOLDER.to_string();
        test.output = HIDDEN_PLACEHOLDER.to_string();
    }
}

fn empty_accepted(submission_id: i64) -> GradedSubmission {
    GradedSubmission {
        compiled: true,
        compile_error: None,
        tests: Vec::new(),
        passed: 0,
        total: 0,
        verdict: Verdict::Accepted,
        error: None,
        submission_id: Some(submission_id),
        execution_time: 0.0,
    }
}

fn empty_accepted_unpersisted() -> GradedSubmission {
    GradedSubmission {
        submission_id: None,
        ..empty_accepted(0)
    }
}

fn round_seconds(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tc(id: i64, input: &str, expected: &str, hidden: bool) -> TestCase {
        TestCase {
            id,
            problem_id: 1,
            input_text: input.to_string(),
            expected_output: expected.to_string(),
            is_hidden: hidden,
            execution_order: id as i32,
        }
    }

    #[test]
    fn test_outputs_match_normalizes_whitespace_and_crlf() {
        assert!(outputs_match("hi\n", "hi"));
        assert!(outputs_match("  x\r\n", "x"));
        assert!(outputs_match("a\r\nb\r\n", "a\nb"));
        assert!(outputs_match("", "   \n"));
        assert!(!outputs_match("hi", "Hi"));
        assert!(!outputs_match("a b", "a  b"));
    }

    #[test]
    fn test_grade_test_pass_and_fail() {
        let case = tc(1, "hi", "hi", false);

        let pass = grade_test(&case, &ExecutionResult::success("hi\n".into(), 0.1));
        assert_eq!(pass.status, TestStatus::Pass);
        assert!(pass.error.is_none());

        let fail = grade_test(&case, &ExecutionResult::success("bye".into(), 0.1));
        assert_eq!(fail.status, TestStatus::Fail);
        assert!(fail.error.is_none());
    }

    #[test]
    fn test_grade_test_errors_are_runtime_status() {
        let case = tc(1, "x", "x", false);

        let tle = grade_test(&case, &ExecutionResult::timeout(2));
        assert_eq!(tle.status, TestStatus::RuntimeError);
        assert_eq!(tle.error.as_deref(), Some("Time Limit Exceeded"));

        let re = grade_test(&case, &ExecutionResult::runtime_error("boom".into(), 0.1));
        assert_eq!(re.status, TestStatus::RuntimeError);
        assert_eq!(re.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_fold_verdict_first_failure_wins() {
        let v = fold_verdict(Verdict::Accepted, &RunOutcome::Timeout);
        assert_eq!(v, Verdict::TimeLimitExceeded);

        // A later wrong answer does not overwrite the TLE.
        let v = fold_verdict(v, &RunOutcome::Success { stdout: "x".into() });
        assert_eq!(v, Verdict::TimeLimitExceeded);
    }

    #[test]
    fn test_fold_verdict_variants() {
        assert_eq!(
            fold_verdict(Verdict::Accepted, &RunOutcome::MemoryExceeded),
            Verdict::MemoryLimitExceeded
        );
        assert_eq!(
            fold_verdict(Verdict::Accepted, &RunOutcome::RuntimeError { message: "".into() }),
            Verdict::RuntimeError
        );
        assert_eq!(
            fold_verdict(Verdict::Accepted, &RunOutcome::Internal { message: "".into() }),
            Verdict::InternalError
        );
        assert_eq!(
            fold_verdict(Verdict::Accepted, &RunOutcome::Success { stdout: "".into() }),
            Verdict::WrongAnswer
        );
    }

    #[test]
    fn test_redact_hidden_replaces_all_payload_fields() {
        let case = tc(2, "secret in", "secret out", true);
        let mut tests = vec![grade_test(
            &case,
            &ExecutionResult::success("secret out".into(), 0.1),
        )];
        redact_hidden(&mut tests);

        assert_eq!(tests[0].input, HIDDEN_PLACEHOLDER);
        assert_eq!(tests[0].expected, HIDDEN_PLACEHOLDER);
        assert_eq!(tests[0].output, HIDDEN_PLACEHOLDER);
        // Status stays truthful even when the payload is hidden.
        assert_eq!(tests[0].status, TestStatus::Pass);

        let json = serde_json::to_string(&tests).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_redact_leaves_visible_tests_alone() {
        let case = tc(3, "in", "out", false);
        let mut tests = vec![grade_test(
            &case,
            &ExecutionResult::success("out".into(), 0.1),
        )];
        redact_hidden(&mut tests);
        assert_eq!(tests[0].input, "in");
        assert_eq!(tests[0].output, "out");
    }
}
