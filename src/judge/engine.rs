//! Execution engine
//!
//! Single-job facade over the sandbox driver: given source files, a
//! language, stdin, and limits, produce a normalized [`ExecutionResult`].
//! One sandbox lives strictly inside one `run` call; the guard removes it
//! on every exit path.

use std::collections::BTreeMap;
use std::time::Instant;

use bollard::Docker;

use crate::{
    config::Config,
    constants::{
        COMPILE_TIMEOUT_SECONDS, OUTPUT_TRUNCATED_MARKER, OUTPUT_TRUNCATE_CHARS,
        SANDBOX_STDIN_PATH, SANDBOX_WORKDIR,
    },
    models::ExecutionResult,
};

use super::{
    container::{ExecOutput, SandboxDriver, SandboxError, SandboxGuard},
    profiles::LanguageProfile,
};

/// Exit code produced by the in-container `timeout` wrapper
const EXIT_TIMEOUT: i64 = 124;

/// Exit code of a process killed by the memory cgroup (SIGKILL)
const EXIT_OOM_KILLED: i64 = 137;

/// Facade that runs one compile/run job inside an ephemeral sandbox
#[derive(Clone)]
pub struct ExecutionEngine {
    driver: SandboxDriver,
    config: Config,
}

impl ExecutionEngine {
    pub fn new(docker: Docker, config: Config) -> Self {
        Self {
            driver: SandboxDriver::new(docker),
            config,
        }
    }

    /// Compile (when the language needs it) and run the submitted files
    /// against the given stdin under wall-clock and memory caps.
    ///
    /// Failures of the submitted program are encoded in the result; an
    /// `Internal` outcome means the judge itself failed. A missing image is
    /// an internal fault, never a user-visible compile or runtime failure.
    pub async fn run(
        &self,
        files: &BTreeMap<String, String>,
        language: &str,
        stdin: &str,
        wall_clock: u64,
        memory_limit: &str,
    ) -> ExecutionResult {
        let Some(profile) = LanguageProfile::for_language(language) else {
            return ExecutionResult::runtime_error(
                format!("Unsupported language: {language}"),
                0.0,
            );
        };

        let guard = match self
            .driver
            .open_guarded(
                profile.image,
                memory_limit,
                &profile.env_map(),
                !self.config.docker.network_disabled,
                wall_clock,
            )
            .await
        {
            Ok(guard) => guard,
            Err(e) => {
                tracing::error!(%language, "sandbox create failed: {e}");
                return ExecutionResult::internal(e.to_string());
            }
        };

        let result = self
            .run_phases(&guard, profile, files, stdin, wall_clock)
            .await;
        guard.close().await;

        match result {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(%language, "sandbox fault during execution: {e}");
                ExecutionResult::internal(e.to_string())
            }
        }
    }

    /// Inject, compile, and run. Driver faults bubble up as `Err`; the
    /// caller owns teardown.
    async fn run_phases(
        &self,
        guard: &SandboxGuard,
        profile: &LanguageProfile,
        files: &BTreeMap<String, String>,
        stdin: &str,
        wall_clock: u64,
    ) -> Result<ExecutionResult, SandboxError> {
        let sandbox = guard.sandbox();

        // The profile's canonical filename wins; otherwise the first file
        // stands in as the main source under the canonical name.
        let main_source = files
            .get(profile.filename)
            .or_else(|| files.values().next())
            .cloned()
            .unwrap_or_default();

        for (name, content) in files {
            self.driver
                .put(
                    sandbox,
                    &format!("{SANDBOX_WORKDIR}/{name}"),
                    content.as_bytes(),
                )
                .await?;
        }
        if !files.contains_key(profile.filename) {
            self.driver
                .put(
                    sandbox,
                    &format!("{}/{}", SANDBOX_WORKDIR, profile.filename),
                    main_source.as_bytes(),
                )
                .await?;
        }

        let stdin_path = if stdin.is_empty() {
            None
        } else {
            self.driver
                .put(sandbox, SANDBOX_STDIN_PATH, stdin.as_bytes())
                .await?;
            Some(SANDBOX_STDIN_PATH)
        };

        if let Some(compile_cmd) = profile.compile_command {
            let compile = self
                .driver
                .exec(sandbox, compile_cmd, None, COMPILE_TIMEOUT_SECONDS)
                .await?;

            if compile.exit_code != 0 {
                return Ok(classify_compile_failure(&compile));
            }

            if profile.needs_exec_bit() {
                self.driver
                    .exec(sandbox, "chmod +x /app/main", None, COMPILE_TIMEOUT_SECONDS)
                    .await?;
            }
        }

        let started = Instant::now();
        let run = self
            .driver
            .exec(sandbox, profile.run_command, stdin_path, wall_clock)
            .await?;
        let duration = round_seconds(started.elapsed().as_secs_f64());

        Ok(classify_run(&run, wall_clock, duration))
    }
}

/// Map a failed compile exec to an `ExecutionResult`
fn classify_compile_failure(output: &ExecOutput) -> ExecutionResult {
    if output.exit_code == EXIT_TIMEOUT {
        return ExecutionResult::compile_error("Compilation Time Limit Exceeded".to_string());
    }

    let message = if output.stderr.is_empty() {
        &output.stdout
    } else {
        &output.stderr
    };
    ExecutionResult::compile_error(truncate_output(message))
}

/// Map a run exec's exit code to an `ExecutionResult`
fn classify_run(output: &ExecOutput, wall_clock: u64, duration: f64) -> ExecutionResult {
    match output.exit_code {
        0 => ExecutionResult::success(truncate_output(&output.stdout), duration),
        EXIT_TIMEOUT => ExecutionResult::timeout(wall_clock),
        EXIT_OOM_KILLED => ExecutionResult::memory_exceeded(duration),
        code => {
            let message = if output.stderr.is_empty() {
                format!("Runtime Error (Exit Code {code})")
            } else {
                truncate_output(&output.stderr)
            };
            ExecutionResult::runtime_error(message, duration)
        }
    }
}

/// Bound captured output; submitted programs can print arbitrarily much
fn truncate_output(text: &str) -> String {
    match text.char_indices().nth(OUTPUT_TRUNCATE_CHARS) {
        Some((idx, _)) => format!("{}{}", &text[..idx], OUTPUT_TRUNCATED_MARKER),
        None => text.to_string(),
    }
}

fn round_seconds(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunOutcome;

    fn exec(exit_code: i64, stdout: &str, stderr: &str) -> ExecOutput {
        ExecOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code,
        }
    }

    #[test]
    fn test_exit_zero_is_success() {
        let result = classify_run(&exec(0, "4\n", ""), 15, 0.12);
        assert!(result.is_success());
        assert_eq!(result.output(), "4\n");
        assert_eq!(result.execution_time, 0.12);
    }

    #[test]
    fn test_exit_124_is_timeout() {
        let result = classify_run(&exec(124, "", ""), 2, 2.1);
        assert_eq!(result.outcome, RunOutcome::Timeout);
        assert_eq!(result.execution_time, 2.0);
        assert_eq!(result.error_message().as_deref(), Some("Time Limit Exceeded"));
    }

    #[test]
    fn test_exit_137_is_memory_exceeded() {
        let result = classify_run(&exec(137, "", ""), 15, 0.8);
        assert_eq!(result.outcome, RunOutcome::MemoryExceeded);
        assert_eq!(
            result.error_message().as_deref(),
            Some("Memory Limit Exceeded")
        );
    }

    #[test]
    fn test_nonzero_exit_prefers_stderr() {
        let result = classify_run(&exec(1, "", "Exception in thread \"main\""), 15, 0.1);
        assert_eq!(
            result.error_message().as_deref(),
            Some("Exception in thread \"main\"")
        );
    }

    #[test]
    fn test_nonzero_exit_without_stderr_reports_code() {
        let result = classify_run(&exec(139, "", ""), 15, 0.1);
        assert_eq!(
            result.error_message().as_deref(),
            Some("Runtime Error (Exit Code 139)")
        );
    }

    #[test]
    fn test_compile_failure_prefers_stderr_then_stdout() {
        let result = classify_compile_failure(&exec(1, "", "main.cpp:3: expected ';'"));
        assert!(!result.compiled);
        assert_eq!(
            result.error_message().as_deref(),
            Some("main.cpp:3: expected ';'")
        );

        let result = classify_compile_failure(&exec(1, "error on stdout", ""));
        assert_eq!(result.error_message().as_deref(), Some("error on stdout"));
    }

    #[test]
    fn test_compile_timeout() {
        let result = classify_compile_failure(&exec(124, "", ""));
        assert!(!result.compiled);
        assert_eq!(
            result.error_message().as_deref(),
            Some("Compilation Time Limit Exceeded")
        );
    }

    #[test]
    fn test_truncate_output() {
        let short = "ok".to_string();
        assert_eq!(truncate_output(&short), "ok");

        let long = "x".repeat(OUTPUT_TRUNCATE_CHARS + 1);
        let truncated = truncate_output(&long);
        assert!(truncated.ends_with(OUTPUT_TRUNCATED_MARKER));
        assert_eq!(
            truncated.len(),
            OUTPUT_TRUNCATE_CHARS + OUTPUT_TRUNCATED_MARKER.len()
        );
    }
}
