//! Sandbox driver
//!
//! Lifecycle of one ephemeral Docker container: create it parked on a
//! `sleep`, inject files by uploading single-entry tar archives, exec the
//! compile and run commands, and force-remove it. The driver reports exit
//! codes verbatim; interpreting them is the engine's job.

use std::collections::HashMap;

use bollard::{
    body_full,
    container::LogOutput,
    exec::{CreateExecOptions, StartExecResults},
    models::ContainerCreateBody,
    query_parameters::{
        CreateContainerOptionsBuilder, RemoveContainerOptionsBuilder,
        UploadToContainerOptionsBuilder,
    },
    Docker,
};
use futures::StreamExt;
use uuid::Uuid;

use crate::constants::{SANDBOX_PIDS_LIMIT, SANDBOX_WORKDIR};

/// Fallback when the configured memory limit string does not parse (512 MiB)
const DEFAULT_MEMORY_BYTES: i64 = 512 * 1024 * 1024;

/// Extra lifetime granted to the parked container beyond the job wall-clock
const SANDBOX_GRACE_SECONDS: u64 = 10;

/// Errors surfaced by the sandbox driver
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("sandbox image missing: {0}")]
    ImageMissing(String),

    #[error("container daemon unreachable: {0}")]
    DaemonUnreachable(String),

    #[error("container runtime out of resources: {0}")]
    OutOfResources(String),

    #[error("sandbox i/o failure: {0}")]
    Io(String),

    #[error("docker error: {0}")]
    Docker(#[from] bollard::errors::Error),
}

/// Handle to one running sandbox container
#[derive(Debug, Clone)]
pub struct Sandbox {
    pub id: String,
    pub name: String,
}

/// Raw output of one in-container exec
#[derive(Debug)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i64,
}

/// Docker-backed sandbox driver.
///
/// Stateless apart from the shared daemon client; safe to use from
/// concurrent grading calls.
#[derive(Clone)]
pub struct SandboxDriver {
    docker: Docker,
}

impl SandboxDriver {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// Start a sandbox parked on `sleep wall_clock+10`.
    ///
    /// The sleep bounds container lifetime even if teardown is missed;
    /// `close` remains the required exit path.
    pub async fn open(
        &self,
        image: &str,
        memory_limit: &str,
        env: &HashMap<String, String>,
        network_enabled: bool,
        wall_clock: u64,
    ) -> Result<Sandbox, SandboxError> {
        let name = format!("codejudge-{}", Uuid::new_v4());
        let memory_bytes = parse_memory_limit(memory_limit);

        let options = CreateContainerOptionsBuilder::default().name(&name).build();

        let host_config = bollard::models::HostConfig {
            memory: Some(memory_bytes),
            memory_swap: Some(memory_bytes),
            pids_limit: Some(SANDBOX_PIDS_LIMIT),
            network_mode: if network_enabled {
                None
            } else {
                Some("none".to_string())
            },
            ..Default::default()
        };

        let env_vec: Vec<String> = env.iter().map(|(k, v)| format!("{k}={v}")).collect();

        let config = ContainerCreateBody {
            image: Some(image.to_string()),
            cmd: Some(vec![
                "sleep".to_string(),
                (wall_clock + SANDBOX_GRACE_SECONDS).to_string(),
            ]),
            working_dir: Some(SANDBOX_WORKDIR.to_string()),
            env: Some(env_vec),
            host_config: Some(host_config),
            ..Default::default()
        };

        let container = self
            .docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| classify_create_error(image, e))?;

        self.docker
            .start_container(
                &container.id,
                None::<bollard::query_parameters::StartContainerOptions>,
            )
            .await
            .map_err(|e| classify_create_error(image, e))?;

        tracing::debug!(container = %name, %image, "sandbox started");

        Ok(Sandbox {
            id: container.id,
            name,
        })
    }

    /// Inject a file at `path` by uploading a one-entry tar archive.
    ///
    /// Intermediate directories are created by the archive extraction.
    pub async fn put(
        &self,
        sandbox: &Sandbox,
        path: &str,
        bytes: &[u8],
    ) -> Result<(), SandboxError> {
        let archive = one_entry_archive(path, bytes)
            .map_err(|e| SandboxError::Io(format!("building archive for {path}: {e}")))?;

        let options = UploadToContainerOptionsBuilder::default().path("/").build();

        self.docker
            .upload_to_container(&sandbox.id, Some(options), body_full(archive.into()))
            .await
            .map_err(|e| SandboxError::Io(format!("uploading {path}: {e}")))?;

        Ok(())
    }

    /// Run `timeout <wall_clock> <command>` under a shell, optionally
    /// redirecting stdin from a file already injected with `put`.
    ///
    /// Non-zero exit codes are not errors; they come back in [`ExecOutput`].
    pub async fn exec(
        &self,
        sandbox: &Sandbox,
        command: &str,
        stdin_path: Option<&str>,
        wall_clock: u64,
    ) -> Result<ExecOutput, SandboxError> {
        let shell_cmd = match stdin_path {
            Some(path) => format!("timeout {wall_clock} {command} < {path}"),
            None => format!("timeout {wall_clock} {command}"),
        };

        let exec = self
            .docker
            .create_exec(
                &sandbox.id,
                CreateExecOptions {
                    cmd: Some(vec!["/bin/sh".to_string(), "-c".to_string(), shell_cmd]),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        let output = self.docker.start_exec(&exec.id, None).await?;

        let mut stdout = String::new();
        let mut stderr = String::new();

        if let StartExecResults::Attached { mut output, .. } = output {
            while let Some(msg) = output.next().await {
                match msg? {
                    LogOutput::StdOut { message } => {
                        stdout.push_str(&String::from_utf8_lossy(&message));
                    }
                    LogOutput::StdErr { message } => {
                        stderr.push_str(&String::from_utf8_lossy(&message));
                    }
                    _ => {}
                }
            }
        }

        let inspect = self.docker.inspect_exec(&exec.id).await?;
        let exit_code = inspect.exit_code.unwrap_or(-1);

        Ok(ExecOutput {
            stdout,
            stderr,
            exit_code,
        })
    }

    /// Force-remove the container. Idempotent: a sandbox that is already
    /// gone is not an error.
    pub async fn close(&self, sandbox: &Sandbox) -> Result<(), SandboxError> {
        let options = RemoveContainerOptionsBuilder::default().force(true).build();

        match self.docker.remove_container(&sandbox.id, Some(options)).await {
            Ok(()) => Ok(()),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Open a sandbox wrapped in a guard that removes it on drop
    pub async fn open_guarded(
        &self,
        image: &str,
        memory_limit: &str,
        env: &HashMap<String, String>,
        network_enabled: bool,
        wall_clock: u64,
    ) -> Result<SandboxGuard, SandboxError> {
        let sandbox = self
            .open(image, memory_limit, env, network_enabled, wall_clock)
            .await?;
        Ok(SandboxGuard {
            driver: self.clone(),
            sandbox: Some(sandbox),
        })
    }
}

/// Scope guard pairing every sandbox with a guaranteed teardown.
///
/// `close` is the orderly path; if the guard is dropped without it
/// (error return, panic, cancelled request), the removal is spawned onto
/// the runtime so the container still goes away.
pub struct SandboxGuard {
    driver: SandboxDriver,
    sandbox: Option<Sandbox>,
}

impl SandboxGuard {
    pub fn sandbox(&self) -> &Sandbox {
        self.sandbox
            .as_ref()
            .expect("sandbox taken out of live guard")
    }

    /// Remove the container and disarm the guard
    pub async fn close(mut self) {
        if let Some(sandbox) = self.sandbox.take() {
            if let Err(e) = self.driver.close(&sandbox).await {
                tracing::warn!(container = %sandbox.name, "sandbox teardown failed: {e}");
            }
        }
    }
}

impl Drop for SandboxGuard {
    fn drop(&mut self) {
        if let Some(sandbox) = self.sandbox.take() {
            let driver = self.driver.clone();
            tracing::warn!(container = %sandbox.name, "sandbox dropped without close; removing in background");
            tokio::spawn(async move {
                let _ = driver.close(&sandbox).await;
            });
        }
    }
}

/// Build a tar archive containing exactly one file entry
fn one_entry_archive(path: &str, bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let relative = path.trim_start_matches('/');

    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    builder.append_data(&mut header, relative, bytes)?;
    builder.into_inner()
}

/// Parse a docker-style size string ("512m", "1g", "262144k") into bytes
fn parse_memory_limit(limit: &str) -> i64 {
    let trimmed = limit.trim();
    let (digits, multiplier) = match trimmed.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => {
            let mult = match c.to_ascii_lowercase() {
                'b' => 1,
                'k' => 1024,
                'm' => 1024 * 1024,
                'g' => 1024 * 1024 * 1024,
                _ => return DEFAULT_MEMORY_BYTES,
            };
            (&trimmed[..idx], mult)
        }
        _ => (trimmed, 1),
    };

    match digits.parse::<i64>() {
        Ok(n) if n > 0 => n * multiplier,
        _ => {
            tracing::warn!("unparseable memory limit {limit:?}; using default");
            DEFAULT_MEMORY_BYTES
        }
    }
}

fn classify_create_error(image: &str, err: bollard::errors::Error) -> SandboxError {
    match &err {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => SandboxError::ImageMissing(image.to_string()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code >= 500 && message.contains("memory") => {
            SandboxError::OutOfResources(message.clone())
        }
        _ => SandboxError::DaemonUnreachable(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_limit() {
        assert_eq!(parse_memory_limit("512m"), 512 * 1024 * 1024);
        assert_eq!(parse_memory_limit("1g"), 1024 * 1024 * 1024);
        assert_eq!(parse_memory_limit("256K"), 256 * 1024);
        assert_eq!(parse_memory_limit("1048576"), 1_048_576);
    }

    #[test]
    fn test_parse_memory_limit_falls_back() {
        assert_eq!(parse_memory_limit(""), DEFAULT_MEMORY_BYTES);
        assert_eq!(parse_memory_limit("lots"), DEFAULT_MEMORY_BYTES);
        assert_eq!(parse_memory_limit("-5m"), DEFAULT_MEMORY_BYTES);
        assert_eq!(parse_memory_limit("12x"), DEFAULT_MEMORY_BYTES);
    }

    #[test]
    fn test_one_entry_archive_lists_single_relative_path() {
        let archive = one_entry_archive("/app/stdin.txt", b"1 2 3").unwrap();

        let mut reader = tar::Archive::new(archive.as_slice());
        let entries: Vec<_> = reader.entries().unwrap().collect();
        assert_eq!(entries.len(), 1);

        let entry = entries.into_iter().next().unwrap().unwrap();
        assert_eq!(entry.path().unwrap().to_str().unwrap(), "app/stdin.txt");
        assert_eq!(entry.size(), 5);
    }
}
