use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::BuildToolError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Arguments asking ninja for per-target dependency records.
pub const DEPS_ARGS: &[&str] = &["-t", "deps"];
/// Arguments asking ninja for the list of source (leaf) files.
pub const TARGETS_ARGS: &[&str] = &["-t", "targets", "rule"];

/// The external build tool, run inside a build directory.
#[derive(Debug, Clone)]
pub struct BuildTool {
    program: String,
    build_dir: PathBuf,
    timeout: Duration,
}

impl BuildTool {
    pub fn new(program: impl Into<String>, build_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            build_dir: build_dir.into(),
            timeout,
        }
    }

    /// Check that the build directory exists and holds `build.ninja`.
    pub fn validate(&self) -> Result<(), BuildToolError> {
        let dir = self.build_dir.display().to_string();
        if !self.build_dir.is_dir() {
            return Err(BuildToolError::MissingBuildDirectory(dir));
        }
        if !self.build_dir.join("build.ninja").exists() {
            return Err(BuildToolError::MissingBuildFile(dir));
        }
        Ok(())
    }

    /// Run the tool with `args` and return its standard output.
    ///
    /// Standard error is captured: it is logged on success and carried in
    /// the error on failure.
    pub async fn run(&self, args: &[&str]) -> Result<String, BuildToolError> {
        let command = std::iter::once(self.program.as_str())
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");

        tracing::debug!(command = %command, dir = %self.build_dir.display(), "running build tool");

        let child = Command::new(&self.program)
            .args(args)
            .current_dir(&self.build_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BuildToolError::Launch {
                command: command.clone(),
                source: e,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(BuildToolError::Launch {
                    command,
                    source: e,
                })
            }
            Err(_) => {
                return Err(BuildToolError::Timeout {
                    command,
                    timeout: self.timeout,
                })
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(BuildToolError::Exit {
                command,
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        if !stderr.is_empty() {
            tracing::warn!(command = %command, "{stderr}");
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
