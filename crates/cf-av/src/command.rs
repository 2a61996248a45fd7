//! Builder for executing external tool commands with timeout support.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Output captured from a successful tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Captured standard output, unmodified (may be binary, e.g. piped MP3).
    pub stdout: Vec<u8>,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// Standard output decoded as lossy UTF-8.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use cf_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> cf_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffprobe"))
///     .arg("-v").arg("quiet")
///     .arg("-print_format").arg("json")
///     .arg("-show_format")
///     .arg("/path/to/clip.mp4")
///     .execute()
///     .await?;
/// println!("{}", output.stdout_text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
    stdin_data: Option<Vec<u8>>,
}

impl ToolCommand {
    /// Create a new command for the given program path. No timeout is set.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: None,
            stdin_data: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time. `None` waits indefinitely.
    pub fn timeout(&mut self, d: Option<Duration>) -> &mut Self {
        self.timeout = d;
        self
    }

    /// Provide data to be written to the process's stdin.
    pub fn stdin(&mut self, data: Vec<u8>) -> &mut Self {
        self.stdin_data = Some(data);
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// Stdin data is written from a separate task so a child that streams
    /// output while still reading input cannot deadlock against us.
    ///
    /// # Errors
    ///
    /// - Returns [`cf_core::Error::Timeout`] if the process outlives the
    ///   configured timeout. The child is killed.
    /// - Returns [`cf_core::Error::Tool`] if the process exits with a non-zero
    ///   status (message includes stderr).
    /// - Returns [`cf_core::Error::Tool`] if spawning the process fails.
    pub async fn execute(&self) -> cf_core::Result<ToolOutput> {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(if self.stdin_data.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // Dropping the wait future on timeout must take the process with it.
        cmd.kill_on_drop(true);

        tracing::debug!(tool = %program_name, args = ?self.args, "spawning");

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                cf_core::Error::tool(&program_name, "not found; is it installed and in PATH?")
            } else {
                cf_core::Error::tool(&program_name, format!("failed to spawn: {e}"))
            }
        })?;

        let writer = match (self.stdin_data.clone(), child.stdin.take()) {
            (Some(data), Some(mut stdin)) => Some(tokio::spawn(async move {
                stdin.write_all(&data).await?;
                stdin.shutdown().await
            })),
            _ => None,
        };

        let wait = child.wait_with_output();
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(r) => r,
                Err(_elapsed) => {
                    tracing::warn!(tool = %program_name, timeout = ?limit, "killed after timeout");
                    return Err(cf_core::Error::Timeout {
                        tool: program_name,
                        after: limit,
                    });
                }
            },
            None => wait.await,
        };

        if let Some(handle) = writer {
            match handle.await {
                Ok(Ok(())) => {}
                // Usually a broken pipe because the tool exited early; its
                // stderr carries the real reason.
                Ok(Err(e)) => tracing::debug!(tool = %program_name, "stdin write failed: {e}"),
                Err(e) => tracing::debug!(tool = %program_name, "stdin writer panicked: {e}"),
            }
        }

        let output = result.map_err(|e| {
            cf_core::Error::tool(&program_name, format!("I/O error waiting for process: {e}"))
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(cf_core::Error::tool(
                program_name,
                format!("exited with status {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(ToolOutput {
            stdout: output.stdout,
            stderr,
        })
    }
}
