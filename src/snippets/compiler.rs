//! External compiler invocation.
//!
//! Runs the configured compiler on a staged fragment with a timeout and
//! captures both output streams.

use super::config::CompilerConfig;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Placeholder in compiler arguments replaced by the workspace root.
pub const WORKSPACE_ROOT_VAR: &str = "${workspaceRoot}";

/// Result of one compiler run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutput {
    /// Exit code (-1 when the process was killed by a signal or never ran).
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Set when the compiler could not be run at all.
    pub spawn_error: Option<String>,
}

impl CompileOutput {
    pub fn spawn_failed(message: impl Into<String>) -> Self {
        Self {
            exit_code: -1,
            spawn_error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.spawn_error.is_none() && self.exit_code == 0
    }

    /// Text to hand to the diagnostic parser, if any.
    ///
    /// A failed spawn yields its error text, a clean exit yields nothing, and a
    /// failing compile yields stderr, or stdout when stderr is blank.
    pub fn diagnostic_text(&self) -> Option<&str> {
        if let Some(error) = &self.spawn_error {
            return Some(error.as_str());
        }
        if self.exit_code == 0 {
            return None;
        }
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            Some(self.stdout.as_str())
        } else {
            Some(stderr)
        }
    }
}

/// Error while running the compiler.
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("Empty compiler command")]
    EmptyCommand,
    #[error("Failed to spawn '{command}': {source}")]
    Spawn { command: String, source: std::io::Error },
    #[error("Compiler '{command}' timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },
    #[error("I/O error: {message}")]
    Io { message: String },
}

/// The compiler collaborator.
pub trait CompilerInvoker {
    /// Compile the staged file at `source`. Never fails; problems starting the
    /// compiler are reported through [`CompileOutput::spawn_error`].
    fn compile(&self, source: &Path) -> CompileOutput;
}

/// Runs a compiler as a child process.
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    command: String,
    args: Vec<String>,
    timeout_ms: u64,
}

impl ProcessCompiler {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout_ms: u64) -> Self {
        Self {
            command: command.into(),
            args,
            timeout_ms,
        }
    }

    /// Build from configuration, expanding `${workspaceRoot}` and appending
    /// include directories.
    pub fn from_config(config: &CompilerConfig, workspace_root: &Path) -> Self {
        let root = workspace_root.display().to_string();
        let mut args: Vec<String> = config
            .args
            .iter()
            .map(|arg| arg.replace(WORKSPACE_ROOT_VAR, &root))
            .collect();
        args.extend(
            config
                .include_paths
                .iter()
                .map(|dir| format!("{}{}", config.include_flag, dir.replace(WORKSPACE_ROOT_VAR, &root))),
        );

        Self::new(config.command.clone(), args, config.timeout)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn run(&self, source: &Path) -> Result<CompileOutput, CompilerError> {
        if self.command.is_empty() {
            return Err(CompilerError::EmptyCommand);
        }

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        log::debug!("Running {} {:?} {}", self.command, self.args, source.display());

        let mut child = cmd.spawn().map_err(|source| CompilerError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        let mut stdout_handle = child
            .stdout
            .take()
            .map(|stdout| thread::spawn(move || read_pipe_to_string(stdout)));
        let mut stderr_handle = child
            .stderr
            .take()
            .map(|stderr| thread::spawn(move || read_pipe_to_string(stderr)));

        let timeout = Duration::from_millis(self.timeout_ms);
        let status = if timeout.is_zero() {
            child.wait().map_err(|e| CompilerError::Io {
                message: format!("Failed to wait for '{}': {e}", self.command),
            })?
        } else {
            let start = Instant::now();
            loop {
                if let Some(status) = child.try_wait().map_err(|e| CompilerError::Io {
                    message: format!("Failed to poll '{}': {e}", self.command),
                })? {
                    break status;
                }
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = join_reader(stdout_handle.take());
                    let _ = join_reader(stderr_handle.take());
                    return Err(CompilerError::Timeout {
                        command: self.command.clone(),
                        timeout_ms: self.timeout_ms,
                    });
                }
                thread::sleep(Duration::from_millis(10));
            }
        };

        let stdout = join_reader(stdout_handle.take()).map_err(|message| CompilerError::Io { message })?;
        let stderr = join_reader(stderr_handle.take()).map_err(|message| CompilerError::Io { message })?;

        Ok(CompileOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
            spawn_error: None,
        })
    }
}

impl CompilerInvoker for ProcessCompiler {
    fn compile(&self, source: &Path) -> CompileOutput {
        match self.run(source) {
            Ok(output) => {
                if output.success() {
                    log::debug!("Compiled {} cleanly", source.display());
                } else {
                    log::debug!("Compiler exited with {} for {}", output.exit_code, source.display());
                }
                output
            }
            Err(e) => {
                log::error!("{e}");
                CompileOutput::spawn_failed(e.to_string())
            }
        }
    }
}

fn read_pipe_to_string<R: Read>(mut pipe: R) -> std::io::Result<String> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).to_string())
}

fn join_reader(handle: Option<thread::JoinHandle<std::io::Result<String>>>) -> Result<String, String> {
    match handle {
        Some(handle) => match handle.join() {
            Ok(res) => res.map_err(|e| format!("Failed to read output: {e}")),
            Err(_) => Err("Output reader thread panicked".to_string()),
        },
        None => Ok(String::new()),
    }
}
