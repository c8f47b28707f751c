use std::process::{Command, Stdio};

use crate::error::GatewayError;

/// A program plus its arguments, as handed to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// True when the program is `program` and the arguments start with `prefix`.
    pub fn matches(&self, program: &str, prefix: &[&str]) -> bool {
        self.program == program
            && self.args.len() >= prefix.len()
            && self.args.iter().zip(prefix).all(|(a, p)| a == p)
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Output is buffered and returned to the caller.
    Captured,
    /// The child inherits the terminal; the caller blocks until it exits.
    Interactive,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// `None` when the child was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl Outcome {
    pub fn ok() -> Self {
        Self::with_code(0)
    }

    pub fn with_code(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            stdout: None,
            stderr: None,
        }
    }

    pub fn captured(code: i32, stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stdout: Some(stdout.into()),
            stderr: None,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stdout(&self) -> &str {
        self.stdout.as_deref().unwrap_or("")
    }

    pub fn stderr(&self) -> &str {
        self.stderr.as_deref().unwrap_or("")
    }
}

/// Every external executable the launcher runs goes through this seam.
/// Implementations never retry; callers decide what a non-zero exit means.
pub trait Gateway {
    fn invoke(&mut self, cmd: &CommandLine, mode: Mode) -> Result<Outcome, GatewayError>;

    /// Start a child in the background without joining it.
    fn spawn_detached(&mut self, cmd: &CommandLine) -> Result<(), GatewayError>;

    /// Whether `program` resolves on PATH.
    fn which(&mut self, program: &str) -> bool {
        self.invoke(&CommandLine::new("which").arg(program), Mode::Captured)
            .map(|o| o.success())
            .unwrap_or(false)
    }
}

/// Gateway backed by real processes.
#[derive(Debug, Default)]
pub struct SystemGateway;

impl SystemGateway {
    fn command(cmd: &CommandLine) -> Command {
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        command
    }

    fn launch_error(cmd: &CommandLine, source: std::io::Error) -> GatewayError {
        GatewayError::Launch {
            program: cmd.program.clone(),
            source,
        }
    }
}

impl Gateway for SystemGateway {
    fn invoke(&mut self, cmd: &CommandLine, mode: Mode) -> Result<Outcome, GatewayError> {
        tracing::debug!("exec ({mode:?}): {cmd}");
        let outcome = match mode {
            Mode::Captured => {
                let output = Self::command(cmd)
                    .stdin(Stdio::null())
                    .output()
                    .map_err(|e| Self::launch_error(cmd, e))?;
                Outcome {
                    exit_code: output.status.code(),
                    stdout: Some(String::from_utf8_lossy(&output.stdout).to_string()),
                    stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
                }
            }
            Mode::Interactive => {
                let status = Self::command(cmd)
                    .status()
                    .map_err(|e| Self::launch_error(cmd, e))?;
                Outcome {
                    exit_code: status.code(),
                    stdout: None,
                    stderr: None,
                }
            }
        };
        if !outcome.success() {
            tracing::debug!("`{cmd}` exited with {:?}", outcome.exit_code);
        }
        Ok(outcome)
    }

    fn spawn_detached(&mut self, cmd: &CommandLine) -> Result<(), GatewayError> {
        tracing::debug!("spawn (detached): {cmd}");
        let child = Self::command(cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Self::launch_error(cmd, e))?;
        tracing::info!("started `{cmd}` in the background (pid {})", child.id());
        Ok(())
    }
}
