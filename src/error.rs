use std::path::PathBuf;

/// Failures that abort the bootstrap sequence before the menu is shown.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    #[error("missing dependency `{name}`: {hint}")]
    MissingDependency { name: String, hint: String },

    #[error("required models not installed: {}", .missing.join(", "))]
    MissingModel { missing: Vec<String> },

    #[error("setup failed ({step}): {reason}")]
    SetupFailure { step: &'static str, reason: String },
}

impl FatalError {
    pub fn setup(step: &'static str, reason: impl std::fmt::Display) -> Self {
        FatalError::SetupFailure {
            step,
            reason: reason.to_string(),
        }
    }

    /// Process exit code for this failure. Zero is reserved for a clean quit.
    pub fn exit_code(&self) -> i32 {
        match self {
            FatalError::MissingDependency { .. } => 2,
            FatalError::MissingModel { .. } => 3,
            FatalError::SetupFailure { .. } => 4,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// A delegate tool ran but exited unsuccessfully.
#[derive(Debug, thiserror::Error)]
#[error("`{command}` exited with {}", describe_exit(.code))]
pub struct SubprocessFailure {
    pub command: String,
    pub code: Option<i32>,
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_and_nonzero() {
        let codes = [
            FatalError::MissingDependency { name: "ollama".into(), hint: String::new() }.exit_code(),
            FatalError::MissingModel { missing: vec![] }.exit_code(),
            FatalError::setup("venv", "boom").exit_code(),
        ];
        assert!(codes.iter().all(|c| *c != 0));
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
    }

    #[test]
    fn test_missing_model_lists_names() {
        let err = FatalError::MissingModel {
            missing: vec!["qwen2.5:7b".into(), "phi3.5:3.8b".into()],
        };
        assert_eq!(err.to_string(), "required models not installed: qwen2.5:7b, phi3.5:3.8b");
    }

    #[test]
    fn test_subprocess_failure_message() {
        let err = SubprocessFailure { command: "ollama pull x".into(), code: Some(1) };
        assert_eq!(err.to_string(), "`ollama pull x` exited with status 1");
        let err = SubprocessFailure { command: "ollama pull x".into(), code: None };
        assert_eq!(err.to_string(), "`ollama pull x` exited with a signal");
    }
}
