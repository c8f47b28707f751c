use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Launcher settings. Every field has a default, so the TOML file is optional
/// and may override any subset of keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_daemon_url")]
    pub daemon_url: String,

    #[serde(default = "default_daemon_binary")]
    pub daemon_binary: String,

    /// Host interpreter used to build the environment and, until the
    /// environment exists, to run the delegate tools.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Prefix service start/restart commands with `sudo`.
    #[serde(default = "default_use_sudo")]
    pub use_sudo: bool,

    /// Directory holding the delegate tool scripts.
    #[serde(default = "default_app_dir")]
    pub app_dir: PathBuf,

    /// Isolated environment directory. Defaults to `<app_dir>/venv`.
    #[serde(default)]
    pub venv_dir: Option<PathBuf>,

    #[serde(default = "default_council_config")]
    pub council_config: PathBuf,

    #[serde(default = "default_chats_dir")]
    pub chats_dir: PathBuf,

    #[serde(default = "default_attachments_dir")]
    pub attachments_dir: PathBuf,

    /// System-level tuning descriptor written by `config.py optimize`.
    #[serde(default = "default_tuning_descriptor")]
    pub tuning_descriptor: PathBuf,

    #[serde(default = "default_pinned_packages")]
    pub pinned_packages: Vec<String>,

    #[serde(default = "default_health_poll_attempts")]
    pub health_poll_attempts: u32,

    #[serde(default = "default_health_poll_interval_ms")]
    pub health_poll_interval_ms: u64,

    #[serde(default = "default_self_test_query")]
    pub self_test_query: String,

    /// Treat any failed pull during provisioning as fatal.
    #[serde(default)]
    pub abort_on_partial_provision: bool,
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_default()
}

fn default_daemon_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_daemon_binary() -> String {
    "ollama".to_string()
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_service_name() -> String {
    "ollama".to_string()
}

fn default_use_sudo() -> bool {
    true
}

fn default_app_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default()
}

fn default_council_config() -> PathBuf {
    home().join(".config/ai-council/config.json")
}

fn default_chats_dir() -> PathBuf {
    home().join(".local/share/ai-council/chats")
}

fn default_attachments_dir() -> PathBuf {
    home().join(".local/share/ai-council/attachments")
}

fn default_tuning_descriptor() -> PathBuf {
    PathBuf::from("/etc/systemd/system/ollama.service.d/override.conf")
}

fn default_pinned_packages() -> Vec<String> {
    ["aiohttp==3.9.5", "textual==0.58.1", "rich==13.7.1"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_health_poll_attempts() -> u32 {
    10
}

fn default_health_poll_interval_ms() -> u64 {
    1000
}

fn default_self_test_query() -> String {
    "What is 2+2?".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daemon_url: default_daemon_url(),
            daemon_binary: default_daemon_binary(),
            interpreter: default_interpreter(),
            service_name: default_service_name(),
            use_sudo: default_use_sudo(),
            app_dir: default_app_dir(),
            venv_dir: None,
            council_config: default_council_config(),
            chats_dir: default_chats_dir(),
            attachments_dir: default_attachments_dir(),
            tuning_descriptor: default_tuning_descriptor(),
            pinned_packages: default_pinned_packages(),
            health_poll_attempts: default_health_poll_attempts(),
            health_poll_interval_ms: default_health_poll_interval_ms(),
            self_test_query: default_self_test_query(),
            abort_on_partial_provision: false,
        }
    }
}

impl Settings {
    pub fn settings_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(dir.join("ai-council").join("launcher.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings at {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn venv_dir(&self) -> PathBuf {
        self.venv_dir
            .clone()
            .unwrap_or_else(|| self.app_dir.join("venv"))
    }

    /// Path of an executable inside the environment.
    pub fn venv_bin(&self, name: &str) -> PathBuf {
        let dir = self.venv_dir();
        if cfg!(windows) {
            dir.join("Scripts").join(format!("{name}.exe"))
        } else {
            dir.join("bin").join(name)
        }
    }

    /// Interpreter for delegate tools: the environment's once it exists,
    /// the host interpreter before that.
    pub fn tool_interpreter(&self) -> String {
        let venv_python = self.venv_bin("python");
        if venv_python.exists() {
            venv_python.to_string_lossy().to_string()
        } else {
            self.interpreter.clone()
        }
    }

    /// Health probes after remediation. Always at least one.
    pub fn health_poll_attempts(&self) -> u32 {
        self.health_poll_attempts.max(1)
    }

    pub fn health_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.health_poll_interval_ms)
    }
}
