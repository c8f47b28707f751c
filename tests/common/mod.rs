#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use council::context::Context;
use council::error::GatewayError;
use council::gateway::{CommandLine, Gateway, Mode, Outcome};
use council::prompt::Prompter;
use council::settings::Settings;
use tempfile::TempDir;

// ── Gateway ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallKind {
    Invoke(Mode),
    Spawn,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub cmd: CommandLine,
    pub kind: CallKind,
}

/// Shared view of every command the fake gateway saw, in order.
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn count(&self, program: &str, prefix: &[&str]) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|c| c.cmd.matches(program, prefix))
            .count()
    }

    pub fn spawns(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|c| c.kind == CallKind::Spawn)
            .count()
    }

    pub fn position(&self, program: &str, prefix: &[&str]) -> Option<usize> {
        self.0
            .borrow()
            .iter()
            .position(|c| c.cmd.matches(program, prefix))
    }

    /// Calls whose arguments contain `needle` anywhere (script paths included).
    pub fn count_arg(&self, needle: &str) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|c| c.cmd.args.iter().any(|a| a.contains(needle)))
            .count()
    }

    pub fn find_arg(&self, needle: &str) -> Option<Call> {
        self.0
            .borrow()
            .iter()
            .find(|c| c.cmd.args.iter().any(|a| a.contains(needle)))
            .cloned()
    }
}

pub type Responder = Box<dyn FnMut(&CommandLine, Mode) -> Option<Outcome>>;

/// Records every call and answers from a responder, falling back to
/// [`default_outcome`] when the responder returns `None`.
pub struct FakeGateway {
    log: CallLog,
    responder: Responder,
}

impl FakeGateway {
    pub fn new() -> (Self, CallLog) {
        Self::with(|_, _| None)
    }

    pub fn with<F>(responder: F) -> (Self, CallLog)
    where
        F: FnMut(&CommandLine, Mode) -> Option<Outcome> + 'static,
    {
        let log = CallLog::default();
        let gw = Self {
            log: log.clone(),
            responder: Box::new(responder),
        };
        (gw, log)
    }
}

pub const LIST_HEADER: &str = "NAME    ID    SIZE    MODIFIED\n";

/// Everything succeeds, no managed service exists, and the daemon has
/// no models.
pub fn default_outcome(cmd: &CommandLine) -> Outcome {
    if cmd.matches("systemctl", &["show"]) {
        return Outcome::captured(0, "LoadState=not-found\nActiveState=inactive\n");
    }
    if cmd.matches("ollama", &["list"]) {
        return Outcome::captured(0, LIST_HEADER);
    }
    Outcome::captured(0, "")
}

pub fn inventory(models: &[&str]) -> Outcome {
    let mut out = LIST_HEADER.to_string();
    for m in models {
        out.push_str(&format!("{m}    0123456789ab    2.0 GB    2 days ago\n"));
    }
    Outcome::captured(0, out)
}

impl Gateway for FakeGateway {
    fn invoke(&mut self, cmd: &CommandLine, mode: Mode) -> Result<Outcome, GatewayError> {
        self.log.0.borrow_mut().push(Call {
            cmd: cmd.clone(),
            kind: CallKind::Invoke(mode),
        });
        Ok((self.responder)(cmd, mode).unwrap_or_else(|| default_outcome(cmd)))
    }

    fn spawn_detached(&mut self, cmd: &CommandLine) -> Result<(), GatewayError> {
        self.log.0.borrow_mut().push(Call {
            cmd: cmd.clone(),
            kind: CallKind::Spawn,
        });
        Ok(())
    }
}

// ── Prompter ─────────────────────────────────────────────────

/// Answers from fixed scripts; running out is an error so tests notice
/// unexpected prompts.
#[derive(Default)]
pub struct ScriptedPrompter {
    lines: VecDeque<String>,
    confirms: VecDeque<bool>,
}

impl ScriptedPrompter {
    pub fn new(lines: &[&str], confirms: &[bool]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            confirms: confirms.iter().copied().collect(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn line(&mut self, prompt: &str) -> anyhow::Result<String> {
        self.lines
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("unexpected prompt: {prompt}"))
    }

    fn confirm(&mut self, prompt: &str, _default: bool) -> anyhow::Result<bool> {
        self.confirms
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("unexpected confirmation: {prompt}"))
    }
}

// ── Fake daemon ──────────────────────────────────────────────

/// Serve `/api/tags` on an ephemeral port; returns the base URL.
pub async fn fake_daemon() -> String {
    use axum::{Json, Router, routing::get};

    let app = Router::new().route(
        "/api/tags",
        get(|| async { Json(serde_json::json!({ "models": [] })) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A URL nothing listens on.
pub fn dead_daemon_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

// ── Environment ──────────────────────────────────────────────

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        Self { _tmp: tmp, root }
    }

    pub fn settings(&self, daemon_url: &str) -> Settings {
        Settings {
            daemon_url: daemon_url.to_string(),
            use_sudo: false,
            app_dir: self.root.join("app"),
            venv_dir: None,
            council_config: self.root.join("config/ai-council/config.json"),
            chats_dir: self.root.join("share/ai-council/chats"),
            attachments_dir: self.root.join("share/ai-council/attachments"),
            tuning_descriptor: self.root.join("override.conf"),
            health_poll_attempts: 2,
            health_poll_interval_ms: 10,
            ..Settings::default()
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config/ai-council/config.json")
    }

    pub fn write_config(&self, json: &str) {
        write_file(&self.config_path(), json);
    }
}

pub fn write_file(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

pub fn context(settings: Settings, gateway: FakeGateway, prompter: ScriptedPrompter) -> Context {
    Context::new(settings, Box::new(gateway), Box::new(prompter))
}
