//! Command lines for the delegate tools.
//!
//! Each tool is a script in the application directory run with the tool
//! interpreter. The launcher only knows their argument contracts.

use crate::gateway::CommandLine;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Config,
    Router,
    Assistant,
    ChatManager,
    Tui,
}

impl Tool {
    pub fn script(self) -> &'static str {
        match self {
            Tool::Config => "config.py",
            Tool::Router => "ai_router.py",
            Tool::Assistant => "ai_council.py",
            Tool::ChatManager => "chat_manager.py",
            Tool::Tui => "ai_tui.py",
        }
    }

    pub fn command(self, settings: &Settings) -> CommandLine {
        let script = settings.app_dir.join(self.script());
        CommandLine::new(settings.tool_interpreter()).arg(script.to_string_lossy())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Simple,
    Code,
    Research,
    Creative,
    Current,
}

impl Profile {
    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Simple => "SIMPLE",
            Profile::Code => "CODE",
            Profile::Research => "RESEARCH",
            Profile::Creative => "CREATIVE",
            Profile::Current => "CURRENT",
        }
    }
}

/// Web search behaviour for a council session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// The council decides per question.
    #[default]
    Auto,
    Force,
    Off,
}

impl SearchMode {
    fn flag(self) -> Option<&'static str> {
        match self {
            SearchMode::Auto => None,
            SearchMode::Force => Some("--force-search"),
            SearchMode::Off => Some("--no-search"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Json,
    Text,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Markdown, ExportFormat::Json, ExportFormat::Text];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "markdown",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }
}

/// A routed query. Without a profile the router picks one itself.
#[derive(Debug, Clone)]
pub struct RouterQuery<'a> {
    pub text: &'a str,
    pub profile: Option<Profile>,
    pub preprocess: bool,
    /// `false` passes `--no-search`.
    pub search: bool,
    pub timing: bool,
}

impl<'a> RouterQuery<'a> {
    pub fn auto(text: &'a str) -> Self {
        Self {
            text,
            profile: None,
            preprocess: true,
            search: true,
            timing: true,
        }
    }

    pub fn command(&self, settings: &Settings) -> CommandLine {
        let mut cmd = Tool::Router.command(settings).arg(self.text);
        if let Some(profile) = self.profile {
            cmd = cmd.args(["--profile", profile.as_str()]);
        }
        if !self.preprocess {
            cmd = cmd.arg("--no-preprocess");
        }
        if !self.search {
            cmd = cmd.arg("--no-search");
        }
        if self.timing {
            cmd = cmd.arg("--time");
        }
        cmd
    }
}

pub fn config(settings: &Settings, subcommand: &str) -> CommandLine {
    Tool::Config.command(settings).arg(subcommand)
}

pub fn assistant_session(settings: &Settings, search: SearchMode) -> CommandLine {
    let cmd = Tool::Assistant.command(settings).args(["--interactive", "--time"]);
    match search.flag() {
        Some(flag) => cmd.arg(flag),
        None => cmd,
    }
}

pub fn tui(settings: &Settings) -> CommandLine {
    Tool::Tui.command(settings)
}

pub fn chats_list(settings: &Settings) -> CommandLine {
    Tool::ChatManager.command(settings).arg("list")
}

pub fn chat_show(settings: &Settings, id: &str) -> CommandLine {
    Tool::ChatManager.command(settings).args(["show", id])
}

pub fn chat_export(settings: &Settings, id: &str, format: ExportFormat) -> CommandLine {
    Tool::ChatManager
        .command(settings)
        .args(["export", id, format.as_str()])
}

pub fn chat_delete(settings: &Settings, id: &str) -> CommandLine {
    Tool::ChatManager.command(settings).args(["delete", id])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings() -> Settings {
        Settings {
            app_dir: PathBuf::from("/opt/council"),
            venv_dir: Some(PathBuf::from("/nonexistent/venv")),
            ..Settings::default()
        }
    }

    #[test]
    fn test_router_query_flags() {
        let s = settings();
        let cmd = RouterQuery {
            text: "sort a vec",
            profile: Some(Profile::Code),
            preprocess: false,
            search: true,
            timing: true,
        }
        .command(&s);
        assert_eq!(cmd.program, "python3");
        assert_eq!(
            cmd.args,
            vec!["/opt/council/ai_router.py", "sort a vec", "--profile", "CODE", "--no-preprocess", "--time"]
        );
    }

    #[test]
    fn test_auto_query_has_no_profile() {
        let cmd = RouterQuery::auto("hi").command(&settings());
        assert_eq!(cmd.args, vec!["/opt/council/ai_router.py", "hi", "--time"]);
    }

    #[test]
    fn test_chat_export_contract() {
        let cmd = chat_export(&settings(), "abc123", ExportFormat::Text);
        assert_eq!(cmd.args[1..], ["export", "abc123", "txt"]);
    }

    #[test]
    fn test_research_query_without_search() {
        let cmd = RouterQuery {
            text: "history of rust",
            profile: Some(Profile::Research),
            preprocess: true,
            search: false,
            timing: false,
        }
        .command(&settings());
        assert_eq!(cmd.args[1..], ["history of rust", "--profile", "RESEARCH", "--no-search"]);
    }

    #[test]
    fn test_assistant_flags() {
        let s = settings();
        assert_eq!(assistant_session(&s, SearchMode::Auto).args[1..], ["--interactive", "--time"]);
        assert_eq!(
            assistant_session(&s, SearchMode::Force).args[1..],
            ["--interactive", "--time", "--force-search"]
        );
        assert_eq!(
            assistant_session(&s, SearchMode::Off).args[1..],
            ["--interactive", "--time", "--no-search"]
        );
    }
}
