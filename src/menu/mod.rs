//! Interactive menu loop.
//!
//! A stack of menu contexts with `Main` at the bottom. Numeric input selects
//! an entry, `0` goes back (or exits from `Main`). Handler errors are shown
//! and the loop carries on.

pub mod chats;
pub mod configuration;
pub mod models;
pub mod selftest;

use anyhow::Result;
use console::style;

use crate::context::Context;
use crate::gateway::Mode;
use crate::tools::{self, Profile, RouterQuery, SearchMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuContext {
    Main,
    AskModes,
    ChatManagement,
    Configuration,
    ModelManagement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Enter(MenuContext),
    Back,
    Exit,

    Ask,
    QuickAnswer,
    CodeQuestion,
    AssistantSession,
    Tui,
    Diagnostics,

    ResearchQuestion,
    CurrentEvents,
    CreativeRequest,
    OfflineQuestion,
    SearchingSession,
    OfflineSession,

    ListChats,
    ViewChat,
    ExportChat,
    DeleteChat,

    ShowConfig,
    RunWizard,
    ResetConfig,
    PerformanceReport,
    Optimize,
    CredentialStatus,
    VerifyTuning,
    ForceCpu,

    ListModels,
    ModelStatus,
    ProvisionModels,
    PullModel,
    RemoveModel,
}

pub struct Entry {
    pub label: &'static str,
    pub action: Action,
}

const fn entry(label: &'static str, action: Action) -> Entry {
    Entry { label, action }
}

const MAIN: &[Entry] = &[
    entry("Ask a question (auto-routed)", Action::Ask),
    entry("Quick answer (simple profile)", Action::QuickAnswer),
    entry("Code question (code profile)", Action::CodeQuestion),
    entry("Council session (interactive)", Action::AssistantSession),
    entry("Terminal UI", Action::Tui),
    entry("Chat history", Action::Enter(MenuContext::ChatManagement)),
    entry("Configuration", Action::Enter(MenuContext::Configuration)),
    entry("Models", Action::Enter(MenuContext::ModelManagement)),
    entry("Run diagnostics", Action::Diagnostics),
    entry("More ways to ask", Action::Enter(MenuContext::AskModes)),
];

const ASK_MODES: &[Entry] = &[
    entry("Research question (research profile)", Action::ResearchQuestion),
    entry("Current events (current profile)", Action::CurrentEvents),
    entry("Creative request (creative profile)", Action::CreativeRequest),
    entry("Ask without web search", Action::OfflineQuestion),
    entry("Council session, always search the web", Action::SearchingSession),
    entry("Council session, no web search", Action::OfflineSession),
];

const CHATS: &[Entry] = &[
    entry("List chats", Action::ListChats),
    entry("View a chat", Action::ViewChat),
    entry("Export a chat", Action::ExportChat),
    entry("Delete a chat", Action::DeleteChat),
];

const CONFIGURATION: &[Entry] = &[
    entry("Show configuration", Action::ShowConfig),
    entry("Run setup wizard", Action::RunWizard),
    entry("Reset configuration", Action::ResetConfig),
    entry("Performance report", Action::PerformanceReport),
    entry("Optimize performance", Action::Optimize),
    entry("API key status", Action::CredentialStatus),
    entry("Verify daemon tuning", Action::VerifyTuning),
    entry("Force CPU-only mode", Action::ForceCpu),
];

const MODELS: &[Entry] = &[
    entry("List installed models", Action::ListModels),
    entry("Required model status", Action::ModelStatus),
    entry("Download missing required models", Action::ProvisionModels),
    entry("Pull a model", Action::PullModel),
    entry("Remove a model", Action::RemoveModel),
];

impl MenuContext {
    pub fn title(self) -> &'static str {
        match self {
            MenuContext::Main => "AI Council",
            MenuContext::AskModes => "More ways to ask",
            MenuContext::ChatManagement => "Chat history",
            MenuContext::Configuration => "Configuration",
            MenuContext::ModelManagement => "Models",
        }
    }

    pub fn entries(self) -> &'static [Entry] {
        match self {
            MenuContext::Main => MAIN,
            MenuContext::AskModes => ASK_MODES,
            MenuContext::ChatManagement => CHATS,
            MenuContext::Configuration => CONFIGURATION,
            MenuContext::ModelManagement => MODELS,
        }
    }

    fn leave_action(self) -> Action {
        match self {
            MenuContext::Main => Action::Exit,
            _ => Action::Back,
        }
    }
}

/// Map raw input to an action in `context`. `None` for anything out of range.
pub fn resolve(context: MenuContext, input: &str) -> Option<Action> {
    let n: usize = input.trim().parse().ok()?;
    if n == 0 {
        return Some(context.leave_action());
    }
    context.entries().get(n - 1).map(|e| e.action)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    stack: Vec<MenuContext>,
    pub last_selection: Option<Action>,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            stack: vec![MenuContext::Main],
            last_selection: None,
        }
    }
}

impl MenuState {
    pub fn current(&self) -> MenuContext {
        self.stack.last().copied().unwrap_or(MenuContext::Main)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn push(&mut self, context: MenuContext) {
        self.stack.push(context);
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Dispatcher {
    ctx: Context,
    state: MenuState,
}

impl Dispatcher {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            state: MenuState::default(),
        }
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Loop until the user exits from the main menu.
    pub fn run(&mut self) -> Result<()> {
        loop {
            render(self.state.current());
            let input = self.ctx.prompter.line("Select")?;
            if self.step(&input) == Flow::Exit {
                println!("Goodbye.");
                return Ok(());
            }
        }
    }

    /// Apply one line of input.
    pub fn step(&mut self, input: &str) -> Flow {
        let current = self.state.current();
        let Some(action) = resolve(current, input) else {
            println!(
                "{} Invalid choice {:?}. Enter 0-{}.",
                style("✗").red(),
                input.trim(),
                current.entries().len()
            );
            return Flow::Continue;
        };
        self.state.last_selection = Some(action);

        match action {
            Action::Enter(context) => self.state.push(context),
            Action::Back => self.state.pop(),
            Action::Exit => return Flow::Exit,
            other => {
                if let Err(e) = handle(&mut self.ctx, other) {
                    tracing::debug!("Handler for {other:?} failed: {e:#}");
                    println!("{} {e:#}", style("✗").red());
                }
            }
        }
        Flow::Continue
    }
}

fn render(context: MenuContext) {
    println!();
    println!("{}", style(format!("── {} ──", context.title())).bold().cyan());
    for (i, entry) in context.entries().iter().enumerate() {
        println!("  {}. {}", i + 1, entry.label);
    }
    let leave = match context {
        MenuContext::Main => "Exit",
        _ => "Back",
    };
    println!("  0. {leave}");
}

fn handle(ctx: &mut Context, action: Action) -> Result<()> {
    match action {
        Action::Ask => ask(ctx, None, true, true),
        Action::QuickAnswer => ask(ctx, Some(Profile::Simple), false, true),
        Action::CodeQuestion => ask(ctx, Some(Profile::Code), true, true),
        Action::AssistantSession => session(ctx, SearchMode::Auto),
        Action::Tui => {
            let cmd = tools::tui(&ctx.settings);
            ctx.run_checked(&cmd, Mode::Interactive).map(|_| ())
        }
        Action::Diagnostics => {
            selftest::run(ctx).print();
            Ok(())
        }

        Action::ResearchQuestion => ask(ctx, Some(Profile::Research), true, true),
        Action::CurrentEvents => ask(ctx, Some(Profile::Current), true, true),
        Action::CreativeRequest => ask(ctx, Some(Profile::Creative), true, true),
        Action::OfflineQuestion => ask(ctx, None, true, false),
        Action::SearchingSession => session(ctx, SearchMode::Force),
        Action::OfflineSession => session(ctx, SearchMode::Off),

        Action::ListChats => chats::list(ctx),
        Action::ViewChat => chats::view(ctx),
        Action::ExportChat => chats::export(ctx),
        Action::DeleteChat => chats::delete(ctx),

        Action::ShowConfig => configuration::show(ctx),
        Action::RunWizard => configuration::wizard(ctx),
        Action::ResetConfig => configuration::reset(ctx),
        Action::PerformanceReport => {
            crate::bootstrap::performance::report(&ctx.settings);
            Ok(())
        }
        Action::Optimize => crate::bootstrap::performance::optimize(ctx),
        Action::CredentialStatus => configuration::credential_status(ctx),
        Action::VerifyTuning => configuration::verify_tuning(ctx),
        Action::ForceCpu => configuration::force_cpu(ctx),

        Action::ListModels => models::list(ctx),
        Action::ModelStatus => models::status(ctx),
        Action::ProvisionModels => models::provision(ctx),
        Action::PullModel => models::pull(ctx),
        Action::RemoveModel => models::remove(ctx),

        Action::Enter(_) | Action::Back | Action::Exit => Ok(()),
    }
}

fn ask(ctx: &mut Context, profile: Option<Profile>, preprocess: bool, search: bool) -> Result<()> {
    let text = ctx.prompter.line("Your question")?;
    if text.trim().is_empty() {
        anyhow::bail!("Empty question, nothing sent");
    }
    let query = RouterQuery {
        text: text.trim(),
        profile,
        preprocess,
        search,
        timing: true,
    };
    let cmd = query.command(&ctx.settings);
    ctx.run_checked(&cmd, Mode::Interactive)?;
    Ok(())
}

fn session(ctx: &mut Context, search: SearchMode) -> Result<()> {
    let cmd = tools::assistant_session(&ctx.settings, search);
    ctx.run_checked(&cmd, Mode::Interactive)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_in_range() {
        assert_eq!(resolve(MenuContext::Main, "1"), Some(Action::Ask));
        assert_eq!(
            resolve(MenuContext::Main, " 6 "),
            Some(Action::Enter(MenuContext::ChatManagement))
        );
        assert_eq!(resolve(MenuContext::ModelManagement, "5"), Some(Action::RemoveModel));
        assert_eq!(
            resolve(MenuContext::Main, "10"),
            Some(Action::Enter(MenuContext::AskModes))
        );
        assert_eq!(resolve(MenuContext::AskModes, "6"), Some(Action::OfflineSession));
    }

    #[test]
    fn test_resolve_zero_leaves() {
        assert_eq!(resolve(MenuContext::Main, "0"), Some(Action::Exit));
        assert_eq!(resolve(MenuContext::Configuration, "0"), Some(Action::Back));
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        assert_eq!(resolve(MenuContext::Main, "11"), None);
        assert_eq!(resolve(MenuContext::AskModes, "7"), None);
        assert_eq!(resolve(MenuContext::Main, "-1"), None);
        assert_eq!(resolve(MenuContext::Main, "abc"), None);
        assert_eq!(resolve(MenuContext::Main, ""), None);
        assert_eq!(resolve(MenuContext::ChatManagement, "5"), None);
    }

    #[test]
    fn test_state_never_pops_main() {
        let mut state = MenuState::default();
        state.pop();
        assert_eq!(state.current(), MenuContext::Main);
        state.push(MenuContext::Configuration);
        assert_eq!(state.depth(), 2);
        state.pop();
        assert_eq!(state.current(), MenuContext::Main);
    }
}
