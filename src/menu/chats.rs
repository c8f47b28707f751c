use anyhow::{Context as _, Result};
use console::style;

use crate::context::Context;
use crate::gateway::Mode;
use crate::tools::{self, ExportFormat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub id: String,
    pub title: String,
}

/// Ids and titles from `chat_manager.py list`, which prints `[id] title`
/// lines followed by indented detail lines.
pub fn parse_chat_list(output: &str) -> Vec<ChatSummary> {
    output
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix('[')?;
            let (id, title) = rest.split_once(']')?;
            let id = id.trim();
            if id.is_empty() {
                return None;
            }
            Some(ChatSummary {
                id: id.to_string(),
                title: title.trim().to_string(),
            })
        })
        .collect()
}

/// A list number (1-based) or an exact id.
pub fn resolve_chat<'a>(input: &str, chats: &'a [ChatSummary]) -> Option<&'a ChatSummary> {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        if n >= 1 && n <= chats.len() {
            return Some(&chats[n - 1]);
        }
    }
    chats.iter().find(|c| c.id == input)
}

fn fetch(ctx: &mut Context) -> Result<Vec<ChatSummary>> {
    let cmd = tools::chats_list(&ctx.settings);
    let out = ctx.run_checked(&cmd, Mode::Captured)?;
    Ok(parse_chat_list(out.stdout()))
}

fn print_chats(chats: &[ChatSummary]) {
    for (i, chat) in chats.iter().enumerate() {
        println!("  {:>2}. {} {}", i + 1, style(format!("[{}]", chat.id)).dim(), chat.title);
    }
}

pub fn list(ctx: &mut Context) -> Result<()> {
    let chats = fetch(ctx)?;
    if chats.is_empty() {
        println!("No saved chats.");
        return Ok(());
    }
    println!("Saved chats ({}):", chats.len());
    print_chats(&chats);
    Ok(())
}

/// List chats and ask which one. `None` if there are none.
fn pick(ctx: &mut Context) -> Result<Option<ChatSummary>> {
    let chats = fetch(ctx)?;
    if chats.is_empty() {
        println!("No saved chats.");
        return Ok(None);
    }
    print_chats(&chats);
    let input = ctx.prompter.line("Chat number or id")?;
    match resolve_chat(&input, &chats) {
        Some(chat) => Ok(Some(chat.clone())),
        None => anyhow::bail!("No chat matches {:?}", input.trim()),
    }
}

pub fn view(ctx: &mut Context) -> Result<()> {
    let Some(chat) = pick(ctx)? else {
        return Ok(());
    };
    let cmd = tools::chat_show(&ctx.settings, &chat.id);
    ctx.run_checked(&cmd, Mode::Interactive)?;
    Ok(())
}

pub fn export(ctx: &mut Context) -> Result<()> {
    let Some(chat) = pick(ctx)? else {
        return Ok(());
    };

    for (i, format) in ExportFormat::ALL.iter().enumerate() {
        println!("  {}. {}", i + 1, format.as_str());
    }
    let choice = ctx.prompter.line("Format [1]")?;
    let format = if choice.trim().is_empty() {
        ExportFormat::Markdown
    } else {
        choice
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| ExportFormat::ALL.get(i).copied())
            .with_context(|| format!("Unknown format {:?}", choice.trim()))?
    };

    let cmd = tools::chat_export(&ctx.settings, &chat.id, format);
    let out = ctx.run_checked(&cmd, Mode::Captured)?;

    let dest = std::env::current_dir()?.join(format!("{}.{}", chat.id, format.extension()));
    std::fs::write(&dest, out.stdout())
        .with_context(|| format!("Failed to write {}", dest.display()))?;
    println!("{} Exported \"{}\" to {}", style("✓").green(), chat.title, dest.display());
    Ok(())
}

pub fn delete(ctx: &mut Context) -> Result<()> {
    let Some(chat) = pick(ctx)? else {
        return Ok(());
    };
    let confirmed = ctx
        .prompter
        .confirm(&format!("Delete \"{}\" [{}]?", chat.title, chat.id), false)?;
    if !confirmed {
        println!("Kept.");
        return Ok(());
    }
    let cmd = tools::chat_delete(&ctx.settings, &chat.id);
    ctx.run_checked(&cmd, Mode::Captured)?;
    println!("{} Deleted {}", style("✓").green(), chat.id);
    Ok(())
}
