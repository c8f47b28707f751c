use anyhow::Result;
use dialoguer::{Confirm, Input};

/// User input seam for menus and confirmations.
pub trait Prompter {
    /// Read one line of free text. May be empty.
    fn line(&mut self, prompt: &str) -> Result<String>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;

    fn pause(&mut self) -> Result<()> {
        self.line("Press Enter to continue").map(|_| ())
    }
}

#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn line(&mut self, prompt: &str) -> Result<String> {
        let value: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(value.trim().to_string())
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}
