use anyhow::Result;

use crate::error::SubprocessFailure;
use crate::gateway::{CommandLine, Gateway, Mode, Outcome};
use crate::prompt::Prompter;
use crate::settings::Settings;

/// Everything a bootstrap step or menu handler needs, passed explicitly.
pub struct Context {
    pub settings: Settings,
    pub gateway: Box<dyn Gateway>,
    pub prompter: Box<dyn Prompter>,
}

impl Context {
    pub fn new(settings: Settings, gateway: Box<dyn Gateway>, prompter: Box<dyn Prompter>) -> Self {
        Self {
            settings,
            gateway,
            prompter,
        }
    }

    /// Invoke and turn a non-zero exit into a `SubprocessFailure`.
    pub fn run_checked(&mut self, cmd: &CommandLine, mode: Mode) -> Result<Outcome> {
        let outcome = self.gateway.invoke(cmd, mode)?;
        if !outcome.success() {
            return Err(SubprocessFailure {
                command: cmd.to_string(),
                code: outcome.exit_code,
            }
            .into());
        }
        Ok(outcome)
    }
}
