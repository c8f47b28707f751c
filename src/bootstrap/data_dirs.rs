use std::path::PathBuf;

use crate::error::FatalError;
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub chats: PathBuf,
    pub attachments: PathBuf,
}

/// Create the chat and attachment directories. Existing ones are fine.
pub fn ensure(settings: &Settings) -> Result<DataPaths, FatalError> {
    let paths = DataPaths {
        chats: settings.chats_dir.clone(),
        attachments: settings.attachments_dir.clone(),
    };
    for dir in [&paths.chats, &paths.attachments] {
        std::fs::create_dir_all(dir)
            .map_err(|e| FatalError::setup("data directories", format!("{}: {e}", dir.display())))?;
    }
    tracing::debug!("Data directories ready: {paths:?}");
    Ok(paths)
}
