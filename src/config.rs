use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::ConfigError;

/// Models required when the council config is missing or unusable.
pub const FALLBACK_MODELS: [&str; 3] = ["llama3.2:3b", "qwen2.5:7b", "phi3.5:3.8b"];

/// The council configuration record written by `config.py setup`.
///
/// Only the model roles and the search credential are interpreted here.
/// Everything else is carried through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouncilConfig {
    #[serde(default)]
    pub models: ModelRoles,

    #[serde(default)]
    pub api_keys: ApiKeys,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelRoles {
    #[serde(default)]
    pub preprocessor: Option<String>,

    #[serde(default)]
    pub simple: Option<String>,

    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub council: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(default)]
    pub brave_search: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CouncilConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Model names assigned to the preprocessor, simple, code and council roles.
    /// Deduplicated; blank names are ignored.
    pub fn role_models(&self) -> BTreeSet<String> {
        let roles = &self.models;
        roles
            .preprocessor
            .iter()
            .chain(roles.simple.iter())
            .chain(roles.code.iter())
            .chain(roles.council.iter())
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn credential_configured(&self) -> bool {
        self.api_keys
            .brave_search
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

pub fn fallback_models() -> BTreeSet<String> {
    FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
}

/// The required model set for the config at `path`. Never empty: a missing,
/// unparsable or role-less config yields [`FALLBACK_MODELS`].
pub fn required_models(path: &Path) -> BTreeSet<String> {
    match CouncilConfig::load(path) {
        Ok(cfg) => {
            let models = cfg.role_models();
            if models.is_empty() {
                tracing::warn!("No model roles in {}, using defaults", path.display());
                fallback_models()
            } else {
                models
            }
        }
        Err(e) => {
            tracing::debug!("Using default model set: {e}");
            fallback_models()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, json: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_shared_model_counted_once() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            &tmp,
            r#"{"models": {"preprocessor": "llama3.2:3b", "simple": "llama3.2:3b",
                "code": "qwen2.5:7b", "council": ["llama3.2:3b", "phi3.5:3.8b"]}}"#,
        );
        let required = required_models(&path);
        assert_eq!(required.len(), 3);
        assert_eq!(required.iter().filter(|m| *m == "llama3.2:3b").count(), 1);
    }

    #[test]
    fn test_missing_config_uses_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let required = required_models(&tmp.path().join("absent.json"));
        assert_eq!(required, fallback_models());
        assert_eq!(required.len(), FALLBACK_MODELS.len());
    }

    #[test]
    fn test_unparsable_config_uses_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(&tmp, "{ not json");
        assert_eq!(required_models(&path), fallback_models());
    }

    #[test]
    fn test_config_without_roles_uses_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(&tmp, r#"{"models": {"simple": "  ", "council": []}}"#);
        assert_eq!(required_models(&path), fallback_models());
    }

    #[test]
    fn test_credential_detection() {
        let tmp = tempfile::tempdir().unwrap();
        let empty = write(&tmp, r#"{"api_keys": {"brave_search": ""}}"#);
        assert!(!CouncilConfig::load(&empty).unwrap().credential_configured());

        let set = write(&tmp, r#"{"api_keys": {"brave_search": "BSA-123"}}"#);
        assert!(CouncilConfig::load(&set).unwrap().credential_configured());
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            &tmp,
            r#"{"models": {"code": "qwen2.5:7b", "judge": "llama3.2:3b"},
                "ollama": {"num_gpu": -1}, "api_keys": {"openai": ""}}"#,
        );
        let cfg = CouncilConfig::load(&path).unwrap();
        let value = serde_json::to_value(&cfg).unwrap();
        assert_eq!(value["ollama"]["num_gpu"], -1);
        assert_eq!(value["models"]["judge"], "llama3.2:3b");
        assert_eq!(value["api_keys"]["openai"], "");
    }
}
