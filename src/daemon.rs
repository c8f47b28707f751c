use std::collections::BTreeSet;
use std::time::Duration;

use crate::gateway::{CommandLine, Gateway, Mode};
use crate::settings::Settings;

// ── Health ───────────────────────────────────────────────────

/// GET `<daemon_url>/api/tags`; reachable only on 200.
pub async fn probe(daemon_url: &str) -> bool {
    let url = format!("{}/api/tags", daemon_url.trim_end_matches('/'));
    let client = reqwest::Client::new();
    match client.get(&url).timeout(Duration::from_secs(3)).send().await {
        Ok(resp) => resp.status() == reqwest::StatusCode::OK,
        Err(e) => {
            tracing::debug!("Health probe {url} failed: {e}");
            false
        }
    }
}

/// Probe up to `attempts` times, sleeping `interval` between tries.
pub async fn wait_until_healthy(daemon_url: &str, attempts: u32, interval: Duration) -> bool {
    for attempt in 1..=attempts {
        if probe(daemon_url).await {
            tracing::info!("Daemon healthy after {attempt} probe(s)");
            return true;
        }
        if attempt < attempts {
            tokio::time::sleep(interval).await;
        }
    }
    false
}

// ── Service management ───────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Active,
    Inactive,
    /// No managed service, or the service manager could not be queried.
    Unknown,
}

/// Parse `systemctl show <unit> --property=LoadState,ActiveState`.
pub fn parse_service_status(output: &str) -> ServiceStatus {
    let mut load_state = None;
    let mut active_state = None;
    for line in output.lines() {
        if let Some(v) = line.trim().strip_prefix("LoadState=") {
            load_state = Some(v.trim());
        } else if let Some(v) = line.trim().strip_prefix("ActiveState=") {
            active_state = Some(v.trim());
        }
    }

    match (load_state, active_state) {
        (Some("loaded"), Some("active")) => ServiceStatus::Active,
        (Some("loaded"), Some(_)) => ServiceStatus::Inactive,
        _ => ServiceStatus::Unknown,
    }
}

pub fn service_status(gateway: &mut dyn Gateway, service: &str) -> ServiceStatus {
    let cmd = CommandLine::new("systemctl").args([
        "show",
        service,
        "--property=LoadState,ActiveState",
    ]);
    match gateway.invoke(&cmd, Mode::Captured) {
        Ok(out) if out.success() => parse_service_status(out.stdout()),
        Ok(_) => ServiceStatus::Unknown,
        Err(e) => {
            tracing::debug!("Service manager unavailable: {e}");
            ServiceStatus::Unknown
        }
    }
}

/// `systemctl <action> <service>`, through sudo when configured.
pub fn service_command(settings: &Settings, action: &str) -> CommandLine {
    let base = if settings.use_sudo {
        CommandLine::new("sudo").arg("systemctl")
    } else {
        CommandLine::new("systemctl")
    };
    base.args([action, settings.service_name.as_str()])
}

/// Start the managed service. Interactive so sudo can ask for a password.
pub fn start_service(gateway: &mut dyn Gateway, settings: &Settings) -> bool {
    run_service_action(gateway, settings, "start")
}

pub fn restart_service(gateway: &mut dyn Gateway, settings: &Settings) -> bool {
    run_service_action(gateway, settings, "restart")
}

fn run_service_action(gateway: &mut dyn Gateway, settings: &Settings, action: &str) -> bool {
    let cmd = service_command(settings, action);
    match gateway.invoke(&cmd, Mode::Interactive) {
        Ok(out) if out.success() => true,
        Ok(out) => {
            tracing::warn!("`{cmd}` exited with {:?}", out.exit_code);
            false
        }
        Err(e) => {
            tracing::warn!("{e}");
            false
        }
    }
}

/// `<daemon> serve` in the background, not joined.
pub fn spawn_unmanaged(gateway: &mut dyn Gateway, settings: &Settings) -> bool {
    let cmd = CommandLine::new(settings.daemon_binary.as_str()).arg("serve");
    match gateway.spawn_detached(&cmd) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("{e}");
            false
        }
    }
}

// ── Inventory ────────────────────────────────────────────────

/// Model names from `ollama list` output. The first row is a header.
pub fn parse_inventory(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .skip_while(|line| line.trim().is_empty())
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(String::from)
        .collect()
}

/// Whether installed model `name` satisfies `wanted`. A bare name matches
/// its `:latest` tag.
pub fn satisfies(name: &str, wanted: &str) -> bool {
    name == wanted || (!wanted.contains(':') && name.strip_suffix(":latest") == Some(wanted))
}

pub fn is_installed(installed: &BTreeSet<String>, wanted: &str) -> bool {
    installed.iter().any(|name| satisfies(name, wanted))
}

pub fn list_command(settings: &Settings) -> CommandLine {
    CommandLine::new(settings.daemon_binary.as_str()).arg("list")
}

pub fn pull_command(settings: &Settings, model: &str) -> CommandLine {
    CommandLine::new(settings.daemon_binary.as_str()).args(["pull", model])
}

pub fn remove_command(settings: &Settings, model: &str) -> CommandLine {
    CommandLine::new(settings.daemon_binary.as_str()).args(["rm", model])
}

/// Installed models, or the reason they could not be listed.
pub fn list_installed(gateway: &mut dyn Gateway, settings: &Settings) -> Result<BTreeSet<String>, String> {
    let cmd = list_command(settings);
    let out = gateway.invoke(&cmd, Mode::Captured).map_err(|e| e.to_string())?;
    if !out.success() {
        let detail = out.stderr().trim();
        return Err(if detail.is_empty() {
            format!("`{cmd}` exited with {:?}", out.exit_code)
        } else {
            detail.to_string()
        });
    }
    Ok(parse_inventory(out.stdout()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inventory_skips_header() {
        let out = "NAME                ID              SIZE      MODIFIED\n\
                   llama3.2:3b         a80c4f17acd5    2.0 GB    3 days ago\n\
                   qwen2.5:7b          845dbda0ea48    4.7 GB    3 days ago\n";
        let models = parse_inventory(out);
        assert_eq!(models.len(), 2);
        assert!(models.contains("llama3.2:3b"));
        assert!(models.contains("qwen2.5:7b"));
    }

    #[test]
    fn test_parse_inventory_empty() {
        assert!(parse_inventory("NAME    ID    SIZE    MODIFIED\n").is_empty());
        assert!(parse_inventory("").is_empty());
    }

    #[test]
    fn test_latest_tag_matches_bare_name() {
        let installed: BTreeSet<String> = ["mistral:latest".to_string()].into();
        assert!(is_installed(&installed, "mistral"));
        assert!(!is_installed(&installed, "mistral:7b"));
    }

    #[test]
    fn test_service_status_parsing() {
        assert_eq!(
            parse_service_status("LoadState=loaded\nActiveState=active\n"),
            ServiceStatus::Active
        );
        assert_eq!(
            parse_service_status("LoadState=loaded\nActiveState=failed\n"),
            ServiceStatus::Inactive
        );
        assert_eq!(
            parse_service_status("LoadState=not-found\nActiveState=inactive\n"),
            ServiceStatus::Unknown
        );
        assert_eq!(parse_service_status(""), ServiceStatus::Unknown);
    }

    #[test]
    fn test_service_command_sudo() {
        let settings = Settings::default();
        assert_eq!(service_command(&settings, "restart").to_string(), "sudo systemctl restart ollama");

        let settings = Settings { use_sudo: false, ..Settings::default() };
        assert_eq!(service_command(&settings, "start").to_string(), "systemctl start ollama");
    }
}
