//! Environment readiness check.

use crate::cli::output::{self, Styled};
use crate::config::{self, BrowserEndpoint, TraversalConfig};
use crate::renderer::chromium::find_chromium;
use anyhow::Result;

/// Report credential presence, endpoints, and local Chromium availability.
pub async fn run() -> Result<()> {
    let remote = BrowserEndpoint::remote_from_env();
    let remote_ready = remote.require_credentials().is_ok();
    let chromium = find_chromium();
    let config = TraversalConfig::from_env();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "remote": {
                "endpoint": remote.describe(),
                "credential_set": remote_ready,
            },
            "local": {
                "chromium": chromium.as_ref().map(|p| p.display().to_string()),
            },
            "traversal": {
                "time_budget_secs": config.time_budget.as_secs(),
                "max_attempts": config.max_attempts,
            },
            "ready": remote_ready || chromium.is_some(),
        }));
        return Ok(());
    }

    let s = Styled::new();
    output::print_header(&s);

    if remote_ready {
        output::print_check(s.ok_sym(), "Credential", &format!("{} set", config::TOKEN_VAR));
    } else {
        output::print_check(
            s.fail_sym(),
            "Credential",
            &s.red(&format!("{} not set", config::TOKEN_VAR)),
        );
        output::print_detail(&s.dim(&format!(
            "export {}=<token> (or {})",
            config::TOKEN_VAR,
            config::TOKEN_ALIAS_VAR
        )));
    }
    output::print_check(s.ok_sym(), "Remote", &remote.describe());

    match &chromium {
        Some(path) => output::print_check(s.ok_sym(), "Local Chromium", &path.display().to_string()),
        None => {
            output::print_check(s.warn_sym(), "Local Chromium", &s.yellow("not found"));
            output::print_detail(&s.dim("set PRICEWALK_CHROMIUM_PATH to use --local"));
        }
    }

    output::print_check(
        s.ok_sym(),
        "Budget",
        &format!(
            "{}s, {} attempts per page",
            config.time_budget.as_secs(),
            config.max_attempts
        ),
    );

    if remote_ready {
        output::print_status(&s, &s.green("READY"), "remote browser");
    } else if chromium.is_some() {
        output::print_status(&s, &s.yellow("LOCAL ONLY"), "use --local");
    } else {
        output::print_status(&s, &s.red("NOT READY"), "no browser available");
    }
    Ok(())
}
