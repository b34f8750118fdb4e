//! Doctor command - verify configuration and API keys.

use crate::cli::{mask_key, Output};
use crate::config::Settings;
use console::style;
use std::path::Path;
use url::Url;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Recap Doctor");
    println!();
    println!("Checking configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Keys").bold());
    let key_checks = vec![
        check_key(
            "Speech-to-text",
            settings.transcription.api_key.as_deref(),
            true,
            "Needed for file uploads and non-YouTube videos. Set OPENAI_API_KEY or transcription.api_key",
        ),
        check_key(
            "Summarization",
            settings.summarization.api_key.as_deref(),
            true,
            "Needed for 'recap summarize'. Set OPENAI_API_KEY or summarization.api_key",
        ),
        check_key(
            "Transcript API",
            settings.delegated.api_key.as_deref(),
            false,
            "Optional last-resort caption source. Set TRANSCRIPT_API_KEY or delegated.api_key",
        ),
        check_key(
            "Media resolver",
            settings.media.api_key.as_deref(),
            false,
            "Needed for Vimeo, TikTok and other platforms. Set MEDIA_API_KEY or media.api_key",
        ),
    ];
    for check in &key_checks {
        check.print();
    }
    checks.extend(key_checks);

    println!();

    println!("{}", style("Endpoints").bold());
    let endpoint_checks = vec![
        check_endpoint("Transcription API base", &settings.transcription.api_base),
        check_endpoint("Summarization API base", &settings.summarization.api_base),
        check_endpoint("Transcript API", &settings.delegated.endpoint),
        check_endpoint("Media resolver", &settings.media.primary_endpoint),
        check_endpoint("Media resolver (alternative)", &settings.media.alternative_endpoint),
    ];
    for check in &endpoint_checks {
        check.print();
    }
    checks.extend(endpoint_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Recap.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Recap is ready to use.");
    }

    Ok(())
}

/// Check an API key. Missing required keys are warnings, since caption
/// lookup works without any key at all.
fn check_key(name: &str, key: Option<&str>, required: bool, hint: &str) -> CheckResult {
    match key {
        Some(k) if !k.trim().is_empty() => CheckResult::ok(name, &format!("configured ({})", mask_key(k))),
        Some(_) => CheckResult::error(name, "empty", hint),
        None if required => CheckResult::warning(name, "not set", hint),
        None => CheckResult::ok(name, "not set (optional)"),
    }
}

fn check_endpoint(name: &str, endpoint: &str) -> CheckResult {
    match Url::parse(endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => CheckResult::ok(name, endpoint),
        Ok(url) => CheckResult::error(
            name,
            &format!("unsupported scheme '{}'", url.scheme()),
            "Use an http(s) URL",
        ),
        Err(e) => CheckResult::error(name, &format!("invalid URL: {}", e), "Fix the URL in the config file"),
    }
}

fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: recap config init",
        )
    }
}
