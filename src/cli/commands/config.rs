//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::Path;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: Option<&str>) -> Result<()> {
    let path = config_path
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&redacted(settings))
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", path.display());
        }

        ConfigAction::Init { force } => init_config(&path, *force)?,
    }

    Ok(())
}

/// Write a default config file unless one already exists.
fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        Output::warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ));
        return Ok(());
    }

    Settings::default().save_to(path)?;
    Output::success(&format!("Created default config at {}", path.display()));
    Output::info("API keys can also come from OPENAI_API_KEY, TRANSCRIPT_API_KEY and MEDIA_API_KEY.");
    Ok(())
}

/// Settings with API keys hidden, for display.
fn redacted(mut settings: Settings) -> Settings {
    for key in [
        &mut settings.transcription.api_key,
        &mut settings.summarization.api_key,
        &mut settings.delegated.api_key,
        &mut settings.media.api_key,
    ] {
        if let Some(k) = key.as_mut() {
            *k = crate::cli::mask_key(k);
        }
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recap").join("config.toml");

        init_config(&path, false).unwrap();
        assert!(path.exists());

        std::fs::write(&path, "[general]\n").unwrap();
        init_config(&path, false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[general]\n");

        init_config(&path, true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[transcription]"));
    }

    #[test]
    fn test_show_hides_keys() {
        let mut settings = Settings::default();
        settings.summarization.api_key = Some("sk-proj-abcdefghijklmnop".to_string());

        let shown = redacted(settings);
        assert_eq!(shown.summarization.api_key.as_deref(), Some("sk-proj...mnop"));
        assert!(shown.media.api_key.is_none());
    }
}
