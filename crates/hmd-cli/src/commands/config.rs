//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use hmd_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_uri": config.api_uri,
                    "token_set": !config.token.is_empty(),
                    "quiet_period_ms": config.quiet_period_ms,
                    "request_timeout_secs": config.request_timeout_secs
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.api_uri);
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  api_uri:              {}", or_unset(&config.api_uri));
            println!("  token:                {}", masked(&config.token));
            println!("  quiet_period_ms:      {}", config.quiet_period_ms);
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    let shown = if key == "token" { masked(&value) } else { value };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "api_uri" => {
            config.api_uri = if value == "none" {
                String::new()
            } else {
                value.to_string()
            };
        }
        "token" => {
            config.token = if value == "none" {
                String::new()
            } else {
                value.to_string()
            };
        }
        "quiet_period_ms" => {
            config.quiet_period_ms = value
                .parse()
                .context("Invalid value for quiet_period_ms. Use a number of milliseconds.")?;
        }
        "request_timeout_secs" => {
            config.request_timeout_secs = value
                .parse()
                .context("Invalid value for request_timeout_secs. Use a number of seconds.")?;
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: api_uri, token, quiet_period_ms, request_timeout_secs",
                key
            );
        }
    }
    config.validate()
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

fn masked(token: &str) -> String {
    if token.is_empty() {
        "(not set)".to_string()
    } else {
        "********".to_string()
    }
}
