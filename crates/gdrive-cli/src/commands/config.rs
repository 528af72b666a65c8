//! Config command - View and manage gdrive configuration
//!
//! Provides the `gdrive config` CLI command which:
//! 1. Shows the current configuration (YAML or JSON)
//! 2. Sets individual configuration values via dot-notation keys
//! 3. Validates the configuration file and reports errors

use anyhow::{Context as _, Result};
use clap::Subcommand;
use gdrive_core::config::Config;
use tracing::info;

use super::Context;

/// Keys accepted by `config set`, with a short description
const SUPPORTED_KEYS: &[(&str, &str)] = &[
    ("api.base_url", "Drive v3 metadata endpoint"),
    ("api.upload_url", "Drive v3 upload endpoint"),
    ("api.request_timeout_secs", "Timeout for metadata calls"),
    ("api.page_size", "Objects per listing page (1-1000)"),
    ("auth.client_id", "OAuth client ID"),
    ("auth.client_secret", "OAuth client secret"),
    ("auth.account", "Keyring account name"),
    ("logging.level", "trace|debug|info|warn|error"),
];

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "api.page_size")
        key: String,
        /// New value
        value: String,
    },
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx).await,
            ConfigCommand::Set { key, value } => self.execute_set(ctx, key, value).await,
            ConfigCommand::Validate => self.execute_validate(ctx).await,
        }
    }

    async fn execute_show(&self, ctx: &Context) -> Result<()> {
        let fmt = ctx.formatter();
        info!(config_path = %ctx.config_path.display(), "Showing configuration");

        if ctx.is_json() {
            let json = serde_json::to_value(&ctx.config)
                .context("Failed to serialize configuration to JSON")?;
            fmt.print_json(&json);
        } else {
            fmt.success(&format!("Configuration ({})", ctx.config_path.display()));
            fmt.info("");

            let yaml = serde_yaml::to_string(&ctx.config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                fmt.info(line);
            }
        }
        Ok(())
    }

    async fn execute_set(&self, ctx: &Context, key: &str, value: &str) -> Result<()> {
        let fmt = ctx.formatter();
        let config_path = &ctx.config_path;
        let mut config = Config::load_or_default(config_path);

        info!(key = %key, "Setting configuration value");

        if let Err(e) = apply_config_value(&mut config, key, value) {
            if ctx.is_json() {
                fmt.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "error": e.to_string(),
                }));
            } else {
                fmt.error(&format!("Failed to set '{}': {}", key, e));
                fmt.info("");
                fmt.info("Supported keys:");
                for (name, description) in SUPPORTED_KEYS {
                    fmt.info(&format!("  {name:<26} - {description}"));
                }
            }
            return Err(e);
        }

        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::bail!("Invalid value for '{}': {}", key, messages.join("; "));
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create configuration directory")?;
        }
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
        std::fs::write(config_path, &yaml).context("Failed to write configuration file")?;

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "success": true,
                "key": key,
                "config_path": config_path.display().to_string(),
            }));
        } else {
            fmt.success(&format!("Set {}", key));
            fmt.info(&format!("Saved to {}", config_path.display()));
        }
        Ok(())
    }

    async fn execute_validate(&self, ctx: &Context) -> Result<()> {
        let fmt = ctx.formatter();
        let config_path = &ctx.config_path;

        // Load explicitly; a parse error must not fall back to defaults
        let config = match Config::load(config_path) {
            Ok(cfg) => cfg,
            Err(_) if !config_path.exists() => {
                if ctx.is_json() {
                    fmt.print_json(&serde_json::json!({
                        "valid": true,
                        "config_path": config_path.display().to_string(),
                        "exists": false,
                    }));
                } else {
                    fmt.info(&format!(
                        "Configuration file not found at {}",
                        config_path.display()
                    ));
                    fmt.info("Using default configuration. Run 'gdrive config set <key> <value>' to create one.");
                }
                return Ok(());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to parse configuration {}", config_path.display())
                });
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");
        let errors = config.validate();

        if ctx.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            fmt.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            fmt.success("Configuration is valid");
            fmt.info(&format!("File: {}", config_path.display()));
        } else {
            fmt.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            fmt.info(&format!("File: {}", config_path.display()));
            fmt.info("");
            for error in &errors {
                fmt.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("configuration is invalid")
        }
    }
}

/// Optional string setting; empty or "none" clears it
fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Apply a dot-notation key/value pair to a Config struct
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        // --- api ---
        "api.base_url" => config.api.base_url = value.to_string(),
        "api.upload_url" => config.api.upload_url = value.to_string(),
        "api.request_timeout_secs" => {
            config.api.request_timeout_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for api.request_timeout_secs")?;
        }
        "api.page_size" => {
            config.api.page_size = value
                .parse::<u32>()
                .context("Expected a positive integer for api.page_size")?;
        }

        // --- auth ---
        "auth.client_id" => config.auth.client_id = optional(value),
        "auth.client_secret" => config.auth.client_secret = optional(value),
        "auth.account" => config.auth.account = value.to_string(),

        // --- logging ---
        "logging.level" => config.logging.level = value.to_string(),

        _ => anyhow::bail!("Unknown configuration key: '{}'", key),
    }
    Ok(())
}
