use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use fbcapi::Config;
use fbcapi::credentials::mask_secret;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
    }
}

/// Copy of the config that is safe to print
fn masked(config: &Config) -> Config {
    let mut shown = config.clone();
    shown.access_token = shown.access_token.as_deref().map(mask_secret);
    shown
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    let config = masked(config);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&config)?);
        }
        OutputFormat::Text => {
            println!("{}", "fbcapi Configuration".bold());
            println!();

            println!("{}:", "credentials".cyan());
            println!("  access_token: {}", display_opt(&config.access_token));
            println!("  pixel_id: {}", display_opt(&config.pixel_id));
            println!();

            println!("{}:", "environment".cyan());
            println!("  environment: {}", config.environment);
            println!("  test_event_code: {}", display_opt(&config.test_event_code));
            if config.is_production() {
                println!("  {}", "(test_event_code is not sent in production)".dimmed());
            }
            println!();

            println!("{}:", "graph api".cyan());
            println!("  base: {}", config.graph_api_base);
            println!("  version: {}", config.api_version);
            println!("  timeout_secs: {}", config.timeout_secs);
        }
    }

    Ok(())
}

fn display_opt(value: &Option<String>) -> String {
    match value {
        Some(v) => v.clone(),
        None => "(not set)".dimmed().to_string(),
    }
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    match key {
        "access_token" => config.access_token.as_deref().map(mask_secret),
        "pixel_id" => config.pixel_id.clone(),
        "test_event_code" => config.test_event_code.clone(),
        "environment" => Some(config.environment.clone()),
        "graph_api_base" => Some(config.graph_api_base.clone()),
        "api_version" => Some(config.api_version.clone()),
        "timeout_secs" => Some(config.timeout_secs.to_string()),
        "log_level" | "log-level" => Some(config.log_level.as_filter().to_string()),
        _ => None,
    }
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => {
            eyre::bail!("Unknown or unset config key: {}", key);
        }
    }

    Ok(())
}
