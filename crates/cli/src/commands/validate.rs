//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    writer: String,
    transactional: bool,
    broker: String,
    fail_every: u64,
    documents: String,
    metrics_port: Option<u16>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    writer: config.writer.name.clone(),
                    transactional: config.writer.transactional,
                    broker: format!("{:?}", config.broker.kind),
                    fail_every: config.broker.fail_every,
                    documents: config.documents.base_url.clone(),
                    metrics_port: (config.observability.metrics_port != 0)
                        .then_some(config.observability.metrics_port),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &contracts::PublisherConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.broker.fail_every == 1 {
        warnings.push("broker.fail_every = 1 - every publish will fail".to_string());
    }

    if config.writer.transactional {
        warnings.push("writer.transactional is set - commit does not reach the broker".to_string());
    }

    if config.documents.base_url.starts_with("http://") {
        warnings.push(format!(
            "documents.base_url '{}' is not using TLS",
            config.documents.base_url
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Writer: {}", summary.writer);
            println!("  Transactional: {}", summary.transactional);
            println!("  Broker: {} (fail_every = {})", summary.broker, summary.fail_every);
            println!("  Documents: {}", summary.documents);
            match summary.metrics_port {
                Some(port) => println!("  Metrics: port {}", port),
                None => println!("  Metrics: disabled"),
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args_for(content: &str) -> (tempfile::NamedTempFile, ValidateArgs) {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        };
        (file, args)
    }

    #[test]
    fn test_valid_config_summary() {
        let (_file, args) = args_for(
            r#"
[writer]
name = "orders"
transactional = true

[broker]
fail_every = 1
"#,
        );

        let result = validate_config(&args);

        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.writer, "orders");
        assert!(summary.metrics_port.is_none());
        assert_eq!(result.warnings.unwrap().len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let args = ValidateArgs {
            config: "/nonexistent/writer.toml".into(),
            json: false,
        };

        let result = validate_config(&args);

        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_invalid_config() {
        let (_file, args) = args_for(
            r#"
[writer]
name = ""
"#,
        );

        let result = validate_config(&args);

        assert!(!result.valid);
        assert!(result.error.unwrap().contains("writer.name"));
    }
}
