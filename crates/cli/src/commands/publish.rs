//! `publish` command implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{Destination, Dispatch, PublishError, PublisherConfig};
use observability::{PublishStatsAggregator, WriteOutcome};
use publisher::{ChannelWriter, LoopbackController, MetricsSnapshot};
use tracing::{info, warn};

use crate::cli::PublishArgs;
use crate::error::{self, CliError};
use crate::shutdown::ShutdownListener;

/// Outcome of a publish run
#[derive(Debug, Default)]
pub struct PublishReport {
    pub stats: PublishStatsAggregator,
    pub writer: MetricsSnapshot,
    pub channels_opened: u64,
    pub channels_closed: u64,
    /// True when a shutdown signal cut the run short
    pub interrupted: bool,
}

/// Execute the `publish` command
pub async fn run_publish(args: &PublishArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if config.observability.metrics_port != 0 {
        observability::init_metrics_only(config.observability.metrics_port)?;
    }

    let dispatches = match &args.input {
        Some(path) => read_dispatches(path)
            .with_context(|| format!("Failed to read dispatches from {}", path.display()))?,
        None => {
            let destination = Destination::parse(&args.destination)
                .context("Invalid --destination")?;
            generate_dispatches(&destination, args.count)
        }
    };

    info!(
        writer = %config.writer.name,
        transactional = config.writer.transactional,
        fail_every = config.broker.fail_every,
        dispatches = dispatches.len(),
        "Configuration loaded"
    );

    let report = publish_all(&config, dispatches).await?;

    if report.interrupted {
        warn!("Publishing stopped by shutdown signal");
    }
    info!(
        succeeded = report.stats.succeeded,
        failed = report.stats.failed,
        unavailable = report.stats.unavailable,
        channels_opened = report.channels_opened,
        "Publish run finished"
    );
    print_report(&report);

    Ok(())
}

/// Publish every dispatch through one writer, then commit and close it
///
/// A shutdown signal closes the writer; the remaining dispatches are skipped.
pub async fn publish_all(
    config: &PublisherConfig,
    dispatches: Vec<Dispatch>,
) -> error::Result<PublishReport> {
    let controller = LoopbackController::with_fail_every(config.broker.fail_every);
    let writer = Arc::new(
        ChannelWriter::new(controller.clone(), config.writer.transactional)
            .named(config.writer.name.clone()),
    );

    let listener = Arc::new(ShutdownListener::new({
        let writer = Arc::clone(&writer);
        move || {
            tokio::spawn(async move { writer.close().await });
        }
    }));
    let listen_task = tokio::spawn({
        let listener = Arc::clone(&listener);
        async move { listener.listen().await }
    });

    let mut report = PublishReport::default();
    for dispatch in &dispatches {
        if writer.is_closed() {
            report.interrupted = true;
            break;
        }

        let started = Instant::now();
        let outcome = match writer.write(dispatch).await {
            Ok(()) => WriteOutcome::Success,
            Err(PublishError::ChannelUnavailable) => WriteOutcome::Unavailable,
            Err(e) => {
                warn!(destination = %dispatch.destination, error = %e, "Dispatch not published");
                WriteOutcome::Failure
            }
        };
        report
            .stats
            .update(outcome, started.elapsed().as_secs_f64() * 1000.0);
    }

    if !writer.is_closed() {
        writer.commit().await?;
    }

    listener.close();
    writer.close().await;
    if let Err(e) = listen_task.await {
        warn!(error = %e, "Shutdown listener task failed");
    }

    report.writer = writer.metrics().snapshot();
    report.channels_opened = controller.channels_opened();
    report.channels_closed = controller.channels_closed();
    Ok(report)
}

/// Read one JSON-encoded dispatch per non-empty line
fn read_dispatches(path: &Path) -> error::Result<Vec<Dispatch>> {
    let content = std::fs::read_to_string(path)?;
    parse_dispatches(&content)
}

fn parse_dispatches(content: &str) -> error::Result<Vec<Dispatch>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .map_err(|e| CliError::invalid_dispatch(index + 1, e.to_string()))
        })
        .collect()
}

fn generate_dispatches(destination: &Destination, count: u64) -> Vec<Dispatch> {
    (1..=count)
        .map(|seq| {
            let body = serde_json::json!({ "seq": seq }).to_string();
            Dispatch::new(destination.clone(), body)
                .with_content_type("application/json")
                .with_message_id(format!("generated-{seq}"))
        })
        .collect()
}

fn print_report(report: &PublishReport) {
    println!("\n{}", report.stats.summary());
    println!("Writer:");
    println!("  Published: {}", report.writer.write_count);
    println!("  Rejected by channel: {}", report.writer.failure_count);
    println!("  No channel: {}", report.writer.unavailable_count);
    println!("Channels:");
    println!("  Acquired: {}", report.writer.acquired_count);
    println!("  Discarded: {}", report.writer.discarded_count);
    println!(
        "  Broker opened/closed: {}/{}",
        report.channels_opened, report.channels_closed
    );
    if report.interrupted {
        println!("\n⚠ Interrupted by shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BrokerConfig, ConfigVersion, DocumentsConfig, ObservabilitySettings, WriterConfig};

    fn config(fail_every: u64) -> PublisherConfig {
        PublisherConfig {
            version: ConfigVersion::V1,
            writer: WriterConfig {
                name: "cli-test".into(),
                transactional: false,
            },
            broker: BrokerConfig {
                fail_every,
                ..BrokerConfig::default()
            },
            documents: DocumentsConfig::default(),
            observability: ObservabilitySettings::default(),
        }
    }

    #[test]
    fn test_parse_dispatches_skips_blank_lines() {
        let input = r#"{"destination": "orders", "payload": "a"}

{"destination": "audit", "payload": "b", "durable": false}
"#;
        let dispatches = parse_dispatches(input).unwrap();

        assert_eq!(dispatches.len(), 2);
        assert_eq!(dispatches[0].destination.as_str(), "orders");
        assert!(dispatches[0].durable);
        assert_eq!(&dispatches[1].payload[..], b"b");
        assert!(!dispatches[1].durable);
    }

    #[test]
    fn test_parse_dispatches_reports_line() {
        let input = "{\"destination\": \"orders\", \"payload\": \"a\"}\nnot json\n";
        let err = parse_dispatches(input).unwrap_err();

        assert!(matches!(err, CliError::InvalidDispatch { line: 2, .. }));
    }

    #[test]
    fn test_parse_dispatches_rejects_bad_destination() {
        let input = "{\"destination\": \"orders\", \"payload\": \"a\"}\n{\"destination\": \"\", \"payload\": \"b\"}\n";
        let err = parse_dispatches(input).unwrap_err();

        assert!(matches!(err, CliError::InvalidDispatch { line: 2, ref message } if message.contains("must not be empty")));
    }

    #[test]
    fn test_generate_dispatches() {
        let dispatches = generate_dispatches(&"events".into(), 3);

        assert_eq!(dispatches.len(), 3);
        assert_eq!(dispatches[2].message_id.as_deref(), Some("generated-3"));
        assert_eq!(&dispatches[0].payload[..], br#"{"seq":1}"#);
    }

    #[tokio::test]
    async fn test_publish_all_counts_outcomes() {
        let report = publish_all(&config(0), generate_dispatches(&"events".into(), 5))
            .await
            .unwrap();

        assert_eq!(report.stats.succeeded, 5);
        assert_eq!(report.stats.total(), 5);
        assert_eq!(report.channels_opened, 1);
        assert!(!report.interrupted);
    }

    #[tokio::test]
    async fn test_publish_all_recovers_from_failures() {
        let report = publish_all(&config(3), generate_dispatches(&"events".into(), 6))
            .await
            .unwrap();

        // publishes 3 and 6 fail; each failure discards the channel
        assert_eq!(report.stats.succeeded, 4);
        assert_eq!(report.stats.failed, 2);
        assert_eq!(report.writer.discarded_count, 2);
        assert_eq!(report.channels_opened, 2);
        assert_eq!(report.channels_closed, 2);
    }

    #[test]
    fn test_read_dispatches_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"{\"destination\": \"orders\", \"payload\": \"x\"}\n",
        )
        .unwrap();

        let dispatches = read_dispatches(file.path()).unwrap();
        assert_eq!(dispatches.len(), 1);
    }
}
