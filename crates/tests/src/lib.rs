//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置 -> writer -> loopback broker 的端到端流程
//! - 并发写入与关闭

#[cfg(test)]
mod contract_tests {
    use contracts::{PublishError, TransportError};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_publish_error_messages() {
        assert_eq!(
            PublishError::ChannelUnavailable.to_string(),
            "Unable to obtain a connection and channel to the broker."
        );
        assert_eq!(
            PublishError::ChannelUnstable.to_string(),
            "The message cannot be published, the channel is unstable."
        );
        let transport = PublishError::from(TransportError::new("connection reset"));
        assert_eq!(transport.to_string(), "connection reset");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{DeliveryMode, Dispatch, FixedClock, PublishError};
    use observability::{PublishStatsAggregator, WriteOutcome};
    use publisher::{ChannelWriter, LoopbackController};

    const CONFIG: &str = r#"
[writer]
name = "orders"
transactional = true

[broker]
kind = "loopback"
fail_every = 4
"#;

    fn writer_from_config(content: &str) -> (ChannelWriter<LoopbackController>, LoopbackController) {
        let config = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        let controller = LoopbackController::with_fail_every(config.broker.fail_every);
        let writer = ChannelWriter::new(controller.clone(), config.writer.transactional)
            .named(config.writer.name);
        (writer, controller)
    }

    /// Config -> ChannelWriter -> loopback journal
    ///
    /// 验证：
    /// 1. 每 4 次发布失败一次，失败后 channel 被丢弃
    /// 2. 下一次写入重新获取 channel
    /// 3. 成功的消息按顺序进入 journal
    #[tokio::test]
    async fn test_e2e_config_to_journal() {
        let (writer, controller) = writer_from_config(CONFIG);
        assert_eq!(writer.name(), "orders");
        assert!(writer.is_transactional());

        let mut stats = PublishStatsAggregator::new();
        for seq in 1..=8u32 {
            let dispatch = Dispatch::new("orders.created", format!("order-{seq}"));
            let outcome = match writer.write(&dispatch).await {
                Ok(()) => WriteOutcome::Success,
                Err(PublishError::ChannelUnavailable) => WriteOutcome::Unavailable,
                Err(_) => WriteOutcome::Failure,
            };
            stats.update(outcome, 0.0);
        }
        writer.commit().await.unwrap();
        writer.close().await;

        assert_eq!(stats.succeeded, 6);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.unavailable, 0);

        // publishes 4 and 8 fail; the second failure discards channel 2
        assert_eq!(controller.channels_opened(), 2);
        assert_eq!(controller.channels_closed(), 2);
        assert!(!writer.holds_channel());

        let bodies: Vec<_> = controller
            .published()
            .into_iter()
            .map(|p| String::from_utf8(p.message.body.to_vec()).unwrap())
            .collect();
        assert_eq!(
            bodies,
            ["order-1", "order-2", "order-3", "order-5", "order-6", "order-7"]
        );

        let snapshot = writer.metrics().snapshot();
        assert_eq!(snapshot.write_count, 6);
        assert_eq!(snapshot.failure_count, 2);
        assert_eq!(snapshot.discarded_count, 2);
        assert_eq!(snapshot.acquired_count, 2);
    }

    #[tokio::test]
    async fn test_e2e_wire_translation_through_loopback() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let controller = LoopbackController::new();
        let writer = ChannelWriter::with_clock(
            controller.clone(),
            false,
            Arc::new(FixedClock(instant)),
        );

        let dispatch = Dispatch::new("audit", "{}")
            .with_message_type("audit.recorded")
            .with_content_type("application/json")
            .with_correlation_id("req-9")
            .with_durable(false)
            .with_expiration(Duration::from_secs(30));
        writer.write(&dispatch).await.unwrap();

        let published = controller.published();
        assert_eq!(published.len(), 1);
        let message = &published[0].message;
        assert_eq!(published[0].destination.as_str(), "audit");
        assert_eq!(message.timestamp, instant);
        assert_eq!(message.delivery_mode, DeliveryMode::Transient);
        assert_eq!(message.message_type.as_deref(), Some("audit.recorded"));
        assert_eq!(message.correlation_id.as_deref(), Some("req-9"));
        assert_eq!(message.expiration.as_deref(), Some("30000"));
    }

    /// Broker outage: writes are refused without publishing, then recover
    #[tokio::test]
    async fn test_e2e_broker_outage_and_recovery() {
        let controller = LoopbackController::new();
        let writer = ChannelWriter::new(controller.clone(), false);
        controller.set_available(false);

        let err = writer.write(&Dispatch::new("q", "lost")).await.unwrap_err();
        assert!(matches!(err, PublishError::ChannelUnavailable));
        assert_eq!(controller.published_count(), 0);

        controller.set_available(true);
        writer.write(&Dispatch::new("q", "kept")).await.unwrap();

        assert_eq!(controller.published_count(), 1);
        assert_eq!(writer.metrics().unavailable_count(), 1);
    }

    /// Injected failure returns the broker's error unchanged
    #[tokio::test]
    async fn test_e2e_transport_error_passthrough() {
        let controller = LoopbackController::new();
        let writer = ChannelWriter::new(controller.clone(), false);
        writer.write(&Dispatch::new("q", "1")).await.unwrap();

        controller.fail_next_publishes(1);
        let err = writer.write(&Dispatch::new("q", "2")).await.unwrap_err();

        match err {
            PublishError::Transport(e) => assert!(e.message().contains("rejected publish #2")),
            other => panic!("expected transport error, got {other:?}"),
        }
        assert!(!writer.holds_channel());

        writer.write(&Dispatch::new("q", "3")).await.unwrap();
        assert_eq!(controller.channels_opened(), 2);
    }

    /// 多个生产者并发写入，中途关闭
    ///
    /// 关闭之后的写入全部返回 ChannelUnavailable，且不再打开新 channel。
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_concurrent_producers_with_close() {
        let controller = LoopbackController::new();
        let writer = Arc::new(ChannelWriter::new(controller.clone(), false));

        let producers: Vec<_> = (0..8)
            .map(|producer| {
                let writer = Arc::clone(&writer);
                tokio::spawn(async move {
                    for seq in 0..20 {
                        let dispatch = Dispatch::new("events", format!("{producer}-{seq}"));
                        let _ = writer.write(&dispatch).await;
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.await.unwrap();
        }

        assert_eq!(controller.published_count(), 160);
        assert_eq!(controller.channels_opened(), 1);

        writer.close().await;
        let opened_before = controller.channels_opened();

        let late: Vec<_> = (0..8)
            .map(|_| {
                let writer = Arc::clone(&writer);
                tokio::spawn(async move {
                    writer.close().await;
                    writer.write(&Dispatch::new("events", "late")).await
                })
            })
            .collect();
        for handle in late {
            let result = handle.await.unwrap();
            assert!(matches!(result, Err(PublishError::ChannelUnavailable)));
        }

        assert_eq!(controller.channels_opened(), opened_before);
        assert_eq!(controller.published_count(), 160);
    }
}
