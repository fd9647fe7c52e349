//! 发布指标收集模块
//!
//! 记录 channel writer 的写入结果、channel 获取/丢弃以及文档拉取指标。

use metrics::{counter, histogram};

/// 单次写入的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// 发布成功
    Success,
    /// Channel 返回发布错误
    Failure,
    /// 无法获取 channel（controller 无可用 channel 或 writer 已关闭）
    Unavailable,
}

impl WriteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Unavailable => "unavailable",
        }
    }
}

/// 记录一次写入
///
/// # Example
///
/// ```ignore
/// use observability::metrics::{record_write, WriteOutcome};
///
/// record_write("orders", WriteOutcome::Success);
/// ```
pub fn record_write(writer: &str, outcome: WriteOutcome) {
    counter!(
        "channel_writer_writes_total",
        "writer" => writer.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// 记录发布耗时 (毫秒)
pub fn record_publish_latency_ms(writer: &str, latency_ms: f64) {
    histogram!(
        "channel_writer_publish_latency_ms",
        "writer" => writer.to_string()
    )
    .record(latency_ms);
}

/// 记录从 controller 获取到新 channel
pub fn record_channel_acquired(writer: &str) {
    counter!(
        "channel_writer_channels_acquired_total",
        "writer" => writer.to_string()
    )
    .increment(1);
}

/// 记录因发布失败而丢弃的 channel
pub fn record_channel_discarded(writer: &str) {
    counter!(
        "channel_writer_channels_discarded_total",
        "writer" => writer.to_string()
    )
    .increment(1);
}

/// 记录文档拉取结果 ("found" / "not_found" / "error")
pub fn record_document_fetch(status: &'static str) {
    counter!("channel_writer_document_fetches_total", "status" => status).increment(1);
}

/// 发布统计聚合器
///
/// 在内存中聚合写入结果与延迟，便于输出摘要。
#[derive(Debug, Clone, Default)]
pub struct PublishStatsAggregator {
    /// 成功写入数
    pub succeeded: u64,

    /// 发布失败数
    pub failed: u64,

    /// 无可用 channel 的写入数
    pub unavailable: u64,

    /// 发布延迟统计 (毫秒)
    pub latency_stats: RunningStats,
}

impl PublishStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, outcome: WriteOutcome, latency_ms: f64) {
        match outcome {
            WriteOutcome::Success => self.succeeded += 1,
            WriteOutcome::Failure => self.failed += 1,
            WriteOutcome::Unavailable => self.unavailable += 1,
        }
        self.latency_stats.push(latency_ms);
    }

    /// 总写入数
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed + self.unavailable
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let total = self.total();
        MetricsSummary {
            total_writes: total,
            succeeded: self.succeeded,
            failed: self.failed,
            unavailable: self.unavailable,
            failure_rate: if total > 0 {
                (self.failed + self.unavailable) as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_writes: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub unavailable: u64,
    pub failure_rate: f64,
    pub latency_ms: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Publish Summary ===")?;
        writeln!(f, "Total writes: {}", self.total_writes)?;
        writeln!(f, "Succeeded: {}", self.succeeded)?;
        writeln!(
            f,
            "Failed: {} / unavailable: {} ({:.2}%)",
            self.failed, self.unavailable, self.failure_rate
        )?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(value);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_counts_outcomes() {
        let mut aggregator = PublishStatsAggregator::new();
        aggregator.update(WriteOutcome::Success, 1.0);
        aggregator.update(WriteOutcome::Success, 3.0);
        aggregator.update(WriteOutcome::Failure, 2.0);
        aggregator.update(WriteOutcome::Unavailable, 0.0);

        assert_eq!(aggregator.total(), 4);
        let summary = aggregator.summary();
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.unavailable, 1);
        assert!((summary.failure_rate - 50.0).abs() < 1e-10);
        assert_eq!(summary.latency_ms.count, 4);

        aggregator.reset();
        assert_eq!(aggregator.total(), 0);
    }

    #[test]
    fn test_summary_display() {
        let summary = MetricsSummary {
            total_writes: 100,
            succeeded: 95,
            failed: 5,
            unavailable: 0,
            failure_rate: 5.0,
            latency_ms: StatsSummary::default(),
        };

        let output = format!("{}", summary);
        assert!(output.contains("Total writes: 100"));
        assert!(output.contains("5.00%"));
        assert!(output.contains("Latency (ms): N/A"));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(WriteOutcome::Success.as_str(), "success");
        assert_eq!(WriteOutcome::Failure.as_str(), "failure");
        assert_eq!(WriteOutcome::Unavailable.as_str(), "unavailable");
    }
}
