//! Latency metrics and periodic reporters
//!
//! Insertion is single threaded, so reporters are driven from the per-edge
//! callback: every recorded latency checks whether a reporter's interval has
//! elapsed and, if so, hands it a fresh snapshot.

use std::fs::{self, File};
use std::io::Write;
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use hdrhistogram::Histogram;
use libgraphbench_core::BenchmarkConfiguration;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// Upper bound of the latency histogram, in microseconds
const MAX_LATENCY_US: u64 = 60_000_000;

/// Latency percentiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyPercentiles {
    pub mean_us: f64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Point-in-time view of a recorder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub count: u64,
    pub latencies: LatencyPercentiles,
    pub elapsed: Duration,
}

impl MetricsSnapshot {
    /// Edges per second since the recorder started
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.count as f64 / secs
        } else {
            0.0
        }
    }
}

/// HDR histogram of per-edge latencies
pub struct LatencyRecorder {
    histogram: Histogram<u64>,
    count: u64,
    start: Instant,
}

impl LatencyRecorder {
    pub fn new() -> Result<Self> {
        // 1 microsecond to 60 seconds, 3 significant figures
        let histogram = Histogram::new_with_bounds(1, MAX_LATENCY_US, 3)
            .map_err(|e| BenchError::Metrics(e.to_string()))?;
        Ok(Self {
            histogram,
            count: 0,
            start: Instant::now(),
        })
    }

    pub fn record(&mut self, latency: Duration) {
        self.count += 1;
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.histogram.saturating_record(micros.max(1));
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let latencies = if self.histogram.len() == 0 {
            LatencyPercentiles::default()
        } else {
            LatencyPercentiles {
                mean_us: self.histogram.mean(),
                p50_us: self.histogram.value_at_percentile(50.0),
                p95_us: self.histogram.value_at_percentile(95.0),
                p99_us: self.histogram.value_at_percentile(99.0),
                max_us: self.histogram.max(),
            }
        };
        MetricsSnapshot {
            count: self.count,
            latencies,
            elapsed: self.start.elapsed(),
        }
    }
}

/// Sink for metrics snapshots
pub trait Reporter {
    fn report(&mut self, snapshot: &MetricsSnapshot, at: DateTime<Utc>) -> Result<()>;
}

#[derive(Serialize)]
struct CsvRow {
    t: i64,
    count: u64,
    mean_us: f64,
    p50_us: u64,
    p95_us: u64,
    p99_us: u64,
    max_us: u64,
    rate: f64,
}

/// Appends one row per report to a CSV file
pub struct CsvReporter {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl CsvReporter {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let writer = csv::Writer::from_path(path)?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Reporter for CsvReporter {
    fn report(&mut self, snapshot: &MetricsSnapshot, at: DateTime<Utc>) -> Result<()> {
        self.writer.serialize(CsvRow {
            t: at.timestamp(),
            count: snapshot.count,
            mean_us: snapshot.latencies.mean_us,
            p50_us: snapshot.latencies.p50_us,
            p95_us: snapshot.latencies.p95_us,
            p99_us: snapshot.latencies.p99_us,
            max_us: snapshot.latencies.max_us,
            rate: snapshot.rate(),
        })?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes Graphite plaintext lines (`<path> <value> <unix-seconds>`)
pub struct GraphiteReporter<W> {
    out: W,
    prefix: String,
}

impl GraphiteReporter<TcpStream> {
    pub fn connect(host: &str, port: u16, prefix: &str) -> Result<Self> {
        let stream = TcpStream::connect((host, port))?;
        Ok(Self::new(stream, prefix))
    }
}

impl<W: Write> GraphiteReporter<W> {
    pub fn new(out: W, prefix: &str) -> Self {
        Self {
            out,
            prefix: prefix.to_string(),
        }
    }
}

impl<W: Write> Reporter for GraphiteReporter<W> {
    fn report(&mut self, snapshot: &MetricsSnapshot, at: DateTime<Utc>) -> Result<()> {
        let ts = at.timestamp();
        let l = &snapshot.latencies;
        let values: [(&str, String); 7] = [
            ("count", snapshot.count.to_string()),
            ("latency.mean", format!("{:.2}", l.mean_us)),
            ("latency.p50", l.p50_us.to_string()),
            ("latency.p95", l.p95_us.to_string()),
            ("latency.p99", l.p99_us.to_string()),
            ("latency.max", l.max_us.to_string()),
            ("rate", format!("{:.2}", snapshot.rate())),
        ];
        for (name, value) in values {
            writeln!(self.out, "{}.{} {} {}", self.prefix, name, value, ts)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// A reporter fired at a fixed interval
pub struct Scheduled {
    reporter: Box<dyn Reporter>,
    interval: Duration,
    last: Instant,
    name: &'static str,
}

impl Scheduled {
    pub fn new(name: &'static str, reporter: Box<dyn Reporter>, interval: Duration) -> Self {
        Self {
            reporter,
            interval,
            last: Instant::now(),
            name,
        }
    }

    fn due(&self, now: Instant) -> bool {
        now.duration_since(self.last) >= self.interval
    }
}

/// Latency recorder plus the reporters fed from it
pub struct MetricsRegistry {
    recorder: LatencyRecorder,
    reporters: Vec<Scheduled>,
}

impl MetricsRegistry {
    pub fn new(reporters: Vec<Scheduled>) -> Result<Self> {
        Ok(Self {
            recorder: LatencyRecorder::new()?,
            reporters,
        })
    }

    /// Record one latency and fire any reporter whose interval elapsed
    pub fn record(&mut self, latency: Duration) {
        self.recorder.record(latency);

        let now = Instant::now();
        if !self.reporters.iter().any(|r| r.due(now)) {
            return;
        }
        let snapshot = self.recorder.snapshot();
        let at = Utc::now();
        self.reporters.retain_mut(|scheduled| {
            if !scheduled.due(now) {
                return true;
            }
            scheduled.last = now;
            report_or_drop(scheduled, &snapshot, at)
        });
    }

    /// Final report to every reporter, returning the closing snapshot
    pub fn finish(mut self) -> MetricsSnapshot {
        let snapshot = self.recorder.snapshot();
        let at = Utc::now();
        for scheduled in &mut self.reporters {
            report_or_drop(scheduled, &snapshot, at);
        }
        snapshot
    }

    pub fn is_reporting(&self) -> bool {
        !self.reporters.is_empty()
    }
}

// A failing reporter is dropped; metrics never abort a run.
fn report_or_drop(
    scheduled: &mut Scheduled,
    snapshot: &MetricsSnapshot,
    at: DateTime<Utc>,
) -> bool {
    match scheduled.reporter.report(snapshot, at) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("{} reporter failed, disabling it: {}", scheduled.name, e);
            false
        }
    }
}

/// Reporters configured for one metric name
///
/// `run` tags the CSV file so every planned run keeps its own rows; the
/// Graphite series is shared across runs and keyed by `name` only.
pub fn reporters_for(
    config: &BenchmarkConfiguration,
    name: &str,
    run: &str,
) -> Result<Vec<Scheduled>> {
    let mut reporters = Vec::new();

    if let Some(dir) = config.csv_dir() {
        let reporter = CsvReporter::create(&dir.join(format!("{}.{}.csv", name, run)))?;
        tracing::debug!("csv metrics for {} go to {}", name, reporter.path().display());
        reporters.push(Scheduled::new(
            "csv",
            Box::new(reporter),
            interval(config.csv_reporting_interval()),
        ));
    }

    if config.publish_graphite_metrics() {
        let metrics = config.metrics();
        let host = metrics.graphite_hostname.as_deref().unwrap_or_default();
        let prefix = format!("graphbench.{}", name);
        match GraphiteReporter::connect(host, metrics.graphite_port, &prefix) {
            Ok(reporter) => reporters.push(Scheduled::new(
                "graphite",
                Box::new(reporter),
                interval(config.graphite_reporting_interval()),
            )),
            Err(e) => tracing::warn!(
                "unable to reach graphite at {}:{}, skipping: {}",
                host,
                metrics.graphite_port,
                e
            ),
        }
    }

    Ok(reporters)
}

fn interval(ms: i64) -> Duration {
    Duration::from_millis(u64::try_from(ms).unwrap_or(0))
}
