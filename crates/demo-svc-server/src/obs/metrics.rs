//! In-process metric aggregates for the HTTP surface.
//!
//! Counter and histogram types with dynamic labels backed by `DashMap`. Labels
//! are flattened into sorted key vectors to keep deterministic ordering.
//! Histogram buckets use the conventional Prometheus latency defaults; values
//! are accumulated as integer nanoseconds and rendered in seconds.

use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use axum::http::Method;
use dashmap::DashMap;

type LabelKey = Vec<(String, String)>;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn label_str(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for a label set (0 if never incremented).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", name, help);
        let _ = writeln!(out, "# TYPE {} counter", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str(r.key()), val);
        }
    }
}

/// Default latency buckets in seconds (0.005s - 10s).
pub const DEFAULT_BUCKETS_SECS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

// Same bounds as DEFAULT_BUCKETS_SECS, in nanoseconds.
const BUCKETS_NANOS: [u64; 11] = [
    5_000_000,
    10_000_000,
    25_000_000,
    50_000_000,
    100_000_000,
    250_000_000,
    500_000_000,
    1_000_000_000,
    2_500_000_000,
    5_000_000_000,
    10_000_000_000,
];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum_nanos: AtomicU64,
    buckets: [AtomicU64; 11],
}

/// Point-in-time view of one histogram series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub sum: Duration,
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Observe a duration and increment cumulative buckets.
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self
            .map
            .entry(label_key(labels))
            .or_insert_with(AtomicHistogram::default);
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum_nanos.fetch_add(nanos, Ordering::Relaxed);

        // Cumulative: every bucket whose bound is >= value
        for (i, &b) in BUCKETS_NANOS.iter().enumerate() {
            if nanos <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Count and sum for a label set, `None` if nothing was observed.
    pub fn snapshot(&self, labels: &[(&str, &str)]) -> Option<HistogramSnapshot> {
        self.map.get(&label_key(labels)).map(|h| HistogramSnapshot {
            count: h.count.load(Ordering::Relaxed),
            sum: Duration::from_nanos(h.sum_nanos.load(Ordering::Relaxed)),
        })
    }

    /// Render in Prometheus text exposition format (unit: seconds).
    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", name, help);
        let _ = writeln!(out, "# TYPE {} histogram", name);
        for r in self.map.iter() {
            let hist = r.value();
            let labels = label_str(r.key());
            let prefix = if labels.is_empty() {
                String::new()
            } else {
                format!("{},", labels)
            };

            for (i, le) in DEFAULT_BUCKETS_SECS.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);

            let sum = Duration::from_nanos(hist.sum_nanos.load(Ordering::Relaxed)).as_secs_f64();
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, sum);
            let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, count);
        }
    }
}

/// Series name prefix used unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "demo_svc_http";

/// One finished request, folded into the aggregates and then dropped.
#[derive(Debug, Clone, Copy)]
pub struct RequestOutcome<'a> {
    pub method: &'a Method,
    pub route: &'a str,
    /// Decimal status code, as produced by `StatusRecorder::status_label`.
    pub status_code: &'a str,
    pub elapsed: Duration,
}

/// Process-wide HTTP aggregates, keyed by (method, route, status_code).
pub struct HttpMetrics {
    namespace: String,
    pub requests_total: CounterVec,
    pub request_duration: HistogramVec,
    draining: AtomicBool,
}

impl Default for HttpMetrics {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl HttpMetrics {
    /// `namespace` prefixes every series name; empty yields bare names.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            requests_total: CounterVec::default(),
            request_duration: HistogramVec::default(),
            draining: AtomicBool::new(false),
        }
    }

    /// Record one finished request: one counter increment plus one histogram
    /// observation, both under the same label triple.
    pub fn observe(&self, outcome: &RequestOutcome<'_>) {
        let labels = [
            ("method", outcome.method.as_str()),
            ("route", outcome.route),
            ("status_code", outcome.status_code),
        ];
        self.requests_total.inc(&labels);
        self.request_duration.observe(&labels, outcome.elapsed);
    }

    /// Counter value for a (method, route, status_code) triple.
    pub fn requests(&self, method: &str, route: &str, status_code: &str) -> u64 {
        self.requests_total.get(&[
            ("method", method),
            ("route", route),
            ("status_code", status_code),
        ])
    }

    /// Histogram snapshot for a (method, route, status_code) triple.
    pub fn durations(&self, method: &str, route: &str, status_code: &str) -> Option<HistogramSnapshot> {
        self.request_duration.snapshot(&[
            ("method", method),
            ("route", route),
            ("status_code", status_code),
        ])
    }

    /// Mark draining state.
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }

    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    fn series(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}_{}", self.namespace, name)
        }
    }

    /// Render all series in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.requests_total.render(
            &self.series("requests_total"),
            "Total number of HTTP requests processed, labeled by method, route, and status_code.",
            &mut out,
        );
        self.request_duration.render(
            &self.series("request_duration_seconds"),
            "Latency of HTTP requests.",
            &mut out,
        );

        let draining = self.series("draining");
        let _ = writeln!(out, "# HELP {} Whether the server is draining for shutdown.", draining);
        let _ = writeln!(out, "# TYPE {} gauge", draining);
        let _ = writeln!(out, "{} {}", draining, if self.is_draining() { 1 } else { 0 });
        out
    }
}
