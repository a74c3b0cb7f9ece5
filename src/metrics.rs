//! In-process metrics aggregation with Prometheus-style text output.
//!
//! Series are keyed by metric name plus a sorted list of label pairs.
//! Histograms and timings keep a bounded window of the most recent samples
//! and are rendered as summaries over that window.

use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write;
use std::time::Duration;

use dashmap::DashMap;
use tracing::warn;

/// Samples retained per histogram or timing series.
pub const MAX_SAMPLES: usize = 1000;

/// Label pairs as passed by callers.
pub type Labels<'a> = &'a [(&'a str, &'a str)];

/// Metric name plus its labels, sorted by label name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricKey {
    name: String,
    labels: Vec<(String, String)>,
}

impl MetricKey {
    pub fn new(name: &str, labels: Labels<'_>) -> Self {
        let mut labels: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        labels.sort();
        Self {
            name: name.to_string(),
            labels,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn labels(&self) -> &[(String, String)] {
        &self.labels
    }

    /// `name{k="v",...}` with the given suffix appended to the name.
    fn series(&self, suffix: &str) -> String {
        let mut out = format!("{}{}", self.name, suffix);
        if !self.labels.is_empty() {
            out.push('{');
            for (i, (k, v)) in self.labels.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}=\"{}\"", k, escape_label_value(v));
            }
            out.push('}');
        }
        out
    }
}

fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, sample: T) {
    buffer.push_back(sample);
    while buffer.len() > MAX_SAMPLES {
        buffer.pop_front();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Summary {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl Summary {
    fn of(samples: impl Iterator<Item = f64>) -> Option<Self> {
        let mut summary: Option<Summary> = None;
        for v in samples {
            summary = Some(match summary {
                None => Summary {
                    sum: v,
                    count: 1,
                    min: v,
                    max: v,
                },
                Some(s) => Summary {
                    sum: s.sum + v,
                    count: s.count + 1,
                    min: s.min.min(v),
                    max: s.max.max(v),
                },
            });
        }
        summary
    }

    fn avg(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Exposition type of a metric name. A name keeps the kind it was first
/// recorded with; samples of another kind under that name are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricKind {
    Counter,
    Gauge,
    /// Histograms and timings.
    Summary,
}

impl MetricKind {
    fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Summary => "summary",
        }
    }
}

/// One metric name's rendered block.
struct Family {
    kind: MetricKind,
    lines: Vec<String>,
}

/// Concurrent metrics store. Share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    counters: DashMap<MetricKey, u64>,
    histograms: DashMap<MetricKey, VecDeque<f64>>,
    timings: DashMap<MetricKey, VecDeque<Duration>>,
    gauges: DashMap<MetricKey, f64>,
    kinds: DashMap<String, MetricKind>,
    help: DashMap<String, String>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `# HELP` text for a metric name.
    pub fn describe(&self, name: &str, help: &str) {
        self.help.insert(name.to_string(), help.to_string());
    }

    /// Bind `name` to `kind` on first use. False if it is bound to another kind.
    fn claim(&self, name: &str, kind: MetricKind) -> bool {
        let bound = match self.kinds.get(name) {
            Some(bound) => *bound,
            None => *self.kinds.entry(name.to_string()).or_insert(kind),
        };
        if bound != kind {
            warn!(
                metric = name,
                registered = bound.as_str(),
                attempted = kind.as_str(),
                "Metric name already used by another kind; sample dropped"
            );
            return false;
        }
        true
    }

    pub fn increment_counter(&self, name: &str, labels: Labels<'_>) {
        if !self.claim(name, MetricKind::Counter) {
            return;
        }
        *self.counters.entry(MetricKey::new(name, labels)).or_insert(0) += 1;
    }

    pub fn record_histogram(&self, name: &str, value: f64, labels: Labels<'_>) {
        if !self.claim(name, MetricKind::Summary) {
            return;
        }
        let mut entry = self
            .histograms
            .entry(MetricKey::new(name, labels))
            .or_default();
        push_bounded(entry.value_mut(), value);
    }

    pub fn set_gauge(&self, name: &str, value: f64, labels: Labels<'_>) {
        if !self.claim(name, MetricKind::Gauge) {
            return;
        }
        self.gauges.insert(MetricKey::new(name, labels), value);
    }

    /// Adjust a gauge by `delta`, starting from zero.
    pub fn add_gauge(&self, name: &str, delta: f64, labels: Labels<'_>) {
        if !self.claim(name, MetricKind::Gauge) {
            return;
        }
        *self.gauges.entry(MetricKey::new(name, labels)).or_insert(0.0) += delta;
    }

    pub fn record_timing(&self, name: &str, duration: Duration, labels: Labels<'_>) {
        if !self.claim(name, MetricKind::Summary) {
            return;
        }
        let mut entry = self.timings.entry(MetricKey::new(name, labels)).or_default();
        push_bounded(entry.value_mut(), duration);
    }

    pub fn counter_value(&self, name: &str, labels: Labels<'_>) -> Option<u64> {
        self.counters
            .get(&MetricKey::new(name, labels))
            .map(|v| *v)
    }

    pub fn gauge_value(&self, name: &str, labels: Labels<'_>) -> Option<f64> {
        self.gauges.get(&MetricKey::new(name, labels)).map(|v| *v)
    }

    /// Retained histogram samples, oldest first.
    pub fn histogram_samples(&self, name: &str, labels: Labels<'_>) -> Vec<f64> {
        self.histograms
            .get(&MetricKey::new(name, labels))
            .map(|v| v.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Retained timing samples, oldest first.
    pub fn timing_samples(&self, name: &str, labels: Labels<'_>) -> Vec<Duration> {
        self.timings
            .get(&MetricKey::new(name, labels))
            .map(|v| v.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Render every series in Prometheus text format, sorted by name then labels.
    pub fn render(&self) -> String {
        let mut families: BTreeMap<String, Family> = BTreeMap::new();

        let counters: BTreeMap<MetricKey, u64> = self
            .counters
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        for (key, value) in counters {
            family(&mut families, &key, MetricKind::Counter)
                .lines
                .push(format!("{} {}", key.series(""), value));
        }

        let gauges: BTreeMap<MetricKey, f64> = self
            .gauges
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        for (key, value) in gauges {
            family(&mut families, &key, MetricKind::Gauge)
                .lines
                .push(format!("{} {}", key.series(""), value));
        }

        let histograms: BTreeMap<MetricKey, Option<Summary>> = self
            .histograms
            .iter()
            .map(|e| (e.key().clone(), Summary::of(e.value().iter().copied())))
            .collect();
        let timings: BTreeMap<MetricKey, Option<Summary>> = self
            .timings
            .iter()
            .map(|e| {
                let seconds = e.value().iter().map(Duration::as_secs_f64);
                (e.key().clone(), Summary::of(seconds))
            })
            .collect();
        for (key, summary) in histograms.into_iter().chain(timings) {
            let Some(summary) = summary else { continue };
            let lines = &mut family(&mut families, &key, MetricKind::Summary).lines;
            lines.push(format!("{} {}", key.series("_sum"), summary.sum));
            lines.push(format!("{} {}", key.series("_count"), summary.count));
            lines.push(format!("{} {}", key.series("_avg"), summary.avg()));
            lines.push(format!("{} {}", key.series("_min"), summary.min));
            lines.push(format!("{} {}", key.series("_max"), summary.max));
        }

        let mut out = String::new();
        for (name, family) in families {
            let help = self
                .help
                .get(&name)
                .map(|h| h.value().clone())
                .unwrap_or_else(|| name.replace('_', " "));
            let _ = writeln!(out, "# HELP {} {}", name, help);
            let _ = writeln!(out, "# TYPE {} {}", name, family.kind.as_str());
            for line in family.lines {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }
}

fn family<'a>(
    families: &'a mut BTreeMap<String, Family>,
    key: &MetricKey,
    kind: MetricKind,
) -> &'a mut Family {
    families.entry(key.name.clone()).or_insert_with(|| Family {
        kind,
        lines: Vec::new(),
    })
}
