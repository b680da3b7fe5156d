//! In-process request metrics rendered in the Prometheus text format.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Mutex;
use std::time::Duration;

/// Default Prometheus histogram buckets, in seconds.
const DURATION_BUCKETS: [f64; 11] = [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RequestKey {
    path: String,
    method: String,
    status: u16,
}

#[derive(Debug, Default, Clone)]
struct Histogram {
    /// Non-cumulative counts per bucket; cumulated when rendered
    buckets: [u64; DURATION_BUCKETS.len()],
    sum: f64,
    count: u64,
}

impl Histogram {
    fn observe(&mut self, seconds: f64) {
        if let Some(index) = DURATION_BUCKETS.iter().position(|&le| seconds <= le) {
            self.buckets[index] += 1;
        }
        self.sum += seconds;
        self.count += 1;
    }
}

/// Request counter and latency histogram.
#[derive(Debug, Default)]
pub struct Metrics {
    requests: Mutex<BTreeMap<RequestKey, u64>>,
    durations: Mutex<BTreeMap<String, Histogram>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one finished request.
    pub fn record(&self, path: &str, method: &str, status: u16, elapsed: Duration) {
        let key = RequestKey {
            path: path.to_string(),
            method: method.to_string(),
            status,
        };
        *self
            .requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(key)
            .or_insert(0) += 1;

        self.durations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(path.to_string())
            .or_default()
            .observe(elapsed.as_secs_f64());
    }

    /// Renders all series in the Prometheus exposition format.
    pub fn render(&self) -> String {
        let requests = self
            .requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        let durations = self
            .durations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        let mut out = String::new();
        out.push_str("# HELP page_analyzer_requests_total Total HTTP requests\n");
        out.push_str("# TYPE page_analyzer_requests_total counter\n");
        for (key, count) in &requests {
            let _ = writeln!(
                out,
                "page_analyzer_requests_total{{path=\"{}\",method=\"{}\",status=\"{}\"}} {}",
                escape_label(&key.path),
                escape_label(&key.method),
                key.status,
                count
            );
        }

        out.push_str("# HELP page_analyzer_request_duration_seconds Request duration in seconds\n");
        out.push_str("# TYPE page_analyzer_request_duration_seconds histogram\n");
        for (path, histogram) in &durations {
            let path = escape_label(path);
            let mut cumulative = 0;
            for (le, count) in DURATION_BUCKETS.iter().zip(histogram.buckets) {
                cumulative += count;
                let _ = writeln!(
                    out,
                    "page_analyzer_request_duration_seconds_bucket{{path=\"{path}\",le=\"{le}\"}} {cumulative}"
                );
            }
            let _ = writeln!(
                out,
                "page_analyzer_request_duration_seconds_bucket{{path=\"{path}\",le=\"+Inf\"}} {}",
                histogram.count
            );
            let _ = writeln!(
                out,
                "page_analyzer_request_duration_seconds_sum{{path=\"{path}\"}} {}",
                histogram.sum
            );
            let _ = writeln!(
                out,
                "page_analyzer_request_duration_seconds_count{{path=\"{path}\"}} {}",
                histogram.count
            );
        }
        out
    }
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
