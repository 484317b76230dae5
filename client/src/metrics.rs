use prometheus_client::{
    encoding::{text::encode, EncodeLabelSet},
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};
use std::sync::Arc;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub method: String,
    pub outcome: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RetryLabels {
    pub kind: String,
}

#[derive(Debug, Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    pub requests_total: Family<RequestLabels, Counter>,
    pub retries_total: Family<RetryLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let requests_total = Family::<RequestLabels, Counter>::default();
        let retries_total = Family::<RetryLabels, Counter>::default();

        registry.register(
            "roaya_requests",
            "Logical API calls by method and final outcome",
            requests_total.clone(),
        );
        registry.register(
            "roaya_retries",
            "Retried attempts by error kind",
            retries_total.clone(),
        );

        Self {
            registry: Arc::new(registry),
            requests_total,
            retries_total,
        }
    }

    pub fn record_request(&self, method: &str, outcome: &str) {
        self.requests_total
            .get_or_create(&RequestLabels {
                method: method.to_string(),
                outcome: outcome.to_string(),
            })
            .inc();
    }

    pub fn record_retry(&self, kind: &str) {
        self.retries_total
            .get_or_create(&RetryLabels {
                kind: kind.to_string(),
            })
            .inc();
    }

    pub fn retries(&self, kind: &str) -> u64 {
        self.retries_total
            .get_or_create(&RetryLabels {
                kind: kind.to_string(),
            })
            .get()
    }

    /// Render all metrics in the text exposition format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}
