//! Prometheus metrics for the HTTP service.
//!
//! Metrics are registered against an owned [`Registry`] rather than the
//! process-global default so multiple instances (one per test, one per
//! service) never collide on registration.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Service metrics exposed at `GET /metrics`.
#[derive(Debug)]
pub struct ServiceMetrics {
    registry: Registry,

    /// Total HTTP requests handled, any route.
    pub http_requests_total: IntCounter,

    /// Tenant resolutions by outcome (`resolved` / `unresolved`).
    pub tenant_resolutions_total: IntCounterVec,

    /// Webhook deliveries received, before verification.
    pub webhooks_received_total: IntCounter,

    /// Webhook deliveries rejected for a missing or invalid signature.
    pub webhook_verification_failures_total: IntCounter,
}

impl ServiceMetrics {
    /// Create and register all service metrics.
    ///
    /// # Errors
    ///
    /// Returns a [`prometheus::Error`] if a collector cannot be built or
    /// registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounter::new(
            "http_requests_total",
            "Total number of HTTP requests handled",
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let tenant_resolutions_total = IntCounterVec::new(
            Opts::new(
                "tenant_resolutions_total",
                "Tenant resolutions grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(tenant_resolutions_total.clone()))?;

        let webhooks_received_total = IntCounter::new(
            "webhooks_received_total",
            "Webhook deliveries received before verification",
        )?;
        registry.register(Box::new(webhooks_received_total.clone()))?;

        let webhook_verification_failures_total = IntCounter::new(
            "webhook_verification_failures_total",
            "Webhook deliveries rejected for signature failure",
        )?;
        registry.register(Box::new(webhook_verification_failures_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            tenant_resolutions_total,
            webhooks_received_total,
            webhook_verification_failures_total,
        })
    }

    /// Record one tenant-resolution outcome.
    pub fn record_resolution(&self, resolved: bool) {
        let outcome = if resolved { "resolved" } else { "unresolved" };
        self.tenant_resolutions_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Render all registered metrics in the Prometheus text format.
    ///
    /// # Errors
    ///
    /// Returns a [`prometheus::Error`] if encoding fails.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
