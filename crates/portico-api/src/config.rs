//! Configuration types for the HTTP service.
//!
//! Every field carries a serde default so an entirely unconfigured
//! environment still produces a valid service config. Values are threaded
//! explicitly into component constructors at startup; nothing reads
//! configuration ambiently after that.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Tenant resolution settings
    pub tenancy: TenancyConfig,

    /// Webhook intake settings
    pub webhooks: WebhookConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Check the configuration for values that cannot possibly work.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field found.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be non-zero".to_string());
        }
        if self.tenancy.host_suffix.trim().is_empty() {
            return Err("tenancy.host_suffix must not be empty".to_string());
        }
        if self.tenancy.positive_ttl_seconds == 0 {
            return Err("tenancy.positive_ttl_seconds must be non-zero".to_string());
        }
        if self.tenancy.negative_ttl_seconds == 0 {
            return Err("tenancy.negative_ttl_seconds must be non-zero".to_string());
        }
        if self.tenancy.default_slug.trim().is_empty() {
            return Err("tenancy.default_slug must not be empty".to_string());
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Enable CORS
    pub enable_cors: bool,

    /// Enable compression
    pub enable_compression: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            shutdown_timeout_seconds: 30,
            enable_cors: true,
            enable_compression: true,
        }
    }
}

/// Tenant resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TenancyConfig {
    /// Shared DNS suffix for `<slug>.<suffix>` tenant subdomains
    pub host_suffix: String,

    /// Lifetime of cached successful resolutions, in seconds
    pub positive_ttl_seconds: u64,

    /// Lifetime of cached confirmed non-matches, in seconds
    pub negative_ttl_seconds: u64,

    /// Slug of the seeded demo tenant
    pub default_slug: String,

    /// Stable ID of the seeded demo tenant
    pub default_tenant_id: Uuid,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            host_suffix: "yourdomain.com".to_string(),
            positive_ttl_seconds: 10 * 60,
            negative_ttl_seconds: 60,
            default_slug: "demo".to_string(),
            default_tenant_id: Uuid::nil(),
        }
    }
}

/// Webhook intake configuration
#[derive(Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WebhookConfig {
    /// Shared secret for Cal.com webhook signatures.
    ///
    /// When unset the webhook endpoint rejects every delivery with a
    /// server-fault response; it never accepts unsigned payloads.
    pub calcom_secret: Option<String>,
}

// Manual Debug implementation so the shared secret never reaches logs.
impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field(
                "calcom_secret",
                &self.calcom_secret.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
