//! Hostname-to-tenant resolution with positive and negative caching.
//!
//! The resolver is the sole entry point the request-handling layer uses to
//! attach a tenant to an inbound request. Subdomain-convention matching is
//! the primary, zero-configuration path (new tenant = new slug, no DNS
//! work); exact-hostname lookup covers white-label custom domains bound
//! directly to a tenant. Successful resolutions are cached long (bindings
//! change rarely), confirmed non-matches are cached short so scanners and
//! stale bookmarks stay cheap without masking a tenant added moments later.

use crate::cache::TtlCache;
use crate::store::{StoreError, TenantStore};
use crate::tenant::TenantRecord;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default lifetime for cached successful resolutions.
const DEFAULT_POSITIVE_TTL: Duration = Duration::from_secs(10 * 60);

/// Default lifetime for cached confirmed non-matches.
const DEFAULT_NEGATIVE_TTL: Duration = Duration::from_secs(60);

// ============================================================================
// Options
// ============================================================================

/// Construction parameters for [`TenantResolver`].
///
/// Threaded in explicitly rather than read from ambient configuration so
/// tests and multi-resolver setups stay straightforward.
#[derive(Debug, Clone)]
pub struct TenantResolverOptions {
    /// Shared DNS suffix for the `<slug>.<suffix>` subdomain convention.
    pub host_suffix: String,

    /// Lifetime of cached successful resolutions.
    pub positive_ttl: Duration,

    /// Lifetime of cached confirmed non-matches.
    pub negative_ttl: Duration,
}

impl TenantResolverOptions {
    /// Options for `host_suffix` with the default TTLs (10 minutes
    /// positive, 60 seconds negative).
    pub fn new(host_suffix: impl Into<String>) -> Self {
        Self {
            host_suffix: host_suffix.into(),
            positive_ttl: DEFAULT_POSITIVE_TTL,
            negative_ttl: DEFAULT_NEGATIVE_TTL,
        }
    }

    /// Replace the positive-cache TTL.
    pub fn with_positive_ttl(mut self, ttl: Duration) -> Self {
        self.positive_ttl = ttl;
        self
    }

    /// Replace the negative-cache TTL.
    pub fn with_negative_ttl(mut self, ttl: Duration) -> Self {
        self.negative_ttl = ttl;
        self
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves a request's `Host` header to the owning tenant, if any.
///
/// Two independent cache instances sit in front of the store: one holding
/// resolved tenants keyed by hostname, one holding a sentinel for
/// confirmed non-matches, each with its own TTL. Concurrent identical
/// lookups are not deduplicated — racing calls each do their own store
/// round-trip and repopulate the cache with the same result, which is
/// benign because store reads are idempotent.
pub struct TenantResolver {
    store: Arc<dyn TenantStore>,
    host_suffix: String,
    positive_cache: Mutex<TtlCache<Arc<TenantRecord>>>,
    negative_cache: Mutex<TtlCache<()>>,
}

impl TenantResolver {
    /// Create a resolver over `store` with the given options.
    ///
    /// The host suffix is lowercased once here; hostnames are lowercased
    /// per request, so all matching is case-insensitive.
    pub fn new(store: Arc<dyn TenantStore>, options: TenantResolverOptions) -> Self {
        Self {
            store,
            host_suffix: options.host_suffix.to_lowercase(),
            positive_cache: Mutex::new(TtlCache::new(options.positive_ttl)),
            negative_cache: Mutex::new(TtlCache::new(options.negative_ttl)),
        }
    }

    /// The configured subdomain suffix, lowercased.
    pub fn host_suffix(&self) -> &str {
        &self.host_suffix
    }

    /// Resolve a raw `Host` header value to a tenant.
    ///
    /// Returns `Ok(None)` when no tenant owns the hostname — a first-class
    /// result, not an error. A store failure propagates unrecovered: the
    /// caller turns it into a server-fault response rather than this layer
    /// masking an outage as "tenant not found".
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the underlying store rejects a lookup.
    #[instrument(skip(self, host_header))]
    pub async fn resolve(
        &self,
        host_header: Option<&str>,
    ) -> Result<Option<Arc<TenantRecord>>, StoreError> {
        let Some(hostname) = host_header.and_then(normalize_host) else {
            return Ok(None);
        };

        if let Some(tenant) = self.positive_cache.lock().unwrap().get(&hostname) {
            debug!(hostname = %hostname, slug = %tenant.slug, "Tenant resolved from positive cache");
            return Ok(Some(tenant));
        }

        if self.negative_cache.lock().unwrap().get(&hostname).is_some() {
            debug!(hostname = %hostname, "Hostname is a cached non-match");
            return Ok(None);
        }

        let mut tenant: Option<Arc<TenantRecord>> = None;

        // Subdomain convention first. The remainder before `.<suffix>` is
        // used verbatim as the slug candidate, embedded dots included.
        if let Some(slug) = self.slug_candidate(&hostname) {
            tenant = self.store.get_by_slug(&slug).await?;
        }

        // Exact custom-domain binding. Also reached when a slug-looking
        // segment turned out to be part of a registered custom domain.
        if tenant.is_none() {
            tenant = self.store.get_by_hostname(&hostname).await?;
        }

        match &tenant {
            Some(record) => {
                debug!(hostname = %hostname, slug = %record.slug, "Tenant resolved via store");
                self.positive_cache
                    .lock()
                    .unwrap()
                    .set(hostname, Arc::clone(record), None);
            }
            None => {
                debug!(hostname = %hostname, "No tenant for hostname; caching negative result");
                self.negative_cache.lock().unwrap().set(hostname, (), None);
            }
        }

        Ok(tenant)
    }

    /// Extract the slug candidate when `hostname` follows the
    /// `<slug>.<suffix>` convention; `None` for non-matching hosts or an
    /// empty leading label.
    fn slug_candidate(&self, hostname: &str) -> Option<String> {
        let remainder = hostname.strip_suffix(&self.host_suffix)?;
        let slug = remainder.strip_suffix('.')?;
        if slug.is_empty() {
            return None;
        }
        Some(slug.to_string())
    }
}

impl std::fmt::Debug for TenantResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantResolver")
            .field("host_suffix", &self.host_suffix)
            .finish_non_exhaustive()
    }
}

/// Normalize a `Host` header value: strip any `:port` suffix and
/// lowercase. Returns `None` for an empty result.
fn normalize_host(host_header: &str) -> Option<String> {
    let hostname = host_header
        .split(':')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    if hostname.is_empty() {
        return None;
    }
    Some(hostname)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
