//! Tenant lookup abstraction and the in-memory implementation.
//!
//! The resolver consumes tenants through the [`TenantStore`] trait so that
//! the backing source (seed data, database, remote cache) can be swapped
//! without touching resolution logic. Lookups return `Ok(None)` for
//! not-found; an `Err` always means genuine infrastructure failure and is
//! never produced for attacker-controlled input.

use crate::tenant::TenantRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Error Types
// ============================================================================

/// Infrastructure failure during a tenant lookup.
///
/// Not-found is not an error; these variants cover the store itself being
/// broken or unreachable. The resolver propagates them unrecovered so an
/// outage is never misclassified as a missing tenant.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("tenant store unavailable: {message}")]
    Unavailable { message: String },

    #[error("tenant lookup failed: {message}")]
    LookupFailed { message: String },
}

impl StoreError {
    /// Check if the failure is transient and a retry may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable { .. } => true,
            Self::LookupFailed { .. } => false,
        }
    }
}

// ============================================================================
// Core Operations (Trait)
// ============================================================================

/// Interface for tenant lookup by slug or exact hostname.
///
/// Both methods match case-insensitively and must be safe to call with
/// arbitrary attacker-controlled strings.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Look up a tenant by its unique slug.
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Arc<TenantRecord>>, StoreError>;

    /// Look up a tenant by an exactly-bound custom domain.
    async fn get_by_hostname(
        &self,
        hostname: &str,
    ) -> Result<Option<Arc<TenantRecord>>, StoreError>;
}

// ============================================================================
// In-Memory Implementation
// ============================================================================

/// Tenant store backed by in-process maps, built once from seed records.
///
/// Keys are lowercased at construction so lookups only need to lowercase
/// the probe. Records are shared via `Arc` because the resolver caches the
/// same record under potentially many hostnames.
pub struct MemoryTenantStore {
    by_slug: HashMap<String, Arc<TenantRecord>>,
    by_hostname: HashMap<String, Arc<TenantRecord>>,
}

impl MemoryTenantStore {
    /// Build the store from a set of tenant records.
    ///
    /// Each record is indexed under its slug and under every bound domain.
    /// Slug uniqueness and one-tenant-per-domain are invariants of the seed
    /// data; a duplicate key would silently keep the later record.
    pub fn new(records: Vec<TenantRecord>) -> Self {
        let mut by_slug = HashMap::new();
        let mut by_hostname = HashMap::new();

        for record in records {
            let record = Arc::new(record);
            by_slug.insert(record.slug.to_lowercase(), Arc::clone(&record));
            for domain in &record.domains {
                by_hostname.insert(domain.to_lowercase(), Arc::clone(&record));
            }
        }

        Self {
            by_slug,
            by_hostname,
        }
    }

    /// Number of tenants indexed by slug.
    pub fn len(&self) -> usize {
        self.by_slug.len()
    }

    /// Whether the store holds no tenants.
    pub fn is_empty(&self) -> bool {
        self.by_slug.is_empty()
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Arc<TenantRecord>>, StoreError> {
        Ok(self.by_slug.get(&slug.to_lowercase()).cloned())
    }

    async fn get_by_hostname(
        &self,
        hostname: &str,
    ) -> Result<Option<Arc<TenantRecord>>, StoreError> {
        Ok(self.by_hostname.get(&hostname.to_lowercase()).cloned())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
