//! Tenant records and their public projection.
//!
//! A [`TenantRecord`] describes one customer account of the platform: its
//! identity, profile, branding, bookable services, FAQs, optional policy
//! bundle, and the custom domains bound to it beyond the slug-based
//! subdomain. Records are constructed by the backing store (seed data or
//! persistent storage) and are immutable from the resolver's perspective.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifier Types
// ============================================================================

/// Unique identifier for a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Generate a new random tenant ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantId {
    type Err = TenantIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = s.parse::<Uuid>().map_err(|_| TenantIdParseError {
            value: s.to_string(),
        })?;
        Ok(Self(uuid))
    }
}

/// Error returned when a tenant ID string is not a valid UUID.
#[derive(Debug, thiserror::Error)]
#[error("invalid tenant ID '{value}': expected UUID format")]
pub struct TenantIdParseError {
    pub value: String,
}

// ============================================================================
// Tenant Record
// ============================================================================

/// One tenant of the platform, bound to one or more hostnames.
///
/// Invariants upheld by the backing store: `slug` is unique across all
/// tenants, and each entry in `domains` maps to at most one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub tenant_id: TenantId,
    pub slug: String,
    pub profile: TenantProfile,
    pub branding: TenantBranding,
    pub services: Vec<TenantService>,
    pub faqs: Vec<TenantFaq>,
    pub policies: Option<TenantPolicies>,
    /// Fully-qualified custom domains bound to this tenant in addition to
    /// the `<slug>.<suffix>` subdomain convention.
    pub domains: Vec<String>,
}

impl TenantRecord {
    /// Build the public projection of this record.
    ///
    /// Drops the `domains` binding list and filters out inactive services
    /// and FAQs, matching what the public API is allowed to expose.
    pub fn to_public(&self) -> TenantPublic {
        TenantPublic {
            tenant_id: self.tenant_id,
            slug: self.slug.clone(),
            profile: self.profile.clone(),
            branding: self.branding.clone(),
            services: self
                .services
                .iter()
                .filter(|service| service.active)
                .cloned()
                .collect(),
            faqs: self.faqs.iter().filter(|faq| faq.active).cloned().collect(),
            policies: self.policies.clone(),
        }
    }

    /// Active services only, preserving stored order.
    pub fn active_services(&self) -> Vec<TenantService> {
        self.services
            .iter()
            .filter(|service| service.active)
            .cloned()
            .collect()
    }
}

/// Business profile fields shown to visitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantProfile {
    pub business_name: String,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Free-form opening-hours structure; shape is owned by the frontend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_hours: Option<serde_json::Value>,
}

/// Branding descriptor for tenant-scoped pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantBranding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub accent_color: String,
}

/// One bookable service offered by a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantService {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub active: bool,
    pub sort_order: u32,
}

/// One frequently-asked question entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantFaq {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub active: bool,
    pub sort_order: u32,
}

/// Optional policy bundle shown on booking pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantPolicies {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_show_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_policy: Option<String>,
}

// ============================================================================
// Public Projection
// ============================================================================

/// The tenant view exposed by public endpoints.
///
/// Identical to [`TenantRecord`] minus the domain bindings, with inactive
/// services and FAQs removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantPublic {
    pub tenant_id: TenantId,
    pub slug: String,
    pub profile: TenantProfile,
    pub branding: TenantBranding,
    pub services: Vec<TenantService>,
    pub faqs: Vec<TenantFaq>,
    pub policies: Option<TenantPolicies>,
}

#[cfg(test)]
#[path = "tenant_tests.rs"]
mod tests;
