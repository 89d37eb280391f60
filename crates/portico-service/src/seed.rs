//! Built-in seed tenant.
//!
//! The service ships with one demo tenant so a fresh deployment serves a
//! working booking page immediately. Slug and tenant ID come from the
//! tenancy configuration; everything else is fixed demo content.

use portico_api::TenancyConfig;
use portico_core::tenant::{
    TenantBranding, TenantFaq, TenantPolicies, TenantProfile, TenantService,
};
use portico_core::{TenantId, TenantRecord};
use uuid::Uuid;

/// Build the seed tenant records for the in-memory store.
pub fn build_seed_tenants(tenancy: &TenancyConfig) -> Vec<TenantRecord> {
    let slug = tenancy.default_slug.clone();
    let subdomain = format!("{}.{}", slug, tenancy.host_suffix);

    vec![TenantRecord {
        tenant_id: TenantId::from_uuid(tenancy.default_tenant_id),
        slug,
        profile: TenantProfile {
            business_name: "Demo Studio".to_string(),
            timezone: "America/New_York".to_string(),
            phone: Some("+1 (555) 010-0000".to_string()),
            email: Some("hello@demostudio.test".to_string()),
            website_url: None,
            address_line1: Some("123 Main Street".to_string()),
            address_line2: None,
            city: Some("Brooklyn".to_string()),
            region: Some("NY".to_string()),
            postal_code: Some("11201".to_string()),
            country: Some("US".to_string()),
            business_hours: Some(serde_json::json!({
                "mon": ["09:00", "18:00"],
                "tue": ["09:00", "18:00"],
                "wed": ["09:00", "18:00"],
                "thu": ["09:00", "20:00"],
                "fri": ["09:00", "20:00"],
                "sat": ["10:00", "16:00"],
            })),
        },
        branding: TenantBranding {
            logo_url: None,
            primary_color: "#4f46e5".to_string(),
            accent_color: "#f59e0b".to_string(),
        },
        services: vec![
            TenantService {
                id: Uuid::new_v4(),
                name: "Consultation".to_string(),
                description: Some("Free 30-minute introductory consultation.".to_string()),
                duration_minutes: 30,
                price_cents: Some(0),
                currency: Some("USD".to_string()),
                active: true,
                sort_order: 1,
            },
            TenantService {
                id: Uuid::new_v4(),
                name: "Standard Appointment".to_string(),
                description: Some("One-hour standard appointment.".to_string()),
                duration_minutes: 60,
                price_cents: Some(8000),
                currency: Some("USD".to_string()),
                active: true,
                sort_order: 2,
            },
        ],
        faqs: vec![
            TenantFaq {
                id: Uuid::new_v4(),
                question: "How do I reschedule?".to_string(),
                answer: "Use the link in your confirmation email up to 24 hours before \
                         your appointment."
                    .to_string(),
                active: true,
                sort_order: 1,
            },
            TenantFaq {
                id: Uuid::new_v4(),
                question: "Where are you located?".to_string(),
                answer: "123 Main Street, Brooklyn, NY. Street parking is available."
                    .to_string(),
                active: true,
                sort_order: 2,
            },
        ],
        policies: Some(TenantPolicies {
            cancellation_policy: Some(
                "Cancel at least 24 hours in advance for a full refund.".to_string(),
            ),
            late_policy: Some(
                "Arrivals more than 15 minutes late may be treated as a no-show.".to_string(),
            ),
            no_show_policy: Some("No-shows are charged 50% of the service price.".to_string()),
            payment_policy: None,
        }),
        domains: vec![subdomain],
    }]
}

#[cfg(test)]
#[path = "seed_tests.rs"]
mod tests;
