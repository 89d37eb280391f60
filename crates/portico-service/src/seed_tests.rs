use super::*;
use portico_api::TenancyConfig;

#[test]
fn seed_builds_one_tenant_from_tenancy_config() {
    let tenancy = TenancyConfig::default();
    let tenants = build_seed_tenants(&tenancy);

    assert_eq!(tenants.len(), 1);
    let tenant = &tenants[0];
    assert_eq!(tenant.slug, tenancy.default_slug);
    assert_eq!(tenant.tenant_id.as_uuid(), tenancy.default_tenant_id);
    assert_eq!(tenant.domains, vec!["demo.yourdomain.com".to_string()]);
}

#[test]
fn seed_tenant_has_usable_public_content() {
    let tenants = build_seed_tenants(&TenancyConfig::default());
    let public = tenants[0].to_public();

    assert_eq!(public.profile.business_name, "Demo Studio");
    assert!(!public.services.is_empty());
    assert!(public.services.iter().all(|s| s.active));
    assert!(!public.faqs.is_empty());
    assert!(public.policies.is_some());
}

#[test]
fn seed_subdomain_follows_configured_suffix() {
    let mut tenancy = TenancyConfig::default();
    tenancy.default_slug = "glow".to_string();
    tenancy.host_suffix = "portico.app".to_string();

    let tenants = build_seed_tenants(&tenancy);
    assert_eq!(tenants[0].domains, vec!["glow.portico.app".to_string()]);
}
