//! # Portico Service
//!
//! Binary entry point for the Portico booking-portal HTTP service.
//!
//! This executable:
//! - Loads configuration from environment and files
//! - Initializes structured logging
//! - Seeds the in-memory tenant store and builds the resolver
//! - Starts the HTTP server from portico-api

mod seed;

use portico_api::{start_server, ServiceConfig, ServiceError};
use portico_core::{MemoryTenantStore, TenantResolver, TenantResolverOptions};
use seed::build_seed_tenants;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // -------------------------------------------------------------------------
    // Load configuration
    //
    // Sources (applied in order — later sources override earlier ones):
    //  1. /etc/portico/service.yaml             — system-wide defaults
    //  2. ./config/service.yaml                 — deployment-local override
    //  3. Path given by PORTICO_CONFIG_FILE env — operator-specified file
    //  4. Environment variables prefixed PORTICO__ (double-underscore
    //     separator), e.g. PORTICO__SERVER__PORT=9090 sets server.port = 9090
    //
    // All service configuration fields carry serde defaults, so absent files
    // or an entirely unconfigured environment produces a valid service config
    // with built-in defaults.  A malformed file or an environment variable
    // that cannot be coerced to the correct type IS a hard error because it
    // indicates deliberate-but-broken operator configuration.
    //
    // Configuration is loaded before logging is initialized (the logging
    // section decides the output format), so failures here go to stderr.
    // -------------------------------------------------------------------------
    let mut config_builder = config::Config::builder()
        .add_source(
            config::File::with_name("/etc/portico/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        )
        .add_source(
            config::File::with_name("config/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        );

    // Optional explicit path supplied by the operator.
    let explicit_path = std::env::var("PORTICO_CONFIG_FILE").ok().filter(|p| !p.is_empty());
    if let Some(path) = &explicit_path {
        config_builder = config_builder.add_source(
            config::File::with_name(path)
                .required(true)
                .format(config::FileFormat::Yaml),
        );
    }

    let config = match config_builder
        .add_source(config::Environment::with_prefix("PORTICO").separator("__"))
        .build()
    {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to build configuration; aborting: {}", e);
            std::process::exit(3);
        }
    };

    let service_config: ServiceConfig = match config.try_deserialize() {
        Ok(sc) => sc,
        Err(e) => {
            eprintln!(
                "Could not deserialize service configuration; aborting. \
                 Fix the configuration and restart: {}",
                e
            );
            std::process::exit(3);
        }
    };

    init_logging(&service_config);

    info!("Starting Portico Service");
    if let Some(path) = &explicit_path {
        info!(path = %path, "Loaded configuration from explicit path");
    }

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(3);
    }

    if service_config
        .webhooks
        .calcom_secret
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .is_empty()
    {
        warn!(
            "No Cal.com webhook secret is configured; every webhook delivery \
             will be rejected until PORTICO__WEBHOOKS__CALCOM_SECRET is set"
        );
    }

    // -------------------------------------------------------------------------
    // Build the tenant store and resolver
    //
    // The store is seeded with the built-in demo tenant. Resolution caches
    // use the configured lifetimes so an operator can shorten them in
    // staging without touching code.
    // -------------------------------------------------------------------------
    let seed_tenants = build_seed_tenants(&service_config.tenancy);
    info!(
        tenants = seed_tenants.len(),
        default_slug = %service_config.tenancy.default_slug,
        host_suffix = %service_config.tenancy.host_suffix,
        "Seeded in-memory tenant store"
    );

    let store = Arc::new(MemoryTenantStore::new(seed_tenants));
    let resolver_options = TenantResolverOptions::new(&service_config.tenancy.host_suffix)
        .with_positive_ttl(Duration::from_secs(
            service_config.tenancy.positive_ttl_seconds,
        ))
        .with_negative_ttl(Duration::from_secs(
            service_config.tenancy.negative_ttl_seconds,
        ));
    let resolver = Arc::new(TenantResolver::new(store, resolver_options));

    // Start the server
    if let Err(e) = start_server(service_config, resolver).await {
        error!("Failed to start server: {}", e);

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration { .. } => 3,
        };

        std::process::exit(exit_code);
    }

    Ok(())
}

/// Initialize the tracing subscriber from the logging section.
///
/// `RUST_LOG` wins over the configured level when set, so operators can
/// raise verbosity on a running deployment without editing config files.
fn init_logging(config: &ServiceConfig) {
    let default_filter = format!(
        "portico_service={level},portico_api={level},portico_core={level},tower_http=debug",
        level = config.logging.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if config.logging.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
