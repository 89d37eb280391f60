//! # Portico Core
//!
//! Core business logic for the Portico multi-tenant booking-portal backend.
//!
//! This crate contains the domain logic for mapping inbound hostnames to
//! tenants, caching resolution results, and authenticating third-party
//! booking webhooks before their payloads are interpreted.
//!
//! ## Architecture
//!
//! The core follows clean architecture principles:
//! - Business logic depends only on trait abstractions
//! - Storage implementations are injected at runtime
//! - The HTTP layer lives in a separate crate and consumes this one
//!
//! ## Usage
//!
//! ```rust
//! use portico_core::{TenantResolver, TenantResolverOptions};
//! use portico_core::store::MemoryTenantStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryTenantStore::new(vec![]));
//! let resolver = TenantResolver::new(store, TenantResolverOptions::new("example.com"));
//! ```

pub mod cache;
pub mod resolver;
pub mod store;
pub mod tenant;
pub mod webhook;

pub use cache::TtlCache;
pub use resolver::{TenantResolver, TenantResolverOptions};
pub use store::{MemoryTenantStore, StoreError, TenantStore};
pub use tenant::{TenantId, TenantPublic, TenantRecord};

// Re-export commonly used types
pub use uuid::Uuid;
