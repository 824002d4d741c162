//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! cache side effects and validation. Services consume repository traits and
//! provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::resolver_service::ResolverService`] - Cache-aside redirect resolution
//! - [`services::link_service::LinkService`] - Short link creation, listing and deactivation
//! - [`services::auth_service::AuthService`] - Access token verification

pub mod services;
