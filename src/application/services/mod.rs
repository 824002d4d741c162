//! Business logic services for the application layer.

pub mod auth_service;
pub mod link_service;
pub mod resolver_service;
pub mod stats_service;

pub use auth_service::{AccessClaims, AuthContext, AuthService};
pub use link_service::LinkService;
pub use resolver_service::{Resolution, ResolverService};
pub use stats_service::StatsService;
