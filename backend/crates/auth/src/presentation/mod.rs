//! Presentation Layer
//!
//! HTTP handlers, DTOs, extractors, router, and middleware.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use extract::{ClientIp, LenientJson};
pub use handlers::AuthAppState;
pub use middleware::{AuthenticatedUser, require_bearer_token};
pub use router::auth_router;
