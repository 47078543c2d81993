//! Business logic services for the application layer.

pub mod auth_service;
pub mod link_service;
pub mod tag_service;

pub use auth_service::{AuthService, AuthenticatedOwner};
pub use link_service::LinkService;
pub use tag_service::TagService;
