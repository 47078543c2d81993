//! Repository traits decoupling business logic from persistence.

pub mod link_repository;
pub mod tag_repository;
pub mod token_repository;

pub use link_repository::{LinkFilter, LinkRepository, StatusFilter};
pub use tag_repository::TagRepository;
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use tag_repository::MockTagRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
