//! PostgreSQL repository implementations.
//!
//! Concrete implementations of the domain repository traits using SQLx with
//! runtime-bound parameters.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage, resolution, and filtered listing
//! - [`PgTagRepository`] - Tags and link-tag associations
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_link_repository;
pub mod pg_tag_repository;
pub mod pg_token_repository;

pub use pg_link_repository::PgLinkRepository;
pub use pg_tag_repository::PgTagRepository;
pub use pg_token_repository::PgTokenRepository;
