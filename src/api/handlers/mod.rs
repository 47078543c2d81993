//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod links;
pub mod redirect;
pub mod tags;

pub use health::health_handler;
pub use links::{
    create_link_handler, delete_link_handler, get_link_handler, list_links_handler,
    update_link_handler,
};
pub use redirect::redirect_handler;
pub use tags::{
    attach_tags_handler, create_tag_handler, delete_tag_handler, detach_tags_handler,
    list_tags_handler, rename_tag_handler,
};
