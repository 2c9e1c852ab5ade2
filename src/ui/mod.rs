//! Server-rendered HTML.
//!
//! Pages are plain HTML strings enhanced with HTMX attributes: forms post
//! normally, and when HTMX is loaded the server answers with the fragment
//! to swap instead of a redirect.
//!
//! # Structure
//!
//! - [`page`]: page shells and the full chat page
//! - [`sidebar`]: upload form, document cards, restart button
//! - [`chat`]: header ribbon, transcript bubbles, question input

pub mod chat;
pub mod page;
pub mod sidebar;

pub use page::{ChatPage, about_page, html_shell};
