//! MHDQA GUI
//!
//! A server-rendered chat front end for multi-hop document question
//! answering. Visitors upload documents in a sidebar and ask questions in a
//! chat transcript; answers come from a pluggable [`ResponseGenerator`].
//!
//! # Architecture
//!
//! - **Server**: Axum routes, one request per UI turn
//! - **Sessions**: isolated, in-memory transcript state driven by named UI events
//! - **Documents**: upload validation and sidebar listing (no parsing)
//! - **UI**: HTML rendered on the server, enhanced with HTMX
//!
//! # Modules
//!
//! - [`session`]: transcript state, UI events and the session store
//! - [`documents`]: uploaded file records and upload policy
//! - [`responder`]: response generation seam
//! - [`assets`]: logo and style file loading
//! - [`ui`]: HTML rendering
//! - [`server`]: router and handlers
//! - [`config`]: layered configuration
//! - [`error`]: error taxonomy

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod assets;
pub mod config;
pub mod documents;
pub mod error;
pub mod responder;
pub mod server;
pub mod session;
pub mod ui;

use std::sync::Arc;

use crate::assets::StaticAssets;
use crate::config::AppConfig;
use crate::documents::UploadPolicy;
use crate::responder::ResponseGenerator;
use crate::session::SessionStore;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Session store for per-visitor transcripts.
    pub sessions: SessionStore,
    /// Produces assistant answers.
    pub generator: Arc<dyn ResponseGenerator>,
    /// Logo and style file, loaded once.
    pub assets: Arc<StaticAssets>,
    /// Limits for incoming uploads.
    pub upload_policy: UploadPolicy,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state from configuration, loading static assets from disk.
    #[must_use]
    pub fn new(config: Arc<AppConfig>, generator: Arc<dyn ResponseGenerator>) -> Self {
        let assets = Arc::new(StaticAssets::load(&config.assets));
        Self {
            sessions: SessionStore::with_timeout(config.session.timeout()),
            generator,
            assets,
            upload_policy: config.uploads.policy(),
            config,
        }
    }
}
