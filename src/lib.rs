//! Legal research chat.
//!
//! An HTML-first chat front end for a legal research API. Each screen sends
//! prompts to its own endpoint and renders that endpoint's response shape as
//! document cards with a sources panel.
//!
//! # Architecture
//!
//! - **Server**: Axum routes returning full pages and HTMX fragments
//! - **Engine**: one [`ConversationEngine`](engine::ConversationEngine) per session
//! - **Research**: `reqwest` client plus a projection per response shape
//! - **UI**: server-rendered HTML and a terminal renderer over shared view models
//!
//! # Modules
//!
//! - [`conversation`]: turn list and view state reducer
//! - [`engine`]: query submission
//! - [`research`]: API client, projections and screens
//! - [`session`]: session registry
//! - [`ui`]: view models and renderers

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::implicit_hasher)]
#![allow(clippy::unused_async)]

pub mod cli;
pub mod config;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod research;
pub mod server;
pub mod session;
pub mod ui;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::research::{ResearchSettings, Screen, ScreenBinding};
use crate::session::SessionStore;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session store for conversation management.
    pub sessions: SessionStore,
    /// Backend and projection per screen.
    pub screens: Arc<HashMap<Screen, ScreenBinding>>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Bind every screen to the configured research API.
    pub fn from_config(config: Arc<AppConfig>) -> error::Result<Self> {
        let settings = ResearchSettings::from_config(&config.research)?;
        let http = reqwest::Client::new();
        let mut screens = HashMap::new();
        for screen in Screen::ALL {
            screens.insert(screen, ScreenBinding::http(screen, &settings, http.clone())?);
        }
        Ok(Self::with_screens(config, screens))
    }

    /// Build state around prepared bindings.
    pub fn with_screens(config: Arc<AppConfig>, screens: HashMap<Screen, ScreenBinding>) -> Self {
        Self {
            sessions: SessionStore::with_timeout(config.server.session_timeout()),
            screens: Arc::new(screens),
            config,
        }
    }

    pub fn binding(&self, screen: Screen) -> Option<&ScreenBinding> {
        self.screens.get(&screen)
    }
}
