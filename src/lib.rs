//! Job search URL builder.
//!
//! Maps a structured [`FilterState`] to a LinkedIn job search URL, and uses a
//! hosted language model to fill filters from free text, write the boolean
//! keyword query, and suggest extra keywords.

pub mod cli;
pub mod config;
pub mod gateway;
pub mod session;
pub mod types;
pub mod url_builder;
pub mod web;

pub use gateway::{GatewayError, PromptGateway};
pub use session::{Action, RequestState, SearchSession, SessionError, SessionStore};
pub use types::{FilterState, SavedSearch};
pub use url_builder::{build_search_url, parse_search_url, ParsedSearch};
