//! staffdesk-core: Client library for the staffdesk administration backend
//!
//! This crate provides:
//! - Durable, observable session store
//! - REST client with bearer-token injection and typed CRUD wrappers
//! - Session lifecycle (login, logout, refresh, profile fetch)
//! - Route table and navigation guard
//! - Single-slot error dialog state

pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod error_dialog;
pub mod form;
pub mod models;
pub mod resources;
pub mod router;
pub mod session;
pub mod storage;

pub use auth::{AuthService, LoginFailure};
pub use client::{ApiClient, ApiError};
pub use config::Config;
pub use context::AppContext;
pub use error_dialog::{ErrorDialog, ErrorInput, ErrorNotification};
pub use form::{FormData, Payload};
pub use resources::{ListQuery, ResourceApi};
pub use router::{Navigation, NavigationGuard};
pub use session::{Session, SessionStore, UserProfile};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

/// Default REST base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
