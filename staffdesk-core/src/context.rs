//! Root context wiring one instance of each component
//!
//! Built once at startup and passed by reference; nothing in the crate
//! reaches for global state.

use std::sync::Arc;

use thiserror::Error;

use crate::auth::AuthService;
use crate::client::{ApiClient, ApiError};
use crate::config::{Config, ConfigError};
use crate::error_dialog::ErrorDialog;
use crate::router::{Navigation, NavigationGuard};
use crate::session::SessionStore;
use crate::storage::{FileStore, KeyValueStore, StorageError};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct AppContext {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub errors: Arc<ErrorDialog>,
    pub api: ApiClient,
    pub auth: AuthService,
    pub guard: NavigationGuard,
}

impl AppContext {
    /// Open the configured session file and build everything on top of it
    pub fn new(config: Config) -> Result<Self, ContextError> {
        let path = config.session_path()?;
        tracing::debug!("Session file: {}", path.display());
        let storage = FileStore::open(path)?;
        Self::with_storage(config, Arc::new(storage))
    }

    /// Build over an arbitrary store
    pub fn with_storage(config: Config, storage: Arc<dyn KeyValueStore>) -> Result<Self, ContextError> {
        let session = Arc::new(SessionStore::hydrate(storage));
        let errors = Arc::new(ErrorDialog::new());
        let api = ApiClient::new(&config.api, Arc::clone(&session))?;
        let auth = AuthService::new(api.clone(), Arc::clone(&errors));

        tracing::info!("API base URL: {}", api.base_url());

        Ok(Self {
            config,
            session,
            errors,
            api,
            auth,
            guard: NavigationGuard::default(),
        })
    }

    /// Run the guard against the live session
    pub fn navigate(&self, to: &str) -> Navigation {
        self.guard.check(to, self.session.is_authenticated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::SIGN_IN_PATH;
    use crate::session::TOKEN_KEY;
    use crate::storage::MemoryStore;

    #[test]
    fn test_navigation_follows_session() {
        let ctx = AppContext::with_storage(Config::default(), Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(ctx.navigate("/clients"), Navigation::Redirect(SIGN_IN_PATH.to_string()));

        ctx.session.set_token("T".to_string()).unwrap();
        assert_eq!(ctx.navigate("/clients"), Navigation::Allow("/clients".to_string()));
    }

    #[test]
    fn test_hydrates_from_storage() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(TOKEN_KEY, "persisted").unwrap();

        let ctx = AppContext::with_storage(Config::default(), storage).unwrap();
        assert!(ctx.auth.is_authenticated());
        assert_eq!(ctx.navigate("/"), Navigation::Allow("/".to_string()));
    }

    #[test]
    fn test_file_backed_context() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = Some(dir.path().join("session.json"));

        let ctx = AppContext::new(config.clone()).unwrap();
        ctx.session.set_token("T".to_string()).unwrap();
        drop(ctx);

        let ctx = AppContext::new(config).unwrap();
        assert_eq!(ctx.session.token().as_deref(), Some("T"));
    }
}
