//! Application state and logic

use std::sync::Arc;

use serde_json::Value;
use staffdesk_core::router::{self, Navigation, ResourceKind, Route, ROUTES, SIGN_IN_PATH};
use staffdesk_core::{ApiError, AppContext, ListQuery, Session};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Application result for main loop
pub enum AppResult {
    Continue,
    Quit,
}

/// Status message severity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignInField {
    #[default]
    Email,
    Password,
}

/// Sign-in form contents
#[derive(Debug, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    pub focus: SignInField,
}

impl SignInForm {
    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            SignInField::Email => &mut self.email,
            SignInField::Password => &mut self.password,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            SignInField::Email => SignInField::Password,
            SignInField::Password => SignInField::Email,
        };
    }
}

/// Main application struct
pub struct App {
    pub ctx: Arc<AppContext>,

    /// Current location after guarding
    pub path: String,
    pub route: Option<&'static Route>,

    /// Routes offered in the sidebar
    pub menu: Vec<&'static Route>,
    pub cursor: usize,

    /// One summary line per listed record
    pub rows: Vec<String>,

    pub form: SignInForm,
    pub status_message: Option<(String, StatusLevel)>,

    session_rx: watch::Receiver<Session>,
    login_task: Option<JoinHandle<bool>>,
}

impl App {
    pub fn new(ctx: AppContext) -> Self {
        let session_rx = ctx.session.subscribe();
        let menu = ROUTES
            .iter()
            .filter(|r| !r.public && !r.path.contains(':') && !r.path.ends_with("/create"))
            .collect();

        let mut app = Self {
            ctx: Arc::new(ctx),
            path: String::new(),
            route: None,
            menu,
            cursor: 0,
            rows: Vec::new(),
            form: SignInForm::default(),
            status_message: None,
            session_rx,
            login_task: None,
        };

        app.navigate("/");
        app
    }

    pub fn on_sign_in(&self) -> bool {
        self.path == SIGN_IN_PATH
    }

    /// True while a login request is in flight
    pub fn signing_in(&self) -> bool {
        self.login_task.is_some() || self.ctx.auth.is_loading()
    }

    /// Guarded navigation
    pub fn navigate(&mut self, to: &str) {
        let target = match self.ctx.navigate(to) {
            Navigation::Allow(path) => path,
            Navigation::Redirect(path) => {
                tracing::debug!("Navigation to {} redirected to {}", to, path);
                path
            }
        };

        if target != self.path {
            self.rows.clear();
        }
        self.route = router::resolve(&target);
        self.path = target;
    }

    /// Follow session changes and finish background work
    pub async fn tick(&mut self) {
        if self.session_rx.has_changed().unwrap_or(false) {
            let authenticated = self.session_rx.borrow_and_update().is_authenticated();
            if !authenticated && !self.on_sign_in() {
                self.set_status("Session ended, please sign in again", StatusLevel::Warning);
                let current = self.path.clone();
                self.navigate(&current);
            }
        }

        let finished = self
            .login_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if finished {
            if let Some(task) = self.login_task.take() {
                match task.await {
                    Ok(true) => {
                        self.form.password.clear();
                        self.clear_status();
                        self.navigate("/");
                    }
                    Ok(false) => {}
                    Err(e) => tracing::error!("Login task failed: {}", e),
                }
            }
        }
    }

    /// Submit the sign-in form in the background
    pub fn submit_login(&mut self) {
        if self.signing_in() {
            return;
        }
        if self.form.email.trim().is_empty() || self.form.password.is_empty() {
            self.set_status("Email and password are required", StatusLevel::Warning);
            return;
        }

        let ctx = Arc::clone(&self.ctx);
        let email = self.form.email.trim().to_string();
        let password = self.form.password.clone();
        self.login_task = Some(tokio::spawn(async move {
            ctx.auth.login(&email, &password).await
        }));
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.menu.len() {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Open the route under the cursor
    pub async fn open_selected(&mut self) {
        let Some(route) = self.menu.get(self.cursor).copied() else {
            return;
        };
        self.navigate(route.path);
        self.reload().await;
    }

    /// Re-list the current route's collection
    pub async fn reload(&mut self) {
        let Some(kind) = self.route.and_then(|r| r.resource) else {
            self.rows.clear();
            return;
        };

        match self.fetch(kind).await {
            Ok(body) => {
                self.rows = summarize(&body);
                self.set_status(format!("{} record(s)", self.rows.len()), StatusLevel::Info);
            }
            Err(e) if e.is_unauthorized() => {
                self.set_status("Token rejected, refreshing", StatusLevel::Warning);
                self.ctx.auth.refresh().await;
            }
            Err(e) => {
                self.set_status(e.to_string(), StatusLevel::Error);
            }
        }
    }

    pub async fn refresh_token(&mut self) {
        self.ctx.auth.refresh().await;
        if self.ctx.auth.is_authenticated() {
            self.set_status("Token refreshed", StatusLevel::Success);
        }
    }

    pub async fn reload_profile(&mut self) {
        match self.ctx.auth.fetch_me().await {
            Some(user) => self.set_status(format!("Signed in as {}", user.name), StatusLevel::Success),
            None => self.set_status("Could not load profile", StatusLevel::Warning),
        }
    }

    pub async fn logout(&mut self, all_devices: bool) {
        self.ctx.auth.logout(all_devices).await;
        self.navigate(SIGN_IN_PATH);
        self.set_status(
            if all_devices {
                "Logged out of all devices"
            } else {
                "Logged out"
            },
            StatusLevel::Info,
        );
    }

    /// Set status message
    pub fn set_status(&mut self, message: impl Into<String>, level: StatusLevel) {
        self.status_message = Some((message.into(), level));
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    async fn fetch(&self, kind: ResourceKind) -> Result<Value, ApiError> {
        let api = &self.ctx.api;
        let query = ListQuery::new();
        match kind {
            ResourceKind::Employees => api.employees().list(&query).await,
            ResourceKind::Clients => api.clients().list(&query).await,
            ResourceKind::PicExternals => api.pic_externals().list(&query).await,
            ResourceKind::Placements => api.placements().list(&query).await,
            ResourceKind::ContractClients => api.contract_clients().list(&query).await,
            ResourceKind::Invoices => api.invoices().list(&query).await,
        }
    }
}

/// Fields tried, in order, when labelling a record
const LABEL_KEYS: &[&str] = &["full_name", "name", "invoice_number", "nip", "project_type"];

/// One line per record. Accepts a bare array or a `{ "data": [...] }` envelope.
pub fn summarize(body: &Value) -> Vec<String> {
    let items = match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => std::slice::from_ref(body),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .map(|item| {
            let label = LABEL_KEYS
                .iter()
                .find_map(|k| item.get(*k).and_then(Value::as_str))
                .unwrap_or("(unnamed)");
            match item.get("uuid").and_then(Value::as_str) {
                Some(id) => format!("{:<40} {}", label, id),
                None => label.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use staffdesk_core::{Config, MemoryStore};

    fn app() -> App {
        let ctx = AppContext::with_storage(Config::default(), Arc::new(MemoryStore::new())).unwrap();
        App::new(ctx)
    }

    #[test]
    fn test_starts_on_sign_in_without_token() {
        let app = app();
        assert!(app.on_sign_in());
        assert_eq!(app.route.unwrap().name, "signin");
    }

    #[test]
    fn test_menu_skips_public_and_form_routes() {
        let app = app();
        let names: Vec<_> = app.menu.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "dashboard",
                "employees",
                "clients",
                "pic-externals",
                "placements",
                "contract-clients",
                "invoices"
            ]
        );
    }

    #[tokio::test]
    async fn test_returns_to_sign_in_when_session_ends() {
        let mut app = app();
        app.ctx.session.set_token("T".to_string()).unwrap();
        app.navigate("/clients");
        assert_eq!(app.path, "/clients");

        app.ctx.session.clear_session().unwrap();
        app.tick().await;

        assert!(app.on_sign_in());
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Warning);
    }

    #[test]
    fn test_submit_requires_fields() {
        let mut app = app();
        app.submit_login();
        assert!(!app.signing_in());
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_summarize_shapes() {
        let envelope = json!({"data": [
            {"uuid": "e-1", "full_name": "Siti"},
            {"invoice_number": "INV/1"}
        ]});
        let rows = summarize(&envelope);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("Siti"));
        assert!(rows[0].ends_with("e-1"));
        assert_eq!(rows[1], "INV/1");

        assert_eq!(summarize(&json!([{"name": "PT Maju"}])), vec!["PT Maju"]);
        assert_eq!(summarize(&json!({"name": "solo"})), vec!["solo"]);
        assert!(summarize(&json!(null)).is_empty());
    }
}
