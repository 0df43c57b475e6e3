//! Route table and navigation guard
//!
//! The guard only checks token presence. Expired tokens are caught by the
//! backend on the next API call.

use std::collections::HashSet;

pub const SIGN_IN_PATH: &str = "/signin";

/// Collection a route lists, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Employees,
    Clients,
    PicExternals,
    Placements,
    ContractClients,
    Invoices,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crumb {
    pub text: &'static str,
    pub to: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Path pattern; `:name` segments match any value
    pub path: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub breadcrumb: &'static [Crumb],
    pub resource: Option<ResourceKind>,
    pub public: bool,
}

const fn page(
    path: &'static str,
    name: &'static str,
    title: &'static str,
    breadcrumb: &'static [Crumb],
    resource: Option<ResourceKind>,
) -> Route {
    Route {
        path,
        name,
        title,
        breadcrumb,
        resource,
        public: false,
    }
}

pub static ROUTES: &[Route] = &[
    Route {
        path: SIGN_IN_PATH,
        name: "signin",
        title: "Sign In",
        breadcrumb: &[],
        resource: None,
        public: true,
    },
    page("/", "dashboard", "Dashboard", &[], None),
    page(
        "/employees",
        "employees",
        "Employees",
        &[Crumb { text: "Employees", to: "/employees" }],
        Some(ResourceKind::Employees),
    ),
    page(
        "/employees/create",
        "employees-create",
        "Tambah Karyawan",
        &[
            Crumb { text: "Employees", to: "/employees" },
            Crumb { text: "Tambah Karyawan", to: "/employees/create" },
        ],
        None,
    ),
    page(
        "/employees/:id/edit",
        "employees-edit",
        "Edit Karyawan",
        &[
            Crumb { text: "Employees", to: "/employees" },
            Crumb { text: "Edit Karyawan", to: "" },
        ],
        None,
    ),
    page(
        "/clients",
        "clients",
        "Clients",
        &[Crumb { text: "Clients", to: "/clients" }],
        Some(ResourceKind::Clients),
    ),
    page(
        "/pic-externals",
        "pic-externals",
        "PIC Externals",
        &[Crumb { text: "PIC Externals", to: "/pic-externals" }],
        Some(ResourceKind::PicExternals),
    ),
    page(
        "/placements",
        "placements",
        "Placements",
        &[Crumb { text: "Placements", to: "/placements" }],
        Some(ResourceKind::Placements),
    ),
    page(
        "/contract-clients",
        "contract-clients",
        "Contract Clients",
        &[Crumb { text: "Contract Clients", to: "/contract-clients" }],
        Some(ResourceKind::ContractClients),
    ),
    page(
        "/invoices",
        "invoices",
        "Invoices",
        &[Crumb { text: "Invoices", to: "/invoices" }],
        Some(ResourceKind::Invoices),
    ),
];

impl Route {
    fn matches(&self, path: &str) -> bool {
        let mut pattern = self.path.split('/');
        let mut actual = path.split('/');
        loop {
            match (pattern.next(), actual.next()) {
                (None, None) => return true,
                (Some(p), Some(a)) if p.starts_with(':') && !a.is_empty() => {}
                (Some(p), Some(a)) if p == a => {}
                _ => return false,
            }
        }
    }
}

/// Find the route record for a concrete path
pub fn resolve(path: &str) -> Option<&'static Route> {
    let path = normalize(path);
    ROUTES.iter().find(|r| r.matches(&path))
}

/// Outcome of a guarded navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow(String),
    Redirect(String),
}

impl Navigation {
    /// Where the navigation ends up
    pub fn target(&self) -> &str {
        match self {
            Self::Allow(path) | Self::Redirect(path) => path,
        }
    }
}

/// Redirects unauthenticated navigation away from protected paths
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    public: HashSet<String>,
    sign_in: String,
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self::from_routes(ROUTES)
    }
}

impl NavigationGuard {
    /// Public paths are taken from routes flagged `public`; the sign-in
    /// path is always public.
    pub fn from_routes(routes: &[Route]) -> Self {
        let mut public: HashSet<String> = routes
            .iter()
            .filter(|r| r.public)
            .map(|r| r.path.to_string())
            .collect();
        public.insert(SIGN_IN_PATH.to_string());

        Self {
            public,
            sign_in: SIGN_IN_PATH.to_string(),
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public.contains(&normalize(path))
    }

    /// Decide a navigation to `to`. `has_token` is the session store's
    /// presence check.
    pub fn check(&self, to: &str, has_token: bool) -> Navigation {
        if !has_token && !self.is_public(to) {
            tracing::debug!("Redirecting {} to {}", to, self.sign_in);
            return Navigation::Redirect(self.sign_in.clone());
        }
        Navigation::Allow(to.to_string())
    }
}

/// Path part only: query and fragment dropped, no trailing slash,
/// leading slash added
fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
