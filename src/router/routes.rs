use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RouteName {
    Home,
    Login,
    Register,
    User,
    Admin,
    ForgotPassword,
    DeleteAccount,
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouteName::Home => "Home",
            RouteName::Login => "Login",
            RouteName::Register => "Register",
            RouteName::User => "User",
            RouteName::Admin => "Admin",
            RouteName::ForgotPassword => "ForgotPassword",
            RouteName::DeleteAccount => "DeleteAccount",
        };
        f.write_str(name)
    }
}

/// Static page descriptor. Admin pages are always authenticated pages; the
/// constructors are the only way to build one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: &'static str,
    pub name: RouteName,
    requires_auth: bool,
    requires_admin: bool,
}

impl Route {
    #[must_use]
    pub const fn public(path: &'static str, name: RouteName) -> Self {
        Self {
            path,
            name,
            requires_auth: false,
            requires_admin: false,
        }
    }

    #[must_use]
    pub const fn authenticated(path: &'static str, name: RouteName) -> Self {
        Self {
            path,
            name,
            requires_auth: true,
            requires_admin: false,
        }
    }

    #[must_use]
    pub const fn admin(path: &'static str, name: RouteName) -> Self {
        Self {
            path,
            name,
            requires_auth: true,
            requires_admin: true,
        }
    }

    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    #[must_use]
    pub const fn requires_admin(&self) -> bool {
        self.requires_admin
    }
}

pub static ROUTES: &[Route] = &[
    Route::public("/", RouteName::Home),
    Route::public("/login", RouteName::Login),
    Route::public("/register", RouteName::Register),
    Route::authenticated("/user", RouteName::User),
    Route::admin("/admin", RouteName::Admin),
    Route::public("/forgot-password", RouteName::ForgotPassword),
    Route::authenticated("/delete-account", RouteName::DeleteAccount),
];

/// Strips the query string and fragment from a full path.
#[must_use]
pub fn path_only(full_path: &str) -> &str {
    let end = full_path.find(['?', '#']).unwrap_or(full_path.len());
    &full_path[..end]
}

/// Finds the route for a full path such as `/user?tab=1`.
#[must_use]
pub fn resolve(full_path: &str) -> Option<&'static Route> {
    let path = path_only(full_path.trim());
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };
    let path = if path.is_empty() { "/" } else { path };

    ROUTES.iter().find(|route| route.path == path)
}

#[must_use]
pub fn by_name(name: RouteName) -> &'static Route {
    // Every RouteName has exactly one entry in ROUTES.
    ROUTES
        .iter()
        .find(|route| route.name == name)
        .unwrap_or(&ROUTES[0])
}
