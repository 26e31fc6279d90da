//! Page routing: the static route table, the pre-navigation guard, and a small
//! router that applies guard decisions and remembers where the user is.

pub mod guard;
pub mod routes;

pub use self::guard::{Decision, NavigationRequest, Redirect, RETURN_PARAM, evaluate};
pub use self::routes::{ROUTES, Route, RouteName, by_name, resolve};

use crate::session::Session;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// A chain longer than this means two redirects point at each other.
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("no page at {0}")]
    NotFound(String),
    #[error("redirect loop while navigating to {0}")]
    RedirectLoop(String),
}

/// Receives forced navigations, e.g. the API client's logout redirect.
pub trait Navigator: Send + Sync {
    fn replace(&self, redirect: Redirect);
}

/// Result of a completed navigation.
#[derive(Debug, Clone, Serialize)]
pub struct Navigation {
    pub route: &'static Route,
    pub location: String,
    pub redirects: Vec<Redirect>,
}

impl Navigation {
    /// True when the guard let the requested page through untouched.
    #[must_use]
    pub fn proceeded(&self) -> bool {
        self.redirects.is_empty()
    }
}

#[derive(Debug)]
pub struct Router {
    session: Session,
    current: Mutex<Option<String>>,
}

impl Router {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            current: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Location of the last completed navigation.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Navigates to `full_path`, following guard redirects. The guard is
    /// re-evaluated against the session on every hop.
    ///
    /// # Errors
    /// Returns `RouterError::NotFound` for unknown paths and
    /// `RouterError::RedirectLoop` if redirects never settle.
    pub fn navigate(&self, full_path: &str) -> Result<Navigation, RouterError> {
        self.follow(full_path, |request| {
            evaluate(request, self.session.snapshot())
        })
    }

    /// Applies `decide` hop by hop until a page proceeds or the hop bound runs out.
    fn follow<F>(&self, full_path: &str, mut decide: F) -> Result<Navigation, RouterError>
    where
        F: FnMut(&NavigationRequest<'_>) -> Decision,
    {
        let mut location = full_path.trim().to_string();
        let mut redirects = Vec::new();
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        for _ in 0..=MAX_REDIRECTS {
            let route = resolve(&location).ok_or_else(|| RouterError::NotFound(location.clone()))?;
            let request = NavigationRequest {
                target: route,
                full_path: &location,
                current: current.as_deref(),
            };

            match decide(&request) {
                Decision::Proceed => {
                    debug!("navigated to {location}");
                    *current = Some(location.clone());
                    return Ok(Navigation {
                        route,
                        location,
                        redirects,
                    });
                }
                Decision::Redirect(redirect) => {
                    info!("{} redirected to {}", location, redirect.name);
                    location = redirect.location();
                    redirects.push(redirect);
                }
            }
        }

        Err(RouterError::RedirectLoop(full_path.to_string()))
    }
}

impl Navigator for Router {
    fn replace(&self, redirect: Redirect) {
        if let Err(err) = self.navigate(&redirect.location()) {
            warn!("forced navigation failed: {err}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_user_lands_on_login() {
        let router = Router::new(Session::in_memory());

        let navigation = router.navigate("/user").unwrap();

        assert_eq!(navigation.route.name, RouteName::Login);
        assert_eq!(navigation.location, "/login?redirect=%2Fuser");
        assert_eq!(navigation.redirects.len(), 1);
        assert_eq!(router.current().as_deref(), Some("/login?redirect=%2Fuser"));
    }

    #[test]
    fn logged_in_user_reaches_profile() {
        let session = Session::in_memory();
        session.establish("abc").unwrap();
        let router = Router::new(session);

        let navigation = router.navigate("/user").unwrap();

        assert!(navigation.proceeded());
        assert_eq!(navigation.route.name, RouteName::User);
    }

    #[test]
    fn member_on_admin_lands_home() {
        let session = Session::in_memory();
        session.establish("abc").unwrap();
        let router = Router::new(session);

        let navigation = router.navigate("/admin").unwrap();

        assert_eq!(navigation.route.name, RouteName::Home);
        assert_eq!(navigation.location, "/");
    }

    #[test]
    fn unknown_path_is_not_found() {
        let router = Router::new(Session::in_memory());
        assert_eq!(
            router.navigate("/missing").unwrap_err(),
            RouterError::NotFound("/missing".to_string())
        );
        assert!(router.current().is_none());
    }

    #[test]
    fn endless_redirects_are_a_loop() {
        let router = Router::new(Session::in_memory());
        router.navigate("/").unwrap();

        let mut hops = 0;
        let result = router.follow("/register", |_| {
            hops += 1;
            Decision::Redirect(Redirect::to(RouteName::Login))
        });

        assert_eq!(result.unwrap_err(), RouterError::RedirectLoop("/register".to_string()));
        assert_eq!(hops, MAX_REDIRECTS + 1);
        // A failed navigation leaves the user where they were.
        assert_eq!(router.current().as_deref(), Some("/"));
    }

    #[test]
    fn replace_goes_through_the_guard() {
        let session = Session::in_memory();
        session.establish("abc").unwrap();
        let router = Router::new(session);

        // Still logged in, so the login page bounces home.
        router.replace(Redirect::to(RouteName::Login));
        assert_eq!(router.current().as_deref(), Some("/"));

        router.session().clear().unwrap();
        router.replace(Redirect::to(RouteName::Login));
        assert_eq!(router.current().as_deref(), Some("/login"));
    }
}
