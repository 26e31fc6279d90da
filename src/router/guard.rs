//! Pre-navigation access check. The guard is a pure function of the target route
//! and a session snapshot; it reads cached state only and never mutates it.
//! UX-only: the backend still enforces every permission.

use super::routes::{Route, RouteName, by_name};
use crate::session::SessionSnapshot;
use serde::Serialize;
use url::form_urlencoded;

/// Query parameter carrying the page to return to after login.
pub const RETURN_PARAM: &str = "redirect";

/// Pages a logged-in user is bounced away from.
const LOGGED_OUT_ONLY: [RouteName; 3] = [
    RouteName::Login,
    RouteName::Register,
    RouteName::ForgotPassword,
];

#[derive(Debug, Clone, Copy)]
pub struct NavigationRequest<'a> {
    pub target: &'a Route,
    /// Requested path including any query string.
    pub full_path: &'a str,
    pub current: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub name: RouteName,
    pub query: Vec<(String, String)>,
}

impl Redirect {
    #[must_use]
    pub fn to(name: RouteName) -> Self {
        Self {
            name,
            query: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Path plus encoded query, e.g. `/login?redirect=%2Fuser`.
    #[must_use]
    pub fn location(&self) -> String {
        let path = by_name(self.name).path;
        if self.query.is_empty() {
            return path.to_string();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{path}?{query}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Decision {
    Proceed,
    Redirect(Redirect),
}

/// Decides whether `request` may proceed. Auth requirements are checked before
/// the logged-in bounce, so an admin opening `/login` lands on Home.
#[must_use]
pub fn evaluate(request: &NavigationRequest<'_>, session: SessionSnapshot) -> Decision {
    let target = request.target;

    if target.requires_auth() {
        if !session.logged_in {
            return Decision::Redirect(
                Redirect::to(RouteName::Login).with_query(RETURN_PARAM, request.full_path),
            );
        }
        if target.requires_admin() && !session.admin {
            return Decision::Redirect(Redirect::to(RouteName::Home));
        }
    }

    if session.logged_in && LOGGED_OUT_ONLY.contains(&target.name) {
        return Decision::Redirect(Redirect::to(RouteName::Home));
    }

    Decision::Proceed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::routes::{ROUTES, resolve};

    const LOGGED_OUT: SessionSnapshot = SessionSnapshot {
        logged_in: false,
        admin: false,
    };
    const MEMBER: SessionSnapshot = SessionSnapshot {
        logged_in: true,
        admin: false,
    };
    const ADMIN: SessionSnapshot = SessionSnapshot {
        logged_in: true,
        admin: true,
    };

    fn decide(path: &str, session: SessionSnapshot) -> Decision {
        let target = resolve(path).expect("known route");
        evaluate(
            &NavigationRequest {
                target,
                full_path: path,
                current: None,
            },
            session,
        )
    }

    #[test]
    fn anonymous_user_page_redirects_to_login_with_return_path() {
        let Decision::Redirect(redirect) = decide("/user", LOGGED_OUT) else {
            panic!("expected redirect");
        };
        assert_eq!(redirect.name, RouteName::Login);
        assert_eq!(redirect.query_value(RETURN_PARAM), Some("/user"));
        assert_eq!(redirect.location(), "/login?redirect=%2Fuser");
    }

    #[test]
    fn member_admin_page_redirects_home() {
        assert_eq!(
            decide("/admin", MEMBER),
            Decision::Redirect(Redirect::to(RouteName::Home))
        );
    }

    #[test]
    fn admin_admin_page_proceeds() {
        assert_eq!(decide("/admin", ADMIN), Decision::Proceed);
    }

    #[test]
    fn logged_in_login_page_redirects_home() {
        assert_eq!(
            decide("/login", MEMBER),
            Decision::Redirect(Redirect::to(RouteName::Home))
        );
        assert_eq!(
            decide("/login", ADMIN),
            Decision::Redirect(Redirect::to(RouteName::Home))
        );
    }

    #[test]
    fn logged_in_register_and_recovery_redirect_home() {
        for path in ["/register", "/forgot-password"] {
            assert_eq!(
                decide(path, MEMBER),
                Decision::Redirect(Redirect::to(RouteName::Home)),
                "{path}"
            );
        }
    }

    #[test]
    fn return_path_keeps_query_string() {
        let Decision::Redirect(redirect) = decide("/delete-account?step=2", LOGGED_OUT) else {
            panic!("expected redirect");
        };
        assert_eq!(redirect.query_value(RETURN_PARAM), Some("/delete-account?step=2"));
    }

    #[test]
    fn public_routes_always_proceed_except_logged_out_pages() {
        for route in ROUTES.iter().filter(|route| !route.requires_auth()) {
            for session in [LOGGED_OUT, MEMBER, ADMIN] {
                let decision = decide(route.path, session);
                if session.logged_in && LOGGED_OUT_ONLY.contains(&route.name) {
                    assert_eq!(decision, Decision::Redirect(Redirect::to(RouteName::Home)));
                } else {
                    assert_eq!(decision, Decision::Proceed, "{} {session:?}", route.path);
                }
            }
        }
    }

    #[test]
    fn protected_routes_without_token_always_go_to_login() {
        for route in ROUTES.iter().filter(|route| route.requires_auth()) {
            // A stale admin flag must not matter without a token.
            for session in [LOGGED_OUT, SessionSnapshot { logged_in: false, admin: true }] {
                let Decision::Redirect(redirect) = decide(route.path, session) else {
                    panic!("{} should redirect", route.path);
                };
                assert_eq!(redirect.name, RouteName::Login);
                assert_eq!(redirect.query_value(RETURN_PARAM), Some(route.path));
            }
        }
    }

    #[test]
    fn admin_routes_for_members_never_go_to_login() {
        for route in ROUTES.iter().filter(|route| route.requires_admin()) {
            assert_eq!(
                decide(route.path, MEMBER),
                Decision::Redirect(Redirect::to(RouteName::Home))
            );
        }
    }

    #[test]
    fn evaluation_is_idempotent() {
        for route in ROUTES {
            for session in [LOGGED_OUT, MEMBER, ADMIN] {
                assert_eq!(decide(route.path, session), decide(route.path, session));
            }
        }
    }
}
