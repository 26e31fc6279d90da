//! # Guducat (account client)
//!
//! `guducat` talks to the Guducat user service: login, registration, profile
//! management, password recovery and account deletion. Two pieces carry the
//! access-control logic:
//!
//! ## Navigation Guard
//!
//! Every page is a [`router::Route`] with `requires_auth` / `requires_admin`
//! flags. Before a page is entered, [`router::guard::evaluate`] inspects the cached
//! [`session::Session`] and either lets the navigation proceed or replaces it with
//! a redirect:
//!
//! 1. **Protected page, no token:** redirect to `/login?redirect=<requested path>`.
//! 2. **Admin page, not an admin:** redirect to `/`.
//! 3. **Logged in, visiting login/register/forgot-password:** redirect to `/`.
//!
//! The guard never performs I/O and treats unreadable session data as logged out.
//!
//! ## API Client
//!
//! [`api::ApiClient`] attaches the session token as the `satoken` header, unwraps
//! the backend's result envelope, and watches error responses for the backend's
//! "not logged in" signature. When the signature shows up, the session is cleared,
//! the view is replaced with the login page and the call returns
//! [`api::Reply::Suppressed`] so callers stop handling it.
//!
//! The session token is an opaque credential. It is never logged.

pub mod account;
pub mod api;
pub mod cli;
pub mod router;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
