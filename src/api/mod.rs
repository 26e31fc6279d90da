//! Client for the Guducat user service.
//!
//! All endpoints are `GET` requests with query parameters, authenticated by the
//! `satoken` header. Most answers come wrapped in an [`types::Envelope`]; the
//! `isAdmin`/`isLogin` status endpoints answer with plain text and the admin user
//! endpoints with bare JSON.

pub mod client;
pub mod config;
pub mod error;
pub mod expiry;
pub mod reply;
pub mod types;

pub use self::client::{ApiClient, TOKEN_HEADER};
pub use self::config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use self::error::ApiError;
pub use self::reply::Reply;
pub use self::types::{
    PasswordReset, ProfileUpdate, RegisterForm, ResetGrant, TokenInfo, User, parse_flag,
};
