//! Wire types for the user service. The backend wraps most answers in an
//! envelope (`code`, `msg`, `data`) and expects every input as a query parameter.

use super::ApiError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::fmt;

/// Envelope code for a successful call.
pub const CODE_OK: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T: DeserializeOwned> Envelope<T> {
    fn check(&self) -> Result<(), ApiError> {
        if self.code == CODE_OK {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                code: self.code,
                message: self.msg.clone().unwrap_or_default(),
            })
        }
    }

    /// Returns the payload of a successful envelope.
    ///
    /// # Errors
    /// `ApiError::Rejected` for failure codes, `ApiError::Decode` when data is missing.
    pub fn into_data(self) -> Result<T, ApiError> {
        self.check()?;
        self.data
            .ok_or_else(|| ApiError::Decode("response envelope carries no data".to_string()))
    }

    /// Returns the message of a successful envelope that carries no payload.
    ///
    /// # Errors
    /// `ApiError::Rejected` for failure codes.
    pub fn into_message(self) -> Result<String, ApiError> {
        self.check()?;
        Ok(self.msg.unwrap_or_default())
    }
}

/// Token details returned by login and registration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(default)]
    pub token_name: Option<String>,
    pub token_value: String,
    #[serde(default)]
    pub is_login: Option<bool>,
    #[serde(default)]
    pub login_id: Option<Value>,
    #[serde(default)]
    pub login_type: Option<String>,
    #[serde(default)]
    pub token_timeout: Option<i64>,
    #[serde(default)]
    pub session_timeout: Option<i64>,
    #[serde(default)]
    pub token_session_timeout: Option<i64>,
    #[serde(default)]
    pub token_active_timeout: Option<i64>,
    #[serde(default)]
    pub login_device: Option<String>,
}

impl fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenInfo")
            .field("token_name", &self.token_name)
            .field("token_value", &"[REDACTED]")
            .field("login_id", &self.login_id)
            .field("token_timeout", &self.token_timeout)
            .finish_non_exhaustive()
    }
}

/// Account as returned by the backend. The password column is never read.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Grant issued by identity verification, consumed by the password reset.
#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetGrant {
    pub user_id: i64,
    pub reset_token: String,
}

impl fmt::Debug for ResetGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetGrant")
            .field("user_id", &self.user_id)
            .field("reset_token", &"[REDACTED]")
            .finish()
    }
}

pub(crate) type QueryPairs = Vec<(&'static str, String)>;

#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

impl RegisterForm {
    pub(crate) fn query(&self) -> QueryPairs {
        let mut pairs = vec![
            ("username", self.username.clone()),
            ("nickname", self.nickname.clone()),
            ("email", self.email.clone()),
            ("password", self.password.expose_secret().to_string()),
            (
                "confirmPassword",
                self.confirm_password.expose_secret().to_string(),
            ),
        ];
        if let Some(avatar_url) = &self.avatar_url {
            pairs.push(("avatarUrl", avatar_url.clone()));
        }
        pairs
    }
}

/// Profile fields to change; `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.email.is_none() && self.avatar_url.is_none()
    }

    pub(crate) fn query(&self) -> QueryPairs {
        [
            ("nickname", &self.nickname),
            ("email", &self.email),
            ("avatarUrl", &self.avatar_url),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|value| (key, value)))
        .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub user_id: i64,
    pub new_password: SecretString,
    pub confirm_password: SecretString,
    pub reset_token: SecretString,
}

impl PasswordReset {
    pub(crate) fn query(&self) -> QueryPairs {
        vec![
            ("userId", self.user_id.to_string()),
            ("newPassword", self.new_password.expose_secret().to_string()),
            (
                "confirmPassword",
                self.confirm_password.expose_secret().to_string(),
            ),
            ("token", self.reset_token.expose_secret().to_string()),
        ]
    }
}

/// Reads the trailing `true`/`false` of a plain-text status answer such as
/// `当前角色是否管理员：true`. Bare `"true"` works too.
#[must_use]
pub fn parse_flag(text: &str) -> Option<bool> {
    let last = text
        .trim()
        .rsplit(|c: char| c == '：' || c == ':' || c.is_whitespace())
        .next()?
        .trim_matches('"');
    match last {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
