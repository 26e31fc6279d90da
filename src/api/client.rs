//! Authenticated client for the user service. Every call goes through
//! [`ApiClient::send`], which attaches the session token and turns the backend's
//! "not logged in" error page into a forced logout.

use super::{
    ApiConfig, ApiError, Reply,
    expiry::is_session_invalid,
    types::{
        Envelope, PasswordReset, ProfileUpdate, QueryPairs, RegisterForm, ResetGrant, TokenInfo,
        User, parse_flag,
    },
};
use crate::{
    router::{Navigator, Redirect, RouteName},
    session::Session,
};
use reqwest::{Client, Method, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::{fmt, sync::Arc};
use tracing::{Instrument, debug, info_span, instrument, warn};

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "satoken";

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    session: Session,
    navigator: Arc<dyn Navigator>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: ApiConfig,
        session: Session,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            http,
            config,
            session,
            navigator,
        })
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Sends a request and applies the session-expiry interception.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Reply<Response>, ApiError> {
        let url = self.config.endpoint(path)?;
        let mut request = self.http.request(method.clone(), url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.session.token() {
            request = request.header(TOKEN_HEADER, token.expose_secret());
        }

        let span = info_span!("api.request", http.method = %method, url = %url);
        let response = request
            .send()
            .instrument(span)
            .await
            .map_err(ApiError::from_transport)?;

        let status = response.status();
        debug!("{method} {} -> {status}", url.path());
        if status.is_success() {
            return Ok(Reply::Data(response));
        }

        let body = response.text().await.map_err(ApiError::from_transport)?;
        if is_session_invalid(status, &body) {
            self.force_logout();
            return Ok(Reply::Suppressed);
        }

        Err(ApiError::Http {
            status: status.as_u16(),
            body,
        })
    }

    fn force_logout(&self) {
        warn!("server rejected the session, signing out");
        if let Err(err) = self.session.clear() {
            warn!("failed to clear session: {err}");
        }
        self.navigator.replace(Redirect::to(RouteName::Login));
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Reply<Envelope<T>>, ApiError> {
        let Reply::Data(response) = self.send(Method::GET, path, query).await? else {
            return Ok(Reply::Suppressed);
        };
        let envelope = response
            .json::<Envelope<T>>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(Reply::Data(envelope))
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Reply<T>, ApiError> {
        match self.get_envelope::<T>(path, query).await? {
            Reply::Data(envelope) => envelope.into_data().map(Reply::Data),
            Reply::Suppressed => Ok(Reply::Suppressed),
        }
    }

    async fn get_message(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Reply<String>, ApiError> {
        match self.get_envelope::<serde_json::Value>(path, query).await? {
            Reply::Data(envelope) => envelope.into_message().map(Reply::Data),
            Reply::Suppressed => Ok(Reply::Suppressed),
        }
    }

    async fn text(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Reply<String>, ApiError> {
        let Reply::Data(response) = self.send(method, path, query).await? else {
            return Ok(Reply::Suppressed);
        };
        let body = response.text().await.map_err(ApiError::from_transport)?;
        Ok(Reply::Data(body))
    }

    /// Logs in and returns the issued token. Does not touch the session.
    ///
    /// # Errors
    /// Returns an error on transport failures or when the backend rejects the credentials.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Reply<TokenInfo>, ApiError> {
        let query: QueryPairs = vec![
            ("username", username.to_string()),
            ("password", password.expose_secret().to_string()),
        ];
        self.get_data("/user/doLogin", &query).await
    }

    /// Registers an account; the backend logs the new user in and returns a token.
    ///
    /// # Errors
    /// Returns an error on transport failures or backend validation errors.
    #[instrument(skip_all, fields(username = %form.username))]
    pub async fn register(&self, form: &RegisterForm) -> Result<Reply<TokenInfo>, ApiError> {
        self.get_data("/user/doRegister", &form.query()).await
    }

    /// # Errors
    /// Returns an error on transport failures or when the backend rejects the call.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<Reply<User>, ApiError> {
        self.get_data("/user/getInfo", &[]).await
    }

    /// Returns the backend's confirmation message.
    ///
    /// # Errors
    /// Returns an error on transport failures or when the backend rejects the update.
    #[instrument(skip(self))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Reply<String>, ApiError> {
        self.get_message("/user/updateInfo", &update.query()).await
    }

    /// Asks the backend whether the current token is logged in.
    ///
    /// # Errors
    /// Returns an error on transport failures or an unrecognised answer.
    #[instrument(skip(self))]
    pub async fn check_logged_in(&self) -> Result<Reply<bool>, ApiError> {
        match self.text(Method::GET, "/user/isLogin", &[]).await? {
            Reply::Data(body) => parse_flag(&body)
                .map(Reply::Data)
                .ok_or_else(|| ApiError::Decode(format!("unexpected login status: {body}"))),
            Reply::Suppressed => Ok(Reply::Suppressed),
        }
    }

    /// Returns the raw text answer; this endpoint has no envelope. Use
    /// [`parse_flag`] to read it.
    ///
    /// # Errors
    /// Returns an error on transport failures.
    #[instrument(skip(self))]
    pub async fn check_is_admin(&self) -> Result<Reply<String>, ApiError> {
        self.text(Method::GET, "/user/isAdmin", &[]).await
    }

    /// First step of password recovery.
    ///
    /// # Errors
    /// Returns an error on transport failures or when username and email do not match.
    #[instrument(skip(self))]
    pub async fn verify_identity(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Reply<ResetGrant>, ApiError> {
        let query: QueryPairs = vec![
            ("username", username.to_string()),
            ("email", email.to_string()),
        ];
        self.get_data("/user/verifyIdentity", &query).await
    }

    /// # Errors
    /// Returns an error on transport failures or when the backend rejects the reset.
    #[instrument(skip_all, fields(user_id = reset.user_id))]
    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<Reply<String>, ApiError> {
        self.get_message("/user/resetPassword", &reset.query()).await
    }

    /// Permanently deletes the logged-in account. Does not touch the session.
    ///
    /// # Errors
    /// Returns an error on transport failures or when the backend refuses.
    #[instrument(skip(self))]
    pub async fn delete_account(&self) -> Result<Reply<String>, ApiError> {
        self.get_message("/user/deleteAccount", &[]).await
    }

    /// Admin only. The admin endpoints answer with bare JSON.
    ///
    /// # Errors
    /// Returns an error on transport failures or an undecodable body.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Reply<Vec<User>>, ApiError> {
        match self.text(Method::GET, "/admin/users", &[]).await? {
            Reply::Data(body) => decode_json(&body).map(Reply::Data),
            Reply::Suppressed => Ok(Reply::Suppressed),
        }
    }

    /// Admin only. `None` when the user does not exist (empty body).
    ///
    /// # Errors
    /// Returns an error on transport failures or an undecodable body.
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i64) -> Result<Reply<Option<User>>, ApiError> {
        match self.text(Method::GET, &format!("/admin/users/{id}"), &[]).await? {
            Reply::Data(body) if body.trim().is_empty() => Ok(Reply::Data(None)),
            Reply::Data(body) => decode_json::<Option<User>>(&body).map(Reply::Data),
            Reply::Suppressed => Ok(Reply::Suppressed),
        }
    }

    /// Admin only.
    ///
    /// # Errors
    /// Returns an error on transport failures.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> Result<Reply<()>, ApiError> {
        let reply = self
            .text(Method::DELETE, &format!("/admin/users/{id}"), &[])
            .await?;
        Ok(reply.map(|_| ()))
    }
}

fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))
}
