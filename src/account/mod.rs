//! Page-level account flows built on the API client: they keep the cached
//! session in step with what the backend reports. Passwords are only ever held
//! as `SecretString` and are never logged.

use crate::{
    api::{
        ApiClient, ApiError, PasswordReset, RegisterForm, Reply, TokenInfo, parse_flag,
        types::ResetGrant,
    },
    session::{Session, SessionError},
};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

fn passwords_match(password: &SecretString, confirm: &SecretString) -> Result<(), AccountError> {
    if password.expose_secret().is_empty() {
        return Err(AccountError::Invalid("password must not be empty".to_string()));
    }
    if password.expose_secret() != confirm.expose_secret() {
        return Err(AccountError::Invalid("passwords do not match".to_string()));
    }
    Ok(())
}

/// Stores the token, then asks the backend for the role and caches the admin flag.
async fn establish(client: &ApiClient, info: TokenInfo) -> Result<Reply<TokenInfo>, AccountError> {
    client.session().establish(&info.token_value)?;

    match client.check_is_admin().await {
        Ok(Reply::Data(text)) => {
            let admin = parse_flag(&text).unwrap_or(false);
            client.session().set_admin(admin)?;
            debug!("admin flag cached: {admin}");
        }
        Ok(Reply::Suppressed) => return Ok(Reply::Suppressed),
        // The token is valid; a failed role lookup leaves the user a plain member.
        Err(err) => warn!("role lookup failed, treating user as non-admin: {err}"),
    }

    Ok(Reply::Data(info))
}

/// Logs in and establishes the local session.
///
/// # Errors
/// Returns an error for empty credentials, backend rejections, transport failures
/// or when the session cannot be stored.
#[instrument(skip(client, password))]
pub async fn sign_in(
    client: &ApiClient,
    username: &str,
    password: &SecretString,
) -> Result<Reply<TokenInfo>, AccountError> {
    if username.trim().is_empty() || password.expose_secret().is_empty() {
        return Err(AccountError::Invalid(
            "username and password are required".to_string(),
        ));
    }

    let Reply::Data(info) = client.login(username.trim(), password).await? else {
        return Ok(Reply::Suppressed);
    };
    info!("signed in as {}", username.trim());
    establish(client, info).await
}

/// Registers a new account. The backend logs new users in, so the returned token
/// establishes the session just like [`sign_in`].
///
/// # Errors
/// Returns an error for invalid form fields, backend rejections or transport failures.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn sign_up(
    client: &ApiClient,
    form: &RegisterForm,
) -> Result<Reply<TokenInfo>, AccountError> {
    if form.username.trim().is_empty() {
        return Err(AccountError::Invalid("username is required".to_string()));
    }
    if !valid_email(&form.email) {
        return Err(AccountError::Invalid(format!(
            "invalid email address: {}",
            form.email
        )));
    }
    passwords_match(&form.password, &form.confirm_password)?;

    let Reply::Data(info) = client.register(form).await? else {
        return Ok(Reply::Suppressed);
    };
    info!("registered {}", form.username);
    establish(client, info).await
}

/// Local logout; the backend keeps no logout endpoint.
///
/// # Errors
/// Returns an error if the cleared session cannot be persisted.
pub fn sign_out(session: &Session) -> Result<(), AccountError> {
    session.clear()?;
    info!("signed out");
    Ok(())
}

/// Step one of password recovery: prove the username and email belong together.
///
/// # Errors
/// Returns an error for an invalid email, a mismatch reported by the backend or
/// transport failures.
#[instrument(skip(client))]
pub async fn verify_identity(
    client: &ApiClient,
    username: &str,
    email: &str,
) -> Result<Reply<ResetGrant>, AccountError> {
    if username.trim().is_empty() {
        return Err(AccountError::Invalid("username is required".to_string()));
    }
    if !valid_email(email) {
        return Err(AccountError::Invalid(format!("invalid email address: {email}")));
    }
    Ok(client.verify_identity(username.trim(), email.trim()).await?)
}

/// Step two of password recovery: set the new password with the grant from
/// [`verify_identity`].
///
/// # Errors
/// Returns an error for mismatched passwords, an expired grant or transport failures.
#[instrument(skip_all, fields(user_id = grant.user_id))]
pub async fn reset_password(
    client: &ApiClient,
    grant: &ResetGrant,
    new_password: &SecretString,
    confirm_password: &SecretString,
) -> Result<Reply<String>, AccountError> {
    passwords_match(new_password, confirm_password)?;

    let reset = PasswordReset {
        user_id: grant.user_id,
        new_password: new_password.clone(),
        confirm_password: confirm_password.clone(),
        reset_token: SecretString::from(grant.reset_token.clone()),
    };
    Ok(client.reset_password(&reset).await?)
}

/// Both recovery steps in one go.
///
/// # Errors
/// See [`verify_identity`] and [`reset_password`].
pub async fn recover_password(
    client: &ApiClient,
    username: &str,
    email: &str,
    new_password: &SecretString,
    confirm_password: &SecretString,
) -> Result<Reply<String>, AccountError> {
    passwords_match(new_password, confirm_password)?;

    let Reply::Data(grant) = verify_identity(client, username, email).await? else {
        return Ok(Reply::Suppressed);
    };
    reset_password(client, &grant, new_password, confirm_password).await
}

/// Deletes the logged-in account and drops the local session on success.
///
/// # Errors
/// Returns an error if the backend refuses, the transport fails or the session
/// cannot be cleared.
#[instrument(skip(client))]
pub async fn close_account(client: &ApiClient) -> Result<Reply<String>, AccountError> {
    let Reply::Data(message) = client.delete_account().await? else {
        return Ok(Reply::Suppressed);
    };
    client.session().clear()?;
    info!("account deleted");
    Ok(Reply::Data(message))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{api::ApiConfig, router::Router};
    use serde_json::json;
    use std::{net::TcpListener, sync::Arc};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client_for(server: &MockServer) -> ApiClient {
        let session = Session::in_memory();
        let router = Arc::new(Router::new(session.clone()));
        ApiClient::new(ApiConfig::new(&server.uri()).unwrap(), session, router).unwrap()
    }

    fn token_envelope(token: &str) -> serde_json::Value {
        json!({
            "code": 200,
            "msg": "ok",
            "data": { "tokenName": "satoken", "tokenValue": token, "isLogin": true, "loginId": "1" }
        })
    }

    #[test]
    fn email_validation() {
        assert!(valid_email("cat@guducat.dev"));
        assert!(!valid_email("cat@guducat"));
        assert!(!valid_email("cat guducat.dev"));
        assert!(!valid_email(""));
    }

    #[test]
    fn password_confirmation() {
        let pw = SecretString::from("meow");
        assert!(passwords_match(&pw, &SecretString::from("meow")).is_ok());
        assert!(matches!(
            passwords_match(&pw, &SecretString::from("purr")),
            Err(AccountError::Invalid(_))
        ));
        assert!(matches!(
            passwords_match(&SecretString::from(""), &SecretString::from("")),
            Err(AccountError::Invalid(_))
        ));
    }

    #[test]
    fn sign_out_clears_session() {
        let session = Session::in_memory();
        session.establish("tok").unwrap();
        sign_out(&session).unwrap();
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn sign_in_caches_token_and_admin_flag() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/doLogin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_envelope("tok-admin")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/isAdmin"))
            .and(header("satoken", "tok-admin"))
            .respond_with(ResponseTemplate::new(200).set_body_string("当前角色是否管理员：true"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let reply = sign_in(&client, "root", &SecretString::from("pw"))
            .await
            .unwrap();

        assert_eq!(reply.data().unwrap().token_value, "tok-admin");
        assert!(client.session().is_logged_in());
        assert!(client.session().is_admin());
    }

    #[tokio::test]
    async fn sign_in_survives_failed_role_lookup() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/doLogin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_envelope("tok")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/isAdmin"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        sign_in(&client, "cat", &SecretString::from("pw"))
            .await
            .unwrap();

        assert!(client.session().is_logged_in());
        assert!(!client.session().is_admin());
    }

    #[tokio::test]
    async fn sign_in_rejected_leaves_session_empty() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/doLogin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 500,
                "msg": "登录失败，请检查用户名或密码",
                "data": null
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = sign_in(&client, "cat", &SecretString::from("wrong")).await;

        assert!(matches!(
            result,
            Err(AccountError::Api(ApiError::Rejected { .. }))
        ));
        assert!(!client.session().is_logged_in());
    }

    #[tokio::test]
    async fn sign_up_validates_before_calling_backend() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        let client = client_for(&server);
        let form = RegisterForm {
            username: "cat".to_string(),
            nickname: "Cat".to_string(),
            email: "not-an-email".to_string(),
            avatar_url: None,
            password: SecretString::from("pw"),
            confirm_password: SecretString::from("pw"),
        };

        assert!(matches!(
            sign_up(&client, &form).await,
            Err(AccountError::Invalid(_))
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recover_password_runs_both_steps() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/verifyIdentity"))
            .and(query_param("username", "cat"))
            .and(query_param("email", "cat@guducat.dev"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "data": { "userId": 42, "resetToken": "reset-1" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/resetPassword"))
            .and(query_param("userId", "42"))
            .and(query_param("token", "reset-1"))
            .and(query_param("newPassword", "new-pw"))
            .and(query_param("confirmPassword", "new-pw"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "msg": "密码重置成功",
                "data": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let pw = SecretString::from("new-pw");
        let reply = recover_password(&client, "cat", "cat@guducat.dev", &pw, &pw)
            .await
            .unwrap();

        assert_eq!(reply, Reply::Data("密码重置成功".to_string()));
    }

    #[tokio::test]
    async fn close_account_clears_session_on_success() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/deleteAccount"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "msg": "账户已成功注销",
                "data": null
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.session().establish("tok").unwrap();

        let reply = close_account(&client).await.unwrap();

        assert_eq!(reply, Reply::Data("账户已成功注销".to_string()));
        assert!(!client.session().is_logged_in());
    }

    #[tokio::test]
    async fn close_account_keeps_session_when_refused() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/deleteAccount"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 500,
                "msg": "账户注销失败",
                "data": null
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.session().establish("tok").unwrap();

        assert!(close_account(&client).await.is_err());
        assert!(client.session().is_logged_in());
    }
}
