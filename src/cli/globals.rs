use crate::{
    api::{ApiClient, ApiConfig},
    router::Router,
    session::{FileStore, Session},
};
use anyhow::{Context as _, Result};
use std::{path::PathBuf, sync::Arc, time::Duration};

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub session_file: PathBuf,
    pub timeout: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, session_file: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            api_url,
            session_file: session_file.unwrap_or_else(default_session_file),
            timeout,
        }
    }

    /// Opens the session file and wires the router and client around it.
    ///
    /// # Errors
    /// Returns an error if the session file cannot be opened or the API URL is invalid.
    pub fn connect(&self) -> Result<Context> {
        let store = FileStore::open(&self.session_file).with_context(|| {
            format!("could not open session file {}", self.session_file.display())
        })?;
        let session = Session::new(Arc::new(store));
        let router = Arc::new(Router::new(session.clone()));

        let config = ApiConfig::new(&self.api_url)
            .with_context(|| format!("invalid API URL: {}", self.api_url))?
            .with_timeout(self.timeout);
        let client = ApiClient::new(config, session.clone(), router.clone())?;

        Ok(Context {
            session,
            router,
            client,
        })
    }
}

/// `~/.guducat/session.json`, or a relative `.guducat/session.json` without a home.
#[must_use]
pub fn default_session_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".guducat")
        .join("session.json")
}

/// Everything an action needs: the session, the router and the client share one store.
#[derive(Debug)]
pub struct Context {
    pub session: Session,
    pub router: Arc<Router>,
    pub client: ApiClient,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_global_args_defaults_session_file() {
        let args = GlobalArgs::new(
            "http://localhost:8081".to_string(),
            None,
            Duration::from_secs(10),
        );
        assert!(args.session_file.ends_with(".guducat/session.json"));
        assert_eq!(args.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_connect_shares_session() {
        let dir = TempDir::new().unwrap();
        let args = GlobalArgs::new(
            "http://localhost:8081".to_string(),
            Some(dir.path().join("session.json")),
            Duration::from_secs(2),
        );

        let context = args.connect().unwrap();
        context.session.establish("tok").unwrap();

        assert!(context.client.session().is_logged_in());
        assert!(context.router.session().is_logged_in());
        assert_eq!(context.client.config().timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let args = GlobalArgs::new(
            "ftp://localhost".to_string(),
            Some(dir.path().join("session.json")),
            Duration::from_secs(2),
        );
        assert!(args.connect().is_err());
    }
}
