//! Authentication adapter: scripted browser login, then session-cookie extraction.
//!
//! Every failure (element never appears, redirect never happens, cookie
//! missing, WebDriver error) collapses to `LoginOutcome::Rejected`. The
//! browser is quit before `login` returns, on every path.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::{sleep, timeout, Instant};
use tracing::{info, warn};

use crate::config::Config;

pub mod chrome;

pub use chrome::ChromeLauncher;

const URL_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("browser error: {0}")]
    Browser(String),

    #[error("timed out after {0:?} waiting for {1}")]
    Timeout(Duration, &'static str),

    #[error("cookie '{0}' not present after login")]
    MissingCookie(String),
}

impl From<thirtyfour::error::WebDriverError> for AuthError {
    fn from(e: thirtyfour::error::WebDriverError) -> Self {
        AuthError::Browser(e.to_string())
    }
}

/// Login form input. Used once per attempt and never stored.
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque session credential for the leads API. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(SessionToken),
    Rejected,
}

/// One live browser session. `quit` must be called exactly once.
#[async_trait]
pub trait Browser: Send {
    async fn goto(&mut self, url: &str) -> Result<(), AuthError>;
    /// Waits for the email field to appear.
    async fn wait_for_login_form(&mut self, wait: Duration) -> Result<(), AuthError>;
    /// Types both credentials and presses Return in the password field.
    async fn submit_credentials(&mut self, email: &str, password: &str) -> Result<(), AuthError>;
    async fn current_url(&mut self) -> Result<String, AuthError>;
    async fn cookie(&mut self, name: &str) -> Result<Option<String>, AuthError>;
    async fn quit(self: Box<Self>) -> Result<(), AuthError>;
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn Browser>, AuthError>;
}

/// Carried in `AppState` as `Arc<dyn Authenticator>`.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> LoginOutcome;
}

#[derive(Debug, Clone)]
pub struct LoginFlow {
    pub login_url: String,
    pub post_login_url: String,
    pub cookie_name: String,
    pub timeout: Duration,
    pub settle: Duration,
}

impl LoginFlow {
    pub fn from_config(config: &Config) -> Self {
        Self {
            login_url: config.login_url.clone(),
            post_login_url: config.post_login_url.clone(),
            cookie_name: config.session_cookie_name.clone(),
            timeout: config.login_timeout,
            settle: config.cookie_settle,
        }
    }
}

pub struct BrowserAuthenticator<L> {
    launcher: L,
    flow: LoginFlow,
}

impl<L: BrowserLauncher> BrowserAuthenticator<L> {
    pub fn new(launcher: L, flow: LoginFlow) -> Self {
        Self { launcher, flow }
    }

    async fn try_login(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        let mut browser = self.launcher.launch().await?;

        let result = self.drive(browser.as_mut(), credentials).await;

        if let Err(e) = browser.quit().await {
            warn!("Failed to quit browser: {e}");
        }

        result
    }

    async fn drive(
        &self,
        browser: &mut dyn Browser,
        credentials: &Credentials,
    ) -> Result<SessionToken, AuthError> {
        let flow = &self.flow;

        browser.goto(&flow.login_url).await?;
        browser.wait_for_login_form(flow.timeout).await?;
        browser
            .submit_credentials(&credentials.email, &credentials.password)
            .await?;

        wait_for_url(browser, &flow.post_login_url, flow.timeout).await?;

        // Let the app finish writing its cookies.
        sleep(flow.settle).await;

        browser
            .cookie(&flow.cookie_name)
            .await?
            .and_then(SessionToken::new)
            .ok_or_else(|| AuthError::MissingCookie(flow.cookie_name.clone()))
    }
}

#[async_trait]
impl<L: BrowserLauncher> Authenticator for BrowserAuthenticator<L> {
    async fn login(&self, credentials: &Credentials) -> LoginOutcome {
        match self.try_login(credentials).await {
            Ok(token) => {
                info!(email = %credentials.email, "Login succeeded");
                LoginOutcome::Authenticated(token)
            }
            Err(e) => {
                warn!(email = %credentials.email, "Login failed: {e}");
                LoginOutcome::Rejected
            }
        }
    }
}

/// Polls the browser URL until it equals `expected` or `wait` elapses.
async fn wait_for_url(
    browser: &mut dyn Browser,
    expected: &str,
    wait: Duration,
) -> Result<(), AuthError> {
    let deadline = Instant::now() + wait;
    let polled = timeout(wait, async {
        loop {
            if same_url(&browser.current_url().await?, expected) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                break;
            }
            sleep(URL_POLL_INTERVAL).await;
        }
        Err(AuthError::Timeout(wait, "post-login redirect"))
    })
    .await;

    match polled {
        Ok(result) => result,
        Err(_) => Err(AuthError::Timeout(wait, "post-login redirect")),
    }
}

/// `https://host` and `https://host/` name the same page.
fn same_url(actual: &str, expected: &str) -> bool {
    actual.trim_end_matches('/') == expected.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    const LOGIN: &str = "https://app.example.com/auth";
    const HOME: &str = "https://app.example.com/";

    #[derive(Clone, Copy)]
    enum Script {
        /// Redirects after submit and sets the cookie.
        Success,
        /// Stays on the login page forever.
        NeverRedirects,
        /// Redirects but never sets the cookie.
        NoCookie,
        /// Login form never renders.
        NoForm,
        /// Redirects and sets an empty cookie value.
        EmptyCookie,
    }

    #[derive(Default)]
    struct Counters {
        launched: AtomicUsize,
        quit: AtomicUsize,
    }

    struct FakeBrowser {
        script: Script,
        url: String,
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl Browser for FakeBrowser {
        async fn goto(&mut self, url: &str) -> Result<(), AuthError> {
            self.url = url.to_string();
            Ok(())
        }

        async fn wait_for_login_form(&mut self, wait: Duration) -> Result<(), AuthError> {
            match self.script {
                Script::NoForm => {
                    sleep(wait).await;
                    Err(AuthError::Timeout(wait, "login form"))
                }
                _ => Ok(()),
            }
        }

        async fn submit_credentials(
            &mut self,
            _email: &str,
            password: &str,
        ) -> Result<(), AuthError> {
            if password == "explode" {
                return Err(AuthError::Browser("element not interactable".into()));
            }
            if !matches!(self.script, Script::NeverRedirects) {
                self.url = HOME.to_string();
            }
            Ok(())
        }

        async fn current_url(&mut self) -> Result<String, AuthError> {
            Ok(self.url.clone())
        }

        async fn cookie(&mut self, name: &str) -> Result<Option<String>, AuthError> {
            assert_eq!(name, "session");
            Ok(match self.script {
                Script::Success => Some("tok-abc".to_string()),
                Script::EmptyCookie => Some(String::new()),
                _ => None,
            })
        }

        async fn quit(self: Box<Self>) -> Result<(), AuthError> {
            self.counters.quit.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FakeLauncher {
        script: Script,
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl BrowserLauncher for FakeLauncher {
        async fn launch(&self) -> Result<Box<dyn Browser>, AuthError> {
            self.counters.launched.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeBrowser {
                script: self.script,
                url: "about:blank".to_string(),
                counters: self.counters.clone(),
            }))
        }
    }

    fn authenticator(script: Script) -> (BrowserAuthenticator<FakeLauncher>, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let flow = LoginFlow {
            login_url: LOGIN.into(),
            post_login_url: HOME.into(),
            cookie_name: "session".into(),
            timeout: Duration::from_secs(15),
            settle: Duration::from_secs(3),
        };
        let launcher = FakeLauncher {
            script,
            counters: counters.clone(),
        };
        (BrowserAuthenticator::new(launcher, flow), counters)
    }

    fn creds(password: &str) -> Credentials {
        Credentials {
            email: "user@example.com".into(),
            password: password.into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_login_returns_token_and_quits() {
        let (auth, counters) = authenticator(Script::Success);
        let outcome = auth.login(&creds("hunter2")).await;

        assert_eq!(
            outcome,
            LoginOutcome::Authenticated(SessionToken::new("tok-abc").unwrap())
        );
        assert_eq!(counters.launched.load(Ordering::SeqCst), 1);
        assert_eq!(counters.quit.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_redirect_times_out_and_quits() {
        let (auth, counters) = authenticator(Script::NeverRedirects);
        let started = Instant::now();
        let outcome = auth.login(&creds("wrong")).await;

        assert_eq!(outcome, LoginOutcome::Rejected);
        assert!(started.elapsed() >= Duration::from_secs(15));
        assert!(started.elapsed() < Duration::from_secs(17));
        assert_eq!(counters.quit.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_cookie_is_rejected_and_quits() {
        let (auth, counters) = authenticator(Script::NoCookie);
        assert_eq!(auth.login(&creds("hunter2")).await, LoginOutcome::Rejected);
        assert_eq!(counters.quit.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_cookie_is_rejected() {
        let (auth, counters) = authenticator(Script::EmptyCookie);
        assert_eq!(auth.login(&creds("hunter2")).await, LoginOutcome::Rejected);
        assert_eq!(counters.quit.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_form_is_rejected_and_quits() {
        let (auth, counters) = authenticator(Script::NoForm);
        assert_eq!(auth.login(&creds("hunter2")).await, LoginOutcome::Rejected);
        assert_eq!(counters.quit.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_browser_error_is_rejected_and_quits() {
        let (auth, counters) = authenticator(Script::Success);
        assert_eq!(auth.login(&creds("explode")).await, LoginOutcome::Rejected);
        assert_eq!(counters.quit.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_same_url_ignores_trailing_slash() {
        assert!(same_url("https://app.example.com", HOME));
        assert!(same_url(HOME, HOME));
        assert!(!same_url(LOGIN, HOME));
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let token = SessionToken::new("secret-token").unwrap();
        assert!(!format!("{token:?}").contains("secret-token"));
        assert!(!format!("{:?}", creds("hunter2")).contains("hunter2"));
    }

    #[test]
    fn test_empty_token_is_rejected() {
        assert!(SessionToken::new("").is_none());
    }
}
