//! Headless Chrome over WebDriver.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thirtyfour::extensions::cdp::ChromeDevTools;
use thirtyfour::prelude::*;

use super::{AuthError, Browser, BrowserLauncher};

const EMAIL_XPATH: &str = r#"//input[@type="email"]"#;
const PASSWORD_XPATH: &str = r#"//input[@type="password"]"#;
const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// WebDriver key code for Return.
const RETURN_KEY: &str = "\u{E006}";

const CHROME_ARGS: [&str; 6] = [
    "--headless",
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--log-level=3",
    "--window-size=1920,1080",
];

/// Connects to a running ChromeDriver for each login attempt.
pub struct ChromeLauncher {
    webdriver_url: String,
}

impl ChromeLauncher {
    pub fn new(webdriver_url: String) -> Self {
        Self { webdriver_url }
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn Browser>, AuthError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_chrome_option("args", CHROME_ARGS.to_vec())?;

        let driver = WebDriver::new(&self.webdriver_url, caps)
            .await
            .map_err(|e| AuthError::Browser(format!("failed to connect to ChromeDriver: {e}")))?;

        Ok(Box::new(ChromeBrowser { driver }))
    }
}

pub struct ChromeBrowser {
    driver: WebDriver,
}

#[derive(Debug, Deserialize)]
struct CdpCookies {
    #[serde(default)]
    cookies: Vec<CdpCookie>,
}

#[derive(Debug, Deserialize)]
struct CdpCookie {
    name: String,
    value: String,
}

/// Picks the named cookie out of a `Network.getAllCookies` response.
fn find_cookie(response: serde_json::Value, name: &str) -> Result<Option<String>, AuthError> {
    let parsed: CdpCookies = serde_json::from_value(response)
        .map_err(|e| AuthError::Browser(format!("unexpected cookie payload: {e}")))?;
    Ok(parsed
        .cookies
        .into_iter()
        .find(|c| c.name == name)
        .map(|c| c.value))
}

#[async_trait]
impl Browser for ChromeBrowser {
    async fn goto(&mut self, url: &str) -> Result<(), AuthError> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn wait_for_login_form(&mut self, wait: Duration) -> Result<(), AuthError> {
        self.driver
            .query(By::XPath(EMAIL_XPATH))
            .wait(wait, ELEMENT_POLL_INTERVAL)
            .first()
            .await
            .map_err(|_| AuthError::Timeout(wait, "login form"))?;
        Ok(())
    }

    async fn submit_credentials(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        let email_input = self.driver.find(By::XPath(EMAIL_XPATH)).await?;
        let password_input = self.driver.find(By::XPath(PASSWORD_XPATH)).await?;

        email_input.send_keys(email).await?;
        password_input.send_keys(password).await?;
        password_input.send_keys(RETURN_KEY).await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, AuthError> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn cookie(&mut self, name: &str) -> Result<Option<String>, AuthError> {
        // CDP sees HttpOnly cookies on every domain, not just the current page's.
        let dev_tools = ChromeDevTools::new(self.driver.handle.clone());
        let response = dev_tools.execute_cdp("Network.getAllCookies").await?;
        find_cookie(response, name)
    }

    async fn quit(self: Box<Self>) -> Result<(), AuthError> {
        self.driver.quit().await?;
        Ok(())
    }
}
