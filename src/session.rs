//! The single browser session a run navigates with.

use crate::error::{AuthError, Error, NavigationError, NavigationFailure};
use crate::settings::{BrowserSettings, Credentials};
use headless_chrome::util::Wait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const LOGIN_BUTTON_XPATH: &str = "//button[span[text()='Log in']]";
const USERNAME_INPUT: &str = "input[name='username']";
const PASSWORD_INPUT: &str = "input[name='password']";
/// Only set by the site once a login succeeded.
const LOGIN_COOKIE: &str = "bbusername";
const COOKIE_POLL: Duration = Duration::from_millis(250);

/// What the orchestrator needs from a browser. Implemented by
/// [`ChromeSession`]; tests substitute their own.
pub trait Session {
    fn login(&mut self, credentials: &Credentials) -> Result<(), AuthError>;

    /// Navigate to `url`, wait until an element matching the CSS selector
    /// `ready` exists, and return the rendered page source.
    fn fetch(&mut self, url: &str, ready: &str) -> Result<String, NavigationError>;

    /// Shut the browser down. Calling it again does nothing.
    fn close(&mut self);
}

pub struct ChromeSession {
    browser: Option<Browser>,
    tab: Arc<Tab>,
    login_url: Url,
    timeout: Duration,
    login_timeout: Duration,
}

impl ChromeSession {
    pub fn launch(settings: &BrowserSettings, login_url: &Url) -> Result<ChromeSession, Error> {
        let options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .window_size(Some((1280, 1024)))
            .build()
            .map_err(|e| Error::Launch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| Error::Launch(format!("{:#}", e)))?;
        let tab = browser
            .new_tab()
            .map_err(|e| Error::Launch(format!("{:#}", e)))?;
        tab.set_default_timeout(settings.timeout);

        debug!("Browser started (headless: {})", settings.headless);

        Ok(ChromeSession {
            browser: Some(browser),
            tab,
            login_url: login_url.clone(),
            timeout: settings.timeout,
            login_timeout: settings.login_timeout,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.browser.is_none()
    }

    fn has_login_cookie(&self) -> Option<()> {
        let cookies = self.tab.get_cookies().ok()?;
        cookies.iter().any(|c| c.name == LOGIN_COOKIE).then_some(())
    }
}

impl Session for ChromeSession {
    fn login(&mut self, credentials: &Credentials) -> Result<(), AuthError> {
        if self.is_closed() {
            return Err(AuthError::Browser(String::from("session is closed")));
        }

        self.tab
            .navigate_to(self.login_url.as_str())
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(browser_err)?;

        self.tab
            .wait_for_xpath_with_custom_timeout(LOGIN_BUTTON_XPATH, self.timeout)
            .map_err(|_| AuthError::Form {
                step: "the 'Log in' button",
            })?
            .click()
            .map_err(browser_err)?;

        let username = self
            .tab
            .wait_for_element_with_custom_timeout(USERNAME_INPUT, self.timeout)
            .map_err(|_| AuthError::Form {
                step: "the username field",
            })?;
        username.click().map_err(browser_err)?;
        username
            .type_into(&credentials.username)
            .map_err(browser_err)?;

        let password = self
            .tab
            .wait_for_element_with_custom_timeout(PASSWORD_INPUT, self.timeout)
            .map_err(|_| AuthError::Form {
                step: "the password field",
            })?;
        password.click().map_err(browser_err)?;
        password
            .type_into(&credentials.password)
            .map_err(browser_err)?;
        self.tab.press_key("Enter").map_err(browser_err)?;

        Wait::new(self.login_timeout, COOKIE_POLL)
            .until(|| self.has_login_cookie())
            .map_err(|_| AuthError::Rejected(self.login_timeout))?;

        info!("Logged in as {}", credentials.username);
        Ok(())
    }

    fn fetch(&mut self, url: &str, ready: &str) -> Result<String, NavigationError> {
        let fail = |reason| NavigationError {
            url: url.to_string(),
            reason,
        };
        if self.is_closed() {
            return Err(fail(NavigationFailure::Closed));
        }

        debug!("Navigating to {}", url);
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| fail(NavigationFailure::Browser(format!("{:#}", e))))?;

        // Content is rendered client-side, so the document being loaded is not enough
        self.tab
            .wait_for_element_with_custom_timeout(ready, self.timeout)
            .map_err(|_| fail(NavigationFailure::Timeout(ready.to_string())))?;

        self.tab
            .get_content()
            .map_err(|e| fail(NavigationFailure::Browser(format!("{:#}", e))))
    }

    fn close(&mut self) {
        if let Some(browser) = self.browser.take() {
            let _ = self.tab.close(true);
            drop(browser);
            debug!("Browser closed");
        }
    }
}

fn browser_err<E: std::fmt::Display>(e: E) -> AuthError {
    AuthError::Browser(format!("{:#}", e))
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.close();
    }
}
