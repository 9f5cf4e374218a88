//! Integration testing helper functions.

use scraper::{Html, Selector};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tabripper::error::{AuthError, NavigationError, NavigationFailure};
use tabripper::session::Session;
use tabripper::settings::{Credentials, Settings};
use tabripper::Config;

pub const PLAYLIST_URL: &str = "https://www.ultimate-guitar.com/user/playlist/view?id=1";
pub const TAB_URL: &str = "https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-chords-27596";
pub const PRO_URL: &str =
    "https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-guitar-pro-225536";
pub const MISSING_URL: &str =
    "https://tabs.ultimate-guitar.com/tab/rem/losing-my-religion-chords-10";
pub const USER_TAB_URL: &str = "https://tabs.ultimate-guitar.com/user/tab/view?h=abc";

pub fn setup(mut args: Vec<&str>) -> Result<Config, tabripper::error::Error> {
    args.insert(0, "tabripper");
    let args = args.into_iter().map(String::from);
    Config::build(args)
}

/// Run the `config`, answering prompts from `reader`.
pub fn run_with<R: BufRead>(config: Config, reader: R) -> Result<(), tabripper::error::Error> {
    tabripper::run(config, reader)
}

/// Run the `config` and use `io::stdin` for reading any user input.
pub fn run(config: Config) -> Result<(), tabripper::error::Error> {
    tabripper::run(config, io::stdin().lock())
}

fn get_resource_path() -> PathBuf {
    PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap())
        .join("resources")
        .join("test")
}

/// # Parameters
/// - `filename`: just the name of a file in the `resources/test` directory
pub fn resource(filename: &str) -> String {
    fs::read_to_string(get_resource_path().join(filename)).unwrap()
}

/// Write a config file into `dir` and return its path.
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("config.ini");
    fs::write(&path, contents).unwrap();
    path
}

/// DOCX settings downloading into `location`, so no renderer is needed.
pub fn docx_settings(location: &Path) -> Settings {
    Settings::parse(&format!(
        "[URLs]\n\
         login_url = https://www.ultimate-guitar.com/\n\
         playlist_url = {}\n\
         [Download]\n\
         location = {}\n\
         docx = true\n",
        PLAYLIST_URL,
        location.display()
    ))
    .unwrap()
}

pub fn credentials() -> Credentials {
    Credentials {
        username: String::from("strummer"),
        password: String::from("correct horse"),
    }
}

pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

/// Stand-in browser serving canned pages.
pub struct FakeSession {
    pages: HashMap<String, String>,
    accepted: Credentials,
    pub logged_in: bool,
    pub closed: usize,
    pub visited: Vec<String>,
}

impl FakeSession {
    pub fn new(accepted: Credentials) -> FakeSession {
        FakeSession {
            pages: HashMap::new(),
            accepted,
            logged_in: false,
            closed: 0,
            visited: Vec::new(),
        }
    }

    pub fn page(mut self, url: &str, resource_name: &str) -> FakeSession {
        self.pages.insert(url.to_string(), resource(resource_name));
        self
    }

    /// Serves the playlist and the tabs it links to, except `MISSING_URL`.
    pub fn with_playlist() -> FakeSession {
        FakeSession::new(credentials())
            .page(PLAYLIST_URL, "playlist.html")
            .page(TAB_URL, "tab.html")
            .page(PRO_URL, "pro_tab.html")
            .page(USER_TAB_URL, "tab.html")
    }
}

impl Session for FakeSession {
    fn login(&mut self, credentials: &Credentials) -> Result<(), AuthError> {
        if self.closed > 0 {
            return Err(AuthError::Browser(String::from("session is closed")));
        }
        if *credentials != self.accepted {
            return Err(AuthError::Rejected(Duration::from_secs(1)));
        }
        self.logged_in = true;
        Ok(())
    }

    fn fetch(&mut self, url: &str, ready: &str) -> Result<String, NavigationError> {
        self.visited.push(url.to_string());
        let fail = |reason| NavigationError {
            url: url.to_string(),
            reason,
        };
        if self.closed > 0 {
            return Err(fail(NavigationFailure::Closed));
        }

        let page = self
            .pages
            .get(url)
            .ok_or_else(|| fail(NavigationFailure::Timeout(ready.to_string())))?;
        let selector = Selector::parse(ready).unwrap();
        if Html::parse_document(page).select(&selector).next().is_none() {
            return Err(fail(NavigationFailure::Timeout(ready.to_string())));
        }
        Ok(page.clone())
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}
