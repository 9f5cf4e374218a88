//! Reads the `config.ini` settings file.
//!
//! The file is a plain INI document: `[Section]` headers followed by
//! `key = value` lines. Section and key names are case-insensitive. Options
//! that are not recognized are ignored, so a shared config file may carry
//! extra keys.

use crate::error::ConfigError;
use crate::export::Format;
use crate::types;
use crate::util;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

const DEFAULT_RENDERER: &str = "wkhtmltopdf";
const DEFAULT_TIMEOUT: u64 = 10;

#[derive(Clone, Debug)]
pub struct Settings {
    pub login_url: Url,
    pub playlist_url: Url,
    pub download_dir: PathBuf,
    pub format: Format,
    pub credentials: PartialCredentials,
    pub browser: BrowserSettings,
}

/// Whatever part of the credentials the file provides. Missing fields are
/// prompted for before the browser starts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PartialCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BrowserSettings {
    pub headless: bool,
    /// Bound for every element wait: login form, playlist, tab content.
    pub timeout: Duration,
    /// Bound for the post-login confirmation.
    pub login_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        BrowserSettings {
            headless: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            login_timeout: Duration::from_secs(DEFAULT_TIMEOUT),
        }
    }
}

/// Lowercased `section -> key -> value` view of the file.
type Ini = HashMap<String, HashMap<String, String>>;

impl Settings {
    pub fn load(path: &Path) -> types::SettingsResult {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Settings::parse(&contents)
    }

    /// Build settings from the file `contents`. The download directory is
    /// created if needed and checked for writability before returning.
    ///
    /// # Errors
    /// - If a line is neither a section header, a comment nor `key = value`
    /// - If a required URL is missing or not an absolute URL
    /// - If a boolean or timeout option does not parse
    /// - If PDF export is selected and the renderer cannot be found
    /// - If the download directory cannot be created or written to
    pub fn parse(contents: &str) -> types::SettingsResult {
        let ini = read_ini(contents)?;

        let login_url = required_url(&ini, "URLs", "login_url")?;
        let playlist_url = required_url(&ini, "URLs", "playlist_url")?;

        let location = get(&ini, "Download", "location").unwrap_or(".");
        let download_dir = util::expand_path(location)
            .and_then(util::guarantee_dir_path)
            .map_err(|source| ConfigError::Directory {
                path: PathBuf::from(location),
                source,
            })?;

        let docx = match get(&ini, "Download", "docx") {
            Some(value) => parse_bool("Download", "docx", value)?,
            None => false,
        };
        let format = if docx {
            Format::Docx
        } else {
            let renderer = get(&ini, "PDFKit", "executable_path").unwrap_or(DEFAULT_RENDERER);
            Format::Pdf {
                renderer: resolve_renderer(renderer)?,
            }
        };

        let credentials = PartialCredentials {
            username: get(&ini, "Authentication", "username").map(String::from),
            password: get(&ini, "Authentication", "password").map(String::from),
        };

        let mut browser = BrowserSettings::default();
        if let Some(value) = get(&ini, "Browser", "headless") {
            browser.headless = parse_bool("Browser", "headless", value)?;
        }
        if let Some(value) = get(&ini, "Browser", "timeout") {
            browser.timeout = parse_seconds("Browser", "timeout", value)?;
        }
        if let Some(value) = get(&ini, "Browser", "login_timeout") {
            browser.login_timeout = parse_seconds("Browser", "login_timeout", value)?;
        }

        Ok(Settings {
            login_url,
            playlist_url,
            download_dir,
            format,
            credentials,
            browser,
        })
    }
}

fn read_ini(contents: &str) -> Result<Ini, ConfigError> {
    let mut ini = Ini::new();
    let mut section: Option<String> = None;

    for (i, line) in contents.lines().map(|l| l.trim()).enumerate() {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_lowercase();
            ini.entry(name.clone()).or_default();
            section = Some(name);
            continue;
        }

        // Whichever delimiter comes first, values may contain the other one
        let pair = line
            .find(['=', ':'])
            .map(|at| (&line[..at], &line[at + 1..]))
            .filter(|(key, _)| !key.trim().is_empty());

        match (pair, &section) {
            (Some((key, value)), Some(section)) => {
                ini.entry(section.clone())
                    .or_default()
                    .insert(key.trim().to_lowercase(), value.trim().to_string());
            }
            _ => {
                return Err(ConfigError::Syntax {
                    line: i + 1,
                    text: line.to_string(),
                })
            }
        }
    }

    for (section, keys) in &ini {
        for key in keys.keys() {
            if !is_known(section, key) {
                debug!("Ignoring unknown option '{}' in [{}]", key, section);
            }
        }
    }

    Ok(ini)
}

fn is_known(section: &str, key: &str) -> bool {
    matches!(
        (section, key),
        ("urls", "login_url" | "playlist_url")
            | ("download", "location" | "docx")
            | ("pdfkit", "executable_path")
            | ("authentication", "username" | "password")
            | ("browser", "headless" | "timeout" | "login_timeout")
    )
}

/// Empty values count as absent.
fn get<'a>(ini: &'a Ini, section: &str, key: &str) -> Option<&'a str> {
    ini.get(&section.to_lowercase())
        .and_then(|keys| keys.get(key))
        .map(|v| v.as_str())
        .filter(|v| !v.is_empty())
}

fn required_url(ini: &Ini, section: &'static str, key: &'static str) -> Result<Url, ConfigError> {
    let value = get(ini, section, key).ok_or(ConfigError::Missing { section, key })?;
    Url::parse(value).map_err(|e| ConfigError::Invalid {
        section,
        key,
        reason: format!("'{}' is not an absolute URL ({})", value, e),
    })
}

fn parse_bool(section: &'static str, key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            section,
            key,
            reason: format!("'{}' is not a boolean", value),
        }),
    }
}

fn parse_seconds(
    section: &'static str,
    key: &'static str,
    value: &str,
) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid {
            section,
            key,
            reason: format!("'{}' is not a positive number of seconds", value),
        }),
    }
}

/// Resolve the renderer either as a path or as a bare name looked up on `PATH`.
fn resolve_renderer(renderer: &str) -> Result<PathBuf, ConfigError> {
    let is_path = renderer.starts_with('~') || renderer.contains(['/', '\\']);
    let candidate = if is_path {
        util::expand_path(renderer).map_err(|e| ConfigError::Renderer {
            path: renderer.to_string(),
            reason: e.to_string(),
        })?
    } else {
        PathBuf::from(renderer)
    };
    which::which(&candidate).map_err(|e| ConfigError::Renderer {
        path: renderer.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ini(contents: &str) -> Ini {
        read_ini(contents).unwrap()
    }

    #[test]
    fn reads_sections_case_insensitively() {
        let ini = ini("[URLs]\nLogin_URL = https://a.example/login\n\n[Authentication]\nUsername: bob\n");
        assert_eq!(get(&ini, "URLs", "login_url"), Some("https://a.example/login"));
        assert_eq!(get(&ini, "Authentication", "username"), Some("bob"));
        assert_eq!(get(&ini, "Authentication", "password"), None);
    }

    #[test]
    fn skips_comments() {
        let ini = ini("# comment\n; another\n[Download]\n# location = nowhere\ndocx = yes\n");
        assert_eq!(get(&ini, "Download", "location"), None);
        assert_eq!(get(&ini, "Download", "docx"), Some("yes"));
    }

    #[test]
    fn keeps_equals_signs_in_values() {
        let ini = ini("[URLs]\nplaylist_url = https://a.example/view?id=42&x=1\n");
        assert_eq!(
            get(&ini, "URLs", "playlist_url"),
            Some("https://a.example/view?id=42&x=1")
        );
    }

    #[test]
    fn splits_on_first_delimiter() {
        let ini = ini("[URLs]\nlogin_url: https://a.example/login?next=/\n");
        assert_eq!(
            get(&ini, "URLs", "login_url"),
            Some("https://a.example/login?next=/")
        );
    }

    #[test]
    fn rejects_garbage_lines() {
        let err = read_ini("[URLs]\nthis is not an option\n").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { line: 2, .. }));
    }

    #[test]
    fn rejects_options_outside_sections() {
        assert!(read_ini("location = .\n").is_err());
    }

    #[test]
    fn parses_bools() {
        for value in ["1", "yes", "TRUE", "On"] {
            assert!(parse_bool("Download", "docx", value).unwrap());
        }
        for value in ["0", "no", "False", "OFF"] {
            assert!(!parse_bool("Download", "docx", value).unwrap());
        }
        assert!(parse_bool("Download", "docx", "maybe").is_err());
    }

    #[test]
    fn parses_timeouts() {
        assert_eq!(
            parse_seconds("Browser", "timeout", "5").unwrap(),
            Duration::from_secs(5)
        );
        assert!(parse_seconds("Browser", "timeout", "0").is_err());
        assert!(parse_seconds("Browser", "timeout", "-3").is_err());
        assert!(parse_seconds("Browser", "timeout", "soon").is_err());
    }

    #[test]
    fn requires_absolute_urls() {
        let ini = ini("[URLs]\nlogin_url = /login\n");
        assert!(matches!(
            required_url(&ini, "URLs", "login_url"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            required_url(&ini, "URLs", "playlist_url"),
            Err(ConfigError::Missing {
                key: "playlist_url",
                ..
            })
        ));
    }

    #[test]
    fn fails_on_missing_renderer() {
        assert!(matches!(
            resolve_renderer("/definitely/not/here/wkhtmltopdf"),
            Err(ConfigError::Renderer { .. })
        ));
    }

    #[test]
    fn hides_password_in_debug_output() {
        let credentials = Credentials {
            username: String::from("bob"),
            password: String::from("hunter2"),
        };
        let printed = format!("{:?}", credentials);
        assert!(printed.contains("bob"));
        assert!(!printed.contains("hunter2"));
    }
}
