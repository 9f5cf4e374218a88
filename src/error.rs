//! Error kinds, one enum per stage of a run.
//!
//! Configuration, authentication and playlist failures are fatal and surface
//! as [`Error`]. Everything that can go wrong with a single tab is an
//! [`ItemError`], which the orchestrator logs and records without aborting.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("could not start browser: {0}")]
    Launch(String),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("could not open playlist: {0}")]
    Navigation(#[from] NavigationError),

    #[error("could not read playlist: {0}")]
    Playlist(#[from] ParseError),

    /// Only for failures no later item could avoid, such as a renderer that
    /// cannot be started.
    #[error("export stopped: {0}")]
    Export(#[from] ExportError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Usage(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: expected '[Section]' or 'key = value', found '{text}'")]
    Syntax { line: usize, text: String },

    #[error("missing option '{key}' in section [{section}]")]
    Missing {
        section: &'static str,
        key: &'static str,
    },

    #[error("invalid value for '{key}' in section [{section}]: {reason}")]
    Invalid {
        section: &'static str,
        key: &'static str,
        reason: String,
    },

    #[error("PDF renderer '{path}' not usable: {reason}")]
    Renderer { path: String, reason: String },

    #[error("download directory {path} is not usable: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("timed out waiting for {step}")]
    Form { step: &'static str },

    #[error("login was not confirmed within {0:?}, check the credentials")]
    Rejected(std::time::Duration),

    #[error("browser error: {0}")]
    Browser(String),
}

#[derive(Debug, Error)]
#[error("{url}: {reason}")]
pub struct NavigationError {
    pub url: String,
    pub reason: NavigationFailure,
}

#[derive(Debug, Error)]
pub enum NavigationFailure {
    #[error("timed out waiting for '{0}'")]
    Timeout(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("session is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("page does not have the expected structure: {0} not found")]
    Structure(&'static str),

    #[error("tab has no title")]
    MissingTitle,

    #[error("invalid selector '{0}'")]
    Selector(&'static str),

    #[error("invalid pattern '{0}'")]
    Pattern(&'static str),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unsupported tab: {0}")]
    Unsupported(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot run renderer {path}: {source}")]
    Renderer {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("renderer exited with {status}: {stderr}")]
    Render { status: String, stderr: String },

    #[error("cannot build document: {0}")]
    Docx(String),

    #[error("cannot write file: {0}")]
    Io(#[from] io::Error),
}

/// Failure of a single playlist item. Never aborts the run.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Unsupported(String),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<ExtractError> for ItemError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Parse(e) => Self::Parse(e),
            ExtractError::Unsupported(reason) => Self::Unsupported(reason),
        }
    }
}

impl ItemError {
    /// Unsupported items are skipped rather than counted as failures.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}
