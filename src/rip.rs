//! Rip a whole playlist: log in, list the tabs, export each one.

use crate::error::{Error, ExportError, ItemError};
use crate::export::Export;
use crate::extract::{self, TAB_READY};
use crate::playlist::{self, ItemRef, PLAYLIST_READY};
use crate::session::Session;
use crate::settings::{Credentials, Settings};
use std::io::{self, Write};
use std::path::PathBuf;
use tabwriter::TabWriter;
use tracing::{error, info, warn};

#[derive(Debug, Default)]
pub struct Report {
    pub exported: Vec<(ItemRef, PathBuf)>,
    /// Tabs that cannot be exported by design, e.g. pro tabs.
    pub skipped: Vec<(ItemRef, String)>,
    pub failed: Vec<(ItemRef, String)>,
}

impl Report {
    pub fn total(&self) -> usize {
        self.exported.len() + self.skipped.len() + self.failed.len()
    }

    fn record(&mut self, item: ItemRef, outcome: Result<PathBuf, ItemError>) {
        match outcome {
            Ok(path) => {
                info!("Saved '{}' to {}", item.label(), path.display());
                self.exported.push((item, path));
            }
            Err(e) if e.is_skip() => {
                warn!("Skipping '{}' ({}): {}", item.label(), item.url, e);
                self.skipped.push((item, e.to_string()));
            }
            Err(e) => {
                error!("Failed to download '{}' ({}): {}", item.label(), item.url, e);
                self.failed.push((item, e.to_string()));
            }
        }
    }

    /// Log the totals and list everything that did not make it.
    pub fn log(&self) {
        info!(
            "Finished: {} exported, {} failed, {} skipped",
            self.exported.len(),
            self.failed.len(),
            self.skipped.len()
        );
        if !self.failed.is_empty() {
            info!("Failed to download the following tabs:");
            for (item, _) in &self.failed {
                info!("  {}", item.url);
            }
        }
        if !self.skipped.is_empty() {
            info!("Skipped the following tabs:");
            for (item, _) in &self.skipped {
                info!("  {}", item.url);
            }
        }
    }

    /// Tab-aligned table with one row per item.
    pub fn table(&self) -> io::Result<String> {
        let mut tw = TabWriter::new(vec![]);
        writeln!(tw, "RESULT\tTAB\tDETAIL")?;
        for (item, path) in &self.exported {
            writeln!(tw, "saved\t{}\t{}", item.label(), path.display())?;
        }
        for (item, reason) in &self.skipped {
            writeln!(tw, "skipped\t{}\t{}", item.label(), reason)?;
        }
        for (item, reason) in &self.failed {
            writeln!(tw, "failed\t{}\t{}", item.label(), reason)?;
        }
        tw.flush()?;
        let bytes = tw
            .into_inner()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Run the whole playlist through `session` and `exporter`.
///
/// The session is closed exactly once before returning, whether the run
/// finished or failed.
pub fn rip<S: Session, E: Export>(
    settings: &Settings,
    credentials: &Credentials,
    session: &mut S,
    exporter: &mut E,
) -> Result<Report, Error> {
    let result = rip_open(settings, credentials, session, exporter);
    session.close();
    result
}

fn rip_open<S: Session, E: Export>(
    settings: &Settings,
    credentials: &Credentials,
    session: &mut S,
    exporter: &mut E,
) -> Result<Report, Error> {
    session.login(credentials)?;

    let html = session.fetch(settings.playlist_url.as_str(), PLAYLIST_READY)?;
    let items = playlist::enumerate(&html, &settings.playlist_url)?;

    let mut report = Report::default();
    if items.is_empty() {
        warn!("The playlist at {} is empty", settings.playlist_url);
        return Ok(report);
    }

    let total = items.len();
    info!("Found {} tabs", total);
    for (i, item) in items.into_iter().enumerate() {
        info!("Processing tab {}/{}: {}", i + 1, total, item.label());
        match rip_item(&item, session, exporter) {
            // Every remaining item would hit the same wall
            Err(ItemError::Export(e @ ExportError::Renderer { .. })) => {
                error!("Giving up at '{}' ({}): {}", item.label(), item.url, e);
                report.log();
                return Err(e.into());
            }
            outcome => report.record(item, outcome),
        }
    }

    Ok(report)
}

fn rip_item<S: Session, E: Export>(
    item: &ItemRef,
    session: &mut S,
    exporter: &mut E,
) -> Result<PathBuf, ItemError> {
    let html = session.fetch(&item.url, TAB_READY)?;
    let content = extract::extract(&html)?;
    Ok(exporter.export(&content)?)
}
