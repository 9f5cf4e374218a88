//! Write an extracted tab to the download directory as PDF or DOCX.

use crate::error::ExportError;
use crate::extract::TabContent;
use crate::text::TabText;
use crate::util;
use docx_rs::{Docx, LineSpacing, Paragraph, Run, RunFonts};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

const MONOSPACE: &str = "Courier New";
/// Font sizes are in half-points.
const TITLE_SIZE: usize = 32;
const HEADING_SIZE: usize = 24;
const BODY_SIZE: usize = 20;

#[derive(Clone, Debug, PartialEq)]
pub enum Format {
    /// Rendered by an external wkhtmltopdf-compatible binary.
    Pdf { renderer: PathBuf },
    Docx,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Pdf { .. } => "pdf",
            Format::Docx => "docx",
        }
    }
}

/// Turns extracted tabs into files. The orchestrator only talks to this, so
/// tests can stand in for the real exporter.
pub trait Export {
    /// Write `content` and return the path of the new file.
    fn export(&mut self, content: &TabContent) -> Result<PathBuf, ExportError>;
}

pub struct Exporter {
    format: Format,
    dir: PathBuf,
}

impl Exporter {
    pub fn new(format: Format, dir: PathBuf) -> Exporter {
        Exporter { format, dir }
    }
}

impl Export for Exporter {
    fn export(&mut self, content: &TabContent) -> Result<PathBuf, ExportError> {
        let bytes = match &self.format {
            Format::Pdf { renderer } => render_pdf(renderer, content)?,
            Format::Docx => build_docx(&TabText::from_content(content))?,
        };
        write_unique(&self.dir, &content.title, self.format.extension(), &bytes)
    }
}

/// Write `bytes` to a fresh file, never replacing an existing one.
fn write_unique(dir: &Path, stem: &str, ext: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    let (mut file, path) = util::create_unique(dir, stem, ext)?;
    if let Err(e) = file.write_all(bytes).and_then(|_| file.sync_all()) {
        let _ = std::fs::remove_file(&path);
        return Err(e.into());
    }
    Ok(path)
}

/// Complete HTML document around the extracted fragment, so the renderer
/// does not guess the encoding.
fn html_document(content: &TabContent) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>pre {{ font-family: monospace; white-space: pre; }}</style>\
         </head><body>{}</body></html>",
        escape(&content.title),
        content.html()
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Pipe the page through the renderer, reading the PDF back from its stdout.
fn render_pdf(renderer: &Path, content: &TabContent) -> Result<Vec<u8>, ExportError> {
    let mut child = Command::new(renderer)
        .args(["--quiet", "--encoding", "utf-8", "-", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ExportError::Renderer {
            path: renderer.to_path_buf(),
            source,
        })?;

    // Written from another thread so a full stdout pipe cannot block us
    let html = html_document(content);
    let stdin = child.stdin.take();
    let writer = thread::spawn(move || -> std::io::Result<()> {
        if let Some(mut stdin) = stdin {
            stdin.write_all(html.as_bytes())?;
        }
        Ok(())
    });

    let mut pdf = Vec::new();
    if let Some(mut stdout) = child.stdout.take() {
        stdout.read_to_end(&mut pdf)?;
    }
    let output = child.wait_with_output()?;
    let written = writer.join().unwrap_or_else(|_| {
        Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "renderer input thread panicked",
        ))
    });

    if !output.status.success() {
        return Err(ExportError::Render {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    written?;

    debug!("Rendered {} bytes of PDF for '{}'", pdf.len(), content.title);
    Ok(pdf)
}

/// Headings first, then every tab line as its own monospace paragraph so
/// columns stay where the tab put them.
pub fn build_docx(text: &TabText) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new();

    let mut heading = text.heading.iter();
    if let Some(title) = heading.next() {
        docx = docx.add_paragraph(
            Paragraph::new().add_run(Run::new().add_text(title).bold().size(TITLE_SIZE)),
        );
    }
    for line in heading {
        docx = docx.add_paragraph(
            Paragraph::new().add_run(Run::new().add_text(line).bold().size(HEADING_SIZE)),
        );
    }
    if !text.heading.is_empty() {
        docx = docx.add_paragraph(Paragraph::new());
    }

    for line in &text.body {
        let mut paragraph = Paragraph::new().line_spacing(LineSpacing::new().before(0).after(0));
        if !line.is_empty() {
            paragraph = paragraph.add_run(
                Run::new()
                    .add_text(line)
                    .fonts(
                        RunFonts::new()
                            .ascii(MONOSPACE)
                            .hi_ansi(MONOSPACE)
                            .cs(MONOSPACE)
                            .east_asia(MONOSPACE),
                    )
                    .size(BODY_SIZE),
            );
        }
        docx = docx.add_paragraph(paragraph);
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(buffer.into_inner())
}
