use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::ReportError;

/// Converts HTML markup into a printable document
pub trait DocumentBackend {
    fn render(&self, html: &str) -> std::result::Result<Vec<u8>, ReportError>;
}

/// Emits the markup unchanged; any browser can print it.
pub struct HtmlBackend;

impl DocumentBackend for HtmlBackend {
    fn render(&self, html: &str) -> std::result::Result<Vec<u8>, ReportError> {
        Ok(html.as_bytes().to_vec())
    }
}

/// Pipes the markup through an external converter (e.g. `wkhtmltopdf - -`)
/// that reads HTML on stdin and writes the document to stdout.
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    /// Build from a command line split into words; `None` if it is empty.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl DocumentBackend for CommandBackend {
    fn render(&self, html: &str) -> std::result::Result<Vec<u8>, ReportError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| ReportError::Rendering(format!("failed to start {}: {}", self.program, err)))?;

        // Feed stdin from a separate thread so a converter that streams its
        // output before consuming all input cannot deadlock on full pipes.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReportError::Rendering("converter stdin unavailable".to_string()))?;
        let input = html.as_bytes().to_vec();
        let writer = std::thread::spawn(move || stdin.write_all(&input));

        let output = child
            .wait_with_output()
            .map_err(|err| ReportError::Rendering(format!("{} failed: {}", self.program, err)))?;

        let sent = writer.join();

        if !output.status.success() {
            return Err(ReportError::Rendering(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        match sent {
            Ok(Ok(())) => Ok(output.stdout),
            Ok(Err(err)) => Err(ReportError::Rendering(format!(
                "failed to send markup to {}: {}",
                self.program, err
            ))),
            Err(_) => Err(ReportError::Rendering(format!(
                "failed to send markup to {}",
                self.program
            ))),
        }
    }
}

/// Pick the backend for an optional converter command line
pub fn backend_for(converter: Option<&[String]>) -> Box<dyn DocumentBackend> {
    match converter.and_then(CommandBackend::from_command) {
        Some(command) => Box::new(command),
        None => Box::new(HtmlBackend),
    }
}

/// Render `html` and write the result to `path`.
///
/// Nothing is written when rendering fails.
pub fn write_document(backend: &dyn DocumentBackend, html: &str, path: &Path) -> Result<()> {
    let bytes = backend.render(html)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    info!("Report written to: {}", path.display());
    Ok(())
}
