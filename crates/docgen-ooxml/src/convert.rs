//! PDF conversion through a headless LibreOffice

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use bytes::Bytes;
use docgen_core::FileType;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{OoxmlError, Result};

/// Default executable looked up on `PATH`
pub const DEFAULT_SOFFICE: &str = "soffice";
/// Default limit for one conversion
pub const DEFAULT_CONVERSION_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings for the LibreOffice converter
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub soffice_path: PathBuf,
    pub timeout: Duration,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            soffice_path: PathBuf::from(DEFAULT_SOFFICE),
            timeout: DEFAULT_CONVERSION_TIMEOUT,
        }
    }
}

/// Convert `buffer` (a `.docx` or `.xlsx` file) to PDF.
///
/// Every call works in its own temporary directory with its own
/// LibreOffice profile, so conversions can run side by side.
pub async fn convert_to_pdf(
    config: &ConverterConfig,
    buffer: &[u8],
    source_type: FileType,
) -> Result<Bytes> {
    if !source_type.is_template_type() {
        return Err(OoxmlError::Conversion(format!(
            "cannot convert {} files",
            source_type
        )));
    }

    let workdir = tempfile::tempdir()?;
    let input = workdir
        .path()
        .join(format!("document.{}", source_type.extension()));
    let output = workdir.path().join("document.pdf");
    let profile = workdir.path().join("profile");

    tokio::fs::write(&input, buffer).await?;

    let started = Instant::now();
    let child = Command::new(&config.soffice_path)
        .arg(format!("-env:UserInstallation=file://{}", profile.display()))
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(workdir.path())
        .arg(&input)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            OoxmlError::Conversion(format!(
                "failed to start {}: {}",
                config.soffice_path.display(),
                e
            ))
        })?;

    let result = timeout(config.timeout, child.wait_with_output())
        .await
        .map_err(|_| {
            OoxmlError::Conversion(format!("timed out after {}s", config.timeout.as_secs()))
        })??;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(OoxmlError::Conversion(format!(
            "soffice exited with {}: {}",
            result.status,
            stderr.trim()
        )));
    }

    let pdf = tokio::fs::read(&output)
        .await
        .map_err(|_| OoxmlError::Conversion("soffice produced no PDF".to_string()))?;

    tracing::info!(
        source_type = %source_type,
        input_size = buffer.len(),
        output_size = pdf.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Converted document to PDF"
    );

    Ok(Bytes::from(pdf))
}
