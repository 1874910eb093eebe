#[cfg(test)]
#[path = "reports_test.rs"]
mod tests;

use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use tokio::fs;

use crate::domain::models::HarnessError;
use crate::domain::models::Report;

pub struct Reports {}

impl Reports {
    /// `chat-test-report-<unix seconds>.json` in the working directory.
    pub fn default_path() -> PathBuf {
        return PathBuf::from(format!("chat-test-report-{}.json", Utc::now().timestamp()));
    }

    /// Writes the report as pretty JSON, replacing any existing file.
    pub async fn write(report: &Report, path: &Path) -> Result<(), HarnessError> {
        let to_err = |source: std::io::Error| {
            return HarnessError::ReportWrite {
                path: path.to_path_buf(),
                source,
            };
        };

        let payload = serde_json::to_string_pretty(report).map_err(|err| return to_err(err.into()))?;
        fs::write(path, payload).await.map_err(to_err)?;

        tracing::info!(path = %path.display(), "Report saved");
        return Ok(());
    }

    pub async fn read(path: &Path) -> Result<Report> {
        let payload = fs::read_to_string(path).await?;
        let report: Report = serde_json::from_str(&payload)?;
        return Ok(report);
    }
}
