#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;

use std::future::Future;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use tokio::signal;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Credentials;
use crate::domain::models::Report;
use crate::domain::models::ReporterName;
use crate::domain::models::Script;
use crate::domain::services::ChatHarness;
use crate::domain::services::HarnessOptions;
use crate::domain::services::Reports;
use crate::infrastructure::launcher::DevServer;
use crate::infrastructure::reporters::ReporterManager;
use crate::infrastructure::transports::http::HttpTransport;

fn harness_options() -> Result<HarnessOptions> {
    return Ok(HarnessOptions {
        credentials: Credentials::new(
            &Config::get(ConfigKey::Username),
            &Config::get(ConfigKey::Password),
        ),
        message_delay: Duration::from_millis(Config::parse(ConfigKey::MessageDelay)?),
        final_check_delay: Duration::from_millis(Config::parse(ConfigKey::FinalCheckDelay)?),
        allow_login_failure: Config::parse(ConfigKey::AllowLoginFailure)?,
    });
}

async fn load_messages() -> Result<Vec<String>> {
    let script_file = Config::get(ConfigKey::ScriptFile);
    let script = if script_file.is_empty() {
        Script::default()
    } else {
        Script::load(Path::new(&script_file))
            .await
            .with_context(|| return format!("Failed to load script {script_file}"))?
    };

    let mut count = script.len();
    if !Config::get(ConfigKey::MessageCount).is_empty() {
        count = Config::parse(ConfigKey::MessageCount)?;
    }

    return Ok(script.take(count));
}

fn report_path() -> PathBuf {
    let report_file = Config::get(ConfigKey::ReportFile);
    if report_file.is_empty() {
        return Reports::default_path();
    }

    return PathBuf::from(report_file);
}

/// Runs the harness until it finishes or `shutdown` resolves, then writes the
/// report. An interrupted run still saves what it collected.
pub async fn execute<F: Future>(
    harness: &mut ChatHarness,
    messages: &[String],
    path: &Path,
    shutdown: F,
) -> Result<()> {
    let outcome = tokio::select! {
        res = harness.run(messages) => Some(res),
        _ = shutdown => None,
    };

    match outcome {
        Some(Ok(report)) => {
            Reports::write(&report, path).await?;
            harness.reporter().report_saved(path);
        }
        Some(Err(err)) => {
            // Login was required and failed. The empty report still records the attempt.
            let report = Report::build(harness.base_url(), harness.results());
            Reports::write(&report, path).await?;
            harness.reporter().report_saved(path);
            return Err(err.into());
        }
        None => {
            tracing::warn!(completed = harness.results().len(), "Run interrupted");
            harness.reporter().interrupted(harness.results().len());

            let report = Report::build(harness.base_url(), harness.results());
            match Reports::write(&report, path).await {
                Ok(()) => harness.reporter().report_saved(path),
                Err(err) => tracing::warn!(error = %err, "Failed to save partial report"),
            }
        }
    }

    return Ok(());
}

pub async fn start_run() -> Result<()> {
    let timeout = Duration::from_millis(Config::parse(ConfigKey::RequestTimeout)?);
    let transport = HttpTransport::new(&Config::get(ConfigKey::BaseURL), timeout)?;

    let reporter_name = Config::get(ConfigKey::Reporter);
    let reporter = ReporterManager::get(
        ReporterName::parse(reporter_name.to_string())
            .ok_or_else(|| return anyhow!("Unknown reporter {reporter_name}"))?,
    )?;

    let messages = load_messages().await?;
    let mut harness = ChatHarness::new(Box::new(transport), reporter, harness_options()?);

    return execute(&mut harness, &messages, &report_path(), signal::ctrl_c()).await;
}

pub async fn start_serve() -> Result<()> {
    let server = DevServer::new(
        PathBuf::from(Config::get(ConfigKey::AppDir)),
        Config::parse(ConfigKey::AppPort)?,
        &Config::get(ConfigKey::SessionSecret),
        &Config::get(ConfigKey::AppCommand),
    )?;

    return server.start().await;
}
