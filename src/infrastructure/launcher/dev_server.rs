#[cfg(test)]
#[path = "dev_server_test.rs"]
mod tests;

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use tokio::process::Command;
use tokio::signal;
use yansi::Paint;

pub const DEFAULT_SESSION_SECRET: &str = "auraliscommunication";

/// Starts the chat web application in demo mode, where any login is accepted.
pub struct DevServer {
    app_dir: PathBuf,
    port: u16,
    session_secret: String,
    program: String,
    args: Vec<String>,
}

impl DevServer {
    pub fn new(app_dir: PathBuf, port: u16, session_secret: &str, command: &str) -> Result<DevServer> {
        let mut parts = command.split_whitespace().map(|part| return part.to_string());
        let program = match parts.next() {
            Some(program) => program,
            None => bail!("App command is empty"),
        };

        return Ok(DevServer {
            app_dir,
            port,
            session_secret: session_secret.to_string(),
            program,
            args: parts.collect(),
        });
    }

    pub fn url(&self) -> String {
        return format!("http://localhost:{}", self.port);
    }

    /// Environment overrides applied on top of the inherited environment.
    pub fn env(&self) -> Vec<(String, String)> {
        return vec![
            ("DEMO_MODE".to_string(), "true".to_string()),
            ("SESSION_SECRET".to_string(), self.session_secret.to_string()),
            ("NODE_ENV".to_string(), "development".to_string()),
            ("PORT".to_string(), self.port.to_string()),
        ];
    }

    fn command_line(&self) -> String {
        let mut parts = vec![self.program.as_str()];
        parts.extend(self.args.iter().map(|arg| return arg.as_str()));
        return parts.join(" ");
    }

    fn print_banner(&self) {
        let rule = "=".repeat(48);
        println!("{}", Paint::new(&rule).bold());
        println!("{}", Paint::new("STARTING CHAT SERVER IN DEMO MODE").bold());
        println!("{}", Paint::new(&rule).bold());
        println!();
        println!("{}", Paint::green("Any login works, for example:"));
        println!("   - admin/admin");
        println!("   - user/user");
        println!("   - or any other combination!");
        println!();
        println!("URL: {}", self.url());
        println!("Command: {}", self.command_line());
        println!("{}", Paint::new(&rule).bold());
        println!();
    }

    /// Runs the server until it exits or `shutdown` resolves. A shutdown kills
    /// the server and counts as a clean stop.
    pub async fn run_until<F: Future>(&self, shutdown: F) -> Result<()> {
        self.print_banner();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.app_dir)
            .envs(self.env())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| return format!("Failed to start `{}`", self.command_line()))?;

        tracing::info!(pid = ?child.id(), command = %self.command_line(), "Dev server started");

        let exit = tokio::select! {
            status = child.wait() => Some(status?),
            _ = shutdown => None,
        };

        match exit {
            Some(status) if status.success() => {
                tracing::info!("Dev server exited");
            }
            Some(status) => {
                tracing::error!(%status, "Dev server failed");
                bail!(format!("Dev server exited with {status}"));
            }
            None => {
                child.kill().await?;
                tracing::info!("Dev server stopped by the operator");
                println!();
                println!("{}", Paint::yellow("Server stopped by user"));
            }
        }

        return Ok(());
    }

    pub async fn start(&self) -> Result<()> {
        return self.run_until(signal::ctrl_c()).await;
    }
}
