#[cfg(test)]
#[path = "console_test.rs"]
mod tests;

use std::path::Path;
use std::time::Duration;

use chrono::Local;
use yansi::Paint;

use crate::domain::models::ChatResult;
use crate::domain::models::HarnessError;
use crate::domain::models::Report;
use crate::domain::models::Reporter;
use crate::domain::models::ReporterName;
use crate::domain::models::Session;
use crate::domain::models::PREVIEW_LENGTH;

const RULE_WIDTH: usize = 50;

/// Color-coded progress output for people watching a run.
#[derive(Default)]
pub struct ConsoleReporter {}

fn clock() -> String {
    return Local::now().format("%H:%M:%S").to_string();
}

fn status_label(result: &ChatResult) -> String {
    return match result.status_code {
        Some(status) => status.to_string(),
        None => "no response".to_string(),
    };
}

pub fn format_result(result: &ChatResult) -> Vec<String> {
    if result.success {
        return vec![
            Paint::green(format!("✓ Reply received in {:.0}ms:", result.response_time)).to_string(),
            format!("   {}", result.preview(PREVIEW_LENGTH)),
        ];
    }

    return vec![Paint::red(format!(
        "✗ Failed ({}): {}",
        status_label(result),
        result.error.as_deref().unwrap_or("Unknown error")
    ))
    .to_string()];
}

/// Renders the end of run summary. Also used to display saved reports.
pub fn format_summary(report: &Report) -> Vec<String> {
    let mut lines = vec![
        Paint::new("TEST REPORT").bold().to_string(),
        Paint::new("=".repeat(RULE_WIDTH)).bold().to_string(),
        format!("Base URL: {}", report.base_url),
        format!("Finished: {}", report.timestamp),
        format!("Total messages: {}", report.total_messages),
        Paint::green(format!(
            "Successful: {} ({:.1}%)",
            report.successful_messages, report.success_rate
        ))
        .to_string(),
        Paint::red(format!(
            "Failed: {} ({:.1}%)",
            report.failed_messages, report.failure_rate
        ))
        .to_string(),
        format!("Average response time: {:.0}ms", report.avg_response_time),
        format!(
            "Average response length: {:.0} characters",
            report.avg_response_length
        ),
    ];

    if report.final_check_passed {
        lines.push(Paint::green("Final check: passed, the input still responds").to_string());
    } else {
        lines.push(Paint::red("Final check: failed").to_string());
    }

    let failures = report.failures();
    if !failures.is_empty() {
        lines.push("".to_string());
        lines.push(Paint::red("Failed messages:").to_string());
        for (idx, result) in failures.iter().enumerate() {
            lines.push(format!("  {}. \"{}\"", idx + 1, result.message));
            lines.push(format!(
                "     Error: {}",
                result.error.as_deref().unwrap_or("Unknown error")
            ));
            lines.push(format!("     Status code: {}", status_label(result)));
        }
    }

    if report.successful_messages > 0 {
        lines.push("".to_string());
        lines.push(Paint::cyan("Performance:").to_string());
        lines.push(format!("  Fastest response: {:.0}ms", report.min_response_time));
        lines.push(format!("  Slowest response: {:.0}ms", report.max_response_time));
        lines.push(format!(
            "  Variation: {:.0}ms",
            report.max_response_time - report.min_response_time
        ));
    }

    return lines;
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

impl Reporter for ConsoleReporter {
    fn name(&self) -> ReporterName {
        return ReporterName::Console;
    }

    fn run_started(&self, base_url: &str, username: &str, total: usize) {
        println!("{}", Paint::new("AUTOMATED CHAT TEST").bold());
        println!("{}", Paint::new("=".repeat(RULE_WIDTH)).bold());
        println!("Base URL: {base_url}");
        println!("Test user: {username}");
        println!("Messages: {total} (+1 final check)");
        println!();
        println!("{}", Paint::cyan(format!("[{}] Logging in...", clock())));
    }

    fn login_succeeded(&self, session: &Session) {
        let mut who = session.username.to_string();
        if let Some(role) = &session.role {
            who = format!("{who} ({role})");
        }

        println!("{}", Paint::green(format!("✓ Logged in as {who}")));
    }

    fn login_failed(&self, err: &HarnessError, fatal: bool) {
        println!("{}", Paint::red(format!("✗ {err}")));
        if fatal {
            println!("{}", Paint::red("Login is required, aborting the run."));
        } else {
            println!(
                "{}",
                Paint::yellow("Continuing without a session, demo mode accepts any traffic.")
            );
        }
    }

    fn message_sending(&self, sequence: usize, total: usize, text: &str) {
        println!();
        println!(
            "{}",
            Paint::blue(format!("[{}] [{sequence}/{total}] Sending: \"{text}\"", clock()))
        );
    }

    fn message_completed(&self, result: &ChatResult) {
        print_lines(format_result(result));
    }

    fn waiting(&self, delay: Duration) {
        println!(
            "{}",
            Paint::yellow(format!(
                "Waiting {}ms before the next message...",
                delay.as_millis()
            ))
        );
    }

    fn final_check_started(&self) {
        println!();
        println!(
            "{}",
            Paint::cyan(format!("[{}] Final check: does the chat still respond?", clock()))
        );
    }

    fn final_check_completed(&self, result: &ChatResult) {
        print_lines(format_result(result));
        if result.success {
            println!(
                "{}",
                Paint::green("✓ Input keeps working after multiple messages!")
            );
        } else {
            println!(
                "{}",
                Paint::red("✗ The chat stopped responding after multiple messages!")
            );
        }
    }

    fn report_ready(&self, report: &Report) {
        println!();
        print_lines(format_summary(report));
    }

    fn report_saved(&self, path: &Path) {
        println!();
        println!(
            "{}",
            Paint::green(format!("Report saved to {}", path.display()))
        );
    }

    fn interrupted(&self, completed: usize) {
        println!();
        println!(
            "{}",
            Paint::yellow(format!("Run interrupted after {completed} messages"))
        );
    }
}
