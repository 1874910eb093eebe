#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::Error;
use yansi::Paint;

use crate::application::cli;
use crate::application::cli::Task;
use crate::application::runner;

fn handle_error(err: Error) -> ! {
    eprintln!(
        "{}",
        Paint::red(format!(
            "chatprobe has failed with the following app version and error.\n\nVersion: {}\nError: {:#}",
            env!("CARGO_PKG_VERSION"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

fn log_dir() -> PathBuf {
    if let Ok(dir) = env::var("CHATPROBE_LOG_DIR") {
        return PathBuf::from(dir);
    }

    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("chatprobe");
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let mut log_guard = None;
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("chatprobe")
    {
        let file_appender = tracing_appender::rolling::never(log_dir(), "debug.log");
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
        log_guard = Some(guard);
    }

    let task = match cli::parse().await {
        Ok(Some(task)) => task,
        Ok(None) => process::exit(0),
        Err(err) => handle_error(err),
    };

    let res = match task {
        Task::Run => runner::start_run().await,
        Task::Serve => runner::start_serve().await,
    };

    if let Err(err) = res {
        handle_error(err);
    }

    drop(log_guard);
    process::exit(0);
}
