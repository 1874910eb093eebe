#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ReporterName;
use crate::domain::services::Reports;
use crate::infrastructure::reporters::console;

/// Long running work selected on the command line.
#[derive(Debug, PartialEq, Eq)]
pub enum Task {
    Run,
    Serve,
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

async fn print_report(file: &str) -> Result<()> {
    let report = Reports::read(path::Path::new(file)).await?;
    for line in console::format_summary(&report) {
        println!("{line}");
    }

    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_report() -> Command {
    return Command::new("report")
        .about("Prints the summary of a saved report.")
        .arg(
            Arg::new("file")
                .help("Path to a report JSON file.")
                .required(true),
        );
}

fn arg_base_url() -> Arg {
    return Arg::new(ConfigKey::BaseURL.to_string())
        .value_name("BASE_URL")
        .env("CHATPROBE_BASE_URL")
        .num_args(1)
        .help(format!(
            "Base URL of the chat application. [default: {}]",
            Config::default(ConfigKey::BaseURL)
        ));
}

fn run_args() -> Vec<Arg> {
    return vec![
        arg_base_url(),
        Arg::new(ConfigKey::Username.to_string())
            .short('u')
            .long(ConfigKey::Username.to_string())
            .env("CHATPROBE_USERNAME")
            .num_args(1)
            .help(format!("Username to log in with. [default: {}]", Config::default(ConfigKey::Username))),
        Arg::new(ConfigKey::Password.to_string())
            .short('p')
            .long(ConfigKey::Password.to_string())
            .env("CHATPROBE_PASSWORD")
            .num_args(1)
            .help(format!("Password to log in with. [default: {}]", Config::default(ConfigKey::Password))),
        Arg::new(ConfigKey::MessageCount.to_string())
            .short('n')
            .long(ConfigKey::MessageCount.to_string())
            .env("CHATPROBE_MESSAGE_COUNT")
            .num_args(1)
            .help("Number of scripted messages to send, cycling through the script when larger. Defaults to the script length."),
        Arg::new(ConfigKey::MessageDelay.to_string())
            .short('d')
            .long(ConfigKey::MessageDelay.to_string())
            .env("CHATPROBE_MESSAGE_DELAY")
            .num_args(1)
            .help(format!("Pause in milliseconds between messages. [default: {}]", Config::default(ConfigKey::MessageDelay))),
        Arg::new(ConfigKey::FinalCheckDelay.to_string())
            .long(ConfigKey::FinalCheckDelay.to_string())
            .env("CHATPROBE_FINAL_CHECK_DELAY")
            .num_args(1)
            .help(format!("Pause in milliseconds before the final check message. [default: {}]", Config::default(ConfigKey::FinalCheckDelay))),
        Arg::new(ConfigKey::RequestTimeout.to_string())
            .long(ConfigKey::RequestTimeout.to_string())
            .env("CHATPROBE_REQUEST_TIMEOUT")
            .num_args(1)
            .help(format!("Time to wait in milliseconds before a request counts as failed. [default: {}]", Config::default(ConfigKey::RequestTimeout))),
        Arg::new(ConfigKey::ScriptFile.to_string())
            .long(ConfigKey::ScriptFile.to_string())
            .env("CHATPROBE_SCRIPT_FILE")
            .num_args(1)
            .help("Text file with one message per line, replacing the built in script."),
        Arg::new(ConfigKey::ReportFile.to_string())
            .short('o')
            .long(ConfigKey::ReportFile.to_string())
            .env("CHATPROBE_REPORT_FILE")
            .num_args(1)
            .help("Where to write the JSON report. Defaults to chat-test-report-<timestamp>.json."),
        Arg::new(ConfigKey::Reporter.to_string())
            .short('r')
            .long(ConfigKey::Reporter.to_string())
            .env("CHATPROBE_REPORTER")
            .num_args(1)
            .help(format!("How progress is displayed. [default: {}]", Config::default(ConfigKey::Reporter)))
            .value_parser(PossibleValuesParser::new(ReporterName::VARIANTS)),
        Arg::new(ConfigKey::AllowLoginFailure.to_string())
            .long(ConfigKey::AllowLoginFailure.to_string())
            .env("CHATPROBE_ALLOW_LOGIN_FAILURE")
            .num_args(1)
            .help(format!("Keep sending messages when login fails, for targets running in demo mode. [default: {}]", Config::default(ConfigKey::AllowLoginFailure)))
            .value_parser(PossibleValuesParser::new(["true", "false"])),
    ];
}

fn subcommand_run() -> Command {
    return Command::new("run")
        .about("Log in and run the scripted chat conversation. This is the default.")
        .args(run_args());
}

fn subcommand_serve() -> Command {
    return Command::new("serve")
        .about("Start the chat application's dev server in demo mode.")
        .arg(
            Arg::new(ConfigKey::AppDir.to_string())
                .long(ConfigKey::AppDir.to_string())
                .env("CHATPROBE_APP_DIR")
                .num_args(1)
                .help(format!("Directory of the chat application. [default: {}]", Config::default(ConfigKey::AppDir))),
        )
        .arg(
            Arg::new(ConfigKey::AppPort.to_string())
                .long(ConfigKey::AppPort.to_string())
                .env("CHATPROBE_APP_PORT")
                .num_args(1)
                .help(format!("Port the dev server binds to. [default: {}]", Config::default(ConfigKey::AppPort))),
        )
        .arg(
            Arg::new(ConfigKey::AppCommand.to_string())
                .long(ConfigKey::AppCommand.to_string())
                .env("CHATPROBE_APP_COMMAND")
                .num_args(1)
                .help(format!("Command starting the dev server. [default: {}]", Config::default(ConfigKey::AppCommand))),
        )
        .arg(
            Arg::new(ConfigKey::SessionSecret.to_string())
                .long(ConfigKey::SessionSecret.to_string())
                .env("CHATPROBE_SESSION_SECRET")
                .num_args(1)
                .help(format!("SESSION_SECRET handed to the dev server. [default: {}]", Config::default(ConfigKey::SessionSecret))),
        );
}

pub fn build() -> Command {
    return Command::new("chatprobe")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(false)
        .args(run_args())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("CHATPROBE_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .subcommand(subcommand_run())
        .subcommand(subcommand_serve())
        .subcommand(subcommand_report())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config());
}

/// Handles one-shot subcommands directly and loads configuration for the rest.
/// Returns the task to run, if any.
pub async fn dispatch(matches: ArgMatches) -> Result<Option<Task>> {
    match matches.subcommand() {
        Some(("run", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(Some(Task::Run));
        }
        Some(("serve", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(Some(Task::Serve));
        }
        Some(("report", subcmd_matches)) => {
            if let Some(file) = subcmd_matches.get_one::<String>("file") {
                print_report(file).await?;
            }
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
            }
            _ => {
                subcommand_config().print_long_help()?;
            }
        },
        _ => {
            Config::load(build(), vec![&matches]).await?;
            return Ok(Some(Task::Run));
        }
    }

    return Ok(None);
}

pub async fn parse() -> Result<Option<Task>> {
    return dispatch(build().get_matches()).await;
}
