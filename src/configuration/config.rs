#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;
use std::str::FromStr;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Arg;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::ReporterName;
use crate::infrastructure::launcher::DEFAULT_SESSION_SECRET;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    AllowLoginFailure,
    AppCommand,
    AppDir,
    AppPort,
    BaseURL,
    ConfigFile,
    FinalCheckDelay,
    MessageCount,
    MessageDelay,
    Password,
    ReportFile,
    Reporter,
    RequestTimeout,
    ScriptFile,
    SessionSecret,
    Username,
}

pub struct Config {}

/// Every argument of a command tree, subcommands included.
fn all_arguments(cmd: &Command) -> Vec<&Arg> {
    let mut args = cmd.get_arguments().collect::<Vec<&Arg>>();
    for subcmd in cmd.get_subcommands() {
        args.extend(all_arguments(subcmd));
    }

    return args;
}

fn find_argument<'a>(cmd: &'a Command, key: ConfigKey) -> Option<&'a Arg> {
    return all_arguments(cmd)
        .into_iter()
        .find(|arg| return arg.get_id().as_str() == key.to_string());
}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    /// Parses a value, naming the key when it is malformed.
    pub fn parse<T: FromStr>(key: ConfigKey) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        let val = Config::get(key);
        return val
            .parse::<T>()
            .with_context(|| return format!("Invalid value for '{key}': {val}"));
    }

    pub fn default(key: ConfigKey) -> String {
        #[cfg(not(target_os = "macos"))]
        let config_path = dirs::config_dir()
            .unwrap_or_else(env::temp_dir)
            .join("chatprobe/config.toml");
        #[cfg(target_os = "macos")]
        let config_path = path::PathBuf::from(env::var("HOME").unwrap_or_default())
            .join(".config/chatprobe/config.toml");

        let default_reporter = ReporterName::Console.to_string();

        let res = match key {
            ConfigKey::AllowLoginFailure => "true",
            ConfigKey::AppCommand => "npm run dev",
            ConfigKey::AppDir => ".",
            ConfigKey::AppPort => "5000",
            ConfigKey::BaseURL => "http://localhost:5000",
            ConfigKey::FinalCheckDelay => "3000",
            ConfigKey::MessageCount => "",
            ConfigKey::MessageDelay => "2000",
            ConfigKey::Password => "admin",
            ConfigKey::ReportFile => "",
            ConfigKey::Reporter => default_reporter.as_str(),
            ConfigKey::RequestTimeout => "30000",
            ConfigKey::ScriptFile => "",
            ConfigKey::SessionSecret => DEFAULT_SESSION_SECRET,
            ConfigKey::Username => "admin",

            // Special
            ConfigKey::ConfigFile => return config_path.to_string_lossy().to_string(),
        };

        return res.to_string();
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(&config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let mut possible_values = vec![];
                    if let Some(arg) = find_argument(&cmd, key) {
                        possible_values = arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    }

                    if let Some(val_int) = val.as_integer() {
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_bool) = val.as_bool() {
                        Config::set(key, &val_bool.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                        }
                        Config::set(key, val_str);
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            base_url = Config::get(ConfigKey::BaseURL),
            username = Config::get(ConfigKey::Username),
            reporter = Config::get(ConfigKey::Reporter),
            message_count = Config::get(ConfigKey::MessageCount),
            message_delay = Config::get(ConfigKey::MessageDelay),
            allow_login_failure = Config::get(ConfigKey::AllowLoginFailure),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = find_argument(&cmd, key)?;
                let mut description = arg.get_help()?.to_string();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name().to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i64>().is_ok() || val.parse::<bool>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
