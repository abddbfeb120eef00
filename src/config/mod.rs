use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use serde::Deserialize;
use thiserror::Error;

const ENV_PREFIX: &str = "ROSTER_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// How the edit action treats the record being edited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EditMode {
    /// Edit the record where it is, keeping its id and position
    #[default]
    InPlace,
    /// Take the record out of the roster and add it back on save
    Replace,
}

/// Command line flags; anything given here wins over the environment
#[derive(Debug, Default, Parser)]
#[command(name = "client-roster", version, about = "Terminal client roster with birthday tracking")]
pub struct Cli {
    /// Edit policy for existing clients
    #[arg(long, value_enum)]
    pub edit_mode: Option<EditMode>,

    /// Start with an empty roster instead of the example clients
    #[arg(long)]
    pub no_seed: bool,

    /// Pretend the current date is this one (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<String>,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<String>,

    /// Log filter directive, e.g. `debug` or `client_roster=trace`
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub edit_mode: EditMode,
    /// Pre-seed the example clients
    #[serde(default = "default_seed")]
    pub seed: bool,
    /// Fixed current date, mostly useful for demos
    pub today: Option<String>,
    pub log_file: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_seed() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from `ROSTER_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_pairs(std::env::vars())
    }

    /// Load configuration from explicit key/value pairs instead of the process environment
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(pairs)?)
    }

    pub fn apply_cli(mut self, cli: Cli) -> Self {
        if let Some(mode) = cli.edit_mode {
            self.edit_mode = mode;
        }
        if cli.no_seed {
            self.seed = false;
        }
        if cli.today.is_some() {
            self.today = cli.today;
        }
        if cli.log_file.is_some() {
            self.log_file = cli.log_file;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }

    /// The configured fixed date, if any
    pub fn fixed_today(&self) -> Result<Option<NaiveDate>, ConfigError> {
        self.today
            .as_deref()
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| ConfigError::InvalidDate(raw.to_string()))
            })
            .transpose()
    }
}

/// Load `.env`, read the environment, then layer the command line on top
pub fn init(cli: Cli) -> Result<Config, ConfigError> {
    dotenv().ok();

    let config = Config::load()?.apply_cli(cli);
    config.fixed_today()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_pairs(Vec::new()).unwrap();

        assert_eq!(config.edit_mode, EditMode::InPlace);
        assert!(config.seed);
        assert_eq!(config.today, None);
        assert_eq!(config.log_file, None);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn reads_prefixed_variables() {
        let config = Config::from_pairs(pairs(&[
            ("ROSTER_EDIT_MODE", "replace"),
            ("ROSTER_SEED", "false"),
            ("ROSTER_TODAY", "2024-01-01"),
            ("ROSTER_LOG_LEVEL", "debug"),
            ("UNRELATED", "x"),
        ]))
        .unwrap();

        assert_eq!(config.edit_mode, EditMode::Replace);
        assert!(!config.seed);
        assert_eq!(
            config.fixed_today().unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn rejects_bad_date() {
        let config = Config::from_pairs(pairs(&[("ROSTER_TODAY", "01/01/2024")])).unwrap();

        assert!(matches!(
            config.fixed_today(),
            Err(ConfigError::InvalidDate(raw)) if raw == "01/01/2024"
        ));
    }

    #[test]
    fn command_line_overrides_environment() {
        let config = Config::from_pairs(pairs(&[
            ("ROSTER_EDIT_MODE", "replace"),
            ("ROSTER_LOG_FILE", "env.log"),
        ]))
        .unwrap();
        let cli = Cli::parse_from([
            "client-roster",
            "--edit-mode",
            "in-place",
            "--no-seed",
            "--today",
            "2030-12-24",
        ]);

        let config = config.apply_cli(cli);

        assert_eq!(config.edit_mode, EditMode::InPlace);
        assert!(!config.seed);
        assert_eq!(config.today.as_deref(), Some("2030-12-24"));
        assert_eq!(config.log_file.as_deref(), Some("env.log"));
    }
}
