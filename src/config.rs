//! Runtime settings.
//!
//! Layered with the `config` crate, later layers winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. `OSTOP_*` environment variables (e.g. `OSTOP_ENDPOINT`, `OSTOP_HISTORY`)
//! 4. command-line flags
//!
//! ```toml
//! endpoint = "https://search.internal:9200"
//! username = "admin"
//! interval = "10s"
//! history = 24
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, Map};
use serde::Deserialize;

use crate::data::duration::parse_duration;

const ENV_PREFIX: &str = "OSTOP";

/// Values given on the command line. `None` leaves lower layers in place.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Only `Some(true)` when the flag is passed.
    pub insecure: Option<bool>,
    pub interval: Option<String>,
    pub history: Option<u64>,
    pub log_file: Option<PathBuf>,
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub insecure: bool,
    /// Live monitor polling interval, e.g. "5s".
    pub interval: String,
    /// Data points kept by each live monitor.
    pub history: usize,
    /// Per-request HTTP timeout, e.g. "30s".
    pub request_timeout: String,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from all layers, reading the process environment.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::load_with_env(file, None, overrides)
    }

    /// Like [`Settings::load`], with an explicit environment map instead of
    /// the process environment when `env` is `Some`.
    pub fn load_with_env(
        file: Option<&Path>,
        env: Option<Map<String, String>>,
        overrides: &Overrides,
    ) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("insecure", false)?
            .set_default("interval", "5s")?
            .set_default("history", 12)?
            .set_default("request_timeout", "30s")?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("endpoint", overrides.endpoint.clone())?
            .set_override_option("region", overrides.region.clone())?
            .set_override_option("profile", overrides.profile.clone())?
            .set_override_option("username", overrides.username.clone())?
            .set_override_option("password", overrides.password.clone())?
            .set_override_option("insecure", overrides.insecure)?
            .set_override_option("interval", overrides.interval.clone())?
            .set_override_option("history", overrides.history)?
            .set_override_option(
                "log_file",
                overrides
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?;

        let settings: Settings = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        // Fail early on unparseable durations
        settings.interval()?;
        settings.request_timeout()?;
        Ok(settings)
    }

    /// The cluster URL.
    pub fn endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .context("No endpoint configured (use --endpoint or OSTOP_ENDPOINT)")
    }

    /// The live monitor polling interval. Zero is rejected.
    pub fn interval(&self) -> Result<Duration> {
        let interval = parse_duration(&self.interval).context("Invalid interval")?;
        if interval.is_zero() {
            bail!("Invalid interval: {:?} must be greater than zero", self.interval);
        }
        Ok(interval)
    }

    pub fn request_timeout(&self) -> Result<Duration> {
        parse_duration(&self.request_timeout).context("Invalid request_timeout")
    }

    /// Where logs go; the terminal belongs to the dashboard.
    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("ostop.log"))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_with_env(None, env(&[]), &Overrides::default()).unwrap();
        assert_eq!(settings.endpoint, None);
        assert!(!settings.insecure);
        assert_eq!(settings.interval().unwrap(), Duration::from_secs(5));
        assert_eq!(settings.request_timeout().unwrap(), Duration::from_secs(30));
        assert_eq!(settings.history, 12);
        assert!(settings.log_file().ends_with("ostop.log"));
        assert!(settings.endpoint().is_err());
    }

    #[test]
    fn test_file_layer() {
        let file = toml_file(
            r#"
            endpoint = "http://search:9200"
            username = "admin"
            password = "secret"
            interval = "10s"
            history = 24
            "#,
        );
        let settings =
            Settings::load_with_env(Some(file.path()), env(&[]), &Overrides::default()).unwrap();

        assert_eq!(settings.endpoint().unwrap(), "http://search:9200");
        assert_eq!(settings.username.as_deref(), Some("admin"));
        assert_eq!(settings.interval().unwrap(), Duration::from_secs(10));
        assert_eq!(settings.history, 24);
    }

    #[test]
    fn test_env_overrides_file_and_cli_overrides_env() {
        let file = toml_file(r#"endpoint = "http://from-file:9200""#);
        let vars = env(&[
            ("OSTOP_ENDPOINT", "http://from-env:9200"),
            ("OSTOP_HISTORY", "30"),
            ("OSTOP_INSECURE", "true"),
        ]);

        let settings =
            Settings::load_with_env(Some(file.path()), vars.clone(), &Overrides::default())
                .unwrap();
        assert_eq!(settings.endpoint().unwrap(), "http://from-env:9200");
        assert_eq!(settings.history, 30);
        assert!(settings.insecure);

        let overrides = Overrides {
            endpoint: Some("http://from-cli:9200".to_string()),
            history: Some(6),
            ..Default::default()
        };
        let settings = Settings::load_with_env(Some(file.path()), vars, &overrides).unwrap();
        assert_eq!(settings.endpoint().unwrap(), "http://from-cli:9200");
        assert_eq!(settings.history, 6);
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = Settings::load_with_env(
            Some(Path::new("/nonexistent/ostop.toml")),
            env(&[]),
            &Overrides::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_interval_is_error() {
        let overrides = Overrides {
            interval: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(Settings::load_with_env(None, env(&[]), &overrides).is_err());
    }

    #[test]
    fn test_zero_interval_is_error() {
        for zero in ["0s", "0ms"] {
            let overrides = Overrides {
                interval: Some(zero.to_string()),
                ..Default::default()
            };
            assert!(
                Settings::load_with_env(None, env(&[]), &overrides).is_err(),
                "{} accepted",
                zero
            );
        }

        let vars = env(&[("OSTOP_INTERVAL", "0s")]);
        assert!(Settings::load_with_env(None, vars, &Overrides::default()).is_err());
    }

    #[test]
    fn test_blank_endpoint_rejected() {
        let overrides = Overrides {
            endpoint: Some("  ".to_string()),
            ..Default::default()
        };
        let settings = Settings::load_with_env(None, env(&[]), &overrides).unwrap();
        assert!(settings.endpoint().is_err());
    }
}
