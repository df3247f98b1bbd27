//! Tap configuration
//!
//! Settings come from one or more `--config` sources, merged left to right:
//! JSON files, or the literal `ENV` to read `TAP_PINGDOM_*` variables (after
//! the dotenv file has been sourced).

use crate::client::{DEFAULT_API_URL, default_user_agent};
use crate::schema::{ObjectSchema, string};

use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Context, Result, bail};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

/// Prefix of the environment variables read by `--config ENV`
pub const ENV_PREFIX: &str = "TAP_PINGDOM_";

const SETTINGS: [&str; 4] = ["token", "start_date", "api_url", "user_agent"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Env,
}

impl FromStr for ConfigSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ENV" => Self::Env,
            path => Self::File(PathBuf::from(path)),
        })
    }
}

#[derive(Clone)]
pub struct TapConfig {
    pub token: String,
    pub start_date: Option<DateTime<Utc>>,
    pub api_url: Url,
    pub user_agent: String,
}

impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("token", &"<redacted>")
            .field("start_date", &self.start_date)
            .field("api_url", &self.api_url.as_str())
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl TapConfig {
    /// Load and merge every source, then validate.
    pub fn load(sources: &[ConfigSource]) -> Result<Self> {
        let mut merged = Map::new();
        for source in sources {
            let values = match source {
                ConfigSource::File(path) => read_config_file(path)?,
                ConfigSource::Env => read_env(),
            };
            merged.extend(values);
        }
        Self::from_map(&merged)
    }

    /// Validate settings given as a JSON object.
    pub fn from_map(settings: &Map<String, Value>) -> Result<Self> {
        for key in settings.keys() {
            if !SETTINGS.contains(&key.as_str()) {
                log::warn!("Ignoring unknown setting '{}'", key);
            }
        }

        let token = match optional_string(settings, "token")? {
            Some(token) if !token.trim().is_empty() => token,
            _ => bail!(
                "Missing required setting 'token' (set it in a config file or {}TOKEN)",
                ENV_PREFIX
            ),
        };

        let start_date = optional_string(settings, "start_date")?
            .map(|s| parse_start_date(&s))
            .transpose()?;

        let api_url = match optional_string(settings, "api_url")? {
            Some(url) => Url::parse(&url).with_context(|| format!("Invalid api_url: {}", url))?,
            None => Url::parse(DEFAULT_API_URL)?,
        };

        let user_agent = optional_string(settings, "user_agent")?.unwrap_or_else(default_user_agent);

        Ok(Self {
            token,
            start_date,
            api_url,
            user_agent,
        })
    }

    /// Configured start date as unix seconds.
    pub fn start_timestamp(&self) -> Option<i64> {
        self.start_date.map(|d| d.timestamp())
    }
}

fn optional_string(settings: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match settings.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => bail!("Setting '{}' must be a string, got {}", key, other),
    }
}

fn read_config_file(path: &Path) -> Result<Map<String, Value>> {
    log::debug!("Reading config from {}", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("Config file must hold a JSON object: {}", path.display()),
    }
}

fn read_env() -> Map<String, Value> {
    SETTINGS
        .iter()
        .filter_map(|key| {
            let var = format!("{}{}", ENV_PREFIX, key.to_uppercase());
            std::env::var(&var)
                .ok()
                .map(|value| (key.to_string(), Value::String(value)))
        })
        .collect()
}

/// Parse an RFC 3339 datetime, or a bare `YYYY-MM-DD` date taken as midnight UTC.
pub fn parse_start_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    bail!("Invalid start_date '{}': expected RFC 3339 or YYYY-MM-DD", value)
}

/// JSON schema of the settings, as shown by `--about`.
pub fn settings_schema() -> Value {
    let mut schema = ObjectSchema::new()
        .required("token", string(), "API Token for Pingdom")
        .optional(
            "start_date",
            json!({"type": "string", "format": "date-time"}),
            "Earliest datetime to get data from",
        )
        .optional(
            "api_url",
            json!({"type": "string", "format": "uri"}),
            "Base URL of the Pingdom API",
        )
        .optional("user_agent", string(), "User-Agent header sent with every request")
        .build();
    schema["properties"]["token"]["secret"] = json!(true);
    schema["properties"]["token"]["title"] = json!("API Token");
    schema["properties"]["start_date"]["title"] = json!("Start Date");
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn clear_env() {
        for key in SETTINGS {
            // SAFETY: tests touching the environment run serially
            unsafe { std::env::remove_var(format!("{}{}", ENV_PREFIX, key.to_uppercase())) };
        }
    }

    #[test]
    fn test_minimal_config() {
        let file = config_file(r#"{"token": "abc"}"#);
        let config = TapConfig::load(&[ConfigSource::File(file.path().to_path_buf())]).unwrap();
        assert_eq!(config.token, "abc");
        assert_eq!(config.start_date, None);
        assert_eq!(config.api_url.as_str(), "https://api.pingdom.com/api/3.1");
        assert!(config.user_agent.starts_with("tap-pingdom/"));
    }

    #[test]
    fn test_later_sources_override_earlier() {
        let first = config_file(r#"{"token": "first", "start_date": "2024-01-01"}"#);
        let second = config_file(r#"{"token": "second"}"#);
        let config = TapConfig::load(&[
            ConfigSource::File(first.path().to_path_buf()),
            ConfigSource::File(second.path().to_path_buf()),
        ])
        .unwrap();
        assert_eq!(config.token, "second");
        assert_eq!(
            config.start_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_missing_token() {
        let err = TapConfig::from_map(&Map::new()).unwrap_err();
        assert!(err.to_string().contains("token"));

        let mut settings = Map::new();
        settings.insert("token".to_string(), json!(""));
        assert!(TapConfig::from_map(&settings).is_err());
    }

    #[test]
    fn test_wrong_types() {
        let mut settings = Map::new();
        settings.insert("token".to_string(), json!(123));
        let err = TapConfig::from_map(&settings).unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn test_invalid_file() {
        let file = config_file("[1, 2]");
        let err = TapConfig::load(&[ConfigSource::File(file.path().to_path_buf())]).unwrap_err();
        assert!(err.to_string().contains("JSON object"));

        let err = TapConfig::load(&[ConfigSource::File("/nonexistent.json".into())]).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_parse_start_date() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(parse_start_date("2025-03-04T05:06:07Z").unwrap(), expected);
        assert_eq!(parse_start_date("2025-03-04T07:06:07+02:00").unwrap(), expected);
        assert_eq!(parse_start_date("2025-03-04T05:06:07").unwrap(), expected);
        assert_eq!(
            parse_start_date("2025-03-04").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap()
        );
        assert!(parse_start_date("yesterday").is_err());
    }

    #[test]
    fn test_start_timestamp() {
        let mut settings = Map::new();
        settings.insert("token".to_string(), json!("abc"));
        settings.insert("start_date".to_string(), json!("1970-01-02T00:00:00Z"));
        let config = TapConfig::from_map(&settings).unwrap();
        assert_eq!(config.start_timestamp(), Some(86400));
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut settings = Map::new();
        settings.insert("token".to_string(), json!("super-secret"));
        let config = TapConfig::from_map(&settings).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_config_source_from_str() {
        assert_eq!("ENV".parse::<ConfigSource>().unwrap(), ConfigSource::Env);
        assert_eq!(
            "config.json".parse::<ConfigSource>().unwrap(),
            ConfigSource::File(PathBuf::from("config.json"))
        );
    }

    #[test]
    #[serial]
    fn test_env_source() {
        clear_env();
        // SAFETY: tests touching the environment run serially
        unsafe {
            std::env::set_var("TAP_PINGDOM_TOKEN", "from-env");
            std::env::set_var("TAP_PINGDOM_API_URL", "http://localhost:8080/api/3.1");
        }

        let config = TapConfig::load(&[ConfigSource::Env]).unwrap();
        assert_eq!(config.token, "from-env");
        assert_eq!(config.api_url.as_str(), "http://localhost:8080/api/3.1");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        let file = config_file(r#"{"token": "from-file", "start_date": "2024-06-01"}"#);
        // SAFETY: tests touching the environment run serially
        unsafe { std::env::set_var("TAP_PINGDOM_TOKEN", "from-env") };

        let config = TapConfig::load(&[
            ConfigSource::File(file.path().to_path_buf()),
            ConfigSource::Env,
        ])
        .unwrap();
        assert_eq!(config.token, "from-env");
        assert!(config.start_date.is_some());

        clear_env();
    }

    #[test]
    fn test_settings_schema() {
        let schema = settings_schema();
        assert_eq!(schema["required"], json!(["token"]));
        assert_eq!(schema["properties"]["token"]["secret"], json!(true));
        assert_eq!(schema["properties"]["start_date"]["format"], "date-time");
    }
}
