use crate::core::ConfigProvider;
use crate::domain::model::{Locale, WeekendRule};
use crate::utils::error::{Result, ScheduleError};
use crate::utils::validation::{self, Validate};
use chrono::{FixedOffset, Weekday};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub provider_id: String,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Weekday names such as "sat" or "Sunday"; Saturday and Sunday if unset.
    pub weekend_days: Option<Vec<String>>,
    pub locale: Option<String>,
    /// Seconds between re-evaluations of the next appointment; off if unset.
    pub reevaluate_seconds: Option<u64>,
    /// Offset such as "-03:00" for the clock and appointment times; the
    /// machine's zone if unset.
    pub utc_offset: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScheduleError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScheduleError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn parse_weekend_days(&self) -> Result<Option<WeekendRule>> {
        let Some(names) = &self.calendar.weekend_days else {
            return Ok(None);
        };
        let days = names
            .iter()
            .map(|name| {
                name.parse::<Weekday>()
                    .map_err(|_| ScheduleError::InvalidConfigValueError {
                        field: "calendar.weekend_days".to_string(),
                        value: name.clone(),
                        reason: "Not a weekday name".to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(WeekendRule::new(days)))
    }

    fn parse_locale(&self) -> Result<Option<Locale>> {
        self.calendar
            .locale
            .as_deref()
            .map(|raw| {
                raw.parse::<Locale>()
                    .map_err(|reason| ScheduleError::InvalidConfigValueError {
                        field: "calendar.locale".to_string(),
                        value: raw.to_string(),
                        reason,
                    })
            })
            .transpose()
    }

    fn parse_utc_offset(&self) -> Result<Option<FixedOffset>> {
        self.calendar
            .utc_offset
            .as_deref()
            .map(|raw| validation::parse_utc_offset("calendar.utc_offset", raw))
            .transpose()
    }

    pub fn reevaluate_interval(&self) -> Option<Duration> {
        self.calendar
            .reevaluate_seconds
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_path_segment("api.provider_id", &self.api.provider_id)?;
        if let Some(timeout) = self.api.timeout_seconds {
            validation::validate_range("api.timeout_seconds", timeout, 1, 300)?;
        }
        if let Some(rule) = self.parse_weekend_days()? {
            if rule.working_days().is_empty() {
                return Err(ScheduleError::InvalidConfigValueError {
                    field: "calendar.weekend_days".to_string(),
                    value: format!("{:?}", self.calendar.weekend_days),
                    reason: "At least one working day is required".to_string(),
                });
            }
        }
        self.parse_locale()?;
        self.parse_utc_offset()?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        &self.api.base_url
    }

    fn provider_id(&self) -> &str {
        &self.api.provider_id
    }

    fn auth_token(&self) -> Option<&str> {
        self.api.token.as_deref().filter(|t| !t.is_empty())
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn weekend_rule(&self) -> WeekendRule {
        self.parse_weekend_days().ok().flatten().unwrap_or_default()
    }

    fn locale(&self) -> Locale {
        self.parse_locale().ok().flatten().unwrap_or_default()
    }

    fn utc_offset(&self) -> Option<FixedOffset> {
        self.parse_utc_offset().ok().flatten()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
