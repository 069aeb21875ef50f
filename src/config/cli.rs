use crate::config::toml_config::{TomlConfig, DEFAULT_TIMEOUT_SECONDS};
use crate::core::ConfigProvider;
use crate::domain::model::{Locale, WeekendRule};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use chrono::{FixedOffset, NaiveDate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TOKEN_ENV_VAR: &str = "SCHEDULE_BOARD_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "schedule-board")]
#[command(about = "Shows a provider's open days and the appointments of a chosen day")]
pub struct CliConfig {
    /// Base URL of the schedule API
    #[arg(long)]
    pub base_url: Option<String>,

    /// Provider whose month availability is shown
    #[arg(long)]
    pub provider_id: Option<String>,

    /// Bearer token; falls back to $SCHEDULE_BOARD_TOKEN
    #[arg(long)]
    pub token: Option<String>,

    /// Day to select (YYYY-MM-DD); today if omitted
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// TOML configuration file; command-line values override it
    #[arg(short, long)]
    pub config: Option<String>,

    /// Fixed UTC offset such as -03:00 for dates and times; local zone if omitted
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<String>,

    /// Label language (pt-BR or en)
    #[arg(long)]
    pub locale: Option<Locale>,

    /// Print the views as JSON
    #[arg(long)]
    pub json: bool,

    /// Keep running and re-render as appointments pass
    #[arg(long)]
    pub watch: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn resolved_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
            .filter(|t| !t.is_empty())
    }

    /// Loads the TOML file, if any, with command-line values taking precedence.
    pub fn merged_with_file(&self) -> Result<Option<TomlConfig>> {
        let Some(path) = &self.config else {
            return Ok(None);
        };
        let mut config = TomlConfig::from_file(path)?;

        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(provider_id) = &self.provider_id {
            config.api.provider_id = provider_id.clone();
        }
        if let Some(token) = self.resolved_token() {
            config.api.token = Some(token);
        }
        if let Some(offset) = &self.utc_offset {
            config.calendar.utc_offset = Some(offset.clone());
        }
        if let Some(locale) = self.locale {
            config.calendar.locale = Some(match locale {
                Locale::PtBr => "pt-BR".to_string(),
                Locale::En => "en".to_string(),
            });
        }
        Ok(Some(config))
    }
}

impl ConfigProvider for CliConfig {
    fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or_default()
    }

    fn provider_id(&self) -> &str {
        self.provider_id.as_deref().unwrap_or_default()
    }

    fn auth_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)
    }

    fn weekend_rule(&self) -> WeekendRule {
        WeekendRule::default()
    }

    fn locale(&self) -> Locale {
        self.locale.unwrap_or_default()
    }

    fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset
            .as_deref()
            .and_then(|raw| validation::parse_utc_offset("utc_offset", raw).ok())
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let base_url = validation::validate_required_field("base_url", &self.base_url)?;
        validation::validate_url("base_url", base_url)?;
        let provider_id = validation::validate_required_field("provider_id", &self.provider_id)?;
        validation::validate_path_segment("provider_id", provider_id)?;
        if let Some(raw) = &self.utc_offset {
            validation::parse_utc_offset("utc_offset", raw)?;
        }
        Ok(())
    }
}
