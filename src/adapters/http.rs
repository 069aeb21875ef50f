use crate::domain::model::{Appointment, AppointmentRecord, AvailabilityDay, MonthKey};
use crate::domain::ports::{ConfigProvider, ScheduleApi};
use crate::utils::error::{Result, ScheduleError};
use async_trait::async_trait;
use chrono::{Datelike, FixedOffset, Local, NaiveDate};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// `ScheduleApi` over the provider REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpScheduleApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
    /// Frame appointment times are read in; the machine's zone when unset.
    utc_offset: Option<FixedOffset>,
}

impl HttpScheduleApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ScheduleError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ScheduleError::InvalidConfigValueError {
                field: "base_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            token,
            utc_offset: None,
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let api = Self::new(
            config.base_url(),
            config.auth_token().map(str::to_string),
            config.request_timeout(),
        )?;
        Ok(api.with_utc_offset(config.utc_offset()))
    }

    /// Reads appointment times at a fixed offset instead of the machine's
    /// zone. Pair it with a clock using the same offset.
    pub fn with_utc_offset(mut self, offset: Option<FixedOffset>) -> Self {
        self.utc_offset = offset;
        self
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ScheduleError::ConfigError {
                message: format!("base URL {} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", url);
        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);
        if !status.is_success() {
            return Err(ScheduleError::HttpStatusError {
                endpoint: url.path().to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ScheduleError::DecodeError {
            endpoint: url.path().to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ScheduleApi for HttpScheduleApi {
    async fn month_availability(
        &self,
        provider_id: &str,
        month: MonthKey,
    ) -> Result<Vec<AvailabilityDay>> {
        let url = self.endpoint(
            &["providers", provider_id, "month-availability"],
            &[("year", month.year.to_string()), ("month", month.month.to_string())],
        )?;
        self.get_json(url).await
    }

    async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        let url = self.endpoint(
            &["appointments", "me"],
            &[
                ("year", date.year().to_string()),
                ("month", date.month().to_string()),
                ("day", date.day().to_string()),
            ],
        )?;
        let records: Vec<AppointmentRecord> = self.get_json(url.clone()).await?;

        records
            .into_iter()
            .map(|record| {
                let raw = record.date.clone();
                let appointment = match &self.utc_offset {
                    Some(offset) => record.into_appointment(offset),
                    None => record.into_appointment(&Local),
                };
                appointment.ok_or_else(|| ScheduleError::DecodeError {
                    endpoint: url.path().to_string(),
                    message: format!("invalid appointment date '{}'", raw),
                })
            })
            .collect()
    }
}
