use crate::domain::model::{Appointment, AvailabilityDay, Locale, MonthKey, WeekendRule};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use std::time::Duration;

/// The two read-only endpoints the board consumes.
#[async_trait]
pub trait ScheduleApi: Send + Sync {
    async fn month_availability(
        &self,
        provider_id: &str,
        month: MonthKey,
    ) -> Result<Vec<AvailabilityDay>>;

    async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<Appointment>>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn provider_id(&self) -> &str;
    fn auth_token(&self) -> Option<&str>;
    fn request_timeout(&self) -> Duration;
    fn weekend_rule(&self) -> WeekendRule;
    fn locale(&self) -> Locale;

    /// Fixed frame for the clock and appointment times; the machine's zone
    /// when `None`.
    fn utc_offset(&self) -> Option<FixedOffset> {
        None
    }
}
