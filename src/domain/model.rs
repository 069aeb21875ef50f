use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, the key availability snapshots are fetched and tagged by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Maps a day number onto this month; `None` for days the month does not have.
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.day(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Every date of the month in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let month = *self;
        self.first_day()
            .into_iter()
            .flat_map(|first| first.iter_days())
            .take_while(move |date| month.contains(*date))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One entry of `GET /providers/{id}/month-availability`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityDay {
    pub day: u32,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilitySnapshot {
    pub month: MonthKey,
    pub days: Vec<AvailabilityDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appointment {
    pub id: String,
    pub datetime: NaiveDateTime,
    pub client_name: String,
    pub client_avatar_url: String,
}

impl Appointment {
    pub fn hour(&self) -> u32 {
        self.datetime.hour()
    }

    pub fn hour_formatted(&self) -> String {
        self.datetime.format("%H:%M").to_string()
    }
}

/// Wire shape of one entry of `GET /appointments/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentRecord {
    pub id: String,
    pub date: String,
    pub user: AppointmentUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentUser {
    pub name: String,
    pub avatar_url: Option<String>,
}

impl AppointmentRecord {
    /// Converts the record into `zone`'s wall-clock frame, the same frame the
    /// board's clock reads.
    pub fn into_appointment<Tz: TimeZone>(self, zone: &Tz) -> Option<Appointment> {
        let datetime = parse_timestamp(&self.date, zone)?;
        Some(Appointment {
            id: self.id,
            datetime,
            client_name: self.user.name,
            client_avatar_url: self.user.avatar_url.unwrap_or_default(),
        })
    }
}

/// Reads an ISO-8601 timestamp as wall-clock time in `zone`.
///
/// Timestamps carrying an offset (or `Z`) are converted into `zone`; naive
/// ones are taken to be in `zone` already.
pub fn parse_timestamp<Tz: TimeZone>(raw: &str, zone: &Tz) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(zone).naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleSelection {
    pub displayed_month: MonthKey,
    pub selected_date: NaiveDate,
}

/// Weekdays that are never selectable, whatever the availability says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekendRule {
    days: Vec<Weekday>,
}

impl WeekendRule {
    pub fn new(days: Vec<Weekday>) -> Self {
        let mut days = days;
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();
        Self { days }
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        self.days.contains(&date.weekday())
    }

    pub fn weekend_days(&self) -> &[Weekday] {
        &self.days
    }

    /// The complement of the rule, Monday first; the calendar's `available` modifier.
    pub fn working_days(&self) -> Vec<Weekday> {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .filter(|d| !self.days.contains(d))
        .collect()
    }
}

impl Default for WeekendRule {
    fn default() -> Self {
        Self::new(vec![Weekday::Sat, Weekday::Sun])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en")]
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pt-br" | "pt_br" | "pt" => Ok(Locale::PtBr),
            "en" | "en-us" | "en_us" | "en-gb" => Ok(Locale::En),
            other => Err(format!("unsupported locale '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_month_key_rejects_invalid_month() {
        assert!(MonthKey::new(2021, 13).is_none());
        assert!(MonthKey::new(2021, 0).is_none());
        assert_eq!(MonthKey::new(2021, 3).unwrap().to_string(), "2021-03");
    }

    #[test]
    fn test_month_dates_cover_whole_month() {
        let feb_leap = MonthKey::new(2024, 2).unwrap();
        assert_eq!(feb_leap.dates().count(), 29);
        let april = MonthKey::new(2021, 4).unwrap();
        assert_eq!(april.dates().count(), 30);
        assert!(april.day(31).is_none());
    }

    fn sao_paulo() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2021-03-15T09:30:00.000Z", &Utc), Some(expected));
        assert_eq!(parse_timestamp("2021-03-15T09:30:00-03:00", &sao_paulo()), Some(expected));
        assert_eq!(parse_timestamp("2021-03-15T09:30:00", &sao_paulo()), Some(expected));
        assert_eq!(parse_timestamp("2021-03-15T09:30", &Utc), Some(expected));
        assert_eq!(parse_timestamp("15/03/2021 09:30", &Utc), None);
    }

    #[test]
    fn test_utc_timestamp_is_converted_to_local_frame() {
        // 14:00 UTC is 11:00 in UTC-3, so the appointment belongs to the morning.
        let local = parse_timestamp("2021-03-15T14:00:00.000Z", &sao_paulo()).unwrap();
        assert_eq!(local.hour(), 11);
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2021, 3, 15).unwrap());

        // Late UTC evenings fall on the previous local day.
        let local = parse_timestamp("2021-03-16T01:30:00Z", &sao_paulo()).unwrap();
        assert_eq!(local, NaiveDate::from_ymd_opt(2021, 3, 15).unwrap().and_hms_opt(22, 30, 0).unwrap());
    }

    #[test]
    fn test_record_into_appointment() {
        let record: AppointmentRecord = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "date": "2021-03-15T14:05:00.000Z",
            "user": { "name": "Ana", "avatar_url": null }
        }))
        .unwrap();
        let appointment = record.into_appointment(&Utc).unwrap();
        assert_eq!(appointment.hour(), 14);
        assert_eq!(appointment.hour_formatted(), "14:05");
        assert_eq!(appointment.client_avatar_url, "");
    }

    #[test]
    fn test_weekend_rule_working_days() {
        let rule = WeekendRule::default();
        assert_eq!(
            rule.working_days(),
            vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
        );
        // 2021-03-13 is a Saturday.
        assert!(rule.is_weekend(NaiveDate::from_ymd_opt(2021, 3, 13).unwrap()));
        assert!(!rule.is_weekend(NaiveDate::from_ymd_opt(2021, 3, 15).unwrap()));
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!("pt-BR".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }
}
