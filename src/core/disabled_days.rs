use crate::domain::model::{AvailabilitySnapshot, MonthKey, WeekendRule};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Dates the calendar must not let the user pick: the union of days flagged
/// unavailable and weekend days of the month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisabledDaySet {
    month: MonthKey,
    dates: BTreeSet<NaiveDate>,
    #[serde(skip)]
    weekend: WeekendRule,
}

impl DisabledDaySet {
    pub fn derive(snapshot: &AvailabilitySnapshot, weekend: &WeekendRule) -> Self {
        let mut set = Self::weekends_only(snapshot.month, weekend);

        for entry in snapshot.days.iter().filter(|d| !d.available) {
            match snapshot.month.day(entry.day) {
                Some(date) => {
                    set.dates.insert(date);
                }
                None => tracing::warn!(
                    "Ignoring availability for day {} which {} does not have",
                    entry.day,
                    snapshot.month
                ),
            }
        }

        set
    }

    /// The set for a month whose availability is not known yet.
    pub fn weekends_only(month: MonthKey, weekend: &WeekendRule) -> Self {
        let dates = month.dates().filter(|d| weekend.is_weekend(*d)).collect();
        Self {
            month,
            dates,
            weekend: weekend.clone(),
        }
    }

    /// Weekends are disabled in every month, not only the derived one.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.weekend.is_weekend(date) || self.dates.contains(&date)
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.dates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AvailabilityDay;
    use chrono::{Datelike, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn march_2021(days: Vec<AvailabilityDay>) -> AvailabilitySnapshot {
        AvailabilitySnapshot {
            month: MonthKey::new(2021, 3).unwrap(),
            days,
        }
    }

    #[test]
    fn test_unavailable_day_plus_weekends() {
        let snapshot = march_2021(vec![
            AvailabilityDay { day: 15, available: false },
            AvailabilityDay { day: 16, available: true },
        ]);
        let set = DisabledDaySet::derive(&snapshot, &WeekendRule::default());

        assert!(set.contains(date(2021, 3, 15)));
        assert!(!set.contains(date(2021, 3, 16)));

        // March 2021 has 4 Saturdays and 4 Sundays.
        let weekends: Vec<_> = set
            .dates()
            .filter(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .collect();
        assert_eq!(weekends.len(), 8);
        assert_eq!(set.dates().count(), 9);
    }

    #[test]
    fn test_available_weekend_stays_disabled() {
        // 2021-03-06 is a Saturday.
        let snapshot = march_2021(vec![AvailabilityDay { day: 6, available: true }]);
        let set = DisabledDaySet::derive(&snapshot, &WeekendRule::default());
        assert!(set.contains(date(2021, 3, 6)));
    }

    #[test]
    fn test_unavailable_weekend_is_not_duplicated() {
        let snapshot = march_2021(vec![AvailabilityDay { day: 6, available: false }]);
        let set = DisabledDaySet::derive(&snapshot, &WeekendRule::default());
        assert_eq!(set.dates().count(), 8);
    }

    #[test]
    fn test_every_derived_date_is_in_snapshot_month() {
        let month = MonthKey::new(2021, 4).unwrap();
        let snapshot = AvailabilitySnapshot {
            month,
            days: (1..=31)
                .map(|day| AvailabilityDay { day, available: day % 3 != 0 })
                .collect(),
        };
        let set = DisabledDaySet::derive(&snapshot, &WeekendRule::default());

        assert!(set.dates().all(|d| month.contains(*d)));
        assert!(!set.contains(date(2021, 5, 3)));
    }

    #[test]
    fn test_weekend_outside_month_is_still_rejected() {
        let set = DisabledDaySet::weekends_only(
            MonthKey::new(2021, 3).unwrap(),
            &WeekendRule::default(),
        );
        // 2021-04-03 is a Saturday.
        assert!(set.contains(date(2021, 4, 3)));
        assert!(!set.contains(date(2021, 4, 5)));
    }

    #[test]
    fn test_custom_weekend_rule() {
        let rule = WeekendRule::new(vec![Weekday::Fri, Weekday::Sat]);
        let set = DisabledDaySet::weekends_only(MonthKey::new(2021, 3).unwrap(), &rule);
        // 2021-03-05 is a Friday, 2021-03-07 a Sunday.
        assert!(set.contains(date(2021, 3, 5)));
        assert!(!set.contains(date(2021, 3, 7)));
    }
}
