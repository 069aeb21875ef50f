use crate::core::store::{CommitOutcome, KeyedStore, LoadStatus, LoadTicket};
use crate::domain::model::{AvailabilityDay, AvailabilitySnapshot, MonthKey};
use crate::utils::error::Result;

/// Per-day availability for the displayed month.
#[derive(Debug, Default)]
pub struct AvailabilityStore {
    inner: KeyedStore<MonthKey, Vec<AvailabilityDay>>,
}

impl AvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&mut self, month: MonthKey) -> LoadTicket<MonthKey> {
        tracing::debug!("Requesting availability for {}", month);
        self.inner.begin(month)
    }

    pub fn commit(
        &mut self,
        ticket: LoadTicket<MonthKey>,
        result: Result<Vec<AvailabilityDay>>,
    ) -> CommitOutcome {
        let month = *ticket.key();
        let outcome = self.inner.commit(ticket, result);
        if outcome == CommitOutcome::Committed {
            tracing::info!(
                "Availability for {} loaded ({} unavailable days, v{})",
                month,
                self.snapshot_for(month)
                    .map(|s| s.days.iter().filter(|d| !d.available).count())
                    .unwrap_or(0),
                self.inner.version()
            );
        }
        outcome
    }

    /// The last committed snapshot, whichever month it belongs to.
    pub fn snapshot(&self) -> Option<AvailabilitySnapshot> {
        self.inner.current().map(|(month, days)| AvailabilitySnapshot {
            month: *month,
            days: days.clone(),
        })
    }

    /// The snapshot only if it was fetched for `month`; anything else is stale.
    pub fn snapshot_for(&self, month: MonthKey) -> Option<AvailabilitySnapshot> {
        self.inner.get(&month).map(|days| AvailabilitySnapshot {
            month,
            days: days.clone(),
        })
    }

    pub fn is_known(&self, month: MonthKey) -> bool {
        self.inner.get(&month).is_some()
    }

    pub fn status(&self) -> &LoadStatus {
        self.inner.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScheduleApi;
    use crate::utils::error::ScheduleError;

    fn march() -> MonthKey {
        MonthKey::new(2021, 3).unwrap()
    }

    fn april() -> MonthKey {
        MonthKey::new(2021, 4).unwrap()
    }

    #[test]
    fn test_snapshot_is_tagged_with_month() {
        let mut store = AvailabilityStore::new();
        let ticket = store.begin_load(march());
        let days = vec![AvailabilityDay { day: 15, available: false }];
        assert_eq!(store.commit(ticket, Ok(days.clone())), CommitOutcome::Committed);

        let snapshot = store.snapshot_for(march()).unwrap();
        assert_eq!(snapshot.month, march());
        assert_eq!(snapshot.days, days);
        assert!(store.snapshot_for(april()).is_none());
        assert!(!store.is_known(april()));
    }

    #[test]
    fn test_out_of_order_response_is_discarded() {
        let mut store = AvailabilityStore::new();
        let march_ticket = store.begin_load(march());
        let april_ticket = store.begin_load(april());

        let april_days = vec![AvailabilityDay { day: 1, available: true }];
        let march_days = vec![AvailabilityDay { day: 1, available: false }];
        assert_eq!(store.commit(april_ticket, Ok(april_days)), CommitOutcome::Committed);
        assert_eq!(store.commit(march_ticket, Ok(march_days)), CommitOutcome::Discarded);

        assert_eq!(store.snapshot().unwrap().month, april());
    }

    struct FixedMonthApi;

    #[async_trait::async_trait]
    impl ScheduleApi for FixedMonthApi {
        async fn month_availability(
            &self,
            provider_id: &str,
            _month: MonthKey,
        ) -> Result<Vec<AvailabilityDay>> {
            assert_eq!(provider_id, "p-1");
            Ok(vec![AvailabilityDay { day: 2, available: false }])
        }

        async fn appointments_on(
            &self,
            _date: chrono::NaiveDate,
        ) -> Result<Vec<crate::domain::model::Appointment>> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_fetched_days_commit_under_their_ticket() {
        let mut store = AvailabilityStore::new();
        let ticket = store.begin_load(march());
        let result = tokio_test::block_on(FixedMonthApi.month_availability("p-1", march()));

        assert_eq!(store.commit(ticket, result), CommitOutcome::Committed);
        assert_eq!(store.snapshot().unwrap().month, march());
        let snapshot = store.snapshot_for(march()).unwrap();
        assert_eq!(snapshot.days.len(), 1);
    }

    #[test]
    fn test_decode_failure_is_flagged() {
        let mut store = AvailabilityStore::new();
        let ticket = store.begin_load(march());
        store.commit(ticket, Ok(vec![]));

        let ticket = store.begin_load(april());
        let err = ScheduleError::DecodeError {
            endpoint: "month-availability".to_string(),
            message: "expected a sequence".to_string(),
        };
        assert_eq!(store.commit(ticket, Err(err)), CommitOutcome::Failed);
        assert!(store.status().is_failed());
        assert!(store.is_known(march()));
    }
}
