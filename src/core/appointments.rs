use crate::core::store::{CommitOutcome, KeyedStore, LoadStatus, LoadTicket};
use crate::domain::model::Appointment;
use crate::utils::error::Result;
use chrono::NaiveDate;
use std::sync::Arc;

/// Appointments of the selected date, shared read-only with the views built
/// from them.
#[derive(Debug, Default)]
pub struct AppointmentStore {
    inner: KeyedStore<NaiveDate, Arc<[Appointment]>>,
}

impl AppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&mut self, date: NaiveDate) -> LoadTicket<NaiveDate> {
        tracing::debug!("Requesting appointments for {}", date);
        self.inner.begin(date)
    }

    pub fn commit(
        &mut self,
        ticket: LoadTicket<NaiveDate>,
        result: Result<Vec<Appointment>>,
    ) -> CommitOutcome {
        let date = *ticket.key();
        let outcome = self.inner.commit(ticket, result.map(Arc::from));
        if outcome == CommitOutcome::Committed {
            tracing::info!(
                "Loaded {} appointments for {} (v{})",
                self.appointments_on(date).map(|a| a.len()).unwrap_or(0),
                date,
                self.inner.version()
            );
        }
        outcome
    }

    pub fn current(&self) -> Option<(NaiveDate, Arc<[Appointment]>)> {
        self.inner
            .current()
            .map(|(date, list)| (*date, Arc::clone(list)))
    }

    pub fn appointments_on(&self, date: NaiveDate) -> Option<Arc<[Appointment]>> {
        self.inner.get(&date).cloned()
    }

    pub fn status(&self) -> &LoadStatus {
        self.inner.status()
    }
}
