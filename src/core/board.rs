use crate::core::appointments::AppointmentStore;
use crate::core::availability::AvailabilityStore;
use crate::core::disabled_days::DisabledDaySet;
use crate::core::labels;
use crate::core::partition::{Partition, PartitionIndex};
use crate::core::selection::{DayModifiers, SelectionController};
use crate::core::store::{CommitOutcome, LoadStatus, LoadTicket};
use crate::core::{Clock, ConfigProvider, ScheduleApi};
use crate::domain::model::{Appointment, Locale, MonthKey, ScheduleSelection, WeekendRule};
use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct BoardSettings {
    pub weekend: WeekendRule,
    pub locale: Locale,
}

impl BoardSettings {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            weekend: config.weekend_rule(),
            locale: config.locale(),
        }
    }
}

struct BoardState {
    selection: SelectionController,
    availability: AvailabilityStore,
    appointments: AppointmentStore,
    disabled: DisabledDaySet,
    partition: PartitionIndex,
}

/// The schedule-state engine: owns the selection and both stores and keeps
/// the derived disabled-day set and partition in step with them.
///
/// State sits behind a mutex that is never held across a fetch, so handlers
/// can run concurrently on one runtime; each store's request generation
/// decides which response is allowed to land.
pub struct ScheduleBoard<A, K> {
    api: A,
    clock: K,
    provider_id: String,
    settings: BoardSettings,
    state: Mutex<BoardState>,
}

impl<A: ScheduleApi, K: Clock> ScheduleBoard<A, K> {
    pub fn new(api: A, clock: K, provider_id: impl Into<String>, settings: BoardSettings) -> Self {
        let today = clock.today();
        let selection = SelectionController::new(today);
        let month = selection.selection().displayed_month;
        let state = BoardState {
            disabled: DisabledDaySet::weekends_only(month, &settings.weekend),
            selection,
            availability: AvailabilityStore::new(),
            appointments: AppointmentStore::new(),
            partition: PartitionIndex::default(),
        };

        Self {
            api,
            clock,
            provider_id: provider_id.into(),
            settings,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads availability for the displayed month and appointments for the
    /// selected date, as on first render.
    pub async fn initialize(&self) {
        let (month_ticket, day_ticket) = {
            let mut state = self.state();
            let selection = state.selection.selection();
            (
                state.availability.begin_load(selection.displayed_month),
                state.appointments.begin_load(selection.selected_date),
            )
        };
        tracing::info!(
            "Initializing board for {} (selected {})",
            month_ticket.key(),
            day_ticket.key()
        );
        tokio::join!(
            self.fetch_availability(month_ticket),
            self.fetch_appointments(day_ticket)
        );
    }

    pub fn selection(&self) -> ScheduleSelection {
        self.state().selection.selection()
    }

    pub fn disabled_days(&self) -> DisabledDaySet {
        self.state().disabled.clone()
    }

    /// Month-changed handler of the calendar widget.
    pub async fn change_month(&self, month: MonthKey) -> CommitOutcome {
        let ticket = {
            let mut state = self.state();
            state.selection.on_month_change(month);
            // Until the new month's snapshot lands only the weekend rule applies.
            state.disabled = match state.availability.snapshot_for(month) {
                Some(snapshot) => DisabledDaySet::derive(&snapshot, &self.settings.weekend),
                None => DisabledDaySet::weekends_only(month, &self.settings.weekend),
            };
            state.availability.begin_load(month)
        };
        self.fetch_availability(ticket).await
    }

    /// Re-fetches the displayed month, e.g. after a failed load.
    pub async fn refresh_availability(&self) -> CommitOutcome {
        let ticket = {
            let mut state = self.state();
            let month = state.selection.selection().displayed_month;
            state.availability.begin_load(month)
        };
        self.fetch_availability(ticket).await
    }

    /// Tickets are issued under the same lock as the selection they serve, so
    /// the latest ticket always belongs to the latest displayed month.
    async fn fetch_availability(&self, ticket: LoadTicket<MonthKey>) -> CommitOutcome {
        let month = *ticket.key();
        let result = self.api.month_availability(&self.provider_id, month).await;

        let mut state = self.state();
        let outcome = state.availability.commit(ticket, result);
        if outcome == CommitOutcome::Committed && state.selection.selection().displayed_month == month
        {
            if let Some(snapshot) = state.availability.snapshot_for(month) {
                state.disabled = DisabledDaySet::derive(&snapshot, &self.settings.weekend);
                tracing::debug!("{} disabled days in {}", state.disabled.dates().count(), month);
            }
        }
        outcome
    }

    /// Applies `candidate` if it is selectable and loads its appointments.
    /// Returns whether the selection was applied; re-selecting the current
    /// date is accepted without a reload.
    pub async fn select_date(&self, candidate: NaiveDate) -> bool {
        self.apply_selection(candidate, |selection, disabled| {
            selection.try_select(candidate, disabled)
        })
        .await
    }

    /// Day-clicked handler of the calendar widget.
    pub async fn day_clicked(&self, candidate: NaiveDate, modifiers: DayModifiers) -> bool {
        self.apply_selection(candidate, |selection, disabled| {
            selection.day_clicked(candidate, modifiers, disabled)
        })
        .await
    }

    async fn apply_selection<F>(&self, candidate: NaiveDate, decide: F) -> bool
    where
        F: FnOnce(&mut SelectionController, &DisabledDaySet) -> bool,
    {
        let ticket = {
            let mut guard = self.state();
            let state = &mut *guard;
            let previous = state.selection.selection().selected_date;

            // A candidate outside the displayed month is still checked against
            // the retained snapshot when that snapshot covers its month.
            let candidate_month = MonthKey::of(candidate);
            let retained = if state.disabled.month() == candidate_month {
                None
            } else {
                state
                    .availability
                    .snapshot()
                    .filter(|snapshot| snapshot.month == candidate_month)
                    .map(|snapshot| DisabledDaySet::derive(&snapshot, &self.settings.weekend))
            };
            let disabled = retained.as_ref().unwrap_or(&state.disabled);

            if !decide(&mut state.selection, disabled) {
                return false;
            }
            if previous == candidate {
                return true;
            }
            state.appointments.begin_load(candidate)
        };

        self.fetch_appointments(ticket).await;
        true
    }

    pub async fn refresh_appointments(&self) -> CommitOutcome {
        let ticket = {
            let mut state = self.state();
            let date = state.selection.selection().selected_date;
            state.appointments.begin_load(date)
        };
        self.fetch_appointments(ticket).await
    }

    async fn fetch_appointments(&self, ticket: LoadTicket<NaiveDate>) -> CommitOutcome {
        let result = self.api.appointments_on(*ticket.key()).await;

        let mut state = self.state();
        let outcome = state.appointments.commit(ticket, result);
        if outcome == CommitOutcome::Committed {
            let now = self.clock.now();
            Self::recompute_partition(&mut state, now);
        }
        outcome
    }

    fn recompute_partition(state: &mut BoardState, now: NaiveDateTime) {
        state.partition = match state.appointments.current() {
            Some((_, list)) => PartitionIndex::compute(&list, now),
            None => PartitionIndex::default(),
        };
    }

    /// Re-evaluates the next appointment against the clock without refetching.
    pub fn reevaluate(&self) {
        let now = self.clock.now();
        let mut state = self.state();
        Self::recompute_partition(&mut state, now);
    }

    pub fn calendar_view(&self) -> CalendarView {
        let state = self.state();
        let selection = state.selection.selection();
        CalendarView {
            month: selection.displayed_month,
            from_month: MonthKey::of(self.clock.today()),
            selected_date: selection.selected_date,
            disabled_days: state.disabled.dates().copied().collect(),
            available_days_of_week: self.settings.weekend.working_days(),
            availability_known: state.availability.is_known(selection.displayed_month),
            availability_status: state.availability.status().clone(),
        }
    }

    pub fn schedule_view(&self) -> ScheduleView {
        let state = self.state();
        let selected_date = state.selection.selection().selected_date;
        let locale = self.settings.locale;

        let (appointments, partition) = match state.appointments.appointments_on(selected_date) {
            Some(list) => (list, state.partition.clone()),
            None => (Arc::from(Vec::new()), PartitionIndex::default()),
        };

        ScheduleView {
            date: selected_date,
            is_today: selected_date == self.clock.today(),
            selected_date_label: labels::selected_date_label(locale, selected_date),
            selected_weekday_label: labels::selected_weekday_label(locale, selected_date),
            appointments,
            partition,
            status: state.appointments.status().clone(),
        }
    }
}

impl<A, K> ScheduleBoard<A, K>
where
    A: ScheduleApi + 'static,
    K: Clock + 'static,
{
    /// Opt-in periodic re-evaluation; without it the next-appointment
    /// pointer only moves when the day is reloaded.
    pub fn spawn_reevaluation_tick(self: &Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        let board = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                board.reevaluate();
            }
        })
    }
}

/// What the calendar widget is fed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub month: MonthKey,
    pub from_month: MonthKey,
    pub selected_date: NaiveDate,
    pub disabled_days: Vec<NaiveDate>,
    pub available_days_of_week: Vec<Weekday>,
    pub availability_known: bool,
    pub availability_status: LoadStatus,
}

/// What the schedule panel is fed. Buckets borrow from the shared list.
#[derive(Debug, Clone)]
pub struct ScheduleView {
    pub date: NaiveDate,
    pub is_today: bool,
    pub selected_date_label: String,
    pub selected_weekday_label: String,
    pub status: LoadStatus,
    appointments: Arc<[Appointment]>,
    partition: PartitionIndex,
}

impl ScheduleView {
    pub fn partition(&self) -> Partition<'_> {
        self.partition.resolve(&self.appointments)
    }

    pub fn morning(&self) -> Vec<&Appointment> {
        self.partition().morning
    }

    pub fn afternoon(&self) -> Vec<&Appointment> {
        self.partition().afternoon
    }

    pub fn next_appointment(&self) -> Option<&Appointment> {
        self.partition().next_appointment
    }

    /// The highlighted card only makes sense for today's schedule.
    pub fn show_next_appointment(&self) -> bool {
        self.is_today && self.next_appointment().is_some()
    }

    pub fn evaluated_at(&self) -> Option<NaiveDateTime> {
        self.partition.evaluated_at()
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }
}

impl Serialize for ScheduleView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let partition = self.partition();
        let mut s = serializer.serialize_struct("ScheduleView", 8)?;
        s.serialize_field("date", &self.date)?;
        s.serialize_field("is_today", &self.is_today)?;
        s.serialize_field("selected_date_label", &self.selected_date_label)?;
        s.serialize_field("selected_weekday_label", &self.selected_weekday_label)?;
        s.serialize_field("morning", &partition.morning)?;
        s.serialize_field("afternoon", &partition.afternoon)?;
        s.serialize_field("next_appointment", &partition.next_appointment)?;
        s.serialize_field("status", &self.status)?;
        s.end()
    }
}
