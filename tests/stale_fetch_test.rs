use async_trait::async_trait;
use chrono::NaiveDate;
use schedule_board::domain::model::{Appointment, AvailabilityDay, MonthKey};
use schedule_board::domain::ports::ScheduleApi;
use schedule_board::{BoardSettings, CommitOutcome, FixedClock, LoadStatus, Result, ScheduleBoard};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Answers every request after a per-key delay, so responses can be made to
/// arrive out of order.
#[derive(Default)]
struct SlowApi {
    month_delays: HashMap<MonthKey, Duration>,
    day_delays: HashMap<NaiveDate, Duration>,
}

#[async_trait]
impl ScheduleApi for SlowApi {
    async fn month_availability(
        &self,
        _provider_id: &str,
        month: MonthKey,
    ) -> Result<Vec<AvailabilityDay>> {
        let delay = self.month_delays.get(&month).copied().unwrap_or_default();
        tokio::time::sleep(delay).await;
        // Each month marks its own number as unavailable, to tell them apart.
        Ok(vec![AvailabilityDay {
            day: month.month + 10,
            available: false,
        }])
    }

    async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<Appointment>> {
        let delay = self.day_delays.get(&date).copied().unwrap_or_default();
        tokio::time::sleep(delay).await;
        Ok(vec![Appointment {
            id: date.to_string(),
            datetime: date.and_hms_opt(9, 0, 0).unwrap(),
            client_name: "Ana".to_string(),
            client_avatar_url: String::new(),
        }])
    }
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, m, d).unwrap()
}

fn board(api: SlowApi) -> ScheduleBoard<SlowApi, FixedClock> {
    let clock = FixedClock::new(date(3, 1).and_hms_opt(8, 0, 0).unwrap());
    ScheduleBoard::new(api, clock, "provider-1", BoardSettings::default())
}

#[tokio::test(start_paused = true)]
async fn test_older_month_response_arriving_late_is_discarded() {
    let mut api = SlowApi::default();
    let may = MonthKey::new(2021, 5).unwrap();
    let june = MonthKey::new(2021, 6).unwrap();
    api.month_delays.insert(may, Duration::from_millis(150));

    let board = board(api);
    let (may_outcome, june_outcome) = tokio::join!(board.change_month(may), async {
        // Let the May request go out first.
        tokio::time::sleep(Duration::from_millis(20)).await;
        board.change_month(june).await
    });

    assert_eq!(june_outcome, CommitOutcome::Committed);
    assert_eq!(may_outcome, CommitOutcome::Discarded);

    let calendar = board.calendar_view();
    assert_eq!(calendar.month, june);
    assert!(calendar.availability_known);
    // June 16 comes from June's snapshot; nothing from May leaked in.
    assert!(calendar.disabled_days.contains(&date(6, 16)));
    assert!(calendar.disabled_days.iter().all(|d| june.contains(*d)));
}

#[tokio::test(start_paused = true)]
async fn test_older_day_response_arriving_late_is_discarded() {
    let mut api = SlowApi::default();
    api.day_delays.insert(date(3, 2), Duration::from_millis(150));

    let board = Arc::new(board(api));
    let first = {
        let board = Arc::clone(&board);
        tokio::spawn(async move { board.select_date(date(3, 2)).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(board.select_date(date(3, 3)).await);
    assert!(first.await.unwrap());

    let schedule = board.schedule_view();
    assert_eq!(schedule.date, date(3, 3));
    let ids: Vec<_> = schedule.appointments().iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, vec!["2021-03-03"]);
}

#[tokio::test(start_paused = true)]
async fn test_reevaluation_tick_moves_next_appointment() {
    let clock = FixedClock::new(date(3, 2).and_hms_opt(8, 0, 0).unwrap());
    let board = Arc::new(ScheduleBoard::new(
        SlowApi::default(),
        clock.clone(),
        "provider-1",
        BoardSettings::default(),
    ));
    board.initialize().await;
    assert!(board.schedule_view().next_appointment().is_some());

    let tick = board.spawn_reevaluation_tick(Duration::from_secs(60));
    clock.set(date(3, 2).and_hms_opt(10, 0, 0).unwrap());

    // Nothing moves before the first period elapses.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(board.schedule_view().next_appointment().is_some());

    tokio::time::sleep(Duration::from_secs(31)).await;
    tick.abort();

    assert!(board.schedule_view().next_appointment().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_month_changes_leave_displayed_month_known() {
    let may = MonthKey::new(2021, 5).unwrap();
    let june = MonthKey::new(2021, 6).unwrap();

    for _ in 0..50 {
        let board = Arc::new(board(SlowApi::default()));
        let handles: Vec<_> = [may, june, may, june]
            .into_iter()
            .map(|month| {
                let board = Arc::clone(&board);
                tokio::spawn(async move { board.change_month(month).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        // The latest request always targets the displayed month, so once
        // everything settled that month's snapshot is in place.
        let calendar = board.calendar_view();
        assert_eq!(calendar.availability_status, LoadStatus::Ready);
        assert!(calendar.availability_known, "{} left unknown", calendar.month);
        let marker = calendar.month.day(calendar.month.month + 10).unwrap();
        assert!(calendar.disabled_days.contains(&marker));
    }
}
