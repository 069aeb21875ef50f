use clap::Parser;
use schedule_board::app::report;
use schedule_board::core::ConfigProvider;
use schedule_board::domain::model::{Locale, MonthKey};
use schedule_board::utils::error::{ErrorSeverity, ScheduleError};
use schedule_board::utils::{logger, validation::Validate};
use schedule_board::{
    BoardSettings, CalendarView, CliConfig, HttpScheduleApi, LoadStatus, ScheduleBoard,
    ScheduleView, SystemClock,
};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = CliConfig::parse();
    cli.token = cli.resolved_token();

    if cli.json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting schedule-board");

    let file_config = match cli.merged_with_file() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let watch = cli.watch.then(|| {
        file_config
            .as_ref()
            .and_then(|config| config.reevaluate_interval())
            .unwrap_or(DEFAULT_WATCH_INTERVAL)
    });

    let result = match &file_config {
        Some(config) => run(config, &cli, watch).await,
        None => run(&cli, &cli, watch).await,
    };

    match result {
        Ok(degraded) => {
            if degraded {
                // Rendered from partial data; report it like a retryable error.
                std::process::exit(2);
            }
            Ok(())
        }
        Err(e) => exit_with(&e),
    }
}

/// Returns whether any fetch failed, in which case the output is partial.
async fn run<C: ConfigProvider + Validate>(
    config: &C,
    cli: &CliConfig,
    watch: Option<Duration>,
) -> Result<bool, ScheduleError> {
    config.validate()?;
    tracing::debug!(
        "Provider {} at {} ({:?})",
        config.provider_id(),
        config.base_url(),
        config.locale()
    );

    let api = HttpScheduleApi::from_config(config)?;
    let settings = BoardSettings::from_config(config);
    let locale = settings.locale;
    let board = Arc::new(ScheduleBoard::new(
        api,
        SystemClock::new(config.utc_offset()),
        config.provider_id(),
        settings,
    ));

    board.initialize().await;

    if let Some(date) = cli.date {
        board.change_month(MonthKey::of(date)).await;
        if !board.select_date(date).await {
            tracing::warn!("{} is not selectable; keeping {}", date, board.selection().selected_date);
        }
    }

    let calendar = board.calendar_view();
    let schedule = board.schedule_view();
    render(&calendar, &schedule, cli.json, locale)?;

    if let Some(period) = watch {
        tracing::info!("Watching; re-evaluating every {:?} (Ctrl-C to stop)", period);
        let tick = board.spawn_reevaluation_tick(period);
        let mut last_next = schedule.next_appointment().map(|a| a.id.clone());
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                _ = interval.tick() => {
                    let schedule = board.schedule_view();
                    let next = schedule.next_appointment().map(|a| a.id.clone());
                    if next != last_next {
                        render(&board.calendar_view(), &schedule, cli.json, locale)?;
                        last_next = next;
                    }
                }
            }
        }
        tick.abort();
    }

    let failures: Vec<_> = [&calendar.availability_status, &schedule.status]
        .into_iter()
        .filter_map(|status| match status {
            LoadStatus::Failed(failure) => Some(failure),
            _ => None,
        })
        .collect();
    for failure in &failures {
        tracing::warn!("Showing partial data: {}", failure.message);
    }

    Ok(!failures.is_empty())
}

fn render(
    calendar: &CalendarView,
    schedule: &ScheduleView,
    json: bool,
    locale: Locale,
) -> Result<(), ScheduleError> {
    if json {
        println!("{}", report::render_json(calendar, schedule)?);
    } else {
        print!("{}", report::render_text(calendar, schedule, locale));
    }
    Ok(())
}

fn exit_with(e: &ScheduleError) -> ! {
    tracing::error!(
        "❌ schedule-board failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
