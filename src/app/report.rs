use crate::core::board::{CalendarView, ScheduleView};
use crate::core::labels;
use crate::core::store::LoadStatus;
use crate::domain::model::{Appointment, Locale};
use crate::utils::error::Result;
use chrono::Datelike;
use std::fmt::Write;

pub fn render_json(calendar: &CalendarView, schedule: &ScheduleView) -> Result<String> {
    let document = serde_json::json!({
        "calendar": calendar,
        "schedule": schedule,
    });
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn render_text(calendar: &CalendarView, schedule: &ScheduleView, locale: Locale) -> String {
    let mut out = String::new();

    let mut heading = Vec::new();
    if schedule.is_today {
        heading.push(labels::today_label(locale).to_string());
    }
    heading.push(schedule.selected_date_label.clone());
    heading.push(schedule.selected_weekday_label.clone());
    let _ = writeln!(out, "{}", heading.join(" | "));

    if let LoadStatus::Failed(failure) = &schedule.status {
        let _ = writeln!(out, "! appointments unavailable: {}", failure.message);
    }

    if schedule.show_next_appointment() {
        if let Some(next) = schedule.next_appointment() {
            let _ = writeln!(out, "\n> {} {}", next.hour_formatted(), next.client_name);
        }
    }

    let sections = [
        (morning_label(locale), schedule.morning()),
        (afternoon_label(locale), schedule.afternoon()),
    ];
    for (title, bucket) in sections {
        let _ = writeln!(out, "\n{}", title);
        if bucket.is_empty() {
            let _ = writeln!(out, "  {}", labels::empty_period_label(locale));
        }
        for appointment in bucket {
            let _ = writeln!(out, "  {}", appointment_line(appointment));
        }
    }

    let _ = writeln!(
        out,
        "\n{} {}",
        labels::month_name(locale, calendar.month.month),
        calendar.month.year
    );
    if !calendar.availability_known {
        let _ = writeln!(out, "  ! availability unknown for this month");
    }
    let open_days: Vec<String> = open_days(calendar).iter().map(|d| d.to_string()).collect();
    let _ = writeln!(out, "  open: {}", open_days.join(" "));

    out
}

fn appointment_line(appointment: &Appointment) -> String {
    format!("{}  {}", appointment.hour_formatted(), appointment.client_name)
}

/// Days of the displayed month a click would be accepted on.
fn open_days(calendar: &CalendarView) -> Vec<u32> {
    calendar
        .month
        .dates()
        .filter(|d| !calendar.disabled_days.contains(d))
        .filter(|d| calendar.available_days_of_week.contains(&d.weekday()))
        .map(|d| d.day())
        .collect()
}

fn morning_label(locale: Locale) -> &'static str {
    match locale {
        Locale::PtBr => "Manhã",
        Locale::En => "Morning",
    }
}

fn afternoon_label(locale: Locale) -> &'static str {
    match locale {
        Locale::PtBr => "Tarde",
        Locale::En => "Afternoon",
    }
}
