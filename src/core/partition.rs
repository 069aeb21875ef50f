//! Splits a day's appointments into morning and afternoon and finds the next
//! one still to come.
//!
//! The result is computed against a fixed evaluation instant. It does not
//! advance on its own: once that instant passes an appointment, the "next"
//! pointer stays stale until the list is reloaded or the partition is
//! re-evaluated (see `ScheduleBoard::reevaluate` and the optional tick).

use crate::domain::model::Appointment;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Appointments starting at or after this hour are in the afternoon.
pub const AFTERNOON_STARTS_AT: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    Morning,
    Afternoon,
}

impl DayPeriod {
    pub fn of(appointment: &Appointment) -> Self {
        if appointment.hour() < AFTERNOON_STARTS_AT {
            DayPeriod::Morning
        } else {
            DayPeriod::Afternoon
        }
    }
}

/// Positions into the appointment list the partition was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartitionIndex {
    morning: Vec<usize>,
    afternoon: Vec<usize>,
    next: Option<usize>,
    evaluated_at: Option<NaiveDateTime>,
}

impl PartitionIndex {
    pub fn compute(appointments: &[Appointment], now: NaiveDateTime) -> Self {
        let mut order: Vec<usize> = (0..appointments.len()).collect();
        // Stable, so equal timestamps keep their server order.
        order.sort_by_key(|&i| appointments[i].datetime);

        let (morning, afternoon): (Vec<usize>, Vec<usize>) = order
            .iter()
            .copied()
            .partition(|&i| DayPeriod::of(&appointments[i]) == DayPeriod::Morning);

        let next = order
            .iter()
            .copied()
            .find(|&i| appointments[i].datetime > now);

        Self {
            morning,
            afternoon,
            next,
            evaluated_at: Some(now),
        }
    }

    pub fn evaluated_at(&self) -> Option<NaiveDateTime> {
        self.evaluated_at
    }

    /// `appointments` must be the list this index was computed from.
    pub fn resolve<'a>(&self, appointments: &'a [Appointment]) -> Partition<'a> {
        let pick = |indices: &[usize]| -> Vec<&'a Appointment> {
            indices.iter().filter_map(|&i| appointments.get(i)).collect()
        };
        Partition {
            morning: pick(&self.morning),
            afternoon: pick(&self.afternoon),
            next_appointment: self.next.and_then(|i| appointments.get(i)),
        }
    }
}

/// Borrowed view over one day's appointments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<'a> {
    pub morning: Vec<&'a Appointment>,
    pub afternoon: Vec<&'a Appointment>,
    pub next_appointment: Option<&'a Appointment>,
}

pub fn partition(appointments: &[Appointment], now: NaiveDateTime) -> Partition<'_> {
    PartitionIndex::compute(appointments, now).resolve(appointments)
}

pub fn next_appointment(appointments: &[Appointment], now: NaiveDateTime) -> Option<&Appointment> {
    appointments
        .iter()
        .filter(|a| a.datetime > now)
        .min_by_key(|a| a.datetime)
}
