use crate::core::disabled_days::DisabledDaySet;
use crate::domain::model::{MonthKey, ScheduleSelection};
use chrono::NaiveDate;
use serde::Deserialize;

/// Modifiers the calendar widget computed for a clicked cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct DayModifiers {
    pub available: bool,
    pub disabled: bool,
}

/// Owns the displayed month and the selected date.
#[derive(Debug, Clone)]
pub struct SelectionController {
    selection: ScheduleSelection,
}

impl SelectionController {
    /// Both the displayed month and the selection start on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            selection: ScheduleSelection {
                displayed_month: MonthKey::of(today),
                selected_date: today,
            },
        }
    }

    pub fn selection(&self) -> ScheduleSelection {
        self.selection
    }

    /// Applies `candidate` only if it is not disabled (weekend or unavailable).
    /// A rejected candidate is ignored, like a click on a greyed-out cell.
    pub fn try_select(&mut self, candidate: NaiveDate, disabled: &DisabledDaySet) -> bool {
        if disabled.contains(candidate) {
            tracing::debug!("Ignoring selection of disabled date {}", candidate);
            return false;
        }
        self.selection.selected_date = candidate;
        true
    }

    /// The widget's own verdict has to agree before the date is validated.
    pub fn day_clicked(
        &mut self,
        candidate: NaiveDate,
        modifiers: DayModifiers,
        disabled: &DisabledDaySet,
    ) -> bool {
        if !modifiers.available || modifiers.disabled {
            tracing::debug!("Ignoring click on {} ({:?})", candidate, modifiers);
            return false;
        }
        self.try_select(candidate, disabled)
    }

    /// Always accepted; the selected date is left alone.
    pub fn on_month_change(&mut self, month: MonthKey) -> MonthKey {
        self.selection.displayed_month = month;
        month
    }
}
