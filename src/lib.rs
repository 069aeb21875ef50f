pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{FixedClock, HttpScheduleApi, SystemClock};
pub use crate::core::{
    board::{BoardSettings, CalendarView, ScheduleBoard, ScheduleView},
    selection::DayModifiers,
    store::{CommitOutcome, LoadStatus},
};
pub use utils::error::{Result, ScheduleError};
