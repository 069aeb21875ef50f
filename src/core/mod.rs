pub mod appointments;
pub mod availability;
pub mod board;
pub mod disabled_days;
pub mod labels;
pub mod partition;
pub mod selection;
pub mod store;

pub use crate::domain::model::{Appointment, AvailabilityDay, MonthKey};
pub use crate::domain::ports::{Clock, ConfigProvider, ScheduleApi};
pub use crate::utils::error::Result;
