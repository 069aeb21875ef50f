use crate::domain::ports::Clock;
use chrono::{FixedOffset, Local, NaiveDateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};

/// Wall-clock time in the machine's local timezone, or at a fixed offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    utc_offset: Option<FixedOffset>,
}

impl SystemClock {
    pub fn new(utc_offset: Option<FixedOffset>) -> Self {
        Self { utc_offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        match &self.utc_offset {
            Some(offset) => Utc::now().with_timezone(offset).naive_local(),
            None => Local::now().naive_local(),
        }
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
