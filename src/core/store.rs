use crate::utils::error::{ErrorCategory, Result, ScheduleError};
use serde::Serialize;
use std::fmt::Debug;

/// Handle for one issued fetch. Only the most recently issued ticket may commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket<K> {
    key: K,
    generation: u64,
}

impl<K> LoadTicket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The fetch failed; the previous snapshot is still in place.
    Failed,
    /// A newer fetch was issued while this one was in flight.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub category: ErrorCategory,
    pub message: String,
}

impl From<&ScheduleError> for FetchFailure {
    fn from(err: &ScheduleError) -> Self {
        Self {
            category: err.category(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(FetchFailure),
}

impl LoadStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, LoadStatus::Failed(_))
    }
}

/// A value tagged with the key it was fetched for, replaced wholesale on every
/// successful commit of the latest request.
#[derive(Debug)]
pub struct KeyedStore<K, V> {
    current: Option<(K, V)>,
    issued: u64,
    in_flight: Option<LoadTicket<K>>,
    status: LoadStatus,
    version: u64,
}

impl<K: Clone + PartialEq + Debug, V> KeyedStore<K, V> {
    pub fn new() -> Self {
        Self {
            current: None,
            issued: 0,
            in_flight: None,
            status: LoadStatus::Idle,
            version: 0,
        }
    }

    /// Supersedes whatever request is in flight.
    pub fn begin(&mut self, key: K) -> LoadTicket<K> {
        self.issued += 1;
        let ticket = LoadTicket {
            key,
            generation: self.issued,
        };
        if let Some(previous) = self.in_flight.replace(ticket.clone()) {
            tracing::debug!(
                "Request {} for {:?} superseded by request {}",
                previous.generation,
                previous.key,
                ticket.generation
            );
        }
        self.status = LoadStatus::Loading;
        ticket
    }

    pub fn is_current(&self, ticket: &LoadTicket<K>) -> bool {
        self.in_flight.as_ref() == Some(ticket)
    }

    pub fn commit(&mut self, ticket: LoadTicket<K>, result: Result<V>) -> CommitOutcome {
        if !self.is_current(&ticket) {
            tracing::debug!(
                "Discarding stale response {} for {:?}",
                ticket.generation,
                ticket.key
            );
            return CommitOutcome::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(value) => {
                self.current = Some((ticket.key, value));
                self.version += 1;
                self.status = LoadStatus::Ready;
                CommitOutcome::Committed
            }
            Err(err) => {
                tracing::warn!("Fetch for {:?} failed: {}", ticket.key, err);
                self.status = LoadStatus::Failed(FetchFailure::from(&err));
                CommitOutcome::Failed
            }
        }
    }

    pub fn current(&self) -> Option<(&K, &V)> {
        self.current.as_ref().map(|(k, v)| (k, v))
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        match &self.current {
            Some((k, v)) if k == key => Some(v),
            _ => None,
        }
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Bumped on every committed snapshot.
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl<K: Clone + PartialEq + Debug, V> Default for KeyedStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
