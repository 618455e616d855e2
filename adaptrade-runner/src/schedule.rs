//! Daily maintenance tasks at fixed exchange-local times.

use adaptrade_core::config::{ConfigError, RunnerParameters};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    ResetDailyCounts,
    SelectInstruments,
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    task: ScheduledTask,
    at: NaiveTime,
    last_fired: Option<NaiveDate>,
}

/// Fires each task at most once per exchange-local date, in time-of-day order.
#[derive(Debug, Clone)]
pub struct DailySchedule {
    tz: Tz,
    entries: Vec<Entry>,
}

impl DailySchedule {
    pub fn new(tz: Tz, reset_at: NaiveTime, select_at: NaiveTime) -> Self {
        let mut entries = vec![
            Entry {
                task: ScheduledTask::ResetDailyCounts,
                at: reset_at,
                last_fired: None,
            },
            Entry {
                task: ScheduledTask::SelectInstruments,
                at: select_at,
                last_fired: None,
            },
        ];
        entries.sort_by_key(|entry| entry.at);
        Self { tz, entries }
    }

    pub fn from_params(params: &RunnerParameters) -> Result<Self, ConfigError> {
        Ok(Self::new(
            params.timezone()?,
            params.reset_time()?,
            params.selection_at()?,
        ))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Treat every task whose time has already passed today as done.
    /// Called after the start-up routine, which covers those tasks itself.
    pub fn mark_started(&mut self, now: DateTime<Utc>) {
        let local = now.with_timezone(&self.tz);
        for entry in &mut self.entries {
            if local.time() >= entry.at {
                entry.last_fired = Some(local.date_naive());
            }
        }
    }

    /// Tasks due at `now`; each is marked fired for today.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<ScheduledTask> {
        let local = now.with_timezone(&self.tz);
        let today = local.date_naive();
        let mut tasks = Vec::new();
        for entry in &mut self.entries {
            if local.time() >= entry.at && entry.last_fired != Some(today) {
                entry.last_fired = Some(today);
                tasks.push(entry.task);
            }
        }
        tasks
    }
}
