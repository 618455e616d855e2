//! The trading robot: start-up, scheduled maintenance, command handling and
//! the polling loop around [`Cycle`].

use adaptrade_core::broker::Brokerage;
use adaptrade_core::config::{ConfigError, Settings};
use adaptrade_core::risk::RiskEngine;
use adaptrade_core::strategy::SignalEngine;
use chrono::{DateTime, Utc};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::cycle::{Cycle, CycleReport};
use crate::notify::Notifier;
use crate::schedule::{Clock, DailySchedule, ScheduledTask};
use crate::selection::{select_top_volatile, selection_message};
use crate::state::{BotState, ControlCommand};

/// Loop limits for [`Bot::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Stop after this many ticks; `None` runs until the process ends.
    pub max_iterations: Option<u64>,
}

pub struct Bot<B, N> {
    broker: B,
    notifier: N,
    settings: Settings,
    signals: SignalEngine,
    risk: RiskEngine,
    schedule: DailySchedule,
    state: BotState,
}

impl<B, N> Bot<B, N>
where
    B: Brokerage + Sync,
    N: Notifier,
{
    pub fn new(broker: B, notifier: N, settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let signals = SignalEngine::new(&settings.strategy)?;
        let risk = RiskEngine::new(settings.risk.clone())?;
        let schedule = DailySchedule::from_params(&settings.runner)?;
        let state = BotState::new(settings.runner.sandbox, settings.fingerprint());
        Ok(Self {
            broker,
            notifier,
            settings,
            signals,
            risk,
            schedule,
            state,
        })
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn risk(&self) -> &RiskEngine {
        &self.risk
    }

    /// Announce, pick instruments, reset counters. Scheduled tasks already
    /// past for today are then considered done.
    pub fn start(&mut self, now: DateTime<Utc>) {
        info!(
            fingerprint = %self.state.config_fingerprint,
            sandbox = self.state.sandbox,
            "robot starting"
        );
        self.notifier
            .send("Robot is up and ready.\n\nSend /start to begin trading.");
        self.select_instruments();
        self.reset_daily_counts();
        self.schedule.mark_started(now);
    }

    pub fn select_instruments(&mut self) {
        self.notifier.send("Refreshing the volatile instrument list...");
        match select_top_volatile(&self.broker, &self.settings.selection) {
            Ok(ranked) => {
                self.notifier.send(&selection_message(&ranked));
                if ranked.is_empty() {
                    warn!("no instrument qualified; keeping the previous selection");
                    return;
                }
                info!(count = ranked.len(), "instrument list updated");
                self.state.instruments = ranked;
            }
            Err(err) => {
                error!(error = %err, "instrument selection failed");
                self.notifier
                    .send(&format!("Could not fetch the instrument list: {err}"));
            }
        }
    }

    pub fn reset_daily_counts(&mut self) {
        self.risk.reset_daily_counts();
        self.state.trades_today = 0;
    }

    pub fn handle_command(&mut self, command: ControlCommand) -> String {
        info!(?command, "control command");
        command.apply(&mut self.state)
    }

    /// Run due maintenance, then one trading cycle if active.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<CycleReport> {
        for task in self.schedule.due(now) {
            info!(?task, "scheduled task");
            match task {
                ScheduledTask::ResetDailyCounts => self.reset_daily_counts(),
                ScheduledTask::SelectInstruments => self.select_instruments(),
            }
        }

        if !self.state.active {
            return None;
        }
        if self.state.instruments.is_empty() {
            warn!("instrument list is empty; skipping trading cycle");
            return None;
        }

        let report = Cycle {
            broker: &mut self.broker,
            signals: &self.signals,
            risk: &mut self.risk,
            state: &mut self.state,
            notifier: &mut self.notifier,
            params: &self.settings.runner,
        }
        .run();

        if !report.errors.is_empty() {
            error!(errors = report.errors.len(), "trading cycle had failures");
            self.notifier.send(&format!(
                "Trading cycle errors:\n{}\nThe robot keeps running.",
                report.errors.join("\n")
            ));
        }
        Some(report)
    }

    /// Poll loop: drain commands, tick, sleep. Returns the number of ticks.
    pub fn run(
        &mut self,
        clock: &dyn Clock,
        commands: &Receiver<ControlCommand>,
        options: RunOptions,
    ) -> u64 {
        let pause = Duration::from_secs(self.settings.runner.poll_interval_secs);
        let mut iterations = 0u64;
        let mut commands_open = true;
        loop {
            while commands_open {
                match commands.try_recv() {
                    Ok(command) => {
                        let reply = self.handle_command(command);
                        self.notifier.send(&reply);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        info!("command channel closed");
                        commands_open = false;
                    }
                }
            }

            self.tick(clock.now());
            iterations += 1;
            if options.max_iterations.is_some_and(|max| iterations >= max) {
                info!(iterations, "iteration limit reached");
                return iterations;
            }
            std::thread::sleep(pause);
        }
    }
}
