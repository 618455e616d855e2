//! Trading state and operator control commands.
//!
//! The bot owns one [`BotState`] and passes it to whatever needs it; nothing
//! here is global.

use adaptrade_core::domain::InstrumentId;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

use crate::selection::RankedInstrument;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BotState {
    pub active: bool,
    pub instruments: Vec<RankedInstrument>,
    pub last_prices: HashMap<InstrumentId, f64>,
    pub trades_today: u32,
    pub sandbox: bool,
    pub config_fingerprint: String,
}

impl BotState {
    pub fn new(sandbox: bool, config_fingerprint: impl Into<String>) -> Self {
        Self {
            sandbox,
            config_fingerprint: config_fingerprint.into(),
            ..Self::default()
        }
    }

    pub fn status_report(&self) -> String {
        let mut text = String::from("Robot status\n\n");
        let _ = writeln!(text, "State: {}", if self.active { "ACTIVE" } else { "STOPPED" });
        let _ = writeln!(text, "API mode: {}", if self.sandbox { "sandbox" } else { "live" });
        let fingerprint = self.config_fingerprint.get(..12).unwrap_or(&self.config_fingerprint);
        let _ = writeln!(text, "Config: {fingerprint}");
        let _ = writeln!(text, "Trades today: {}\n", self.trades_today);
        let _ = writeln!(text, "Instruments ({}):", self.instruments.len());
        for item in &self.instruments {
            let price = self
                .last_prices
                .get(&item.info.id)
                .map(|p| format!("{p:.4}"))
                .unwrap_or_else(|| "n/a".to_string());
            let _ = writeln!(text, "- {} ({}): {price}", item.info.ticker, item.info.name);
        }
        text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Stop,
    Status,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("unknown command '{0}' (expected /start, /stop or /status)")]
pub struct UnknownCommand(pub String);

impl FromStr for ControlCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "/start" | "start" => Ok(ControlCommand::Start),
            "/stop" | "stop" => Ok(ControlCommand::Stop),
            "/status" | "status" => Ok(ControlCommand::Status),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

impl ControlCommand {
    /// Apply to the state and return the reply for the operator.
    pub fn apply(self, state: &mut BotState) -> String {
        match self {
            ControlCommand::Start => {
                if state.active {
                    return "Trading is already active.".to_string();
                }
                state.active = true;
                info!("trading activated");
                "Trading robot started.".to_string()
            }
            ControlCommand::Stop => {
                if !state.active {
                    return "Trading is already stopped.".to_string();
                }
                state.active = false;
                info!("trading deactivated");
                "Trading robot stopped.".to_string()
            }
            ControlCommand::Status => state.status_report(),
        }
    }
}
