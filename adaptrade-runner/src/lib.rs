//! AdapTrade Runner: the trading loop around the core engines.
//!
//! This crate builds on `adaptrade-core` to provide:
//! - CSV bar loading and a paper brokerage over a data directory
//! - Daily selection of the most volatile instruments
//! - Exchange-local daily schedule (counter reset, reselection)
//! - Explicit trading state with /start, /stop, /status commands
//! - The per-instrument trading cycle and the polling bot loop
//! - Operator notifications and logging setup

pub mod bot;
pub mod cycle;
pub mod data_loader;
pub mod notify;
pub mod observability;
pub mod paper;
pub mod schedule;
pub mod selection;
pub mod state;

pub use bot::{Bot, RunOptions};
pub use cycle::{Cycle, CycleReport, TradeReport};
pub use data_loader::{load_bars_csv, read_bars, LoadError};
pub use notify::{LogNotifier, MemoryNotifier, Notifier, WriterNotifier};
pub use paper::{PaperBroker, PaperError, PaperOrder, PaperOrderKind};
pub use schedule::{Clock, DailySchedule, ScheduledTask, SystemClock};
pub use selection::{normalized_atr_percent, select_top_volatile, RankedInstrument};
pub use state::{BotState, ControlCommand, UnknownCommand};
