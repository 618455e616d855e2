//! Domain types for adaptrade

pub mod bar;
pub mod decision;
pub mod instrument;

pub use bar::{Bar, PreparedBars};
pub use decision::{Decision, OrderSide, Signal, StopKind, StopLevels};
pub use instrument::{InstrumentId, InstrumentInfo, InstrumentMeta};
