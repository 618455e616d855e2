//! AdapTrade Core: decision engines for an intraday trading robot.
//!
//! This crate holds everything that decides, and nothing that acts:
//! - Domain types (bars, instruments, decisions, stop levels)
//! - Indicator library (SMA, Bollinger, RSI, ATR, ADX)
//! - Regime-switching signal engine with volume confirmation
//! - Risk engine: position sizing, SL/TP placement, daily trade limits
//! - Brokerage collaborator traits
//! - Configuration with validation and fingerprinting

pub mod broker;
pub mod config;
pub mod domain;
pub mod indicators;
pub mod risk;
pub mod strategy;
