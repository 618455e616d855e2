//! Paper brokerage replaying CSV history from a data directory.
//!
//! Layout:
//! ```text
//! <dir>/instruments.toml      balance + instrument catalog
//! <dir>/intraday/<id>.csv     5-minute bars
//! <dir>/daily/<id>.csv        daily bars
//! ```
//! Lookback windows are measured back from the newest bar in each file, so a
//! fixed data set replays the same way on any day. Orders are only recorded.

use adaptrade_core::broker::{
    AccountInfo, BrokerError, Brokerage, CandleInterval, Lookback, OrderReceipt,
};
use adaptrade_core::domain::{
    Bar, InstrumentId, InstrumentInfo, InstrumentMeta, OrderSide, StopKind,
};
use chrono::Duration;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::data_loader::{load_bars_csv, LoadError};

pub const CATALOG_FILE: &str = "instruments.toml";

#[derive(Debug, Error)]
pub enum PaperError {
    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Catalog {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Bars(#[from] LoadError),
}

#[derive(Debug, Clone, Deserialize)]
struct Catalog {
    #[serde(default = "default_balance")]
    balance: f64,
    #[serde(default)]
    instruments: Vec<CatalogEntry>,
}

fn default_balance() -> f64 {
    100_000.0
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    id: InstrumentId,
    ticker: String,
    #[serde(default)]
    name: String,
    #[serde(default = "default_lot")]
    lot_size: u32,
    #[serde(default = "default_increment")]
    min_price_increment: f64,
    #[serde(default = "default_tradable")]
    tradable: bool,
}

fn default_lot() -> u32 {
    1
}

fn default_increment() -> f64 {
    0.01
}

fn default_tradable() -> bool {
    true
}

/// What kind of order was recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum PaperOrderKind {
    Market { lots: u32 },
    Stop { quantity: u64, price: f64, kind: StopKind },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaperOrder {
    pub order_id: String,
    pub instrument: InstrumentId,
    pub side: OrderSide,
    pub kind: PaperOrderKind,
}

#[derive(Debug, Clone)]
pub struct PaperBroker {
    root: PathBuf,
    balance: f64,
    catalog: Vec<CatalogEntry>,
    intraday: HashMap<InstrumentId, Vec<Bar>>,
    daily: HashMap<InstrumentId, Vec<Bar>>,
    orders: Vec<PaperOrder>,
}

impl PaperBroker {
    /// Load the catalog and every bar file it references. Missing bar files
    /// mean "no history"; unreadable ones are errors.
    pub fn open(root: &Path) -> Result<Self, PaperError> {
        let catalog_path = root.join(CATALOG_FILE);
        let content = std::fs::read_to_string(&catalog_path).map_err(|source| PaperError::Io {
            path: catalog_path.display().to_string(),
            source,
        })?;
        let catalog: Catalog = toml::from_str(&content).map_err(|source| PaperError::Catalog {
            path: catalog_path.display().to_string(),
            source,
        })?;

        let mut intraday = HashMap::new();
        let mut daily = HashMap::new();
        for entry in &catalog.instruments {
            intraday.insert(entry.id.clone(), load_optional(&root.join("intraday"), &entry.id)?);
            daily.insert(entry.id.clone(), load_optional(&root.join("daily"), &entry.id)?);
        }
        info!(
            dir = %root.display(),
            instruments = catalog.instruments.len(),
            balance = catalog.balance,
            "paper brokerage loaded"
        );

        Ok(Self {
            root: root.to_path_buf(),
            balance: catalog.balance,
            catalog: catalog.instruments,
            intraday,
            daily,
            orders: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every order accepted so far, in submission order.
    pub fn orders(&self) -> &[PaperOrder] {
        &self.orders
    }

    fn entry(&self, instrument: &InstrumentId) -> Result<&CatalogEntry, BrokerError> {
        self.catalog
            .iter()
            .find(|entry| &entry.id == instrument)
            .ok_or_else(|| BrokerError::UnknownInstrument(instrument.clone()))
    }

    fn series(&self, instrument: &InstrumentId, interval: CandleInterval) -> Result<&[Bar], BrokerError> {
        self.entry(instrument)?;
        let source = match interval {
            CandleInterval::FiveMinutes => &self.intraday,
            CandleInterval::Day => &self.daily,
        };
        Ok(source.get(instrument).map(Vec::as_slice).unwrap_or(&[]))
    }

    fn record(&mut self, instrument: &InstrumentId, side: OrderSide, kind: PaperOrderKind) -> OrderReceipt {
        let order_id = format!("paper-{}", self.orders.len() + 1);
        info!(%instrument, ?side, ?kind, %order_id, "paper order accepted");
        self.orders.push(PaperOrder {
            order_id: order_id.clone(),
            instrument: instrument.clone(),
            side,
            kind,
        });
        OrderReceipt { order_id }
    }
}

fn load_optional(dir: &Path, instrument: &InstrumentId) -> Result<Vec<Bar>, PaperError> {
    let path = dir.join(format!("{instrument}.csv"));
    if !path.exists() {
        debug!(path = %path.display(), "no bar file");
        return Ok(Vec::new());
    }
    Ok(load_bars_csv(&path)?)
}

impl AccountInfo for PaperBroker {
    fn account_balance(&self) -> Result<f64, BrokerError> {
        Ok(self.balance)
    }

    fn instrument_meta(&self, instrument: &InstrumentId) -> Result<InstrumentMeta, BrokerError> {
        let entry = self.entry(instrument)?;
        Ok(InstrumentMeta::new(
            entry.id.clone(),
            entry.lot_size,
            entry.min_price_increment,
        ))
    }
}

impl Brokerage for PaperBroker {
    fn bars(&self, instrument: &InstrumentId, lookback: Lookback) -> Result<Vec<Bar>, BrokerError> {
        let series = self.series(instrument, lookback.interval)?;
        let Some(newest) = series.iter().map(|bar| bar.timestamp).max() else {
            return Ok(Vec::new());
        };
        let cutoff = newest - Duration::days(i64::from(lookback.days));
        Ok(series
            .iter()
            .filter(|bar| bar.timestamp > cutoff)
            .cloned()
            .collect())
    }

    fn last_price(&self, instrument: &InstrumentId) -> Result<f64, BrokerError> {
        let newest = |bars: &[Bar]| {
            bars.iter()
                .filter(|bar| bar.close.is_finite())
                .max_by_key(|bar| bar.timestamp)
                .map(|bar| bar.close)
        };
        newest(self.series(instrument, CandleInterval::FiveMinutes)?)
            .or_else(|| newest(self.daily.get(instrument).map(Vec::as_slice).unwrap_or(&[])))
            .ok_or_else(|| BrokerError::Data(format!("no price history for {instrument}")))
    }

    fn tradable_instruments(&self) -> Result<Vec<InstrumentInfo>, BrokerError> {
        Ok(self
            .catalog
            .iter()
            .filter(|entry| entry.tradable)
            .map(|entry| InstrumentInfo {
                id: entry.id.clone(),
                ticker: entry.ticker.clone(),
                name: entry.name.clone(),
            })
            .collect())
    }

    fn submit_market_order(
        &mut self,
        instrument: &InstrumentId,
        lots: u32,
        side: OrderSide,
    ) -> Result<OrderReceipt, BrokerError> {
        self.entry(instrument)?;
        if lots == 0 {
            return Err(BrokerError::Rejected("market order for zero lots".into()));
        }
        Ok(self.record(instrument, side, PaperOrderKind::Market { lots }))
    }

    fn submit_stop_order(
        &mut self,
        instrument: &InstrumentId,
        quantity: u64,
        price: f64,
        side: OrderSide,
        kind: StopKind,
    ) -> Result<OrderReceipt, BrokerError> {
        self.entry(instrument)?;
        if quantity == 0 {
            return Err(BrokerError::Rejected("stop order for zero units".into()));
        }
        if !(price.is_finite() && price > 0.0) {
            return Err(BrokerError::Rejected(format!("stop price {price} is not positive")));
        }
        Ok(self.record(
            instrument,
            side,
            PaperOrderKind::Stop {
                quantity,
                price,
                kind,
            },
        ))
    }
}
