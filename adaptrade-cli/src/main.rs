//! AdapTrade CLI: one-shot engine queries and the paper trading loop.
//!
//! Commands:
//! - `signal`: regime and BUY/SELL/HOLD for a CSV of bars
//! - `levels`: stop-loss / take-profit for an entry
//! - `select`: rank a data directory's instruments by volatility
//! - `paper`: run the robot against a paper brokerage; /start, /stop, /status on stdin

use adaptrade_core::config::Settings;
use adaptrade_core::domain::{Decision, PreparedBars};
use adaptrade_core::risk::RiskEngine;
use adaptrade_core::strategy::SignalEngine;
use adaptrade_runner::selection::selection_message;
use adaptrade_runner::{
    load_bars_csv, observability, select_top_volatile, Bot, Clock, ControlCommand, PaperBroker,
    RunOptions, SystemClock, WriterNotifier,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

#[derive(Parser)]
#[command(
    name = "adaptrade",
    about = "AdapTrade CLI: regime-switching intraday trading robot"
)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the signal engine on a CSV of bars.
    Signal {
        /// CSV with timestamp,open,high,low,close,volume.
        #[arg(long)]
        bars: PathBuf,

        /// Last traded price. Defaults to the newest close.
        #[arg(long)]
        last_price: Option<f64>,

        /// Print the signal as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Compute stop-loss and take-profit for an entry.
    Levels {
        #[arg(long)]
        entry: f64,

        #[arg(long, value_enum)]
        direction: Direction,

        /// Optional bars for the ATR-based stop distance.
        #[arg(long)]
        bars: Option<PathBuf>,
    },
    /// Rank the instruments of a data directory by normalised ATR.
    Select {
        #[arg(long)]
        data_dir: PathBuf,
    },
    /// Run the robot against a paper brokerage.
    Paper {
        #[arg(long)]
        data_dir: PathBuf,

        /// Stop after this many loop iterations.
        #[arg(long)]
        iterations: Option<u64>,

        /// Begin trading immediately instead of waiting for /start.
        #[arg(long, default_value_t = false)]
        active: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Buy,
    Sell,
}

impl From<Direction> for Decision {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Buy => Decision::Buy,
            Direction::Sell => Decision::Sell,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    observability::init(&settings.logging)?;
    tracing::debug!(fingerprint = %settings.fingerprint(), "configuration loaded");

    match cli.command {
        Commands::Signal {
            bars,
            last_price,
            json,
        } => run_signal(&settings, &bars, last_price, json),
        Commands::Levels {
            entry,
            direction,
            bars,
        } => run_levels(settings, entry, direction, bars.as_deref()),
        Commands::Select { data_dir } => run_select(&settings, &data_dir),
        Commands::Paper {
            data_dir,
            iterations,
            active,
        } => run_paper(settings, &data_dir, iterations, active),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(Settings::default()),
    }
}

fn run_signal(settings: &Settings, path: &Path, last_price: Option<f64>, json: bool) -> Result<()> {
    let bars = load_bars_csv(path)?;
    let last_price = match last_price {
        Some(price) => price,
        None => match PreparedBars::prepare(&bars).last() {
            Some(bar) => bar.close,
            None => bail!("{} has no usable bars; pass --last-price", path.display()),
        },
    };

    let engine = SignalEngine::new(&settings.strategy)?;
    let regime = engine.regime(&bars);
    let signal = engine.get_signal(&bars, last_price);

    if json {
        let value = serde_json::json!({
            "regime": regime,
            "decision": signal.decision,
            "reason": signal.reason,
            "last_price": last_price,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Bars:       {}", bars.len());
        println!("Last price: {last_price:.4}");
        println!("Regime:     {regime}");
        println!("Decision:   {}", signal.decision);
        println!("Reason:     {}", signal.reason);
    }
    Ok(())
}

fn run_levels(settings: Settings, entry: f64, direction: Direction, bars: Option<&Path>) -> Result<()> {
    let bars = bars.map(load_bars_csv).transpose()?;
    let engine = RiskEngine::new(settings.risk)?;
    let decision = Decision::from(direction);
    let Some(levels) = engine.calculate_sl_tp(entry, decision, bars.as_deref()) else {
        bail!("no levels for entry {entry}");
    };
    println!("Direction:   {decision}");
    println!("Entry:       {entry:.4}");
    println!("Stop loss:   {:.4}", levels.stop_loss);
    println!("Take profit: {:.4}", levels.take_profit);
    Ok(())
}

fn run_select(settings: &Settings, data_dir: &Path) -> Result<()> {
    let broker = PaperBroker::open(data_dir)?;
    let ranked = select_top_volatile(&broker, &settings.selection)?;
    print!("{}", selection_message(&ranked));
    Ok(())
}

fn run_paper(settings: Settings, data_dir: &Path, iterations: Option<u64>, active: bool) -> Result<()> {
    let broker = PaperBroker::open(data_dir)?;
    let notifier = WriterNotifier::new(std::io::stdout());
    let mut bot = Bot::new(broker, notifier, settings).context("building the robot")?;

    let clock = SystemClock;
    bot.start(clock.now());
    if active {
        println!("{}", bot.handle_command(ControlCommand::Start));
    }

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<ControlCommand>() {
                Ok(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                Err(err) => eprintln!("{err}"),
            }
        }
    });

    let ticks = bot.run(
        &clock,
        &rx,
        RunOptions {
            max_iterations: iterations,
        },
    );
    println!("Stopped after {ticks} iterations.");
    Ok(())
}
