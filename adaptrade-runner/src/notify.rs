//! Operator notifications.
//!
//! Delivery is best effort: a notifier logs its own failures and never hands
//! them back to the trading loop.

use std::io::Write;
use tracing::{error, info};

pub trait Notifier {
    fn send(&mut self, message: &str);
}

/// Writes messages into the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&mut self, message: &str) {
        info!(target: "adaptrade::notify", "{message}");
    }
}

/// Writes each message, followed by a blank line, to a writer (stdout in the CLI).
#[derive(Debug)]
pub struct WriterNotifier<W: Write> {
    writer: W,
}

impl<W: Write> WriterNotifier<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> Notifier for WriterNotifier<W> {
    fn send(&mut self, message: &str) {
        let result = writeln!(self.writer, "{message}\n").and_then(|()| self.writer.flush());
        if let Err(err) = result {
            error!(error = %err, "notification delivery failed");
        }
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryNotifier {
    pub messages: Vec<String>,
}

impl Notifier for MemoryNotifier {
    fn send(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

impl<N: Notifier + ?Sized> Notifier for &mut N {
    fn send(&mut self, message: &str) {
        (**self).send(message);
    }
}
