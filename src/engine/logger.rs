use crate::domain::{Decimal, TimeMs};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Tag describing which transition produced a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogMessage {
    Initialization,
    Open,
    Increase,
    Decrease,
    Flat,
    Reverse,
    Mtm,
}

impl LogMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogMessage::Initialization => "INITIALIZATION",
            LogMessage::Open => "OPEN",
            LogMessage::Increase => "INCREASE",
            LogMessage::Decrease => "DECREASE",
            LogMessage::Flat => "FLAT",
            LogMessage::Reverse => "REVERSE",
            LogMessage::Mtm => "MTM",
        }
    }
}

impl std::fmt::Display for LogMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accounting snapshot taken right after one processed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: TimeMs,
    pub message: LogMessage,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
    pub total_commission: Decimal,
    pub equity: Decimal,
    pub base_capital: Decimal,
}

/// Append-only accumulator for log entries.
///
/// Entries are addressed by position, never by timestamp, so two events at
/// the same instant both survive.
#[derive(Debug, Default)]
pub struct EquityLogger {
    entries: Vec<LogEntry>,
}

impl EquityLogger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn finish(self) -> EquityCurve {
        EquityCurve {
            entries: self.entries,
        }
    }
}

/// Finished equity curve in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EquityCurve {
    entries: Vec<LogEntry>,
}

impl EquityCurve {
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LogEntry> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.entries.iter()
    }

    /// Entries with `from <= timestamp <= to`, paired with their index in the
    /// full curve. Open bounds are unbounded.
    pub fn window(
        &self,
        from: Option<TimeMs>,
        to: Option<TimeMs>,
    ) -> impl Iterator<Item = (usize, &LogEntry)> {
        self.entries.iter().enumerate().filter(move |(_, e)| {
            from.map_or(true, |f| e.timestamp >= f) && to.map_or(true, |t| e.timestamp <= t)
        })
    }

    /// SHA-256 over the canonical rendering of every entry, hex encoded.
    ///
    /// Identical inputs replay to identical digests.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in &self.entries {
            hasher.update(entry.timestamp.as_i64().to_le_bytes());
            hasher.update(entry.message.as_str());
            for value in [
                entry.unrealized_pnl,
                entry.realized_pnl,
                entry.total_commission,
                entry.equity,
                entry.base_capital,
            ] {
                hasher.update(b"|");
                hasher.update(value.to_canonical_string());
            }
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

impl IntoIterator for EquityCurve {
    type Item = LogEntry;
    type IntoIter = std::vec::IntoIter<LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a EquityCurve {
    type Item = &'a LogEntry;
    type IntoIter = std::slice::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
