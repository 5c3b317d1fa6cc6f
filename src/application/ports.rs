//! Outbound ports — where time comes from and where rendered blocks go
//!
//! The renderer itself is pure; the webhook service pulls the current time
//! from a [`Clock`] and hands the finished block to a [`BlockSink`].

use std::io::Write;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::support::errors::SinkError;

// ── Clock ──────────────────────────────────────────────────────

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant. Useful for reproducible output.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ── BlockSink ──────────────────────────────────────────────────

/// Line-oriented destination for rendered blocks.
pub trait BlockSink: Send + Sync {
    fn write_block(&self, block: &str) -> Result<(), SinkError>;
}

/// Writes each block followed by a newline to stdout, under the stdout lock
/// so concurrent requests never interleave.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl BlockSink for StdoutSink {
    fn write_block(&self, block: &str) -> Result<(), SinkError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", block)?;
        out.flush()?;
        Ok(())
    }
}

/// Keeps blocks in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    blocks: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> Vec<String> {
        match self.blocks.lock() {
            Ok(blocks) => blocks.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl BlockSink for MemorySink {
    fn write_block(&self, block: &str) -> Result<(), SinkError> {
        let mut blocks = match self.blocks.lock() {
            Ok(blocks) => blocks,
            Err(poisoned) => poisoned.into_inner(),
        };
        blocks.push(block.to_string());
        Ok(())
    }
}
