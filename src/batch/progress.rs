//! Batch progress snapshots

use serde::Serialize;

/// Snapshot emitted after each processed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    /// Items processed so far (1-based)
    pub current: usize,
    /// Items in the whole batch
    pub total: usize,
    /// `current / total` as a rounded percentage
    pub percentage: u8,
    /// Identifier just processed
    pub current_item: Option<String>,
}

impl BatchProgress {
    pub fn new(current: usize, total: usize, current_item: Option<String>) -> Self {
        Self {
            current,
            total,
            percentage: percentage(current, total),
            current_item,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}

fn percentage(current: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (current as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}
