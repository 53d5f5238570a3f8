//! In-process spreadsheet store.
//!
//! Mirrors the range semantics of the Sheets API closely enough for the
//! registration service: reads drop trailing blanks, appends land after the
//! last populated row, updates overwrite from the range's top-left cell.
//! Read latency and failures can be injected to exercise fallback paths and
//! the duplicate-check race.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::store::{Rows, SheetStore};
use crate::{Result, SheetError, SheetRange};

/// A [`SheetStore`] held in memory.
#[derive(Debug, Default)]
pub struct MemorySheetStore {
    sheets: RwLock<HashMap<String, Rows>>,
    read_delay: Duration,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    appends: AtomicUsize,
}

impl MemorySheetStore {
    /// Create a store with no tabs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty tab.
    pub fn with_sheet(self, sheet: impl Into<String>) -> Self {
        self.with_rows(sheet, Vec::new())
    }

    /// Add a tab holding `rows`.
    pub fn with_rows(mut self, sheet: impl Into<String>, rows: Rows) -> Self {
        if let Ok(sheets) = self.sheets.get_mut() {
            sheets.insert(sheet.into(), rows);
        }
        self
    }

    /// Delay every read by `delay` after it observes the grid.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    /// Make subsequent reads fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent appends and updates fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of a tab's grid.
    pub fn rows(&self, sheet: &str) -> Option<Rows> {
        self.sheets.read().ok()?.get(sheet).cloned()
    }

    /// Number of reads served or attempted.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of appends attempted.
    pub fn append_count(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SheetError::Unavailable("write failure injected".to_string()));
        }
        Ok(())
    }

    fn snapshot(&self, range: &SheetRange) -> Result<Rows> {
        let sheets = self
            .sheets
            .read()
            .map_err(|e| SheetError::Unavailable(e.to_string()))?;
        let grid = sheets
            .get(range.sheet())
            .ok_or_else(|| SheetError::UnknownSheet(range.sheet().to_string()))?;

        let first_row = range.start().row.map_or(0, |r| (r as usize).saturating_sub(1));
        let end_row = range.end().row.map_or(grid.len(), |r| r as usize);
        let columns = range.start().column as usize..=range.end().column as usize;

        let mut rows: Rows = grid
            .iter()
            .take(end_row)
            .skip(first_row)
            .map(|row| {
                let mut cells: Vec<String> = columns
                    .clone()
                    .map(|c| row.get(c).cloned().unwrap_or_default())
                    .collect();
                while cells.last().is_some_and(String::is_empty) {
                    cells.pop();
                }
                cells
            })
            .collect();
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        Ok(rows)
    }

    fn with_grid<T>(&self, sheet: &str, f: impl FnOnce(&mut Rows) -> T) -> Result<T> {
        let mut sheets = self
            .sheets
            .write()
            .map_err(|e| SheetError::Unavailable(e.to_string()))?;
        let grid = sheets
            .get_mut(sheet)
            .ok_or_else(|| SheetError::UnknownSheet(sheet.to_string()))?;
        Ok(f(grid))
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn read_range(&self, range: &SheetRange) -> Result<Rows> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SheetError::Unavailable("read failure injected".to_string()));
        }

        // Snapshot first: a delayed read reports the grid as it was when the
        // request was issued, like a slow response from the remote API.
        let rows = self.snapshot(range)?;
        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }
        Ok(rows)
    }

    async fn append_rows(&self, range: &SheetRange, rows: Rows) -> Result<()> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;

        let first_column = range.start().column as usize;
        self.with_grid(range.sheet(), |grid| {
            let populated = grid
                .iter()
                .rposition(|row| row.iter().any(|c| !c.is_empty()))
                .map_or(0, |i| i + 1);
            grid.truncate(populated);
            for row in rows {
                let mut padded = vec![String::new(); first_column];
                padded.extend(row);
                grid.push(padded);
            }
        })
    }

    async fn update_range(&self, range: &SheetRange, rows: Rows) -> Result<()> {
        self.check_writable()?;

        let first_row = range.start().row.map_or(0, |r| (r as usize).saturating_sub(1));
        let first_column = range.start().column as usize;
        self.with_grid(range.sheet(), |grid| {
            for (i, row) in rows.into_iter().enumerate() {
                let r = first_row + i;
                if grid.len() <= r {
                    grid.resize_with(r + 1, Vec::new);
                }
                let target = &mut grid[r];
                for (j, cell) in row.into_iter().enumerate() {
                    let c = first_column + j;
                    if target.len() <= c {
                        target.resize(c + 1, String::new());
                    }
                    target[c] = cell;
                }
            }
        })
    }
}
