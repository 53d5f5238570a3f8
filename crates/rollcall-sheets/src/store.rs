//! The spreadsheet store abstraction.

use async_trait::async_trait;

use crate::{Result, SheetRange};

/// Rows of string cells, in sheet order.
pub type Rows = Vec<Vec<String>>;

/// A remote key-range store with spreadsheet semantics.
///
/// Implementations give no transactional isolation: a read followed by an
/// append can interleave with other writers.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Reads the populated rows of `range`.
    ///
    /// Trailing empty cells of a row and trailing empty rows are omitted, so
    /// an empty range yields no rows.
    async fn read_range(&self, range: &SheetRange) -> Result<Rows>;

    /// Appends `rows` after the last populated row of the sheet, starting at
    /// the range's first column.
    async fn append_rows(&self, range: &SheetRange, rows: Rows) -> Result<()>;

    /// Overwrites cells starting at the top-left corner of `range`.
    async fn update_range(&self, range: &SheetRange, rows: Rows) -> Result<()>;
}
