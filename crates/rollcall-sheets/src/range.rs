//! A1-notation ranges.
//!
//! Only the shapes Rollcall uses are supported: whole columns (`Sheet!A:E`),
//! bounded cell ranges (`Sheet!A1:E1`) and single cells (`Sheet!A1`).
//! Columns are zero-based internally, rows one-based as in A1 notation.

use std::fmt;

use crate::{Result, SheetError};

/// One end of a range: a column and an optional row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    /// Zero-based column index (`A` is 0).
    pub column: u32,
    /// One-based row, or `None` for an open-ended column reference.
    pub row: Option<u32>,
}

/// A rectangular range on one tab of a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    sheet: String,
    start: CellRef,
    end: CellRef,
}

impl SheetRange {
    /// Whole columns `first..=last` of `sheet`, e.g. `Invitees!C:D`.
    pub fn columns(sheet: impl Into<String>, first: u32, last: u32) -> Self {
        Self {
            sheet: sheet.into(),
            start: CellRef {
                column: first,
                row: None,
            },
            end: CellRef {
                column: last,
                row: None,
            },
        }
    }

    /// Columns `first..=last` of a single row, e.g. `Invitees!A1:E1`.
    ///
    /// Rows are one-based; row `0` is clamped to row `1`.
    pub fn row(sheet: impl Into<String>, row: u32, first: u32, last: u32) -> Self {
        let row = row.max(1);
        Self {
            sheet: sheet.into(),
            start: CellRef {
                column: first,
                row: Some(row),
            },
            end: CellRef {
                column: last,
                row: Some(row),
            },
        }
    }

    /// Parses `Sheet!A:E`, `'My Sheet'!A1:E1` or `Sheet!B2`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || SheetError::InvalidRange(s.to_string());

        let (sheet, cells) = s.rsplit_once('!').ok_or_else(invalid)?;
        let sheet = unquote_sheet(sheet).ok_or_else(invalid)?;

        let (start, end) = match cells.split_once(':') {
            Some((a, b)) => (
                parse_cell(a).ok_or_else(invalid)?,
                parse_cell(b).ok_or_else(invalid)?,
            ),
            None => {
                let cell = parse_cell(cells).ok_or_else(invalid)?;
                (cell, cell)
            }
        };

        if start.row.is_some() != end.row.is_some()
            || start.column > end.column
            || start.row > end.row
        {
            return Err(invalid());
        }

        Ok(Self { sheet, start, end })
    }

    /// Name of the tab.
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// Top-left corner.
    pub fn start(&self) -> CellRef {
        self.start
    }

    /// Bottom-right corner.
    pub fn end(&self) -> CellRef {
        self.end
    }

    /// Number of columns covered.
    pub fn width(&self) -> usize {
        (self.end.column - self.start.column + 1) as usize
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if needs_quotes(&self.sheet) {
            write!(f, "'{}'!", self.sheet.replace('\'', "''"))?;
        } else {
            write!(f, "{}!", self.sheet)?;
        }
        write_cell(f, self.start)?;
        if self.start != self.end || self.start.row.is_none() {
            f.write_str(":")?;
            write_cell(f, self.end)?;
        }
        Ok(())
    }
}

/// Converts a zero-based column index to letters (`0` → `A`, `26` → `AA`).
fn column_name(mut index: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Converts column letters to a zero-based index (`A` → `0`, `AA` → `26`).
fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut index: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

fn write_cell(f: &mut fmt::Formatter<'_>, cell: CellRef) -> fmt::Result {
    f.write_str(&column_name(cell.column))?;
    if let Some(row) = cell.row {
        write!(f, "{row}")?;
    }
    Ok(())
}

fn parse_cell(s: &str) -> Option<CellRef> {
    let split = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
    let (letters, digits) = s.split_at(split);
    let column = column_index(letters)?;
    let row = if digits.is_empty() {
        None
    } else {
        match digits.parse::<u32>().ok()? {
            0 => return None,
            n => Some(n),
        }
    };
    Some(CellRef { column, row })
}

fn needs_quotes(sheet: &str) -> bool {
    !sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn unquote_sheet(s: &str) -> Option<String> {
    if s.is_empty() {
        return None;
    }
    match s.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')) {
        Some(inner) => Some(inner.replace("''", "'")),
        None => Some(s.to_string()),
    }
}
