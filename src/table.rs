use std::io::Write;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Result;
use crate::record::{Record, FIXED_COLUMNS};

/// Decoded records in file order. Records may carry different columns; they are only reconciled
/// into one rectangular table when written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn new(records: Vec<Record>) -> Self {
        Table { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The union of all record columns: the fixed columns first, then every other column in the
    /// order it first appears across records.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = FIXED_COLUMNS.to_vec();
        let mut seen: FxHashSet<&str> = columns.iter().copied().collect();
        for column in self.records.iter().flat_map(|r| r.columns()) {
            if seen.insert(column) {
                columns.push(column);
            }
        }
        columns
    }

    /// Write a header row and one row per record. Cells a record has no value for are empty.
    pub fn write<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let columns = self.columns();
        let index: FxHashMap<&str, usize> =
            columns.iter().enumerate().map(|(i, &c)| (c, i)).collect();

        let mut wtr = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        wtr.write_record(&columns)?;

        let mut row = vec![""; columns.len()];
        for record in &self.records {
            row.fill("");
            for (column, value) in record.iter() {
                row[index[column]] = value;
            }
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
