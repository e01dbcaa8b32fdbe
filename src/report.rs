//! Tabular report of matched constructions
//!
//! One row per construction, always in this column order:
//! `Construction Head`, `Ezafe`, `First Attribute`, `Other Attributes`,
//! `Children`. The list columns join token forms with `", "`.
//! The CSV file and the console table both print the header even when there
//! are no rows.

use crate::error::EzafeError;
use crate::matcher::Construction;
use crate::token::Token;
use prettytable::{Cell, Row, Table, format};
use serde::Serialize;
use std::io;
use std::path::Path;

/// Report column names, in output order
pub const COLUMNS: [&str; 5] = [
    "Construction Head",
    "Ezafe",
    "First Attribute",
    "Other Attributes",
    "Children",
];

/// Separator for the list-valued columns
pub const LIST_SEPARATOR: &str = ", ";

/// Flattened, owned form of a `Construction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Construction Head")]
    pub head: String,
    #[serde(rename = "Ezafe")]
    pub ezafe: String,
    #[serde(rename = "First Attribute")]
    pub first_attribute: String,
    #[serde(rename = "Other Attributes")]
    pub other_attributes: String,
    #[serde(rename = "Children")]
    pub children: String,
}

impl ReportRow {
    pub fn from_construction(construction: &Construction<'_>) -> Self {
        Self {
            head: construction.head.form.clone(),
            ezafe: construction.particle.form.clone(),
            first_attribute: construction.attribute.form.clone(),
            other_attributes: join_forms(&construction.co_attributes),
            children: join_forms(&construction.children),
        }
    }

    /// Cell values in column order
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.head,
            &self.ezafe,
            &self.first_attribute,
            &self.other_attributes,
            &self.children,
        ]
    }
}

fn join_forms(tokens: &[&Token]) -> String {
    tokens
        .iter()
        .map(|t| t.form.as_str())
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// Write rows as CSV, header first
pub fn write_csv<W: io::Write>(writer: W, rows: &[ReportRow]) -> Result<(), EzafeError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    write_records(&mut wtr, rows)
}

/// Write rows as CSV to a file, replacing it
pub fn write_csv_file(path: &Path, rows: &[ReportRow]) -> Result<(), EzafeError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    write_records(&mut wtr, rows)
}

fn write_records<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[ReportRow]) -> Result<(), EzafeError> {
    // Written by hand so an empty report still has its header
    wtr.write_record(COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render rows as a bordered text table for the terminal
///
/// Cells are centred; widths are measured in display cells, so
/// transliterations with combining marks still line up.
pub fn render_table(rows: &[ReportRow]) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(centred_row(&COLUMNS));
    for row in rows {
        table.add_row(centred_row(&row.cells()));
    }
    table.to_string()
}

fn centred_row(cells: &[&str]) -> Row {
    Row::new(cells.iter().map(|cell| Cell::new(cell).style_spec("c")).collect())
}
