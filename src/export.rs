//! CSV export with column selection

use crate::constants::msg_bad_column;
use crate::duration;
use crate::error::{err, FieldErrors, Result};
use crate::model::{LinkedRecord, Widget};

/// A record that can be written as one CSV row
pub trait Tabular {
    /// Default column set, in output order
    const COLUMNS: &'static [&'static str];

    fn cell(&self, column: &str) -> String;
}

impl Tabular for LinkedRecord {
    const COLUMNS: &'static [&'static str] = &["id", "partner_id", "name", "image_id", "link", "created_at"];

    fn cell(&self, column: &str) -> String {
        match column {
            "id" => self.id.to_string(),
            "partner_id" => self.partner.to_string(),
            "name" => self.name.clone(),
            "image_id" => self.image.to_string(),
            "link" => self.link.clone(),
            "created_at" => self.created_at.to_rfc3339(),
            _ => String::new(),
        }
    }
}

impl Tabular for Widget {
    const COLUMNS: &'static [&'static str] = &["id", "partner_id", "name", "logo_id", "change_frequency", "created_at"];

    fn cell(&self, column: &str) -> String {
        match column {
            "id" => self.id.to_string(),
            "partner_id" => self.partner.to_string(),
            "name" => self.name.clone(),
            "logo_id" => self.logo.to_string(),
            "change_frequency" => duration::to_tabular(self.change_frequency_secs),
            "created_at" => self.created_at.to_rfc3339(),
            _ => String::new(),
        }
    }
}

/// Resolve a column selection; empty means every column, order is always the default
pub fn select_columns<T: Tabular>(requested: &[String]) -> Result<Vec<&'static str>> {
    let mut errors = FieldErrors::new();
    for c in requested {
        if !T::COLUMNS.contains(&c.as_str()) {
            errors.add("column", msg_bad_column(c));
        }
    }
    errors.into_result()?;
    if requested.is_empty() {
        return Ok(T::COLUMNS.to_vec());
    }
    Ok(T::COLUMNS
        .iter()
        .copied()
        .filter(|c| requested.iter().any(|r| r == c))
        .collect())
}

/// Write a header row and one row per record
pub fn to_csv<T: Tabular>(rows: &[T], columns: &[&str]) -> Result<String> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(columns).map_err(err)?;
    for row in rows {
        w.write_record(columns.iter().map(|c| row.cell(c))).map_err(err)?;
    }
    let bytes = w.into_inner().map_err(|e| err(e.into_error()))?;
    String::from_utf8(bytes).map_err(err)
}
