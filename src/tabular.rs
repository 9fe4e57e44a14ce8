//! Delimited file input and output
//!
//! Reading is all-or-nothing: any malformed row fails the whole read. Writing checks
//! the shape of every row before the destination file is touched.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// One input row, keyed by header name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputRow {
    fields: HashMap<String, String>,
}

impl InputRow {
    /// Value of `column`, if the input has that column
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Whether the input has `column`
    pub fn has_column(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InputRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Read every row of a comma-separated file, using the first line as header names
///
/// # Errors
/// - [`Error::Io`] if the file cannot be opened or read
/// - [`Error::Format`] if the header row is missing, a row's field count differs
///   from the header's, or the content is not valid UTF-8 CSV
pub fn read_rows(path: &Path) -> Result<Vec<InputRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::from_csv(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| Error::from_csv(path, e))?
        .clone();
    if headers.is_empty() {
        return Err(Error::Format {
            path: path.to_path_buf(),
            line: None,
            message: "missing header row".into(),
        });
    }

    let mut rows: Vec<InputRow> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::from_csv(path, e))?;
        if record.len() != headers.len() {
            return Err(Error::Format {
                path: path.to_path_buf(),
                line: record.position().map(|p| p.line()),
                message: format!(
                    "row length ({}) does not match header length ({})",
                    record.len(),
                    headers.len()
                ),
            });
        }
        rows.push(headers.iter().zip(record.iter()).collect());
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "Read input rows");
    Ok(rows)
}

/// Write `header` followed by `rows` to `path`, replacing any existing content
///
/// # Errors
/// - [`Error::Format`] if any row's length differs from the header's (nothing is written)
/// - [`Error::Io`] if the file cannot be created or written
pub fn write_rows<R>(path: &Path, header: &[&str], rows: &[R]) -> Result<()>
where
    R: AsRef<[String]>,
{
    if let Some((index, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.as_ref().len() != header.len())
    {
        return Err(Error::Format {
            path: path.to_path_buf(),
            line: Some(index as u64 + 2),
            message: format!(
                "row has {} cells but the header has {}",
                row.as_ref().len(),
                header.len()
            ),
        });
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::from_csv(path, e))?;
    writer
        .write_record(header)
        .map_err(|e| Error::from_csv(path, e))?;
    for row in rows {
        writer
            .write_record(row.as_ref())
            .map_err(|e| Error::from_csv(path, e))?;
    }
    writer.flush().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), rows = rows.len(), "Wrote report rows");
    Ok(())
}
