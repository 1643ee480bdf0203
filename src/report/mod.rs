pub mod types;

pub use types::ReportRow;

use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

pub const TABLE_HEADER: &str = "PR ID | Branch | Base Branch | CommitDiff | Created At";
pub const TABLE_SEPARATOR: &str = "------|--------|-------------|------------|-----------";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Render the pipe-delimited table, header first, one line per row.
pub fn render_table(rows: &[ReportRow]) -> String {
    let mut table = String::new();
    table.push_str(TABLE_HEADER);
    table.push('\n');
    table.push_str(TABLE_SEPARATOR);
    table.push('\n');
    for row in rows {
        table.push_str(&row.to_string());
        table.push('\n');
    }
    table
}

/// Print the table to stdout (default) or write it to `output_path`.
#[instrument(skip(rows), fields(rows = rows.len()))]
pub fn output(rows: &[ReportRow], output_path: Option<&Path>) -> Result<(), ReportError> {
    let table = render_table(rows);
    match output_path {
        None => {
            debug!("writing report to terminal");
            print!("{table}");
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing report to file");
            std::fs::write(path, table)?;
            Ok(())
        }
    }
}
