//! CSV export of the data table.

use std::borrow::Cow;

use super::error::ServiceResult;
use super::table::{table_rows, TableQuery, TableRow};
use crate::db::repository::FullRepository;
use crate::models::Instant;
use crate::time::TimestampNormalizer;

pub const CSV_HEADER: [&str; 4] = ["Sensor", "Unit", "Timestamp", "Value"];

/// A rendered export, ready to be served as an attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

/// Quote a field when it contains a delimiter, quote or line break;
/// embedded quotes are doubled.
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Render rows with the header line. Lines end with `\n`.
pub fn to_csv(rows: &[TableRow]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');
    for row in rows {
        let value = row.value.to_string();
        let fields = [
            csv_field(&row.sensor),
            csv_field(&row.unit),
            csv_field(&row.timestamp),
            csv_field(&value),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// `biogas_sensor_data_YYYYMMDD.csv`, dated in local time.
pub fn export_filename(normalizer: &TimestampNormalizer, now: Instant) -> String {
    format!(
        "biogas_sensor_data_{}.csv",
        normalizer.format_local(now, "%Y%m%d")
    )
}

/// Export the rows the table shows for `query`.
pub async fn export_csv<R: FullRepository + ?Sized>(
    repo: &R,
    normalizer: &TimestampNormalizer,
    query: &TableQuery,
) -> ServiceResult<CsvExport> {
    let rows = table_rows(repo, normalizer, query).await?;
    log::info!("Exporting {} rows to CSV", rows.len());
    Ok(CsvExport {
        filename: export_filename(normalizer, normalizer.now_utc()),
        body: to_csv(&rows),
    })
}
