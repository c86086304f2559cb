//! Service layer for the dashboard workflows.
//!
//! Services sit between the HTTP layer and the record store. They run
//! operator input through the validation gate, convert between local and UTC
//! time, and shape store rows for display.

pub mod charts;
pub mod entry;
pub mod error;
pub mod export;
pub mod table;
pub mod validation;

pub use charts::{chart_series, ChartData, ChartPoint, ChartSeries, SummaryRow};
pub use entry::{
    amend_reading, edit_sensor, recent_readings, register_sensor, submit_reading, ReadingForm,
    ReadingRow, SensorForm,
};
pub use error::{ServiceError, ServiceResult};
pub use export::{export_csv, CsvExport};
pub use table::{
    table_page, table_rows, DateRangePreset, Pagination, SortOrder, TablePage, TableQuery,
    TableRow,
};
pub use validation::{ValidationError, ValidationResult, ValueGate};
