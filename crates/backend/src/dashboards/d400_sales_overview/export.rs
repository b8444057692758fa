use contracts::dashboards::d400_sales_overview::RawTable;

use super::error::DashboardError;

pub const CSV_FILE_NAME: &str = "sales_raw_data.csv";

/// Raw table as CSV with a header row
pub fn to_csv(table: &RawTable) -> Result<Vec<u8>, DashboardError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| DashboardError::Export(e.to_string()))
}
