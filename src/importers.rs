// Sample table importers for the station's spreadsheet exports (CSV and XLSX)

pub mod csv_importer;
pub mod excel_importer;
pub mod schema;

// Re-export commonly used items
pub use csv_importer::CsvImporter;
pub use excel_importer::ExcelImporter;
pub use schema::{ColumnMap, ImportError, REQUIRED_COLUMNS};
