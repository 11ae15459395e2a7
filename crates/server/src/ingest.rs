//! Roster Upload Ingestion
//!
//! Turns an uploaded CSV or XLSX file into a [`RosterBatch`]:
//! - format chosen by file extension
//! - headers trimmed, required columns checked
//! - rows grouped by date
//!
//! The uploaded bytes are kept under `<data_dir>/uploads/` while being
//! processed and removed again if anything fails.

use calamine::{Data, DataType, Reader, Xlsx};
use labor_board_core::{RosterBatch, RosterError, RosterTable};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No file was uploaded")]
    MissingFile,

    #[error("Unsupported file type: {file_name}")]
    UnsupportedFormat { file_name: String },

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook parse error: {0}")]
    Workbook(String),

    #[error("Workbook has no worksheets")]
    EmptyWorkbook,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Message returned to the uploader.
    ///
    /// Validation failures get a fixed message; everything else carries
    /// the underlying error text.
    pub fn user_message(&self) -> String {
        match self {
            IngestError::MissingFile => "Error: No file uploaded.".to_string(),
            IngestError::UnsupportedFormat { .. } => "Error: Unsupported file type.".to_string(),
            IngestError::Roster(RosterError::MissingColumns(cols)) => {
                format!("Error: Missing required columns: {}.", cols.join(", "))
            }
            other => format!("An unexpected error occurred: {}", other),
        }
    }

    /// True when the upload itself is at fault rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, IngestError::Io(_))
    }
}

// ============================================================================
// Formats
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    Csv,
    Xlsx,
}

impl RosterFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self, IngestError> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => Ok(RosterFormat::Csv),
            Some("xlsx") => Ok(RosterFormat::Xlsx),
            _ => Err(IngestError::UnsupportedFormat {
                file_name: file_name.to_string(),
            }),
        }
    }
}

/// Decode an upload into a header row plus string cells.
pub fn parse_roster(bytes: &[u8], format: RosterFormat) -> Result<RosterTable, IngestError> {
    match format {
        RosterFormat::Csv => parse_csv(bytes),
        RosterFormat::Xlsx => parse_xlsx(bytes),
    }
}

/// Detect, decode, validate and group an upload in one step.
pub fn read_roster(file_name: &str, bytes: &[u8]) -> Result<RosterBatch, IngestError> {
    let format = RosterFormat::from_file_name(file_name)?;
    let table = parse_roster(bytes, format)?;
    let rows = table.row_count();
    let batch = table.into_batch()?;
    tracing::debug!(
        "Parsed roster {} ({:?}): {} rows, {} dates, {} skipped",
        file_name,
        format,
        rows,
        batch.len(),
        batch.skipped_rows()
    );
    Ok(batch)
}

fn parse_csv(bytes: &[u8]) -> Result<RosterTable, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(RosterTable::new(headers, rows))
}

fn parse_xlsx(bytes: &[u8]) -> Result<RosterTable, IngestError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| IngestError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::EmptyWorkbook)?
        .map_err(|e| IngestError::Workbook(e.to_string()))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(cell_text).collect())
        .unwrap_or_default();
    let rows = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    Ok(RosterTable::new(headers, rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

// ============================================================================
// Upload Artifact
// ============================================================================

/// An uploaded file saved under the upload directory.
#[derive(Debug)]
pub struct UploadArtifact {
    path: PathBuf,
}

impl UploadArtifact {
    /// Write `bytes` to `<upload_dir>/<uuid>_<basename>`.
    ///
    /// Only the final path component of the client-supplied name is used.
    pub fn save(upload_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<Self, IngestError> {
        fs::create_dir_all(upload_dir)?;
        let stored_name = format!(
            "{}_{}",
            uuid::Uuid::new_v4().simple(),
            sanitize_file_name(file_name)
        );
        let path = upload_dir.join(stored_name);
        fs::write(&path, bytes)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the saved file. Failure to remove is logged, not returned.
    pub fn discard(self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Could not remove rejected upload {:?}: {}", self.path, e);
        }
    }
}

/// Basename of a client-supplied file name, safe to join onto a directory.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        "upload".to_string()
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ROSTER_CSV: &str = "Date , Associate Name,Performance \n\
                              2024-07-01,Alice,High\n\
                              2024-07-01,Bob,Low\n\
                              2024-07-02,Carol,High\n";

    #[test]
    fn test_format_from_extension() {
        assert_eq!(RosterFormat::from_file_name("roster.csv").unwrap(), RosterFormat::Csv);
        assert_eq!(RosterFormat::from_file_name("Week 1.XLSX").unwrap(), RosterFormat::Xlsx);
        assert!(matches!(
            RosterFormat::from_file_name("roster.pdf"),
            Err(IngestError::UnsupportedFormat { .. })
        ));
        assert!(RosterFormat::from_file_name("roster").is_err());
    }

    #[test]
    fn test_read_csv_roster() {
        let batch = read_roster("roster.csv", ROSTER_CSV.as_bytes()).unwrap();
        assert_eq!(batch.dates(), vec!["2024-07-01", "2024-07-02"]);
        assert_eq!(
            batch.get("2024-07-01").unwrap().associates(),
            vec!["Alice", "Bob"]
        );
    }

    #[test]
    fn test_missing_column_message() {
        let csv = "Date,Associate Name\n2024-07-01,Alice\n";
        let err = read_roster("roster.csv", csv.as_bytes()).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(
            err.user_message(),
            "Error: Missing required columns: Performance."
        );
    }

    fn roster_workbook() -> Vec<u8> {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let day = ExcelDateTime::from_ymd(2024, 9, 2).unwrap();

        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, " Date ").unwrap();
        sheet.write_string(0, 1, "Associate Name").unwrap();
        sheet.write_string(0, 2, "Performance ").unwrap();

        sheet.write_datetime_with_format(1, 0, &day, &date_format).unwrap();
        sheet.write_string(1, 1, "Alice").unwrap();
        sheet.write_string(1, 2, "High").unwrap();

        sheet.write_datetime_with_format(2, 0, &day, &date_format).unwrap();
        sheet.write_number(2, 1, 42).unwrap();
        sheet.write_string(2, 2, "Low").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_read_xlsx_roster() {
        let batch = read_roster("Roster.XLSX", &roster_workbook()).unwrap();
        assert_eq!(batch.dates(), vec!["2024-09-02"]);

        let day = batch.get("2024-09-02").unwrap();
        assert_eq!(day.associates(), vec!["Alice", "42"]);
        assert!(day.entries[0].is_high());
        assert!(!day.entries[1].is_high());
    }

    #[test]
    fn test_garbage_workbook_is_reported() {
        let err = read_roster("roster.xlsx", b"definitely not a zip").unwrap_err();
        assert!(matches!(err, IngestError::Workbook(_)));
        assert!(err.user_message().starts_with("An unexpected error occurred:"));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\rosters\\week1.csv"), "week1.csv");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[test]
    fn test_artifact_save_and_discard() {
        let dir = tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        let artifact = UploadArtifact::save(&uploads, "../roster.csv", b"x").unwrap();

        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        assert!(path.starts_with(&uploads));
        assert!(path.to_string_lossy().ends_with("_roster.csv"));

        artifact.discard();
        assert!(!path.exists());
    }
}
