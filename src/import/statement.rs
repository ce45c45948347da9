//! Extraction of tables of raw text from uploaded bank statements.
//!
//! An extractor turns the bytes of a statement into a header list and a list
//! of rows keyed by header. No interpretation of the cells happens here, that
//! is left to [crate::import::reconcile_rows] once the user has confirmed
//! which columns hold which fields.

use std::collections::BTreeMap;

use csv::{ReaderBuilder, Trim};
use serde::Serialize;

use crate::Error;

/// One statement row: cell text keyed by column header.
pub type RawRow = BTreeMap<String, String>;

/// The headers and rows extracted from a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatementTable {
    /// The column headers in the order they appear in the statement.
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Turns the bytes of an uploaded statement into a [StatementTable].
pub trait StatementExtractor {
    /// Extract the header row and data rows from `bytes`.
    fn extract(&self, bytes: &[u8]) -> Result<StatementTable, Error>;
}

/// Reads comma separated values where the first record is the header row.
///
/// Cells are trimmed, blank lines are skipped and short rows are padded with
/// empty cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExtractor;

impl StatementExtractor for CsvExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<StatementTable, Error> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(bytes);

        let raw_headers = reader
            .headers()
            .map_err(|error| Error::InvalidCSV(error.to_string()))?;

        if raw_headers.iter().all(str::is_empty) {
            return Err(Error::InvalidCSV("the file has no header row".to_owned()));
        }

        let headers = unique_headers(raw_headers.iter());

        let mut rows = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|error| {
                tracing::debug!("Could not read CSV record {}: {error}", index + 1);
                Error::InvalidCSV(format!("row {}: {error}", index + 1))
            })?;

            if record.iter().all(str::is_empty) {
                continue;
            }

            let row: RawRow = headers
                .iter()
                .enumerate()
                .map(|(column, header)| {
                    let cell = record.get(column).unwrap_or_default();
                    (header.clone(), cell.to_owned())
                })
                .collect();

            rows.push(row);
        }

        tracing::debug!(
            "Extracted {} rows with {} columns from CSV",
            rows.len(),
            headers.len()
        );

        Ok(StatementTable { headers, rows })
    }
}

/// Number repeated headers so each column keeps its own key, e.g. a second
/// "Amount" column becomes "Amount_2".
fn unique_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let headers: Vec<&str> = headers.collect();
    let mut unique: Vec<String> = Vec::with_capacity(headers.len());

    for header in &headers {
        let mut candidate = (*header).to_owned();
        let mut suffix = 2;

        while unique.contains(&candidate)
            || (candidate != *header && headers.contains(&candidate.as_str()))
        {
            candidate = format!("{header}_{suffix}");
            suffix += 1;
        }

        if candidate != *header {
            tracing::debug!("Renamed repeated CSV header {header:?} to {candidate:?}");
        }

        unique.push(candidate);
    }

    unique
}

/// The extractor for PDF statements.
///
/// PDF statements have no fixed layout to read a table from, so extraction is
/// not supported and every call fails with [Error::UnsupportedStatement].
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl StatementExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<StatementTable, Error> {
        tracing::debug!("Rejecting PDF statement of {} bytes", bytes.len());

        Err(Error::UnsupportedStatement("PDF".to_owned()))
    }
}

/// Choose the extractor for an upload from its content type and file name.
///
/// # Errors
/// Returns [Error::UnsupportedFileType] if the upload is neither CSV nor PDF.
pub fn extractor_for(
    content_type: Option<&str>,
    file_name: Option<&str>,
) -> Result<Box<dyn StatementExtractor + Send>, Error> {
    let content_type = content_type
        .map(|content_type| content_type.split(';').next().unwrap_or_default().trim())
        .unwrap_or_default()
        .to_lowercase();
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, extension)| extension.to_lowercase())
        .unwrap_or_default();

    if content_type == "text/csv" || extension == "csv" {
        Ok(Box::new(CsvExtractor))
    } else if content_type == "application/pdf" || extension == "pdf" {
        Ok(Box::new(PdfExtractor))
    } else {
        let description = match (content_type.is_empty(), file_name) {
            (false, _) => content_type,
            (true, Some(name)) => name.to_owned(),
            (true, None) => "unknown".to_owned(),
        };

        Err(Error::UnsupportedFileType(description))
    }
}

#[cfg(test)]
mod csv_extractor_tests {
    use crate::{
        Error,
        import::{CsvExtractor, PdfExtractor, StatementExtractor},
    };

    use super::extractor_for;

    #[test]
    fn extracts_headers_and_rows() {
        let csv = "Date, Details ,Amount In,Amount Out\n\
                   02/07/2024,Salary,2500.00,\n\
                   \n\
                   03/07/2024,\"Coffee, large\",,4.50\n";

        let table = CsvExtractor.extract(csv.as_bytes()).unwrap();

        assert_eq!(table.headers, ["Date", "Details", "Amount In", "Amount Out"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Details"], "Salary");
        assert_eq!(table.rows[0]["Amount Out"], "");
        assert_eq!(table.rows[1]["Details"], "Coffee, large");
        assert_eq!(table.rows[1]["Amount Out"], "4.50");
    }

    #[test]
    fn pads_short_rows() {
        let csv = "Date,Description,Amount\n2024-01-01,Rent\n";

        let table = CsvExtractor.extract(csv.as_bytes()).unwrap();

        assert_eq!(table.rows[0]["Amount"], "");
    }

    #[test]
    fn repeated_headers_keep_every_column() {
        let csv = "Date,Importo,Importo,Importo_2\n2024-01-01,10,-20,30\n";

        let table = CsvExtractor.extract(csv.as_bytes()).unwrap();

        assert_eq!(
            table.headers,
            ["Date", "Importo", "Importo_3", "Importo_2"]
        );
        assert_eq!(table.rows[0]["Importo"], "10");
        assert_eq!(table.rows[0]["Importo_3"], "-20");
        assert_eq!(table.rows[0]["Importo_2"], "30");
    }

    #[test]
    fn empty_file_is_invalid() {
        let result = CsvExtractor.extract(b"");

        assert!(matches!(result, Err(Error::InvalidCSV(_))));
    }

    #[test]
    fn pdf_is_not_supported() {
        let result = PdfExtractor.extract(b"%PDF-1.7");

        assert_eq!(result, Err(Error::UnsupportedStatement("PDF".to_owned())));
    }

    #[test]
    fn chooses_extractor_by_type_or_extension() {
        assert!(extractor_for(Some("text/csv"), None).is_ok());
        assert!(extractor_for(Some("application/vnd.ms-excel"), Some("bank.CSV")).is_ok());

        let pdf = extractor_for(Some("application/pdf"), Some("bank.pdf")).unwrap();
        assert!(matches!(
            pdf.extract(b"%PDF"),
            Err(Error::UnsupportedStatement(_))
        ));

        assert!(matches!(
            extractor_for(Some("image/png"), Some("receipt.png")),
            Err(Error::UnsupportedFileType(_))
        ));
    }
}
