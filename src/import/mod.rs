//! Importing transactions from bank statements.
//!
//! An upload is first extracted into a table of raw text. The user confirms
//! which columns hold which fields and how income is told apart from
//! expenses, then the rows are reconciled into a preview. The importable rows
//! of the preview are submitted to the bulk transactions endpoint.

mod detect;
mod endpoints;
mod mapping;
mod parse;
mod reconcile;
mod statement;

pub use detect::{suggest_mapping, suggest_type_config};
pub use endpoints::{extract_statement_endpoint, preview_import_endpoint};
pub use mapping::{ColumnMapping, TypeConfig};
pub use parse::{parse_amount, parse_date};
pub use reconcile::{ImportPreview, PreviewRow, RowError, reconcile_rows};
pub use statement::{CsvExtractor, PdfExtractor, RawRow, StatementExtractor, StatementTable};
