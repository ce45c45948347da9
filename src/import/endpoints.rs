//! Route handlers for uploading a statement and previewing its import.

use std::collections::{BTreeMap, BTreeSet};

use axum::{
    Extension, Json,
    extract::{Multipart, multipart::MultipartRejection},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::UserID,
    extract::JsonBody,
    import::{
        ColumnMapping, PreviewRow, RawRow, StatementTable, TypeConfig, reconcile_rows,
        statement::extractor_for, suggest_mapping, suggest_type_config,
    },
    transaction::{BulkTransactionItem, TransactionType},
};

/// The rows of an uploaded statement with a suggested mapping.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedStatement {
    #[serde(flatten)]
    pub table: StatementTable,
    pub suggested_mapping: ColumnMapping,
    pub suggested_type_config: TypeConfig,
}

/// The rows to reconcile, the confirmed mapping and the user's per-row changes.
///
/// Row indices start from zero.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub rows: Vec<RawRow>,
    pub column_mapping: ColumnMapping,
    pub type_config: TypeConfig,
    #[serde(default)]
    pub excluded: BTreeSet<usize>,
    #[serde(default)]
    pub type_overrides: BTreeMap<usize, TransactionType>,
    #[serde(default)]
    pub category_overrides: BTreeMap<usize, Option<String>>,
}

/// The reconciled rows and the transactions ready for the bulk endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub rows: Vec<PreviewRow>,
    pub importable_count: usize,
    pub transactions: Vec<BulkTransactionItem>,
}

/// A route handler that extracts the rows of an uploaded statement.
///
/// The first file in the form is read. CSV files are supported, PDF and
/// anything else are rejected with a 400 error.
pub async fn extract_statement_endpoint(
    Extension(user_id): Extension<UserID>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractedStatement>, Error> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("Rejected multipart form: {}", rejection.body_text());
        Error::MultipartError(rejection.body_text())
    })?;

    let field = multipart
        .next_field()
        .await
        .map_err(|error| {
            tracing::error!("Could not read multipart form field: {error}");
            Error::MultipartError(error.body_text())
        })?
        .ok_or_else(|| Error::MultipartError("no file was uploaded".to_owned()))?;

    let content_type = field.content_type().map(str::to_owned);
    let file_name = field.file_name().map(str::to_owned);
    let extractor = extractor_for(content_type.as_deref(), file_name.as_deref())?;

    let data = field.bytes().await.map_err(|error| {
        tracing::error!("Could not read data from multipart form field: {error}");
        Error::MultipartError("could not read the uploaded file".to_owned())
    })?;

    tracing::debug!(
        "User {} uploaded '{}' ({} bytes)",
        user_id,
        file_name.as_deref().unwrap_or("unnamed"),
        data.len()
    );

    let table = extractor.extract(&data)?;

    Ok(Json(ExtractedStatement {
        suggested_mapping: suggest_mapping(&table.headers),
        suggested_type_config: suggest_type_config(&table.headers),
        table,
    }))
}

/// A route handler that reconciles statement rows with the confirmed mapping.
///
/// Nothing is saved. The returned `transactions` are the importable rows in
/// the form expected by the bulk transactions endpoint.
///
/// # Errors
///
/// Returns a 400 error if an exclusion or override refers to a row that does not exist.
pub async fn preview_import_endpoint(
    JsonBody(request): JsonBody<PreviewRequest>,
) -> Result<Json<PreviewResponse>, Error> {
    let mut preview = reconcile_rows(&request.rows, &request.column_mapping, &request.type_config);

    for index in request.excluded {
        preview.toggle_exclude(index)?;
    }

    for (index, transaction_type) in request.type_overrides {
        preview.set_type(index, transaction_type)?;
    }

    for (index, category) in request.category_overrides {
        preview.set_category(index, category)?;
    }

    let transactions = preview.bulk_items();

    Ok(Json(PreviewResponse {
        importable_count: transactions.len(),
        transactions,
        rows: preview.rows,
    }))
}

#[cfg(test)]
mod extract_statement_tests {
    use axum::{
        Extension,
        extract::{FromRequest, Multipart},
        http::Request,
    };

    use crate::{
        Error,
        auth::UserID,
        endpoints,
        import::{ColumnMapping, TypeConfig},
    };

    use super::extract_statement_endpoint;

    const BANK_STATEMENT_CSV: &str = "Date,Details,Amount In,Amount Out\n\
                                      02/07/2024,Salary,2500.00,\n\
                                      03/07/2024,Coffee,,4.50\n";

    async fn must_make_multipart(file_name: &str, content_type: &str, contents: &str) -> Multipart {
        let boundary = "MY_BOUNDARY123456789";
        let data = [
            format!("--{boundary}"),
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\""),
            format!("Content-Type: {content_type}"),
            String::new(),
            contents.to_owned(),
            format!("--{boundary}--"),
        ]
        .join("\r\n")
        .into_bytes();

        let request = Request::builder()
            .method("POST")
            .uri(endpoints::IMPORT_EXTRACT)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(data.into())
            .unwrap();

        Multipart::from_request(request, &{}).await.unwrap()
    }

    #[tokio::test]
    async fn extracts_csv_with_suggestions() {
        let multipart = must_make_multipart("statement.csv", "text/csv", BANK_STATEMENT_CSV).await;

        let result = extract_statement_endpoint(Extension(UserID::new(1)), Ok(multipart))
            .await
            .unwrap();

        assert_eq!(
            result.table.headers,
            ["Date", "Details", "Amount In", "Amount Out"]
        );
        assert_eq!(result.table.rows.len(), 2);
        assert_eq!(result.table.rows[1]["Amount Out"], "4.50");
        assert_eq!(
            result.suggested_mapping,
            ColumnMapping {
                date: Some("Date".to_owned()),
                amount: Some("Amount In".to_owned()),
                description: None,
                category: None,
            }
        );
        assert_eq!(
            result.suggested_type_config,
            TypeConfig::SeparateColumns {
                credit_column: "Amount In".to_owned(),
                debit_column: "Amount Out".to_owned(),
            }
        );
    }

    #[tokio::test]
    async fn rejects_pdf_statements() {
        let multipart = must_make_multipart("statement.pdf", "application/pdf", "%PDF-1.7").await;

        let result = extract_statement_endpoint(Extension(UserID::new(1)), Ok(multipart)).await;

        assert_eq!(
            result.unwrap_err(),
            Error::UnsupportedStatement("PDF".to_owned())
        );
    }

    #[tokio::test]
    async fn rejects_other_file_types() {
        let multipart = must_make_multipart("receipt.png", "image/png", "not a statement").await;

        let result = extract_statement_endpoint(Extension(UserID::new(1)), Ok(multipart)).await;

        assert!(matches!(result, Err(Error::UnsupportedFileType(_))));
    }
}
