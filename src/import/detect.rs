//! Best-effort guesses at the column mapping and type strategy of a statement.
//!
//! The guesses pre-fill the import form. They are never trusted: the caller
//! always sends back the mapping the user confirmed.

use crate::import::{
    ColumnMapping, TypeConfig,
    mapping::{DEFAULT_EXPENSE_KEYWORDS, DEFAULT_INCOME_KEYWORDS, keywords},
};

const DATE_HINTS: [&str; 2] = ["date", "data"];
const AMOUNT_HINTS: [&str; 4] = ["amount", "importo", "value", "valore"];
const DESCRIPTION_HINTS: [&str; 3] = ["description", "descrizione", "causale"];
const CATEGORY_HINTS: [&str; 2] = ["category", "categoria"];
const TYPE_HINTS: [&str; 2] = ["type", "tipo"];

/// Map each field to the first header containing one of its hints, ignoring case.
pub fn suggest_mapping(headers: &[String]) -> ColumnMapping {
    ColumnMapping {
        date: find_header(headers, &DATE_HINTS),
        amount: find_header(headers, &AMOUNT_HINTS),
        description: find_header(headers, &DESCRIPTION_HINTS),
        category: find_header(headers, &CATEGORY_HINTS),
    }
}

/// Guess how to tell income from expenses.
///
/// One header naming income and one naming expenses suggests separate
/// columns, a header named like "type" suggests a type column, and anything
/// else falls back to the sign of the amount.
pub fn suggest_type_config(headers: &[String]) -> TypeConfig {
    let income_keywords = keywords(DEFAULT_INCOME_KEYWORDS);
    let expense_keywords = keywords(DEFAULT_EXPENSE_KEYWORDS);

    let income_headers: Vec<&String> = headers
        .iter()
        .filter(|header| has_keyword(header, &income_keywords))
        .collect();
    let expense_headers: Vec<&String> = headers
        .iter()
        .filter(|header| has_keyword(header, &expense_keywords))
        .collect();

    if let ([credit], [debit]) = (income_headers.as_slice(), expense_headers.as_slice()) {
        if credit != debit {
            return TypeConfig::SeparateColumns {
                credit_column: (*credit).clone(),
                debit_column: (*debit).clone(),
            };
        }
    }

    if let Some(type_column) = find_header(headers, &TYPE_HINTS) {
        return TypeConfig::TypeColumn {
            type_column,
            income_values: DEFAULT_INCOME_KEYWORDS.to_owned(),
            expense_values: DEFAULT_EXPENSE_KEYWORDS.to_owned(),
        };
    }

    TypeConfig::Sign
}

fn find_header(headers: &[String], hints: &[&str]) -> Option<String> {
    headers
        .iter()
        .find(|header| {
            let header = header.to_lowercase();
            hints.iter().any(|hint| header.contains(hint))
        })
        .cloned()
}

/// Whether one of the words of `header` is one of `keywords`.
fn has_keyword(header: &str, keywords: &[String]) -> bool {
    header
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| keywords.iter().any(|keyword| keyword == word))
}
