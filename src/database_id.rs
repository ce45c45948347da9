//! Database ID type definition.

use serde::Deserialize;

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// The `?id=N` query string used to address a single resource, e.g. for deletes.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IdQuery {
    pub id: DatabaseId,
}
