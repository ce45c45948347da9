//! Request extractors that report malformed input as JSON API errors.
//!
//! The plain axum extractors reject bad input with a plain-text body and a
//! mix of 400, 415 and 422 status codes. These wrappers turn every rejection
//! into [Error::ValidationError] so clients always receive `{"error": ...}`
//! with status 400.

use axum::extract::{
    FromRequest, FromRequestParts,
    rejection::{JsonRejection, QueryRejection},
};

use crate::Error;

/// Like [axum::Json], but rejections become [Error::ValidationError].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Like [axum::extract::Query], but rejections become [Error::ValidationError].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::ValidationError(rejection.body_text())
    }
}
