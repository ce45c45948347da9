#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod http;

pub(crate) use db::{create_test_user, get_test_connection, shared_connection};
pub(crate) use http::{assert_error_status, get_test_server, log_in_test_user, parse_json_body};
