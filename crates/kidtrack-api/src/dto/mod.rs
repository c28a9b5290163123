//! Request body and query-parameter types.

pub mod request;
