//! Remote document store adapters
//!
//! - `http`: REST client for the hosted document store
//! - `query`: structured field filters shared with in-memory stores

mod http;
mod query;

pub use http::{DocumentList, HttpDocumentStore, build_http_client};
pub use query::{FieldFilter, FilterOp, PREFIX_SENTINEL, StructuredQuery};
