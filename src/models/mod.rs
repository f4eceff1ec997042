//! Data models for Graph entities

mod message;
mod user;

pub use message::*;
pub use user::*;

use serde::Deserialize;

/// One page of a Graph collection.
///
/// Truncation and ordering are applied service-side via `$top`/`$orderby`;
/// `next_link` is present when the service has more results.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}
