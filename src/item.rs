//! Image item & page result model plus the wire-format (de)serialization for
//! the listing service's JSON contract.

use serde::{Deserialize, Serialize};

/// A single gallery image. Fields carry provider URLs and metadata; the
/// timestamp is passed through verbatim as the provider's string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    pub id: String,
    pub src: String,
    pub thumb: String,
    pub caption: String,
    #[serde(rename = "ts")]
    pub timestamp: String,
}

/// One page of images plus the cursor for the next page. The token is absent
/// on the last page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<ImageItem>,
    #[serde(rename = "nextPageToken", skip_serializing_if = "Option::is_none", default)]
    pub next_page_token: Option<String>,
}

/// Error body returned by the listing service: a generic message plus an
/// optional detail string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<String>,
}
