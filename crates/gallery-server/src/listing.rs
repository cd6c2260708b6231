//! Pure listing core: limit clamping, cursor resolution, and the mapping
//! from provider files to wire items.

use rust_photo_gallery::item::{ImageItem, PageResult};

use crate::drive::{FileEntry, FolderSource};
use crate::error::ServiceError;

pub const DEFAULT_PAGE_SIZE: u32 = 24;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query accepted by the photos endpoint. The opaque `page_token` is the
/// canonical cursor; the numeric `page` is kept for the legacy widget
/// variant and is translated to a token internally.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub page_token: Option<String>,
    pub page: Option<u32>,
}

pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

pub async fn list_page(
    source: &dyn FolderSource,
    query: &ListQuery,
) -> Result<PageResult, ServiceError> {
    let limit = clamp_limit(query.limit);
    let cursor = match (&query.page_token, query.page) {
        (Some(token), _) => Some(token.clone()),
        (None, Some(page)) if page > 1 => match walk_to_page(source, limit, page).await? {
            Some(token) => Some(token),
            // Past the last page: an empty final page, no token.
            None => {
                return Ok(PageResult {
                    items: Vec::new(),
                    next_page_token: None,
                });
            }
        },
        _ => None,
    };

    let page = source.list(limit, cursor.as_deref()).await?;
    Ok(PageResult {
        items: page.files.iter().map(to_item).collect(),
        next_page_token: page.next_page_token,
    })
}

/// Translate a 1-based sequential page number into the provider's cursor by
/// walking the listing from the start. Returns `None` when the listing ends
/// before the requested page.
async fn walk_to_page(
    source: &dyn FolderSource,
    limit: u32,
    page: u32,
) -> Result<Option<String>, ServiceError> {
    let mut cursor: Option<String> = None;
    for _ in 1..page {
        let listed = source.list(limit, cursor.as_deref()).await?;
        match listed.next_page_token {
            Some(token) => cursor = Some(token),
            None => return Ok(None),
        }
    }
    Ok(cursor)
}

fn to_item(file: &FileEntry) -> ImageItem {
    let caption = file
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(&file.name)
        .to_string();
    ImageItem {
        id: file.id.clone(),
        src: file.content_url.clone(),
        thumb: file
            .thumbnail_url
            .clone()
            .unwrap_or_else(|| file.content_url.clone()),
        caption,
        timestamp: file.modified_time.clone(),
    }
}
