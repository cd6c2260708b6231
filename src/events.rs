//! Message types flowing between the gallery, fetcher, and loader tasks.

use crate::error::FetchError;
use crate::item::PageResult;

/// User-facing commands, as delivered by the stdin reader or a test driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    LoadFirstPage,
    LoadNextPage,
    /// Re-issue the request that last failed.
    Retry,
    OpenLightbox(usize),
    CloseLightbox,
    ShowNextImage,
    ShowPreviousImage,
    SwipeNext,
    SwipePrevious,
    Resize { width: u32, height: u32 },
    ScrollTo(u32),
    Quit,
}

/// Which page request a fetch serves. Retrying a failed first page re-issues
/// the same initial request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    First,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Incremented whenever the item list is replaced; stale outcomes are
    /// dropped on receipt.
    pub generation: u64,
    pub kind: FetchKind,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub request: FetchRequest,
    pub result: Result<PageResult, FetchError>,
}

/// Which of the two load stages an image request serves. Thumbnail first,
/// then a separate background load swaps in the full-resolution source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Thumbnail,
    Full,
}

/// One load request for one grid cell. `urls` is the ordered fallback list;
/// the loader walks it until one source decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: u64,
    pub index: usize,
    pub stage: LoadStage,
    pub urls: Vec<String>,
}

/// Proof that a source decoded, plus the metadata the gallery keeps. Pixel
/// data stays with the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    /// The URL that actually loaded (may be an alternate).
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub generation: u64,
    pub index: usize,
    pub stage: LoadStage,
    /// `None` when every URL in the fallback list failed.
    pub handle: Option<ImageHandle>,
}
