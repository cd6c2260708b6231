//! Pure description of one rendered frame.
//!
//! The state machine emits a [`RenderPlan`] and the presentation layer
//! (terminal presenter, tests) consumes it. Nothing in the plan is mutable
//! shared state.

use crate::events::ImageHandle;
use crate::layout::LayoutStrategy;

/// What a grid cell currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Registered but not yet visible; nothing requested.
    Pending,
    /// Visible, request in flight.
    Loading,
    /// Low-resolution thumbnail displayed, full swap may still be pending.
    Thumbnail(ImageHandle),
    /// Full-resolution source displayed.
    Full(ImageHandle),
    /// Every source failed; placeholder shown.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub index: usize,
    pub id: String,
    pub caption: String,
    pub content: CellContent,
    /// True for cells added by the most recent page append; only these need
    /// to be (re)rendered by an incremental presenter.
    pub fresh: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading,
    /// A page fetch failed; `show_retry` will be set alongside.
    Error(String),
    /// The folder produced no images.
    Empty,
}

/// Overlay fade progression. `Closed` has no overlay, so it has no variant
/// here; the plan simply omits the lightbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    FadingIn,
    Visible,
    FadingOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightboxSource {
    /// Reuse of an already-loaded grid handle; no extra network fetch.
    GridHandle(ImageHandle),
    /// Nothing loaded yet for this cell; the overlay shows the original
    /// source URL directly.
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxView {
    pub index: usize,
    pub caption: String,
    pub source: LightboxSource,
    pub phase: OverlayPhase,
    /// Escape/backdrop/navigation are only honored while true (i.e. once the
    /// fade-in completed), preventing click-through during the animation.
    pub interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeBar {
    pub page: usize,
    pub page_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    pub strategy: LayoutStrategy,
    pub columns: u32,
    /// In the continuous grid: every loaded item. In paged swipe: only the
    /// current swipe page.
    pub cells: Vec<Cell>,
    pub swipe: Option<SwipeBar>,
    pub status: Status,
    pub show_load_more: bool,
    pub show_retry: bool,
    pub lightbox: Option<LightboxView>,
}

impl RenderPlan {
    /// An empty frame, used before the first state snapshot arrives.
    pub fn empty() -> Self {
        Self {
            strategy: LayoutStrategy::ContinuousGrid,
            columns: 1,
            cells: Vec::new(),
            swipe: None,
            status: Status::Idle,
            show_load_more: false,
            show_retry: false,
            lightbox: None,
        }
    }
}
