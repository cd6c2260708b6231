//! The gallery widget's state machine.
//!
//! All widget fields live in one explicit [`GalleryState`] owned by the
//! gallery task. Handlers are pure: they mutate the state and return the
//! [`Effect`]s the surrounding task should perform (fetch a page, load an
//! image, schedule a fade tick). No handler touches a channel or the clock,
//! so every behavior here is checkable in plain unit tests without a live
//! presentation layer.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Configuration;
use crate::events::{
    FetchKind, FetchOutcome, FetchRequest, ImageHandle, LoadOutcome, LoadRequest, LoadStage,
    UiCommand,
};
use crate::item::ImageItem;
use crate::layout::{self, GridGeometry, LayoutStrategy};
use crate::render::{
    Cell, CellContent, LightboxSource, LightboxView, OverlayPhase, RenderPlan, Status, SwipeBar,
};
use crate::visibility::VisibilityTracker;

/// Follow-up work a handler asks the gallery task to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FetchRequest),
    Load(LoadRequest),
    /// Deliver `handle_fade_elapsed` after the given duration.
    ScheduleFade(Duration),
    Quit,
}

/// Lightbox overlay machine: `Closed → Opening → Open → Closing → Closed`.
/// Escape/backdrop and navigation are honored only in `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

/// Load progression for one grid cell. The one-shot visibility registration
/// moves a cell out of `Pending` exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CellPhase {
    Pending,
    LoadingThumbnail,
    /// Lightbox-triggered direct load of the full source, no thumbnail yet.
    LoadingFull,
    Thumbnail(ImageHandle),
    Full(ImageHandle),
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct Viewport {
    width: u32,
    height: u32,
    scroll: u32,
}

#[derive(Debug)]
pub struct GalleryState {
    cfg: Configuration,
    loaded_images: Vec<ImageItem>,
    cells: Vec<CellPhase>,
    /// Pages successfully loaded so far; 0 before the first page arrives.
    current_page_index: u32,
    is_loading: bool,
    has_more: bool,
    next_page_token: Option<String>,
    /// The single in-flight request; outcomes for anything else are stale.
    pending: Option<FetchRequest>,
    /// The request a `Retry` command re-issues verbatim.
    last_failed: Option<FetchRequest>,
    error: Option<String>,
    /// Bumped when the item list is replaced; stale load outcomes are
    /// dropped on receipt.
    generation: u64,
    /// Index of the first cell added by the most recent append; cells at or
    /// past it render as fresh.
    fresh_from: usize,
    visibility: VisibilityTracker,
    viewport: Viewport,
    strategy: LayoutStrategy,
    grid: GridGeometry,
    swipe_page: usize,
    lightbox_phase: LightboxPhase,
    lightbox_index: Option<usize>,
}

impl GalleryState {
    pub fn new(cfg: Configuration) -> Self {
        let viewport = Viewport {
            width: cfg.viewport.width,
            height: cfg.viewport.height,
            scroll: 0,
        };
        let strategy = layout::strategy_for_width(viewport.width, cfg.swipe_max_width);
        let columns = layout::columns_for_width(&cfg.columns, viewport.width);
        let grid = GridGeometry::new(viewport.width, columns);
        Self {
            cfg,
            loaded_images: Vec::new(),
            cells: Vec::new(),
            current_page_index: 0,
            is_loading: false,
            has_more: false,
            next_page_token: None,
            pending: None,
            last_failed: None,
            error: None,
            generation: 0,
            fresh_from: 0,
            visibility: VisibilityTracker::new(),
            viewport,
            strategy,
            grid,
            swipe_page: 0,
            lightbox_phase: LightboxPhase::Closed,
            lightbox_index: None,
        }
    }

    /// Mount: request the first page.
    pub fn start(&mut self) -> Vec<Effect> {
        self.load_first_page()
    }

    pub fn handle_command(&mut self, cmd: UiCommand) -> Vec<Effect> {
        match cmd {
            UiCommand::LoadFirstPage => self.load_first_page(),
            UiCommand::LoadNextPage => self.load_next_page(),
            UiCommand::Retry => self.retry(),
            UiCommand::OpenLightbox(index) => self.open_lightbox(index),
            UiCommand::CloseLightbox => self.close_lightbox(),
            UiCommand::ShowNextImage => self.show_next_image(),
            UiCommand::ShowPreviousImage => self.show_previous_image(),
            UiCommand::SwipeNext => self.swipe_by(1),
            UiCommand::SwipePrevious => self.swipe_by(-1),
            UiCommand::Resize { width, height } => self.resize(width, height),
            UiCommand::ScrollTo(offset) => self.scroll_to(offset),
            UiCommand::Quit => vec![Effect::Quit],
        }
    }

    // ---- pagination -----------------------------------------------------

    pub fn load_first_page(&mut self) -> Vec<Effect> {
        if self.is_loading {
            debug!("load_first_page ignored: fetch already outstanding");
            return Vec::new();
        }
        self.begin_fetch(FetchRequest {
            generation: self.generation,
            kind: FetchKind::First,
            page_token: None,
        })
    }

    pub fn load_next_page(&mut self) -> Vec<Effect> {
        if self.is_loading || !self.has_more {
            debug!(
                is_loading = self.is_loading,
                has_more = self.has_more,
                "load_next_page ignored"
            );
            return Vec::new();
        }
        self.begin_fetch(FetchRequest {
            generation: self.generation,
            kind: FetchKind::Next,
            page_token: self.next_page_token.clone(),
        })
    }

    /// Manual retry of the last failed request. There is no automatic retry.
    pub fn retry(&mut self) -> Vec<Effect> {
        if self.is_loading {
            return Vec::new();
        }
        match self.last_failed.clone() {
            Some(req) => self.begin_fetch(req),
            None => Vec::new(),
        }
    }

    fn begin_fetch(&mut self, req: FetchRequest) -> Vec<Effect> {
        self.is_loading = true;
        self.error = None;
        self.pending = Some(req.clone());
        vec![Effect::Fetch(req)]
    }

    pub fn handle_fetch_outcome(&mut self, outcome: FetchOutcome) -> Vec<Effect> {
        if self.pending.as_ref() != Some(&outcome.request) {
            debug!("dropping stale fetch outcome");
            return Vec::new();
        }
        self.pending = None;
        self.is_loading = false;
        match outcome.result {
            Ok(page) => {
                self.last_failed = None;
                self.has_more = page.next_page_token.is_some();
                self.next_page_token = page.next_page_token;
                match outcome.request.kind {
                    FetchKind::First => self.replace_items(page.items),
                    FetchKind::Next => self.append_items(page.items),
                }
            }
            Err(err) => {
                warn!(error = %err, "page fetch failed");
                self.error = Some(err.to_string());
                self.last_failed = Some(outcome.request);
                Vec::new()
            }
        }
    }

    fn replace_items(&mut self, items: Vec<ImageItem>) -> Vec<Effect> {
        self.generation += 1;
        info!(
            count = items.len(),
            generation = self.generation,
            "first page loaded"
        );
        self.loaded_images = items;
        self.cells = vec![CellPhase::Pending; self.loaded_images.len()];
        self.visibility.reset(self.loaded_images.len());
        self.current_page_index = 1;
        self.fresh_from = 0;
        self.swipe_page = 0;
        self.viewport.scroll = 0;
        // Any open overlay would now point at a replaced list.
        self.lightbox_phase = LightboxPhase::Closed;
        self.lightbox_index = None;
        self.scan_visibility()
    }

    fn append_items(&mut self, items: Vec<ImageItem>) -> Vec<Effect> {
        info!(count = items.len(), "next page appended");
        self.fresh_from = self.loaded_images.len();
        self.loaded_images.extend(items);
        self.cells
            .resize(self.loaded_images.len(), CellPhase::Pending);
        self.visibility.grow(self.loaded_images.len());
        self.current_page_index += 1;
        self.scan_visibility()
    }

    // ---- lazy loading ---------------------------------------------------

    /// Register lazy loads for cells that just became visible. Each cell
    /// fires at most once (the observer registration is one-shot).
    fn scan_visibility(&mut self) -> Vec<Effect> {
        let count = self.loaded_images.len();
        let visible: Vec<usize> = if !self.cfg.lazy_loading {
            (0..count).collect()
        } else {
            match self.strategy {
                LayoutStrategy::ContinuousGrid => self
                    .grid
                    .visible_indices(self.viewport.scroll, self.viewport.height, count)
                    .collect(),
                LayoutStrategy::PagedSwipe => {
                    layout::swipe_page_indices(self.swipe_page, self.cfg.swipe_page_size, count)
                        .collect()
                }
            }
        };
        let mut effects = Vec::new();
        for index in self.visibility.newly_visible(visible) {
            if self.cells[index] != CellPhase::Pending {
                continue;
            }
            self.cells[index] = CellPhase::LoadingThumbnail;
            let item = &self.loaded_images[index];
            effects.push(Effect::Load(LoadRequest {
                generation: self.generation,
                index,
                stage: LoadStage::Thumbnail,
                urls: vec![item.thumb.clone(), item.src.clone()],
            }));
        }
        effects
    }

    pub fn handle_load_outcome(&mut self, outcome: LoadOutcome) -> Vec<Effect> {
        if outcome.generation != self.generation {
            debug!(index = outcome.index, "dropping superseded load outcome");
            return Vec::new();
        }
        let Some(cell) = self.cells.get_mut(outcome.index) else {
            return Vec::new();
        };
        let item = &self.loaded_images[outcome.index];
        match (outcome.stage, outcome.handle) {
            (LoadStage::Thumbnail, Some(handle)) => {
                if *cell != CellPhase::LoadingThumbnail {
                    return Vec::new();
                }
                if handle.url == item.src {
                    // The alternate already delivered the full source.
                    *cell = CellPhase::Full(handle);
                    Vec::new()
                } else {
                    *cell = CellPhase::Thumbnail(handle);
                    vec![Effect::Load(LoadRequest {
                        generation: self.generation,
                        index: outcome.index,
                        stage: LoadStage::Full,
                        urls: vec![item.src.clone()],
                    })]
                }
            }
            (LoadStage::Thumbnail, None) => {
                warn!(id = %item.id, "all sources failed; showing placeholder");
                *cell = CellPhase::Failed;
                Vec::new()
            }
            (LoadStage::Full, Some(handle)) => {
                if matches!(
                    cell,
                    CellPhase::Thumbnail(_) | CellPhase::LoadingFull | CellPhase::LoadingThumbnail
                ) {
                    *cell = CellPhase::Full(handle);
                }
                Vec::new()
            }
            (LoadStage::Full, None) => {
                match cell {
                    // The low-res image stays up; losing the swap is not an
                    // error the gallery surfaces.
                    CellPhase::Thumbnail(_) => {
                        warn!(id = %item.id, "full-resolution swap failed; keeping thumbnail");
                    }
                    CellPhase::LoadingFull => {
                        warn!(id = %item.id, "lightbox source failed; showing placeholder");
                        *cell = CellPhase::Failed;
                    }
                    _ => {}
                }
                Vec::new()
            }
        }
    }

    // ---- lightbox -------------------------------------------------------

    pub fn open_lightbox(&mut self, index: usize) -> Vec<Effect> {
        if !self.cfg.lightbox.enabled {
            return Vec::new();
        }
        if self.lightbox_phase != LightboxPhase::Closed {
            debug!("open_lightbox ignored: overlay not closed");
            return Vec::new();
        }
        if index >= self.loaded_images.len() {
            debug!(index, "open_lightbox ignored: index out of range");
            return Vec::new();
        }
        self.lightbox_index = Some(index);
        self.lightbox_phase = LightboxPhase::Opening;
        let mut effects = vec![Effect::ScheduleFade(self.cfg.lightbox.fade)];
        // No grid handle yet: fall back to loading the original source.
        if self.cells[index] == CellPhase::Pending {
            self.visibility.newly_visible([index]);
            self.cells[index] = CellPhase::LoadingFull;
            let item = &self.loaded_images[index];
            effects.push(Effect::Load(LoadRequest {
                generation: self.generation,
                index,
                stage: LoadStage::Full,
                urls: vec![item.src.clone(), item.thumb.clone()],
            }));
        }
        effects
    }

    pub fn close_lightbox(&mut self) -> Vec<Effect> {
        if self.lightbox_phase != LightboxPhase::Open {
            return Vec::new();
        }
        self.lightbox_phase = LightboxPhase::Closing;
        vec![Effect::ScheduleFade(self.cfg.lightbox.fade)]
    }

    /// Advance the overlay animation: `Opening → Open`, `Closing → Closed`.
    pub fn handle_fade_elapsed(&mut self) -> Vec<Effect> {
        match self.lightbox_phase {
            LightboxPhase::Opening => {
                self.lightbox_phase = LightboxPhase::Open;
            }
            LightboxPhase::Closing => {
                self.lightbox_phase = LightboxPhase::Closed;
                self.lightbox_index = None;
            }
            _ => {}
        }
        Vec::new()
    }

    pub fn show_next_image(&mut self) -> Vec<Effect> {
        self.step_lightbox(1)
    }

    pub fn show_previous_image(&mut self) -> Vec<Effect> {
        self.step_lightbox(-1)
    }

    fn step_lightbox(&mut self, delta: i64) -> Vec<Effect> {
        if self.lightbox_phase != LightboxPhase::Open {
            return Vec::new();
        }
        let Some(index) = self.lightbox_index else {
            return Vec::new();
        };
        let last = self.loaded_images.len().saturating_sub(1);
        let next = index.saturating_add_signed(delta as isize).min(last);
        if next == index {
            // Clamped at a boundary; repeated presses are no-ops.
            return Vec::new();
        }
        self.lightbox_index = Some(next);
        // The new image may not have a grid handle either.
        if self.cells[next] == CellPhase::Pending {
            self.visibility.newly_visible([next]);
            self.cells[next] = CellPhase::LoadingFull;
            let item = &self.loaded_images[next];
            return vec![Effect::Load(LoadRequest {
                generation: self.generation,
                index: next,
                stage: LoadStage::Full,
                urls: vec![item.src.clone(), item.thumb.clone()],
            })];
        }
        Vec::new()
    }

    // ---- viewport -------------------------------------------------------

    pub fn resize(&mut self, width: u32, height: u32) -> Vec<Effect> {
        self.viewport.width = width.max(1);
        self.viewport.height = height.max(1);
        self.strategy = layout::strategy_for_width(self.viewport.width, self.cfg.swipe_max_width);
        let columns = layout::columns_for_width(&self.cfg.columns, self.viewport.width);
        self.grid = GridGeometry::new(self.viewport.width, columns);
        self.swipe_page = layout::clamp_swipe_page(
            self.swipe_page,
            self.loaded_images.len(),
            self.cfg.swipe_page_size,
        );
        debug!(
            width,
            height,
            columns,
            strategy = ?self.strategy,
            "viewport resized"
        );
        self.scan_visibility()
    }

    pub fn scroll_to(&mut self, offset: u32) -> Vec<Effect> {
        let max = self
            .grid
            .total_height(self.loaded_images.len())
            .saturating_sub(self.viewport.height);
        self.viewport.scroll = offset.min(max);
        self.scan_visibility()
    }

    fn swipe_by(&mut self, delta: i64) -> Vec<Effect> {
        if self.strategy != LayoutStrategy::PagedSwipe {
            return Vec::new();
        }
        let target = self.swipe_page.saturating_add_signed(delta as isize);
        self.swipe_page = layout::clamp_swipe_page(
            target,
            self.loaded_images.len(),
            self.cfg.swipe_page_size,
        );
        self.scan_visibility()
    }

    // ---- rendering ------------------------------------------------------

    pub fn plan(&self) -> RenderPlan {
        let cell_range = match self.strategy {
            LayoutStrategy::ContinuousGrid => 0..self.loaded_images.len(),
            LayoutStrategy::PagedSwipe => layout::swipe_page_indices(
                self.swipe_page,
                self.cfg.swipe_page_size,
                self.loaded_images.len(),
            ),
        };
        let cells = cell_range
            .map(|index| {
                let item = &self.loaded_images[index];
                Cell {
                    index,
                    id: item.id.clone(),
                    caption: item.caption.clone(),
                    content: match &self.cells[index] {
                        CellPhase::Pending => CellContent::Pending,
                        CellPhase::LoadingThumbnail | CellPhase::LoadingFull => CellContent::Loading,
                        CellPhase::Thumbnail(h) => CellContent::Thumbnail(h.clone()),
                        CellPhase::Full(h) => CellContent::Full(h.clone()),
                        CellPhase::Failed => CellContent::Placeholder,
                    },
                    fresh: index >= self.fresh_from,
                }
            })
            .collect();
        let status = if self.is_loading {
            Status::Loading
        } else if let Some(err) = &self.error {
            Status::Error(err.clone())
        } else if self.current_page_index > 0 && self.loaded_images.is_empty() {
            Status::Empty
        } else {
            Status::Idle
        };
        let show_load_more = !self.is_loading
            && self.error.is_none()
            && self.has_more
            && !self.loaded_images.is_empty();
        RenderPlan {
            strategy: self.strategy,
            columns: self.grid.columns,
            cells,
            swipe: (self.strategy == LayoutStrategy::PagedSwipe).then(|| SwipeBar {
                page: self.swipe_page,
                page_count: layout::swipe_page_count(
                    self.loaded_images.len(),
                    self.cfg.swipe_page_size,
                ),
            }),
            status,
            show_load_more,
            show_retry: self.error.is_some(),
            lightbox: self.lightbox_view(),
        }
    }

    fn lightbox_view(&self) -> Option<LightboxView> {
        let index = self.lightbox_index?;
        let phase = match self.lightbox_phase {
            LightboxPhase::Closed => return None,
            LightboxPhase::Opening => OverlayPhase::FadingIn,
            LightboxPhase::Open => OverlayPhase::Visible,
            LightboxPhase::Closing => OverlayPhase::FadingOut,
        };
        let item = &self.loaded_images[index];
        // Prefer the already-loaded grid handle over a second network fetch.
        let source = match &self.cells[index] {
            CellPhase::Thumbnail(h) | CellPhase::Full(h) => {
                LightboxSource::GridHandle(h.clone())
            }
            _ => LightboxSource::Remote(item.src.clone()),
        };
        Some(LightboxView {
            index,
            caption: item.caption.clone(),
            source,
            phase,
            interactive: self.lightbox_phase == LightboxPhase::Open,
        })
    }

    // ---- accessors ------------------------------------------------------

    pub fn items(&self) -> &[ImageItem] {
        &self.loaded_images
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn current_page_index(&self) -> u32 {
        self.current_page_index
    }

    pub fn lightbox_phase(&self) -> LightboxPhase {
        self.lightbox_phase
    }

    pub fn lightbox_index(&self) -> Option<usize> {
        self.lightbox_index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
