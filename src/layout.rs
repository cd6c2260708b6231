//! Responsive layout: breakpoint resolution, grid geometry, and the
//! paged-swipe re-pagination used on narrow viewports.
//!
//! The two historical widget variants (continuous grid vs. mobile swipe) are
//! collapsed into one engine parameterized by [`LayoutStrategy`], selected
//! from the viewport width.

use std::ops::Range;

use crate::config::Breakpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStrategy {
    ContinuousGrid,
    PagedSwipe,
}

pub fn strategy_for_width(width: u32, swipe_max_width: u32) -> LayoutStrategy {
    if width <= swipe_max_width {
        LayoutStrategy::PagedSwipe
    } else {
        LayoutStrategy::ContinuousGrid
    }
}

/// Resolve the column count for a viewport width: the widest matching
/// `min-width` row wins. Falls back to one column when nothing matches.
pub fn columns_for_width(table: &[Breakpoint], width: u32) -> u32 {
    table
        .iter()
        .filter(|b| b.min_width <= width)
        .max_by_key(|b| b.min_width)
        .map(|b| b.columns.max(1))
        .unwrap_or(1)
}

/// Grid geometry for the continuous strategy. Cells are square and fill the
/// viewport width; all positions derive from index, column count, and cell
/// size, so visibility scans stay O(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub columns: u32,
    pub cell_size: u32,
}

impl GridGeometry {
    pub fn new(viewport_width: u32, columns: u32) -> Self {
        let columns = columns.max(1);
        Self {
            columns,
            cell_size: (viewport_width / columns).max(1),
        }
    }

    /// Top edge of the row holding `index`, in layout pixels.
    pub fn cell_top(&self, index: usize) -> u32 {
        (index as u32 / self.columns) * self.cell_size
    }

    /// Indices whose cells intersect the scroll window. The range is clipped
    /// to `item_count`.
    pub fn visible_indices(&self, scroll: u32, viewport_height: u32, item_count: usize) -> Range<usize> {
        if item_count == 0 {
            return 0..0;
        }
        let first_row = scroll / self.cell_size;
        // Rows are half-open: a row starting exactly at the bottom edge is out.
        let last_row = (scroll + viewport_height).div_ceil(self.cell_size);
        let start = (first_row * self.columns) as usize;
        let end = (last_row * self.columns) as usize;
        start.min(item_count)..end.min(item_count)
    }

    pub fn total_height(&self, item_count: usize) -> u32 {
        (item_count as u32).div_ceil(self.columns) * self.cell_size
    }
}

/// Number of swipe pages for `item_count` items at `page_size` per page.
pub fn swipe_page_count(item_count: usize, page_size: usize) -> usize {
    item_count.div_ceil(page_size.max(1))
}

/// Item indices on swipe page `page`, clipped to the item count.
pub fn swipe_page_indices(page: usize, page_size: usize, item_count: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let start = (page * page_size).min(item_count);
    let end = (start + page_size).min(item_count);
    start..end
}

/// Clamp a swipe page index so it always names an existing page.
pub fn clamp_swipe_page(page: usize, item_count: usize, page_size: usize) -> usize {
    let pages = swipe_page_count(item_count, page_size);
    if pages == 0 { 0 } else { page.min(pages - 1) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<Breakpoint> {
        vec![
            Breakpoint {
                min_width: 0,
                columns: 1,
            },
            Breakpoint {
                min_width: 600,
                columns: 2,
            },
            Breakpoint {
                min_width: 900,
                columns: 3,
            },
            Breakpoint {
                min_width: 1200,
                columns: 4,
            },
        ]
    }

    #[test]
    fn widest_matching_breakpoint_wins() {
        let t = table();
        assert_eq!(columns_for_width(&t, 0), 1);
        assert_eq!(columns_for_width(&t, 599), 1);
        assert_eq!(columns_for_width(&t, 600), 2);
        assert_eq!(columns_for_width(&t, 1199), 3);
        assert_eq!(columns_for_width(&t, 2560), 4);
    }

    #[test]
    fn empty_table_falls_back_to_one_column() {
        assert_eq!(columns_for_width(&[], 1024), 1);
    }

    #[test]
    fn narrow_viewports_use_paged_swipe() {
        assert_eq!(strategy_for_width(480, 600), LayoutStrategy::PagedSwipe);
        assert_eq!(strategy_for_width(600, 600), LayoutStrategy::PagedSwipe);
        assert_eq!(
            strategy_for_width(601, 600),
            LayoutStrategy::ContinuousGrid
        );
    }

    #[test]
    fn visible_indices_cover_partially_visible_rows() {
        // 900px wide, 3 columns -> 300px cells.
        let g = GridGeometry::new(900, 3);
        assert_eq!(g.cell_size, 300);
        // Window 250..850 touches rows 0, 1, and 2.
        assert_eq!(g.visible_indices(250, 600, 100), 0..9);
        // Window exactly on a row boundary excludes the previous row.
        assert_eq!(g.visible_indices(300, 300, 100), 3..6);
    }

    #[test]
    fn visible_indices_clip_to_item_count() {
        let g = GridGeometry::new(900, 3);
        assert_eq!(g.visible_indices(0, 600, 4), 0..4);
        assert_eq!(g.visible_indices(0, 600, 0), 0..0);
    }

    #[test]
    fn swipe_pages_hold_four_items() {
        assert_eq!(swipe_page_count(0, 4), 0);
        assert_eq!(swipe_page_count(4, 4), 1);
        assert_eq!(swipe_page_count(9, 4), 3);
        assert_eq!(swipe_page_indices(0, 4, 9), 0..4);
        assert_eq!(swipe_page_indices(2, 4, 9), 8..9);
        assert_eq!(swipe_page_indices(5, 4, 9), 9..9);
    }

    #[test]
    fn swipe_page_clamps_to_last_page() {
        assert_eq!(clamp_swipe_page(7, 9, 4), 2);
        assert_eq!(clamp_swipe_page(1, 0, 4), 0);
    }

    #[test]
    fn total_height_rounds_up_to_full_rows() {
        let g = GridGeometry::new(900, 3);
        assert_eq!(g.total_height(7), 3 * 300);
    }
}
