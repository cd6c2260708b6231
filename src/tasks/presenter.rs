use anyhow::Result;
use tokio::select;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::layout::LayoutStrategy;
use crate::render::{CellContent, LightboxSource, OverlayPhase, RenderPlan, Status};

/// Terminal presenter: consumes render-plan frames and writes a compact
/// textual frame to stdout. Any richer front-end can consume the same
/// frames; this one keeps the engine drivable from a shell.
pub async fn run(mut frames: watch::Receiver<RenderPlan>, cancel: CancellationToken) -> Result<()> {
    loop {
        select! {
            _ = cancel.cancelled() => break,

            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
                let plan = frames.borrow_and_update().clone();
                for line in render_lines(&plan) {
                    println!("{line}");
                }
                println!();
            }
        }
    }
    Ok(())
}

/// Cell marker: what the grid slot currently shows.
fn marker(content: &CellContent) -> &'static str {
    match content {
        CellContent::Pending => "[  ]",
        CellContent::Loading => "[..]",
        CellContent::Thumbnail(_) => "[~~]",
        CellContent::Full(_) => "[##]",
        CellContent::Placeholder => "[xx]",
    }
}

pub fn render_lines(plan: &RenderPlan) -> Vec<String> {
    let mut lines = Vec::new();
    match &plan.status {
        Status::Idle => {}
        Status::Loading => lines.push("loading...".to_string()),
        Status::Empty => lines.push("no photos in this folder".to_string()),
        Status::Error(msg) => lines.push(format!("error: {msg}")),
    }

    let columns = plan.columns.max(1) as usize;
    for row in plan.cells.chunks(columns) {
        let rendered: Vec<String> = row
            .iter()
            .map(|cell| format!("{} {}", marker(&cell.content), cell.caption))
            .collect();
        lines.push(rendered.join("  |  "));
    }

    if let Some(bar) = plan.swipe {
        lines.push(format!("swipe page {}/{}", bar.page + 1, bar.page_count.max(1)));
    }
    if plan.show_load_more {
        lines.push("-- load more (n) --".to_string());
    }
    if plan.show_retry {
        lines.push("-- retry (r) --".to_string());
    }
    if let Some(overlay) = &plan.lightbox {
        let phase = match overlay.phase {
            OverlayPhase::FadingIn => "fading in",
            OverlayPhase::Visible => "open",
            OverlayPhase::FadingOut => "fading out",
        };
        let source = match &overlay.source {
            LightboxSource::GridHandle(handle) => {
                format!("{} ({}x{})", handle.url, handle.width, handle.height)
            }
            LightboxSource::Remote(url) => url.clone(),
        };
        lines.push(format!(
            "lightbox [{phase}] #{}: {} <{}>",
            overlay.index, overlay.caption, source
        ));
    }
    if plan.strategy == LayoutStrategy::PagedSwipe && plan.lightbox.is_none() {
        lines.push("(.), (,) to swipe".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ImageHandle;
    use crate::render::Cell;

    fn plan_with_cells(contents: Vec<CellContent>) -> RenderPlan {
        RenderPlan {
            cells: contents
                .into_iter()
                .enumerate()
                .map(|(index, content)| Cell {
                    index,
                    id: format!("id-{index}"),
                    caption: format!("photo {index}"),
                    content,
                    fresh: false,
                })
                .collect(),
            columns: 2,
            ..RenderPlan::empty()
        }
    }

    #[test]
    fn cells_wrap_at_column_count() {
        let plan = plan_with_cells(vec![
            CellContent::Pending,
            CellContent::Loading,
            CellContent::Placeholder,
        ]);
        let lines = render_lines(&plan);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("photo 0") && lines[0].contains("photo 1"));
        assert!(lines[1].contains("[xx] photo 2"));
    }

    #[test]
    fn error_state_shows_message_and_retry() {
        let mut plan = RenderPlan::empty();
        plan.status = Status::Error("server returned status 500".into());
        plan.show_retry = true;
        let lines = render_lines(&plan);
        assert!(lines[0].starts_with("error:"));
        assert!(lines.iter().any(|l| l.contains("retry")));
    }

    #[test]
    fn lightbox_line_includes_loaded_dimensions() {
        let mut plan = plan_with_cells(vec![CellContent::Full(ImageHandle {
            url: "https://img.test/0.jpg".into(),
            width: 800,
            height: 600,
        })]);
        plan.lightbox = Some(crate::render::LightboxView {
            index: 0,
            caption: "photo 0".into(),
            source: LightboxSource::GridHandle(ImageHandle {
                url: "https://img.test/0.jpg".into(),
                width: 800,
                height: 600,
            }),
            phase: OverlayPhase::Visible,
            interactive: true,
        });
        let lines = render_lines(&plan);
        assert!(lines.last().unwrap().contains("800x600"));
    }
}
