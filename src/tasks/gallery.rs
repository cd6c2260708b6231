use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Configuration;
use crate::events::{FetchOutcome, FetchRequest, LoadOutcome, LoadRequest, UiCommand};
use crate::render::RenderPlan;
use crate::state::{Effect, GalleryState};

/// Owns the [`GalleryState`] and drives it from the surrounding channels:
/// user commands in, fetch/load outcomes in, render-plan frames out. The
/// state machine returns effects; this task is the only place they touch
/// channels or the clock.
pub async fn run(
    cfg: Configuration,
    mut cmd_rx: Receiver<UiCommand>,
    fetch_tx: Sender<FetchRequest>,
    mut fetch_rx: Receiver<FetchOutcome>,
    load_tx: Sender<LoadRequest>,
    mut load_rx: Receiver<LoadOutcome>,
    frames: watch::Sender<RenderPlan>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut state = GalleryState::new(cfg);
    let mut fade_deadline: Option<Instant> = None;

    // Mount: the widget immediately requests its first page.
    let effects = state.start();
    if apply_effects(effects, &fetch_tx, &load_tx, &mut fade_deadline).await == Flow::Stop {
        cancel.cancel();
        return Ok(());
    }
    frames.send_replace(state.plan());

    loop {
        let effects = select! {
            _ = cancel.cancelled() => break,

            maybe_cmd = cmd_rx.recv() => {
                let Some(cmd) = maybe_cmd else { break };
                state.handle_command(cmd)
            }

            maybe_outcome = fetch_rx.recv() => {
                let Some(outcome) = maybe_outcome else { break };
                state.handle_fetch_outcome(outcome)
            }

            maybe_outcome = load_rx.recv() => {
                let Some(outcome) = maybe_outcome else { break };
                state.handle_load_outcome(outcome)
            }

            // Lightbox fade completion.
            _ = tokio::time::sleep_until(fade_deadline.unwrap_or_else(Instant::now)),
                if fade_deadline.is_some() =>
            {
                fade_deadline = None;
                state.handle_fade_elapsed()
            }
        };

        let quit = effects.iter().any(|e| matches!(e, Effect::Quit));
        if apply_effects(effects, &fetch_tx, &load_tx, &mut fade_deadline).await == Flow::Stop {
            break;
        }
        frames.send_replace(state.plan());
        if quit {
            info!("quit requested; shutting down");
            break;
        }
    }
    cancel.cancel();
    Ok(())
}

#[derive(PartialEq)]
enum Flow {
    Continue,
    Stop,
}

async fn apply_effects(
    effects: Vec<Effect>,
    fetch_tx: &Sender<FetchRequest>,
    load_tx: &Sender<LoadRequest>,
    fade_deadline: &mut Option<Instant>,
) -> Flow {
    for effect in effects {
        match effect {
            Effect::Fetch(request) => {
                if fetch_tx.send(request).await.is_err() {
                    warn!("fetcher channel closed");
                    return Flow::Stop;
                }
            }
            Effect::Load(request) => {
                if load_tx.send(request).await.is_err() {
                    warn!("loader channel closed");
                    return Flow::Stop;
                }
            }
            Effect::ScheduleFade(after) => {
                *fade_deadline = Some(Instant::now() + after);
            }
            Effect::Quit => {}
        }
    }
    Flow::Continue
}
