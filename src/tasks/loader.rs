use anyhow::{Context, Result};
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::events::{ImageHandle, LoadOutcome, LoadRequest};

/// Image loader. Each request carries an ordered fallback list; the first
/// source that downloads and decodes wins. Loads for different cells run
/// concurrently up to `max_in_flight` with no ordering guarantee between
/// them; the state machine drops outcomes for superseded generations.
pub async fn run(
    mut load_rx: Receiver<LoadRequest>,
    out_tx: Sender<LoadOutcome>,
    cancel: CancellationToken,
    max_in_flight: usize,
) -> Result<()> {
    let client = reqwest::Client::new();
    let mut tasks: JoinSet<LoadOutcome> = JoinSet::new();

    loop {
        select! {
            _ = cancel.cancelled() => break,

            // Accept new load requests while under limit.
            Some(request) = load_rx.recv(), if tasks.len() < max_in_flight => {
                let client = client.clone();
                tasks.spawn(async move { load_with_fallback(&client, request).await });
            }

            // Forward completed loads as they finish.
            Some(join_res) = tasks.join_next() => {
                if let Ok(outcome) = join_res
                    && out_tx.send(outcome).await.is_err()
                {
                    break;
                }
            }

            else => {
                // Request channel closed and nothing in flight: done.
                if tasks.is_empty() {
                    break;
                }
            }
        }
    }
    Ok(())
}

async fn load_with_fallback(client: &reqwest::Client, request: LoadRequest) -> LoadOutcome {
    for url in &request.urls {
        match fetch_and_decode(client, url).await {
            Ok((width, height)) => {
                debug!(index = request.index, url = %url, "image source loaded");
                return LoadOutcome {
                    generation: request.generation,
                    index: request.index,
                    stage: request.stage,
                    handle: Some(ImageHandle {
                        url: url.clone(),
                        width,
                        height,
                    }),
                };
            }
            Err(err) => {
                debug!(index = request.index, url = %url, error = %err, "source failed; trying alternate");
            }
        }
    }
    LoadOutcome {
        generation: request.generation,
        index: request.index,
        stage: request.stage,
        handle: None,
    }
}

/// Download the bytes and decode them off the async threads to prove the
/// source is a displayable image; only the dimensions are kept.
async fn fetch_and_decode(client: &reqwest::Client, url: &str) -> Result<(u32, u32)> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("requesting {url}"))?;
    let bytes = response.bytes().await.context("reading image body")?;
    tokio::task::spawn_blocking(move || {
        let img = image::load_from_memory(&bytes).context("decoding image")?;
        Ok((img.width(), img.height()))
    })
    .await
    .context("decode task panicked")?
}
