use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::error::FetchError;
use crate::events::{FetchOutcome, FetchRequest};
use crate::item::PageResult;

/// Serial page fetcher. The state machine guarantees at most one request is
/// outstanding, so requests are processed one at a time in arrival order.
#[instrument(skip(req_rx, out_tx, cancel), fields(endpoint = %endpoint))]
pub async fn run(
    endpoint: String,
    limit: u32,
    mut req_rx: Receiver<FetchRequest>,
    out_tx: Sender<FetchOutcome>,
    cancel: CancellationToken,
) -> Result<()> {
    let client = reqwest::Client::new();
    loop {
        select! {
            _ = cancel.cancelled() => break,

            maybe_req = req_rx.recv() => {
                let Some(request) = maybe_req else { break };
                debug!(kind = ?request.kind, token = ?request.page_token, "fetching page");
                let result = select! {
                    _ = cancel.cancelled() => break,
                    res = fetch_page(&client, &endpoint, limit, request.page_token.as_deref()) => res,
                };
                if out_tx.send(FetchOutcome { request, result }).await.is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// One listing call, classified into the widget's error taxonomy: transport
/// failure, non-success status, or a body that does not parse as a page.
async fn fetch_page(
    client: &reqwest::Client,
    endpoint: &str,
    limit: u32,
    page_token: Option<&str>,
) -> Result<PageResult, FetchError> {
    let mut query: Vec<(&str, String)> = vec![("limit", limit.to_string())];
    if let Some(token) = page_token {
        query.push(("pageToken", token.to_string()));
    }
    let response = client
        .get(endpoint)
        .query(&query)
        .send()
        .await
        .map_err(|err| FetchError::Transport(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    let body = response
        .text()
        .await
        .map_err(|err| FetchError::Transport(err.to_string()))?;
    serde_json::from_str(&body).map_err(|err| FetchError::Malformed(err.to_string()))
}
