use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::routing::get;
use base64::Engine;
use rust_photo_gallery::events::{LoadOutcome, LoadRequest, LoadStage};
use rust_photo_gallery::tasks::loader;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

// 1x1 transparent PNG.
const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn pixel_bytes() -> Vec<u8> {
    base64::engine::general_purpose::STANDARD
        .decode(PIXEL_PNG)
        .unwrap()
}

async fn serve_images() -> SocketAddr {
    let app = Router::new()
        .route(
            "/ok.png",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "image/png")],
                    pixel_bytes(),
                )
            }),
        )
        .route(
            "/missing.png",
            get(|| async { (StatusCode::NOT_FOUND, "gone") }),
        )
        .route(
            "/corrupt.png",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "image/png")],
                    vec![0u8; 16],
                )
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

struct Loader {
    req_tx: mpsc::Sender<LoadRequest>,
    out_rx: mpsc::Receiver<LoadOutcome>,
    cancel: CancellationToken,
}

fn spawn_loader() -> Loader {
    let (req_tx, req_rx) = mpsc::channel(16);
    let (out_tx, out_rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    tokio::spawn(loader::run(req_rx, out_tx, cancel.clone(), 2));
    Loader {
        req_tx,
        out_rx,
        cancel,
    }
}

impl Loader {
    async fn load(&mut self, index: usize, urls: Vec<String>) -> LoadOutcome {
        self.req_tx
            .send(LoadRequest {
                generation: 1,
                index,
                stage: LoadStage::Thumbnail,
                urls,
            })
            .await
            .unwrap();
        timeout(WAIT, self.out_rx.recv())
            .await
            .expect("timeout waiting for load outcome")
            .expect("loader channel closed")
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn primary_source_loads_and_reports_dimensions() {
    let addr = serve_images().await;
    let mut l = spawn_loader();
    let outcome = l.load(0, vec![format!("http://{addr}/ok.png")]).await;
    let handle = outcome.handle.expect("expected a loaded handle");
    assert_eq!((handle.width, handle.height), (1, 1));
    l.cancel.cancel();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_primary_falls_back_to_alternate() {
    let addr = serve_images().await;
    let mut l = spawn_loader();
    let outcome = l
        .load(
            0,
            vec![
                format!("http://{addr}/missing.png"),
                format!("http://{addr}/ok.png"),
            ],
        )
        .await;
    let handle = outcome.handle.expect("alternate should have loaded");
    assert!(handle.url.ends_with("/ok.png"));
    l.cancel.cancel();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn undecodable_body_counts_as_a_failed_source() {
    let addr = serve_images().await;
    let mut l = spawn_loader();
    let outcome = l
        .load(
            0,
            vec![
                format!("http://{addr}/corrupt.png"),
                format!("http://{addr}/ok.png"),
            ],
        )
        .await;
    let handle = outcome.handle.expect("alternate should have loaded");
    assert!(handle.url.ends_with("/ok.png"));
    l.cancel.cancel();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn exhausted_fallback_list_reports_no_handle() {
    let addr = serve_images().await;
    let mut l = spawn_loader();
    let outcome = l
        .load(
            3,
            vec![
                format!("http://{addr}/missing.png"),
                format!("http://{addr}/corrupt.png"),
            ],
        )
        .await;
    assert!(outcome.handle.is_none());
    assert_eq!(outcome.index, 3);
    l.cancel.cancel();
}
