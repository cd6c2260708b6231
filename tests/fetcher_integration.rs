use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use rust_photo_gallery::error::FetchError;
use rust_photo_gallery::events::{FetchKind, FetchOutcome, FetchRequest};
use rust_photo_gallery::tasks::fetcher;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn run_one(
    endpoint: String,
    request: FetchRequest,
) -> (FetchOutcome, CancellationToken) {
    let (req_tx, req_rx) = mpsc::channel(4);
    let (out_tx, mut out_rx) = mpsc::channel(4);
    let cancel = CancellationToken::new();
    tokio::spawn(fetcher::run(endpoint, 24, req_rx, out_tx, cancel.clone()));
    req_tx.send(request).await.unwrap();
    let outcome = timeout(WAIT, out_rx.recv())
        .await
        .expect("timeout waiting for fetch outcome")
        .expect("fetcher channel closed");
    (outcome, cancel)
}

fn request(token: Option<&str>) -> FetchRequest {
    FetchRequest {
        generation: 1,
        kind: FetchKind::First,
        page_token: token.map(str::to_owned),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn parses_page_and_forwards_query_parameters() {
    let seen: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::default();
    let record = seen.clone();
    let app = Router::new().route(
        "/photos",
        get(move |Query(params): Query<HashMap<String, String>>| {
            record.lock().unwrap().push(params);
            async {
                (
                    StatusCode::OK,
                    r#"{"items":[
                        {"id":"a","src":"https://x/a.jpg","thumb":"https://x/a_t.jpg",
                         "caption":"A","ts":"2024-05-01T10:00:00Z"},
                        {"id":"b","src":"https://x/b.jpg","thumb":"https://x/b_t.jpg",
                         "caption":"B","ts":"2024-05-01T09:00:00Z"}
                    ],"nextPageToken":"t1"}"#,
                )
            }
        }),
    );
    let addr = serve(app).await;

    let (outcome, cancel) = run_one(format!("http://{addr}/photos"), request(Some("t9"))).await;
    let page = outcome.result.expect("expected a parsed page");
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[1].id, "b");
    assert_eq!(page.next_page_token.as_deref(), Some("t1"));

    let recorded = seen.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].get("limit").map(String::as_str), Some("24"));
    assert_eq!(recorded[0].get("pageToken").map(String::as_str), Some("t9"));
    cancel.cancel();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn non_success_status_maps_to_status_error() {
    let app = Router::new().route(
        "/photos",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#) }),
    );
    let addr = serve(app).await;

    let (outcome, cancel) = run_one(format!("http://{addr}/photos"), request(None)).await;
    assert_eq!(outcome.result.unwrap_err(), FetchError::Status(500));
    cancel.cancel();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_body_maps_to_malformed_error() {
    let app = Router::new().route("/photos", get(|| async { "this is not a page" }));
    let addr = serve(app).await;

    let (outcome, cancel) = run_one(format!("http://{addr}/photos"), request(None)).await;
    assert!(matches!(
        outcome.result.unwrap_err(),
        FetchError::Malformed(_)
    ));
    cancel.cancel();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_endpoint_maps_to_transport_error() {
    // Nothing listens here; connection is refused immediately.
    let (outcome, cancel) = run_one("http://127.0.0.1:9/photos".to_string(), request(None)).await;
    assert!(matches!(
        outcome.result.unwrap_err(),
        FetchError::Transport(_)
    ));
    cancel.cancel();
}
