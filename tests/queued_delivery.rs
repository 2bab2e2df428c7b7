//! Queued sends through the background worker.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proxy_client::{
    ClientConfig, DrainOutcome, ProxyClient, ProxyError, SendRequest, Telemetry,
};

mod common;
use common::{start_backend, Reply, ScriptedTransport};

fn scripted_client(transport: Arc<ScriptedTransport>) -> ProxyClient {
    ProxyClient::builder(ClientConfig::new("http://svc/"))
        .transport(transport)
        .telemetry(Telemetry::disabled())
        .build()
        .unwrap()
}

#[tokio::test]
async fn queued_jobs_run_in_order_and_drain_on_shutdown() {
    let transport = ScriptedTransport::new([Ok(200), Ok(200), Ok(200)]);
    let client = scripted_client(transport.clone());
    let order = Arc::new(Mutex::new(Vec::new()));

    for n in 1..=3 {
        let order = order.clone();
        client
            .send_queued(
                SendRequest::post(format!("jobs/{n}/")).on_success(move |_| {
                    order.lock().unwrap().push(n);
                }),
            )
            .unwrap();
    }

    assert_eq!(
        client.shutdown_within(Duration::from_secs(5)).await,
        DrainOutcome::Drained
    );
    assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(client.pending_jobs(), 0);
}

#[tokio::test]
async fn failing_job_does_not_block_the_next_one() {
    // The first call is refused; later jobs were admitted before the tracker opened.
    let transport = ScriptedTransport::new([Err(()), Ok(200)]);
    let client = scripted_client(transport.clone());
    let failures = Arc::new(AtomicUsize::new(0));
    let successes = Arc::new(AtomicUsize::new(0));

    let f = failures.clone();
    client
        .send_queued(SendRequest::get("a/").on_failure(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
    let s = successes.clone();
    client
        .send_queued(SendRequest::get("b/").on_success(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

    client.shutdown_within(Duration::from_secs(5)).await;
    assert_eq!(failures.load(Ordering::SeqCst), 1);
    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(transport.calls(), 2);
    assert!(!client.is_failing());
}

#[tokio::test]
async fn panicking_callback_is_isolated() {
    let transport = ScriptedTransport::new([Ok(200), Ok(200)]);
    let client = scripted_client(transport.clone());
    let delivered = Arc::new(AtomicUsize::new(0));

    client
        .send_queued(SendRequest::get("first/").on_success(|_| panic!("callback bug")))
        .unwrap();
    let d = delivered.clone();
    client
        .send_queued(SendRequest::get("second/").on_success(move |_| {
            d.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

    assert_eq!(
        client.shutdown_within(Duration::from_secs(5)).await,
        DrainOutcome::Drained
    );
    assert_eq!(delivered.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn send_queued_after_shutdown_is_rejected() {
    let client = scripted_client(ScriptedTransport::new([Ok(200)]));
    client.start_worker().unwrap();
    client.shutdown().await;

    let err = client.send_queued(SendRequest::get("")).unwrap_err();
    assert!(matches!(err, ProxyError::WorkerStopped));

    // Direct sends are unaffected by the worker lifecycle.
    let resp = client.send(SendRequest::get("")).await.unwrap();
    assert_eq!(resp.status_code(), 200);
}

#[tokio::test]
async fn drain_reports_timeout_with_pending_count() {
    let backend =
        start_backend(|_| Reply::status(200).delayed(Duration::from_millis(400))).await;
    let client = ProxyClient::builder(
        ClientConfig::new(backend.base_uri("/")).with_timeout(Duration::from_secs(2)),
    )
    .telemetry(Telemetry::disabled())
    .build()
    .unwrap();

    for _ in 0..3 {
        client.send_queued(SendRequest::post("")).unwrap();
    }

    match client.shutdown_within(Duration::from_millis(100)).await {
        DrainOutcome::TimedOut { pending } => assert!(pending >= 1 && pending <= 3),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_producers_all_delivered() {
    let backend = start_backend(|_| Reply::status(202)).await;
    let client = Arc::new(
        ProxyClient::builder(
            ClientConfig::new(backend.base_uri("/")).with_timeout(Duration::from_secs(5)),
        )
        .telemetry(Telemetry::disabled())
        .build()
        .unwrap(),
    );
    let delivered = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let client = client.clone();
            let delivered = delivered.clone();
            tokio::spawn(async move {
                for n in 0..10 {
                    let d = delivered.clone();
                    client
                        .send_queued(SendRequest::post(format!("p{p}/{n}/")).on_success(
                            move |_| {
                                d.fetch_add(1, Ordering::SeqCst);
                            },
                        ))
                        .unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }

    assert_eq!(
        client.shutdown_within(Duration::from_secs(30)).await,
        DrainOutcome::Drained
    );
    assert_eq!(delivered.load(Ordering::SeqCst), 40);
    assert_eq!(backend.hits(), 40);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn send_queued_from_a_plain_thread() {
    let transport = ScriptedTransport::new([Ok(200)]);
    let client = Arc::new(scripted_client(transport.clone()));
    let delivered = Arc::new(AtomicUsize::new(0));

    let producer = client.clone();
    let d = delivered.clone();
    let result = std::thread::spawn(move || {
        producer.send_queued(SendRequest::post("x/").on_success(move |_| {
            d.fetch_add(1, Ordering::SeqCst);
        }))
    })
    .join()
    .unwrap();
    assert!(result.is_ok());

    assert_eq!(
        client.shutdown_within(Duration::from_secs(2)).await,
        DrainOutcome::Drained
    );
    assert_eq!(delivered.load(Ordering::SeqCst), 1);
    assert_eq!(
        transport.seen(),
        vec![("POST".to_string(), "http://svc/x/".to_string())]
    );
}
