//! Observe layer: status capture, one emission per request, concurrency, and
//! failure propagation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use tower::{service_fn, Layer, ServiceExt};

use demo_svc_server::obs::{HttpMetrics, Observe, ObserveLayer, StatusRecorder};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_only(_req: Request<Body>) -> Result<Response<Body>, Infallible> {
    Ok(Response::new(Body::from("hello")))
}

async fn fail_on_query(req: Request<Body>) -> Result<Response<Body>, Infallible> {
    tokio::time::sleep(Duration::from_millis(5)).await;
    let status = match req.uri().query() {
        Some("fail") => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    Ok(Response::builder().status(status).body(Body::empty()).unwrap())
}

async fn explode(_req: Request<Body>) -> Result<Response<Body>, Infallible> {
    panic!("handler exploded");
}

#[test]
fn recorder_defaults_to_ok_and_keeps_last_write() {
    let mut rec = StatusRecorder::new();
    assert_eq!(rec.status(), StatusCode::OK);
    assert_eq!(rec.status_label(), "200");

    rec.write_header(StatusCode::NOT_FOUND);
    rec.write_header(StatusCode::BAD_GATEWAY);
    assert_eq!(rec.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(rec.status_label(), "502");
}

#[test]
fn recorder_passes_response_through() {
    let mut rec = StatusRecorder::default();
    let res = Response::builder()
        .status(StatusCode::CREATED)
        .header("x-demo", "1")
        .body("payload")
        .unwrap();

    let res = rec.record(res);
    assert_eq!(rec.status(), StatusCode::CREATED);
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["x-demo"], "1");
    assert_eq!(*res.body(), "payload");
}

#[tokio::test]
async fn implicit_status_is_recorded_as_200() {
    let metrics = Arc::new(HttpMetrics::default());
    let svc = Observe::new(service_fn(body_only), Arc::clone(&metrics), "/v1/ok");
    assert_eq!(svc.route(), "/v1/ok");

    let res = svc.oneshot(get("/v1/ok")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(metrics.requests("GET", "/v1/ok", "200"), 1);
    assert_eq!(metrics.durations("GET", "/v1/ok", "200").unwrap().count, 1);
}

#[tokio::test]
async fn explicit_status_is_recorded_with_same_labels() {
    let metrics = Arc::new(HttpMetrics::default());
    let svc = ObserveLayer::new(Arc::clone(&metrics), "/v1/user-error").layer(service_fn(
        |_req: Request<Body>| async {
            Ok::<_, Infallible>(
                Response::builder()
                    .status(StatusCode::BAD_REQUEST)
                    .body(Body::from(r#"{"status":"Bad Request"}"#))
                    .unwrap(),
            )
        },
    ));

    let res = svc.oneshot(get("/v1/user-error")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], br#"{"status":"Bad Request"}"#);

    assert_eq!(metrics.requests("GET", "/v1/user-error", "400"), 1);
    let hist = metrics.durations("GET", "/v1/user-error", "400").unwrap();
    assert_eq!(hist.count, 1);

    // nothing leaks into the default status
    assert_eq!(metrics.requests("GET", "/v1/user-error", "200"), 0);
    assert!(metrics.durations("GET", "/v1/user-error", "200").is_none());
}

#[tokio::test]
async fn route_label_is_used_instead_of_path() {
    let metrics = Arc::new(HttpMetrics::default());
    let svc = Observe::new(service_fn(body_only), Arc::clone(&metrics), "/users/:id");

    for id in [1, 2, 3] {
        let uri = format!("/users/{id}");
        svc.clone().oneshot(get(&uri)).await.unwrap();
    }

    assert_eq!(metrics.requests("GET", "/users/:id", "200"), 3);
    assert_eq!(metrics.requests("GET", "/users/1", "200"), 0);
}

#[tokio::test]
async fn method_is_part_of_the_key() {
    let metrics = Arc::new(HttpMetrics::default());
    let svc = Observe::new(service_fn(body_only), Arc::clone(&metrics), "/v1/ok");

    let post = Request::builder()
        .method("POST")
        .uri("/v1/ok")
        .body(Body::empty())
        .unwrap();
    svc.clone().oneshot(post).await.unwrap();
    svc.oneshot(get("/v1/ok")).await.unwrap();

    assert_eq!(metrics.requests("POST", "/v1/ok", "200"), 1);
    assert_eq!(metrics.requests("GET", "/v1/ok", "200"), 1);
}

#[tokio::test]
async fn duration_covers_handler_time() {
    let metrics = Arc::new(HttpMetrics::default());
    let svc = Observe::new(
        service_fn(|_req: Request<Body>| async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, Infallible>(Response::new(Body::empty()))
        }),
        Arc::clone(&metrics),
        "/slow",
    );

    svc.oneshot(get("/slow")).await.unwrap();

    let hist = metrics.durations("GET", "/slow", "200").unwrap();
    assert_eq!(hist.count, 1);
    assert!(hist.sum >= Duration::from_millis(20), "sum = {:?}", hist.sum);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_outcomes_accumulate_independently() {
    let metrics = Arc::new(HttpMetrics::default());
    let svc = Observe::new(service_fn(fail_on_query), Arc::clone(&metrics), "/mixed");

    let mut handles = Vec::new();
    for i in 0..15 {
        let uri = if i % 3 == 0 { "/mixed?fail" } else { "/mixed" };
        let req = get(uri);
        let svc = svc.clone();
        handles.push(tokio::spawn(async move { svc.oneshot(req).await }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    assert_eq!(metrics.requests("GET", "/mixed", "200"), 10);
    assert_eq!(metrics.requests("GET", "/mixed", "500"), 5);
    assert_eq!(metrics.durations("GET", "/mixed", "200").unwrap().count, 10);
    assert_eq!(metrics.durations("GET", "/mixed", "500").unwrap().count, 5);
}

#[tokio::test]
async fn inner_error_propagates_without_metrics() {
    let metrics = Arc::new(HttpMetrics::default());
    let svc = Observe::new(
        service_fn(|_req: Request<Body>| async {
            Err::<Response<Body>, &'static str>("backend down")
        }),
        Arc::clone(&metrics),
        "/broken",
    );

    let err = svc.oneshot(get("/broken")).await.expect_err("must fail");
    assert_eq!(err, "backend down");
    assert!(metrics.durations("GET", "/broken", "200").is_none());
    assert!(metrics.durations("GET", "/broken", "500").is_none());
}

#[tokio::test]
async fn panicking_handler_records_nothing() {
    let metrics = Arc::new(HttpMetrics::default());
    let svc = Observe::new(service_fn(explode), Arc::clone(&metrics), "/boom");

    let joined = tokio::spawn(svc.oneshot(get("/boom"))).await;
    assert!(joined.expect_err("handler panics").is_panic());

    assert_eq!(metrics.requests("GET", "/boom", "200"), 0);
    assert_eq!(metrics.requests("GET", "/boom", "500"), 0);
    assert!(metrics.durations("GET", "/boom", "200").is_none());
}
