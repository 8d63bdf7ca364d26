mod server;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};
use server::{CONTACT_PAGE, get_test_server_url, optimized_page};
use std::net::SocketAddr;
use studiolens::extractor::SignalExtractor;
use studiolens::fetcher::PageFetcher;
use studiolens::rate_limiter::RateLimitOptions;
use studiolens::server::{AppState, routes};

fn app_state(origin: &str, limit: u32) -> web::Data<AppState> {
    web::Data::new(AppState::new(
        PageFetcher::new(origin, 10).unwrap(),
        SignalExtractor::new(),
        RateLimitOptions {
            limit,
            window_ms: 60_000,
        },
    ))
}

fn peer(ip: &str) -> SocketAddr {
    format!("{}:40000", ip).parse().unwrap()
}

#[actix_web::test]
async fn test_health() {
    let app = test::init_service(
        App::new()
            .app_data(app_state("https://studio37.cc", 30))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_web::test]
async fn test_rate_limit_returns_429_with_retry_after() {
    let app = test::init_service(
        App::new()
            .app_data(app_state("https://studio37.cc", 2))
            .configure(routes),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/api/health")
            .peer_addr(peer("10.0.0.1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/api/health")
        .peer_addr(peer("10.0.0.1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = resp
        .headers()
        .get(header::RETRY_AFTER)
        .expect("Retry-After header missing")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Too many requests"));

    // Another client has its own window
    let req = test::TestRequest::get()
        .uri("/api/health")
        .peer_addr(peer("10.0.0.2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_forwarded_headers_do_not_change_the_client_key() {
    let app = test::init_service(
        App::new()
            .app_data(app_state("https://studio37.cc", 1))
            .configure(routes),
    )
    .await;

    let mut statuses = Vec::new();
    for i in 0..5 {
        let req = test::TestRequest::get()
            .uri("/api/health")
            .peer_addr(peer("10.0.0.1"))
            .insert_header(("X-Forwarded-For", format!("1.2.3.{}", i)))
            .insert_header(("Forwarded", format!("for=1.2.4.{}", i)))
            .to_request();
        statuses.push(test::call_service(&app, req).await.status());
    }

    assert_eq!(statuses[0], StatusCode::OK);
    assert!(
        statuses[1..]
            .iter()
            .all(|status| *status == StatusCode::TOO_MANY_REQUESTS),
        "Got {:?}",
        statuses
    );
}

#[actix_web::test]
async fn test_trusted_proxy_keys_on_forwarded_for() {
    let state = web::Data::new(
        AppState::new(
            PageFetcher::new("https://studio37.cc", 10).unwrap(),
            SignalExtractor::new(),
            RateLimitOptions {
                limit: 1,
                window_ms: 60_000,
            },
        )
        .with_trust_proxy(true),
    );
    let app = test::init_service(App::new().app_data(state).configure(routes)).await;

    let call = |client: &'static str| {
        test::TestRequest::get()
            .uri("/api/health")
            .peer_addr(peer("10.0.0.1"))
            .insert_header(("X-Forwarded-For", client))
            .to_request()
    };

    assert_eq!(test::call_service(&app, call("1.2.3.1")).await.status(), StatusCode::OK);
    assert_eq!(test::call_service(&app, call("1.2.3.2")).await.status(), StatusCode::OK);
    assert_eq!(
        test::call_service(&app, call("1.2.3.1")).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[actix_web::test]
async fn test_rate_limit_is_per_route() {
    let app = test::init_service(
        App::new()
            .app_data(app_state("https://studio37.cc", 1))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/health")
        .peer_addr(peer("10.0.0.1"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/seo/keywords")
        .peer_addr(peer("10.0.0.1"))
        .set_json(json!({ "text": "portraits" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_rate_limit_runs_before_body_validation() {
    let app = test::init_service(
        App::new()
            .app_data(app_state("https://studio37.cc", 0))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/seo/analyze")
        .insert_header(header::ContentType::json())
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_web::test]
async fn test_analyze_html_body() {
    let app = test::init_service(
        App::new()
            .app_data(app_state("https://studio37.cc", 30))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/seo/analyze")
        .set_json(json!({ "html": CONTACT_PAGE }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["url"], "https://studio37.cc/");
    assert_eq!(body["title"], "Contact");
    assert_eq!(body["titleLength"], 7);
    assert_eq!(body["score"], 51);
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 7);

    let req = test::TestRequest::post()
        .uri("/api/seo/analyze")
        .set_json(json!({ "url": "https://studio37.cc/", "html": optimized_page() }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["score"], 100);
    assert_eq!(body["jsonLdTypes"], json!(["LocalBusiness"]));
}

#[actix_web::test]
async fn test_analyze_bad_requests() {
    let app = test::init_service(
        App::new()
            .app_data(app_state("https://studio37.cc", 30))
            .configure(routes),
    )
    .await;

    for payload in ["{ not json", "{}", r#"{"url": "  ", "html": ""}"#, r#"{"html": 42}"#] {
        let req = test::TestRequest::post()
            .uri("/api/seo/analyze")
            .insert_header(header::ContentType::json())
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {}", payload);
    }
}

#[actix_web::test]
async fn test_analyze_cross_origin_url_is_forbidden() {
    let app = test::init_service(
        App::new()
            .app_data(app_state("https://studio37.cc", 30))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/seo/analyze")
        .set_json(json!({ "url": "https://evil.example.com/page" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("evil.example.com"));
}

#[actix_web::test]
async fn test_analyze_fetches_same_origin_url() {
    let base_url = get_test_server_url().await;
    let app = test::init_service(
        App::new()
            .app_data(app_state(&base_url, 30))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/seo/analyze")
        .set_json(json!({ "url": "/" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["url"], format!("{}/", base_url));
    assert_eq!(body["score"], 100);

    let req = test::TestRequest::post()
        .uri("/api/seo/analyze")
        .set_json(json!({ "url": "/missing" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn test_keywords_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(app_state("https://studio37.cc", 30))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/seo/keywords")
        .set_json(json!({ "text": "the quick fox and the quick dog" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["keywords"], json!(["quick", "fox", "dog"]));
    assert_eq!(body["phrases"], json!(["quick fox", "quick dog"]));

    let req = test::TestRequest::post()
        .uri("/api/seo/keywords")
        .set_json(json!({ "text": "the quick fox and the quick dog", "max": 2 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["keywords"], json!(["quick"]));
    assert_eq!(body["phrases"], json!([]));

    let req = test::TestRequest::post()
        .uri("/api/seo/keywords")
        .set_json(json!({ "max": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_readability_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(app_state("https://studio37.cc", 30))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/content/readability")
        .set_json(json!({ "text": "The cat sat on the mat." }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["fleschReadingEase"], 100.0);
    assert_eq!(body["level"], "very easy");

    let req = test::TestRequest::post()
        .uri("/api/content/readability")
        .set_json(json!({ "html": "<p>Book a session.</p><p>We reply fast.</p>" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["sentences"], 2);
    assert_eq!(body["words"], 6);

    let req = test::TestRequest::post()
        .uri("/api/content/readability")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
