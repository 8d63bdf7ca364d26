use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[allow(dead_code)]
pub const CONTACT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Contact</title></head>
<body>
<p>Call or email us to book a session.</p>
</body>
</html>"#;

#[allow(dead_code)]
pub const OPTIMIZED_TITLE: &str = "Studio37 Portrait Photography in Downtown Houston";

#[allow(dead_code)]
pub const OPTIMIZED_DESCRIPTION: &str = "Natural light portrait, headshot and family photography from Studio37, a downtown Houston studio with same-week sessions and edits.";

/// A page that passes every rule: good title and description lengths, canonical,
/// og:image, JSON-LD, one h1, described images and 300+ words of copy.
#[allow(dead_code)]
pub fn optimized_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>{title}</title>
  <meta name="description" content="{description}">
  <link rel="canonical" href="https://studio37.cc/">
  <meta property="og:title" content="{title}">
  <meta property="og:image" content="https://studio37.cc/og/home.jpg">
  <meta name="twitter:card" content="summary_large_image">
  <script type="application/ld+json">
    {{"@context": "https://schema.org", "@type": "LocalBusiness", "name": "Studio37"}}
  </script>
</head>
<body>
  <h1>Portrait Photography</h1>
  <img src="/img/studio.jpg" alt="The downtown studio with softbox lighting">
  <img src="/img/family.jpg" alt="Family portrait session by the window">
  <p>{copy}</p>
</body>
</html>"#,
        title = OPTIMIZED_TITLE,
        description = OPTIMIZED_DESCRIPTION,
        copy = "Natural light portrait sessions in our downtown studio. ".repeat(40),
    )
}

#[allow(dead_code)]
fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Starts a fixture site on an ephemeral port and returns its origin, e.g.
/// `http://127.0.0.1:54321`.
#[allow(dead_code)]
pub async fn get_test_server_url() -> String {
    let http_server = HttpServer::new(|| {
        App::new()
            .route("/", web::get().to(|| async { html(optimized_page()) }))
            .route(
                "/contact",
                web::get().to(|| async { html(CONTACT_PAGE.to_string()) }),
            )
            .route(
                "/about",
                web::get().to(|| async {
                    html(
                        r#"<html><head><title>About Studio37</title></head>
<body><h1>About</h1><h1>Our team</h1>
<img src="/a.jpg"><img src="/b.jpg" alt="  "><img src="/c.jpg" alt="Team photo">
<p>We have photographed weddings, families and brands since 2012.</p></body></html>"#
                            .to_string(),
                    )
                }),
            )
            .route(
                "/plain.txt",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/plain")
                        .body("Just text, no markup.")
                }),
            )
            .route(
                "/offsite",
                web::get().to(|req: HttpRequest| async move {
                    // Same server, but reached through a different host name
                    let port = req.app_config().local_addr().port();
                    HttpResponse::Found()
                        .append_header(("Location", format!("http://localhost:{}/contact", port)))
                        .finish()
                }),
            )
            .route(
                "/moved",
                web::get().to(|| async {
                    HttpResponse::MovedPermanently()
                        .append_header(("Location", "contact"))
                        .finish()
                }),
            )
            .route(
                "/loop",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/loop"))
                        .finish()
                }),
            )
            .route(
                "/redirect",
                web::get().to(|query: web::Query<HashMap<String, String>>| async move {
                    let to = query.get("to").cloned().unwrap_or_else(|| "/".to_string());
                    HttpResponse::Found()
                        .append_header(("Location", to))
                        .finish()
                }),
            )
            .route(
                "/server-error",
                web::get().to(|| async { HttpResponse::InternalServerError().body("Error") }),
            )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind test server");

    let addr = http_server
        .addrs()
        .first()
        .cloned()
        .expect("No address bound");
    let url = format!("http://{}", addr);

    let app_server = http_server.run();

    tokio::spawn(async move {
        if let Err(e) = app_server.await {
            eprintln!("Test server error: {}", e);
        }
    });

    url
}

/// Starts a second site that answers every path and counts the requests it receives.
#[allow(dead_code)]
pub async fn get_counting_server_url() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let http_server = HttpServer::new(move || {
        let counter = counter.clone();
        App::new().default_service(web::to(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                html(CONTACT_PAGE.to_string())
            }
        }))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind counting server");

    let addr = http_server
        .addrs()
        .first()
        .cloned()
        .expect("No address bound");
    let url = format!("http://{}", addr);

    let app_server = http_server.run();

    tokio::spawn(async move {
        if let Err(e) = app_server.await {
            eprintln!("Counting server error: {}", e);
        }
    });

    (url, hits)
}
