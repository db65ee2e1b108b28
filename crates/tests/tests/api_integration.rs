use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use pickup_api::build_app;
use pickup_core::{RateLimitConfig, SiteConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    build_app(SiteConfig::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, parsed)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn pickup_payload() -> Value {
    json!({
        "name": "Asha Rao",
        "phone": "+91 98765 43212",
        "email": "Asha@Example.com",
        "address": "Powai, Mumbai 400076",
        "category": "appliances",
        "items": "Washing machine, 6 years old, working",
        "preferredDate": "2025-02-01",
        "preferredTime": "3:00 PM - 6:00 PM"
    })
}

fn text_param(link: &str) -> String {
    let parsed = url::Url::parse(link).unwrap();
    parsed
        .query_pairs()
        .find(|(key, _)| key == "text")
        .map(|(_, value)| value.into_owned())
        .unwrap()
}

#[tokio::test]
async fn health_reports_metrics() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert!(response.headers().get("x-request-id").is_some());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert!(parsed["metrics"].get("requests_total").is_some());
}

#[tokio::test]
async fn business_profile_exposes_whatsapp_number() {
    let (status, body) = send(app(), get("/api/config/business")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["whatsapp_number"], "919876543210");
    assert_eq!(body["whatsapp_chat_url"], "https://wa.me/919876543210");
    assert_eq!(body["business"]["name"], "ElectroFurni Pickup");
}

#[tokio::test]
async fn products_filter_by_category() {
    let (status, body) = send(app(), get("/api/products?category=furniture")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert!(body["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|product| product["category"] == "furniture"));

    let (_, body) = send(app(), get("/api/products?category=all&q=macbook")).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["slug"], "macbook-air-m2-like-new");
}

#[tokio::test]
async fn product_detail_includes_inquiry_link() {
    let (status, body) = send(app(), get("/api/products/iphone-14-pro-excellent")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["id"], "1");
    assert_eq!(body["discount_percent"], 13);
    assert_eq!(
        text_param(body["whatsapp"]["url"].as_str().unwrap()),
        "Hi! I'm interested in iPhone 14 Pro - Excellent Condition (ID: 1). Could you please provide more details about availability and pricing?"
    );
    assert_eq!(body["schema"]["@type"], "Product");
    assert_eq!(
        body["meta"]["canonical"],
        "https://electrofurni.com/product/iphone-14-pro-excellent"
    );

    let (status, body) = send(app(), get("/api/products/unknown-slug")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "product_not_found");
}

#[tokio::test]
async fn categories_carry_product_counts() {
    let (status, body) = send(app(), get("/api/categories")).await;
    assert_eq!(status, StatusCode::OK);
    let electronics = body
        .as_array()
        .unwrap()
        .iter()
        .find(|category| category["slug"] == "electronics")
        .unwrap();
    assert_eq!(electronics["product_count"], 3);
}

#[tokio::test]
async fn blog_lists_newest_first_and_resolves_slugs() {
    let (status, body) = send(app(), get("/api/blog?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["items"][0]["slug"], "best-price-used-electronics");

    let (status, body) = send(app(), get("/api/blog/electronics-recycling-process")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["schema"]["@type"], "Article");

    let (status, _) = send(app(), get("/api/blog/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn faq_search_narrows_results() {
    let (status, body) = send(app(), get("/api/faqs?q=payment")).await;
    assert_eq!(status, StatusCode::OK);
    let faqs = body["faqs"].as_array().unwrap();
    assert!(!faqs.is_empty());
    assert!(faqs.len() < 8);
    assert_eq!(body["schema"]["@type"], "FAQPage");
}

#[tokio::test]
async fn pickup_request_is_accepted_with_follow_up_link() {
    let app = app();
    let (status, body) = send(
        app.clone(),
        json_request("POST", "/api/pickup-requests", pickup_payload()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["request"]["status"], "pending");
    assert_eq!(body["request"]["email"], "asha@example.com");
    assert_eq!(body["whatsapp"]["type"], "pickup");

    let url = body["whatsapp"]["url"].as_str().unwrap();
    assert!(url.starts_with("https://wa.me/919876543210?text="));
    let text = text_param(url);
    assert!(text.contains("My name is Asha Rao."));
    assert!(text.contains("My phone number is +91 98765 43212."));

    let (_, listed) = send(app, get("/api/admin/pickup-requests?status=pending")).await;
    assert_eq!(listed[0]["id"], body["request"]["id"]);
}

#[tokio::test]
async fn invalid_pickup_request_lists_every_field() {
    let (status, body) = send(
        app(),
        json_request(
            "POST",
            "/api/pickup-requests",
            json!({ "name": "A", "email": "not-an-email" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_failed");
    for field in ["name", "phone", "email", "address", "category", "items"] {
        assert!(body["fields"].get(field).is_some(), "missing {field}");
    }
}

#[tokio::test]
async fn contact_message_returns_contact_link() {
    let (status, body) = send(
        app(),
        json_request(
            "POST",
            "/api/contact",
            json!({
                "name": "Vikram",
                "email": "vikram@example.com",
                "message": "Do you pick up in Thane?"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["whatsapp"]["type"], "contact");
    assert!(body["whatsapp"]["message"]
        .as_str()
        .unwrap()
        .ends_with("Do you pick up in Thane?"));
}

#[tokio::test]
async fn newsletter_detects_duplicates() {
    let app = app();
    let payload = json!({ "email": "reader@example.com" });

    let (status, body) = send(
        app.clone(),
        json_request("POST", "/api/newsletter/subscribe", payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "subscribed");

    let (status, body) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/newsletter/subscribe",
            json!({ "email": "READER@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "already_subscribed");

    let (status, _) = send(
        app,
        json_request("POST", "/api/newsletter/subscribe", json!({ "email": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn admin_updates_pickup_status_and_stats() {
    let app = app();
    let (status, body) = send(
        app.clone(),
        json_request(
            "PUT",
            "/api/admin/pickup-requests/1",
            json!({ "status": "completed", "estimatedValue": 80000 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["estimated_value"], 80000);

    let (_, stats) = send(app.clone(), get("/api/admin/stats")).await;
    assert_eq!(stats["total_requests"], 2);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["total_estimated_value"], 125000);

    let (status, _) = send(
        app.clone(),
        json_request(
            "PUT",
            "/api/admin/pickup-requests/missing",
            json!({ "status": "confirmed" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        app.clone(),
        json_request("PUT", "/api/admin/pickup-requests/1", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "empty_update");

    let (status, _) = send(app, get("/api/admin/pickup-requests?status=lost")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_survive_huge_estimated_values() {
    let app = app();
    for id in ["1", "2"] {
        let (status, _) = send(
            app.clone(),
            json_request(
                "PUT",
                &format!("/api/admin/pickup-requests/{id}"),
                json!({ "estimated_value": u64::MAX }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, stats) = send(app, get("/api/admin/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_estimated_value"], u64::MAX);
}

#[tokio::test]
async fn malformed_bodies_use_json_error_envelope() {
    let response = app()
        .oneshot(json_request(
            "POST",
            "/api/whatsapp/link",
            json!({ "product_name": "Sofa" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap()
        .starts_with("application/json"));
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "invalid_body");
    assert!(body["message"].as_str().unwrap().contains("type"));

    let request = Request::builder()
        .method("POST")
        .uri("/api/pickup-requests")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn whatsapp_link_endpoint_composes_tagged_intents() {
    let (status, body) = send(
        app(),
        json_request(
            "POST",
            "/api/whatsapp/link",
            json!({ "type": "product", "product_name": "Sofa", "product_id": "42" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "product");
    assert_eq!(
        body["message"],
        "Hi! I'm interested in Sofa (ID: 42). Could you please provide more details about availability and pricing?"
    );
    assert_eq!(text_param(body["url"].as_str().unwrap()), body["message"]);
}

#[tokio::test]
async fn whatsapp_redirect_sends_see_other() {
    let response = app()
        .oneshot(get(
            "/api/whatsapp/redirect?type=general&custom_message=Hello%20%26%20bye",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap();
    assert_eq!(
        location,
        "https://wa.me/919876543210?text=Hello%20%26%20bye"
    );

    let (status, body) = send(app(), get("/api/whatsapp/redirect?type=fax")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_intent");
}

#[tokio::test]
async fn sitemap_lists_static_and_dynamic_pages() {
    let response = app().oneshot(get("/sitemap.xml")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap()
        .starts_with("application/xml"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let xml = String::from_utf8(body.to_vec()).unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<loc>https://electrofurni.com/pickup-request</loc>"));
    assert!(xml.contains("<loc>https://electrofurni.com/product/modern-l-shaped-sofa</loc>"));
    assert!(xml.contains("<loc>https://electrofurni.com/blog/best-price-used-electronics</loc>"));
}

#[tokio::test]
async fn form_submissions_are_rate_limited_per_ip() {
    let config = SiteConfig {
        form_rate_limit: RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 2,
        },
        ..SiteConfig::default()
    };
    let app = build_app(config);

    let submit = |ip: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/newsletter/subscribe")
            .header("content-type", "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(json!({ "email": "a@example.com" }).to_string()))
            .unwrap()
    };

    let (first, _) = send(app.clone(), submit("198.51.100.1")).await;
    let (second, _) = send(app.clone(), submit("198.51.100.1")).await;
    let (third, body) = send(app.clone(), submit("198.51.100.1")).await;
    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(third, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");

    let (other, _) = send(app, submit("198.51.100.2")).await;
    assert_ne!(other, StatusCode::TOO_MANY_REQUESTS);
}
