mod extract;
mod rate_limit;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::{Json, Path, Query, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post, put};
use axum::{body::Body, Router};
use pickup_core::catalog::Category;
use pickup_core::seo::{
    article_schema, faq_schema, local_business_schema, product_schema, render_sitemap,
    sitemap_entries,
};
use pickup_core::whatsapp::{IntentFields, IntentKind};
use pickup_core::{
    compose, filter_products, paginate_posts, search_faqs, validate_email, ContactForm,
    ContactMessage, DashboardStats, MessageIntent, PageMeta, PickupRequest, PickupRequestForm,
    PickupStatus, PickupUpdate, ProductQuery, SiteConfig, ValidationErrors,
};
use pickup_observability::AppMetrics;
use pickup_storage::{
    CatalogRepository, ContentRepository, LeadRepository, Store, SubscribeOutcome,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::extract::ApiJson;
pub use crate::rate_limit::IpRateLimiter;

const MAX_BODY_BYTES: usize = 64 * 1024;
const DEFAULT_BLOG_LIMIT: usize = 10;
const MAX_BLOG_LIMIT: usize = 50;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<Store>,
    pub metrics: Arc<AppMetrics>,
    pub config: Arc<SiteConfig>,
    pub form_limiter: IpRateLimiter,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: pickup_observability::MetricsSnapshot,
}

#[derive(Debug, Serialize)]
struct BusinessResponse<'a> {
    business: &'a pickup_core::BusinessProfile,
    whatsapp_number: &'a str,
    whatsapp_chat_url: String,
}

#[derive(Debug, Serialize)]
struct CategorySummary {
    #[serde(flatten)]
    category: Category,
    product_count: usize,
}

#[derive(Debug, Deserialize)]
struct BlogQuery {
    page: Option<usize>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct FaqQuery {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsletterRequest {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct WhatsAppQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    custom_message: Option<String>,
    product_name: Option<String>,
    product_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct WhatsAppResponse {
    #[serde(rename = "type")]
    intent_type: IntentKind,
    url: String,
    message: String,
}

impl WhatsAppResponse {
    fn build(config: &SiteConfig, intent: &MessageIntent) -> Self {
        let link = compose(&config.whatsapp, intent);
        Self {
            intent_type: intent.kind(),
            url: link.url().to_string(),
            message: link.message().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PickupCreatedResponse {
    request: PickupRequest,
    whatsapp: WhatsAppResponse,
}

#[derive(Debug, Serialize)]
struct ContactCreatedResponse {
    contact: ContactMessage,
    whatsapp: WhatsAppResponse,
}

pub fn build_app(config: SiteConfig) -> Router {
    build_app_with_store(config, Store::seeded())
}

pub fn build_app_with_store(config: SiteConfig, store: Store) -> Router {
    let state = ApiState {
        store: Arc::new(store),
        metrics: AppMetrics::shared(),
        form_limiter: IpRateLimiter::from_config(config.form_rate_limit),
        config: Arc::new(config),
    };

    build_router(state)
}

pub async fn serve(config: SiteConfig) -> Result<()> {
    let bind = config.bind.clone();
    let whatsapp_number = config.whatsapp.number().to_string();
    let app = build_app(config);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(bind = %bind, whatsapp_number = %whatsapp_number, "pickup api started");

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sitemap.xml", get(sitemap))
        .route("/api/config/business", get(business_profile))
        .route("/api/products", get(products_list))
        .route("/api/products/featured", get(products_featured))
        .route("/api/products/:slug", get(product_detail))
        .route("/api/categories", get(categories_list))
        .route("/api/blog", get(blog_list))
        .route("/api/blog/:slug", get(blog_detail))
        .route("/api/faqs", get(faqs_list))
        .route("/api/testimonials", get(testimonials_list))
        .route("/api/pickup-requests", post(pickup_request_submit))
        .route("/api/contact", post(contact_submit))
        .route("/api/newsletter/subscribe", post(newsletter_subscribe))
        .route("/api/admin/pickup-requests", get(admin_pickup_requests))
        .route(
            "/api/admin/pickup-requests/:id",
            put(admin_pickup_request_update),
        )
        .route("/api/admin/contact-messages", get(admin_contact_messages))
        .route("/api/admin/stats", get(admin_stats))
        .route("/api/whatsapp/link", post(whatsapp_link))
        .route("/api/whatsapp/redirect", get(whatsapp_redirect))
        .route("/api/seo/local-business", get(seo_local_business))
        .layer(build_cors_layer(&state.config.allowed_origins))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            metrics_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn business_profile(State(state): State<ApiState>) -> impl IntoResponse {
    let config = state.config.as_ref();
    Json(BusinessResponse {
        business: &config.business,
        whatsapp_number: config.whatsapp.number().as_str(),
        whatsapp_chat_url: config.whatsapp.chat_url(),
    })
    .into_response()
}

async fn products_list(
    State(state): State<ApiState>,
    Query(query): Query<ProductQuery>,
) -> Response {
    match state.store.list_products().await {
        Ok(products) => (StatusCode::OK, Json(filter_products(&products, &query))).into_response(),
        Err(error) => internal_error("products_unavailable", error),
    }
}

async fn products_featured(State(state): State<ApiState>) -> Response {
    match state.store.list_products().await {
        Ok(products) => Json(pickup_core::featured_products(&products)).into_response(),
        Err(error) => internal_error("products_unavailable", error),
    }
}

async fn product_detail(State(state): State<ApiState>, Path(slug): Path<String>) -> Response {
    let product = match state.store.product_by_slug(&slug).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                "product_not_found",
                format!("no product with slug {slug}"),
            )
        }
        Err(error) => return internal_error("products_unavailable", error),
    };

    let config = state.config.as_ref();
    let inquiry = MessageIntent::Product {
        product_name: Some(product.name.clone()),
        product_id: Some(product.id.clone()),
    };

    Json(serde_json::json!({
        "discount_percent": product.discount_percent(),
        "meta": PageMeta::for_product(&config.business, &config.site_url, &product),
        "schema": product_schema(&config.business, &product),
        "whatsapp": WhatsAppResponse::build(config, &inquiry),
        "product": product,
    }))
    .into_response()
}

async fn categories_list(State(state): State<ApiState>) -> Response {
    let categories = match state.store.list_categories().await {
        Ok(categories) => categories,
        Err(error) => return internal_error("categories_unavailable", error),
    };
    let products = match state.store.list_products().await {
        Ok(products) => products,
        Err(error) => return internal_error("products_unavailable", error),
    };

    let summaries = categories
        .into_iter()
        .map(|category| CategorySummary {
            product_count: products
                .iter()
                .filter(|product| product.category.eq_ignore_ascii_case(&category.slug))
                .count(),
            category,
        })
        .collect::<Vec<_>>();
    Json(summaries).into_response()
}

async fn blog_list(State(state): State<ApiState>, Query(query): Query<BlogQuery>) -> Response {
    match state.store.list_posts().await {
        Ok(posts) => {
            let limit = query
                .limit
                .unwrap_or(DEFAULT_BLOG_LIMIT)
                .clamp(1, MAX_BLOG_LIMIT);
            Json(paginate_posts(&posts, query.page.unwrap_or(1), limit)).into_response()
        }
        Err(error) => internal_error("posts_unavailable", error),
    }
}

async fn blog_detail(State(state): State<ApiState>, Path(slug): Path<String>) -> Response {
    match state.store.post_by_slug(&slug).await {
        Ok(Some(post)) => {
            let business = &state.config.business;
            Json(serde_json::json!({
                "meta": PageMeta::for_post(business, &state.config.site_url, &post),
                "schema": article_schema(business, &post),
                "post": post,
            }))
            .into_response()
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "post_not_found",
            format!("no blog post with slug {slug}"),
        ),
        Err(error) => internal_error("posts_unavailable", error),
    }
}

async fn faqs_list(State(state): State<ApiState>, Query(query): Query<FaqQuery>) -> Response {
    match state.store.list_faqs().await {
        Ok(faqs) => {
            let faqs = search_faqs(&faqs, query.q.as_deref());
            Json(serde_json::json!({
                "schema": faq_schema(&faqs),
                "faqs": faqs,
            }))
            .into_response()
        }
        Err(error) => internal_error("faqs_unavailable", error),
    }
}

async fn testimonials_list(State(state): State<ApiState>) -> Response {
    match state.store.list_testimonials().await {
        Ok(testimonials) => Json(testimonials).into_response(),
        Err(error) => internal_error("testimonials_unavailable", error),
    }
}

async fn pickup_request_submit(
    State(state): State<ApiState>,
    ApiJson(form): ApiJson<PickupRequestForm>,
) -> Response {
    let request = match PickupRequest::from_form(form, chrono::Utc::now()) {
        Ok(request) => request,
        Err(errors) => return validation_response(&state, errors),
    };

    let whatsapp = WhatsAppResponse::build(&state.config, &request.whatsapp_intent());
    if let Err(error) = state.store.insert_pickup_request(request.clone()).await {
        return internal_error("pickup_request_not_saved", error);
    }

    state.metrics.inc_pickup_request();
    state.metrics.inc_whatsapp_link();
    tracing::info!(
        request_id = %request.id,
        category = %request.category,
        preferred_date = %request.preferred_date,
        "pickup request accepted"
    );

    (
        StatusCode::CREATED,
        Json(PickupCreatedResponse { request, whatsapp }),
    )
        .into_response()
}

async fn contact_submit(
    State(state): State<ApiState>,
    ApiJson(form): ApiJson<ContactForm>,
) -> Response {
    let contact = match ContactMessage::from_form(form, chrono::Utc::now()) {
        Ok(contact) => contact,
        Err(errors) => return validation_response(&state, errors),
    };

    let intent = MessageIntent::Contact {
        custom_message: Some(contact.message.clone()),
    };
    let whatsapp = WhatsAppResponse::build(&state.config, &intent);
    if let Err(error) = state.store.insert_contact_message(contact.clone()).await {
        return internal_error("contact_not_saved", error);
    }

    state.metrics.inc_contact_message();
    tracing::info!(contact_id = %contact.id, "contact message accepted");

    (
        StatusCode::CREATED,
        Json(ContactCreatedResponse { contact, whatsapp }),
    )
        .into_response()
}

async fn newsletter_subscribe(
    State(state): State<ApiState>,
    ApiJson(input): ApiJson<NewsletterRequest>,
) -> Response {
    let email = match validate_email(&input.email) {
        Ok(email) => email,
        Err(errors) => return validation_response(&state, errors),
    };

    match state.store.subscribe_newsletter(&email).await {
        Ok(outcome @ SubscribeOutcome::Subscribed) => {
            state.metrics.inc_newsletter_signup();
            tracing::info!("newsletter subscription added");
            (StatusCode::CREATED, Json(serde_json::json!({ "status": outcome }))).into_response()
        }
        Ok(outcome @ SubscribeOutcome::AlreadySubscribed) => {
            (StatusCode::OK, Json(serde_json::json!({ "status": outcome }))).into_response()
        }
        Err(error) => internal_error("newsletter_not_saved", error),
    }
}

async fn admin_pickup_requests(
    State(state): State<ApiState>,
    Query(query): Query<StatusQuery>,
) -> Response {
    let status = match parse_status_filter(query.status.as_deref()) {
        Ok(status) => status,
        Err(value) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "invalid_status",
                format!("unknown status filter {value:?}"),
            )
        }
    };

    match state.store.list_pickup_requests(status).await {
        Ok(requests) => Json(requests).into_response(),
        Err(error) => internal_error("pickup_requests_unavailable", error),
    }
}

async fn admin_pickup_request_update(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<PickupUpdate>,
) -> Response {
    if update.is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "empty_update",
            "provide status and/or estimated_value",
        );
    }

    match state.store.update_pickup_request(&id, &update).await {
        Ok(Some(request)) => {
            tracing::info!(
                request_id = %request.id,
                status = request.status.as_str(),
                "pickup request updated"
            );
            Json(request).into_response()
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "pickup_request_not_found",
            format!("no pickup request with id {id}"),
        ),
        Err(error) => internal_error("pickup_request_not_saved", error),
    }
}

async fn admin_contact_messages(State(state): State<ApiState>) -> Response {
    match state.store.list_contact_messages().await {
        Ok(messages) => Json(messages).into_response(),
        Err(error) => internal_error("contact_messages_unavailable", error),
    }
}

async fn admin_stats(State(state): State<ApiState>) -> Response {
    match state.store.list_pickup_requests(None).await {
        Ok(requests) => Json(DashboardStats::from_requests(&requests)).into_response(),
        Err(error) => internal_error("pickup_requests_unavailable", error),
    }
}

async fn whatsapp_link(
    State(state): State<ApiState>,
    ApiJson(intent): ApiJson<MessageIntent>,
) -> Response {
    let intent = intent.normalized();
    state.metrics.inc_whatsapp_link();
    tracing::debug!(intent = intent.kind().as_str(), "whatsapp link composed");
    Json(WhatsAppResponse::build(&state.config, &intent)).into_response()
}

async fn whatsapp_redirect(
    State(state): State<ApiState>,
    Query(query): Query<WhatsAppQuery>,
) -> Response {
    let raw_kind = query.kind.as_deref().unwrap_or("general");
    let Some(kind) = IntentKind::parse(raw_kind) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_intent",
            format!("unknown message type {raw_kind:?}"),
        );
    };

    let intent = MessageIntent::from_parts(
        kind,
        IntentFields {
            customer_name: query.customer_name,
            customer_phone: query.customer_phone,
            custom_message: query.custom_message,
            product_name: query.product_name,
            product_id: query.product_id,
        },
    );
    state.metrics.inc_whatsapp_link();
    Redirect::to(compose(&state.config.whatsapp, &intent).url()).into_response()
}

async fn seo_local_business(State(state): State<ApiState>) -> impl IntoResponse {
    Json(local_business_schema(
        &state.config.business,
        &state.config.site_url,
    ))
}

async fn sitemap(State(state): State<ApiState>) -> Response {
    let products = match state.store.list_products().await {
        Ok(products) => products,
        Err(error) => return internal_error("products_unavailable", error),
    };
    let posts = match state.store.list_posts().await {
        Ok(posts) => posts,
        Err(error) => return internal_error("posts_unavailable", error),
    };

    let today = chrono::Utc::now().date_naive();
    let entries = sitemap_entries(&state.config.site_url, today, &products, &posts);
    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        render_sitemap(&entries),
    )
        .into_response()
}

fn parse_status_filter(value: Option<&str>) -> Result<Option<PickupStatus>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("all") => Ok(None),
        Some(value) => PickupStatus::parse(value)
            .map(Some)
            .ok_or_else(|| value.to_string()),
    }
}

pub(crate) fn error_response(
    status: StatusCode,
    error: &str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": error,
            "message": message.into(),
        })),
    )
        .into_response()
}

fn validation_response(state: &ApiState, errors: ValidationErrors) -> Response {
    state.metrics.inc_validation_failure();
    tracing::debug!(fields = %errors, "form rejected");
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({
            "error": "validation_failed",
            "message": errors.to_string(),
            "fields": errors,
        })),
    )
        .into_response()
}

fn internal_error(code: &str, error: anyhow::Error) -> Response {
    tracing::error!(error = %error, code, "request failed");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        code,
        "internal error, please retry later",
    )
}

fn is_form_endpoint(method: &Method, path: &str) -> bool {
    method == Method::POST
        && matches!(
            path,
            "/api/pickup-requests" | "/api/contact" | "/api/newsletter/subscribe"
        )
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:3000")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

async fn metrics_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let response = next.run(request).await;
    state.metrics.inc_request();
    state.metrics.observe_latency(started.elapsed());
    response
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !is_form_endpoint(request.method(), &path) {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    let key = format!("form:{}:{}", path, ip);
    if !state.form_limiter.allow(&key) {
        state.metrics.inc_rate_limited();
        tracing::warn!(path = %path, ip = %ip, "form submission rate limited");
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "too many submissions from this IP. wait and retry.",
        );
    }

    next.run(request).await
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}

async fn security_headers_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    if state.config.site_url.starts_with("https://") {
        response.headers_mut().insert(
            header::HeaderName::from_static("strict-transport-security"),
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_accepts_all_and_known_statuses() {
        assert_eq!(parse_status_filter(None), Ok(None));
        assert_eq!(parse_status_filter(Some("all")), Ok(None));
        assert_eq!(
            parse_status_filter(Some("Confirmed")),
            Ok(Some(PickupStatus::Confirmed))
        );
        assert_eq!(
            parse_status_filter(Some("lost")),
            Err("lost".to_string())
        );
    }

    #[test]
    fn only_form_posts_are_rate_limited() {
        assert!(is_form_endpoint(&Method::POST, "/api/pickup-requests"));
        assert!(is_form_endpoint(&Method::POST, "/api/newsletter/subscribe"));
        assert!(!is_form_endpoint(&Method::GET, "/api/pickup-requests"));
        assert!(!is_form_endpoint(&Method::POST, "/api/whatsapp/link"));
    }

    #[test]
    fn request_ip_uses_first_forwarded_address() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_ip(&request), "203.0.113.7");

        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(request_ip(&request), "local");
    }
}
