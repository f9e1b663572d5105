//! Admin console gating and actions through the full router.

use pretty_assertions::assert_eq;
use serde_json::json;
use wheelhouse_integration_tests::{TestApp, order_json, user_json};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn admin_app() -> TestApp {
    let mut app = TestApp::start().await;
    app.sign_in(&user_json("1", "Олег", true)).await;
    app
}

#[tokio::test]
async fn test_anonymous_visitors_are_sent_home() {
    let mut app = TestApp::start().await;

    let page = app.get("/admin").await;
    assert_eq!(page.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_customers_are_forbidden() {
    let mut app = TestApp::start().await;
    app.sign_in(&user_json("42", "Анна", false)).await;

    let page = app.get("/admin").await;
    assert_eq!(page.status, 403);

    let page = app.post_form("/admin/stats/reset", &[]).await;
    assert_eq!(page.status, 403);
}

#[tokio::test]
async fn test_pending_tab_lists_orders() {
    let mut app = admin_app().await;
    Mock::given(method("GET"))
        .and(path("/api/orders/admin/pending"))
        .and(query_param("telegram_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([order_json("ORD-7", "pending_confirmation")])))
        .mount(&app.backend)
        .await;

    let page = app.get("/admin").await;
    assert_eq!(page.status, 200);
    assert!(page.body.contains("Заказ ORD-7"));
    assert!(page.body.contains("/admin/orders/ORD-7/confirm"));
    assert!(page.body.contains("Анна (42)"));
}

#[tokio::test]
async fn test_confirm_order_returns_to_the_tab() {
    let mut app = admin_app().await;
    Mock::given(method("POST"))
        .and(path("/api/orders/ORD-7/confirm"))
        .and(query_param("telegram_id", "1"))
        .and(body_json(json!({ "admin_comment": "Доставим завтра" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json("ORD-7", "confirmed")))
        .expect(1)
        .mount(&app.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders/admin/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&app.backend)
        .await;

    let page = app
        .post_form(
            "/admin/orders/ORD-7/confirm",
            &[("tab", "all"), ("comment", "Доставим завтра")],
        )
        .await;
    assert_eq!(page.location.as_deref(), Some("/admin?tab=all"));

    let page = app.get("/admin?tab=all").await;
    assert!(page.body.contains("Заказ подтвержден"));
}

#[tokio::test]
async fn test_reject_without_reason_is_refused() {
    let mut app = admin_app().await;
    Mock::given(method("POST"))
        .and(path("/api/orders/ORD-7/reject"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json("ORD-7", "cancelled")))
        .expect(0)
        .mount(&app.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders/admin/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&app.backend)
        .await;

    app.post_form("/admin/orders/ORD-7/reject", &[("tab", "pending"), ("reason", "  ")])
        .await;

    let page = app.get("/admin").await;
    assert!(page.body.contains("Укажите причину отклонения"));
}

#[tokio::test]
async fn test_markup_update() {
    let mut app = admin_app().await;
    Mock::given(method("PUT"))
        .and(path("/api/admin/markup"))
        .and(body_json(json!({ "markup_percentage": 12.5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "markup_percentage": 12.5 })))
        .expect(1)
        .mount(&app.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/markup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "markup_percentage": 12.5 })))
        .mount(&app.backend)
        .await;

    let page = app
        .post_form("/admin/markup", &[("markup_percentage", "12,5")])
        .await;
    assert_eq!(page.location.as_deref(), Some("/admin?tab=settings"));

    let page = app.get("/admin?tab=settings").await;
    assert!(page.body.contains("Наценка обновлена: 12.5%"));
    assert!(page.body.contains("value=\"12.5\""));
}

#[tokio::test]
async fn test_backend_error_is_reported_on_the_tab() {
    let mut app = admin_app().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/stats"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "db down" })))
        .mount(&app.backend)
        .await;

    let page = app.get("/admin?tab=stats").await;
    assert_eq!(page.status, 200);
    assert!(page.body.contains("Ошибка загрузки данных: db down"));
}
