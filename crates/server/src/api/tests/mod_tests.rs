use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
};
use shared::domain::{NewPizza, PizzaId, PizzaSize};
use storage::MemoryStore;
use tower::ServiceExt;

use super::*;

async fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store
        .add_pizza(NewPizza {
            name: "Margherita".into(),
            size: PizzaSize::Medium,
            is_gluten_free: false,
            price: Some(8.5),
        })
        .await
        .expect("seed");
    let app = build_router(AppState::new(store.clone()));
    (app, store)
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
}

#[tokio::test]
async fn get_renders_current_pizzas() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(Request::get("/pizzalist").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Margherita"));
    assert!(html.contains("8.50"));
    assert!(html.contains("handler=Delete&amp;id=1"));
}

#[tokio::test]
async fn valid_create_redirects_back_to_the_list() {
    let (app, store) = test_app().await;
    let response = app
        .oneshot(form_post("/pizzalist", "name=Pepperoni&size=Large"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), PIZZA_LIST_ROUTE);

    let pizzas = store.list_pizzas().await.expect("list");
    assert_eq!(pizzas.len(), 2);
    assert_eq!(pizzas[1].id, PizzaId(2));
    assert_eq!(pizzas[1].name, "Pepperoni");
    assert_eq!(pizzas[1].size, PizzaSize::Large);
}

#[tokio::test]
async fn invalid_create_re_renders_with_messages_and_entered_values() {
    let (app, store) = test_app().await;
    let response = app
        .oneshot(form_post("/pizzalist", "name=&size=Large&price=20000"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("The Name field is required."));
    assert!(html.contains("The field Price must be between"));
    assert!(html.contains("value=\"20000\""));
    assert!(html.contains("<option value=\"Large\" selected>"));
    assert!(html.contains("Margherita"), "list is reloaded for the re-render");
    assert_eq!(store.list_pizzas().await.expect("list").len(), 1);
}

#[tokio::test]
async fn create_without_a_form_body_re_renders() {
    let (app, store) = test_app().await;
    let response = app
        .oneshot(Request::post("/pizzalist").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("The Name field is required."));
    assert_eq!(store.list_pizzas().await.expect("list").len(), 1);
}

#[tokio::test]
async fn delete_removes_pizza_and_redirects() {
    let (app, store) = test_app().await;
    let response = app
        .oneshot(form_post("/pizzalist?handler=Delete&id=1", ""))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), PIZZA_LIST_ROUTE);
    assert!(store.list_pizzas().await.expect("list").is_empty());
}

#[tokio::test]
async fn delete_without_usable_id_re_renders_unchanged() {
    for uri in [
        "/pizzalist?handler=Delete&id=0",
        "/pizzalist?handler=Delete&id=abc",
        "/pizzalist?handler=delete",
    ] {
        let (app, store) = test_app().await;
        let response = app.oneshot(form_post(uri, "")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert!(body_text(response).await.contains("Margherita"), "{uri}");
        assert_eq!(store.list_pizzas().await.expect("list").len(), 1, "{uri}");
    }
}

#[tokio::test]
async fn delete_reads_id_from_the_form_body() {
    for uri in ["/pizzalist?handler=Delete", "/pizzalist?handler=Delete&id="] {
        let (app, store) = test_app().await;
        let response = app.oneshot(form_post(uri, "id=1")).await.expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), PIZZA_LIST_ROUTE, "{uri}");
        assert!(store.list_pizzas().await.expect("list").is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn query_id_wins_over_body_id() {
    let (app, store) = test_app().await;
    let response = app
        .oneshot(form_post("/pizzalist?handler=Delete&id=0", "id=1"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.list_pizzas().await.expect("list").len(), 1);
}

#[tokio::test]
async fn malformed_query_string_re_renders_the_page() {
    let (app, store) = test_app().await;
    let response = app
        .oneshot(form_post("/pizzalist?handler=Delete&id=1&id=1", ""))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Margherita"));
    assert!(!html.contains("Failed to deserialize"));
    assert_eq!(store.list_pizzas().await.expect("list").len(), 1);
}

#[tokio::test]
async fn re_rendered_checkbox_matches_how_it_would_be_stored() {
    let (app, _) = test_app().await;
    let response = app
        .clone()
        .oneshot(form_post("/pizzalist", "name=&size=Small&is_gluten_free=false"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("type=\"checkbox\" value=\"true\">"));

    let response = app
        .oneshot(form_post("/pizzalist", "name=&size=Small&is_gluten_free=on"))
        .await
        .expect("response");
    let html = body_text(response).await;
    assert!(html.contains("type=\"checkbox\" value=\"true\" checked>"));
}

#[tokio::test]
async fn unknown_page_handler_is_not_found() {
    let (app, store) = test_app().await;
    let response = app
        .oneshot(form_post("/pizzalist?handler=Update&id=1", ""))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.list_pizzas().await.expect("list").len(), 1);
}

#[tokio::test]
async fn pizza_names_are_html_escaped() {
    let (app, _) = test_app().await;
    let response = app
        .clone()
        .oneshot(form_post(
            "/pizzalist",
            "name=%3Cscript%3Ealert(1)%3C%2Fscript%3E&size=Small",
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .oneshot(Request::get("/pizzalist").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let html = body_text(response).await;
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn api_lists_pizzas_as_json() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(Request::get("/api/pizzas").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(json[0]["id"], 1);
    assert_eq!(json[0]["name"], "Margherita");
    assert_eq!(json[0]["size"], "medium");
}

#[tokio::test]
async fn root_redirects_and_health_reports_ok() {
    let (app, _) = test_app().await;
    let response = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), PIZZA_LIST_ROUTE);

    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn oversized_form_is_rejected() {
    let (app, store) = test_app().await;
    let body = format!("name={}&size=Small", "a".repeat(MAX_FORM_BYTES));
    let request = Request::post("/pizzalist")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(store.list_pizzas().await.expect("list").len(), 1);
}
