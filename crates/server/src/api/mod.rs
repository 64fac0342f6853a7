use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use pages::{bind_pizza_id, PageResult, PizzaListPage, PIZZA_LIST_ROUTE};
use serde::Deserialize;
use shared::{
    domain::Pizza,
    error::{ApiError, ErrorCode},
    form::PizzaForm,
};
use storage::PizzaStore;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{debug, warn};

use crate::{
    app_state::AppState,
    views::{render, status_for, PageError, PizzaListView},
};

const MAX_FORM_BYTES: usize = 64 * 1024;

/// Page handler selection, as carried by `?handler=Delete&id=3`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    handler: Option<String>,
    id: Option<String>,
}

/// The url-encoded body of a page POST: the create form, plus the `id` a
/// delete form may carry instead of the query string.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageForm {
    #[serde(flatten)]
    pizza: PizzaForm,
    #[serde(default)]
    id: Option<String>,
}

pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route(PIZZA_LIST_ROUTE, get(pizza_list).post(pizza_list_post))
        .route("/api/pizzas", get(api_list_pizzas))
        .layer(RequestBodyLimitLayer::new(MAX_FORM_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Redirect {
    Redirect::to(PIZZA_LIST_ROUTE)
}

async fn healthz(State(state): State<AppState>) -> Response {
    match state.store.health_check().await {
        Ok(()) => "ok".into_response(),
        Err(error) => {
            warn!(error = %format!("{error:#}"), "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response()
        }
    }
}

async fn pizza_list(State(state): State<AppState>) -> Result<Response, PageError> {
    let mut page = PizzaListPage::new(&*state.store);
    page.on_get().await?;
    Ok(render(StatusCode::OK, &PizzaListView::from_page(&page)))
}

async fn pizza_list_post(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
    form: Result<Form<PageForm>, FormRejection>,
) -> Result<Response, PageError> {
    let mut page = PizzaListPage::new(&*state.store);

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            debug!(%rejection, "page query could not be bound");
            return respond(page, PageResult::RenderCurrentPage).await;
        }
    };
    let form = match form {
        Ok(Form(form)) => Some(form),
        Err(rejection) => {
            debug!(%rejection, "page form could not be bound");
            None
        }
    };

    let result = match query.handler.as_deref().map(str::trim) {
        None | Some("") => page.on_post(form.map(|form| form.pizza)).await?,
        Some(handler) if handler.eq_ignore_ascii_case("delete") => {
            let id = non_blank(query.id.as_deref())
                .or_else(|| form.as_ref().and_then(|form| non_blank(form.id.as_deref())));
            page.on_post_delete(bind_pizza_id(id)).await?
        }
        Some(handler) => {
            return Err(ApiError::new(
                ErrorCode::NotFound,
                format!("no page handler named '{handler}'"),
            )
            .into());
        }
    };

    respond(page, result).await
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.trim().is_empty())
}

async fn respond(
    mut page: PizzaListPage<'_, dyn PizzaStore>,
    result: PageResult,
) -> Result<Response, PageError> {
    match result {
        PageResult::RedirectTo(location) => Ok(Redirect::to(&location).into_response()),
        PageResult::RenderCurrentPage => {
            // the handlers leave the list unloaded on this path
            page.on_get().await?;
            Ok(render(StatusCode::OK, &PizzaListView::from_page(&page)))
        }
    }
}

async fn api_list_pizzas(
    State(state): State<AppState>,
) -> Result<Json<Vec<Pizza>>, (StatusCode, Json<ApiError>)> {
    let mut page = PizzaListPage::new(&*state.store);
    page.on_get()
        .await
        .map_err(|e| (status_for(e.code), Json(e)))?;
    Ok(Json(page.pizza_list))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
