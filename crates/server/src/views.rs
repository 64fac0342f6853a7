//! HTML rendering of the pizza list page and of error pages.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use pages::PizzaListPage;
use shared::{
    domain::{Pizza, PizzaSize},
    error::{ApiError, ErrorCode},
    form::{checkbox_checked, FieldError},
};
use storage::PizzaStore;
use tracing::error;

#[derive(Template)]
#[template(path = "pizza_list.html")]
pub(crate) struct PizzaListView {
    pizzas: Vec<PizzaRow>,
    name: String,
    price: String,
    gluten_free_checked: bool,
    size_options: Vec<SizeOption>,
    summary: Vec<String>,
    name_error: String,
    size_error: String,
    price_error: String,
}

pub(crate) struct PizzaRow {
    id: i64,
    name: String,
    price: String,
    size: &'static str,
    is_gluten_free: bool,
}

pub(crate) struct SizeOption {
    value: &'static str,
    selected: bool,
}

impl From<&Pizza> for PizzaRow {
    fn from(pizza: &Pizza) -> Self {
        Self {
            id: pizza.id.0,
            name: pizza.name.clone(),
            price: pizza.price.map(|p| format!("{p:.2}")).unwrap_or_default(),
            size: pizza.size.as_str(),
            is_gluten_free: pizza.is_gluten_free,
        }
    }
}

impl PizzaListView {
    pub(crate) fn from_page<S: PizzaStore + ?Sized>(page: &PizzaListPage<'_, S>) -> Self {
        let form = &page.new_pizza;
        let selected_size = form.size.parse::<PizzaSize>().ok();
        let field_error = |field: &str| {
            page.validation
                .message_for(field)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            pizzas: page.pizza_list.iter().map(PizzaRow::from).collect(),
            name: form.name.clone(),
            price: form.price.clone(),
            gluten_free_checked: checkbox_checked(form.is_gluten_free.as_deref()),
            size_options: PizzaSize::ALL
                .into_iter()
                .map(|size| SizeOption {
                    value: size.as_str(),
                    selected: selected_size == Some(size),
                })
                .collect(),
            summary: page
                .validation
                .errors
                .iter()
                .map(|FieldError { message, .. }| message.clone())
                .collect(),
            name_error: field_error("name"),
            size_error: field_error("size"),
            price_error: field_error("price"),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorView<'a> {
    status: u16,
    message: &'a str,
}

/// Renders an askama template into a response, falling back to a plain 500.
pub(crate) fn render<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(err) => {
            error!(error = %err, "template rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "template rendering failed").into_response()
        }
    }
}

/// An [`ApiError`] answered with an HTML error page.
pub(crate) struct PageError(pub(crate) ApiError);

impl From<ApiError> for PageError {
    fn from(value: ApiError) -> Self {
        Self(value)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.code);
        if status.is_server_error() {
            error!(code = ?self.0.code, message = %self.0.message, "page request failed");
        }
        let message = if status.is_server_error() {
            "Something went wrong while handling the pizza list."
        } else {
            self.0.message.as_str()
        };
        render(
            status,
            &ErrorView {
                status: status.as_u16(),
                message,
            },
        )
    }
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
