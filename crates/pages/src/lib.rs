//! The pizza list page: load, create and delete handlers over a [`PizzaStore`].
//!
//! Each request builds a fresh [`PizzaListPage`] around a borrowed store. The
//! handlers fill in the per-request view model and answer with a
//! [`PageResult`] telling the HTTP layer whether to render or redirect.

use shared::{
    domain::{Pizza, PizzaId},
    error::{ApiError, ApiException, ErrorCode},
    form::{PizzaForm, ValidationErrors},
};
use storage::PizzaStore;
use tracing::{info, warn};

pub const PIZZA_LIST_ROUTE: &str = "/pizzalist";

/// What the HTTP layer should do once a handler returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResult {
    /// Render this page instance as it stands, without navigating.
    RenderCurrentPage,
    /// Answer with a redirect to the given location.
    RedirectTo(String),
}

impl PageResult {
    fn reload() -> Self {
        PageResult::RedirectTo(PIZZA_LIST_ROUTE.to_string())
    }
}

pub struct PizzaListPage<'a, S: PizzaStore + ?Sized> {
    store: &'a S,
    pub pizza_list: Vec<Pizza>,
    pub new_pizza: PizzaForm,
    pub validation: ValidationErrors,
}

impl<'a, S: PizzaStore + ?Sized> PizzaListPage<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            pizza_list: Vec::new(),
            new_pizza: PizzaForm::default(),
            validation: ValidationErrors::default(),
        }
    }

    pub async fn on_get(&mut self) -> Result<(), ApiError> {
        self.pizza_list = self.store.list_pizzas().await.map_err(internal)?;
        Ok(())
    }

    /// Creates a pizza from the bound form. `None` means nothing could be bound.
    pub async fn on_post(&mut self, form: Option<PizzaForm>) -> Result<PageResult, ApiError> {
        let Some(form) = form else {
            warn!("create submitted without a bindable form");
            self.validation = missing_form();
            return Ok(PageResult::RenderCurrentPage);
        };

        let validated = form.validate();
        self.new_pizza = form;
        let new_pizza = match validated {
            Ok(new_pizza) => new_pizza,
            Err(errors) => {
                info!(%errors, "pizza form rejected");
                self.validation = errors;
                return Ok(PageResult::RenderCurrentPage);
            }
        };

        let stored = self.store.add_pizza(new_pizza).await.map_err(internal)?;
        info!(pizza_id = %stored.id, name = %stored.name, "pizza created");
        Ok(PageResult::reload())
    }

    pub async fn on_post_delete(&mut self, id: PizzaId) -> Result<PageResult, ApiError> {
        if id.is_none() {
            return Ok(PageResult::RenderCurrentPage);
        }

        let removed = self.store.delete_pizza(id).await.map_err(internal)?;
        if removed {
            info!(pizza_id = %id, "pizza deleted");
        } else {
            warn!(pizza_id = %id, "delete requested for unknown pizza");
        }
        Ok(PageResult::reload())
    }
}

/// Binds a raw `id` value the way a missing or malformed route value binds: to
/// [`PizzaId::NONE`].
pub fn bind_pizza_id(raw: Option<&str>) -> PizzaId {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .map(PizzaId)
        .unwrap_or(PizzaId::NONE)
}

fn missing_form() -> ValidationErrors {
    PizzaForm::default()
        .validate()
        .err()
        .unwrap_or_default()
}

fn internal(err: anyhow::Error) -> ApiException {
    ApiException::new(ErrorCode::Internal, format!("{err:#}"))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
