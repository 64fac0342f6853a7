//! Binding and validation of the create-pizza form.
//!
//! [`PizzaForm`] holds the raw submitted values exactly as entered so a page
//! can be re-rendered with them. [`PizzaForm::validate`] turns it into a
//! [`NewPizza`] or reports every failing field.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{NewPizza, PizzaSize},
    error::{ApiError, ErrorCode},
};

pub const MAX_NAME_CHARS: usize = 100;
pub const MIN_PRICE: f64 = 0.01;
pub const MAX_PRICE: f64 = 9999.99;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PizzaForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub is_gluten_free: Option<String>,
    #[serde(default)]
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("{}", summary(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First message recorded for `field`, if any.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        ApiError::new(ErrorCode::Validation, value.to_string())
    }
}

impl PizzaForm {
    pub fn validate(&self) -> Result<NewPizza, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push("name", "The Name field is required.");
        } else if name.chars().count() > MAX_NAME_CHARS {
            errors.push(
                "name",
                format!("The Name field must be at most {MAX_NAME_CHARS} characters."),
            );
        }

        let size = if self.size.trim().is_empty() {
            errors.push("size", "The Size field is required.");
            None
        } else {
            match self.size.parse::<PizzaSize>() {
                Ok(size) => Some(size),
                Err(_) => {
                    errors.push("size", "The Size field must be Small, Medium or Large.");
                    None
                }
            }
        };

        let price = match parse_price(&self.price) {
            Ok(price) => price,
            Err(message) => {
                errors.push("price", message);
                None
            }
        };

        match size {
            Some(size) if errors.is_empty() => Ok(NewPizza {
                name: name.to_string(),
                size,
                is_gluten_free: checkbox_checked(self.is_gluten_free.as_deref()),
                price,
            }),
            _ => Err(errors),
        }
    }
}

/// Whether a submitted checkbox value reads as checked.
pub fn checkbox_checked(raw: Option<&str>) -> bool {
    matches!(
        raw.map(str::trim).map(str::to_ascii_lowercase).as_deref(),
        Some("on" | "true" | "1")
    )
}

fn parse_price(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| "The field Price must be a number.".to_string())?;
    if !value.is_finite() || !(MIN_PRICE..=MAX_PRICE).contains(&value) {
        return Err(format!(
            "The field Price must be between {MIN_PRICE} and {MAX_PRICE}."
        ));
    }
    Ok(Some((value * 100.0).round() / 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, size: &str, price: &str) -> PizzaForm {
        PizzaForm {
            name: name.into(),
            size: size.into(),
            is_gluten_free: None,
            price: price.into(),
        }
    }

    #[test]
    fn accepts_name_and_size_without_price() {
        let pizza = form("Pepperoni", "Large", "").validate().expect("valid");
        assert_eq!(pizza.name, "Pepperoni");
        assert_eq!(pizza.size, PizzaSize::Large);
        assert_eq!(pizza.price, None);
        assert!(!pizza.is_gluten_free);
    }

    #[test]
    fn trims_name_and_rounds_price_to_cents() {
        let pizza = form("  Hawaiian ", "small", "12.499").validate().expect("valid");
        assert_eq!(pizza.name, "Hawaiian");
        assert_eq!(pizza.price, Some(12.5));
    }

    #[test]
    fn reports_every_failing_field_in_form_order() {
        let err = form(" ", "family", "0").validate().expect_err("invalid");
        let fields: Vec<_> = err.errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["name", "size", "price"]);
        assert!(err.message_for("name").is_some());
    }

    #[test]
    fn empty_form_is_missing_required_fields() {
        let err = PizzaForm::default().validate().expect_err("invalid");
        assert_eq!(err.message_for("name"), Some("The Name field is required."));
        assert_eq!(err.message_for("size"), Some("The Size field is required."));
        assert_eq!(err.message_for("price"), None);
    }

    #[test]
    fn rejects_overlong_name_and_non_numeric_price() {
        let long_name = "x".repeat(MAX_NAME_CHARS + 1);
        let err = form(&long_name, "Medium", "cheap").validate().expect_err("invalid");
        assert!(err.message_for("name").is_some());
        assert_eq!(err.message_for("price"), Some("The field Price must be a number."));
    }

    #[test]
    fn gluten_free_checkbox_values() {
        let mut f = form("Veggie", "Medium", "");
        f.is_gluten_free = Some("on".into());
        assert!(f.validate().expect("valid").is_gluten_free);
        f.is_gluten_free = Some("false".into());
        assert!(!f.validate().expect("valid").is_gluten_free);
    }

    #[test]
    fn validation_errors_convert_to_api_error() {
        let err = PizzaForm::default().validate().expect_err("invalid");
        let api: ApiError = err.into();
        assert_eq!(api.code, ErrorCode::Validation);
        assert!(api.message.contains("name"));
    }
}
