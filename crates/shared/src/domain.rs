use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(PizzaId);

impl PizzaId {
    /// The bound value when no identifier was submitted. Never assigned by a store.
    pub const NONE: PizzaId = PizzaId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PizzaSize {
    Small,
    Medium,
    Large,
}

impl PizzaSize {
    pub const ALL: [PizzaSize; 3] = [PizzaSize::Small, PizzaSize::Medium, PizzaSize::Large];

    pub fn as_str(self) -> &'static str {
        match self {
            PizzaSize::Small => "Small",
            PizzaSize::Medium => "Medium",
            PizzaSize::Large => "Large",
        }
    }
}

impl fmt::Display for PizzaSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pizza size '{0}'")]
pub struct UnknownPizzaSize(pub String);

impl FromStr for PizzaSize {
    type Err = UnknownPizzaSize;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        PizzaSize::ALL
            .into_iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownPizzaSize(trimmed.to_string()))
    }
}

/// A pizza as owned by a store. Only stores assign `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pizza {
    pub id: PizzaId,
    pub name: String,
    pub size: PizzaSize,
    pub is_gluten_free: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// A validated pizza waiting for a store to give it an identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPizza {
    pub name: String,
    pub size: PizzaSize,
    pub is_gluten_free: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl NewPizza {
    pub fn into_pizza(self, id: PizzaId) -> Pizza {
        Pizza {
            id,
            name: self.name,
            size: self.size,
            is_gluten_free: self.is_gluten_free,
            price: self.price,
        }
    }
}
