use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use shared::domain::{NewPizza, Pizza, PizzaId};

use crate::PizzaStore;

/// Process-local store. Identifiers start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    pizzas: Vec<Pizza>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PizzaStore for MemoryStore {
    async fn list_pizzas(&self) -> Result<Vec<Pizza>> {
        Ok(self.state.lock().await.pizzas.clone())
    }

    async fn add_pizza(&self, pizza: NewPizza) -> Result<Pizza> {
        let mut state = self.state.lock().await;
        state.last_id += 1;
        let stored = pizza.into_pizza(PizzaId(state.last_id));
        state.pizzas.push(stored.clone());
        debug!(pizza_id = %stored.id, name = %stored.name, "pizza stored in memory");
        Ok(stored)
    }

    async fn delete_pizza(&self, id: PizzaId) -> Result<bool> {
        let mut state = self.state.lock().await;
        let before = state.pizzas.len();
        state.pizzas.retain(|pizza| pizza.id != id);
        Ok(state.pizzas.len() != before)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
